//! Login initiation: the provider redirect served from the login route.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	flows::{Authenticator, common},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{FlowAttempt, FlowKind, FlowOutcome},
	provider::ProviderDescriptor,
};

const STATE_LEN: usize = 32;

/// How long a login `state` stays redeemable after [`Authenticator::start_login`].
pub const LOGIN_STATE_TTL: Duration = Duration::minutes(10);

/// Redirect metadata returned by [`Authenticator::start_login`].
///
/// The platform stores `state` in the user's session, redirects to `authorize_url`, and
/// checks the returned `state` with [`LoginSession::validate_state`] on the callback.
#[derive(Clone, Debug)]
pub struct LoginSession {
	/// Opaque state value that must round-trip via the callback route.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed HTTPS authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	/// When the session was created.
	pub issued_at: OffsetDateTime,
}
impl LoginSession {
	/// Validates the returned `state` parameter after the provider redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		self.validate_state_at(returned_state, OffsetDateTime::now_utc())
	}

	/// Same as [`LoginSession::validate_state`], evaluated at `now`.
	///
	/// Fails with [`Error::InvalidGrant`] when the state differs or [`LOGIN_STATE_TTL`] has
	/// elapsed since `issued_at`.
	pub fn validate_state_at(&self, returned_state: &str, now: OffsetDateTime) -> Result<()> {
		if returned_state != self.state {
			return Err(Error::InvalidGrant { reason: "Authorization state mismatch".into() });
		}
		if now - self.issued_at > LOGIN_STATE_TTL {
			return Err(Error::InvalidGrant { reason: "Authorization state expired".into() });
		}

		Ok(())
	}
}

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the provider redirect for the login-initiation route.
	pub fn start_login(&self) -> LoginSession {
		let attempt = FlowAttempt::start(FlowKind::Login, "start_login", &self.descriptor.id);
		let session = attempt.in_scope(|| {
			build_session(
				&self.descriptor,
				&self.client_id,
				&self.scope,
				self.redirect_uri.clone(),
				random_state(),
				OffsetDateTime::now_utc(),
			)
		});

		attempt.finish(FlowOutcome::Success);

		session
	}
}

fn build_session(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	scope: &ScopeSet,
	redirect_uri: Url,
	state: String,
	issued_at: OffsetDateTime,
) -> LoginSession {
	let mut authorize_url = descriptor.endpoints.authorization.clone();
	let mut pairs = authorize_url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if let Some(scope_value) = common::format_scope(scope, descriptor.quirks.scope_delimiter) {
		pairs.append_pair("scope", &scope_value);
	}

	pairs.append_pair("state", &state);

	drop(pairs);

	LoginSession { state, redirect_uri, authorize_url, issued_at }
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
