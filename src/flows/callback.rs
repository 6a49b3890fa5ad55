//! Callback handling: authorization-code exchange, userinfo lookup, and the policy decision.
//!
//! [`Authenticator::authenticate`] stops at the verified [`Profile`];
//! [`Authenticator::complete_login`] feeds that profile to the configured
//! [`AuthorizationPolicy`](crate::policy::AuthorizationPolicy). A missing code or a policy
//! rejection yields `Ok(None)`; only transport and provider failures surface as errors.

// self
use crate::{
	_prelude::*,
	auth::{Profile, Username},
	flows::{Authenticator, common},
	http::ProviderHttpClient,
	oauth::{ProviderClient, TransportErrorMapper},
	obs::{FlowAttempt, FlowKind, FlowOutcome},
};

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the callback `code` for an access token and fetches the userinfo profile.
	///
	/// Returns `Ok(None)` without contacting the provider when `code` is missing or empty.
	pub async fn authenticate(&self, code: Option<&str>) -> Result<Option<Profile>> {
		let attempt = self.callback_attempt("authenticate");
		let result = self.fetch_profile(&attempt, code).await;

		attempt.finish(outcome_of(&result));

		result
	}

	/// Runs the same provider calls as [`Authenticator::authenticate`], then the
	/// authorization policy.
	///
	/// Returns the canonical username on success and `Ok(None)` for every kind of rejection,
	/// so callers cannot leak the reason to the user.
	pub async fn complete_login(&self, code: Option<&str>) -> Result<Option<Username>> {
		let attempt = self.callback_attempt("complete_login");
		let result = match self.fetch_profile(&attempt, code).await {
			Ok(Some(profile)) => Ok(attempt.in_scope(|| self.policy.decide(&profile))),
			Ok(None) => Ok(None),
			Err(e) => Err(e),
		};

		attempt.finish(outcome_of(&result));

		result
	}

	fn callback_attempt(&self, operation: &'static str) -> FlowAttempt {
		FlowAttempt::start(FlowKind::Callback, operation, &self.descriptor.id)
	}

	async fn fetch_profile(
		&self,
		attempt: &FlowAttempt,
		code: Option<&str>,
	) -> Result<Option<Profile>> {
		let Some(code) = code.filter(|code| !code.is_empty()) else {
			#[cfg(feature = "tracing")]
			attempt.in_scope(|| tracing::info!("Callback carried no authorization code."));

			return Ok(None);
		};
		let client = ProviderClient::new(
			&self.descriptor,
			&self.client_id,
			self.client_secret.as_deref(),
			&self.redirect_uri,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		);
		let strategy = self.strategy.as_ref();
		let extra_params = common::extra_token_params(strategy);

		attempt
			.run(async {
				let access_token = client.exchange_code(strategy, code, &extra_params).await?;

				client.fetch_userinfo(strategy, &access_token).await.map(Some)
			})
			.await
	}
}

fn outcome_of<T>(result: &Result<Option<T>>) -> FlowOutcome {
	match result {
		Ok(Some(_)) => FlowOutcome::Success,
		Ok(None) => FlowOutcome::Rejected,
		Err(_) => FlowOutcome::Failure,
	}
}
