//! Login flow orchestration powered by the OAuth facade and the authorization policy.
//!
//! The platform registers two routes and calls into [`Authenticator`] from each:
//! [`LOGIN_PATH`] redirects to [`Authenticator::start_login`]'s authorize URL, and
//! [`CALLBACK_PATH`] hands the `code` query parameter to [`Authenticator::complete_login`].

mod callback;
mod common;
pub mod login;

pub use login::*;

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	policy::AuthorizationPolicy,
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Route that starts a login by redirecting to the provider.
pub const LOGIN_PATH: &str = "/oauth_login";
/// Route the provider redirects back to with the authorization `code`.
pub const CALLBACK_PATH: &str = "/oauth2_callback";

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates provider logins against a single provider descriptor.
///
/// The authenticator owns the HTTP client, provider descriptor, strategy, client
/// credentials, and authorization policy. Every field is immutable or shared behind an
/// `Arc`, so clones are cheap and concurrent login attempts never share mutable state.
#[derive(Clone)]
pub struct Authenticator<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines the OAuth endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for provider-specific request adjustments and error mapping.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider; sent on both the authorize and token calls.
	pub redirect_uri: Url,
	/// Scopes requested at login; always contains `email`.
	pub scope: ScopeSet,
	/// Policy that turns verified profiles into canonical usernames.
	pub policy: Arc<AuthorizationPolicy>,
}
impl<C, M> Authenticator<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an authenticator that reuses the caller-provided transport + mapper pair.
	///
	/// The strategy defaults to [`DefaultProviderStrategy`], the scope to `email`, and the
	/// policy to [`AuthorizationPolicy::default`].
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		redirect_uri: Url,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri,
			scope: ScopeSet::default().with_email(),
			policy: Default::default(),
		}
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Replaces the requested scopes; `email` is added when missing.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope.with_email();

		self
	}

	/// Replaces the provider strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the authorization policy.
	pub fn with_policy(mut self, policy: impl Into<Arc<AuthorizationPolicy>>) -> Self {
		self.policy = policy.into();

		self
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an authenticator with its own redirect-free reqwest transport.
	///
	/// Use [`Authenticator::with_client_secret`] to attach the confidential client secret.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		redirect_uri: Url,
	) -> Result<Self> {
		Ok(Self::with_http_client(
			descriptor,
			client_id,
			redirect_uri,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Debug for Authenticator<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.field("policy", &self.policy)
			.finish()
	}
}
