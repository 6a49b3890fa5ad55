//! Provider calls made while handling a callback.
//!
//! [`ProviderClient`] performs the authorization-code exchange through the `oauth2` crate and
//! the userinfo GET through the same [`ProviderHttpClient`] handle type. Failures from either
//! call are classified by the configured [`ProviderStrategy`]; failures below HTTP go through
//! a [`TransportErrorMapper`].

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, HttpRequest, RedirectUrl, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
	http::{
		HeaderMap, Method,
		header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Profile, TokenSecret},
	error::{ConfigError, TransientError, TransportError},
	http::{ProviderHttpClient, StatusCell},
	provider::{
		ClientAuthMethod, EndpointKind, ProviderDescriptor, ProviderErrorKind, ProviderFailure,
		ProviderStrategy,
	},
};

type CodeClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Turns transport failures (no usable HTTP response) into authenticator errors.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Maps `error` raised while calling `endpoint`; `status` is set when a status line
	/// arrived before the failure.
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		status: Option<u16>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Mapper for [`ReqwestHttpClient`](crate::http::ReqwestHttpClient).
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		status: Option<u16>,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, status, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransientError::endpoint(
				endpoint,
				format!("HTTP client failed while calling the {endpoint} endpoint: {other}"),
				status,
			)
			.into(),
		}
	}
}

/// Client for the token and userinfo endpoints of one provider.
pub(crate) struct ProviderClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	code_client: CodeClient,
	userinfo: Url,
	http_client: Arc<C>,
	mapper: Arc<M>,
}
impl<C, M> ProviderClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		redirect_uri: &Url,
		http_client: Arc<C>,
		mapper: Arc<M>,
	) -> Self {
		let auth_url = AuthUrl::from_url(descriptor.endpoints.authorization.clone());
		let token_url = TokenUrl::from_url(descriptor.endpoints.token.clone());
		let redirect_url = RedirectUrl::from_url(redirect_uri.clone());
		let auth_type = match descriptor.preferred_client_auth_method {
			ClientAuthMethod::ClientSecretPost => AuthType::RequestBody,
			ClientAuthMethod::ClientSecretBasic => AuthType::BasicAuth,
		};
		let mut code_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(auth_type);

		if let Some(secret) = client_secret {
			code_client = code_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}

		Self { code_client, userinfo: descriptor.endpoints.userinfo.clone(), http_client, mapper }
	}

	/// Redeems `code` at the token endpoint.
	pub(crate) async fn exchange_code(
		&self,
		strategy: &dyn ProviderStrategy,
		code: &str,
		extra_params: &[(String, String)],
	) -> Result<TokenSecret> {
		let status = StatusCell::default();
		let handle = self.http_client.handle(status.clone());
		let mut request = self.code_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		for (key, value) in extra_params {
			request = request.add_extra_param(key, value);
		}

		let response = request
			.request_async(&handle)
			.await
			.map_err(|e| self.map_token_error(strategy, status.get(), e))?;

		Ok(TokenSecret::new(response.access_token().secret().to_owned()))
	}

	/// Reads the userinfo document with `access_token`.
	pub(crate) async fn fetch_userinfo(
		&self,
		strategy: &dyn ProviderStrategy,
		access_token: &TokenSecret,
	) -> Result<Profile> {
		let status = StatusCell::default();
		let handle = self.http_client.handle(status.clone());
		let request: HttpRequest = oauth2::http::Request::builder()
			.method(Method::GET)
			.uri(self.userinfo.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let response = handle.call(request).await.map_err(|e| {
			self.mapper.map_transport_error(EndpointKind::Userinfo, status.get(), e)
		})?;
		let code = response.status().as_u16();

		if !response.status().is_success() {
			let body = std::str::from_utf8(response.body()).unwrap_or_default();
			let mut failure =
				ProviderFailure::new(EndpointKind::Userinfo).with_status(code).with_body(body);

			if let Some(error_code) = bearer_error(response.headers()) {
				failure = failure.with_error(error_code, None);
			}

			return Err(classify(
				strategy.classify(&failure),
				EndpointKind::Userinfo,
				format!("Userinfo endpoint responded with HTTP {code}"),
				Some(code),
			));
		}

		Profile::from_json(response.body())
			.map_err(|source| TransientError::UserinfoParse { source, status: Some(code) }.into())
	}

	fn map_token_error(
		&self,
		strategy: &dyn ProviderStrategy,
		status: Option<u16>,
		error: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	) -> Error {
		match error {
			RequestTokenError::ServerResponse(response) => {
				let code: &str = response.error().as_ref();
				let description = response.error_description().map(String::as_str);
				let failure = ProviderFailure::new(EndpointKind::Token)
					.with_status(status)
					.with_error(code, description);
				let message = match description {
					Some(description) => format!("Token endpoint returned `{code}`: {description}"),
					None => format!("Token endpoint returned `{code}`"),
				};

				classify(strategy.classify(&failure), EndpointKind::Token, message, status)
			},
			RequestTokenError::Request(e) =>
				self.mapper.map_transport_error(EndpointKind::Token, status, e),
			RequestTokenError::Parse(source, _) =>
				TransientError::TokenResponseParse { source, status }.into(),
			RequestTokenError::Other(message) =>
				TransientError::endpoint(EndpointKind::Token, message, status).into(),
		}
	}
}

fn classify(
	kind: ProviderErrorKind,
	endpoint: EndpointKind,
	message: String,
	status: Option<u16>,
) -> Error {
	match kind {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason: message },
		ProviderErrorKind::Transient => TransientError::endpoint(endpoint, message, status).into(),
	}
}

/// `error` parameter of an RFC 6750 `WWW-Authenticate: Bearer ...` challenge.
fn bearer_error(headers: &HeaderMap) -> Option<&str> {
	let challenge = headers.get(WWW_AUTHENTICATE)?.to_str().ok()?.trim();
	let params = challenge
		.get(..6)
		.filter(|scheme| scheme.eq_ignore_ascii_case("bearer"))
		.map(|_| &challenge[6..])?;

	params.split(',').find_map(|param| {
		let (key, value) = param.split_once('=')?;

		(key.trim() == "error").then(|| value.trim().trim_matches('"'))
	})
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: EndpointKind, status: Option<u16>, error: ReqwestError) -> Error {
	if error.is_builder() {
		return ConfigError::from(error).into();
	}
	if error.is_timeout() {
		return TransientError::endpoint(
			endpoint,
			format!("Timed out calling the {endpoint} endpoint"),
			status.or_else(|| error.status().map(|code| code.as_u16())),
		)
		.into();
	}

	TransportError::network(endpoint, error).into()
}
