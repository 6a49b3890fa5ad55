//! Authenticator-level error types shared across flows, providers, and configuration.
//!
//! Policy rejections are not errors: [`AuthorizationPolicy::decide`] returns `None` for them.
//! Everything here describes a login attempt that could not be evaluated at all.
//!
//! [`AuthorizationPolicy::decide`]: crate::policy::AuthorizationPolicy::decide

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical authenticator error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Access token lacks the scopes the userinfo endpoint requires.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider- or authenticator-supplied reason string.
		reason: String,
	},
	/// Provider rejected the grant (e.g., bad or reused authorization code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or authenticator-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or the access token was refused.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or authenticator-supplied reason string.
		reason: String,
	},
}

/// Configuration and validation failures raised by the authenticator.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// A configured identifier (domain, username, provider) is invalid.
	#[error("Configuration field `{field}` is invalid.")]
	InvalidValue {
		/// Configuration key holding the value.
		field: &'static str,
		/// Validation failure.
		#[source]
		source: crate::auth::IdentifierError,
	},
	/// Configuration sources could not be read or deserialized.
	#[error("Configuration could not be loaded.")]
	Load(#[from] ::config::ConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Tags an identifier validation failure with the configuration key it came from.
	pub fn invalid_value(field: &'static str, source: crate::auth::IdentifierError) -> Self {
		Self::InvalidValue { field, source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants raised by provider endpoints.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal token response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or authenticator-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Userinfo endpoint failed without a more specific classification.
	#[error("Userinfo endpoint returned an unexpected response: {message}.")]
	Userinfo {
		/// Provider- or authenticator-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Userinfo endpoint returned a body that is not a JSON object.
	#[error("Userinfo endpoint returned malformed JSON.")]
	UserinfoParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransientError {
	/// Builds the generic transient variant for the endpoint that failed.
	pub fn endpoint(endpoint: EndpointKind, message: impl Into<String>, status: Option<u16>) -> Self {
		let message = message.into();

		match endpoint {
			EndpointKind::Userinfo => Self::Userinfo { message, status },
			EndpointKind::Authorization | EndpointKind::Token =>
				Self::TokenEndpoint { message, status },
		}
	}

	/// HTTP status attached to the failure, when known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenEndpoint { status, .. }
			| Self::TokenResponseParse { status, .. }
			| Self::Userinfo { status, .. }
			| Self::UserinfoParse { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling a provider endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: EndpointKind,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}
