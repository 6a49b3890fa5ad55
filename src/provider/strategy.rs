//! Per-provider hooks: extra token-request fields and failure classification.
//!
//! The code exchange follows RFC 6749 error codes in the token response body, while the
//! userinfo endpoint follows RFC 6750 and reports its error code in the
//! `WWW-Authenticate` challenge. Both arrive here as a [`ProviderFailure`].

// self
use crate::{_prelude::*, provider::descriptor::EndpointKind};

/// Error codes recognized by [`classify_failure`], case-insensitively.
const KNOWN_CODES: [(&str, ProviderErrorKind); 10] = [
	("invalid_grant", ProviderErrorKind::InvalidGrant),
	("access_denied", ProviderErrorKind::InvalidGrant),
	("invalid_client", ProviderErrorKind::InvalidClient),
	("unauthorized_client", ProviderErrorKind::InvalidClient),
	("invalid_token", ProviderErrorKind::InvalidClient),
	("invalid_request", ProviderErrorKind::InvalidClient),
	("invalid_scope", ProviderErrorKind::InsufficientScope),
	("insufficient_scope", ProviderErrorKind::InsufficientScope),
	("server_error", ProviderErrorKind::Transient),
	("temporarily_unavailable", ProviderErrorKind::Transient),
];

/// Provider-specific behavior layered over the standard login flow.
///
/// Both hooks have defaults, so most providers use [`DefaultProviderStrategy`].
pub trait ProviderStrategy: Send + Sync {
	/// Maps a failed provider call onto the authenticator's error categories.
	fn classify(&self, failure: &ProviderFailure<'_>) -> ProviderErrorKind {
		classify_failure(failure)
	}

	/// Additional form fields sent with the code exchange (audience, resource, ...).
	///
	/// Fields owned by the grant itself are dropped before the request is built.
	fn token_params(&self) -> Vec<(String, String)> {
		Vec::new()
	}
}

/// Error categories a provider failure can fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The authorization code was rejected (bad, expired, or reused).
	InvalidGrant,
	/// Client credentials or the access token were refused.
	InvalidClient,
	/// The access token does not cover the userinfo scopes.
	InsufficientScope,
	/// Anything else; the user may simply try to log in again.
	Transient,
}

/// What the authenticator learned about a failed provider call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderFailure<'a> {
	/// Endpoint that failed.
	pub endpoint: EndpointKind,
	/// HTTP status, when a response arrived.
	pub status: Option<u16>,
	/// OAuth `error` code from the token response body or the bearer challenge.
	pub error_code: Option<&'a str>,
	/// OAuth `error_description`, when supplied.
	pub description: Option<&'a str>,
	/// Raw response body, when it is valid UTF-8.
	pub body: Option<&'a str>,
}
impl<'a> ProviderFailure<'a> {
	/// Failure known only by its endpoint.
	pub fn new(endpoint: EndpointKind) -> Self {
		Self { endpoint, status: None, error_code: None, description: None, body: None }
	}

	/// Sets the HTTP status.
	pub fn with_status(mut self, status: impl Into<Option<u16>>) -> Self {
		self.status = status.into();

		self
	}

	/// Sets the OAuth error code and description.
	pub fn with_error(mut self, code: &'a str, description: Option<&'a str>) -> Self {
		self.error_code = Some(code);
		self.description = description;

		self
	}

	/// Sets the response body.
	pub fn with_body(mut self, body: &'a str) -> Self {
		self.body = Some(body).filter(|body| !body.trim().is_empty());

		self
	}
}

/// Strategy used when a provider needs no customization.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultProviderStrategy;
impl ProviderStrategy for DefaultProviderStrategy {}

/// Default classification shared by every strategy.
///
/// An exact error code wins, then a known code mentioned in the description or body, then
/// the HTTP status.
pub fn classify_failure(failure: &ProviderFailure<'_>) -> ProviderErrorKind {
	failure
		.error_code
		.and_then(kind_for_code)
		.or_else(|| failure.description.and_then(kind_mentioned_in))
		.or_else(|| failure.body.and_then(kind_mentioned_in))
		.unwrap_or_else(|| kind_for_status(failure.endpoint, failure.status))
}

fn kind_for_code(code: &str) -> Option<ProviderErrorKind> {
	KNOWN_CODES
		.iter()
		.find(|(known, _)| known.eq_ignore_ascii_case(code.trim()))
		.map(|(_, kind)| *kind)
}

fn kind_mentioned_in(text: &str) -> Option<ProviderErrorKind> {
	let lowered = text.to_ascii_lowercase();

	KNOWN_CODES.iter().find(|(known, _)| lowered.contains(known)).map(|(_, kind)| *kind)
}

fn kind_for_status(endpoint: EndpointKind, status: Option<u16>) -> ProviderErrorKind {
	match (endpoint, status) {
		(_, Some(401)) => ProviderErrorKind::InvalidClient,
		(_, Some(403)) => ProviderErrorKind::InsufficientScope,
		(EndpointKind::Token, Some(400)) => ProviderErrorKind::InvalidGrant,
		(EndpointKind::Userinfo, Some(400)) => ProviderErrorKind::InvalidClient,
		_ => ProviderErrorKind::Transient,
	}
}
