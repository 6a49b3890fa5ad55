//! Identity claims returned by the provider's userinfo endpoint.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Claims describing the user who completed the provider login.
///
/// A profile lives for a single authentication attempt. Only the `email` claim drives
/// authorization; the remaining claims are kept so callers can log or display them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Map<String, Value>);
impl Profile {
	/// Wraps an already-parsed claim map.
	pub fn new(claims: Map<String, Value>) -> Self {
		Self(claims)
	}

	/// Parses a userinfo document, which must be a JSON object.
	///
	/// Errors carry the path of the offending value.
	pub fn from_json(body: &[u8]) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer).map(Self)
	}

	/// Builds a profile carrying only an `email` claim.
	pub fn with_email(email: impl Into<String>) -> Self {
		let mut claims = Map::new();

		claims.insert("email".into(), Value::String(email.into()));

		Self(claims)
	}

	/// Returns the `email` claim, or an empty string when it is absent or not a string.
	pub fn email(&self) -> &str {
		self.claim_str("email").unwrap_or_default()
	}

	/// Returns the `sub` claim when the provider released one.
	pub fn subject(&self) -> Option<&str> {
		self.claim_str("sub")
	}

	/// Returns a raw claim value.
	pub fn claim(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Consumes the profile and returns the claim map.
	pub fn into_claims(self) -> Map<String, Value> {
		self.0
	}

	fn claim_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}
}
#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn email_defaults_to_empty_string() {
		assert_eq!(Profile::default().email(), "");

		let profile = Profile::from_json(br#"{"email":null,"sub":"abc"}"#)
			.expect("Object payloads should parse into profiles.");

		assert_eq!(profile.email(), "");
		assert_eq!(profile.subject(), Some("abc"));

		let numeric = Profile::from_json(br#"{"email":42}"#)
			.expect("Object payloads should parse into profiles.");

		assert_eq!(numeric.email(), "");
	}

	#[test]
	fn with_email_exposes_claim() {
		let profile = Profile::with_email("alice@mit.edu");

		assert_eq!(profile.email(), "alice@mit.edu");
		assert_eq!(profile.claim("email"), Some(&json!("alice@mit.edu")));
	}

	#[test]
	fn non_object_documents_are_rejected() {
		assert!(Profile::from_json(br#"["alice@mit.edu"]"#).is_err());
		assert!(Profile::from_json(br#""alice@mit.edu""#).is_err());
		assert!(Profile::from_json(b"").is_err());
	}

	#[test]
	fn arbitrary_claims_are_preserved() {
		let profile = Profile::from_json(br#"{"email":"alice@mit.edu","groups":[{"id":1}]}"#)
			.expect("Arbitrary claim values should be preserved.");

		assert_eq!(profile.claim("groups"), Some(&json!([{ "id": 1 }])));
	}
}
