//! Username remapping applied between local-part extraction and the allow-lists.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, Username},
};

/// Table rewriting raw local parts into canonical platform usernames.
///
/// Keys are compared exactly against the local part of the email claim. Names without an
/// entry pass through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsernameMap(BTreeMap<String, Username>);
impl UsernameMap {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Validates and collects raw `(from, to)` pairs.
	pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, IdentifierError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: AsRef<str>,
	{
		pairs
			.into_iter()
			.map(|(from, to)| Username::new(to).map(|to| (from.into(), to)))
			.collect::<Result<BTreeMap<String, Username>, _>>()
			.map(Self)
	}

	/// Adds or replaces a mapping.
	pub fn insert(&mut self, from: impl Into<String>, to: Username) -> Option<Username> {
		self.0.insert(from.into(), to)
	}

	/// Returns the configured target for `from`, if any.
	pub fn get(&self, from: &str) -> Option<&Username> {
		self.0.get(from)
	}

	/// Number of configured mappings.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no mapping is configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Resolves a raw local part into a canonical username.
	pub fn resolve(&self, raw: Username) -> Username {
		self.0.get(raw.as_ref()).cloned().unwrap_or(raw)
	}
}
impl FromIterator<(String, Username)> for UsernameMap {
	fn from_iter<T: IntoIterator<Item = (String, Username)>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}
