//! Allow-list capability consulted after a username has been resolved.

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, Username},
};

/// Decides whether a canonical username may log in.
///
/// Implementations must be safe to call concurrently; any state they read (such as a group
/// database) is read at decision time.
pub trait AllowList: Send + Sync {
	/// Returns true when `username` may proceed.
	fn is_allowed(&self, username: &Username) -> bool;

	/// Stable label used in events and rejections.
	fn label(&self) -> &'static str;
}
impl<T> AllowList for Arc<T>
where
	T: ?Sized + AllowList,
{
	fn is_allowed(&self, username: &Username) -> bool {
		(**self).is_allowed(username)
	}

	fn label(&self) -> &'static str {
		(**self).label()
	}
}

/// Allow-list that admits every username.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unrestricted;
impl AllowList for Unrestricted {
	fn is_allowed(&self, _: &Username) -> bool {
		true
	}

	fn label(&self) -> &'static str {
		"unrestricted"
	}
}

/// Allow-list backed by a fixed set of usernames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplicitAllowList {
	names: BTreeSet<Username>,
}
impl ExplicitAllowList {
	/// Label reported when this allow-list refuses a user.
	pub const LABEL: &'static str = "explicit";

	/// Creates an allow-list from already validated usernames.
	pub fn new(names: impl IntoIterator<Item = Username>) -> Self {
		Self { names: names.into_iter().collect() }
	}

	/// Validates and collects raw names.
	pub fn from_names<I, S>(names: I) -> Result<Self, IdentifierError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let names = names.into_iter().map(Username::new).collect::<Result<BTreeSet<_>, _>>()?;

		Ok(Self { names })
	}

	/// Number of admitted usernames.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	/// Returns true when nobody is admitted.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Iterates over the admitted usernames in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &Username> {
		self.names.iter()
	}
}
impl AllowList for ExplicitAllowList {
	fn is_allowed(&self, username: &Username) -> bool {
		self.names.contains(username)
	}

	fn label(&self) -> &'static str {
		Self::LABEL
	}
}
