//! Group-membership allow-list and the group databases it reads.
//!
//! With no required group configured the check is disabled and every user passes; this is
//! logged on each decision so operators can see it. A configured group that does not exist,
//! or a database that cannot be read, denies every user.

pub mod file;
pub mod memory;

pub use file::*;
pub use memory::*;

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::Username,
	obs::{self, PolicyEvent},
	policy::AllowList,
};

/// Errors raised while reading a group database.
#[derive(Debug, ThisError)]
pub enum GroupLookupError {
	/// The backing file could not be read.
	#[error("Group database {} could not be read.", path.display())]
	Io {
		/// Path that was read.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// The entry for the requested group is malformed.
	#[error("Group database entry for `{group}` is malformed at line {line}.")]
	Malformed {
		/// Requested group.
		group: String,
		/// One-based line number of the malformed entry.
		line: usize,
	},
	/// A non-file backend failed.
	#[error("Group database backend failed: {message}.")]
	Backend {
		/// Backend-supplied failure summary.
		message: String,
	},
}

/// A group record as stored in the system group database.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupRecord {
	/// Group name.
	pub name: String,
	/// Numeric group id, when the backend exposes one.
	pub gid: Option<u32>,
	/// Explicit member list. Users whose primary group this is are not listed.
	pub members: Vec<String>,
}
impl GroupRecord {
	/// Creates a record with the provided members and no gid.
	pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { name: name.into(), gid: None, members: members.into_iter().map(Into::into).collect() }
	}

	/// Returns true when `username` appears in the explicit member list.
	pub fn has_member(&self, username: &str) -> bool {
		self.members.iter().any(|member| member == username)
	}
}

/// Read-only lookup of groups by name.
///
/// `Ok(None)` means the group does not exist, which callers treat differently from a
/// group that exists without the user in it.
pub trait GroupDatabase: Send + Sync {
	/// Looks up a group record by name.
	fn group(&self, name: &str) -> Result<Option<GroupRecord>, GroupLookupError>;
}
impl<T> GroupDatabase for Arc<T>
where
	T: ?Sized + GroupDatabase,
{
	fn group(&self, name: &str) -> Result<Option<GroupRecord>, GroupLookupError> {
		(**self).group(name)
	}
}

/// Allow-list admitting only direct members of a required group.
#[derive(Clone, Debug)]
pub struct GroupMembership<G> {
	group: Option<String>,
	database: G,
}
impl<G> GroupMembership<G>
where
	G: GroupDatabase,
{
	/// Label reported when this allow-list refuses a user.
	pub const LABEL: &'static str = "group";

	/// Creates the allow-list; `None` or an empty group name disables the check.
	pub fn new(group: Option<String>, database: G) -> Self {
		Self { group: group.filter(|name| !name.is_empty()), database }
	}

	/// Requires membership in `group`.
	pub fn required(group: impl Into<String>, database: G) -> Self {
		Self::new(Some(group.into()), database)
	}

	/// Admits everyone, logging that the check is disabled.
	pub fn disabled(database: G) -> Self {
		Self::new(None, database)
	}

	/// Configured group name, if the check is enabled.
	pub fn group(&self) -> Option<&str> {
		self.group.as_deref()
	}

	/// Underlying group database.
	pub fn database(&self) -> &G {
		&self.database
	}
}
impl<G> AllowList for GroupMembership<G>
where
	G: GroupDatabase,
{
	fn is_allowed(&self, username: &Username) -> bool {
		let Some(group) = self.group.as_deref() else {
			obs::record_policy_event(&PolicyEvent::GroupCheckDisabled { username });

			return true;
		};

		match self.database.group(group) {
			Ok(Some(record)) => record.has_member(username),
			Ok(None) => {
				obs::record_policy_event(&PolicyEvent::GroupMissing { group });

				false
			},
			Err(e) => {
				obs::record_policy_event(&PolicyEvent::GroupLookupFailed { group, error: &e });

				false
			},
		}
	}

	fn label(&self) -> &'static str {
		Self::LABEL
	}
}
