//! Group database read from a `group(5)`-formatted file such as `/etc/group`.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	policy::{GroupDatabase, GroupLookupError, GroupRecord},
};

/// Path of the system group database on Unix hosts.
pub const DEFAULT_GROUP_FILE: &str = "/etc/group";

/// Group database backed by a colon-separated `name:password:gid:members` file.
///
/// The file is re-read on every lookup so membership changes apply to the next login
/// without restarting the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupFile {
	path: PathBuf,
}
impl GroupFile {
	/// Reads groups from `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Path of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Finds `name` in the contents of a group file.
	///
	/// Malformed lines are skipped unless they belong to the requested group.
	pub fn find(contents: &str, name: &str) -> Result<Option<GroupRecord>, GroupLookupError> {
		for (idx, line) in contents.lines().enumerate() {
			let line = line.trim_end_matches('\r');

			if line.trim().is_empty() || line.starts_with('#') {
				continue;
			}

			let mut fields = line.split(':');

			if fields.next() != Some(name) {
				continue;
			}

			let (Some(_password), Some(gid), Some(members), None) =
				(fields.next(), fields.next(), fields.next(), fields.next())
			else {
				return Err(GroupLookupError::Malformed { group: name.into(), line: idx + 1 });
			};
			let gid = if gid.is_empty() {
				None
			} else {
				Some(gid.parse::<u32>().map_err(|_| GroupLookupError::Malformed {
					group: name.into(),
					line: idx + 1,
				})?)
			};
			let members = members
				.split(',')
				.map(str::trim)
				.filter(|member| !member.is_empty())
				.map(str::to_owned)
				.collect();

			return Ok(Some(GroupRecord { name: name.into(), gid, members }));
		}

		Ok(None)
	}
}
impl Default for GroupFile {
	fn default() -> Self {
		Self::new(DEFAULT_GROUP_FILE)
	}
}
impl GroupDatabase for GroupFile {
	fn group(&self, name: &str) -> Result<Option<GroupRecord>, GroupLookupError> {
		let contents = fs::read_to_string(&self.path)
			.map_err(|source| GroupLookupError::Io { path: self.path.clone(), source })?;

		Self::find(&contents, name)
	}
}
