//! In-memory group database for tests and embedded deployments.

// self
use crate::{
	_prelude::*,
	policy::{GroupDatabase, GroupLookupError, GroupRecord},
};

/// Thread-safe group database held in memory.
///
/// Records can be replaced at runtime; each lookup sees the snapshot present at call time.
#[derive(Debug, Default)]
pub struct MemoryGroupDatabase {
	groups: RwLock<HashMap<String, GroupRecord>>,
}
impl MemoryGroupDatabase {
	/// Creates a database seeded with the provided records.
	pub fn from_records(records: impl IntoIterator<Item = GroupRecord>) -> Self {
		let groups = records.into_iter().map(|record| (record.name.clone(), record)).collect();

		Self { groups: RwLock::new(groups) }
	}

	/// Adds or replaces a group record.
	pub fn insert(&self, record: GroupRecord) -> Option<GroupRecord> {
		self.groups.write().insert(record.name.clone(), record)
	}

	/// Removes a group record.
	pub fn remove(&self, name: &str) -> Option<GroupRecord> {
		self.groups.write().remove(name)
	}
}
impl GroupDatabase for MemoryGroupDatabase {
	fn group(&self, name: &str) -> Result<Option<GroupRecord>, GroupLookupError> {
		Ok(self.groups.read().get(name).cloned())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn lookups_see_runtime_changes() {
		let db = MemoryGroupDatabase::default();

		assert_eq!(db.group("staff").expect("Memory lookups should not fail."), None);

		db.insert(GroupRecord::new("staff", ["alice"]));

		let record = db
			.group("staff")
			.expect("Memory lookups should not fail.")
			.expect("Inserted group should be visible.");

		assert!(record.has_member("alice"));
		assert!(db.remove("staff").is_some());
		assert_eq!(db.group("staff").expect("Memory lookups should not fail."), None);
	}
}
