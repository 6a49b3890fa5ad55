// std
use std::sync::Arc;
// self
use oauth2_gatekeeper::{
	auth::{EmailDomain, Profile, Username},
	policy::{
		AuthorizationPolicy, Decision, ExplicitAllowList, GroupMembership, GroupRecord,
		MemoryGroupDatabase, Rejection, UsernameMap,
	},
};

fn name(value: &str) -> Username {
	Username::new(value).expect("Username fixture should be valid.")
}

fn staff_database() -> Arc<MemoryGroupDatabase> {
	Arc::new(MemoryGroupDatabase::from_records([GroupRecord::new("staff", ["alice", "robert"])]))
}

fn remap() -> UsernameMap {
	UsernameMap::from_pairs([("bob", "robert")]).expect("Remap fixture should be valid.")
}

fn email(value: &str) -> Profile {
	Profile::with_email(value)
}

#[test]
fn rejects_emails_outside_the_domain() {
	let policy = AuthorizationPolicy::default();

	assert_eq!(policy.decide(&email("alice@example.com")), None);
	assert_eq!(policy.decide(&email("")), None);
	assert_eq!(policy.decide(&Profile::default()), None);
	assert_eq!(policy.decide(&email("alice@mit.edu.evil.com")), None);
}

#[test]
fn rejects_empty_local_part() {
	assert_eq!(
		AuthorizationPolicy::default().evaluate(&email("@mit.edu")),
		Decision::Rejected(Rejection::EmptyLocalPart)
	);
}

#[test]
fn accepts_plain_local_part_without_group() {
	assert_eq!(AuthorizationPolicy::default().decide(&email("alice@mit.edu")), Some(name("alice")));
}

#[test]
fn any_non_empty_local_part_is_accepted_verbatim() {
	let policy = AuthorizationPolicy::default();
	let long = "a".repeat(129);

	assert_eq!(policy.decide(&email("al ice@mit.edu")), Some(name("al ice")));
	assert_eq!(policy.decide(&email(&format!("{long}@mit.edu"))), Some(name(&long)));
	assert_eq!(policy.decide(&email("a@b@mit.edu")), Some(name("a")));
}

#[test]
fn remapped_name_is_checked_against_the_group() {
	let policy = AuthorizationPolicy::default()
		.with_username_map(remap())
		.with_allow_list(GroupMembership::required("staff", staff_database()));

	assert_eq!(policy.decide(&email("bob@mit.edu")), Some(name("robert")));

	let without_remap = AuthorizationPolicy::default()
		.with_allow_list(GroupMembership::required("staff", staff_database()));

	assert_eq!(without_remap.decide(&email("bob@mit.edu")), None);
}

#[test]
fn required_group_admits_only_members() {
	let policy = AuthorizationPolicy::default()
		.with_allow_list(GroupMembership::required("staff", staff_database()));

	assert_eq!(policy.decide(&email("alice@mit.edu")), Some(name("alice")));
	assert_eq!(
		policy.evaluate(&email("carol@mit.edu")),
		Decision::Rejected(Rejection::Denied { allow_list: "group" })
	);
}

#[test]
fn missing_group_fails_closed() {
	let policy = AuthorizationPolicy::default()
		.with_allow_list(GroupMembership::required("ghost", staff_database()));

	for candidate in ["alice@mit.edu", "robert@mit.edu", "carol@mit.edu"] {
		assert_eq!(policy.decide(&email(candidate)), None, "{candidate} must be denied.");
	}
}

#[test]
fn unset_group_fails_open() {
	let empty = AuthorizationPolicy::default()
		.with_username_map(remap())
		.with_allow_list(GroupMembership::disabled(MemoryGroupDatabase::default()));
	let populated = AuthorizationPolicy::default()
		.with_username_map(remap())
		.with_allow_list(GroupMembership::disabled(staff_database()));

	for policy in [&empty, &populated] {
		assert_eq!(policy.decide(&email("carol@mit.edu")), Some(name("carol")));
		assert_eq!(policy.decide(&email("bob@mit.edu")), Some(name("robert")));
	}
}

#[test]
fn group_changes_apply_to_the_next_decision() {
	let database = staff_database();
	let policy = AuthorizationPolicy::default()
		.with_allow_list(GroupMembership::required("staff", database.clone()));

	assert_eq!(policy.decide(&email("carol@mit.edu")), None);

	database.insert(GroupRecord::new("staff", ["alice", "robert", "carol"]));

	assert_eq!(policy.decide(&email("carol@mit.edu")), Some(name("carol")));
}

#[test]
fn explicit_allow_list_and_group_must_both_pass() {
	let policy = AuthorizationPolicy::default()
		.with_allow_list(
			ExplicitAllowList::from_names(["alice", "carol"]).expect("Allow-list should be valid."),
		)
		.with_allow_list(GroupMembership::required("staff", staff_database()));

	assert_eq!(policy.decide(&email("alice@mit.edu")), Some(name("alice")));
	assert_eq!(policy.decide(&email("carol@mit.edu")), None);
	assert_eq!(policy.decide(&email("robert@mit.edu")), None);
}

#[test]
fn custom_domain_replaces_default() {
	let domain = EmailDomain::new("example.edu").expect("Domain fixture should be valid.");
	let policy = AuthorizationPolicy::new(domain);

	assert_eq!(policy.decide(&email("alice@example.edu")), Some(name("alice")));
	assert_eq!(policy.decide(&email("alice@mit.edu")), None);
}

#[test]
fn decisions_are_idempotent() {
	let policy = AuthorizationPolicy::default()
		.with_username_map(remap())
		.with_allow_list(GroupMembership::required("staff", staff_database()));

	for candidate in ["alice@mit.edu", "bob@mit.edu", "carol@mit.edu", "@mit.edu", "x@y.z"] {
		let profile = email(candidate);

		assert_eq!(policy.evaluate(&profile), policy.evaluate(&profile));
	}
}

#[test]
fn policy_is_shareable_across_threads() {
	let policy = Arc::new(
		AuthorizationPolicy::default()
			.with_allow_list(GroupMembership::required("staff", staff_database())),
	);
	let handles = ["alice", "robert", "carol"]
		.into_iter()
		.map(|user| {
			let policy = policy.clone();

			std::thread::spawn(move || policy.decide(&email(&format!("{user}@mit.edu"))))
		})
		.collect::<Vec<_>>();
	let results = handles
		.into_iter()
		.map(|handle| handle.join().expect("Decision thread should not panic."))
		.collect::<Vec<_>>();

	assert_eq!(results, vec![Some(name("alice")), Some(name("robert")), None]);
}
