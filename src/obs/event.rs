//! Structured, leveled events emitted at each authorization decision point.
//!
//! Events carry no control-flow meaning: the policy decides first and reports afterwards.

// self
use crate::{_prelude::*, obs};

/// Terminal decision labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionOutcome {
	/// The canonical username was returned.
	Accepted,
	/// The attempt was turned away.
	Denied,
}
impl DecisionOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DecisionOutcome::Accepted => "accepted",
			DecisionOutcome::Denied => "denied",
		}
	}
}
impl Display for DecisionOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Decision points reported by the authorization policy and its allow-lists.
#[derive(Clone, Copy)]
pub enum PolicyEvent<'a> {
	/// The email claim is missing or belongs to another domain.
	DomainMismatch {
		/// Email claim as released by the provider (may be empty).
		email: &'a str,
		/// Required `@<domain>` suffix.
		suffix: &'a str,
	},
	/// Nothing precedes the `@` of the email claim.
	EmptyLocalPart {
		/// Email claim as released by the provider.
		email: &'a str,
	},
	/// The local part was rewritten through the username map.
	Remapped {
		/// Raw local part.
		from: &'a str,
		/// Canonical name it maps to.
		to: &'a str,
	},
	/// An allow-list refused the canonical username.
	AllowListDenied {
		/// Canonical username.
		username: &'a str,
		/// Label of the refusing allow-list.
		allow_list: &'static str,
	},
	/// No required group is configured; the group allow-list lets everyone through.
	GroupCheckDisabled {
		/// Canonical username.
		username: &'a str,
	},
	/// The required group does not exist; every user is denied.
	GroupMissing {
		/// Configured group name.
		group: &'a str,
	},
	/// The group database could not be read; every user is denied.
	GroupLookupFailed {
		/// Configured group name.
		group: &'a str,
		/// Lookup failure.
		error: &'a dyn Display,
	},
	/// Every check passed.
	Accepted {
		/// Canonical username returned to the platform.
		username: &'a str,
	},
}
impl PolicyEvent<'_> {
	/// Stable machine-readable label for the event.
	pub const fn label(&self) -> &'static str {
		match self {
			PolicyEvent::DomainMismatch { .. } => "wrong_domain",
			PolicyEvent::EmptyLocalPart { .. } => "empty_local_part",
			PolicyEvent::Remapped { .. } => "remapped",
			PolicyEvent::AllowListDenied { .. } => "allow_list_denied",
			PolicyEvent::GroupCheckDisabled { .. } => "group_check_disabled",
			PolicyEvent::GroupMissing { .. } => "group_missing",
			PolicyEvent::GroupLookupFailed { .. } => "group_lookup_failed",
			PolicyEvent::Accepted { .. } => "accepted",
		}
	}

	/// Terminal outcome carried by the event, if it ends the pipeline.
	pub const fn outcome(&self) -> Option<DecisionOutcome> {
		match self {
			PolicyEvent::DomainMismatch { .. }
			| PolicyEvent::EmptyLocalPart { .. }
			| PolicyEvent::AllowListDenied { .. } => Some(DecisionOutcome::Denied),
			PolicyEvent::Accepted { .. } => Some(DecisionOutcome::Accepted),
			PolicyEvent::Remapped { .. }
			| PolicyEvent::GroupCheckDisabled { .. }
			| PolicyEvent::GroupMissing { .. }
			| PolicyEvent::GroupLookupFailed { .. } => None,
		}
	}
}

/// Emits a policy event through `tracing` and, for terminal events, the decision counter.
pub fn record_policy_event(event: &PolicyEvent<'_>) {
	if let Some(outcome) = event.outcome() {
		obs::record_decision_outcome(outcome, event.label());
	}

	#[cfg(feature = "tracing")]
	{
		let label = event.label();

		match *event {
			PolicyEvent::DomainMismatch { email, suffix } => {
				tracing::info!(event = label, email, suffix, "Rejected email outside the domain.")
			},
			PolicyEvent::EmptyLocalPart { email } => {
				tracing::info!(event = label, email, "Rejected email with an empty local part.")
			},
			PolicyEvent::Remapped { from, to } => {
				tracing::debug!(event = label, from, to, "Remapped username.")
			},
			PolicyEvent::AllowListDenied { username, allow_list } => tracing::info!(
				event = label,
				username,
				allow_list,
				"Allow-list denied username."
			),
			PolicyEvent::GroupCheckDisabled { username } => tracing::warn!(
				event = label,
				username,
				"No required group is configured; group membership check is disabled."
			),
			PolicyEvent::GroupMissing { group } => tracing::warn!(
				event = label,
				group,
				"Required group does not exist; denying every user."
			),
			PolicyEvent::GroupLookupFailed { group, error } => tracing::warn!(
				event = label,
				group,
				%error,
				"Group database lookup failed; denying user."
			),
			PolicyEvent::Accepted { username } => {
				tracing::info!(event = label, username, "Accepted username.")
			},
		}
	}
}
