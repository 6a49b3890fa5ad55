//! Authorization policy: the pure decision pipeline that turns a provider profile into a
//! canonical platform username.
//!
//! The pipeline is fixed (domain check, local-part extraction, username remapping,
//! allow-lists) and terminal at the first rejection. What varies between deployments is
//! the set of [`AllowList`] capabilities it consults, selected by configuration:
//! [`Unrestricted`], [`ExplicitAllowList`], or [`GroupMembership`] backed by any
//! [`GroupDatabase`].
//!
//! Rejections are uniform. [`AuthorizationPolicy::decide`] returns `None` for every kind of
//! denial, and only the structured events emitted through [`obs::record_policy_event`]
//! say why.

pub mod allow;
pub mod group;
pub mod remap;

pub use allow::*;
pub use group::*;
pub use remap::*;

// self
use crate::{
	_prelude::*,
	auth::{EmailDomain, Profile, Username},
	obs::{self, PolicyEvent},
};

/// Reason a profile was turned away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
	/// The email claim is missing or does not end with `@<domain>`.
	DomainMismatch,
	/// Nothing precedes the `@` of the email claim.
	EmptyLocalPart,
	/// An allow-list refused the canonical username.
	Denied {
		/// Label of the refusing allow-list.
		allow_list: &'static str,
	},
}

/// Outcome of [`AuthorizationPolicy::evaluate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
	/// Every check passed.
	Accepted(Username),
	/// The profile was turned away.
	Rejected(Rejection),
}
impl Decision {
	/// Returns the canonical username on acceptance.
	pub fn into_username(self) -> Option<Username> {
		match self {
			Decision::Accepted(username) => Some(username),
			Decision::Rejected(_) => None,
		}
	}

	/// Returns true when the profile was accepted.
	pub fn is_accepted(&self) -> bool {
		matches!(self, Decision::Accepted(_))
	}
}

/// Domain-restricted authorization pipeline with pluggable allow-lists.
///
/// The policy holds only immutable configuration, so a single instance can serve any number
/// of concurrent login attempts. Its result depends on the profile, the configuration, and
/// whatever the allow-lists read at decision time (for example a group database snapshot).
#[derive(Clone)]
pub struct AuthorizationPolicy {
	domain: EmailDomain,
	suffix: String,
	username_map: UsernameMap,
	allow_lists: Vec<Arc<dyn AllowList>>,
}
impl AuthorizationPolicy {
	/// Creates a policy restricted to `domain`, with no remapping and no allow-lists.
	pub fn new(domain: EmailDomain) -> Self {
		let suffix = domain.suffix();

		Self { domain, suffix, username_map: UsernameMap::default(), allow_lists: Vec::new() }
	}

	/// Replaces the username remapping table.
	pub fn with_username_map(mut self, username_map: UsernameMap) -> Self {
		self.username_map = username_map;

		self
	}

	/// Appends an allow-list; every configured allow-list must accept the username.
	pub fn with_allow_list(mut self, allow_list: impl AllowList + 'static) -> Self {
		self.allow_lists.push(Arc::new(allow_list));

		self
	}

	/// Appends an already shared allow-list.
	pub fn with_shared_allow_list(mut self, allow_list: Arc<dyn AllowList>) -> Self {
		self.allow_lists.push(allow_list);

		self
	}

	/// Institutional domain accepted by the policy.
	pub fn domain(&self) -> &EmailDomain {
		&self.domain
	}

	/// Username remapping table applied after local-part extraction.
	pub fn username_map(&self) -> &UsernameMap {
		&self.username_map
	}

	/// Labels of the configured allow-lists, in evaluation order.
	pub fn allow_list_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.allow_lists.iter().map(|allow_list| allow_list.label())
	}

	/// Returns the canonical username for an accepted profile, `None` otherwise.
	pub fn decide(&self, profile: &Profile) -> Option<Username> {
		self.evaluate(profile).into_username()
	}

	/// Runs the pipeline and reports why a profile was rejected.
	pub fn evaluate(&self, profile: &Profile) -> Decision {
		let email = profile.email();

		if !email.ends_with(&self.suffix) {
			obs::record_policy_event(&PolicyEvent::DomainMismatch { email, suffix: &self.suffix });

			return Decision::Rejected(Rejection::DomainMismatch);
		}

		let local_part = local_part(email);
		// Username validation only rejects the empty string.
		let Ok(raw) = Username::new(local_part) else {
			obs::record_policy_event(&PolicyEvent::EmptyLocalPart { email });

			return Decision::Rejected(Rejection::EmptyLocalPart);
		};
		let username = self.username_map.resolve(raw);

		if username.as_ref() != local_part {
			obs::record_policy_event(&PolicyEvent::Remapped { from: local_part, to: &username });
		}

		if let Some(denier) =
			self.allow_lists.iter().find(|allow_list| !allow_list.is_allowed(&username))
		{
			let allow_list = denier.label();

			obs::record_policy_event(&PolicyEvent::AllowListDenied {
				username: &username,
				allow_list,
			});

			return Decision::Rejected(Rejection::Denied { allow_list });
		}

		obs::record_policy_event(&PolicyEvent::Accepted { username: &username });

		Decision::Accepted(username)
	}
}
impl Default for AuthorizationPolicy {
	fn default() -> Self {
		Self::new(EmailDomain::default())
	}
}
impl Debug for AuthorizationPolicy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationPolicy")
			.field("domain", &self.domain)
			.field("username_map", &self.username_map)
			.field("allow_lists", &self.allow_list_labels().collect::<Vec<_>>())
			.finish()
	}
}

/// Substring before the first `@`.
fn local_part(email: &str) -> &str {
	email.split_once('@').map_or(email, |(local, _)| local)
}
