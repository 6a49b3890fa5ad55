//! Observability helpers for login flows and policy decisions.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `oauth2_gatekeeper.flow`
//!   with the `flow`, `operation`, and `provider` fields, plus one leveled event per policy
//!   decision point.
//! - Enable `metrics` to increment the `oauth2_gatekeeper_flow_total` counter for every
//!   attempt/success/rejection/failure, labeled by `flow` + `outcome`, and the
//!   `oauth2_gatekeeper_decision_total` counter labeled by `outcome` + `reason`.

mod event;
mod metrics;
mod tracing;

pub use event::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Login flow stages observed by the authenticator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Building the provider redirect for the login-initiation route.
	Login,
	/// Handling the provider callback (code exchange + userinfo + policy).
	Callback,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::Callback => "callback",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an authenticator helper.
	Attempt,
	/// Successful completion.
	Success,
	/// The attempt finished normally but the user was turned away.
	Rejected,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Rejected => "rejected",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
