// self
use crate::obs::{DecisionOutcome, FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_gatekeeper_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a terminal policy decision via the global metrics recorder (when enabled).
pub fn record_decision_outcome(outcome: DecisionOutcome, reason: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_gatekeeper_decision_total",
			"outcome" => outcome.as_str(),
			"reason" => reason
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (outcome, reason);
	}
}
