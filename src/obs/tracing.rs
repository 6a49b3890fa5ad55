// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome},
};

/// One login attempt: its `oauth2_gatekeeper.flow` span and its outcome counter.
///
/// Starting an attempt counts [`FlowOutcome::Attempt`]; [`FlowAttempt::finish`] consumes the
/// attempt, so each attempt reports exactly one terminal outcome.
#[must_use = "An attempt should end with `finish`."]
#[derive(Debug)]
pub struct FlowAttempt {
	kind: FlowKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowAttempt {
	/// Opens the span for `operation` against `provider` and counts the attempt.
	pub fn start(kind: FlowKind, operation: &'static str, provider: &str) -> Self {
		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_gatekeeper.flow",
				flow = kind.as_str(),
				operation,
				provider
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, provider);

			Self { kind }
		}
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Awaits `fut` inside the span without holding a guard across `.await` points.
	pub async fn run<F>(&self, fut: F) -> F::Output
	where
		F: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone()).await
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut.await
		}
	}

	/// Records the terminal outcome and closes the attempt.
	pub fn finish(self, outcome: FlowOutcome) {
		obs::record_flow_outcome(self.kind, outcome);

		#[cfg(feature = "tracing")]
		self.span.in_scope(|| match outcome {
			FlowOutcome::Failure => tracing::warn!(outcome = outcome.as_str(), "Flow failed."),
			_ => tracing::debug!(outcome = outcome.as_str(), "Flow finished."),
		});
	}
}
