use std::time::Duration;

use tokio::time::Interval;

use super::periodic;
use crate::logs::LogAggregator;
use crate::steps::{StepState, STEP_LABELS};

/// Fixed-cadence step advancement. The backend has no progress channel, so
/// this only approximates where a run is; it never completes the last step.
pub(crate) struct ProgressSimulator {
    ticker: Interval,
}

impl ProgressSimulator {
    pub(crate) fn start(period: Duration) -> Self {
        Self {
            ticker: periodic(period),
        }
    }

    pub(crate) async fn tick(&mut self) {
        self.ticker.tick().await;
    }

    /// Apply one tick. Returns false once the cursor is holding on the last step.
    pub(crate) fn advance(steps: &mut StepState, logs: &mut LogAggregator) -> bool {
        match steps.advance() {
            Some(completed) => {
                logs.push_client(&format!(
                    "Step {}: {} completed",
                    completed + 1,
                    STEP_LABELS[completed]
                ));
                true
            }
            None => false,
        }
    }
}
