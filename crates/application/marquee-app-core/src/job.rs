use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use marquee_core::RefreshOutcome;

use crate::orchestrator::RefreshOrchestrator;
use crate::ports::{RemoteTitlePort, TitleStorePort};

/// Tri-state result understood by deferred-job managers. This adapter
/// only ever produces `Success` or `Failure`; `Retry` is part of the
/// boundary so a scheduling policy above it can reschedule without a new
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResult {
    Success,
    Retry,
    Failure,
}

impl JobResult {
    /// Conventional process exit code for schedulers that run the job as
    /// a child process (75 is EX_TEMPFAIL).
    pub fn exit_code(self) -> i32 {
        match self {
            JobResult::Success => 0,
            JobResult::Retry => 75,
            JobResult::Failure => 1,
        }
    }
}

/// Background entry point: runs one refresh outside any UI scope and
/// translates the outcome for a job manager. Never lets an error escape
/// the boundary and touches no UI state.
pub struct RefreshJob<R, S> {
    orchestrator: Arc<RefreshOrchestrator<R, S>>,
}

impl<R, S> RefreshJob<R, S>
where
    R: RemoteTitlePort,
    S: TitleStorePort,
{
    pub fn new(orchestrator: Arc<RefreshOrchestrator<R, S>>) -> Self {
        Self { orchestrator }
    }

    pub async fn execute(&self) -> JobResult {
        // Private token: nothing above this adapter cancels a job run.
        let cancel = CancellationToken::new();
        match self
            .orchestrator
            .refresh_with_deadline(&cancel, marquee_config::DEFAULT_REFRESH_TIMEOUT)
            .await
        {
            RefreshOutcome::Success => {
                info!("background refresh succeeded");
                JobResult::Success
            }
            RefreshOutcome::Failure(err) => {
                warn!(error = %err, "background refresh failed");
                JobResult::Failure
            }
        }
    }
}
