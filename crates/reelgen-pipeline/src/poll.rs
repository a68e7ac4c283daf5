//! Bounded status polling for assembly tasks.

use std::time::Duration;

use tracing::{debug, warn};

use reelgen_gateway::GenerationClient;
use reelgen_models::{TaskHandle, TaskStatus};

use crate::error::{PipelineError, PipelineResult};
use crate::progress::ProgressTracker;

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default maximum poll attempts (a ~10-minute ceiling at the default
/// interval).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Poll the task status until a terminal outcome or budget exhaustion.
///
/// The loop is strictly sequential: sleep, then one in-flight status query
/// at a time. Returning — on success, failure, or timeout — is the
/// cancellation guarantee; no timer survives a terminal outcome.
///
/// - `Completed` resolves to the video URL.
/// - `Failed` surfaces the remote-supplied reason.
/// - `Pending` updates the status line and consumes one attempt; running
///   out of attempts is reported as [`PipelineError::TimeoutExhausted`].
/// - Any gateway error aborts immediately; a single failed poll is not
///   retried.
pub async fn poll_until_done(
    gateway: &GenerationClient,
    task: &TaskHandle,
    tracker: &ProgressTracker,
    interval: Duration,
    max_attempts: u32,
) -> PipelineResult<String> {
    for attempt in 1..=max_attempts {
        tokio::time::sleep(interval).await;

        match gateway.query_status(&task.task_id).await? {
            TaskStatus::Completed { video_url } => {
                debug!(task_id = %task.task_id, attempt, "Assembly task completed");
                return Ok(video_url);
            }
            TaskStatus::Failed { error } => {
                warn!(task_id = %task.task_id, attempt, reason = %error, "Assembly task failed");
                return Err(PipelineError::assembly_failed(error));
            }
            TaskStatus::Pending { label } => {
                debug!(task_id = %task.task_id, attempt, status = %label, "Assembly task pending");
                tracker.set_message(format!("Video status: {label}..."));
            }
        }
    }

    warn!(
        task_id = %task.task_id,
        attempts = max_attempts,
        "Assembly task never reached a terminal status"
    );
    Err(PipelineError::timeout_exhausted(
        task.task_id.clone(),
        max_attempts,
    ))
}
