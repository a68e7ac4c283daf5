//! Pipeline error types.

use thiserror::Error;

use reelgen_gateway::GatewayError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal errors of a pipeline run.
///
/// None of these are retried by the orchestrator; the only bounded
/// re-attempt in the system is the polling loop's handling of a pending
/// task status, which is not an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("A run is already in progress")]
    RunInProgress,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{failed} scene request(s) failed: {cause}")]
    SceneBatch {
        failed: usize,
        #[source]
        cause: GatewayError,
    },

    #[error("Video assembly failed: {reason}")]
    AssemblyFailed { reason: String },

    #[error("Video task {task_id} still pending after {attempts} status checks")]
    TimeoutExhausted { task_id: String, attempts: u32 },
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn assembly_failed(reason: impl Into<String>) -> Self {
        Self::AssemblyFailed {
            reason: reason.into(),
        }
    }

    pub fn timeout_exhausted(task_id: impl Into<String>, attempts: u32) -> Self {
        Self::TimeoutExhausted {
            task_id: task_id.into(),
            attempts,
        }
    }

    /// Check if this error was raised before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation(_) | PipelineError::RunInProgress
        )
    }

    /// Check if this error is a polling budget exhaustion.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PipelineError::TimeoutExhausted { .. })
    }
}
