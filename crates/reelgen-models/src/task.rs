//! Assembly task handle and status types.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a server-side assembly job.
///
/// Returned by the video submission endpoint and owned by the polling loop
/// for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    /// Remote-assigned task identifier
    pub task_id: String,
}

/// Terminal or non-terminal state of an assembly task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// The video is ready
    Completed {
        /// URL of the finished video
        video_url: String,
    },
    /// The remote task failed
    Failed {
        /// Remote-supplied failure reason
        error: String,
    },
    /// Still in progress; any status label other than
    /// `completed`/`failed` lands here
    Pending {
        /// Raw remote status label (e.g. "queued", "rendering")
        label: String,
    },
}

impl TaskStatus {
    /// Check if this is a terminal state (no further polling needed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed { .. } | TaskStatus::Failed { .. })
    }
}

/// Wire response from the task-status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    /// Remote status label
    pub status: String,
    /// Present when the task completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Present when the task failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskStatusResponse {
    /// Interpret the wire response as a task status.
    ///
    /// A `completed` status without a video URL is malformed and reported
    /// as an error string for the caller to wrap.
    pub fn into_status(self) -> Result<TaskStatus, String> {
        match self.status.as_str() {
            "completed" => match self.video_url {
                Some(video_url) => Ok(TaskStatus::Completed { video_url }),
                None => Err("status is completed but no video_url was returned".to_string()),
            },
            "failed" => Ok(TaskStatus::Failed {
                error: self
                    .error
                    .unwrap_or_else(|| "no failure detail provided".to_string()),
            }),
            _ => Ok(TaskStatus::Pending { label: self.status }),
        }
    }
}
