//! Pipeline run state snapshots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of the pipeline state machine.
///
/// Entering any state after `Idle` requires the prior state's success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// No run started yet
    #[default]
    Idle,
    /// Waiting on the story/script service
    FetchingNarrative,
    /// Resolving per-scene media concurrently
    GeneratingScenes,
    /// Submitting the assembly job
    SubmittingVideo,
    /// Polling the assembly task status
    Polling,
    /// Run finished successfully
    Done,
    /// Run stopped on an error or timeout
    Failed,
}

impl PipelinePhase {
    /// Get string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelinePhase::Idle => "idle",
            PipelinePhase::FetchingNarrative => "fetching_narrative",
            PipelinePhase::GeneratingScenes => "generating_scenes",
            PipelinePhase::SubmittingVideo => "submitting_video",
            PipelinePhase::Polling => "polling",
            PipelinePhase::Done => "done",
            PipelinePhase::Failed => "failed",
        }
    }

    /// Check if this is a terminal phase (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Done | PipelinePhase::Failed)
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a pipeline run, as seen by observers.
///
/// Owned and mutated exclusively by the orchestrator's progress tracker;
/// everyone else reads clones. `progress` never decreases within a run and
/// never exceeds 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Identifier of the current run, if one was started
    pub run_id: Option<RunId>,
    /// Current stage
    pub phase: PipelinePhase,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable status line
    pub status_message: String,
    /// True from run start until a terminal outcome has settled
    pub is_running: bool,
    /// Failure text of the last terminal error, if any
    pub last_error: Option<String>,
    /// URL of the finished video, set only on success
    pub video_url: Option<String>,
    /// When the current run started
    pub started_at: Option<DateTime<Utc>>,
    /// When the snapshot was last updated
    pub updated_at: DateTime<Utc>,
}

impl PipelineState {
    /// The state before any run has started.
    pub fn idle() -> Self {
        Self {
            run_id: None,
            phase: PipelinePhase::Idle,
            progress: 0,
            status_message: String::new(),
            is_running: false,
            last_error: None,
            video_url: None,
            started_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Fresh state for a newly started run.
    pub fn started(run_id: RunId) -> Self {
        let now = Utc::now();
        Self {
            run_id: Some(run_id),
            phase: PipelinePhase::Idle,
            progress: 0,
            status_message: String::new(),
            is_running: true,
            last_error: None,
            video_url: None,
            started_at: Some(now),
            updated_at: now,
        }
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_state() {
        let state = PipelineState::idle();
        assert_eq!(state.phase, PipelinePhase::Idle);
        assert_eq!(state.progress, 0);
        assert!(!state.is_running);
        assert!(state.run_id.is_none());
    }

    #[test]
    fn test_started_state_is_running() {
        let state = PipelineState::started(RunId::new());
        assert!(state.is_running);
        assert!(state.started_at.is_some());
        assert!(state.last_error.is_none());
        assert!(state.video_url.is_none());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(PipelinePhase::Done.is_terminal());
        assert!(PipelinePhase::Failed.is_terminal());
        assert!(!PipelinePhase::Polling.is_terminal());
        assert!(!PipelinePhase::Idle.is_terminal());
    }
}
