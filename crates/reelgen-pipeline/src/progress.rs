//! Progress and status broadcasting.

use std::sync::Arc;

use tokio::sync::watch;

use reelgen_models::{PipelinePhase, PipelineState, RunId};

/// Single-writer owner of the pipeline run state.
///
/// Mutations happen synchronously through the orchestrator's own sequential
/// continuations; the updated snapshot is visible to subscribers before the
/// caller reaches its next await point. Observers hold a
/// [`watch::Receiver`] and only ever see clones.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<PipelineState>>,
}

impl ProgressTracker {
    /// Create a tracker in the idle state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PipelineState::idle());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.tx.subscribe()
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> PipelineState {
        self.tx.borrow().clone()
    }

    /// Reset the state for a new run: progress 0, empty message, running.
    pub fn begin(&self, run_id: RunId) {
        self.tx.send_modify(|state| {
            *state = PipelineState::started(run_id);
        });
    }

    /// Advance progress, clamped to 100. Never decreases; cannot fail.
    pub fn advance(&self, delta: u8) {
        self.tx.send_modify(|state| {
            state.progress = state.progress.saturating_add(delta).min(100);
            state.touch();
        });
    }

    /// Update the status line.
    pub fn set_message(&self, text: impl Into<String>) {
        self.tx.send_modify(|state| {
            state.status_message = text.into();
            state.touch();
        });
    }

    /// Move to another stage.
    pub fn set_phase(&self, phase: PipelinePhase) {
        self.tx.send_modify(|state| {
            state.phase = phase;
            state.touch();
        });
    }

    /// Record a successful run: video URL, done phase, completion message.
    pub fn complete(&self, video_url: &str) {
        self.tx.send_modify(|state| {
            state.phase = PipelinePhase::Done;
            state.video_url = Some(video_url.to_string());
            state.status_message = "Video generation complete.".to_string();
            state.touch();
        });
    }

    /// Record a failed run: the failure text overwrites the status line.
    pub fn fail(&self, reason: &str) {
        self.tx.send_modify(|state| {
            state.phase = PipelinePhase::Failed;
            state.last_error = Some(reason.to_string());
            state.status_message = reason.to_string();
            state.touch();
        });
    }

    /// Clear the running flag once the terminal outcome has settled.
    pub fn settle(&self) {
        self.tx.send_modify(|state| {
            state.is_running = false;
            state.touch();
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
