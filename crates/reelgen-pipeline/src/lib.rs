//! Orchestration and polling engine for video generation runs.
//!
//! Drives a single run from a topic request to a finished video URL:
//! narrative fetch, concurrent per-scene media resolution behind an ordered
//! fan-in barrier, assembly submission, and a bounded status-polling loop.
//! A single-writer progress tracker broadcasts state snapshots throughout,
//! and the first failure anywhere short-circuits the remaining stages.

pub mod config;
pub mod error;
pub mod poll;
pub mod progress;
pub mod runner;
pub mod scenes;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use poll::{poll_until_done, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
pub use progress::ProgressTracker;
pub use runner::VideoPipeline;
pub use scenes::{resolve_scenes, SceneOptions, SceneOutcome};
