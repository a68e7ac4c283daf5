//! Concurrent per-scene media resolution with an ordered fan-in barrier.

use futures::future::join_all;
use tracing::{debug, warn};

use reelgen_gateway::{GatewayError, GenerationClient};
use reelgen_models::{Product, Scene, SceneArtifact};

use crate::error::{PipelineError, PipelineResult};

/// What each scene sub-task resolves.
#[derive(Debug, Clone, Copy)]
pub struct SceneOptions {
    /// Resolve the scene prompt to a media reference; when false the prompt
    /// is handed to the assembler as-is
    pub resolve_media: bool,
    /// Additionally resolve narration audio
    pub resolve_audio: bool,
}

impl SceneOptions {
    /// Options for a product pipeline.
    pub fn for_product(product: Product, resolve_audio: bool) -> Self {
        Self {
            resolve_media: product.resolves_media(),
            resolve_audio,
        }
    }
}

/// Tagged result of one scene sub-task.
///
/// Only `Failed` aborts the batch. `Omitted` (the gateway answered without
/// raising, but with nothing usable) drops the entry from the aggregate and
/// lets the rest proceed.
#[derive(Debug)]
pub enum SceneOutcome {
    /// The scene resolved to a usable artifact
    Resolved(SceneArtifact),
    /// The gateway returned an empty or placeholder reference
    Omitted,
    /// A gateway call hard-failed
    Failed(GatewayError),
}

/// Resolve all scenes concurrently and collect an ordered aggregate.
///
/// Every sub-task runs to completion before the batch is judged (a true
/// fan-in barrier); output order matches input scene order regardless of
/// completion order. Any hard failure discards the whole batch.
pub async fn resolve_scenes(
    gateway: &GenerationClient,
    options: SceneOptions,
    language: &str,
    scenes: &[Scene],
) -> PipelineResult<Vec<SceneArtifact>> {
    if scenes.is_empty() {
        debug!("No scenes to resolve");
        return Ok(Vec::new());
    }

    // join_all keeps results in input order, so each outcome is already
    // correlated to its originating scene index.
    let outcomes = join_all(
        scenes
            .iter()
            .map(|scene| resolve_one(gateway, options, language, scene)),
    )
    .await;

    let mut artifacts = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    let mut first_cause = None;

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            SceneOutcome::Resolved(artifact) => artifacts.push(artifact),
            SceneOutcome::Omitted => {
                debug!(scene = index, "Scene produced no media reference, dropping it");
            }
            SceneOutcome::Failed(cause) => {
                warn!(scene = index, error = %cause, "Scene resolution failed");
                failed += 1;
                if first_cause.is_none() {
                    first_cause = Some(cause);
                }
            }
        }
    }

    if let Some(cause) = first_cause {
        return Err(PipelineError::SceneBatch { failed, cause });
    }

    debug!(
        resolved = artifacts.len(),
        total = scenes.len(),
        "Scene batch resolved"
    );
    Ok(artifacts)
}

async fn resolve_one(
    gateway: &GenerationClient,
    options: SceneOptions,
    language: &str,
    scene: &Scene,
) -> SceneOutcome {
    let media_task = async {
        if options.resolve_media {
            gateway.resolve_scene_media(&scene.prompt).await
        } else {
            Ok(scene.prompt.clone())
        }
    };
    let audio_task = async {
        if options.resolve_audio {
            gateway
                .resolve_scene_audio(&scene.sentences, language)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let (media_ref, audio_ref) = match tokio::join!(media_task, audio_task) {
        (Ok(media_ref), Ok(audio_ref)) => (media_ref, audio_ref),
        (Err(cause), _) | (_, Err(cause)) => return SceneOutcome::Failed(cause),
    };

    // A scene whose media or audio came back empty is skipped, not fatal.
    if is_placeholder(&media_ref) || audio_ref.as_deref().is_some_and(is_placeholder) {
        return SceneOutcome::Omitted;
    }

    SceneOutcome::Resolved(SceneArtifact {
        media_ref,
        sentences: scene.sentences.clone(),
        audio_ref,
    })
}

fn is_placeholder(reference: &str) -> bool {
    let trimmed = reference.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("undefined")
}
