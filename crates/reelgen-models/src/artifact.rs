//! Scene artifacts and assembly wire payloads.

use serde::{Deserialize, Serialize};

/// The result of resolving one scene: a media reference paired with the
/// scene's narration text.
///
/// Artifacts correspond 1:1, order-preserving, with their source scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneArtifact {
    /// Resolved media reference (image URL, or the raw video prompt for
    /// products that pass prompts through to the assembler)
    pub media_ref: String,
    /// Narration text, carried over unchanged from the source scene
    pub sentences: String,
    /// Narration audio reference, present only when audio resolution is
    /// enabled; consumed by the post-run cleanup call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
}

impl SceneArtifact {
    /// Create an artifact with no audio reference.
    pub fn new(media_ref: impl Into<String>, sentences: impl Into<String>) -> Self {
        Self {
            media_ref: media_ref.into(),
            sentences: sentences.into(),
            audio_ref: None,
        }
    }
}

/// Request body for the video assembly endpoint.
///
/// The wire format is a list of `[media_ref, sentences]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyRequest {
    /// Ordered scene data pairs
    pub scene_data: Vec<(String, String)>,
}

impl AssemblyRequest {
    /// Build the wire payload from an ordered artifact list.
    pub fn from_artifacts(artifacts: &[SceneArtifact]) -> Self {
        Self {
            scene_data: artifacts
                .iter()
                .map(|artifact| (artifact.media_ref.clone(), artifact.sentences.clone()))
                .collect(),
        }
    }
}

/// Request body for the best-effort media cleanup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupRequest {
    /// Media references to delete
    pub audio_urls: Vec<String>,
}
