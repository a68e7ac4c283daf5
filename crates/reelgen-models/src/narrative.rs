//! Narrative and scene types returned by the story/script services.

use serde::{Deserialize, Serialize};

/// A generated narrative: the full text plus its ordered scene breakdown.
///
/// A narrative with zero scenes is valid and produces an empty aggregate
/// downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narrative {
    /// The complete generated story or script text
    pub complete_story: String,
    /// Ordered scene breakdown
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Narrative {
    /// Number of scenes in the breakdown.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }
}

/// One narrative beat: a generation prompt plus its narration text.
///
/// The animated-story service names the prompt field `image_prompt` and the
/// motivational service names it `video_prompt`; both play the same role and
/// deserialize into `prompt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Per-scene generation hint (image prompt or video prompt)
    #[serde(alias = "image_prompt", alias = "video_prompt")]
    pub prompt: String,
    /// Narration text for this scene
    pub sentences: String,
}
