//! Product routing: the two video pipelines sharing one engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which product pipeline a run belongs to.
///
/// Both products share the same stage shape; they differ in the
/// narrative/assembly endpoints and in whether scene prompts are resolved
/// to media references or handed to the assembler as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Illustrated story: scene prompts are image prompts, resolved to
    /// image URLs before assembly
    AnimatedStory,
    /// Motivational short: scene prompts are video prompts, passed through
    /// to the assembler unresolved
    Motivational,
}

impl Product {
    /// Endpoint path of the narrative (story/script) service.
    pub fn narrative_path(&self) -> &'static str {
        match self {
            Product::AnimatedStory => "/animated_story/get_story",
            Product::Motivational => "/video_motivation/get_motivational",
        }
    }

    /// Endpoint path of the video assembly service.
    pub fn assembly_path(&self) -> &'static str {
        match self {
            Product::AnimatedStory => "/animated_story/video_animated_editor",
            Product::Motivational => "/video_motivation/motivation_video_editor",
        }
    }

    /// Whether scene prompts are resolved to media references.
    pub fn resolves_media(&self) -> bool {
        matches!(self, Product::AnimatedStory)
    }

    /// Get string representation of the product.
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::AnimatedStory => "animated_story",
            Product::Motivational => "motivational",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "animated_story" | "animation" | "story" => Ok(Product::AnimatedStory),
            "motivational" | "motivation" => Ok(Product::Motivational),
            other => Err(format!("unknown product: {other}")),
        }
    }
}
