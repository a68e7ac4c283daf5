//! Generation request types.

use serde::{Deserialize, Serialize};

/// A user request to generate a video from a topic.
///
/// Immutable once constructed; validated before any remote call is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRequest {
    /// The subject of the generated narrative
    pub topic: String,
    /// Narration language (e.g. "English", "Spanish", "French")
    pub language: String,
}

impl TopicRequest {
    /// Create a new request.
    pub fn new(topic: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: language.into(),
        }
    }

    /// Validate the request.
    ///
    /// An empty or whitespace-only topic is rejected here, before any
    /// network I/O happens.
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("A topic is required to generate a video".to_string());
        }

        Ok(())
    }
}
