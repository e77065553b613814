//! Answers returned by the answering flow

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one question; exactly one variant per question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Answer {
    /// Model-generated text
    Generated(String),
    /// Retrieved passages shown verbatim because the model was unavailable
    Fallback(String),
    /// Retrieval itself failed; carries the failure description
    Failed(String),
}

impl Answer {
    /// Text shown to the user
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Fallback(text) | Self::Failed(text) => text,
        }
    }

    /// Consume into the user-visible text
    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) | Self::Fallback(text) | Self::Failed(text) => text,
        }
    }

    /// True if the model produced this answer
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    /// True if this is the degraded passage listing
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
