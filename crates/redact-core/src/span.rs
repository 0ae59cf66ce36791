//! Span domain model

use serde::{Deserialize, Serialize};

use crate::EntityKind;

/// Detector-specific diagnostic fields
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// Half-open interval `[start, end)` over a text buffer, in code points.
///
/// `text` is the substring at detection time and may be stale once the
/// buffer changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "typ")]
    pub kind: EntityKind,
    pub text: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub meta: Meta,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        kind: EntityKind,
        text: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end: end.max(start),
            kind,
            text: text.into(),
            replacement: replacement.into(),
            score: None,
            meta: Meta::new(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Degenerate spans are dropped before resolution
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}
