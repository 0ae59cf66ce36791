//! Persisted documents: candidate document and apply report

use serde::{Deserialize, Serialize};

use crate::{EntityKind, Meta, Span};

/// Version tag written into every persisted document
pub const DOCUMENT_VERSION: &str = "1";

/// Unvalidated candidate record, as produced by detection or edited by hand.
///
/// Only `typ` is required; everything else is filled with defaults by the
/// validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "type")]
    pub typ: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

/// A validated, user-editable candidate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateItem {
    pub id: String,
    pub typ: EntityKind,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub norm: Option<String>,
    pub score: f64,
    pub apply: bool,
    pub replacement: String,
    #[serde(default)]
    pub meta: Meta,
}

impl CandidateItem {
    /// Default id derived from kind and offsets
    pub fn derive_id(kind: EntityKind, start: usize, end: usize) -> String {
        format!("{}:{}-{}", kind.label(), start, end)
    }

    pub fn to_span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
            kind: self.typ,
            text: self.text.clone(),
            replacement: self.replacement.clone(),
            score: Some(self.score),
            meta: self.meta.clone(),
        }
    }
}

/// Canonical unit of work between validation and apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateDocument {
    pub version: String,
    pub items: Vec<CandidateItem>,
}

impl CandidateDocument {
    pub fn new(items: Vec<CandidateItem>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            items,
        }
    }
}

/// Output of the apply step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Report {
    pub version: String,
    pub source_path: String,
    pub encoding: String,
    /// ISO-8601 UTC timestamp, second precision
    pub created_utc: String,
    pub counts: Counts,
    pub items: Vec<ReportItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Counts {
    pub total: usize,
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportItem {
    pub id: String,
    pub typ: EntityKind,
    pub start: usize,
    pub end: usize,
    pub old: String,
    pub new: String,
    /// Whether the expected text was located in the live buffer
    pub ok_slice: bool,
}
