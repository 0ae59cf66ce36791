//! Candidate scoring
//!
//! Every detector and recognizer hit becomes a [`Candidate`] carrying raw
//! feature values. The scorer fills in the context features, combines them
//! linearly and keeps candidates that reach the threshold for their kind.

use redact_core::{EntityKind, Meta, Span, TextIndex};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::trace;

use crate::lexicon::{ADDRESS_CONTEXT, is_first_name, is_stop_unit};
use crate::signals::Morphology;

/// Context window around a candidate, in characters
const CONTEXT_WINDOW: usize = 24;

/// Weights of the linear scoring model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub ner: f64,
    pub regex: f64,
    pub dict: f64,
    pub ctx: f64,
    pub penalty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            ner: 1.0,
            regex: 1.0,
            dict: 0.1,
            ctx: 0.1,
            penalty: 1.0,
        }
    }
}

/// Minimum score per kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    #[serde(alias = "SNILS")]
    pub snils: f64,
    #[serde(alias = "PHONE")]
    pub phone: f64,
    #[serde(alias = "ADDR")]
    pub addr: f64,
    #[serde(alias = "PER")]
    pub per: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            snils: 0.5,
            phone: 0.5,
            addr: 0.5,
            per: 0.5,
        }
    }
}

impl Thresholds {
    pub fn for_kind(&self, kind: EntityKind) -> f64 {
        match kind {
            EntityKind::NationalId => self.snils,
            EntityKind::Phone => self.phone,
            EntityKind::Address => self.addr,
            EntityKind::Person => self.per,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    pub weights: Weights,
    pub thresholds: Thresholds,
}

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Pattern,
    Recognizer,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateSource::Pattern => "regex",
            CandidateSource::Recognizer => "ner",
        }
    }
}

/// A detection before scoring and resolution. Offsets are code points.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub kind: EntityKind,
    pub source: CandidateSource,
    pub ner_prob: f64,
    pub regex_strength: f64,
    pub dict_hit: f64,
    pub ctx_feat: f64,
    pub penalty: f64,
    /// Canonical form, when the kind has one
    pub norm: Option<String>,
    /// Detector-specific fields
    pub meta: Meta,
    /// False only for national ids failing their checksum
    pub valid: bool,
}

impl Candidate {
    pub fn new(start: usize, end: usize, kind: EntityKind, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            kind,
            source: CandidateSource::Pattern,
            ner_prob: 0.0,
            regex_strength: 0.0,
            dict_hit: 0.0,
            ctx_feat: 0.0,
            penalty: 0.0,
            norm: None,
            meta: Meta::new(),
            valid: true,
        }
    }
}

pub struct Scorer<'a> {
    profile: &'a ScoringProfile,
    morphology: &'a dyn Morphology,
}

impl<'a> Scorer<'a> {
    pub fn new(profile: &'a ScoringProfile, morphology: &'a dyn Morphology) -> Self {
        Self { profile, morphology }
    }

    /// Fill the dictionary, context and penalty features
    pub fn annotate(&self, index: &TextIndex<'_>, c: &mut Candidate) {
        if c.kind != EntityKind::Person {
            c.ctx_feat = self.context_feature(index, c);
            return;
        }

        let tokens: Vec<&str> = c
            .text
            .split_whitespace()
            .map(|t| t.trim_matches(|ch: char| ch == '.' || ch == ','))
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.iter().any(|t| self.morphology.is_person_like(t)) {
            c.dict_hit = 1.0;
        }
        if tokens.len() == 1 && is_stop_unit(&c.text) {
            c.penalty = 1.0;
        }
        c.ctx_feat = self.context_feature(index, c);
    }

    fn context_feature(&self, index: &TextIndex<'_>, c: &Candidate) -> f64 {
        match c.kind {
            EntityKind::Address => {
                let left = index.slice(c.start.saturating_sub(CONTEXT_WINDOW), c.start);
                let right = index.slice(c.end, c.end + CONTEXT_WINDOW);
                let around = format!("{}{}", left, right).to_lowercase();
                f64::from(u8::from(ADDRESS_CONTEXT.iter().any(|m| around.contains(m))))
            }
            EntityKind::Person => {
                let first = c
                    .text
                    .split_whitespace()
                    .next()
                    .map(|t| t.trim_matches('.'))
                    .unwrap_or_default();
                f64::from(u8::from(is_first_name(first)))
            }
            _ => 0.0,
        }
    }

    /// Linear combination of the features
    pub fn score(&self, c: &Candidate) -> f64 {
        let w = &self.profile.weights;
        w.ner * c.ner_prob + w.regex * c.regex_strength + w.dict * c.dict_hit + w.ctx * c.ctx_feat
            - w.penalty * c.penalty
    }

    /// Score a candidate and turn it into a span if it passes.
    ///
    /// National ids with a bad checksum never pass. The stored score is
    /// clamped to `[0, 1]`; the threshold applies to the raw value.
    pub fn evaluate(&self, index: &TextIndex<'_>, mut c: Candidate) -> Option<Span> {
        if c.kind == EntityKind::NationalId && !c.valid {
            trace!("Dropping invalid national id at {}..{}", c.start, c.end);
            return None;
        }

        self.annotate(index, &mut c);
        let raw = self.score(&c);
        let threshold = self.profile.thresholds.for_kind(c.kind);
        if raw < threshold {
            trace!(
                "{} at {}..{} scored {:.2} < {:.2}",
                c.kind, c.start, c.end, raw, threshold
            );
            return None;
        }

        let mut meta = c.meta;
        meta.insert("source".to_string(), json!(c.source.as_str()));
        meta.insert(
            "score_parts".to_string(),
            json!({
                "ner": c.ner_prob,
                "regex": c.regex_strength,
                "dict": c.dict_hit,
                "ctx": c.ctx_feat,
                "penalty": c.penalty,
            }),
        );
        if let Some(norm) = &c.norm {
            meta.insert("norm".to_string(), json!(norm));
        }

        let replacement = format!("[{}]", c.kind.label());
        Some(
            Span::new(c.start, c.end, c.kind, c.text, replacement)
                .with_score(raw.clamp(0.0, 1.0))
                .with_meta(meta),
        )
    }
}
