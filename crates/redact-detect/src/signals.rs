//! Signal providers consulted by detection
//!
//! Both providers are optional. Without a morphology provider every token
//! passes; without a recognizer detection relies on patterns alone.

use std::path::Path;

use redact_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token-level linguistic oracle
pub trait Morphology: Send + Sync {
    /// Could the token be (part of) a personal name?
    fn is_person_like(&self, token: &str) -> bool;
    /// Is the token a plausible first name?
    fn is_name_token(&self, token: &str) -> bool;
    /// Is the token a plausible surname?
    fn is_surname_token(&self, token: &str) -> bool;
}

/// Fallback that accepts every token
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveMorphology;

impl Morphology for PermissiveMorphology {
    fn is_person_like(&self, _token: &str) -> bool {
        true
    }

    fn is_name_token(&self, _token: &str) -> bool {
        true
    }

    fn is_surname_token(&self, _token: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NerLabel {
    #[serde(alias = "PERSON")]
    Per,
    Org,
    Loc,
    #[serde(other)]
    Other,
}

/// One entity reported by a recognizer. Offsets are code points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerSpan {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub text: String,
    pub label: NerLabel,
    #[serde(default = "default_confidence", alias = "prob", alias = "score")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

/// Named-entity recognizer
pub trait EntityRecognizer: Send + Sync {
    fn find(&self, text: &str) -> Result<Vec<NerSpan>>;
}

/// Recognizer replaying spans computed ahead of time by an external model.
///
/// Accepts a JSON array of spans or JSON lines, one span per line.
#[derive(Debug, Clone, Default)]
pub struct JsonRecognizer {
    spans: Vec<NerSpan>,
}

impl JsonRecognizer {
    pub fn new(spans: Vec<NerSpan>) -> Self {
        Self { spans }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Recognizer(format!("{}: {}", path.display(), e)))?;
        let recognizer = Self::from_json_str(&content)
            .map_err(|e| Error::Recognizer(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded {} NER spans from {:?}", recognizer.spans.len(), path);
        Ok(recognizer)
    }

    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        if content.trim_start().starts_with('[') {
            return serde_json::from_str(content).map(Self::new);
        }
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<NerSpan>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl EntityRecognizer for JsonRecognizer {
    fn find(&self, text: &str) -> Result<Vec<NerSpan>> {
        let len = text.chars().count();
        Ok(self
            .spans
            .iter()
            .filter(|s| s.start < s.end && s.end <= len)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_accepts_everything() {
        let m = PermissiveMorphology;
        assert!(m.is_person_like("Стол"));
        assert!(m.is_name_token("Казань"));
        assert!(m.is_surname_token("Макс"));
    }

    #[test]
    fn test_json_array() {
        let r = JsonRecognizer::from_json_str(
            r#"[{"start":0,"end":4,"text":"Макс","label":"PER","prob":0.9},
                {"start":5,"end":11,"label":"LOC"}]"#,
        )
        .unwrap();
        let spans = r.find("Макс Казань").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, NerLabel::Per);
        assert_eq!(spans[0].confidence, 0.9);
        assert_eq!(spans[1].confidence, 1.0);
    }

    #[test]
    fn test_json_lines_and_unknown_label() {
        let r = JsonRecognizer::from_json_str(
            "{\"start\":0,\"end\":4,\"label\":\"PERSON\"}\n\n{\"start\":0,\"end\":2,\"label\":\"MISC\"}\n",
        )
        .unwrap();
        let spans = r.find("Макс").unwrap();
        assert_eq!(spans[0].label, NerLabel::Per);
        assert_eq!(spans[1].label, NerLabel::Other);
    }

    #[test]
    fn test_out_of_range_spans_dropped() {
        let r = JsonRecognizer::new(vec![NerSpan {
            start: 3,
            end: 40,
            text: String::new(),
            label: NerLabel::Per,
            confidence: 0.8,
        }]);
        assert!(r.find("коротко").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = JsonRecognizer::from_path(Path::new("/nonexistent/ner.json")).unwrap_err();
        assert!(matches!(err, Error::Recognizer(_)));
    }
}
