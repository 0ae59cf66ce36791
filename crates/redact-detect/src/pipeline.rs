//! Detection pipeline: detectors and recognizer, scoring, resolution

use redact_core::{CandidateItem, EntityKind, RawCandidate, Resolver, Result, Span, TextIndex};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::address::{AddressRules, find_addresses};
use crate::person::{PersonRules, find_persons};
use crate::phone::{PhoneRules, find_phones};
use crate::scorer::{Candidate, CandidateSource, Scorer, ScoringProfile};
use crate::signals::{EntityRecognizer, Morphology, NerLabel, PermissiveMorphology};
use crate::snils::find_snils;

/// Pattern confidence per kind
const NATIONAL_ID_STRENGTH: f64 = 1.0;
const INVALID_NATIONAL_ID_STRENGTH: f64 = 0.2;
const PHONE_STRENGTH: f64 = 0.9;
const ADDRESS_STRENGTH: f64 = 0.7;
const PERSON_STRENGTH: f64 = 0.5;

/// Everything that tunes detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Kinds from highest to lowest priority
    pub priority: Vec<EntityKind>,
    pub scoring: ScoringProfile,
    pub address: AddressRules,
    pub person: PersonRules,
    pub phone: PhoneRules,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            priority: EntityKind::ALL.to_vec(),
            scoring: ScoringProfile::default(),
            address: AddressRules::default(),
            person: PersonRules::default(),
            phone: PhoneRules::default(),
        }
    }
}

/// Runs every detector over a text and returns resolved candidates
pub struct Detector {
    settings: DetectorSettings,
    morphology: Box<dyn Morphology>,
    recognizer: Option<Box<dyn EntityRecognizer>>,
}

impl Detector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            morphology: Box::new(PermissiveMorphology),
            recognizer: None,
        }
    }

    pub fn with_morphology(mut self, morphology: impl Morphology + 'static) -> Self {
        self.morphology = Box::new(morphology);
        self
    }

    pub fn with_recognizer(mut self, recognizer: impl EntityRecognizer + 'static) -> Self {
        self.recognizer = Some(Box::new(recognizer));
        self
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Unscored hits from every pattern detector, then the recognizer
    pub fn candidates(&self, text: &str) -> Result<Vec<Candidate>> {
        let mut out = Vec::new();

        for m in find_snils(text) {
            let mut c = Candidate::new(m.start, m.end, EntityKind::NationalId, m.raw);
            c.regex_strength = if m.is_valid {
                NATIONAL_ID_STRENGTH
            } else {
                INVALID_NATIONAL_ID_STRENGTH
            };
            c.valid = m.is_valid;
            c.norm = Some(m.normalized);
            c.meta.insert("valid".to_string(), json!(m.is_valid));
            c.meta.insert("digits".to_string(), json!(m.digits));
            c.meta.insert("checksum".to_string(), json!(m.checksum));
            out.push(c);
        }

        for m in find_phones(text, &self.settings.phone) {
            let mut c = Candidate::new(m.start, m.end, EntityKind::Phone, m.raw);
            c.regex_strength = PHONE_STRENGTH;
            c.meta.insert("digits".to_string(), json!(m.digits));
            c.meta.insert("normalized".to_string(), json!(m.normalized));
            if let Some(ext) = m.ext {
                c.meta.insert("ext".to_string(), json!(ext));
            }
            c.norm = Some(m.normalized);
            out.push(c);
        }

        for m in find_addresses(text, &self.settings.address) {
            let incomplete = address_incomplete(&m.raw);
            let mut c = Candidate::new(m.start, m.end, EntityKind::Address, m.raw);
            c.regex_strength = ADDRESS_STRENGTH;
            c.meta.insert("addr_incomplete".to_string(), json!(incomplete));
            out.push(c);
        }

        for m in find_persons(text, self.morphology.as_ref(), &self.settings.person) {
            let mut c = Candidate::new(m.start, m.end, EntityKind::Person, m.raw);
            c.regex_strength = PERSON_STRENGTH;
            c.meta.insert("kind".to_string(), json!(m.pattern.as_str()));
            out.push(c);
        }

        if let Some(recognizer) = &self.recognizer {
            let index = TextIndex::new(text);
            for s in recognizer.find(text)? {
                // Locations and organizations are not redacted
                if s.label != NerLabel::Per {
                    continue;
                }
                let span_text = index.slice(s.start, s.end);
                let mut c = Candidate::new(s.start, s.end, EntityKind::Person, span_text);
                c.source = CandidateSource::Recognizer;
                c.ner_prob = s.confidence;
                c.meta.insert("kind".to_string(), json!("ner"));
                out.push(c);
            }
        }

        debug!("{} raw candidates", out.len());
        Ok(out)
    }

    /// Scored, resolved spans sorted by start
    pub fn detect_spans(&self, text: &str) -> Result<Vec<Span>> {
        let index = TextIndex::new(text);
        let scorer = Scorer::new(&self.settings.scoring, self.morphology.as_ref());

        let scored: Vec<Span> = self
            .candidates(text)?
            .into_iter()
            .filter_map(|c| scorer.evaluate(&index, c))
            .collect();

        let resolver = Resolver::new(self.settings.priority.clone());
        Ok(resolver.resolve(scored))
    }

    /// Candidate records for the validator
    pub fn detect(&self, text: &str) -> Result<Vec<RawCandidate>> {
        let spans = self.detect_spans(text)?;
        info!("Detected {} candidates", spans.len());
        Ok(spans.into_iter().map(to_raw_candidate).collect())
    }
}

fn to_raw_candidate(span: Span) -> RawCandidate {
    let mut meta = span.meta;
    let norm = meta
        .remove("norm")
        .and_then(|v| v.as_str().map(str::to_string));
    RawCandidate {
        id: Some(CandidateItem::derive_id(span.kind, span.start, span.end)),
        typ: span.kind.label().to_string(),
        start: span.start,
        end: span.end,
        text: span.text,
        norm,
        score: span.score,
        apply: None,
        replacement: None,
        meta,
    }
}

/// An apartment label with no number after it
fn address_incomplete(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    match lower.rsplit_once("кв") {
        Some((_, after)) => !after.chars().any(|c| c.is_ascii_digit()),
        None => false,
    }
}
