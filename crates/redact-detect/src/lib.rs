//! PII detection for redact
//!
//! Provides:
//! - Primitive detectors (SNILS, phone, address, person name)
//! - Signal provider interfaces (NER, morphology) with built-in fallbacks
//! - Candidate scorer (weighted linear model, per-kind thresholds)
//! - Detection pipeline producing resolved candidate records

pub mod address;
pub mod lexicon;
pub mod person;
pub mod phone;
pub mod pipeline;
mod scan;
pub mod scorer;
pub mod signals;
pub mod snils;

pub use address::{AddressMarker, AddressMatch, AddressRules};
pub use lexicon::LexiconMorphology;
pub use person::{PersonMatch, PersonPattern, PersonRules};
pub use phone::{PhoneMatch, PhoneRules};
pub use pipeline::{Detector, DetectorSettings};
pub use scorer::{Candidate, CandidateSource, Scorer, ScoringProfile, Thresholds, Weights};
pub use signals::{
    EntityRecognizer, JsonRecognizer, Morphology, NerLabel, NerSpan, PermissiveMorphology,
};
pub use snils::SnilsMatch;
