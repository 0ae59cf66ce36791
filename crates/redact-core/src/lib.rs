//! Core domain models and logic for redact
//!
//! This crate contains:
//! - Domain models (Span, EntityKind, CandidateDocument, Report)
//! - Code-point text indexing
//! - Span resolver (deterministic overlap removal)
//! - Schema checks for persisted documents

pub mod document;
pub mod error;
pub mod kind;
pub mod resolve;
pub mod schema;
pub mod span;
pub mod text;

pub use document::{
    CandidateDocument, CandidateItem, Counts, DOCUMENT_VERSION, RawCandidate, Report, ReportItem,
};
pub use error::{Error, Result};
pub use kind::EntityKind;
pub use resolve::{AppliedOp, Resolver, apply_spans, resolve_overlaps};
pub use schema::SchemaCheck;
pub use span::{Meta, Span};
pub use text::TextIndex;
