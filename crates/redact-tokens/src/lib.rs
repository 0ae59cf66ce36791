//! Deterministic redaction tokens for redact
//!
//! Each distinct (kind, normalized value) pair gets a stable display token
//! such as `[PER_001]`, persisted across runs in a JSON map file.

pub mod manager;

pub use manager::{TokenManager, TokenMapFile, normalize_key};
