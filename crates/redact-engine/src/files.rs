//! File-level operations: detect, validate, apply

use std::path::Path;

use redact_core::{CandidateDocument, EntityKind, RawCandidate, Report, Result, SchemaCheck};
use redact_detect::Detector;
use redact_tokens::TokenManager;
use tracing::info;

use crate::apply::apply_to_text;
use crate::io::{
    load_candidate_document, load_raw_candidates, read_text, save_json_pretty, write_text,
};
use crate::validate::build_candidates_document;

/// Run detection over a text file
pub fn detect_file(path: &Path, detector: &Detector, encoding: &str) -> Result<Vec<RawCandidate>> {
    let text = read_text(path, encoding)?;
    let found = detector.detect(&text)?;
    info!("{:?}: {} candidates", path, found.len());
    Ok(found)
}

/// Validate raw candidates from `input` (JSON or CSV) and write the
/// candidate document to `out`. Tokens come from the map at `mapping`.
pub fn validate_file(input: &Path, out: &Path, mapping: &Path) -> Result<CandidateDocument> {
    let raw = load_raw_candidates(input)?;
    let mut tokens = TokenManager::open(mapping)?;
    let doc = build_candidates_document(raw, &mut tokens)?;
    save_json_pretty(out, &doc)?;
    info!("Wrote {} candidates to {:?}", doc.items.len(), out);
    Ok(doc)
}

/// Apply the candidate document at `candidates` to the text at `input`,
/// writing the new text to `out` and the report to `report_path`
pub fn apply_file(
    input: &Path,
    candidates: &Path,
    out: &Path,
    report_path: &Path,
    encoding: &str,
    priority: &[EntityKind],
) -> Result<Report> {
    let text = read_text(input, encoding)?;
    let doc = load_candidate_document(candidates)?;

    let (new_text, mut report) = apply_to_text(&text, &doc, priority)?;
    report.source_path = input.canonicalize()?.display().to_string();
    report.encoding = encoding.to_string();
    report.check_schema()?;

    write_text(out, &new_text)?;
    save_json_pretty(report_path, &report)?;
    info!("Wrote {:?} and {:?}", out, report_path);
    Ok(report)
}
