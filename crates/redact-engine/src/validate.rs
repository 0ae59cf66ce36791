//! Turning raw candidate records into a validated candidate document

use redact_core::{
    CandidateDocument, CandidateItem, EntityKind, Meta, RawCandidate, Result, SchemaCheck,
};
use redact_tokens::TokenManager;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Interpret a boolean-like cell or flag. Unknown forms yield `None`.
pub fn coerce_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "да" => Some(true),
        "0" | "false" | "no" | "n" | "нет" => Some(false),
        _ => None,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => coerce_bool(s).unwrap_or(false),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Whether an item of `kind` is applied when the record does not say.
///
/// National ids only when the detector marked the checksum valid, phones
/// always, addresses and names never (they need a human look).
pub fn default_apply(kind: EntityKind, meta: &Meta) -> bool {
    match kind {
        EntityKind::NationalId => is_truthy(meta.get("valid")),
        EntityKind::Phone => true,
        EntityKind::Address | EntityKind::Person => false,
    }
}

/// Key a token is minted under: the normalized value, else the trimmed
/// text, else the derived id
pub fn token_key(kind: EntityKind, raw: &RawCandidate) -> String {
    let norm = raw.norm.as_deref().map(str::trim).unwrap_or_default();
    if !norm.is_empty() {
        return norm.to_string();
    }
    let text = raw.text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    CandidateItem::derive_id(kind, raw.start, raw.end)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate one record. Returns `Ok(None)` for types outside the closed set.
///
/// Missing tokens are minted in memory; the caller decides when to save.
pub fn validate_candidate(
    raw: RawCandidate,
    tokens: &mut TokenManager,
) -> Result<Option<CandidateItem>> {
    let kind = match raw.typ.parse::<EntityKind>() {
        Ok(kind) => kind,
        Err(_) => {
            warn!("Skipping candidate with unsupported type {:?}", raw.typ);
            return Ok(None);
        }
    };

    let apply = raw.apply.unwrap_or_else(|| default_apply(kind, &raw.meta));
    let replacement = match non_empty(raw.replacement.clone()) {
        Some(replacement) => replacement,
        None => tokens.mint(kind, &token_key(kind, &raw)),
    };
    let id = non_empty(raw.id)
        .unwrap_or_else(|| CandidateItem::derive_id(kind, raw.start, raw.end));

    debug!("{} -> {} (apply={})", id, replacement, apply);
    Ok(Some(CandidateItem {
        id,
        typ: kind,
        start: raw.start,
        end: raw.end,
        text: raw.text,
        norm: non_empty(raw.norm),
        score: raw.score.unwrap_or(0.0),
        apply,
        replacement,
        meta: raw.meta,
    }))
}

/// Validate every record, mint missing tokens and schema-check the result.
///
/// New tokens are saved only once the document passes the check, so a
/// rejected batch leaves the map untouched.
pub fn build_candidates_document(
    raw: impl IntoIterator<Item = RawCandidate>,
    tokens: &mut TokenManager,
) -> Result<CandidateDocument> {
    let mut staged = tokens.clone();
    let mut items = Vec::new();
    let mut skipped = 0usize;

    for record in raw {
        match validate_candidate(record, &mut staged)? {
            Some(item) => items.push(item),
            None => skipped += 1,
        }
    }

    let doc = CandidateDocument::new(items);
    doc.check_schema()?;

    let minted = EntityKind::ALL
        .iter()
        .any(|&kind| staged.counter(kind) != tokens.counter(kind));
    if minted {
        staged.save()?;
    }
    *tokens = staged;
    info!(
        "Validated {} candidates ({} unsupported skipped)",
        doc.items.len(),
        skipped
    );
    Ok(doc)
}
