//! Applying a reviewed candidate document to a live text
//!
//! The text may have been edited since detection, so every flagged item is
//! first aligned: its stored fragment is looked up at the stored offsets,
//! then near them, then anywhere. Items that cannot be found are reported
//! and left untouched.

use redact_core::{
    CandidateDocument, CandidateItem, Counts, DOCUMENT_VERSION, EntityKind, Error, Report,
    ReportItem, Result, SchemaCheck, Span, TextIndex, apply_spans, resolve_overlaps,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

/// Slack around the expected offsets for the local search, in code points
pub const ALIGN_WINDOW: usize = 50;

/// Encoding recorded in a report until the caller fills in the real one
const DEFAULT_ENCODING: &str = "utf-8";

/// Locate `frag` in the live text, expected at `[start, end)`.
///
/// Returns the code-point offsets where it actually is, or `None` when it
/// is nowhere in the text. An empty fragment only matches an empty slice
/// at the expected offsets.
pub fn align_slice(
    index: &TextIndex<'_>,
    start: usize,
    end: usize,
    frag: &str,
) -> Option<(usize, usize)> {
    let n = index.char_len();
    let s = start.min(n);
    let e = end.min(n);
    if s <= e && index.slice(s, e) == frag {
        return Some((s, e));
    }
    if frag.is_empty() {
        return None;
    }

    let len = TextIndex::char_count(frag);
    let win_s = s.saturating_sub(ALIGN_WINDOW);
    let win_e = (e + ALIGN_WINDOW + len).min(n);
    if let Some(found) = index.find_within(frag, win_s, win_e) {
        debug!("Aligned {:?} from {} to {} (window)", frag, start, found);
        return Some((found, found + len));
    }

    let found = index.find_within(frag, 0, n)?;
    debug!("Aligned {:?} from {} to {} (global)", frag, start, found);
    Some((found, found + len))
}

fn utc_now() -> Result<String> {
    let now = OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .map_err(|e| Error::Other(e.into()))?;
    now.format(&Rfc3339).map_err(|e| Error::Other(e.into()))
}

fn report_item(
    item: &CandidateItem,
    start: usize,
    end: usize,
    old: &str,
    ok_slice: bool,
) -> ReportItem {
    ReportItem {
        id: item.id.clone(),
        typ: item.typ,
        start,
        end,
        old: old.to_string(),
        new: item.replacement.clone(),
        ok_slice,
    }
}

/// Rewrite `text` according to `doc`.
///
/// Returns the new text and a schema-checked report with an empty
/// `source_path`. Overlaps among aligned spans are settled by `priority`.
pub fn apply_to_text(
    text: &str,
    doc: &CandidateDocument,
    priority: &[EntityKind],
) -> Result<(String, Report)> {
    let index = TextIndex::new(text);
    let mut spans = Vec::new();
    let mut items = Vec::with_capacity(doc.items.len());

    for item in &doc.items {
        if !item.apply {
            items.push(report_item(item, item.start, item.end, &item.text, true));
            continue;
        }

        match align_slice(&index, item.start, item.end, &item.text) {
            Some((start, end)) => {
                let live = index.slice(start, end);
                spans.push(
                    Span::new(start, end, item.typ, live, item.replacement.clone())
                        .with_score(item.score),
                );
                items.push(report_item(item, start, end, live, true));
            }
            None => {
                warn!(
                    "{}: {:?} not found in text, leaving it unchanged",
                    item.id, item.text
                );
                let old = index.slice(item.start, item.end);
                items.push(report_item(item, item.start, item.end, old, false));
            }
        }
    }

    let aligned = spans.len();
    let spans = resolve_overlaps(spans, priority);
    if spans.len() < aligned {
        debug!("{} aligned spans lost to overlaps", aligned - spans.len());
    }
    let (new_text, ops) = apply_spans(text, &spans);

    let applied = doc.items.iter().filter(|i| i.apply).count();
    let report = Report {
        version: DOCUMENT_VERSION.to_string(),
        source_path: String::new(),
        encoding: DEFAULT_ENCODING.to_string(),
        created_utc: utc_now()?,
        counts: Counts {
            total: doc.items.len(),
            applied,
            skipped: doc.items.len() - applied,
        },
        items,
    };
    report.check_schema()?;

    info!("Applied {} replacements ({} flagged)", ops.len(), applied);
    Ok((new_text, report))
}
