//! Span resolver and right-to-left application
//!
//! CRITICAL: resolution must be deterministic. Identical input yields
//! identical output regardless of how the input was ordered in memory
//! before sorting, because every comparison ends on the input sequence
//! number.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{EntityKind, Span, TextIndex};

/// Selects a maximal conflict-free subset of overlapping spans.
///
/// Rules, in order:
/// 1. higher-priority kind wins
/// 2. equal priority: strictly longer span wins
/// 3. otherwise the span met first in sort order stays
#[derive(Debug, Clone)]
pub struct Resolver {
    priority: Vec<EntityKind>,
}

impl Resolver {
    /// `priority` lists kinds from highest to lowest; unlisted kinds rank last
    pub fn new(priority: Vec<EntityKind>) -> Self {
        Self { priority }
    }

    pub fn priority(&self) -> &[EntityKind] {
        &self.priority
    }

    fn rank(&self, kind: EntityKind) -> usize {
        self.priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.priority.len())
    }

    /// Does `challenger` displace `holder`?
    fn wins(&self, challenger: &Span, holder: &Span) -> bool {
        match self.rank(challenger.kind).cmp(&self.rank(holder.kind)) {
            Ordering::Less => true,
            Ordering::Equal => challenger.len() > holder.len(),
            Ordering::Greater => false,
        }
    }

    /// Resolve overlaps, returning spans sorted by start
    pub fn resolve(&self, spans: impl IntoIterator<Item = Span>) -> Vec<Span> {
        // Arena of (input sequence, span); degenerate spans never enter it
        let mut arena: Vec<(usize, Span)> = spans
            .into_iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .collect();

        arena.sort_by(|(seq_a, a), (seq_b, b)| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| self.rank(a.kind).cmp(&self.rank(b.kind)))
                .then_with(|| seq_a.cmp(seq_b))
        });
        let arena: Vec<Span> = arena.into_iter().map(|(_, s)| s).collect();

        // Indices into the arena; always sorted by start and pairwise disjoint.
        // Candidates arrive by start, so only the last kept span can overlap.
        let mut kept: Vec<usize> = Vec::new();

        for idx in 0..arena.len() {
            let cand = &arena[idx];
            match kept.last_mut() {
                Some(last) if arena[*last].overlaps(cand) => {
                    if self.wins(cand, &arena[*last]) {
                        *last = idx;
                    }
                }
                _ => kept.push(idx),
            }
        }

        let out: Vec<Span> = kept.into_iter().map(|k| arena[k].clone()).collect();
        debug!("Resolved {} spans to {}", arena.len(), out.len());
        out
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(EntityKind::ALL.to_vec())
    }
}

/// Convenience wrapper over [`Resolver::resolve`]
pub fn resolve_overlaps(
    spans: impl IntoIterator<Item = Span>,
    priority: &[EntityKind],
) -> Vec<Span> {
    Resolver::new(priority.to_vec()).resolve(spans)
}

/// One replacement performed by [`apply_spans`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedOp {
    pub start: usize,
    pub end: usize,
    pub typ: EntityKind,
    pub old: String,
    pub new: String,
}

/// Rewrite `text`, replacing each span with its replacement.
///
/// Spans must be disjoint (run them through the resolver first). Edits go
/// right to left so offsets still to be processed never shift. Operations
/// are returned left to right.
pub fn apply_spans(text: &str, spans: &[Span]) -> (String, Vec<AppliedOp>) {
    let index = TextIndex::new(text);
    let mut seq: Vec<&Span> = spans.iter().filter(|s| !s.is_empty()).collect();
    seq.sort_by_key(|s| (s.start, s.end));

    let mut out = text.to_string();
    let mut ops = Vec::with_capacity(seq.len());

    for span in seq.into_iter().rev() {
        let bs = index.byte_offset(span.start);
        let be = index.byte_offset(span.end);
        ops.push(AppliedOp {
            start: span.start,
            end: span.end,
            typ: span.kind,
            old: text[bs..be].to_string(),
            new: span.replacement.clone(),
        });
        out.replace_range(bs..be, &span.replacement);
    }

    ops.reverse();
    (out, ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, kind: EntityKind, replacement: &str) -> Span {
        Span::new(start, end, kind, "", replacement)
    }

    fn assert_disjoint_sorted(spans: &[Span]) {
        for pair in spans.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }

    #[test]
    fn test_apply_basic() {
        let txt = "Адрес: г. Казань, ул. Ленина, д 5. Тел: +7 (999) 123-45-67.";
        let spans = vec![
            Span::new(7, 33, EntityKind::Address, "г. Казань, ул. Ленина, д 5", "[ADDR_001]"),
            Span::new(40, 58, EntityKind::Phone, "+7 (999) 123-45-67", "[PHONE_001]"),
        ];
        let ok = Resolver::default().resolve(spans);
        let (out, ops) = apply_spans(txt, &ok);
        assert_eq!(out, "Адрес: [ADDR_001]. Тел: [PHONE_001].");
        assert_eq!(ops[0].typ, EntityKind::Address);
        assert_eq!(ops[1].typ, EntityKind::Phone);
        assert_eq!(ops[1].old, "+7 (999) 123-45-67");
    }

    #[test]
    fn test_overlap_priority() {
        let a = span(10, 25, EntityKind::Person, "[PER_001]");
        let b = span(12, 28, EntityKind::Phone, "[PHONE_001]");
        let chosen = Resolver::default().resolve(vec![a, b]);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].kind, EntityKind::Phone);
    }

    #[test]
    fn test_higher_priority_beats_longer() {
        let long = span(0, 40, EntityKind::Address, "[ADDR_001]");
        let short = span(30, 35, EntityKind::NationalId, "[SNILS_001]");
        let chosen = Resolver::default().resolve(vec![long, short]);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].kind, EntityKind::NationalId);
    }

    #[test]
    fn test_overlap_length_when_same_type() {
        let a = span(5, 10, EntityKind::Address, "[ADDR_001]");
        let b = span(5, 15, EntityKind::Address, "[ADDR_002]");
        let chosen = Resolver::default().resolve(vec![a, b]);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].replacement, "[ADDR_002]");
    }

    #[test]
    fn test_longest_same_type_chain() {
        let spans = vec![
            span(0, 5, EntityKind::Person, "a"),
            span(4, 20, EntityKind::Person, "b"),
            span(18, 22, EntityKind::Person, "c"),
        ];
        let chosen = Resolver::default().resolve(spans);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].replacement, "b");
    }

    #[test]
    fn test_equal_tie_keeps_first_seen() {
        let a = span(3, 8, EntityKind::Person, "first");
        let b = span(3, 8, EntityKind::Person, "second");
        let chosen = Resolver::default().resolve(vec![a.clone(), b.clone()]);
        assert_eq!(chosen[0].replacement, "first");
        let chosen = Resolver::default().resolve(vec![b, a]);
        assert_eq!(chosen[0].replacement, "second");
    }

    #[test]
    fn test_replacement_chain_reaction() {
        // PHONE displaces the first PER; the second PER then loses to it
        let spans = vec![
            span(0, 6, EntityKind::Person, "p1"),
            span(7, 12, EntityKind::Person, "p2"),
            span(5, 9, EntityKind::Phone, "ph"),
            span(20, 25, EntityKind::Address, "a"),
        ];
        let chosen = Resolver::default().resolve(spans);
        let kept: Vec<&str> = chosen.iter().map(|s| s.replacement.as_str()).collect();
        assert_eq!(kept, vec!["ph", "a"]);
    }

    #[test]
    fn test_displaced_span_frees_its_tail() {
        // The national id takes the address's slot; the name past the id
        // no longer conflicts with anything kept
        let spans = vec![
            span(0, 20, EntityKind::Address, "a"),
            span(2, 6, EntityKind::NationalId, "id"),
            span(10, 14, EntityKind::Person, "p"),
        ];
        let chosen = Resolver::default().resolve(spans);
        assert_disjoint_sorted(&chosen);
        let kept: Vec<&str> = chosen.iter().map(|s| s.replacement.as_str()).collect();
        assert_eq!(kept, vec!["id", "p"]);
    }

    #[test]
    fn test_merged_span_loses_to_higher_priority() {
        // Longer address displaces a short one, then loses to a national id
        let spans = vec![
            span(0, 4, EntityKind::Address, "a1"),
            span(2, 12, EntityKind::Address, "a2"),
            span(10, 14, EntityKind::NationalId, "id"),
        ];
        let chosen = Resolver::default().resolve(spans);
        let kept: Vec<&str> = chosen.iter().map(|s| s.replacement.as_str()).collect();
        assert_eq!(kept, vec!["id"]);
    }

    #[test]
    fn test_zero_length_dropped() {
        let chosen = Resolver::default().resolve(vec![
            span(4, 4, EntityKind::NationalId, "empty"),
            span(2, 6, EntityKind::Person, "p"),
        ]);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].replacement, "p");
    }

    #[test]
    fn test_resolve_idempotent_and_sorted() {
        let spans = vec![
            span(30, 40, EntityKind::Person, "a"),
            span(0, 10, EntityKind::Address, "b"),
            span(5, 12, EntityKind::Phone, "c"),
            span(11, 31, EntityKind::Address, "d"),
            span(35, 50, EntityKind::NationalId, "e"),
            span(45, 46, EntityKind::Person, "f"),
        ];
        let once = Resolver::default().resolve(spans);
        assert_disjoint_sorted(&once);
        let twice = Resolver::default().resolve(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_priority() {
        let resolver = Resolver::new(vec![EntityKind::Person, EntityKind::Phone]);
        let chosen = resolver.resolve(vec![
            span(0, 10, EntityKind::Phone, "ph"),
            span(2, 6, EntityKind::Person, "p"),
        ]);
        assert_eq!(chosen[0].replacement, "p");
    }

    #[test]
    fn test_apply_keeps_indices_order() {
        let spans = vec![
            span(1, 3, EntityKind::Person, "[X]"),
            span(3, 5, EntityKind::Person, "[Y]"),
        ];
        let (out, _) = apply_spans("ABCDEF", &Resolver::default().resolve(spans));
        assert_eq!(out, "A[X][Y]F");
    }
}
