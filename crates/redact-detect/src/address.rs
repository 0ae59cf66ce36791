//! Postal address detection
//!
//! An address is a run of text anchored by two administrative or street
//! markers and closed by a house number, optionally followed by building
//! and apartment parts:
//!
//! ```text
//! г. Казань, ул. Ленина, д 5 к 1 стр 2 кв 10
//! ^M1        ^M2         ^house ^tails
//! ```
//!
//! Markers need word boundaries on both sides, which the `regex` crate cannot
//! express for tokens ending in a dot, so the anchor search is hand-written
//! and only the house and tail parts use regexes.

use std::sync::LazyLock;

use redact_core::TextIndex;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scan::{char_after, char_before, is_word, lower, next_char};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dot {
    Required,
    Optional,
    Never,
}

struct Marker {
    stem: &'static str,
    dot: Dot,
}

const fn marker(stem: &'static str, dot: Dot) -> Marker {
    Marker { stem, dot }
}

// Tried in order; the first one that fits at a position wins
const MARKERS: &[Marker] = &[
    marker("г", Dot::Required),
    marker("город", Dot::Never),
    marker("обл", Dot::Optional),
    marker("область", Dot::Never),
    marker("респ", Dot::Optional),
    marker("республика", Dot::Never),
    marker("край", Dot::Never),
    marker("р-н", Dot::Never),
    marker("рн", Dot::Never),
    marker("район", Dot::Never),
    marker("пос", Dot::Optional),
    marker("посёлок", Dot::Never),
    marker("пгт", Dot::Never),
    marker("с", Dot::Required),
    marker("село", Dot::Never),
    marker("ул", Dot::Optional),
    marker("улица", Dot::Never),
    marker("пр-кт", Dot::Never),
    marker("пркт", Dot::Never),
    marker("проспект", Dot::Never),
    marker("пер", Dot::Optional),
    marker("переулок", Dot::Never),
    marker("б-р", Dot::Never),
    marker("бр", Dot::Never),
    marker("бульвар", Dot::Never),
    marker("бул", Dot::Optional),
    marker("ш", Dot::Optional),
    marker("шоссе", Dot::Never),
    marker("д", Dot::Required),
    marker("дом", Dot::Never),
    marker("к", Dot::Required),
    marker("корп", Dot::Optional),
    marker("корпус", Dot::Never),
    marker("стр", Dot::Optional),
    marker("строение", Dot::Never),
    marker("кв", Dot::Optional),
    marker("квартира", Dot::Never),
];

static HOUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:д\.?|дом)\s*[0-9]+[A-Za-zА-Яа-я0-9/-]*").unwrap());

static TAILS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\s*[,;]?\s*(?:к\.?|корп\.?|корпус|стр\.?|строение|кв\.?|квартира)\s*[A-Za-zА-Яа-я0-9/-]+)*",
    )
    .unwrap()
});

// A chunk ending on a bare label swallows the number that follows it
static LABEL_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:кв\.?|к\.|корп\.?|корпус|стр\.?|строение)\s*$").unwrap()
});

static LABEL_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.?\s*[0-9]+[A-Za-zА-Яа-я0-9/-]*").unwrap());

/// Acceptance rules for address chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRules {
    /// Longest accepted chunk, in characters
    pub max_len: usize,
    pub max_line_breaks: usize,
    /// More city markers than this means two addresses glued together
    pub max_city_markers: usize,
    /// How far past the first marker the house number may appear
    pub window: usize,
}

impl Default for AddressRules {
    fn default() -> Self {
        Self {
            max_len: 160,
            max_line_breaks: 1,
            max_city_markers: 1,
            window: 160,
        }
    }
}

/// An address chunk. Offsets are code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMatch {
    pub start: usize,
    pub end: usize,
    pub raw: String,
}

/// A single address marker occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMarker {
    pub start: usize,
    pub end: usize,
    pub token: String,
}

/// Byte end of `stem` matched case-insensitively at `pos`
fn match_stem(text: &str, pos: usize, stem: &str) -> Option<usize> {
    let mut chars = text[pos..].char_indices();
    for expected in stem.chars() {
        let (_, c) = chars.next()?;
        if lower(c) != expected {
            return None;
        }
    }
    Some(chars.next().map_or(text.len(), |(i, _)| pos + i))
}

/// Every end offset at which some marker matches at `pos`, in preference
/// order. Assumes the left boundary was already checked.
fn marker_ends(text: &str, pos: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    let bounded = |end: usize| !is_word(char_after(text, end));

    for m in MARKERS {
        let Some(stem_end) = match_stem(text, pos, m.stem) else {
            continue;
        };
        let dotted = (char_after(text, stem_end) == Some('.')).then_some(stem_end + 1);

        match m.dot {
            Dot::Required => ends.extend(dotted.filter(|e| bounded(*e))),
            Dot::Optional => {
                ends.extend(dotted.filter(|e| bounded(*e)));
                if bounded(stem_end) {
                    ends.push(stem_end);
                }
            }
            Dot::Never => {
                if bounded(stem_end) {
                    ends.push(stem_end);
                }
            }
        }
    }
    ends
}

fn at_word_start(text: &str, pos: usize) -> bool {
    !is_word(char_before(text, pos))
}

/// All address markers in `text`, scanning left to right without overlap
pub fn address_markers(text: &str) -> Vec<AddressMarker> {
    let index = TextIndex::new(text);
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        if at_word_start(text, pos)
            && let Some(&end) = marker_ends(text, pos).first()
        {
            out.push(AddressMarker {
                start: index.char_offset(pos),
                end: index.char_offset(end),
                token: text[pos..end].to_string(),
            });
            pos = end.max(next_char(text, pos));
            continue;
        }
        pos = next_char(text, pos);
    }
    out
}

pub fn has_address_markers(text: &str) -> bool {
    !address_markers(text).is_empty()
}

/// End of the house number starting at `pos`, if one does
fn house_at(text: &str, pos: usize) -> Option<usize> {
    if !at_word_start(text, pos) {
        return None;
    }
    HOUSE_RE.find(&text[pos..]).map(|m| pos + m.end())
}

/// Second marker and house number after the first marker, lazily: the
/// earliest second marker with a house after it wins
fn complete_from(text: &str, after_first: usize, limit: usize) -> Option<usize> {
    let mut q = after_first;
    while q < limit {
        if at_word_start(text, q) {
            for second_end in marker_ends(text, q) {
                if second_end >= text.len() {
                    continue;
                }
                let mut h = next_char(text, second_end);
                while h < limit {
                    if let Some(house_end) = house_at(text, h) {
                        return Some(house_end);
                    }
                    h = next_char(text, h);
                }
            }
        }
        q = next_char(text, q);
    }
    None
}

/// Raw chunk end for an address anchored at `start`
fn match_at(text: &str, start: usize, limit: usize) -> Option<usize> {
    for first_end in marker_ends(text, start) {
        if first_end >= text.len() {
            continue;
        }
        let after_first = next_char(text, first_end);
        if let Some(house_end) = complete_from(text, after_first, limit) {
            let tails = TAILS_RE.find(&text[house_end..]).map_or(0, |m| m.end());
            return Some(house_end + tails);
        }
    }
    None
}

fn count_city_markers(chunk: &str) -> usize {
    let mut count = 0;
    let mut pos = 0;
    while pos < chunk.len() {
        if at_word_start(chunk, pos) {
            let end = [("г", true), ("город", false)].iter().find_map(|(stem, dot)| {
                let e = match_stem(chunk, pos, stem)?;
                let e = if *dot {
                    (char_after(chunk, e) == Some('.')).then_some(e + 1)?
                } else {
                    e
                };
                (!is_word(char_after(chunk, e))).then_some(e)
            });
            if let Some(end) = end {
                count += 1;
                pos = end;
                continue;
            }
        }
        pos = next_char(chunk, pos);
    }
    count
}

impl AddressRules {
    /// Does a raw chunk look like a single, plausible address?
    pub fn accepts(&self, chunk: &str) -> bool {
        if chunk.chars().count() > self.max_len {
            return false;
        }
        if chunk.matches('\n').count() > self.max_line_breaks {
            return false;
        }
        if count_city_markers(chunk) > self.max_city_markers {
            return false;
        }
        // Quoted names followed by prose are not part of an address
        if chunk.contains("»,") || chunk.to_lowercase().contains("», то") {
            return false;
        }
        true
    }
}

/// Extend a chunk ending on a bare label (`кв.`) with the value after it
fn extend_label_end(text: &str, start: usize, end: usize) -> usize {
    if LABEL_END_RE.is_match(&text[start..end])
        && let Some(m) = LABEL_VALUE_RE.find(&text[end..])
    {
        return end + m.end();
    }
    end
}

pub fn find_addresses(text: &str, rules: &AddressRules) -> Vec<AddressMatch> {
    let index = TextIndex::new(text);
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        if !at_word_start(text, pos) || marker_ends(text, pos).is_empty() {
            pos = next_char(text, pos);
            continue;
        }

        let limit = index.byte_offset(index.char_offset(pos) + rules.window);
        let Some(end) = match_at(text, pos, limit) else {
            pos = next_char(text, pos);
            continue;
        };

        let full_end = extend_label_end(text, pos, end);
        let raw = &text[pos..full_end];
        if rules.accepts(raw) {
            out.push(AddressMatch {
                start: index.char_offset(pos),
                end: index.char_offset(full_end),
                raw: raw.to_string(),
            });
        }
        pos = end.max(next_char(text, pos));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(text: &str) -> Vec<AddressMatch> {
        find_addresses(text, &AddressRules::default())
    }

    #[test]
    fn test_city_street_house() {
        let text = "Адрес: г. Казань, ул. Ленина, д 5. Тел: нет";
        let found = addresses(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "г. Казань, ул. Ленина, д 5");
        assert_eq!(found[0].start, 7);
        assert_eq!(found[0].end, 33);
    }

    #[test]
    fn test_tails() {
        let found = addresses("Россия, г. Москва, ул. Тверская, д 5 к 1 стр 2 кв 10, подъезд 3");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "г. Москва, ул. Тверская, д 5 к 1 стр 2 кв 10");
    }

    #[test]
    fn test_label_end_extension() {
        let found = addresses("г. Казань, ул. Ленина, д. 5, кв. 3");
        assert_eq!(found.len(), 1);
        assert!(found[0].raw.ends_with("кв. 3"));
    }

    #[test]
    fn test_two_cities_rejected() {
        // Both cities land in one chunk, which is dropped as a whole
        assert!(addresses("г. Казань, г. Москва, ул. Ленина, д 5").is_empty());
        assert_eq!(addresses("г. Москва, ул. Ленина, д 5").len(), 1);
    }

    #[test]
    fn test_requires_house_number() {
        assert!(addresses("г. Казань, ул. Ленина без номера").is_empty());
    }

    #[test]
    fn test_marker_needs_word_boundary() {
        // "ул" inside a word and "г" without a dot are not markers
        assert!(addresses("Разгул, город гудит, дулом д 5").is_empty());
    }

    #[test]
    fn test_window_limit() {
        let filler = "о".repeat(200);
        let text = format!("г. Казань {} ул. Ленина, д 5", filler);
        assert!(addresses(&text).is_empty());
    }

    #[test]
    fn test_accept_rules() {
        let rules = AddressRules::default();
        assert!(rules.accepts("г. Казань, ул. Ленина, д 5"));
        assert!(!rules.accepts("г. Казань,\nул. Ленина,\nд 5"));
        assert!(!rules.accepts("ул. «Ромашка», то есть д 5"));
        assert!(!rules.accepts(&"а".repeat(161)));
    }

    #[test]
    fn test_address_markers() {
        let found = address_markers("Республика Татарстан, г. Казань, ул. Ленина, д. 5, кв. 3");
        let tokens: Vec<&str> = found.iter().map(|m| m.token.as_str()).collect();
        for expected in ["Республика", "г.", "ул.", "д.", "кв."] {
            assert!(tokens.contains(&expected), "missing {}", expected);
        }
        assert!(has_address_markers("ул. Ленина"));
        assert!(!has_address_markers("просто текст"));
    }
}
