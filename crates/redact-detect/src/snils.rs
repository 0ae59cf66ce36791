//! SNILS (Russian insurance number) detection and checksum

use std::sync::LazyLock;

use redact_core::TextIndex;
use regex::Regex;

use crate::scan::{Step, char_after, char_before, is_digit, scan};

static SNILS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{3})[-\s]?([0-9]{3})[-\s]?([0-9]{3})\s?([0-9]{2})").unwrap()
});

/// A SNILS-shaped number found in text. Offsets are code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnilsMatch {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    /// The 11 digits without separators
    pub digits: String,
    /// `###-###-### ##`
    pub normalized: String,
    /// Check digits as written
    pub checksum: String,
    pub is_valid: bool,
}

/// Expected check value for the 9 body digits
fn control_sum(body: &[u32]) -> u32 {
    let total: u32 = body
        .iter()
        .zip((1..=9).rev())
        .map(|(d, w)| d * w)
        .sum();
    match total {
        0..100 => total,
        100 | 101 => 0,
        _ => {
            let rem = total % 101;
            if rem == 100 { 0 } else { rem }
        }
    }
}

fn digits_of(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Checksum validation over exactly 11 digits; separators are ignored
pub fn is_valid_snils(value: &str) -> bool {
    let digits = digits_of(value);
    if digits.len() != 11 {
        return false;
    }
    let (body, check) = digits.split_at(9);
    if body == "000000000" {
        return false;
    }
    let body: Vec<u32> = body.chars().filter_map(|c| c.to_digit(10)).collect();
    format!("{:02}", control_sum(&body)) == check
}

/// Canonical `###-###-### ##` form of the first SNILS-shaped number in
/// `text`, valid or not
pub fn normalize_snils(text: &str) -> Option<String> {
    find_snils(text).into_iter().next().map(|m| m.normalized)
}

fn format_digits(d: &str) -> String {
    format!("{}-{}-{} {}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
}

/// All SNILS-shaped substrings not touching another digit. Invalid
/// checksums are reported with `is_valid = false`.
pub fn find_snils(text: &str) -> Vec<SnilsMatch> {
    let index = TextIndex::new(text);

    scan(&SNILS_RE, text, |caps| {
        let Some(m) = caps.get(0) else {
            return Step::Skip;
        };
        if is_digit(char_before(text, m.start())) || is_digit(char_after(text, m.end())) {
            return Step::Retry;
        }

        let digits = digits_of(m.as_str());
        if digits.len() != 11 {
            return Step::Skip;
        }
        let found = SnilsMatch {
            start: index.char_offset(m.start()),
            end: index.char_offset(m.end()),
            raw: m.as_str().to_string(),
            checksum: digits[9..].to_string(),
            is_valid: is_valid_snils(&digits),
            normalized: format_digits(&digits),
            digits,
        };
        Step::Accept(found, m.end())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_snils() {
        assert!(is_valid_snils("112-233-445 95"));
        assert!(is_valid_snils("11223344595"));
    }

    #[test]
    fn test_invalid_snils() {
        assert!(!is_valid_snils("112-233-445 96"));
        assert!(!is_valid_snils("000-000-000 00"));
        assert!(!is_valid_snils("112-233-445"));
    }

    #[test]
    fn test_control_sum_wraps() {
        // 9 nines: 9 * 45 = 405, 405 % 101 = 1
        assert_eq!(control_sum(&[9; 9]), 1);
        // sum 100 collapses to 0
        assert_eq!(control_sum(&[0, 0, 0, 0, 0, 0, 0, 0, 100]), 0);
    }

    #[test]
    fn test_normalize_then_validate() {
        let norm = normalize_snils("11223344595").unwrap();
        assert_eq!(norm, "112-233-445 95");
        assert!(is_valid_snils(&norm));
        assert_eq!(normalize_snils("1234"), None);
        assert_eq!(normalize_snils("СНИЛС: 112 233 445 96.").as_deref(), Some("112-233-445 96"));
    }

    #[test]
    fn test_find_in_text() {
        let text = "СНИЛС 112-233-445 95; прочее";
        let found = find_snils(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 6);
        assert_eq!(found[0].end, 20);
        assert_eq!(found[0].raw, "112-233-445 95");
        assert_eq!(found[0].checksum, "95");
        assert!(found[0].is_valid);
    }

    #[test]
    fn test_invalid_still_reported() {
        let found = find_snils("номер 112 233 445 96");
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_valid);
        assert_eq!(found[0].normalized, "112-233-445 96");
    }

    #[test]
    fn test_not_inside_longer_number() {
        assert!(find_snils("счёт 4011223344595").is_empty());
        assert!(find_snils("1122334459500").is_empty());
    }
}
