//! Russian phone number detection

use std::sync::LazyLock;

use redact_core::TextIndex;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::scan::{Step, char_after, char_before, is_digit, left_context, scan};

// Either a compact run (+7/8/7 then 10 digits) or a separated form with an
// optional country prefix, bracketed or bare area code, and an optional
// extension. Separators between groups: whitespace and dashes.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?:
            (?P<compact>(?:\+7|8|7)[0-9]{10})
          |
            (?:(?P<prefix>\+7|8|7)\s*[-\x20]*)?
            (?:\(\s*[0-9]{3}\s*\)|[0-9]{3})
            \s*[-\x20]*[0-9]{3}
            \s*[-\x20]*[0-9]{2}
            \s*[-\x20]*[0-9]{2}
        )
        (?P<tail>\s*(?:доб\.?|ext\.?)\s*(?P<ext>[0-9]{1,6}))?
        ",
    )
    .unwrap()
});

/// Context rules for phone detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneRules {
    /// Characters to the left inspected for a blocking label
    pub left_window: usize,
    /// Lower-case label prefixes that mark a number as something else
    pub label_prefixes: Vec<String>,
}

impl Default for PhoneRules {
    fn default() -> Self {
        Self {
            left_window: 48,
            label_prefixes: [
                "снилс", "snils", "инн", "паспорт", "договор", "контракт", "акт", "наклад",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A phone number found in text. Offsets are code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneMatch {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    /// Digits of the number itself, extension excluded
    pub digits: String,
    /// `+7XXXXXXXXXX`
    pub normalized: String,
    pub ext: Option<String>,
}

impl PhoneMatch {
    pub fn has_ext(&self) -> bool {
        self.ext.is_some()
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphabetic() || ('А'..='я').contains(&c) || c == 'Ё' || c == 'ё' || c == '.'
}

/// The label token ending right before a match, lower-cased and without
/// trailing dots: `"Номер договора: "` gives `"договора"`.
fn trailing_label(left: &str) -> Option<String> {
    let left = left.trim_end();
    let left = left.strip_suffix([':', '№', '#']).unwrap_or(left).trim_end();

    let mut run: Vec<char> = left.chars().rev().take_while(|c| is_label_char(*c)).take(24).collect();
    if run.is_empty() {
        return None;
    }
    run.reverse();
    let label = run.into_iter().collect::<String>().to_lowercase();
    Some(label.trim().trim_end_matches('.').to_string())
}

fn blocked_by_label(left: &str, prefixes: &[String]) -> bool {
    trailing_label(left).is_some_and(|label| prefixes.iter().any(|p| label.starts_with(p.as_str())))
}

/// `+7XXXXXXXXXX` for 10 digits, or 11 digits led by 7 or 8
pub fn normalize_phone(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 if digits.starts_with('7') || digits.starts_with('8') => Some(format!("+7{}", &digits[1..])),
        10 => Some(format!("+7{}", digits)),
        _ => None,
    }
}

pub fn is_probable_ru_phone(value: &str) -> bool {
    normalize_phone(value).is_some()
}

/// Byte range of the number without its extension
fn body_end(caps: &Captures<'_>, match_end: usize) -> usize {
    caps.name("tail").map_or(match_end, |t| t.start())
}

pub fn find_phones(text: &str, rules: &PhoneRules) -> Vec<PhoneMatch> {
    let index = TextIndex::new(text);

    scan(&PHONE_RE, text, |caps| {
        let Some(m) = caps.get(0) else {
            return Step::Skip;
        };
        if is_digit(char_before(text, m.start())) {
            return Step::Retry;
        }

        // A digit right after the extension: fall back to the bare number
        let (end, ext) = if !is_digit(char_after(text, m.end())) {
            (m.end(), caps.name("ext").map(|e| e.as_str().to_string()))
        } else {
            let body = body_end(caps, m.end());
            if body == m.end() || is_digit(char_after(text, body)) {
                return Step::Retry;
            }
            (body, None)
        };

        let left = left_context(text, m.start(), rules.left_window);
        if blocked_by_label(left, &rules.label_prefixes) {
            return Step::Skip;
        }

        let body = &text[m.start()..body_end(caps, m.end())];
        let digits: String = body.chars().filter(char::is_ascii_digit).collect();
        let Some(normalized) = normalize_phone(&digits) else {
            return Step::Skip;
        };

        let raw = text[m.start()..end].trim().to_string();
        let found = PhoneMatch {
            start: index.char_offset(m.start()),
            end: index.char_offset(end),
            raw,
            digits,
            normalized,
            ext,
        };
        Step::Accept(found, end)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phones(text: &str) -> Vec<PhoneMatch> {
        find_phones(text, &PhoneRules::default())
    }

    #[test]
    fn test_bracketed_with_extension() {
        let found = phones("Контакт: +7 (999) 123-45-67 доб. 123.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].normalized, "+79991234567");
        assert_eq!(found[0].ext.as_deref(), Some("123"));
        assert_eq!(found[0].raw, "+7 (999) 123-45-67 доб. 123");
    }

    #[test]
    fn test_eight_prefix_with_spaces() {
        let found = phones("Позвонить: 8 999 123 45 67.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].digits, "89991234567");
        assert_eq!(found[0].normalized, "+79991234567");
        assert!(!found[0].has_ext());
    }

    #[test]
    fn test_compact() {
        let found = phones("тел 89991234567");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].normalized, "+79991234567");
        assert_eq!(found[0].start, 4);
        assert_eq!(found[0].end, 15);
    }

    #[test]
    fn test_ten_digits_without_prefix() {
        let found = phones("номер 999-123-45-67");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].normalized, "+79991234567");
    }

    #[test]
    fn test_blocked_by_contract_label() {
        assert!(phones("Номер договора: 7-321-000-11-22").is_empty());
        assert!(phones("Номер договора: 7-321-654-98-76").is_empty());
        assert!(phones("СНИЛС: 8 999 123 45 67").is_empty());
        assert!(phones("Паспорт № 8 999 123 45 67").is_empty());
    }

    #[test]
    fn test_not_inside_longer_number() {
        assert!(phones("id 1234567890123").is_empty());
    }

    #[test]
    fn test_extension_followed_by_digit_falls_back() {
        let found = phones("тел +7 999 123-45-67 доб.1234567");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ext, None);
        assert_eq!(found[0].raw, "+7 999 123-45-67");
    }

    #[test]
    fn test_trailing_label() {
        assert_eq!(trailing_label("Номер договора: ").as_deref(), Some("договора"));
        assert_eq!(trailing_label("Тел.: ").as_deref(), Some("тел"));
        assert_eq!(trailing_label("12 "), None);
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("8 (999) 123-45-67").as_deref(), Some("+79991234567"));
        assert_eq!(normalize_phone("9991234567").as_deref(), Some("+79991234567"));
        assert_eq!(normalize_phone("12345"), None);
        assert!(!is_probable_ru_phone("19991234567"));
    }
}
