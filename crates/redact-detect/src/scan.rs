//! Regex scanning with hand-checked context
//!
//! The `regex` crate has no look-around. Detectors express their context
//! conditions (digit boundaries, left-hand labels, morphology vetting) as a
//! judge closure run on every raw match.

use regex::{Captures, Regex};

/// What to do with a raw match
pub(crate) enum Step<T> {
    /// Keep `T`; resume scanning at the given byte offset
    Accept(T, usize),
    /// Drop the match and resume after it
    Skip,
    /// The match is not valid at this start; retry one character later
    Retry,
}

pub(crate) fn scan<'t, T>(
    re: &Regex,
    text: &'t str,
    mut judge: impl FnMut(&Captures<'t>) -> Step<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(m) = caps.get(0) else {
            break;
        };

        pos = match judge(&caps) {
            Step::Accept(item, resume) => {
                out.push(item);
                advance_past(text, m.start(), resume)
            }
            Step::Skip => advance_past(text, m.start(), m.end()),
            Step::Retry => next_char(text, m.start()),
        };
    }

    out
}

/// Resume offset that always makes progress
fn advance_past(text: &str, start: usize, end: usize) -> usize {
    if end > start { end } else { next_char(text, start) }
}

/// Byte offset of the character after the one at `pos`
pub(crate) fn next_char(text: &str, pos: usize) -> usize {
    pos + text[pos..].chars().next().map_or(1, char::len_utf8)
}

pub(crate) fn char_before(text: &str, pos: usize) -> Option<char> {
    text[..pos].chars().next_back()
}

pub(crate) fn char_after(text: &str, pos: usize) -> Option<char> {
    text[pos..].chars().next()
}

/// `\w` in the Unicode sense
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub(crate) fn is_digit(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

pub(crate) fn is_word(c: Option<char>) -> bool {
    c.is_some_and(is_word_char)
}

/// Up to `chars` characters immediately left of byte offset `pos`
pub(crate) fn left_context(text: &str, pos: usize, chars: usize) -> &str {
    let head = &text[..pos];
    let start = head
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map_or(pos, |(i, _)| i);
    &head[start..]
}

/// Up to `chars` characters immediately right of byte offset `pos`
pub(crate) fn right_context(text: &str, pos: usize, chars: usize) -> &str {
    let tail = &text[pos..];
    let end = tail
        .char_indices()
        .nth(chars)
        .map_or(tail.len(), |(i, _)| i);
    &tail[..end]
}

/// Lower-case a single character
pub(crate) fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_and_right_context() {
        let text = "Номер договора: 7";
        let pos = text.find('7').unwrap();
        assert_eq!(left_context(text, pos, 10), "договора: ");
        assert_eq!(left_context(text, pos, 100), "Номер договора: ");
        assert_eq!(right_context(text, 0, 5), "Номер");
        assert_eq!(right_context(text, pos, 5), "7");
    }

    #[test]
    fn test_scan_retry_moves_one_char() {
        let re = Regex::new(r"[0-9]{2}").unwrap();
        // Reject matches preceded by a digit: "123" yields nothing, "45" is kept
        let found = scan(&re, "123 45", |caps| {
            let m = caps.get(0).unwrap();
            if is_digit(char_before("123 45", m.start())) || is_digit(char_after("123 45", m.end())) {
                Step::Retry
            } else {
                Step::Accept(m.as_str().to_string(), m.end())
            }
        });
        assert_eq!(found, vec!["45".to_string()]);
    }
}
