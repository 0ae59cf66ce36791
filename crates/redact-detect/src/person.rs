//! Personal name detection (Russian full names)

use std::fmt;
use std::sync::LazyLock;

use redact_core::TextIndex;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::lexicon::{COMMON_SHORT_NAMES, LEFT_STOP_WORDS};
use crate::scan::{Step, char_after, is_word, left_context, scan};
use crate::signals::Morphology;

const CAP: &str = r"[А-ЯЁ][а-яё]+";
const INITIALS: &str = r"[А-ЯЁ]\.\s*[А-ЯЁ]\.";
const PATRONYMIC: &str = r"[А-ЯЁ][а-яё]+(?:ович|евич|ич|овна|евна|ична)";

fn surname() -> String {
    format!(r"(?:{CAP}(?:-{CAP})*|(?:де|дель|фон|ван|аль)\s+{CAP})")
}

static SURNAME_INITIALS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?P<surname>{})\s+(?P<init>{INITIALS})", surname())).unwrap()
});

static INITIALS_SURNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?P<init>{INITIALS})\s+(?P<surname>{})\b", surname())).unwrap()
});

static NAME_SURNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?P<name>{CAP})\s+(?P<surname>{})\b", surname())).unwrap()
});

static SURNAME_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<surname>{})\s+(?P<name>{CAP})(?:\s+(?P<patr>{PATRONYMIC}))?\b",
        surname()
    ))
    .unwrap()
});

static SINGLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[А-ЯЁ][а-яё]{2,}\b").unwrap());

/// Which name shape matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonPattern {
    /// `Иванов И.И.`
    SurnameInitials,
    /// `И.И. Иванов`
    InitialsSurname,
    /// `Пётр Сидоров`
    NameSurname,
    /// `Сидоров Пётр Ильич`
    SurnameName,
    /// `Макс`, only when single names are enabled
    SingleName,
}

impl PersonPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonPattern::SurnameInitials => "SN+I",
            PersonPattern::InitialsSurname => "I+SN",
            PersonPattern::NameSurname => "N+SN",
            PersonPattern::SurnameName => "SN+N(+P)",
            PersonPattern::SingleName => "N",
        }
    }
}

impl fmt::Display for PersonPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning for person detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRules {
    /// Also report lone capitalized first names
    pub allow_single_name: bool,
    /// Characters to the left inspected for a clause-starting word
    pub left_window: usize,
}

impl Default for PersonRules {
    fn default() -> Self {
        Self {
            allow_single_name: false,
            left_window: 24,
        }
    }
}

/// A name found in text. Offsets are code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonMatch {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    pub pattern: PersonPattern,
}

/// Does the word right before `pos` open a clause ("когда Иванов ...")?
fn bad_left_context(text: &str, pos: usize, window: usize) -> bool {
    let left = left_context(text, pos, window).trim_end();
    let word: String = left
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    !word.is_empty() && LEFT_STOP_WORDS.contains(&word.to_lowercase().as_str())
}

struct PersonScanner<'a> {
    text: &'a str,
    index: TextIndex<'a>,
    morphology: &'a dyn Morphology,
    rules: &'a PersonRules,
}

impl<'a> PersonScanner<'a> {
    /// Scan one pattern. `vet` decides, from the captures, whether the
    /// morphology accepts the name parts.
    fn run(
        &self,
        re: &Regex,
        pattern: PersonPattern,
        vet: impl Fn(&Captures<'a>) -> bool,
    ) -> Vec<PersonMatch> {
        let text = self.text;
        scan(re, text, |caps| {
            let Some(m) = caps.get(0) else {
                return Step::Skip;
            };
            // Initials end on a dot, where \b cannot express "no letter follows"
            if is_word(char_after(text, m.end())) {
                return Step::Retry;
            }
            if !vet(caps) {
                return Step::Retry;
            }
            if bad_left_context(text, m.start(), self.rules.left_window) {
                return Step::Skip;
            }
            let found = PersonMatch {
                start: self.index.char_offset(m.start()),
                end: self.index.char_offset(m.end()),
                raw: m.as_str().to_string(),
                pattern,
            };
            Step::Accept(found, m.end())
        })
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// All name spans, pattern by pattern. Matches from different patterns may
/// overlap; the resolver settles that.
pub fn find_persons(
    text: &str,
    morphology: &dyn Morphology,
    rules: &PersonRules,
) -> Vec<PersonMatch> {
    let scanner = PersonScanner {
        text,
        index: TextIndex::new(text),
        morphology,
        rules,
    };
    let m = scanner.morphology;

    let mut out = scanner.run(&SURNAME_INITIALS_RE, PersonPattern::SurnameInitials, |c| {
        m.is_surname_token(group(c, "surname"))
    });
    out.extend(scanner.run(&INITIALS_SURNAME_RE, PersonPattern::InitialsSurname, |c| {
        m.is_surname_token(group(c, "surname"))
    }));
    out.extend(scanner.run(&NAME_SURNAME_RE, PersonPattern::NameSurname, |c| {
        m.is_name_token(group(c, "name")) && m.is_surname_token(group(c, "surname"))
    }));
    out.extend(scanner.run(&SURNAME_NAME_RE, PersonPattern::SurnameName, |c| {
        m.is_surname_token(group(c, "surname")) && m.is_name_token(group(c, "name"))
    }));

    if rules.allow_single_name {
        out.extend(scanner.run(&SINGLE_NAME_RE, PersonPattern::SingleName, |c| {
            let token = c.get(0).map_or("", |t| t.as_str());
            m.is_name_token(token) || COMMON_SHORT_NAMES.contains(&token)
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconMorphology;
    use crate::signals::PermissiveMorphology;

    fn raws(found: &[PersonMatch]) -> Vec<&str> {
        found.iter().map(|p| p.raw.as_str()).collect()
    }

    #[test]
    fn test_mixed_patterns_with_lexicon() {
        let text = "Выступал Иванов И.И., затем Анна-Мария де Ла Крус и Пётр Сидоров.";
        let found = find_persons(text, &LexiconMorphology::new(), &PersonRules::default());
        let raws = raws(&found);
        assert!(raws.contains(&"Иванов И.И."));
        assert!(raws.contains(&"Пётр Сидоров"));
        assert!(!raws.iter().any(|r| r.contains("Выступал")));
    }

    #[test]
    fn test_surname_initials_offsets() {
        let text = "СНИЛС есть; Иванов И.И.";
        let found = find_persons(text, &PermissiveMorphology, &PersonRules::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern, PersonPattern::SurnameInitials);
        assert_eq!(found[0].start, 12);
        assert_eq!(found[0].end, 23);
    }

    #[test]
    fn test_initials_surname() {
        let found = find_persons("Подписал И. И. Петров", &LexiconMorphology::new(), &PersonRules::default());
        assert_eq!(raws(&found), vec!["И. И. Петров"]);
        assert_eq!(found[0].pattern, PersonPattern::InitialsSurname);
    }

    #[test]
    fn test_surname_name_patronymic() {
        let found = find_persons(
            "Ответчик: Сидоров Пётр Ильич, 1980 г.р.",
            &LexiconMorphology::new(),
            &PersonRules::default(),
        );
        assert_eq!(raws(&found), vec!["Сидоров Пётр Ильич"]);
        assert_eq!(found[0].pattern.as_str(), "SN+N(+P)");
    }

    #[test]
    fn test_rejected_prefix_does_not_hide_name() {
        // "Коллега" is no first name, but the retry still finds the real one
        let found = find_persons("Коллега Макс Иванов", &LexiconMorphology::new(), &PersonRules::default());
        assert!(raws(&found).contains(&"Макс Иванов"));
    }

    #[test]
    fn test_bad_left_context() {
        let found = find_persons("Спросил, где Пётр Сидоров", &LexiconMorphology::new(), &PersonRules::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_single_names_off_by_default() {
        let text = "Привет, Макс!";
        assert!(find_persons(text, &LexiconMorphology::new(), &PersonRules::default()).is_empty());

        let rules = PersonRules {
            allow_single_name: true,
            ..PersonRules::default()
        };
        let found = find_persons(text, &LexiconMorphology::new(), &rules);
        assert_eq!(raws(&found), vec!["Макс"]);
        assert_eq!(found[0].pattern, PersonPattern::SingleName);
    }
}
