//! Built-in dictionaries and a lexicon-based morphology provider

use crate::signals::Morphology;

/// Common Russian first names, lower case
pub const FIRST_NAMES: &[&str] = &[
    "александр", "алексей", "анатолий", "андрей", "антон", "аркадий", "артём", "артем",
    "борис", "вадим", "валентин", "валерий", "василий", "виктор", "виталий", "владимир",
    "владислав", "вячеслав", "геннадий", "георгий", "глеб", "григорий", "даниил", "денис",
    "дмитрий", "евгений", "егор", "иван", "игорь", "илья", "кирилл", "константин", "лев",
    "леонид", "максим", "макс", "марк", "матвей", "михаил", "никита", "николай", "олег",
    "павел", "пётр", "петр", "роман", "руслан", "сергей", "станислав", "степан", "тимур",
    "фёдор", "федор", "юрий", "ярослав", "саша", "женя", "паша", "дима", "лёша", "леша",
    "александра", "алина", "алла", "анастасия", "анна", "валентина", "валерия", "вера",
    "вероника", "виктория", "галина", "дарья", "диана", "евгения", "екатерина", "елена",
    "елизавета", "жанна", "зоя", "инна", "ирина", "ира", "кристина", "ксения", "лариса",
    "лидия", "любовь", "людмила", "маргарита", "марина", "мария", "маша", "надежда",
    "наталья", "наталия", "нина", "оксана", "ольга", "оля", "полина", "светлана", "софья",
    "софия", "тамара", "татьяна", "ульяна", "юлия", "яна", "лена",
];

/// Short forms accepted as single-word names
pub const COMMON_SHORT_NAMES: &[&str] = &[
    "Макс", "Саша", "Женя", "Паша", "Лена", "Дима", "Маша", "Оля", "Игорь", "Ира", "Лёша", "Леша",
];

/// Units and labels that look like names but never are, lower case
pub const STOP_UNITS: &[&str] = &[
    "макс", "макс.", "мин", "мин.", "мм", "см", "м", "сек", "сек.", "кпа", "°c", "инн", "снилс",
    "паспорт", "дог.", "договор",
];

/// Substrings that make nearby text look like an address, lower case
pub const ADDRESS_CONTEXT: &[&str] = &[
    "г.", "город", "обл.", "область", "респ.", "республика", "р-н", "район", "пос.", "пгт",
    "ул.", "улица", "пр-кт", "проспект", "пер.", "переулок", "б-р", "бульвар", "шоссе", "д.",
    "дом", "корп.", "корпус", "стр.", "строение", "кв.", "квартира", "адрес", "индекс",
];

/// Interrogatives and conjunctions that start clauses, not names
pub const LEFT_STOP_WORDS: &[&str] = &["когда", "если", "где", "как", "что", "почему", "зачем"];

const NAME_PARTICLES: &[&str] = &["де", "дель", "фон", "ван", "аль"];

const SURNAME_SUFFIXES: &[&str] = &[
    "ов", "ев", "ёв", "ова", "ева", "ёва", "ин", "ын", "ина", "ына", "ский", "ская", "цкий",
    "цкая", "ской", "цкой", "енко", "ук", "юк", "чук", "ян", "янц", "дзе", "швили", "их", "ых",
];

const PATRONYMIC_SUFFIXES: &[&str] = &["ович", "евич", "ич", "овна", "евна", "ична"];

pub fn is_first_name(token: &str) -> bool {
    FIRST_NAMES.contains(&token.to_lowercase().as_str())
}

pub fn is_stop_unit(token: &str) -> bool {
    let lower = token.trim().to_lowercase();
    STOP_UNITS.contains(&lower.as_str()) || STOP_UNITS.contains(&lower.trim_matches('.'))
}

/// Morphology from word lists and suffix rules.
///
/// Coarser than a real analyzer but has no external data: first names come
/// from [`FIRST_NAMES`], surnames are recognized by their endings.
#[derive(Debug, Clone, Default)]
pub struct LexiconMorphology {
    extra_names: Vec<String>,
}

impl LexiconMorphology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add first names on top of the built-in list
    pub fn with_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.extra_names
            .extend(names.into_iter().map(|n| n.trim().to_lowercase()));
        self
    }

    fn known_name(&self, lower: &str) -> bool {
        FIRST_NAMES.contains(&lower) || self.extra_names.iter().any(|n| n == lower)
    }

    fn surname_word(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if self.known_name(&lower) || is_stop_unit(&lower) {
            return false;
        }
        SURNAME_SUFFIXES
            .iter()
            .any(|s| lower.len() > s.len() && lower.ends_with(s))
    }
}

impl Morphology for LexiconMorphology {
    fn is_person_like(&self, token: &str) -> bool {
        let lower = token.trim_matches(|c: char| c == '.' || c == ',').to_lowercase();
        if lower.is_empty() {
            return false;
        }
        self.known_name(&lower)
            || self.surname_word(&lower)
            || PATRONYMIC_SUFFIXES
                .iter()
                .any(|s| lower.len() > s.len() + 2 && lower.ends_with(s))
    }

    fn is_name_token(&self, token: &str) -> bool {
        self.known_name(&token.trim().to_lowercase())
    }

    fn is_surname_token(&self, token: &str) -> bool {
        let token = token.trim();
        let mut words = token.split_whitespace();
        // "де Ла": particle plus a capitalized word
        if let (Some(first), Some(_)) = (words.next(), words.next()) {
            return NAME_PARTICLES.contains(&first);
        }
        if token.contains('-') {
            return token.split('-').any(|part| self.surname_word(part));
        }
        self.surname_word(token)
    }
}
