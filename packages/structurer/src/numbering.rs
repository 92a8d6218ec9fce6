//! Number parsing and normalization for content units and divisions.
//!
//! Content unit numbers show up in many spellings for the same provision
//! ("4o-A", "4o A", "4º.-A"); everything downstream joins on the canonical
//! form produced here.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Latin multiplicative suffixes, in canonical spelling.
const LATIN_SUFFIXES: &[&str] = &[
    "Bis", "Ter", "Quáter", "Quinquies", "Sexies", "Septies", "Octies", "Nonies", "Decies",
];

/// Ordinal words used to number divisions and transitional provisions.
const ORDINAL_WORDS: &[(&str, u32)] = &[
    ("UNICO", 1),
    ("PRIMERO", 1),
    ("PRIMERA", 1),
    ("SEGUNDO", 2),
    ("SEGUNDA", 2),
    ("TERCERO", 3),
    ("TERCERA", 3),
    ("CUARTO", 4),
    ("CUARTA", 4),
    ("QUINTO", 5),
    ("QUINTA", 5),
    ("SEXTO", 6),
    ("SEXTA", 6),
    ("SEPTIMO", 7),
    ("SEPTIMA", 7),
    ("OCTAVO", 8),
    ("OCTAVA", 8),
    ("NOVENO", 9),
    ("NOVENA", 9),
    ("DECIMO", 10),
    ("DECIMA", 10),
    ("FIRST", 1),
    ("SECOND", 2),
    ("THIRD", 3),
    ("FOURTH", 4),
    ("FIFTH", 5),
    ("SIXTH", 6),
    ("SEVENTH", 7),
    ("EIGHTH", 8),
    ("NINTH", 9),
    ("TENTH", 10),
    ("SOLE", 1),
];

/// Numeric unit number: optional dotted prefix, base, ordinal marker, letter, Latin suffix.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?:(?P<prefix>(?:\d+\.)*\d+)\.)?
        (?P<base>\d+)
        \s*(?P<ordinal>[oº°])?\.?
        (?:\s*[-–]?\s*(?P<letter>[A-Z])\b)?
        (?:\s*[-–]?\s*(?P<latin>(?i:bis|ter|qu[áa]ter|quinquies|sexies|septies|octies|nonies|decies))\b)?
        \s*$",
    )
    .expect("valid regex")
});

/// Strict Roman numeral (1..3999).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ROMAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^M{0,3}(?:CM|CD|D?C{0,3})(?:XC|XL|L?X{0,3})(?:IX|IV|V?I{0,3})$")
        .expect("valid regex")
});

/// A content unit number split into its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedNumber {
    /// Dotted prefix for hierarchical numbering (e.g. "2.1" in "2.1.4").
    pub prefix: Option<String>,

    /// Integer part used for sequence checks.
    pub base: u32,

    /// Whether the number carried an ordinal marker ("1o", "1º").
    pub ordinal_marker: bool,

    /// Single capital letter suffix ("84-E").
    pub letter: Option<String>,

    /// Latin multiplicative suffix in canonical spelling ("Bis").
    pub latin: Option<String>,

    /// Ordinal word the number was written as ("PRIMERO"), if any.
    pub word: Option<String>,
}

impl NormalizedNumber {
    /// A plain integer number.
    #[must_use]
    pub fn plain(base: u32) -> Self {
        Self {
            prefix: None,
            base,
            ordinal_marker: false,
            letter: None,
            latin: None,
            word: None,
        }
    }

    /// A plain number under a dotted prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Combined letter and Latin suffix ("A-Bis"), if any.
    #[must_use]
    pub fn suffix(&self) -> Option<String> {
        match (&self.letter, &self.latin) {
            (None, None) => None,
            (Some(l), None) => Some(l.clone()),
            (None, Some(t)) => Some(t.clone()),
            (Some(l), Some(t)) => Some(format!("{l}-{t}")),
        }
    }

    /// Whether this number has no suffix.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.letter.is_none() && self.latin.is_none()
    }

    /// Canonical string used as the join key.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(word) = &self.word {
            return write!(f, "{word}");
        }
        if let Some(prefix) = &self.prefix {
            write!(f, "{prefix}.")?;
        }
        write!(f, "{}", self.base)?;
        if self.ordinal_marker {
            f.write_str("o")?;
        }
        if let Some(letter) = &self.letter {
            write!(f, "-{letter}")?;
        }
        if let Some(latin) = &self.latin {
            write!(f, "-{latin}")?;
        }
        Ok(())
    }
}

/// Normalize a raw content unit number.
///
/// Returns `None` when the text is not a recognizable number.
///
/// # Examples
/// ```
/// use regelrecht_structurer::numbering::normalize_number;
///
/// let a = normalize_number("4o-A").unwrap();
/// let b = normalize_number("4o A").unwrap();
/// assert_eq!(a.canonical(), "4o-A");
/// assert_eq!(a, b);
/// assert_eq!(normalize_number("5 bis").unwrap().canonical(), "5-Bis");
/// ```
#[must_use]
pub fn normalize_number(raw: &str) -> Option<NormalizedNumber> {
    let raw = raw.trim().trim_end_matches(['.', '-', '–', ':']).trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = NUMERIC_PATTERN.captures(raw) {
        let base = caps.name("base")?.as_str().parse().ok()?;
        return Some(NormalizedNumber {
            prefix: caps.name("prefix").map(|m| m.as_str().to_string()),
            base,
            ordinal_marker: caps.name("ordinal").is_some(),
            letter: caps.name("letter").map(|m| m.as_str().to_string()),
            latin: caps.name("latin").and_then(|m| canonical_latin(m.as_str())),
            word: None,
        });
    }

    let folded = fold_accents(raw).to_uppercase();
    ordinal_word_value(&folded).map(|base| NormalizedNumber {
        prefix: None,
        base,
        ordinal_marker: false,
        letter: None,
        latin: None,
        word: Some(folded),
    })
}

/// Integer value of a division number written as digits, Roman numeral or ordinal word.
///
/// Unknown spellings map to 0 so they sort first without aborting.
#[must_use]
pub fn ordinal_value(number: &str) -> u32 {
    let trimmed = number.trim().trim_end_matches(['.', '-', ':']).trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return n;
    }
    let upper = fold_accents(trimmed).to_uppercase();
    if let Some(n) = roman_value(&upper) {
        return n;
    }
    ordinal_word_value(&upper).unwrap_or(0)
}

/// Parse a Roman numeral, rejecting malformed ones.
#[must_use]
pub fn roman_value(text: &str) -> Option<u32> {
    if text.is_empty() || !ROMAN_PATTERN.is_match(text) {
        return None;
    }
    let digit = |c: char| match c {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => 0,
    };
    let values: Vec<u32> = text.chars().map(digit).collect();
    let mut total = 0;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total -= *value as i64,
            _ => total += *value as i64,
        }
    }
    u32::try_from(total).ok()
}

fn ordinal_word_value(upper: &str) -> Option<u32> {
    ORDINAL_WORDS
        .iter()
        .find(|(word, _)| *word == upper)
        .map(|(_, value)| *value)
}

fn canonical_latin(text: &str) -> Option<String> {
    let folded = fold_accents(text).to_lowercase();
    LATIN_SUFFIXES
        .iter()
        .find(|s| fold_accents(s).to_lowercase() == folded)
        .map(|s| (*s).to_string())
}

/// Strip Spanish accents so ordinal words compare regardless of spelling.
#[must_use]
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain() {
        let n = normalize_number("12").unwrap();
        assert_eq!(n.base, 12);
        assert!(n.is_bare());
        assert_eq!(n.canonical(), "12");
    }

    #[test]
    fn test_normalize_spelling_variants_agree() {
        let variants = ["4o-A", "4o A", "4º-A", "4° A", "4o.-A", "4oA"];
        for variant in variants {
            assert_eq!(
                normalize_number(variant).map(|n| n.canonical()),
                Some("4o-A".to_string()),
                "variant {variant}"
            );
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["4o A", "84-E", "5 bis", "10 Quater", "2.1.4", "7-A-Ter"] {
            let once = normalize_number(raw).unwrap().canonical();
            let twice = normalize_number(&once).unwrap().canonical();
            assert_eq!(once, twice, "raw {raw}");
        }
    }

    #[test]
    fn test_normalize_latin_suffix() {
        assert_eq!(normalize_number("5 bis").unwrap().canonical(), "5-Bis");
        assert_eq!(normalize_number("5-BIS").unwrap().canonical(), "5-Bis");
        assert_eq!(normalize_number("10 quater").unwrap().canonical(), "10-Quáter");
        assert_eq!(normalize_number("7 A Ter").unwrap().canonical(), "7-A-Ter");
    }

    #[test]
    fn test_normalize_letter_not_confused_with_latin() {
        let n = normalize_number("6 Bis").unwrap();
        assert_eq!(n.letter, None);
        assert_eq!(n.latin.as_deref(), Some("Bis"));
    }

    #[test]
    fn test_normalize_dotted() {
        let n = normalize_number("2.1.4").unwrap();
        assert_eq!(n.prefix.as_deref(), Some("2.1"));
        assert_eq!(n.base, 4);
        assert_eq!(n.canonical(), "2.1.4");
    }

    #[test]
    fn test_normalize_ordinal_word() {
        let n = normalize_number("Primero").unwrap();
        assert_eq!(n.base, 1);
        assert_eq!(n.canonical(), "PRIMERO");
        assert_eq!(normalize_number("Único").unwrap().canonical(), "UNICO");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_number("").is_none());
        assert!(normalize_number("abc").is_none());
        assert!(normalize_number("4 de la Ley").is_none());
    }

    #[test]
    fn test_suffix_combines_parts() {
        assert_eq!(normalize_number("7 A Ter").unwrap().suffix().as_deref(), Some("A-Ter"));
        assert_eq!(normalize_number("84-E").unwrap().suffix().as_deref(), Some("E"));
        assert_eq!(normalize_number("84").unwrap().suffix(), None);
    }

    #[test]
    fn test_ordinal_value() {
        assert_eq!(ordinal_value("3"), 3);
        assert_eq!(ordinal_value("IV"), 4);
        assert_eq!(ordinal_value("XIV."), 14);
        assert_eq!(ordinal_value("SEGUNDO"), 2);
        assert_eq!(ordinal_value("Décimo"), 10);
        assert_eq!(ordinal_value("whatever"), 0);
    }

    #[test]
    fn test_roman_value_rejects_malformed() {
        assert_eq!(roman_value("MCMXCIV"), Some(1994));
        assert_eq!(roman_value("IIII"), None);
        assert_eq!(roman_value("IC"), None);
        assert_eq!(roman_value(""), None);
    }
}
