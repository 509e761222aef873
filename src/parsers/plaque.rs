use crate::model::record::{Field, PlaqueRecord};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// Whole-line birth–death pair, e.g. "(1840–1926)", "1881 - 1973", "(?–1520)".
static LIFE_DATES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?\s*((?:[0-9]{3,4}|\?)\s*[-–—]\s*(?:[0-9]{3,4}|\?))\s*\)?$").unwrap()
});

// Whole-line year with an optional circa prefix: "1916", "c. 1916", "ca.1916".
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:ca?\.\s*)?[0-9]{4}$").unwrap());

const DEFAULT_MEDIUM_KEYWORDS: &[&str] = &[
    "oil on canvas",
    "oil on panel",
    "oil on board",
    "oil on paper",
    "acrylic",
    "tempera",
    "watercolor",
    "watercolour",
    "gouache",
    "pastel",
    "charcoal",
    "graphite",
    "ink on paper",
    "ink on silk",
    "bronze",
    "marble",
    "terracotta",
    "mixed media",
    "gelatin silver print",
    "lithograph",
    "etching",
    "woodcut",
    "fresco",
];

const DEFAULT_CREDIT_MARKERS: &[&str] = &[
    "Gift of",
    "Courtesy of",
    "Museum purchase",
    "Bequest of",
    "Purchased with",
    "On loan from",
    "Lent by",
    "Promised gift",
    "Collection of",
];

/// Keyword tables behind the medium and credit-line rules.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ParserRules {
    pub medium_keywords: Vec<String>,
    pub credit_markers: Vec<String>,
}

impl Default for ParserRules {
    fn default() -> Self {
        Self {
            medium_keywords: DEFAULT_MEDIUM_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            credit_markers: DEFAULT_CREDIT_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Line classifier for plaque text.
///
/// Each non-blank line is tested against these rules, first match wins:
///
/// 1. life dates (`1840–1926`, parentheses optional)
/// 2. year (`1916`, `c. 1916`)
/// 3. medium keyword anywhere in the line
/// 4. credit marker at the start of the line
/// 5. first unclaimed line → author
/// 6. next unclaimed line → title
/// 7. everything else → description
///
/// Rules 1–4 only fill an empty field; a second match goes to the description.
#[derive(Debug, Clone)]
pub struct PlaqueParser {
    medium_re: Option<Regex>,
    credit_re: Option<Regex>,
}

impl PlaqueParser {
    pub fn new(rules: &ParserRules) -> Self {
        Self {
            medium_re: keyword_regex("medium", &rules.medium_keywords, ""),
            credit_re: keyword_regex("credit", &rules.credit_markers, "^"),
        }
    }

    pub fn parse(&self, raw_text: &str) -> PlaqueRecord {
        let mut record = PlaqueRecord::default();
        let mut description: Vec<&str> = Vec::new();

        for line in raw_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (field, value) = self.classify(line, &record);
            debug!(?field, line, "classified plaque line");

            if field == Field::Description {
                description.push(value);
            } else {
                *record.slot_mut(field) = Some(value.to_string());
            }
        }

        if !description.is_empty() {
            record.description = Some(description.join(" "));
        }

        record
    }

    fn classify<'a>(&self, line: &'a str, record: &PlaqueRecord) -> (Field, &'a str) {
        let matched = if let Some(caps) = LIFE_DATES_RE.captures(line) {
            Some((Field::LifeDates, caps.get(1).map_or(line, |m| m.as_str())))
        } else if YEAR_RE.is_match(line) {
            Some((Field::Year, line))
        } else if self.is_medium(line) {
            Some((Field::Medium, line))
        } else if self.is_credit_line(line) {
            Some((Field::CreditLine, line))
        } else {
            None
        };

        match matched {
            Some((field, value)) if record.get(field).is_none() => (field, value),
            Some(_) => (Field::Description, line),
            None if record.author.is_none() => (Field::Author, line),
            None if record.title.is_none() => (Field::Title, line),
            None => (Field::Description, line),
        }
    }

    fn is_medium(&self, line: &str) -> bool {
        self.medium_re.as_ref().is_some_and(|re| re.is_match(line))
    }

    fn is_credit_line(&self, line: &str) -> bool {
        self.credit_re.as_ref().is_some_and(|re| re.is_match(line))
    }
}

/// Case-insensitive alternation of `keywords`, each matched as whole words.
///
/// `\b` is only added on an edge that is a word character, so keywords such
/// as `"oil on canvas."` still match.
fn keyword_regex(kind: &str, keywords: &[String], anchor: &str) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(bounded)
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    let pattern = format!("(?i){anchor}(?:{})", alternatives.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("{kind} keyword list rejected, {kind} detection disabled: {e}");
            None
        }
    }
}

fn bounded(keyword: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let lead = if is_word(keyword.chars().next()) { r"\b" } else { "" };
    let trail = if is_word(keyword.chars().last()) { r"\b" } else { "" };
    format!("{lead}{}{trail}", regex::escape(keyword))
}

impl Default for PlaqueParser {
    fn default() -> Self {
        Self::new(&ParserRules::default())
    }
}
