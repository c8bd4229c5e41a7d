//! The query mini-language.
//!
//! Inputs are classified, in priority order, as a chapter number, a single
//! verse, a verse range, a comma-separated verse list, one of the random
//! keywords, or (for anything else) a free-text search.
//!
//! ```
//! use quranic::{Language, ParsedQuery, query::parse};
//!
//! assert_eq!(
//!     parse("2:255", Language::English),
//!     ParsedQuery::Verse { chapter: 2, verse: 255 }
//! );
//! assert_eq!(
//!     parse("18 1-10", Language::English),
//!     ParsedQuery::VerseRange { chapter: 18, start: 1, end: 10 }
//! );
//! ```

use std::{fmt, sync::LazyLock};

use regex_lite::Regex;
use serde::Serialize;

use crate::language::Language;

static CHAPTER_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)$").expect("valid regex"));
static SINGLE_VERSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[:\s]+(\d+)$").expect("valid regex"));
static VERSE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)[:\s]+(\d+)[-\s]+(\d+)$").expect("valid regex")
});
static VERSE_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+:\d+(?:-\d+)?\s*,\s*)*\d+:\d+(?:-\d+)?$")
        .expect("valid regex")
});
static LIST_VERSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+)$").expect("valid regex"));
static LIST_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+)-(\d+)$").expect("valid regex"));

pub const EMPTY_QUERY: &str = "Empty query";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParsedQuery {
    Verse {
        chapter: u32,
        verse: u32,
    },
    /// Inclusive on both ends. `start > end` is kept as written.
    VerseRange {
        chapter: u32,
        start: u32,
        end: u32,
    },
    MultipleVerses {
        chapter: u32,
        verses: Vec<u32>,
    },
    Chapter {
        chapter: u32,
    },
    Search {
        term: String,
        language: Language,
        fuzzy: bool,
    },
    RandomChapter,
    RandomVerse,
    Invalid {
        reason: String,
    },
}

/// Payload-free tag of a [`ParsedQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryKind {
    Verse,
    VerseRange,
    MultipleVerses,
    Chapter,
    Search,
    RandomChapter,
    RandomVerse,
    Invalid,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Verse => "verse",
            QueryKind::VerseRange => "verseRange",
            QueryKind::MultipleVerses => "multipleVerses",
            QueryKind::Chapter => "chapter",
            QueryKind::Search => "search",
            QueryKind::RandomChapter => "randomChapter",
            QueryKind::RandomVerse => "randomVerse",
            QueryKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParsedQuery {
    pub fn kind(&self) -> QueryKind {
        match self {
            ParsedQuery::Verse { .. } => QueryKind::Verse,
            ParsedQuery::VerseRange { .. } => QueryKind::VerseRange,
            ParsedQuery::MultipleVerses { .. } => QueryKind::MultipleVerses,
            ParsedQuery::Chapter { .. } => QueryKind::Chapter,
            ParsedQuery::Search { .. } => QueryKind::Search,
            ParsedQuery::RandomChapter => QueryKind::RandomChapter,
            ParsedQuery::RandomVerse => QueryKind::RandomVerse,
            ParsedQuery::Invalid { .. } => QueryKind::Invalid,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ParsedQuery::Invalid { .. })
    }

    /// Switch a search to contiguous-phrase matching. Other variants are
    /// returned unchanged.
    pub fn exact(self) -> Self {
        match self {
            ParsedQuery::Search { term, language, .. } => ParsedQuery::Search {
                term,
                language,
                fuzzy: false,
            },
            other => other,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        ParsedQuery::Invalid {
            reason: reason.into(),
        }
    }
}

/// Classify `input` into a [`ParsedQuery`].
///
/// The input is trimmed and lower-cased first. Free-text searches use
/// `default_language` and fuzzy matching. Never panics: malformed or
/// out-of-range numbers produce [`ParsedQuery::Invalid`].
pub fn parse(input: &str, default_language: Language) -> ParsedQuery {
    let query = input.trim().to_lowercase();
    if query.is_empty() {
        return ParsedQuery::invalid(EMPTY_QUERY);
    }

    let parsed = classify(&query, default_language);
    tracing::debug!(input = %query, kind = %parsed.kind(), "parsed query");
    parsed
}

fn classify(query: &str, default_language: Language) -> ParsedQuery {
    if let Some(caps) = CHAPTER_ONLY.captures(query) {
        return match number(&caps[1]) {
            Ok(chapter) => ParsedQuery::Chapter { chapter },
            Err(invalid) => invalid,
        };
    }

    if let Some(caps) = SINGLE_VERSE.captures(query) {
        return match (number(&caps[1]), number(&caps[2])) {
            (Ok(chapter), Ok(verse)) => ParsedQuery::Verse { chapter, verse },
            (Err(invalid), _) | (_, Err(invalid)) => invalid,
        };
    }

    if let Some(caps) = VERSE_RANGE.captures(query) {
        return match (number(&caps[1]), number(&caps[2]), number(&caps[3])) {
            (Ok(chapter), Ok(start), Ok(end)) => {
                ParsedQuery::VerseRange { chapter, start, end }
            }
            (Err(invalid), _, _)
            | (_, Err(invalid), _)
            | (_, _, Err(invalid)) => invalid,
        };
    }

    if VERSE_LIST.is_match(query) {
        return parse_list(query);
    }

    match query {
        "random chapter" => ParsedQuery::RandomChapter,
        "random verse" => ParsedQuery::RandomVerse,
        _ => ParsedQuery::Search {
            term: query.to_string(),
            language: default_language,
            fuzzy: true,
        },
    }
}

/// Parse a comma-separated list. Only lists of single verses from one
/// chapter are supported; ranges inside a list and lists that span
/// chapters are rejected.
fn parse_list(query: &str) -> ParsedQuery {
    let mut parsed = Vec::new();
    for segment in query.split(',').map(str::trim) {
        match parse_segment(segment) {
            Some(sub @ (ParsedQuery::Verse { .. } | ParsedQuery::VerseRange { .. })) => {
                parsed.push(sub)
            }
            Some(invalid) => return invalid,
            None => {
                return ParsedQuery::invalid(format!(
                    "Invalid sub-query: {segment}"
                ));
            }
        }
    }

    let mut chapter = None;
    let mut verses = Vec::with_capacity(parsed.len());
    for sub in &parsed {
        let ParsedQuery::Verse { chapter: c, verse } = *sub else {
            return unsupported_list();
        };
        match chapter {
            None => chapter = Some(c),
            Some(existing) if existing != c => return unsupported_list(),
            Some(_) => {}
        }
        verses.push(verse);
    }

    match chapter {
        Some(chapter) => ParsedQuery::MultipleVerses { chapter, verses },
        None => unsupported_list(),
    }
}

fn parse_segment(segment: &str) -> Option<ParsedQuery> {
    if let Some(caps) = LIST_VERSE.captures(segment) {
        return Some(match (number(&caps[1]), number(&caps[2])) {
            (Ok(chapter), Ok(verse)) => ParsedQuery::Verse { chapter, verse },
            (Err(invalid), _) | (_, Err(invalid)) => invalid,
        });
    }

    let caps = LIST_RANGE.captures(segment)?;
    Some(match (number(&caps[1]), number(&caps[2]), number(&caps[3])) {
        (Ok(chapter), Ok(start), Ok(end)) => {
            ParsedQuery::VerseRange { chapter, start, end }
        }
        (Err(invalid), _, _) | (_, Err(invalid), _) | (_, _, Err(invalid)) => {
            invalid
        }
    })
}

fn unsupported_list() -> ParsedQuery {
    ParsedQuery::invalid(
        "Multiple chapters or ranges not supported in multipleVerses",
    )
}

fn number(digits: &str) -> Result<u32, ParsedQuery> {
    digits
        .parse::<u32>()
        .map_err(|_| ParsedQuery::invalid(format!("Number out of range: {digits}")))
}
