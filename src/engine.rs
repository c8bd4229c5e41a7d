//! Evaluation of a [`ParsedQuery`] against a [`Corpus`].
//!
//! Evaluation performs no I/O and never fails: anything out of range
//! yields an empty result. Results borrow from the corpus.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    corpus::Corpus,
    language::{Language, TextField},
    query::ParsedQuery,
    record::Verse,
};

/// Hard cap on the number of search matches collected.
pub const SEARCH_RESULT_CAP: usize = 500;

/// Search terms this short (in characters) never match.
pub const MIN_SEARCH_TERM_CHARS: usize = 3;

/// Which optional text fields a search also looks at, mirroring what the
/// reader has chosen to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    pub subtitles: bool,
    pub footnotes: bool,
}

impl Default for SearchScope {
    fn default() -> Self {
        Self {
            subtitles: true,
            footnotes: true,
        }
    }
}

impl SearchScope {
    pub const BODY_ONLY: SearchScope = SearchScope {
        subtitles: false,
        footnotes: false,
    };
}

/// Execute `query`. `rng` is only consulted by the random variants.
pub fn evaluate<'c, R: Rng + ?Sized>(
    corpus: &'c Corpus,
    query: &ParsedQuery,
    scope: SearchScope,
    rng: &mut R,
) -> Vec<&'c Verse> {
    match query {
        ParsedQuery::Verse { chapter, verse } => {
            fetch_verse(corpus, *chapter, *verse)
        }
        ParsedQuery::VerseRange {
            chapter,
            start,
            end,
        } => fetch_range(corpus, *chapter, *start, *end),
        ParsedQuery::MultipleVerses { chapter, verses } => {
            fetch_multiple(corpus, *chapter, verses)
        }
        ParsedQuery::Chapter { chapter } => fetch_chapter(corpus, *chapter),
        ParsedQuery::Search {
            term,
            language,
            fuzzy,
        } => search(corpus, term, *language, *fuzzy, scope),
        ParsedQuery::RandomChapter => random_chapter(corpus, rng),
        ParsedQuery::RandomVerse => random_verse(corpus, rng).into_iter().collect(),
        ParsedQuery::Invalid { .. } => Vec::new(),
    }
}

pub fn fetch_verse(corpus: &Corpus, chapter: u32, verse: u32) -> Vec<&Verse> {
    corpus.verse(chapter, verse).into_iter().collect()
}

/// Verses of `chapter` numbered within `start..=end`. Bounds are not
/// swapped, so `start > end` is empty.
pub fn fetch_range(
    corpus: &Corpus,
    chapter: u32,
    start: u32,
    end: u32,
) -> Vec<&Verse> {
    corpus
        .verses_in_chapter(chapter)
        .into_iter()
        .filter(|v| (start..=end).contains(&v.verse_number))
        .collect()
}

/// Verses of `chapter` whose number was requested, in chapter order.
/// Duplicates in `verses` collapse.
pub fn fetch_multiple<'c>(
    corpus: &'c Corpus,
    chapter: u32,
    verses: &[u32],
) -> Vec<&'c Verse> {
    let wanted: HashSet<u32> = verses.iter().copied().collect();
    corpus
        .verses_in_chapter(chapter)
        .into_iter()
        .filter(|v| wanted.contains(&v.verse_number))
        .collect()
}

pub fn fetch_chapter(corpus: &Corpus, chapter: u32) -> Vec<&Verse> {
    corpus.verses_in_chapter(chapter)
}

/// Substring search over verse bodies in `language`, plus subtitles and
/// footnotes when `scope` includes them.
///
/// Fuzzy matching requires every space-separated word of the term to
/// occur somewhere in one field; exact matching requires the whole term
/// as one substring. Results are in corpus order and stop at
/// [`SEARCH_RESULT_CAP`].
pub fn search<'c>(
    corpus: &'c Corpus,
    term: &str,
    language: Language,
    fuzzy: bool,
    scope: SearchScope,
) -> Vec<&'c Verse> {
    let query = term.trim().to_lowercase();
    if query.chars().count() < MIN_SEARCH_TERM_CHARS {
        return Vec::new();
    }

    let matcher = Matcher::new(&query, fuzzy);
    let mut results = Vec::new();
    let mut scanned = 0usize;

    for verse in corpus.verses() {
        scanned += 1;
        let body = corpus.primary_text(verse, language);
        let subtitle = scope
            .subtitles
            .then(|| corpus.localized(verse, language, TextField::Subtitle))
            .flatten();
        let footnote = scope
            .footnotes
            .then(|| corpus.localized(verse, language, TextField::Footnote))
            .flatten();

        let hit = std::iter::once(body)
            .chain(subtitle)
            .chain(footnote)
            .any(|text| matcher.matches(&text.to_lowercase()));

        if hit {
            results.push(verse);
            if results.len() >= SEARCH_RESULT_CAP {
                break;
            }
        }
    }

    tracing::debug!(
        term = %query,
        %language,
        fuzzy,
        scanned,
        matched = results.len(),
        capped = results.len() >= SEARCH_RESULT_CAP,
        "search finished"
    );
    results
}

/// A whole chapter picked uniformly from the chapters in the corpus.
pub fn random_chapter<'c, R: Rng + ?Sized>(
    corpus: &'c Corpus,
    rng: &mut R,
) -> Vec<&'c Verse> {
    match corpus.chapter_numbers().choose(rng) {
        Some(&chapter) => fetch_chapter(corpus, chapter),
        None => Vec::new(),
    }
}

/// One verse picked uniformly from the whole corpus.
pub fn random_verse<'c, R: Rng + ?Sized>(
    corpus: &'c Corpus,
    rng: &mut R,
) -> Option<&'c Verse> {
    corpus.verses().choose(rng)
}

/// Human-readable result count: `"500+"` once the search cap is reached.
pub fn count_label(count: usize) -> String {
    if count >= SEARCH_RESULT_CAP {
        format!("{SEARCH_RESULT_CAP}+")
    } else {
        count.to_string()
    }
}

enum Matcher<'q> {
    Fuzzy(Vec<&'q str>),
    Exact(&'q str),
}

impl<'q> Matcher<'q> {
    fn new(query: &'q str, fuzzy: bool) -> Self {
        if fuzzy {
            Matcher::Fuzzy(query.split(' ').filter(|w| !w.is_empty()).collect())
        } else {
            Matcher::Exact(query)
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Fuzzy(words) => words.iter().all(|w| text.contains(w)),
            Matcher::Exact(query) => text.contains(query),
        }
    }
}
