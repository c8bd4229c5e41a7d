//! Rendering verse lists for copy/share and for structured output.

use serde::Serialize;

use crate::{
    corpus::Corpus,
    engine::SearchScope,
    language::{Language, SecondaryLanguage, TextField},
    record::Verse,
};

/// Snapshot of the reader's display settings, passed in per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPreferences {
    pub show_subtitles: bool,
    pub show_footnotes: bool,
    pub show_arabic: bool,
    pub show_transliteration: bool,
    pub primary_language: Language,
    pub secondary_language: SecondaryLanguage,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            show_subtitles: true,
            show_footnotes: true,
            show_arabic: false,
            show_transliteration: false,
            primary_language: Language::English,
            secondary_language: SecondaryLanguage::None,
        }
    }
}

impl DisplayPreferences {
    /// Everything optional turned off: only the primary text is shown.
    pub fn minimal() -> Self {
        Self {
            show_subtitles: false,
            show_footnotes: false,
            show_arabic: false,
            show_transliteration: false,
            primary_language: Language::English,
            secondary_language: SecondaryLanguage::None,
        }
    }

    /// Searches look at the same optional fields the reader displays.
    pub fn search_scope(&self) -> SearchScope {
        SearchScope {
            subtitles: self.show_subtitles,
            footnotes: self.show_footnotes,
        }
    }
}

/// Render `verses` as one plain-text block.
///
/// Per verse, in order and each followed by a blank line: subtitle,
/// `[id] primary text`, `[id] secondary text`, Arabic, transliteration,
/// footnote. Blocks that are switched off or have no text are left out.
/// The result is trimmed.
pub fn format_verses(
    corpus: &Corpus,
    verses: &[&Verse],
    prefs: &DisplayPreferences,
) -> String {
    let mut out = String::new();
    let mut block = |text: &str| {
        out.push_str(text);
        out.push_str("\n\n");
    };

    for verse in verses {
        let language = prefs.primary_language;

        if prefs.show_subtitles
            && let Some(subtitle) =
                corpus.localized(verse, language, TextField::Subtitle)
        {
            block(subtitle);
        }

        block(&format!(
            "[{}] {}",
            verse.verse_id,
            corpus.primary_text(verse, language)
        ));

        if let Some(secondary) =
            corpus.secondary_text(verse, prefs.secondary_language)
        {
            block(&format!("[{}] {secondary}", verse.verse_id));
        }

        if prefs.show_arabic && !verse.verse_text_arabic.is_empty() {
            block(&verse.verse_text_arabic);
        }

        if prefs.show_transliteration
            && !verse.verse_text_transliterated.is_empty()
        {
            block(&verse.verse_text_transliterated);
        }

        if prefs.show_footnotes
            && let Some(footnote) =
                corpus.localized(verse, language, TextField::Footnote)
        {
            block(footnote);
        }
    }

    out.trim().to_string()
}

/// A verse projected through a [`DisplayPreferences`] snapshot. Hidden or
/// missing blocks are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseView {
    pub verse_id: String,
    pub chapter: u32,
    pub verse: u32,
    pub chapter_title: String,
    pub text: String,
    pub secondary_text: Option<String>,
    pub subtitle: Option<String>,
    pub footnote: Option<String>,
    pub arabic: Option<String>,
    pub transliteration: Option<String>,
}

impl VerseView {
    pub fn new(corpus: &Corpus, verse: &Verse, prefs: &DisplayPreferences) -> Self {
        let language = prefs.primary_language;
        let optional = |shown: bool, field: TextField| {
            shown
                .then(|| corpus.localized(verse, language, field))
                .flatten()
                .map(str::to_string)
        };
        let raw = |shown: bool, text: &str| {
            (shown && !text.is_empty()).then(|| text.to_string())
        };

        Self {
            verse_id: verse.verse_id.clone(),
            chapter: verse.chapter_number,
            verse: verse.verse_number,
            chapter_title: corpus
                .localized(verse, language, TextField::ChapterTitle)
                .unwrap_or_default()
                .to_string(),
            text: corpus.primary_text(verse, language).to_string(),
            secondary_text: corpus
                .secondary_text(verse, prefs.secondary_language)
                .map(str::to_string),
            subtitle: optional(prefs.show_subtitles, TextField::Subtitle),
            footnote: optional(prefs.show_footnotes, TextField::Footnote),
            arabic: raw(prefs.show_arabic, &verse.verse_text_arabic),
            transliteration: raw(
                prefs.show_transliteration,
                &verse.verse_text_transliterated,
            ),
        }
    }
}
