//! Display languages and the text fields that vary per language.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A language the corpus carries verse text for.
///
/// English is always present in the primary records; the other eight come
/// from the foreign-language overlay and may be missing per verse.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Turkish,
    French,
    German,
    Bahasa,
    Persian,
    Tamil,
    Swedish,
    Russian,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::Turkish,
        Language::French,
        Language::German,
        Language::Bahasa,
        Language::Persian,
        Language::Tamil,
        Language::Swedish,
        Language::Russian,
    ];

    /// The eight languages served by the foreign overlay.
    pub const FOREIGN: [Language; 8] = [
        Language::Turkish,
        Language::French,
        Language::German,
        Language::Bahasa,
        Language::Persian,
        Language::Tamil,
        Language::Swedish,
        Language::Russian,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Turkish => "turkish",
            Language::French => "french",
            Language::German => "german",
            Language::Bahasa => "bahasa",
            Language::Persian => "persian",
            Language::Tamil => "tamil",
            Language::Swedish => "swedish",
            Language::Russian => "russian",
        }
    }

    pub fn is_foreign(self) -> bool {
        self != Language::English
    }

    pub fn country_code(self) -> &'static str {
        match self {
            Language::English => "us",
            Language::Turkish => "tr",
            Language::French => "fr",
            Language::German => "de",
            Language::Bahasa => "my",
            Language::Persian => "ir",
            Language::Tamil => "in",
            Language::Swedish => "se",
            Language::Russian => "ru",
        }
    }

    /// Flag emoji built from the country code's regional indicator symbols.
    pub fn flag(self) -> String {
        self.country_code()
            .chars()
            .filter_map(|c| {
                char::from_u32(0x1F1E6 + (c as u32 - 'a' as u32))
            })
            .collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| Error::Config(format!("unknown language: {s}")))
    }
}

/// The optional second translation shown under the primary one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryLanguage {
    #[default]
    None,
    English,
    Turkish,
    French,
    German,
    Bahasa,
    Persian,
    Tamil,
    Swedish,
    Russian,
}

impl SecondaryLanguage {
    pub fn language(self) -> Option<Language> {
        match self {
            SecondaryLanguage::None => None,
            SecondaryLanguage::English => Some(Language::English),
            SecondaryLanguage::Turkish => Some(Language::Turkish),
            SecondaryLanguage::French => Some(Language::French),
            SecondaryLanguage::German => Some(Language::German),
            SecondaryLanguage::Bahasa => Some(Language::Bahasa),
            SecondaryLanguage::Persian => Some(Language::Persian),
            SecondaryLanguage::Tamil => Some(Language::Tamil),
            SecondaryLanguage::Swedish => Some(Language::Swedish),
            SecondaryLanguage::Russian => Some(Language::Russian),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.language().map_or("none", Language::as_str)
    }
}

impl From<Language> for SecondaryLanguage {
    fn from(language: Language) -> Self {
        match language {
            Language::English => SecondaryLanguage::English,
            Language::Turkish => SecondaryLanguage::Turkish,
            Language::French => SecondaryLanguage::French,
            Language::German => SecondaryLanguage::German,
            Language::Bahasa => SecondaryLanguage::Bahasa,
            Language::Persian => SecondaryLanguage::Persian,
            Language::Tamil => SecondaryLanguage::Tamil,
            Language::Swedish => SecondaryLanguage::Swedish,
            Language::Russian => SecondaryLanguage::Russian,
        }
    }
}

impl fmt::Display for SecondaryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecondaryLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(SecondaryLanguage::None);
        }
        s.parse::<Language>().map(SecondaryLanguage::from)
    }
}

/// A per-language text column of a verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Body,
    Subtitle,
    Footnote,
    ChapterTitle,
}

impl TextField {
    pub const ALL: [TextField; 4] = [
        TextField::Body,
        TextField::Subtitle,
        TextField::Footnote,
        TextField::ChapterTitle,
    ];

    /// Column-name prefix used by the corpus records, e.g. `verse_text`
    /// in `verse_text_turkish`.
    pub fn column_prefix(self) -> &'static str {
        match self {
            TextField::Body => "verse_text",
            TextField::Subtitle => "verse_subtitle",
            TextField::Footnote => "verse_footnote",
            TextField::ChapterTitle => "chapter_title",
        }
    }

    /// Split a flat column name such as `verse_footnote_german` into its
    /// field and language. Returns `None` for unrelated columns.
    pub fn parse_column(column: &str) -> Option<(TextField, Language)> {
        TextField::ALL.into_iter().find_map(|field| {
            let rest = column
                .strip_prefix(field.column_prefix())?
                .strip_prefix('_')?;
            let language = rest.parse::<Language>().ok()?;
            Some((field, language))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_is_case_insensitive() {
        assert_eq!("Turkish".parse::<Language>().unwrap(), Language::Turkish);
        assert_eq!(" russian ".parse::<Language>().unwrap(), Language::Russian);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn secondary_none_has_no_language() {
        assert_eq!(SecondaryLanguage::None.language(), None);
        assert_eq!(
            "none".parse::<SecondaryLanguage>().unwrap(),
            SecondaryLanguage::None
        );
        assert_eq!(
            "german".parse::<SecondaryLanguage>().unwrap().language(),
            Some(Language::German)
        );
    }

    #[test]
    fn flags_come_from_country_codes() {
        assert_eq!(Language::English.flag(), "\u{1F1FA}\u{1F1F8}");
        assert_eq!(Language::Turkish.flag(), "\u{1F1F9}\u{1F1F7}");
    }

    #[test]
    fn parse_column_splits_field_and_language() {
        assert_eq!(
            TextField::parse_column("verse_text_french"),
            Some((TextField::Body, Language::French))
        );
        assert_eq!(
            TextField::parse_column("chapter_title_tamil"),
            Some((TextField::ChapterTitle, Language::Tamil))
        );
        assert_eq!(
            TextField::parse_column("verse_footnote_swedish"),
            Some((TextField::Footnote, Language::Swedish))
        );
        assert_eq!(TextField::parse_column("verse_id"), None);
        assert_eq!(TextField::parse_column("verse_text_klingon"), None);
    }

    #[test]
    fn foreign_languages_exclude_english() {
        assert!(Language::FOREIGN.iter().all(|l| l.is_foreign()));
        assert_eq!(Language::FOREIGN.len() + 1, Language::ALL.len());
    }
}
