use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::language::{Language, TextField};

/// One addressable verse of the corpus, as stored in `quran.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// `"<chapter>:<verse>"`, unique across the corpus.
    pub verse_id: String,
    #[serde(default)]
    pub verse_id_arabic: String,
    pub chapter_number: u32,
    pub verse_number: u32,
    /// Position of the verse in the whole corpus.
    #[serde(rename = "verse_index")]
    pub global_index: u32,
    #[serde(default)]
    pub verse_index_numbered: Option<u32>,
    #[serde(rename = "chapter_verses")]
    pub chapter_verse_count: u32,
    pub chapter_revelation_order: u32,

    pub chapter_title_english: String,
    #[serde(default)]
    pub chapter_title_arabic: String,
    #[serde(default)]
    pub chapter_title_transliterated: String,

    pub verse_text_english: String,
    #[serde(default)]
    pub verse_text_arabic: String,
    #[serde(default)]
    pub verse_text_arabic_clean: String,
    #[serde(default)]
    pub verse_text_transliterated: String,

    #[serde(default)]
    pub verse_subtitle_english: Option<String>,
    #[serde(default)]
    pub verse_footnote_english: Option<String>,
}

impl Verse {
    /// English value of a per-language field. Empty strings count as
    /// missing.
    pub fn english(&self, field: TextField) -> Option<&str> {
        let value = match field {
            TextField::Body => Some(self.verse_text_english.as_str()),
            TextField::Subtitle => self.verse_subtitle_english.as_deref(),
            TextField::Footnote => self.verse_footnote_english.as_deref(),
            TextField::ChapterTitle => Some(self.chapter_title_english.as_str()),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// A raw row of `quran-foreign.json`: the verse id plus flat
/// `<field>_<language>` columns, all nullable.
#[derive(Debug, Clone, Deserialize)]
pub struct ForeignRecord {
    pub verse_id: String,
    #[serde(flatten)]
    pub columns: HashMap<String, Option<String>>,
}

/// Foreign-language values for one verse, folded from a [`ForeignRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignText {
    values: HashMap<(Language, TextField), String>,
}

impl ForeignText {
    pub fn get(&self, language: Language, field: TextField) -> Option<&str> {
        self.values.get(&(language, field)).map(String::as_str)
    }

    pub fn insert(
        &mut self,
        language: Language,
        field: TextField,
        value: impl Into<String>,
    ) {
        self.values.insert((language, field), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<ForeignRecord> for ForeignText {
    fn from(record: ForeignRecord) -> Self {
        let mut text = ForeignText::default();
        for (column, value) in record.columns {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Some((field, language)) = TextField::parse_column(&column) {
                text.insert(language, field, value);
            }
        }
        text
    }
}

/// One word of a verse's word-by-word breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    pub verse_id: String,
    pub word_index: u32,
    pub global_index: u32,
    pub root_word: String,
    #[serde(default)]
    pub english_text: String,
    #[serde(default)]
    pub arabic_text: String,
    #[serde(default)]
    pub transliterated_text: String,
    #[serde(default)]
    pub meanings: String,
}

/// Chapter-level metadata derived from a chapter's first verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    pub chapter_number: u32,
    pub revelation_order: u32,
    pub verse_count: u32,
    pub title_english: String,
    pub title_arabic: String,
    pub title_transliterated: String,
    #[serde(serialize_with = "serialize_titles")]
    pub foreign_titles: HashMap<Language, String>,
}

impl ChapterSummary {
    /// Title in `language`, falling back to English.
    pub fn title(&self, language: Language) -> &str {
        self.foreign_titles
            .get(&language)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title_english)
    }
}

fn serialize_titles<S>(
    titles: &HashMap<Language, String>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let ordered: std::collections::BTreeMap<&str, &String> = titles
        .iter()
        .map(|(lang, title)| (lang.as_str(), title))
        .collect();
    serde::Serialize::serialize(&ordered, serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_decodes_from_corpus_columns() {
        let json = r#"{
            "verse_id": "1:1",
            "verse_id_arabic": "١:١",
            "chapter_number": 1,
            "verse_number": 1,
            "verse_index": 1,
            "verse_index_numbered": null,
            "chapter_verses": 7,
            "chapter_revelation_order": 5,
            "chapter_title_english": "The Key",
            "chapter_title_arabic": "الفاتحة",
            "chapter_title_transliterated": "Al-Fatihah",
            "verse_text_english": "In the name of God",
            "verse_text_arabic": "بسم الله",
            "verse_text_arabic_clean": "بسم الله",
            "verse_text_transliterated": "bismi allahi",
            "verse_subtitle_english": null,
            "verse_footnote_english": "A note"
        }"#;

        let verse: Verse = serde_json::from_str(json).unwrap();
        assert_eq!(verse.verse_id, "1:1");
        assert_eq!(verse.global_index, 1);
        assert_eq!(verse.chapter_verse_count, 7);
        assert_eq!(verse.english(TextField::Subtitle), None);
        assert_eq!(verse.english(TextField::Footnote), Some("A note"));
    }

    #[test]
    fn foreign_record_folds_known_columns() {
        let json = r#"{
            "verse_id": "1:1",
            "chapter_title_turkish": "Açılış",
            "verse_text_turkish": "Tanrı'nın adıyla",
            "verse_text_french": null,
            "verse_subtitle_german": "",
            "unrelated_column": "ignored"
        }"#;

        let record: ForeignRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.verse_id, "1:1");
        let text = ForeignText::from(record);

        assert_eq!(text.len(), 2);
        assert_eq!(
            text.get(Language::Turkish, TextField::ChapterTitle),
            Some("Açılış")
        );
        assert_eq!(
            text.get(Language::Turkish, TextField::Body),
            Some("Tanrı'nın adıyla")
        );
        assert_eq!(text.get(Language::French, TextField::Body), None);
        assert_eq!(text.get(Language::German, TextField::Subtitle), None);
    }

    #[test]
    fn chapter_title_falls_back_to_english() {
        let mut foreign_titles = HashMap::new();
        foreign_titles.insert(Language::French, "L'Ouverture".to_string());
        foreign_titles.insert(Language::German, String::new());
        let summary = ChapterSummary {
            chapter_number: 1,
            revelation_order: 5,
            verse_count: 7,
            title_english: "The Key".to_string(),
            title_arabic: String::new(),
            title_transliterated: String::new(),
            foreign_titles,
        };

        assert_eq!(summary.title(Language::French), "L'Ouverture");
        assert_eq!(summary.title(Language::German), "The Key");
        assert_eq!(summary.title(Language::Tamil), "The Key");
        assert_eq!(summary.title(Language::English), "The Key");
    }
}
