//! Small corpus shared by the unit tests.

use std::collections::HashMap;

use crate::{
    corpus::Corpus,
    record::{ForeignRecord, Verse, WordToken},
};

const VERSES_JSON: &str = include_str!("../tests/fixtures/quran.json");
const FOREIGN_JSON: &str =
    include_str!("../tests/fixtures/quran-foreign.json");
const WORDS_JSON: &str =
    include_str!("../tests/fixtures/quran-word-by-word.json");

pub fn verse(
    chapter: u32,
    number: u32,
    verse_count: u32,
    global_index: u32,
    title: &str,
    revelation_order: u32,
    text: &str,
) -> Verse {
    Verse {
        verse_id: format!("{chapter}:{number}"),
        verse_id_arabic: String::new(),
        chapter_number: chapter,
        verse_number: number,
        global_index,
        verse_index_numbered: Some(global_index),
        chapter_verse_count: verse_count,
        chapter_revelation_order: revelation_order,
        chapter_title_english: title.to_string(),
        chapter_title_arabic: format!("arabic-title-{chapter}"),
        chapter_title_transliterated: format!("translit-title-{chapter}"),
        verse_text_english: text.to_string(),
        verse_text_arabic: format!("arabic {chapter}:{number}"),
        verse_text_arabic_clean: format!("clean {chapter}:{number}"),
        verse_text_transliterated: format!("translit {chapter}:{number}"),
        verse_subtitle_english: None,
        verse_footnote_english: None,
    }
}

/// Chapters 1, 2 and 19, with subtitles on 1:1 and 2:2 and footnotes on
/// 1:7 and 2:5. Shared with the integration tests through
/// `tests/fixtures/`.
pub fn fixture_verses() -> Vec<Verse> {
    serde_json::from_str(VERSES_JSON).expect("fixture verses decode")
}

pub fn foreign_record(verse_id: &str, columns: &[(&str, &str)]) -> ForeignRecord {
    ForeignRecord {
        verse_id: verse_id.to_string(),
        columns: columns
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect::<HashMap<_, _>>(),
    }
}

pub fn fixture_foreign() -> Vec<ForeignRecord> {
    serde_json::from_str(FOREIGN_JSON).expect("fixture overlay decodes")
}

/// Word tokens deliberately listed out of `word_index` order.
pub fn fixture_words() -> Vec<WordToken> {
    serde_json::from_str(WORDS_JSON).expect("fixture words decode")
}

pub fn fixture_corpus() -> Corpus {
    Corpus::from_records(fixture_verses(), fixture_foreign(), fixture_words())
        .expect("fixture corpus is valid")
}

/// A corpus where every verse of every chapter contains `text`.
pub fn uniform_corpus(chapters: u32, verses_per_chapter: u32, text: &str) -> Corpus {
    let mut verses = Vec::new();
    let mut global_index = 0;
    for chapter in 1..=chapters {
        for number in 1..=verses_per_chapter {
            global_index += 1;
            verses.push(verse(
                chapter,
                number,
                verses_per_chapter,
                global_index,
                "Synthetic",
                chapter,
                text,
            ));
        }
    }
    Corpus::from_records(verses, Vec::new(), Vec::new())
        .expect("synthetic corpus is valid")
}
