#![allow(dead_code)]

use std::path::{Path, PathBuf};

use quranic::{Corpus, Verse};
use serde_json::{Value, json};

/// The same records the unit tests use.
const FIXTURE_FILES: [&str; 3] =
    ["quran.json", "quran-foreign.json", "quran-word-by-word.json"];

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy the three corpus files into `dir`.
pub fn write_fixture(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for name in FIXTURE_FILES {
        std::fs::copy(fixture_dir().join(name), dir.join(name))?;
    }
    Ok(())
}

pub fn fixture_corpus() -> Corpus {
    let dir = fixture_dir();
    Corpus::from_paths(
        &dir.join(FIXTURE_FILES[0]),
        Some(&dir.join(FIXTURE_FILES[1])),
        Some(&dir.join(FIXTURE_FILES[2])),
    )
    .unwrap()
}

/// Every chapter present, each with `verses_per_chapter` verses of the
/// same text.
pub fn uniform_corpus(verses_per_chapter: u32, text: &str) -> Corpus {
    let mut verses = Vec::new();
    let mut global_index = 0;
    for c in 1..=114u32 {
        for n in 1..=verses_per_chapter {
            global_index += 1;
            verses.push(json!({
                "verse_id": format!("{c}:{n}"),
                "chapter_number": c,
                "verse_number": n,
                "verse_index": global_index,
                "chapter_verses": verses_per_chapter,
                "chapter_revelation_order": c,
                "chapter_title_english": format!("Chapter {c}"),
                "verse_text_english": text,
            }));
        }
    }
    Corpus::from_records(decode(verses), Vec::new(), Vec::new()).unwrap()
}

fn decode(values: Vec<Value>) -> Vec<Verse> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect()
}
