//! The immutable verse corpus and its lookup indices.
//!
//! A [`Corpus`] is built once from the three record files and never
//! mutated afterwards, so a shared reference can be handed to any number
//! of concurrent readers.

use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    fs::File,
    io::BufReader,
    path::Path,
    time::Instant,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    data_dir::DataDir,
    error::{Error, Result},
    language::{Language, SecondaryLanguage, TextField},
    record::{ChapterSummary, ForeignRecord, ForeignText, Verse, WordToken},
};

/// Number of chapters in a complete corpus.
pub const CHAPTER_COUNT: u32 = 114;

/// Order in which chapter summaries are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterOrder {
    /// By chapter number.
    #[default]
    Mushaf,
    /// By revelation order.
    Revelation,
}

/// Record counts for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub verses: usize,
    pub chapters: usize,
    pub foreign_records: usize,
    pub word_tokens: usize,
    pub roots: usize,
}

pub struct Corpus {
    verses: Vec<Verse>,
    by_id: HashMap<String, usize>,
    by_chapter_and_number: HashMap<(u32, u32), usize>,
    /// Verse positions per chapter, sorted by verse number.
    by_chapter: BTreeMap<u32, Vec<usize>>,
    foreign: HashMap<String, ForeignText>,
    words: Vec<WordToken>,
    /// Token positions per verse, sorted by word index.
    words_by_verse: HashMap<String, Vec<usize>>,
    /// Token positions per root, in input order.
    words_by_root: HashMap<String, Vec<usize>>,
    chapters: Vec<ChapterSummary>,
}

impl Corpus {
    /// Load the corpus files from a data directory.
    ///
    /// The verse file is required. The foreign overlay and the
    /// word-by-word breakdown are optional and treated as empty when
    /// absent.
    pub fn load(data_dir: &DataDir) -> Result<Self> {
        let foreign = data_dir.foreign_file();
        let words = data_dir.words_file();
        Self::from_paths(
            &data_dir.verses_file(),
            foreign.exists().then_some(foreign.as_path()),
            words.exists().then_some(words.as_path()),
        )
    }

    pub fn from_paths(
        verses: &Path,
        foreign: Option<&Path>,
        words: Option<&Path>,
    ) -> Result<Self> {
        let started = Instant::now();

        let verses: Vec<Verse> = read_records(verses)?;
        let foreign: Vec<ForeignRecord> = match foreign {
            Some(path) => read_records(path)?,
            None => Vec::new(),
        };
        let words: Vec<WordToken> = match words {
            Some(path) => read_records(path)?,
            None => Vec::new(),
        };

        let corpus = Self::from_records(verses, foreign, words)?;
        tracing::info!(
            verses = corpus.verses.len(),
            chapters = corpus.chapters.len(),
            words = corpus.words.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded corpus"
        );
        Ok(corpus)
    }

    /// Build every index in one pass over the decoded records.
    ///
    /// Fails on duplicate verse ids, duplicate chapter/verse pairs, and
    /// chapter numbers outside `1..=114`.
    pub fn from_records(
        verses: Vec<Verse>,
        foreign: Vec<ForeignRecord>,
        words: Vec<WordToken>,
    ) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(verses.len());
        let mut by_chapter_and_number = HashMap::with_capacity(verses.len());
        let mut by_chapter: BTreeMap<u32, Vec<usize>> = BTreeMap::new();

        for (idx, verse) in verses.iter().enumerate() {
            if !(1..=CHAPTER_COUNT).contains(&verse.chapter_number) {
                return Err(Error::InvalidCorpus(format!(
                    "verse {} has chapter number {} outside 1..={CHAPTER_COUNT}",
                    verse.verse_id, verse.chapter_number
                )));
            }
            if by_id.insert(verse.verse_id.clone(), idx).is_some() {
                return Err(Error::InvalidCorpus(format!(
                    "duplicate verse id {}",
                    verse.verse_id
                )));
            }
            let key = (verse.chapter_number, verse.verse_number);
            if by_chapter_and_number.insert(key, idx).is_some() {
                return Err(Error::InvalidCorpus(format!(
                    "duplicate verse {}-{}",
                    key.0, key.1
                )));
            }
            by_chapter.entry(verse.chapter_number).or_default().push(idx);
        }

        for (chapter, positions) in &mut by_chapter {
            positions.sort_by_key(|&idx| verses[idx].verse_number);
            for issue in chapter_issues(&verses, positions) {
                tracing::warn!(chapter, issue, "inconsistent chapter");
            }
        }

        let mut foreign_by_id: HashMap<String, ForeignText> =
            HashMap::with_capacity(foreign.len());
        let mut orphans = 0usize;
        let mut duplicates = 0usize;
        for record in foreign {
            if !by_id.contains_key(&record.verse_id) {
                orphans += 1;
            }
            // First row for a verse wins.
            match foreign_by_id.entry(record.verse_id.clone()) {
                Entry::Occupied(_) => duplicates += 1,
                Entry::Vacant(slot) => {
                    slot.insert(ForeignText::from(record));
                }
            }
        }
        if orphans > 0 {
            tracing::warn!(orphans, "foreign records reference unknown verses");
        }
        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "foreign records repeat a verse id, later rows ignored"
            );
        }

        let mut words_by_verse: HashMap<String, Vec<usize>> = HashMap::new();
        let mut words_by_root: HashMap<String, Vec<usize>> = HashMap::new();
        let mut orphans = 0usize;
        for (idx, token) in words.iter().enumerate() {
            if !by_id.contains_key(&token.verse_id) {
                orphans += 1;
            }
            words_by_verse
                .entry(token.verse_id.clone())
                .or_default()
                .push(idx);
            words_by_root
                .entry(token.root_word.clone())
                .or_default()
                .push(idx);
        }
        for positions in words_by_verse.values_mut() {
            positions.sort_by_key(|&idx| words[idx].word_index);
        }
        if orphans > 0 {
            tracing::warn!(orphans, "word tokens reference unknown verses");
        }

        let chapters = by_chapter
            .values()
            .filter_map(|positions| positions.first())
            .map(|&idx| chapter_summary(&verses[idx], &foreign_by_id))
            .collect();

        Ok(Self {
            verses,
            by_id,
            by_chapter_and_number,
            by_chapter,
            foreign: foreign_by_id,
            words,
            words_by_verse,
            words_by_root,
            chapters,
        })
    }

    /// All verses in corpus order.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn verse_by_id(&self, verse_id: &str) -> Option<&Verse> {
        self.by_id.get(verse_id).map(|&idx| &self.verses[idx])
    }

    pub fn verse(&self, chapter: u32, number: u32) -> Option<&Verse> {
        self.by_chapter_and_number
            .get(&(chapter, number))
            .map(|&idx| &self.verses[idx])
    }

    /// Verses of a chapter in ascending verse order; empty for unknown
    /// chapters.
    pub fn verses_in_chapter(&self, chapter: u32) -> Vec<&Verse> {
        self.by_chapter
            .get(&chapter)
            .map(|positions| {
                positions.iter().map(|&idx| &self.verses[idx]).collect()
            })
            .unwrap_or_default()
    }

    /// Chapter numbers present in the corpus, ascending.
    pub fn chapter_numbers(&self) -> Vec<u32> {
        self.by_chapter.keys().copied().collect()
    }

    /// Word-by-word breakdown of a verse, sorted by word index.
    pub fn word_tokens(&self, verse_id: &str) -> Vec<&WordToken> {
        self.words_by_verse
            .get(verse_id)
            .map(|positions| {
                positions.iter().map(|&idx| &self.words[idx]).collect()
            })
            .unwrap_or_default()
    }

    /// Every token sharing `root`, in corpus input order.
    pub fn word_tokens_for_root(&self, root: &str) -> Vec<&WordToken> {
        self.words_by_root
            .get(root)
            .map(|positions| {
                positions.iter().map(|&idx| &self.words[idx]).collect()
            })
            .unwrap_or_default()
    }

    /// Chapter summaries by chapter number.
    pub fn chapters(&self) -> &[ChapterSummary] {
        &self.chapters
    }

    pub fn chapter(&self, chapter: u32) -> Option<&ChapterSummary> {
        self.chapters
            .binary_search_by_key(&chapter, |c| c.chapter_number)
            .ok()
            .map(|idx| &self.chapters[idx])
    }

    pub fn chapters_ordered(&self, order: ChapterOrder) -> Vec<&ChapterSummary> {
        let mut chapters: Vec<&ChapterSummary> = self.chapters.iter().collect();
        if order == ChapterOrder::Revelation {
            chapters.sort_by_key(|c| (c.revelation_order, c.chapter_number));
        }
        chapters
    }

    /// Value of `field` for `verse` in `language`.
    ///
    /// Foreign languages read the overlay and fall back to the English
    /// value when the overlay has no entry for the verse or the field.
    pub fn localized<'a>(
        &'a self,
        verse: &'a Verse,
        language: Language,
        field: TextField,
    ) -> Option<&'a str> {
        if language.is_foreign()
            && let Some(value) = self.foreign_value(verse, language, field)
        {
            return Some(value);
        }
        verse.english(field)
    }

    /// Verse body in `language`, with the English fallback.
    pub fn primary_text<'a>(
        &'a self,
        verse: &'a Verse,
        language: Language,
    ) -> &'a str {
        self.localized(verse, language, TextField::Body)
            .unwrap_or_default()
    }

    /// Verse body in the secondary language. Unlike [`Corpus::localized`]
    /// a missing foreign value stays missing.
    pub fn secondary_text<'a>(
        &'a self,
        verse: &'a Verse,
        secondary: SecondaryLanguage,
    ) -> Option<&'a str> {
        match secondary.language()? {
            Language::English => verse.english(TextField::Body),
            language => self.foreign_value(verse, language, TextField::Body),
        }
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            verses: self.verses.len(),
            chapters: self.chapters.len(),
            foreign_records: self.foreign.len(),
            word_tokens: self.words.len(),
            roots: self.words_by_root.len(),
        }
    }

    fn foreign_value(
        &self,
        verse: &Verse,
        language: Language,
        field: TextField,
    ) -> Option<&str> {
        self.foreign.get(&verse.verse_id)?.get(language, field)
    }
}

/// Consistency problems in one chapter, given its verse positions sorted
/// by verse number.
fn chapter_issues(verses: &[Verse], positions: &[usize]) -> Vec<&'static str> {
    let mut issues = Vec::new();
    let Some(&first) = positions.first() else {
        return issues;
    };
    let first = &verses[first];

    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(i, &idx)| verses[idx].verse_number as usize == i + 1);
    if !contiguous {
        issues.push("verse numbers are not contiguous");
    }
    if positions.len() != first.chapter_verse_count as usize {
        issues.push("verse count differs from chapter_verses");
    }
    if positions
        .iter()
        .any(|&idx| verses[idx].chapter_verse_count != first.chapter_verse_count)
    {
        issues.push("chapter_verses differs between verses");
    }
    if positions.iter().any(|&idx| {
        verses[idx].chapter_revelation_order != first.chapter_revelation_order
    }) {
        issues.push("revelation order differs between verses");
    }
    issues
}

fn chapter_summary(
    first: &Verse,
    foreign: &HashMap<String, ForeignText>,
) -> ChapterSummary {
    let overlay = foreign.get(&format!("{}:1", first.chapter_number));
    let foreign_titles = Language::FOREIGN
        .into_iter()
        .filter_map(|language| {
            let title = overlay?.get(language, TextField::ChapterTitle)?;
            Some((language, title.to_string()))
        })
        .collect();

    ChapterSummary {
        chapter_number: first.chapter_number,
        revelation_order: first.chapter_revelation_order,
        verse_count: first.chapter_verse_count,
        title_english: first.chapter_title_english.clone(),
        title_arabic: first.chapter_title_arabic.clone(),
        title_transliterated: first.chapter_title_transliterated.clone(),
        foreign_titles,
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        Error::Corpus {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        fixture_corpus,
        fixture_verses,
        fixture_words,
        foreign_record,
        verse,
    };

    #[test]
    fn verse_lookups_by_id_and_number_agree() {
        let corpus = fixture_corpus();

        let by_id = corpus.verse_by_id("2:3").unwrap();
        let by_number = corpus.verse(2, 3).unwrap();
        assert_eq!(by_id, by_number);
        assert!(corpus.verse_by_id("2:99").is_none());
        assert!(corpus.verse(115, 1).is_none());
    }

    #[test]
    fn chapter_verses_are_ordered_and_complete() {
        let corpus = fixture_corpus();

        let verses = corpus.verses_in_chapter(1);
        assert_eq!(verses.len(), 7);
        let numbers: Vec<u32> = verses.iter().map(|v| v.verse_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(corpus.verses_in_chapter(3).is_empty());
    }

    #[test]
    fn chapter_order_ignores_input_order() {
        let mut verses = fixture_verses();
        verses.reverse();
        let corpus =
            Corpus::from_records(verses, Vec::new(), Vec::new()).unwrap();

        let numbers: Vec<u32> = corpus
            .verses_in_chapter(2)
            .iter()
            .map(|v| v.verse_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(corpus.verses()[0].verse_id, "19:3");
    }

    #[test]
    fn word_tokens_sorted_by_word_index() {
        let corpus = fixture_corpus();

        let tokens = corpus.word_tokens("1:1");
        let indices: Vec<u32> = tokens.iter().map(|t| t.word_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(corpus.word_tokens("2:1").is_empty());
    }

    #[test]
    fn root_lookup_keeps_input_order() {
        let corpus = fixture_corpus();

        let tokens = corpus.word_tokens_for_root("rhm");
        let globals: Vec<u32> = tokens.iter().map(|t| t.global_index).collect();
        assert_eq!(globals, vec![4, 3, 11, 12]);
        assert!(corpus.word_tokens_for_root("xyz").is_empty());
    }

    #[test]
    fn duplicate_verse_id_is_rejected() {
        let mut verses = fixture_verses();
        verses.push(verses[0].clone());

        let err = Corpus::from_records(verses, Vec::new(), fixture_words())
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidCorpus(_)));
    }

    #[test]
    fn chapter_out_of_range_is_rejected() {
        let verses = vec![verse(115, 1, 1, 1, "Nope", 1, "text")];

        let err = Corpus::from_records(verses, Vec::new(), Vec::new())
            .err()
            .unwrap();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn localized_falls_back_to_english() {
        let corpus = fixture_corpus();
        let first = corpus.verse(1, 1).unwrap();
        let second = corpus.verse(1, 2).unwrap();

        assert_eq!(
            corpus.primary_text(first, Language::Turkish),
            "Rahman ve Rahim olan Allah'ın adıyla."
        );
        assert_eq!(
            corpus.localized(first, Language::Turkish, TextField::Subtitle),
            Some("Açılış")
        );
        // Overlay exists for 1:1 but has no French body.
        assert_eq!(
            corpus.primary_text(first, Language::French),
            first.verse_text_english
        );
        // No overlay at all for 1:2.
        assert_eq!(
            corpus.primary_text(second, Language::Russian),
            second.verse_text_english
        );
        assert_eq!(
            corpus.localized(first, Language::German, TextField::Subtitle),
            Some("The Opening")
        );
    }

    #[test]
    fn secondary_text_has_no_fallback() {
        let corpus = fixture_corpus();
        let first = corpus.verse(1, 1).unwrap();

        assert_eq!(corpus.secondary_text(first, SecondaryLanguage::None), None);
        assert_eq!(
            corpus.secondary_text(first, SecondaryLanguage::English),
            Some(first.verse_text_english.as_str())
        );
        assert_eq!(
            corpus.secondary_text(first, SecondaryLanguage::Turkish),
            Some("Rahman ve Rahim olan Allah'ın adıyla.")
        );
        assert_eq!(corpus.secondary_text(first, SecondaryLanguage::French), None);
    }

    #[test]
    fn chapter_summaries_carry_foreign_titles() {
        let corpus = fixture_corpus();

        let numbers: Vec<u32> =
            corpus.chapters().iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 19]);

        let first = corpus.chapter(1).unwrap();
        assert_eq!(first.verse_count, 7);
        assert_eq!(first.title(Language::Turkish), "Fatiha");
        assert_eq!(first.title(Language::French), "L'Ouverture");
        assert_eq!(first.title(Language::German), "The Key");
        assert_eq!(corpus.chapter(2).unwrap().title(Language::French), "La Vache");
        assert!(corpus.chapter(3).is_none());
    }

    #[test]
    fn chapters_ordered_by_revelation() {
        let corpus = fixture_corpus();

        let order: Vec<u32> = corpus
            .chapters_ordered(ChapterOrder::Revelation)
            .iter()
            .map(|c| c.chapter_number)
            .collect();
        assert_eq!(order, vec![1, 19, 2]);

        let mushaf: Vec<u32> = corpus
            .chapters_ordered(ChapterOrder::Mushaf)
            .iter()
            .map(|c| c.chapter_number)
            .collect();
        assert_eq!(mushaf, vec![1, 2, 19]);
    }

    #[test]
    fn first_overlay_row_wins_for_repeated_verse() {
        let overlay = vec![
            foreign_record("1:2", &[("verse_text_turkish", "first")]),
            foreign_record("1:2", &[("verse_text_turkish", "second")]),
        ];

        let corpus =
            Corpus::from_records(fixture_verses(), overlay, Vec::new()).unwrap();
        let verse = corpus.verse_by_id("1:2").unwrap();
        assert_eq!(corpus.primary_text(verse, Language::Turkish), "first");
        assert_eq!(corpus.stats().foreign_records, 1);
    }

    #[test]
    fn consistent_chapters_have_no_issues() {
        let verses = fixture_verses();
        let corpus = Corpus::from_records(verses.clone(), Vec::new(), Vec::new())
            .unwrap();

        for chapter in corpus.chapter_numbers() {
            let positions: Vec<usize> = verses
                .iter()
                .enumerate()
                .filter(|(_, v)| v.chapter_number == chapter)
                .map(|(i, _)| i)
                .collect();
            assert!(chapter_issues(&verses, &positions).is_empty());
        }
    }

    #[test]
    fn chapter_issues_flag_gaps_and_disagreeing_metadata() {
        let verses = vec![
            verse(3, 1, 3, 1, "Family", 89, "a"),
            verse(3, 2, 3, 2, "Family", 89, "b"),
            verse(3, 4, 4, 3, "Family", 90, "c"),
        ];

        assert_eq!(
            chapter_issues(&verses, &[0, 1, 2]),
            vec![
                "verse numbers are not contiguous",
                "chapter_verses differs between verses",
                "revelation order differs between verses",
            ]
        );
        assert_eq!(
            chapter_issues(&verses, &[0, 1]),
            vec!["verse count differs from chapter_verses"]
        );
    }

    #[test]
    fn inconsistent_chapters_still_load() {
        let verses = vec![
            verse(3, 1, 5, 1, "Family", 89, "a"),
            verse(3, 3, 5, 2, "Family", 89, "b"),
        ];

        let corpus = Corpus::from_records(verses, Vec::new(), Vec::new()).unwrap();
        assert_eq!(corpus.verses_in_chapter(3).len(), 2);
    }

    #[test]
    fn corpus_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Corpus>();

        let corpus = std::sync::Arc::new(fixture_corpus());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let corpus = std::sync::Arc::clone(&corpus);
                std::thread::spawn(move || corpus.verses_in_chapter(1).len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
    }

    #[test]
    fn stats_count_every_index() {
        let stats = fixture_corpus().stats();

        assert_eq!(stats.verses, 15);
        assert_eq!(stats.chapters, 3);
        assert_eq!(stats.foreign_records, 2);
        assert_eq!(stats.word_tokens, 6);
        assert_eq!(stats.roots, 3);
    }

    #[test]
    fn load_reads_files_from_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::resolve(Some(tmp.path())).unwrap();
        std::fs::write(
            data_dir.verses_file(),
            serde_json::to_string(&fixture_verses()).unwrap(),
        )
        .unwrap();
        std::fs::write(
            data_dir.words_file(),
            serde_json::to_string(&fixture_words()).unwrap(),
        )
        .unwrap();

        let corpus = Corpus::load(&data_dir).unwrap();
        assert_eq!(corpus.len(), 15);
        assert_eq!(corpus.word_tokens("1:3").len(), 2);
        assert_eq!(corpus.stats().foreign_records, 0);
    }

    #[test]
    fn load_reports_decode_failure_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::resolve(Some(tmp.path())).unwrap();
        std::fs::write(data_dir.verses_file(), "[{\"verse_id\": 1}]").unwrap();

        let err = Corpus::load(&data_dir).err().unwrap();
        match err {
            Error::Corpus { path, .. } => {
                assert_eq!(path, data_dir.verses_file())
            }
            other => panic!("expected corpus error, got {other}"),
        }
    }

    #[test]
    fn load_requires_verse_file() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::resolve(Some(tmp.path())).unwrap();

        assert!(matches!(Corpus::load(&data_dir), Err(Error::Io(_))));
    }
}
