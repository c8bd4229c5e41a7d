//! quranic - look up, search, and share verses of the Quran.
//!
//! The crate loads a verse corpus (English text, an optional foreign
//! language overlay, and an optional word-by-word breakdown) into memory,
//! parses a small query language into a [`ParsedQuery`], evaluates it
//! against the [`Corpus`], and renders the results as plain text.
//!
//! # Quick start
//!
//! ```no_run
//! use quranic::{Corpus, DataDir, DisplayPreferences, Language, engine, format, query};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let corpus = Corpus::load(&data_dir).unwrap();
//! let prefs = DisplayPreferences::default();
//!
//! let parsed = query::parse("18:1-10", Language::English);
//! let verses = engine::evaluate(
//!     &corpus,
//!     &parsed,
//!     prefs.search_scope(),
//!     &mut rand::thread_rng(),
//! );
//! println!("{}", format::format_verses(&corpus, &verses, &prefs));
//! ```

pub mod config_db;
pub mod corpus;
pub mod data_dir;
pub mod engine;
pub mod error;
pub mod format;
pub mod highlight;
pub mod language;
pub mod mcp;
pub mod preferences;
pub mod query;
pub mod record;

#[cfg(test)]
mod test_support;

pub use config_db::ConfigDb;
pub use corpus::{ChapterOrder, Corpus};
pub use data_dir::DataDir;
pub use engine::SearchScope;
pub use error::{Error, Result};
pub use format::{DisplayPreferences, VerseView};
pub use language::{Language, SecondaryLanguage, TextField};
pub use preferences::{PreferenceKey, Preferences};
pub use query::{ParsedQuery, QueryKind};
pub use record::{ChapterSummary, ForeignRecord, Verse, WordToken};
