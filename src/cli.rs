use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use quranic::{
    format::DisplayPreferences,
    language::{Language, SecondaryLanguage},
    preferences::PreferenceKey,
};

#[derive(Debug, Parser)]
#[command(
    name = "quranic",
    about = "Look up, search, and share verses of the Quran"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a query: a reference (2:255, 18:1-10, 2:1,2:5, 19), "random
    /// verse", "random chapter", or search text
    Query(QueryArgs),
    /// Show how a query is understood without running it
    Parse(ParseArgs),
    /// List chapters
    Chapters(ChaptersArgs),
    /// Show the word-by-word breakdown of a verse
    Words(WordsArgs),
    /// List every word sharing a root
    Root(RootArgs),
    /// Manage persisted display preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show data directory and corpus statistics
    Status(StatusArgs),
    /// Start MCP server for AI agent integration
    Mcp,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Query --

#[derive(Debug, Clone, Parser)]
pub struct QueryArgs {
    /// The query; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Primary language (defaults to the stored preference)
    #[arg(short, long, value_enum)]
    pub language: Option<Language>,

    /// Secondary language shown under the primary text
    #[arg(short, long, value_enum)]
    pub secondary: Option<SecondaryLanguage>,

    /// Match the search text as one contiguous phrase
    #[arg(long)]
    pub exact: bool,

    /// Show the Arabic text
    #[arg(long)]
    pub arabic: bool,

    /// Show the transliteration
    #[arg(long)]
    pub transliteration: bool,

    /// Hide subtitles (and do not search them)
    #[arg(long)]
    pub no_subtitles: bool,

    /// Hide footnotes (and do not search them)
    #[arg(long)]
    pub no_footnotes: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Output only verse ids (one per line)
    #[arg(long)]
    pub ids: bool,

    /// Seed for "random verse" / "random chapter"
    #[arg(long)]
    pub seed: Option<u64>,
}

impl QueryArgs {
    pub fn input(&self) -> String {
        self.input.join(" ")
    }

    /// Apply the command-line overrides on top of stored preferences.
    pub fn display_preferences(
        &self,
        stored: DisplayPreferences,
    ) -> DisplayPreferences {
        DisplayPreferences {
            show_subtitles: stored.show_subtitles && !self.no_subtitles,
            show_footnotes: stored.show_footnotes && !self.no_footnotes,
            show_arabic: stored.show_arabic || self.arabic,
            show_transliteration: stored.show_transliteration
                || self.transliteration,
            primary_language: self.language.unwrap_or(stored.primary_language),
            secondary_language: self
                .secondary
                .unwrap_or(stored.secondary_language),
        }
    }
}

// -- Parse --

#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// The query; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Language used for free-text searches
    #[arg(short, long, value_enum)]
    pub language: Option<Language>,
}

// -- Chapters --

#[derive(Debug, Parser)]
pub struct ChaptersArgs {
    /// Order by revelation instead of chapter number
    #[arg(long)]
    pub revelation: bool,

    /// Language for chapter titles
    #[arg(short, long, value_enum)]
    pub language: Option<Language>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Words --

#[derive(Debug, Parser)]
pub struct WordsArgs {
    /// Verse id, e.g. 1:1
    pub verse_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Root --

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Root word as it appears in the word-by-word data
    pub root: String,

    /// Maximum number of occurrences to print
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Config subcommands --

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show every preference and its current value
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Persist a preference
    Set {
        #[arg(value_enum)]
        key: PreferenceKey,
        value: String,
    },
    /// Revert one preference, or all of them, to the default
    Reset {
        #[arg(value_enum)]
        key: Option<PreferenceKey>,
    },
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "quranic",
            &mut std::io::stdout(),
        );
    }
}
