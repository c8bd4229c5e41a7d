use std::io::IsTerminal;

use clap::Parser;
use quranic::{
    ChapterOrder,
    ConfigDb,
    Corpus,
    DataDir,
    DisplayPreferences,
    ParsedQuery,
    Preferences,
    VerseView,
    WordToken,
    engine,
    error::{self, Error},
    format,
    highlight,
    mcp,
    query,
};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, ConfigAction};

const HIGHLIGHT_OPEN: &str = "\x1b[1;33m";
const HIGHLIGHT_CLOSE: &str = "\x1b[0m";

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("QURANIC_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config_db = ConfigDb::open(&data_dir.config_db())?;

    match cli.command {
        Command::Query(args) => {
            let corpus = Corpus::load(&data_dir)?;
            let stored = Preferences::load(&config_db)?;
            let prefs = args.display_preferences(stored.display);
            cmd_query(&corpus, &args, prefs)?;
        }
        Command::Parse(args) => {
            let language = match args.language {
                Some(language) => language,
                None => Preferences::load(&config_db)?.display.primary_language,
            };
            let parsed = query::parse(&args.input.join(" "), language);
            print_json(&parsed)?;
        }
        Command::Chapters(args) => {
            let corpus = Corpus::load(&data_dir)?;
            let stored = Preferences::load(&config_db)?;
            cmd_chapters(&corpus, &args, &stored)?;
        }
        Command::Words(args) => {
            let corpus = Corpus::load(&data_dir)?;
            cmd_words(&corpus, &args.verse_id, args.json)?;
        }
        Command::Root(args) => {
            let corpus = Corpus::load(&data_dir)?;
            cmd_root(&corpus, &args)?;
        }
        Command::Config { action } => match action {
            ConfigAction::Show { json } => {
                let entries = Preferences::load(&config_db)?.entries();
                if json {
                    print_json(&entries)?;
                } else {
                    for entry in &entries {
                        println!("{}\t{}", entry.key, entry.value);
                    }
                }
            }
            ConfigAction::Set { key, value } => {
                let stored = Preferences::set(&config_db, key, &value)?;
                println!("Set {key} = {stored}");
            }
            ConfigAction::Reset { key } => {
                Preferences::reset(&config_db, key)?;
                match key {
                    Some(key) => println!(
                        "Reset {key} to default ({})",
                        key.default_value()
                    ),
                    None => println!("Reset all preferences to defaults"),
                }
            }
        },
        Command::Status(args) => {
            cmd_status(&data_dir, args.json)?;
        }
        Command::Mcp => {
            let corpus = Corpus::load(&data_dir)?;
            mcp::run_mcp(corpus, config_db)?;
        }
        Command::Completions(args) => {
            args.generate();
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryOutput<'a> {
    query: &'a str,
    parsed: &'a ParsedQuery,
    count_label: String,
    verses: Vec<VerseView>,
}

fn cmd_query(
    corpus: &Corpus,
    args: &cli::QueryArgs,
    prefs: DisplayPreferences,
) -> error::Result<()> {
    let input = args.input();
    let mut parsed = query::parse(&input, prefs.primary_language);
    if args.exact {
        parsed = parsed.exact();
    }

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };
    let verses =
        engine::evaluate(corpus, &parsed, prefs.search_scope(), &mut *rng);
    let count_label = engine::count_label(verses.len());

    if args.json {
        return print_json(&QueryOutput {
            query: &input,
            parsed: &parsed,
            count_label,
            verses: verses
                .iter()
                .map(|v| VerseView::new(corpus, v, &prefs))
                .collect(),
        });
    }

    if let ParsedQuery::Invalid { reason } = &parsed {
        println!("Invalid query: {reason}");
        return Ok(());
    }
    if verses.is_empty() {
        println!("No verses found for '{input}'");
        return Ok(());
    }

    if args.ids {
        for verse in &verses {
            println!("{}", verse.verse_id);
        }
        return Ok(());
    }

    let text = format::format_verses(corpus, &verses, &prefs);
    match &parsed {
        ParsedQuery::Search { term, .. } => {
            if std::io::stdout().is_terminal() {
                let marked = highlight::highlight(
                    &text,
                    term,
                    HIGHLIGHT_OPEN,
                    HIGHLIGHT_CLOSE,
                );
                println!("{marked}");
            } else {
                println!("{text}");
            }
            println!("\n{count_label} verse(s) found");
        }
        _ => println!("{text}"),
    }
    Ok(())
}

fn cmd_chapters(
    corpus: &Corpus,
    args: &cli::ChaptersArgs,
    stored: &Preferences,
) -> error::Result<()> {
    let order = if args.revelation {
        ChapterOrder::Revelation
    } else {
        stored.chapter_order
    };
    let language = args.language.unwrap_or(stored.display.primary_language);
    let chapters = corpus.chapters_ordered(order);

    if args.json {
        return print_json(&chapters);
    }

    for chapter in chapters {
        println!(
            "{:>3}. {} ({}) - {} verses, revelation order {}",
            chapter.chapter_number,
            chapter.title(language),
            chapter.title_transliterated,
            chapter.verse_count,
            chapter.revelation_order
        );
    }
    Ok(())
}

fn cmd_words(corpus: &Corpus, verse_id: &str, json: bool) -> error::Result<()> {
    if corpus.verse_by_id(verse_id).is_none() {
        return Err(Error::NotFound {
            kind: "verse",
            name: verse_id.to_string(),
        });
    }

    let words = corpus.word_tokens(verse_id);
    if json {
        return print_json(&words);
    }

    if words.is_empty() {
        println!("No word-by-word data for '{verse_id}'");
        return Ok(());
    }
    for word in words {
        println!("{}", word_line(word));
    }
    Ok(())
}

fn cmd_root(corpus: &Corpus, args: &cli::RootArgs) -> error::Result<()> {
    let all = corpus.word_tokens_for_root(&args.root);
    let limit = args.limit.unwrap_or(all.len());
    let words: Vec<&WordToken> = all.iter().take(limit).copied().collect();

    if args.json {
        return print_json(&words);
    }

    if words.is_empty() {
        println!("No words found for root '{}'", args.root);
        return Ok(());
    }
    for word in &words {
        println!("[{}] {}", word.verse_id, word_line(word));
    }
    println!("\n{} occurrence(s)", all.len());
    Ok(())
}

fn word_line(word: &WordToken) -> String {
    let mut line = format!(
        "{:>3}. {}\t{}\t{}\t(root: {})",
        word.word_index,
        word.arabic_text,
        word.transliterated_text,
        word.english_text,
        word.root_word
    );
    if !word.meanings.is_empty() {
        line.push_str(&format!("\t{}", word.meanings));
    }
    line
}

#[derive(Serialize)]
struct StatusOutput {
    data_dir: String,
    corpus_loaded: bool,
    #[serde(flatten)]
    stats: Option<quranic::corpus::CorpusStats>,
}

fn cmd_status(data_dir: &DataDir, json: bool) -> error::Result<()> {
    let verses_file = data_dir.verses_file();
    let stats = if verses_file.exists() {
        Some(Corpus::load(data_dir)?.stats())
    } else {
        None
    };

    if json {
        return print_json(&StatusOutput {
            data_dir: data_dir.root().display().to_string(),
            corpus_loaded: stats.is_some(),
            stats,
        });
    }

    println!("Data directory: {}", data_dir.root().display());
    match stats {
        Some(stats) => {
            println!("Verses: {}", stats.verses);
            println!("Chapters: {}", stats.chapters);
            println!("Foreign records: {}", stats.foreign_records);
            println!("Word tokens: {}", stats.word_tokens);
            println!("Roots: {}", stats.roots);
        }
        None => {
            println!("Corpus: not found (expected {})", verses_file.display());
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
