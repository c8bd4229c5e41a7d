use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config_db::ConfigDb,
    corpus::Corpus,
    engine,
    error,
    format::{self, VerseView},
    language::Language,
    preferences::Preferences,
    query::{self, ParsedQuery},
    record::WordToken,
};

const DEFAULT_VERSE_LIMIT: usize = 50;
const DEFAULT_ROOT_LIMIT: usize = 100;

struct QuranicState {
    corpus: Corpus,
    config_db: ConfigDb,
}

#[derive(Clone)]
pub struct QuranicMcpServer {
    state: Arc<QuranicState>,
    tool_router: ToolRouter<Self>,
}

impl QuranicMcpServer {
    fn new(state: QuranicState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }

    fn preferences(&self) -> Result<Preferences, rmcp::ErrorData> {
        Preferences::load(&self.state.config_db)
            .map_err(|e| mcp_error("failed to load preferences", e))
    }
}

#[tool_router(router = tool_router)]
impl QuranicMcpServer {
    /// Parse and run a query against the corpus.
    #[tool(
        name = "quran_query",
        description = "Look up Quran verses. Accepts references like 2:255, 18:1-10, 2:1,2:5 or a chapter number, the phrases 'random verse' and 'random chapter', or free text to search for."
    )]
    pub async fn quran_query(
        &self,
        params: Parameters<QueryParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let mut prefs = self.preferences()?.display;
        if let Some(ref language) = params.language {
            prefs.primary_language = language.parse::<Language>().map_err(|e| {
                rmcp::ErrorData::invalid_params(e.to_string(), None)
            })?;
        }

        let mut parsed = query::parse(&params.query, prefs.primary_language);
        if params.exact.unwrap_or(false) {
            parsed = parsed.exact();
        }

        let verses = engine::evaluate(
            &self.state.corpus,
            &parsed,
            prefs.search_scope(),
            &mut rand::thread_rng(),
        );
        let count_label = engine::count_label(verses.len());
        let limit = params.limit.unwrap_or(DEFAULT_VERSE_LIMIT);
        let shown = &verses[..verses.len().min(limit)];

        let summary = match &parsed {
            ParsedQuery::Invalid { reason } => format!("Invalid query: {reason}"),
            _ if verses.is_empty() => {
                format!("No verses found for '{}'", params.query)
            }
            _ => {
                let mut text =
                    format::format_verses(&self.state.corpus, shown, &prefs);
                if shown.len() < verses.len() {
                    text.push_str(&format!(
                        "\n\n(showing {} of {count_label} verses)",
                        shown.len()
                    ));
                }
                text
            }
        };

        let structured = serde_json::to_value(QueryResponse {
            query: params.query,
            kind: parsed.kind().to_string(),
            invalid_reason: match &parsed {
                ParsedQuery::Invalid { reason } => Some(reason.clone()),
                _ => None,
            },
            count_label,
            result_count: verses.len(),
            verses: shown
                .iter()
                .map(|v| VerseView::new(&self.state.corpus, v, &prefs))
                .collect(),
        })
        .map_err(|e| mcp_error("failed to serialize query results", e))?;

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }

    /// Word-by-word breakdown of one verse.
    #[tool(
        name = "quran_words",
        description = "Word-by-word breakdown of a verse (Arabic, transliteration, English, root, meanings). Takes a verse id such as 1:1."
    )]
    pub async fn quran_words(
        &self,
        params: Parameters<WordsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let verse_id = params.0.verse_id;
        let words = self.state.corpus.word_tokens(&verse_id);

        let summary = if words.is_empty() {
            format!("No word-by-word data for '{verse_id}'")
        } else {
            words
                .iter()
                .map(|w| format_word(w))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let structured = serde_json::to_value(WordsResponse {
            word_count: words.len(),
            verse_id,
            words: words.into_iter().map(WordView::from).collect(),
        })
        .map_err(|e| mcp_error("failed to serialize words", e))?;

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }

    /// Every occurrence of a root word.
    #[tool(
        name = "quran_root",
        description = "List the words across the Quran that share an Arabic root, in corpus order."
    )]
    pub async fn quran_root(
        &self,
        params: Parameters<RootParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let all = self.state.corpus.word_tokens_for_root(&params.root);
        let limit = params.limit.unwrap_or(DEFAULT_ROOT_LIMIT);
        let words: Vec<&WordToken> = all.iter().take(limit).copied().collect();

        let summary = if words.is_empty() {
            format!("No words found for root '{}'", params.root)
        } else {
            let mut lines = vec![format!(
                "Found {} occurrence{} of root '{}':",
                all.len(),
                if all.len() == 1 { "" } else { "s" },
                params.root
            )];
            lines.extend(
                words
                    .iter()
                    .map(|w| format!("[{}] {}", w.verse_id, format_word(w))),
            );
            lines.join("\n")
        };

        let structured = serde_json::to_value(RootResponse {
            root: params.root,
            occurrence_count: all.len(),
            words: words.into_iter().map(WordView::from).collect(),
        })
        .map_err(|e| mcp_error("failed to serialize root occurrences", e))?;

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for QuranicMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(
                Implementation::new("quranic", env!("CARGO_PKG_VERSION"))
                    .with_title("quranic MCP"),
            )
            .with_instructions(
                "Use quran_query to fetch verses by reference or search their text. Use quran_words and quran_root for word-level study.",
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    /// Verse reference, chapter number, "random verse", "random chapter",
    /// or text to search for.
    pub query: String,
    /// Language to read and search in (default: stored preference).
    pub language: Option<String>,
    /// Match search text as one contiguous phrase.
    pub exact: Option<bool>,
    /// Maximum number of verses returned (default: 50).
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordsParams {
    /// Verse id, e.g. "1:1".
    pub verse_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RootParams {
    /// Root word as spelled in the word-by-word data.
    pub root: String,
    /// Maximum number of occurrences returned (default: 100).
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    query: String,
    kind: String,
    invalid_reason: Option<String>,
    count_label: String,
    result_count: usize,
    verses: Vec<VerseView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WordsResponse<'a> {
    verse_id: String,
    word_count: usize,
    words: Vec<WordView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RootResponse<'a> {
    root: String,
    occurrence_count: usize,
    words: Vec<WordView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WordView<'a> {
    verse_id: &'a str,
    word_index: u32,
    global_index: u32,
    root_word: &'a str,
    english_text: &'a str,
    arabic_text: &'a str,
    transliterated_text: &'a str,
    meanings: &'a str,
}

impl<'a> From<&'a WordToken> for WordView<'a> {
    fn from(word: &'a WordToken) -> Self {
        Self {
            verse_id: &word.verse_id,
            word_index: word.word_index,
            global_index: word.global_index,
            root_word: &word.root_word,
            english_text: &word.english_text,
            arabic_text: &word.arabic_text,
            transliterated_text: &word.transliterated_text,
            meanings: &word.meanings,
        }
    }
}

fn format_word(word: &WordToken) -> String {
    format!(
        "{}. {} ({}) {} [root: {}]",
        word.word_index,
        word.arabic_text,
        word.transliterated_text,
        word.english_text,
        word.root_word
    )
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(corpus: Corpus, config_db: ConfigDb) -> error::Result<()> {
    let server = QuranicMcpServer::new(QuranicState { corpus, config_db });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error::Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            error::Error::Config(format!(
                "MCP server initialization failed: {e}"
            ))
        })?;
        running.waiting().await.map_err(|e| {
            error::Error::Config(format!("MCP server error: {e}"))
        })?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_corpus;

    fn server() -> (QuranicMcpServer, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let config_db = ConfigDb::open(&tmp.path().join("config.redb")).unwrap();
        let server = QuranicMcpServer::new(QuranicState {
            corpus: fixture_corpus(),
            config_db,
        });
        (server, tmp)
    }

    fn summary(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    fn query(text: &str) -> QueryParams {
        QueryParams {
            query: text.to_string(),
            language: None,
            exact: None,
            limit: None,
        }
    }

    #[tokio::test]
    async fn query_tool_returns_verse_views() {
        let (server, _tmp) = server();

        let result = server.quran_query(Parameters(query("1:2-3"))).await.unwrap();

        let structured = result.structured_content.clone().expect("structured");
        assert_eq!(structured["kind"], "verseRange");
        assert_eq!(structured["countLabel"], "2");
        let verses = structured["verses"].as_array().expect("verses array");
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0]["verseId"], "1:2");
        assert!(summary(&result).starts_with("[1:2] "));
    }

    #[tokio::test]
    async fn invalid_query_is_not_a_tool_error() {
        let (server, _tmp) = server();

        let result = server.quran_query(Parameters(query("  "))).await.unwrap();

        assert_eq!(result.is_error, Some(false));
        assert_eq!(summary(&result), "Invalid query: Empty query");
        let structured = result.structured_content.expect("structured");
        assert_eq!(structured["kind"], "invalid");
        assert_eq!(structured["invalidReason"], "Empty query");
    }

    #[tokio::test]
    async fn search_respects_language_and_limit() {
        let (server, _tmp) = server();
        let params = QueryParams {
            language: Some("french".to_string()),
            limit: Some(1),
            ..query("alif lam")
        };

        let result = server.quran_query(Parameters(params)).await.unwrap();

        let structured = result.structured_content.expect("structured");
        assert_eq!(structured["kind"], "search");
        assert_eq!(structured["verses"][0]["text"], "Alif, Lam, Mim.");
    }

    #[tokio::test]
    async fn unknown_language_is_rejected() {
        let (server, _tmp) = server();
        let params = QueryParams {
            language: Some("latin".to_string()),
            ..query("mercy")
        };

        assert!(server.quran_query(Parameters(params)).await.is_err());
    }

    #[tokio::test]
    async fn no_results_message_names_the_input() {
        let (server, _tmp) = server();

        let result = server.quran_query(Parameters(query("99:1"))).await.unwrap();
        assert_eq!(summary(&result), "No verses found for '99:1'");
    }

    #[tokio::test]
    async fn words_tool_orders_by_word_index() {
        let (server, _tmp) = server();

        let result = server
            .quran_words(Parameters(WordsParams {
                verse_id: "1:1".to_string(),
            }))
            .await
            .unwrap();

        let structured = result.structured_content.expect("structured");
        let indexes: Vec<u64> = structured["words"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["wordIndex"].as_u64().unwrap())
            .collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);
        assert_eq!(structured["words"][0]["rootWord"], "smw");
        assert!(structured["words"][0].get("root_word").is_none());
    }

    #[tokio::test]
    async fn root_tool_counts_all_but_returns_limit() {
        let (server, _tmp) = server();

        let result = server
            .quran_root(Parameters(RootParams {
                root: "rhm".to_string(),
                limit: Some(2),
            }))
            .await
            .unwrap();

        let structured = result.structured_content.clone().expect("structured");
        assert_eq!(structured["occurrenceCount"], 4);
        assert_eq!(structured["words"].as_array().unwrap().len(), 2);
        assert_eq!(structured["words"][0]["verseId"], "1:1");
        assert!(summary(&result).starts_with("Found 4 occurrences of root 'rhm':"));
    }
}
