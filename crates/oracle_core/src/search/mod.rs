//! Retrieval Gateway
//!
//! Uniform call interface over the web search backends. Raw hits are
//! normalized into `SearchHit` records and formatted into a
//! prompt-ready numbered block. The outcome of a retrieval is a tagged
//! `SearchOutcome` the orchestrator matches on; the human-readable
//! failure messages only exist in its `Display` impl.

pub mod serp;

use crate::config::SearchEngineId;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub use serp::SerpBackend;

/// Placeholder for a hit without a title
pub const NO_TITLE: &str = "No title";
/// Placeholder for a hit without a URL
pub const NO_URL: &str = "No URL";

/// Retrieval errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// One normalized search result item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

impl SearchHit {
    /// A hit is usable only if it carries snippet text
    pub fn is_usable(&self) -> bool {
        self.snippet.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
    }
}

/// Trait abstraction over search backends
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a query and return raw hits in engine order
    async fn search(&self, query: &str, pages: u32) -> Result<Vec<SearchHit>, SearchError>;
}

/// Outcome of one retrieval call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Formatted, prompt-ready result block
    Found(String),
    /// The engine returned zero hits
    NoResults {
        engine: SearchEngineId,
        query: String,
    },
    /// Hits were returned but none carried snippet text
    NoUsableContent {
        engine: SearchEngineId,
        query: String,
    },
    /// The backend failed during retrieval
    ServiceError {
        engine: SearchEngineId,
        query: String,
        message: String,
    },
}

impl SearchOutcome {
    /// True only for a formatted result block
    pub fn is_usable(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::Found(text) => write!(f, "{}", text),
            SearchOutcome::NoResults { engine, query } => {
                write!(f, "No results found by {} for the query: '{}'", engine, query)
            }
            SearchOutcome::NoUsableContent { engine, query } => write!(
                f,
                "Search returned results, but no usable text content could be extracted for query: '{}' with {}",
                query, engine
            ),
            SearchOutcome::ServiceError { engine, query, message } => write!(
                f,
                "Not able to receive search service: {} results due to an error ({}). Query: '{}'",
                engine, message, query
            ),
        }
    }
}

/// Format usable hits as a numbered, labeled block.
///
/// Hits keep their engine order and their raw position number; hits
/// without a snippet are dropped silently. Deterministic for the same
/// input.
pub fn format_hits(hits: &[SearchHit]) -> String {
    let blocks: Vec<String> = hits
        .iter()
        .enumerate()
        .filter(|(_, hit)| hit.is_usable())
        .map(|(i, hit)| {
            format!(
                "Source {}:\nTitle: {}\nURL: {}\nSnippet: {}\n---",
                i + 1,
                hit.title.as_deref().unwrap_or(NO_TITLE),
                hit.url.as_deref().unwrap_or(NO_URL),
                hit.snippet.as_deref().unwrap_or_default(),
            )
        })
        .collect();

    blocks.join("\n\n")
}

/// Uniform call interface over one search backend
pub struct SearchGateway {
    backend: Box<dyn SearchBackend>,
    engine: SearchEngineId,
    pages: u32,
}

impl SearchGateway {
    /// Build the gateway with the production SERP scraping backend
    pub fn for_engine(engine: SearchEngineId, pages: u32) -> Self {
        Self {
            backend: Box::new(SerpBackend::new(engine)),
            engine,
            pages: pages.max(1),
        }
    }

    /// Build the gateway around an arbitrary backend (used by tests)
    pub fn with_backend(backend: Box<dyn SearchBackend>, engine: SearchEngineId, pages: u32) -> Self {
        Self {
            backend,
            engine,
            pages: pages.max(1),
        }
    }

    pub fn engine(&self) -> SearchEngineId {
        self.engine
    }

    /// Run one retrieval and classify its outcome
    pub async fn retrieve(&self, query: &str) -> SearchOutcome {
        info!("[>]  Search [{}] ({} pages): {}", self.engine, self.pages, query);

        let hits = match self.backend.search(query, self.pages).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search via {} failed: {}", self.engine, e);
                return SearchOutcome::ServiceError {
                    engine: self.engine,
                    query: query.to_string(),
                    message: e.to_string(),
                };
            }
        };

        if hits.is_empty() {
            return SearchOutcome::NoResults {
                engine: self.engine,
                query: query.to_string(),
            };
        }

        let formatted = format_hits(&hits);
        if formatted.is_empty() {
            return SearchOutcome::NoUsableContent {
                engine: self.engine,
                query: query.to_string(),
            };
        }

        info!(
            "[<]  Search [{}] returned {} hits ({} chars formatted)",
            self.engine,
            hits.len(),
            formatted.len()
        );
        SearchOutcome::Found(formatted)
    }
}

// ============================================================================
// Scripted backend (testing)
// ============================================================================

/// Search backend with pre-configured results for deterministic tests.
/// Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct ScriptedSearchBackend {
    replies: Arc<Mutex<VecDeque<Result<Vec<SearchHit>, String>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful hit list
    pub fn push_hits(&self, hits: Vec<SearchHit>) {
        self.replies.lock().unwrap().push_back(Ok(hits));
    }

    /// Queue a retrieval failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    /// Number of search calls received so far
    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Query string of the n-th search call (0-based)
    pub fn query(&self, n: usize) -> String {
        self.queries.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearchBackend {
    async fn search(&self, query: &str, _pages: u32) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(hits)) => Ok(hits),
            Some(Err(message)) => Err(SearchError::Network(message)),
            None => Err(SearchError::Network("scripted results exhausted".to_string())),
        }
    }
}
