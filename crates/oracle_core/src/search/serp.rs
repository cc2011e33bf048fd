//! SERP scraping backend
//!
//! Fetches search engine result pages over plain HTTP and extracts
//! hits with per-engine CSS selectors. Engines rewrite their markup
//! from time to time; the selectors target each engine's non-JS HTML
//! endpoint where one exists, which changes far less often.

use super::{SearchBackend, SearchError, SearchHit};
use crate::config::SearchEngineId;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

const FETCH_TIMEOUT_SECS: u64 = 10;

/// Result pages render differently for clients without a browser UA
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Engine-specific selectors for one result entry
struct SerpProfile {
    result: &'static str,
    title: &'static str,
    link: &'static str,
    snippet: &'static str,
}

fn profile_for(engine: SearchEngineId) -> SerpProfile {
    match engine {
        SearchEngineId::Google => SerpProfile {
            result: "div.g",
            title: "h3",
            link: "a[href]",
            snippet: "div.VwiC3b",
        },
        SearchEngineId::Bing => SerpProfile {
            result: "li.b_algo",
            title: "h2 a",
            link: "h2 a",
            snippet: "div.b_caption p",
        },
        SearchEngineId::Yahoo => SerpProfile {
            result: "div.algo",
            title: "h3.title a",
            link: "h3.title a",
            snippet: "div.compText p",
        },
        SearchEngineId::DuckDuckGo => SerpProfile {
            result: "div.result",
            title: "a.result__a",
            link: "a.result__a",
            snippet: "a.result__snippet",
        },
        SearchEngineId::Brave => SerpProfile {
            result: "div.snippet",
            title: "div.title",
            link: "a[href]",
            snippet: "div.snippet-description",
        },
    }
}

/// URL and query parameters for one result page (0-based)
fn page_request(engine: SearchEngineId, query: &str, page: u32) -> (&'static str, Vec<(&'static str, String)>) {
    match engine {
        SearchEngineId::Google => (
            "https://www.google.com/search",
            vec![("q", query.to_string()), ("start", (page * 10).to_string())],
        ),
        SearchEngineId::Bing => (
            "https://www.bing.com/search",
            vec![("q", query.to_string()), ("first", (page * 10 + 1).to_string())],
        ),
        SearchEngineId::Yahoo => (
            "https://search.yahoo.com/search",
            vec![("p", query.to_string()), ("b", (page * 10 + 1).to_string())],
        ),
        SearchEngineId::DuckDuckGo => (
            "https://html.duckduckgo.com/html/",
            vec![("q", query.to_string()), ("s", (page * 30).to_string())],
        ),
        SearchEngineId::Brave => (
            "https://search.brave.com/search",
            vec![("q", query.to_string()), ("offset", page.to_string())],
        ),
    }
}

/// Extract hits from one result page
fn parse_serp(html: &str, profile: &SerpProfile) -> Result<Vec<SearchHit>, SearchError> {
    let result_sel =
        Selector::parse(profile.result).map_err(|e| SearchError::Parse(e.to_string()))?;
    let title_sel =
        Selector::parse(profile.title).map_err(|e| SearchError::Parse(e.to_string()))?;
    let link_sel = Selector::parse(profile.link).map_err(|e| SearchError::Parse(e.to_string()))?;
    let snippet_sel =
        Selector::parse(profile.snippet).map_err(|e| SearchError::Parse(e.to_string()))?;

    let document = Html::parse_document(html);
    let mut hits = Vec::new();

    for result in document.select(&result_sel) {
        let title = result
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        let url = result
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| href.to_string())
            .filter(|s| !s.is_empty());

        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        // Entries with neither title nor snippet are markup noise
        if title.is_none() && snippet.is_none() {
            continue;
        }

        hits.push(SearchHit { title, url, snippet });
    }

    Ok(hits)
}

/// Search backend that scrapes engine result pages
pub struct SerpBackend {
    http: reqwest::Client,
    engine: SearchEngineId,
}

impl SerpBackend {
    pub fn new(engine: SearchEngineId) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            engine,
        }
    }
}

#[async_trait]
impl SearchBackend for SerpBackend {
    async fn search(&self, query: &str, pages: u32) -> Result<Vec<SearchHit>, SearchError> {
        let profile = profile_for(self.engine);
        let mut hits = Vec::new();

        for page in 0..pages.max(1) {
            let (url, params) = page_request(self.engine, query, page);

            let response = self
                .http
                .get(url)
                .query(&params)
                .send()
                .await
                .map_err(|e| SearchError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Err(SearchError::Network(format!(
                    "HTTP {} from {}",
                    response.status(),
                    self.engine
                )));
            }

            let html = response
                .text()
                .await
                .map_err(|e| SearchError::Network(e.to_string()))?;

            let page_hits = parse_serp(&html, &profile)?;
            debug!(
                "SERP page {} of {} via {}: {} hits",
                page + 1,
                pages,
                self.engine,
                page_hits.len()
            );
            hits.extend(page_hits);
        }

        Ok(hits)
    }
}
