//! Result Summarizer
//!
//! Condenses raw retrieval output into a query-focused synthesis. The
//! input is hard-capped before prompting so retrieval volume cannot
//! blow up the prompt, and a generation failure degrades to a slice of
//! the raw text instead of propagating.

use crate::llm::LlmGateway;
use crate::prompts;
use tracing::warn;

/// Cap on the text embedded into the summarization prompt
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1500;

/// Size of the raw-text fallback when generation fails
const FALLBACK_CHARS: usize = 500;

const TRUNCATION_MARKER: &str = "...";

/// Cut `text` to at most `max` characters, appending the marker when a
/// cut happened. Counts characters, not bytes.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}{}", cut, TRUNCATION_MARKER)
}

/// Summarize raw search results with respect to the original query.
/// Never fails: a generation error degrades to truncated raw text.
pub async fn summarize(
    gateway: &LlmGateway,
    model: &str,
    raw_results: &str,
    query: &str,
    max_input_chars: usize,
) -> String {
    let bounded = truncate_chars(raw_results, max_input_chars);
    let prompt = prompts::build_summarization_prompt(&bounded, query);

    match gateway.prompt(model, &prompt).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!("Summarization failed ({}), falling back to raw results", e);
            truncate_chars(raw_results, FALLBACK_CHARS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedBackend;

    #[test]
    fn test_truncate_short_input_untouched() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_long_input_marked() {
        let truncated = truncate_chars(&"a".repeat(20), 5);
        assert_eq!(truncated, "aaaaa...");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // Multi-byte characters must not split
        let text = "héllo wörld".repeat(50);
        let truncated = truncate_chars(&text, 7);
        assert_eq!(truncated, "héllo w...");
    }

    #[tokio::test]
    async fn test_short_input_embedded_in_full() {
        let backend = ScriptedBackend::new();
        backend.push_reply("Concise summary.");

        let gateway = LlmGateway::with_backend(Box::new(backend.clone()), "m");
        let raw = "Source 1:\nTitle: t\nURL: u\nSnippet: fits easily\n---";
        let summary = summarize(&gateway, "m", raw, "the query", DEFAULT_MAX_INPUT_CHARS).await;

        assert_eq!(summary, "Concise summary.");
        let prompt = &backend.call(0)[0].content;
        assert!(prompt.contains(raw));
        assert!(!prompt.contains(&format!("{}...", raw)));
        assert!(prompt.contains("'the query'"));
    }

    #[tokio::test]
    async fn test_long_input_is_capped_before_prompting() {
        let backend = ScriptedBackend::new();
        backend.push_reply("summary");

        let gateway = LlmGateway::with_backend(Box::new(backend.clone()), "m");
        let raw = "x".repeat(5000);
        summarize(&gateway, "m", &raw, "q", DEFAULT_MAX_INPUT_CHARS).await;

        let prompt = &backend.call(0)[0].content;
        assert!(prompt.contains(&format!("{}...", "x".repeat(DEFAULT_MAX_INPUT_CHARS))));
        assert!(!prompt.contains(&"x".repeat(DEFAULT_MAX_INPUT_CHARS + 1)));
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_raw_slice() {
        let backend = ScriptedBackend::new();
        backend.push_failure("backend down");

        let gateway = LlmGateway::with_backend(Box::new(backend), "m");
        let raw = "y".repeat(900);
        let summary = summarize(&gateway, "m", &raw, "q", DEFAULT_MAX_INPUT_CHARS).await;

        assert_eq!(summary, format!("{}...", "y".repeat(500)));
    }

    #[tokio::test]
    async fn test_generation_failure_short_raw_kept_whole() {
        let backend = ScriptedBackend::new();
        backend.push_failure("backend down");

        let gateway = LlmGateway::with_backend(Box::new(backend), "m");
        let summary = summarize(&gateway, "m", "tiny results", "q", DEFAULT_MAX_INPUT_CHARS).await;

        assert_eq!(summary, "tiny results");
    }
}
