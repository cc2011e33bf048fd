//! Query Refiner
//!
//! Rewrites a natural-language information need into a search-engine
//! query. Models sometimes ignore the "output only the query"
//! instruction and prefix a label; `strip_preamble` compensates.

use crate::llm::{LlmError, LlmGateway};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

/// Preamble labels models prepend despite instructions
static PREAMBLE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:optimized query|search query|query)\s*:").expect("hardcoded regex")
});

/// Drop everything up to and including a known preamble label, then trim
pub fn strip_preamble(text: &str) -> String {
    match PREAMBLE_LABEL.find(text) {
        Some(m) => text[m.end()..].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Rewrite the information need into an optimized search query
pub async fn refine(
    gateway: &LlmGateway,
    model: &str,
    information_need: &str,
) -> Result<String, LlmError> {
    let prompt = prompts::build_refinement_prompt(information_need);
    let reply = gateway.prompt(model, &prompt).await?;

    let query = strip_preamble(&reply);
    info!("Optimized search query: {}", query);
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedBackend;

    #[test]
    fn test_strip_preamble_labels() {
        assert_eq!(
            strip_preamble("Optimized query: london weather today"),
            "london weather today"
        );
        assert_eq!(strip_preamble("Search Query:  tokyo population 2024"), "tokyo population 2024");
        assert_eq!(strip_preamble("query: rust borrow checker"), "rust borrow checker");
    }

    #[test]
    fn test_strip_preamble_without_label_only_trims() {
        assert_eq!(strip_preamble("  nobel prize physics 2023  "), "nobel prize physics 2023");
    }

    #[test]
    fn test_strip_preamble_keeps_text_after_label_only() {
        let reply = "Sure! Here is what I would search for.\nOptimized query: capital of france";
        assert_eq!(strip_preamble(reply), "capital of france");
    }

    #[tokio::test]
    async fn test_refine_embeds_need() {
        let backend = ScriptedBackend::new();
        backend.push_reply("Optimized query: current weather london");

        let gateway = LlmGateway::with_backend(Box::new(backend.clone()), "m");
        let query = refine(&gateway, "m", "What is the weather in London?")
            .await
            .unwrap();

        assert_eq!(query, "current weather london");
        assert!(backend.call(0)[0].content.contains("What is the weather in London?"));
    }
}
