//! Grounded Synthesizer
//!
//! Produces the final answer strictly from the summarized retrieval
//! content. Grounding is enforced by the prompt alone; the output is
//! not validated against the summary.

use crate::llm::{LlmError, LlmGateway};
use crate::prompts;

/// Answer the original query using only the supplied summary
pub async fn synthesize(
    gateway: &LlmGateway,
    model: &str,
    summary: &str,
    original_query: &str,
) -> Result<String, LlmError> {
    let prompt = prompts::build_synthesis_prompt(summary, original_query);
    gateway.prompt(model, &prompt).await
}
