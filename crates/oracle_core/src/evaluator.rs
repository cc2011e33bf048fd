//! Sufficiency Evaluator
//!
//! Judges whether a direct answer adequately addresses a question. The
//! model must end its reply with `[Yes]` or `[No]`; anything else
//! counts as insufficient. The conservative default matters: ambiguous
//! evaluator output must never suppress augmentation.

use crate::llm::{LlmError, LlmGateway};
use crate::prompts;
use tracing::{debug, info};

/// Parse the bracketed verdict tag anchored at the end of the reply.
/// Only a trailing `[Yes]` (any case) is sufficient.
pub fn parse_verdict(text: &str) -> bool {
    text.trim().to_lowercase().ends_with("[yes]")
}

/// Ask the evaluation model whether `answer` sufficiently addresses
/// `question`
pub async fn is_sufficient(
    gateway: &LlmGateway,
    model: &str,
    question: &str,
    answer: &str,
) -> Result<bool, LlmError> {
    let prompt = prompts::build_evaluation_prompt(question, answer);
    let reply = gateway.prompt(model, &prompt).await?;

    let verdict = parse_verdict(&reply);
    debug!("Evaluator reply ({} chars): {}", reply.len(), reply);
    info!(
        "Evaluation verdict: {}",
        if verdict { "sufficient" } else { "insufficient" }
    );
    Ok(verdict)
}
