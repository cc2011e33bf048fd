//! Conversation Orchestrator
//!
//! Owns the per-session message history and drives each turn: direct
//! answer first, then, when a search engine is configured, the
//! sufficiency gate and, if it fails, the refine → retrieve →
//! summarize → synthesize chain. Every known failure past the direct
//! answer is contained and resolves to a best-effort final answer.

use crate::config::OracleConfig;
use crate::llm::{LlmError, LlmGateway};
use crate::message::ChatMessage;
use crate::search::{SearchGateway, SearchOutcome};
use crate::{evaluator, refiner, summarizer, synthesizer};
use tracing::{debug, info, warn};

/// Orchestrator errors surfaced to the caller
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),
}

/// One conversational session against a local model, with optional
/// search augmentation
pub struct Oracle {
    config: OracleConfig,
    llm: LlmGateway,
    search: Option<SearchGateway>,
    history: Vec<ChatMessage>,
}

impl Oracle {
    /// Build a session from configuration, wiring the production
    /// backends
    pub fn new(config: OracleConfig) -> Self {
        let llm = LlmGateway::for_provider(config.provider, config.model.clone());
        let search = config
            .search_engine
            .map(|engine| SearchGateway::for_engine(engine, config.search_pages));

        Self {
            config,
            llm,
            search,
            history: Vec::new(),
        }
    }

    /// Build a session around explicit gateways (used by tests)
    pub fn with_gateways(
        config: OracleConfig,
        llm: LlmGateway,
        search: Option<SearchGateway>,
    ) -> Self {
        Self {
            config,
            llm,
            search,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// The conversation so far, in chronological order
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// List models available from the configured provider
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.llm.list_models().await
    }

    /// Fully clear the conversation. Idempotent.
    pub fn reset(&mut self) {
        self.history.clear();
        info!("Conversation context cleared");
    }

    /// Process one user turn and return the final answer.
    ///
    /// The user turn and the resulting assistant turn are appended to
    /// the history; on error neither is kept, so the history always
    /// ends with a completed exchange.
    pub async fn respond(&mut self, user_text: &str) -> Result<String, OracleError> {
        self.history.push(ChatMessage::user(user_text));

        let direct = match self.llm.generate(&self.history).await {
            Ok(text) => text,
            Err(e) => {
                self.history.pop();
                return Err(e.into());
            }
        };

        let final_answer = match &self.search {
            Some(search) => self.augmented_answer(search, user_text, &direct).await,
            None => {
                debug!("Search not enabled; using direct response");
                direct
            }
        };

        self.history.push(ChatMessage::assistant(final_answer.clone()));
        Ok(final_answer)
    }

    /// Run the evaluation gate and, when needed, the augmentation
    /// pipeline. Always produces an answer; any stage failure falls
    /// back to the direct answer.
    async fn augmented_answer(
        &self,
        search: &SearchGateway,
        question: &str,
        direct: &str,
    ) -> String {
        let stage_model = self.config.stage_model();

        match evaluator::is_sufficient(&self.llm, stage_model, question, direct).await {
            Ok(true) => {
                info!("Initial response deemed sufficient by evaluation");
                return direct.to_string();
            }
            Ok(false) => {
                info!(
                    "Response deemed insufficient; proceeding with web search via {}",
                    search.engine()
                );
            }
            Err(e) => {
                warn!("Evaluation failed ({}), keeping direct response", e);
                return direct.to_string();
            }
        }

        let query = match refiner::refine(&self.llm, stage_model, question).await {
            Ok(query) => query,
            Err(e) => {
                warn!("Query refinement failed ({}), keeping direct response", e);
                return direct.to_string();
            }
        };

        let results = match search.retrieve(&query).await {
            SearchOutcome::Found(text) => text,
            failure => {
                warn!(
                    "Web search failed or returned no usable results: {}. Falling back to direct response.",
                    failure
                );
                return direct.to_string();
            }
        };

        let summary = summarizer::summarize(
            &self.llm,
            stage_model,
            &results,
            question,
            summarizer::DEFAULT_MAX_INPUT_CHARS,
        )
        .await;
        debug!("Summarized search results ({} chars)", summary.len());

        match synthesizer::synthesize(&self.llm, stage_model, &summary, question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Synthesis failed ({}), keeping direct response", e);
                direct.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchEngineId;
    use crate::llm::ScriptedBackend;
    use crate::message::ChatRole;
    use crate::search::{ScriptedSearchBackend, SearchHit};

    fn plain_oracle(backend: &ScriptedBackend) -> Oracle {
        Oracle::with_gateways(
            OracleConfig::default(),
            LlmGateway::with_backend(Box::new(backend.clone()), "test-model"),
            None,
        )
    }

    fn searching_oracle(
        llm: &ScriptedBackend,
        search: &ScriptedSearchBackend,
    ) -> Oracle {
        let config = OracleConfig {
            search_engine: Some(SearchEngineId::Google),
            ..OracleConfig::default()
        };
        Oracle::with_gateways(
            config,
            LlmGateway::with_backend(Box::new(llm.clone()), "test-model"),
            Some(SearchGateway::with_backend(
                Box::new(search.clone()),
                SearchEngineId::Google,
                2,
            )),
        )
    }

    fn usable_hit() -> SearchHit {
        SearchHit {
            title: Some("Result".to_string()),
            url: Some("https://example.org".to_string()),
            snippet: Some("Useful snippet text.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_direct_answer_without_search() {
        let backend = ScriptedBackend::new();
        backend.push_reply("Paris is the capital of France.");
        let mut oracle = plain_oracle(&backend);

        let answer = oracle.respond("What is the capital of France?").await.unwrap();

        assert_eq!(answer, "Paris is the capital of France.");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(oracle.history().len(), 2);
        assert_eq!(oracle.history()[0], ChatMessage::user("What is the capital of France?"));
        assert_eq!(oracle.history()[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_history_grows_and_is_passed_in_full() {
        let backend = ScriptedBackend::new();
        backend.push_reply("first reply");
        backend.push_reply("second reply");
        let mut oracle = plain_oracle(&backend);

        oracle.respond("first question").await.unwrap();
        let before: Vec<ChatMessage> = oracle.history()[..2].to_vec();
        oracle.respond("second question").await.unwrap();

        // Prior turns unchanged, new exchange appended in order
        assert_eq!(&oracle.history()[..2], &before[..]);
        assert_eq!(oracle.history().len(), 4);

        // The second generation call saw the full history plus the new user turn
        let second_call = backend.call(1);
        assert_eq!(second_call.len(), 3);
        assert_eq!(second_call[0].content, "first question");
        assert_eq!(second_call[1].content, "first reply");
        assert_eq!(second_call[2].content, "second question");
    }

    #[tokio::test]
    async fn test_reset_forgets_everything() {
        let backend = ScriptedBackend::new();
        backend.push_reply("one");
        backend.push_reply("two");
        let mut oracle = plain_oracle(&backend);

        oracle.respond("remember this").await.unwrap();
        oracle.reset();
        oracle.reset(); // idempotent
        oracle.respond("fresh start").await.unwrap();

        assert_eq!(oracle.history().len(), 2);
        // The post-reset call carries no memory of the prior exchange
        let call = backend.call(1);
        assert_eq!(call.len(), 1);
        assert_eq!(call[0].content, "fresh start");
    }

    #[tokio::test]
    async fn test_direct_answer_failure_propagates_and_keeps_history_clean() {
        let backend = ScriptedBackend::new();
        backend.push_failure("connection refused");
        let mut oracle = plain_oracle(&backend);

        let result = oracle.respond("hello?").await;

        assert!(matches!(result, Err(OracleError::Llm(_))));
        assert!(oracle.history().is_empty());
    }

    #[tokio::test]
    async fn test_sufficient_answer_skips_pipeline() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct answer.");
        llm.push_reply("Accurate.\n[Yes]");
        let search = ScriptedSearchBackend::new();
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle.respond("well-known fact?").await.unwrap();

        assert_eq!(answer, "Direct answer.");
        // One generation call plus one evaluation call, nothing else
        assert_eq!(llm.call_count(), 2);
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_results_falls_back_to_direct_answer() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct answer.");
        llm.push_reply("Outdated.\n[No]");
        llm.push_reply("refined query");
        let search = ScriptedSearchBackend::new();
        search.push_hits(vec![]);
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle.respond("obscure question?").await.unwrap();

        // Byte-for-byte the pre-evaluation direct answer
        assert_eq!(answer, "Direct answer.");
        assert_eq!(search.call_count(), 1);
        assert_eq!(search.query(0), "refined query");
        // Summarizer and synthesizer never ran
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unusable_results_fall_back_to_direct_answer() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct answer.");
        llm.push_reply("[No]");
        llm.push_reply("refined query");
        let search = ScriptedSearchBackend::new();
        search.push_hits(vec![SearchHit {
            title: Some("title only".to_string()),
            url: None,
            snippet: None,
        }]);
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle.respond("q").await.unwrap();
        assert_eq!(answer, "Direct answer.");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_search_service_error_falls_back_to_direct_answer() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct answer.");
        llm.push_reply("[No]");
        llm.push_reply("refined query");
        let search = ScriptedSearchBackend::new();
        search.push_failure("rate limited");
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle.respond("q").await.unwrap();
        assert_eq!(answer, "Direct answer.");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_full_augmentation_pipeline() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct but stale answer.");
        llm.push_reply("Possibly outdated.\n[No]");
        llm.push_reply("nobel prize physics 2023 winners");
        llm.push_reply("Summary: the 2023 prize went to Agostini, Krausz and L'Huillier.");
        llm.push_reply("The 2023 Nobel Prize in Physics was awarded to Agostini, Krausz and L'Huillier.");
        let search = ScriptedSearchBackend::new();
        search.push_hits(vec![usable_hit()]);
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle
            .respond("Who won the Nobel Prize in Physics in 2023?")
            .await
            .unwrap();

        assert!(answer.contains("Krausz"));
        assert_eq!(llm.call_count(), 5);
        assert_eq!(search.call_count(), 1);

        // Summarizer saw the formatted retrieval block
        let summarizer_prompt = &llm.call(3)[0].content;
        assert!(summarizer_prompt.contains("Useful snippet text."));

        // Synthesizer saw the summary and the original question
        let synthesizer_prompt = &llm.call(4)[0].content;
        assert!(synthesizer_prompt.contains("Agostini"));
        assert!(synthesizer_prompt.contains("Who won the Nobel Prize in Physics in 2023?"));

        // History records the final (augmented) answer
        assert_eq!(oracle.history().len(), 2);
        assert_eq!(oracle.history()[1].content, answer);
    }

    #[tokio::test]
    async fn test_evaluation_transport_failure_keeps_direct_answer() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct answer.");
        llm.push_failure("backend down");
        let search = ScriptedSearchBackend::new();
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle.respond("q").await.unwrap();

        assert_eq!(answer, "Direct answer.");
        assert_eq!(search.call_count(), 0);
        assert_eq!(oracle.history().len(), 2);
    }

    #[tokio::test]
    async fn test_summarizer_failure_still_synthesizes_from_raw_text() {
        let llm = ScriptedBackend::new();
        llm.push_reply("Direct answer.");
        llm.push_reply("[No]");
        llm.push_reply("refined query");
        llm.push_failure("summarizer backend hiccup");
        llm.push_reply("Answer built from raw snippet text.");
        let search = ScriptedSearchBackend::new();
        search.push_hits(vec![usable_hit()]);
        let mut oracle = searching_oracle(&llm, &search);

        let answer = oracle.respond("q").await.unwrap();

        assert_eq!(answer, "Answer built from raw snippet text.");
        // The synthesis prompt embeds the degraded (raw) summary
        let synthesizer_prompt = &llm.call(4)[0].content;
        assert!(synthesizer_prompt.contains("Useful snippet text."));
    }
}
