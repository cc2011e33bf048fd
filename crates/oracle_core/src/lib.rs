//! oracle_core - conversational answering with search augmentation
//!
//! A session-oriented question answering library for local language
//! models. Each turn produces a direct answer first; when a search
//! engine is configured, a second model pass judges whether that answer
//! suffices, and an insufficient one is replaced by an answer grounded
//! in fresh web search results.
//!
//! Pipeline per turn:
//! 1. direct answer from the conversation history
//! 2. sufficiency evaluation ([Yes]/[No] verdict)
//! 3. query refinement, retrieval, summarization, synthesis
//!
//! Every stage past the direct answer fails soft: the turn always
//! resolves to an answer, falling back to the direct one.

pub mod config;
pub mod evaluator;
pub mod llm;
pub mod message;
pub mod oracle;
pub mod prompts;
pub mod refiner;
pub mod search;
pub mod summarizer;
pub mod synthesizer;

pub use config::{ConfigError, LlmProvider, OracleConfig, SearchEngineId};
pub use llm::{LlmError, LlmGateway};
pub use message::{ChatMessage, ChatRole};
pub use oracle::{Oracle, OracleError};
pub use search::{SearchGateway, SearchOutcome};
