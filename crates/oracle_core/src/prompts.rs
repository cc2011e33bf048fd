//! Fixed prompt templates for the pipeline stages.
//!
//! Every stage sends a single user message built from one of these
//! templates. The evaluator's output contract (a bracketed tag on the
//! final line) is what `evaluator::parse_verdict` matches against.

/// Instruction header for the sufficiency evaluation stage
pub const EVALUATION_INSTRUCTIONS: &str = "Assess whether the answer below adequately \
addresses the question. Judge its accuracy, relevance, clarity, and whether it leaves \
ambiguity or oversimplifies. Answers about recent events or fast-changing facts that \
the model may not know reliably should be judged insufficient. End your response with \
exactly one of the following tags on its own line: [Yes] if the answer is sufficient, \
or [No] if it is not.";

/// Instruction header for the query refinement stage
pub const REFINEMENT_INSTRUCTIONS: &str = "Optimize the following information request \
to be the most effective to retrieve the needed information when submitted to a web \
search engine. Your output must be only the optimized query, do not add anything else, \
because it will be used verbatim as a search query.";

/// Build the evaluation prompt embedding question and answer verbatim
pub fn build_evaluation_prompt(question: &str, answer: &str) -> String {
    format!(
        "{}\n\nQuestion: {}\n\nAnswer: {}",
        EVALUATION_INSTRUCTIONS, question, answer
    )
}

/// Build the query refinement prompt
pub fn build_refinement_prompt(information_need: &str) -> String {
    format!("{}\n\nRequest: {}", REFINEMENT_INSTRUCTIONS, information_need)
}

/// Build the summarization prompt for raw (possibly truncated) results
pub fn build_summarization_prompt(results: &str, query: &str) -> String {
    format!(
        "Based on the following search results, extract and synthesize the information \
that is most relevant to answering the query: '{}'. Provide a concise summary of the \
key findings. If sources conflict, note the conflict instead of silently resolving it. \
Avoid making up information not present in the text. Search results snippet:\n\n{}",
        query, results
    )
}

/// Build the grounded synthesis prompt
pub fn build_synthesis_prompt(summary: &str, query: &str) -> String {
    format!(
        "Based only on this information:\n\n{}\n\nanswer the following query: {}\n\n\
Use nothing beyond the information above. If it does not contain what is needed to \
answer, say so explicitly instead of inventing an answer.",
        summary, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_prompt_embeds_both_verbatim() {
        let prompt = build_evaluation_prompt("What is BGP?", "A routing protocol.");
        assert!(prompt.contains("What is BGP?"));
        assert!(prompt.contains("A routing protocol."));
        assert!(prompt.contains("[Yes]"));
        assert!(prompt.contains("[No]"));
    }

    #[test]
    fn test_refinement_prompt_embeds_request() {
        let prompt = build_refinement_prompt("weather in London right now");
        assert!(prompt.contains("weather in London right now"));
        assert!(prompt.contains("only the optimized query"));
    }

    #[test]
    fn test_summarization_prompt_embeds_query_and_results() {
        let prompt = build_summarization_prompt("Source 1: ...", "population of Tokyo");
        assert!(prompt.contains("'population of Tokyo'"));
        assert!(prompt.contains("Source 1: ..."));
    }

    #[test]
    fn test_synthesis_prompt_demands_grounding() {
        let prompt = build_synthesis_prompt("Tokyo has 37M people.", "Tokyo population?");
        assert!(prompt.contains("Tokyo has 37M people."));
        assert!(prompt.contains("Use nothing beyond"));
    }
}
