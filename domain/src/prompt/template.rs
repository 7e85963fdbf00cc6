//! Prompt templates for agent queries

use crate::agent::AgentResponse;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instruction wrapped around every prompt sent to a model backend
    pub fn ensemble_wrapper(prompt: &str) -> String {
        format!(
            "You are one model in a distributed local ensemble. \
Return only the final answer, very short, with no explanation.\n\nQuestion:\n{}",
            prompt
        )
    }

    /// First debate round: independent answer
    pub fn debate_round1(question: &str) -> String {
        format!(
            "You are in a multi-agent panel. Provide only your best final answer in one short line.\n\n\
Question:\n{}",
            question
        )
    }

    /// One line per round-1 response, shown to every agent in round 2
    ///
    /// Confidence always keeps a decimal point (`1.0`, not `1`).
    pub fn peer_summary(responses: &[AgentResponse]) -> String {
        responses
            .iter()
            .map(|r| {
                format!(
                    "- {} ({}): answer={} conf={:?}",
                    r.agent_id, r.model_id, r.answer, r.confidence
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Second debate round: revise after seeing peers
    pub fn debate_round2(question: &str, previous_answer: &str, peer_summary: &str) -> String {
        format!(
            r#"Round 2 debate. Compare with peers and revise if needed.
Original question:
{}

Your previous answer: {}
Peer responses:
{}

Return only your revised final answer in one short line."#,
            question, previous_answer, peer_summary
        )
    }
}
