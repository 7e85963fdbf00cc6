//! Voting strategies over a single round of agent responses
//!
//! Every strategy is a pure function of the responses (and, for the weighted
//! variants, a snapshot of learned agent weights). Ties between equal top
//! scores go to the candidate seen first in response order.

use super::agreement::pairwise_agreement;
use super::result::AggregationResult;
use super::strategy::Strategy;
use crate::agent::AgentResponse;
use crate::core::error::DomainError;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Smoothing term in the ISP denominator
pub const ISP_EPSILON: f64 = 1e-6;

/// Weight used for agents missing from the weight snapshot
pub const DEFAULT_AGENT_WEIGHT: f64 = 1.0;

/// Score accumulator that remembers first-seen order
#[derive(Debug, Default)]
struct Tally {
    entries: Vec<(String, f64)>,
}

impl Tally {
    fn add(&mut self, key: &str, amount: f64) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, score)) => *score += amount,
            None => self.entries.push((key.to_string(), amount)),
        }
    }

    fn get(&self, key: &str) -> f64 {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest score; a later candidate must be strictly greater to win
    fn leader(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (key, score) in &self.entries {
            match best {
                Some((_, top)) if *score <= top => {}
                _ => best = Some((key.as_str(), *score)),
            }
        }
        best.map(|(k, _)| k)
    }

    fn to_scores(&self) -> BTreeMap<String, f64> {
        self.entries.iter().cloned().collect()
    }
}

fn normalized_answers(responses: &[AgentResponse]) -> Vec<String> {
    responses.iter().map(AgentResponse::normalized_answer).collect()
}

fn decided(
    strategy: Strategy,
    winner: &str,
    scores: BTreeMap<String, f64>,
    responses: &[AgentResponse],
    normalized: &[String],
) -> AggregationResult {
    let winning_agents = responses
        .iter()
        .zip(normalized)
        .filter(|(_, answer)| answer.as_str() == winner)
        .map(|(r, _)| r.agent_id.clone())
        .collect();

    AggregationResult {
        strategy,
        answer: winner.to_string(),
        scores,
        agreement_rate: pairwise_agreement(normalized),
        winning_agents,
        metadata: Map::new(),
    }
}

/// Plain majority over normalized answers.
///
/// # Example
///
/// ```
/// use consensus_domain::{AgentResponse, majority_vote};
///
/// let responses = vec![
///     AgentResponse::answered("a", "m", "7"),
///     AgentResponse::answered("b", "m", "7."),
///     AgentResponse::answered("c", "m", "8"),
/// ];
/// let result = majority_vote(&responses);
/// assert_eq!(result.answer, "7");
/// assert_eq!(result.winning_agents, vec!["a", "b"]);
/// ```
pub fn majority_vote(responses: &[AgentResponse]) -> AggregationResult {
    let normalized = normalized_answers(responses);

    let mut votes = Tally::default();
    for answer in normalized.iter().filter(|a| !a.is_empty()) {
        votes.add(answer, 1.0);
    }

    let Some(winner) = votes.leader() else {
        return AggregationResult::no_votes(Strategy::Majority, "No valid votes");
    };

    decided(
        Strategy::Majority,
        winner,
        votes.to_scores(),
        responses,
        &normalized,
    )
    .with_metadata("n_agents", json!(responses.len()))
}

/// Confidence-weighted vote: each answer scores `weight(agent) * confidence`.
///
/// Agents missing from `weights` count with [`DEFAULT_AGENT_WEIGHT`].
pub fn weighted_vote(
    responses: &[AgentResponse],
    weights: &BTreeMap<String, f64>,
) -> AggregationResult {
    let normalized = normalized_answers(responses);

    let mut scores = Tally::default();
    for (response, answer) in responses.iter().zip(&normalized) {
        if answer.is_empty() {
            continue;
        }
        let weight = weights
            .get(&response.agent_id)
            .copied()
            .unwrap_or(DEFAULT_AGENT_WEIGHT);
        scores.add(answer, weight * response.clamped_confidence());
    }

    let Some(winner) = scores.leader() else {
        return AggregationResult::no_votes(Strategy::Weighted, "No valid weighted votes");
    };

    decided(
        Strategy::Weighted,
        winner,
        scores.to_scores(),
        responses,
        &normalized,
    )
    .with_metadata("weights", json!(weights))
}

/// Inverse surprising popularity.
///
/// For every candidate seen as an actual answer or as someone's
/// predicted-majority guess, `score = actual_share / (predicted_share + ε)`,
/// with both shares taken over all responses (abstentions included). Answers
/// that received more real support than the group expected are amplified.
pub fn inverse_surprising_popularity(responses: &[AgentResponse]) -> AggregationResult {
    let normalized = normalized_answers(responses);
    let predicted: Vec<String> = responses
        .iter()
        .map(AgentResponse::normalized_predicted_majority)
        .collect();
    let n = responses.len().max(1) as f64;

    let mut actual_counts = Tally::default();
    for answer in normalized.iter().filter(|a| !a.is_empty()) {
        actual_counts.add(answer, 1.0);
    }
    let mut predicted_counts = Tally::default();
    for guess in predicted.iter().filter(|p| !p.is_empty()) {
        predicted_counts.add(guess, 1.0);
    }

    if actual_counts.is_empty() {
        return AggregationResult::no_votes(Strategy::Isp, "No valid votes for ISP");
    }

    let mut isp_scores = Tally::default();
    let candidates: Vec<&str> = actual_counts
        .keys()
        .chain(predicted_counts.keys().filter(|k| !actual_counts.contains(k)))
        .collect();
    for candidate in candidates {
        let actual_share = actual_counts.get(candidate) / n;
        let predicted_share = predicted_counts.get(candidate) / n;
        isp_scores.add(candidate, actual_share / (predicted_share + ISP_EPSILON));
    }

    let Some(winner) = isp_scores.leader() else {
        return AggregationResult::no_votes(Strategy::Isp, "No valid votes for ISP");
    };

    let shares = |tally: &Tally| -> Map<String, Value> {
        tally
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), json!(v / n)))
            .collect()
    };

    let self_consistent = normalized
        .iter()
        .zip(&predicted)
        .filter(|(answer, guess)| answer == guess)
        .count();

    decided(
        Strategy::Isp,
        winner,
        isp_scores.to_scores(),
        responses,
        &normalized,
    )
    .with_metadata("actual_share", Value::Object(shares(&actual_counts)))
    .with_metadata("predicted_share", Value::Object(shares(&predicted_counts)))
    .with_metadata("second_order_agreement", json!(self_consistent as f64 / n))
}

/// Weighted vote relabelled as the topic strategy.
///
/// No topic-specific weighting is applied beyond [`weighted_vote`]; the
/// result records `topic_weighting = "none"` so consumers can tell.
pub fn topic_weighted_vote(
    responses: &[AgentResponse],
    weights: &BTreeMap<String, f64>,
    topic: &str,
) -> AggregationResult {
    let mut result = weighted_vote(responses, weights);
    result.strategy = Strategy::Topic;
    result
        .with_metadata("topic", json!(topic))
        .with_metadata("topic_weighting", json!("none"))
}

/// Dispatch a single-round strategy.
///
/// `Debate` is multi-round and cannot be applied to one response list.
pub fn aggregate(
    strategy: Strategy,
    responses: &[AgentResponse],
    weights: &BTreeMap<String, f64>,
    topic: Option<&str>,
) -> Result<AggregationResult, DomainError> {
    match strategy {
        Strategy::Majority => Ok(majority_vote(responses)),
        Strategy::Weighted => Ok(weighted_vote(responses, weights)),
        Strategy::Isp => Ok(inverse_surprising_popularity(responses)),
        Strategy::Topic => Ok(topic_weighted_vote(
            responses,
            weights,
            topic.unwrap_or(crate::routing::GENERAL_TOPIC),
        )),
        Strategy::Debate => Err(DomainError::UnsupportedAggregation(
            strategy.as_str().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn resp(agent: &str, answer: &str) -> AgentResponse {
        AgentResponse::answered(agent, "test-model", answer)
    }

    fn resp_pred(agent: &str, answer: &str, predicted: &str) -> AgentResponse {
        resp(agent, answer).with_predicted_majority(predicted)
    }

    // ==================== Majority ====================

    #[test]
    fn majority_picks_most_frequent() {
        let responses = vec![resp("a", "7"), resp("b", "7"), resp("c", "8")];
        let result = majority_vote(&responses);

        assert_eq!(result.strategy, Strategy::Majority);
        assert_eq!(result.answer, "7");
        assert!(approx(result.agreement_rate, 1.0 / 3.0));
        assert_eq!(result.winning_agents, vec!["a", "b"]);
        assert_eq!(result.score("7"), Some(2.0));
        assert_eq!(result.score("8"), Some(1.0));
        assert_eq!(result.metadata["n_agents"], 3);
    }

    #[test]
    fn majority_without_votes_is_empty_result() {
        let responses = vec![
            AgentResponse::failure("a", "m", "timeout"),
            resp("b", "  "),
        ];
        let result = majority_vote(&responses);
        assert!(!result.has_answer());
        assert_eq!(result.error(), Some("No valid votes"));
        assert!(result.winning_agents.is_empty());
    }

    #[test]
    fn majority_empty_input() {
        let result = majority_vote(&[]);
        assert!(!result.has_answer());
    }

    #[test]
    fn majority_tie_goes_to_first_seen() {
        let responses = vec![resp("a", "y"), resp("b", "x"), resp("c", "x"), resp("d", "y")];
        assert_eq!(majority_vote(&responses).answer, "y");

        let responses = vec![resp("a", "x"), resp("b", "y")];
        assert_eq!(majority_vote(&responses).answer, "x");
    }

    #[test]
    fn majority_groups_normalized_forms() {
        let responses = vec![resp("a", "B. Paris"), resp("b", "b"), resp("c", "Paris")];
        let result = majority_vote(&responses);
        assert_eq!(result.answer, "b");
        assert_eq!(result.winning_agents, vec!["a", "b"]);
    }

    #[test]
    fn abstaining_agent_is_not_a_winner() {
        let responses = vec![resp("a", "x"), AgentResponse::failure("b", "m", "down")];
        let result = majority_vote(&responses);
        assert_eq!(result.answer, "x");
        assert_eq!(result.winning_agents, vec!["a"]);
        assert_eq!(result.agreement_rate, 1.0);
    }

    // ==================== Weighted ====================

    fn weights(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn weighted_heavy_agent_beats_majority() {
        let w = weights(&[("A", 3.0), ("B", 1.0), ("C", 1.0)]);
        let responses = vec![
            resp("A", "x").with_confidence(0.9),
            resp("B", "y").with_confidence(0.9),
            resp("C", "y").with_confidence(0.9),
        ];

        let result = weighted_vote(&responses, &w);
        assert_eq!(result.answer, "x");
        assert!(approx(result.score("x").unwrap(), 2.7));
        assert!(approx(result.score("y").unwrap(), 1.8));
        assert_eq!(result.winning_agents, vec!["A"]);

        assert_eq!(majority_vote(&responses).answer, "y");
    }

    #[test]
    fn weighted_unknown_agent_defaults_to_one() {
        let responses = vec![resp("ghost", "x").with_confidence(0.4)];
        let result = weighted_vote(&responses, &BTreeMap::new());
        assert!(approx(result.score("x").unwrap(), 0.4));
    }

    #[test]
    fn weighted_clamps_out_of_range_confidence() {
        let mut response = resp("a", "x");
        response.confidence = 7.0;
        let result = weighted_vote(&[response], &weights(&[("a", 2.0)]));
        assert!(approx(result.score("x").unwrap(), 2.0));
    }

    #[test]
    fn weighted_without_votes() {
        let result = weighted_vote(&[resp("a", "")], &BTreeMap::new());
        assert_eq!(result.error(), Some("No valid weighted votes"));
        assert_eq!(result.strategy, Strategy::Weighted);
    }

    #[test]
    fn weighted_records_weight_snapshot() {
        let w = weights(&[("a", 1.5)]);
        let result = weighted_vote(&[resp("a", "x")], &w);
        assert_eq!(result.metadata["weights"]["a"], 1.5);
    }

    #[test]
    fn weighted_zero_confidence_still_counts_as_candidate() {
        let responses = vec![resp("a", "x").with_confidence(0.0)];
        let result = weighted_vote(&responses, &BTreeMap::new());
        assert_eq!(result.answer, "x");
        assert_eq!(result.score("x"), Some(0.0));
    }

    // ==================== ISP ====================

    #[test]
    fn isp_scores_match_shares() {
        let responses = vec![
            resp_pred("a", "x", "y"),
            resp_pred("b", "x", "y"),
            resp_pred("c", "x", "x"),
            resp_pred("d", "y", "y"),
        ];
        let result = inverse_surprising_popularity(&responses);

        assert_eq!(result.answer, "x");
        assert!(approx(result.score("x").unwrap(), 0.75 / (0.25 + ISP_EPSILON)));
        assert!(approx(result.score("y").unwrap(), 0.25 / (0.75 + ISP_EPSILON)));
        assert_eq!(result.metadata["actual_share"]["x"], 0.75);
        assert_eq!(result.metadata["predicted_share"]["y"], 0.75);
        assert_eq!(result.metadata["second_order_agreement"], 0.5);
    }

    #[test]
    fn isp_second_order_agreement_counts_self_consistent_agents() {
        // a and the abstaining c guess their own answer; b expects x to win
        let responses = vec![
            resp("a", "x"),
            resp_pred("b", "y", "x"),
            AgentResponse::failure("c", "m", "down"),
        ];
        let result = inverse_surprising_popularity(&responses);
        let agreement = result.metadata["second_order_agreement"].as_f64().unwrap();
        assert!((agreement - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn isp_can_overturn_majority() {
        // y is the plain majority, but everybody expected y to win,
        // while x got real support nobody predicted.
        let responses = vec![
            resp_pred("a", "x", "y"),
            resp_pred("b", "x", "y"),
            resp_pred("c", "y", "y"),
            resp_pred("d", "y", "y"),
            resp_pred("e", "y", "y"),
        ];
        assert_eq!(majority_vote(&responses).answer, "y");

        let result = inverse_surprising_popularity(&responses);
        assert_eq!(result.answer, "x");
        assert_eq!(result.winning_agents, vec!["a", "b"]);
        assert!(result.score("x").unwrap() > result.score("y").unwrap());
    }

    #[test]
    fn isp_predicted_only_candidates_score_zero() {
        let responses = vec![resp_pred("a", "x", "z"), resp_pred("b", "x", "z")];
        let result = inverse_surprising_popularity(&responses);
        assert_eq!(result.answer, "x");
        assert_eq!(result.score("z"), Some(0.0));
    }

    #[test]
    fn isp_predicted_majority_defaults_to_own_answer() {
        let responses = vec![resp("a", "x"), resp("b", "y")];
        let result = inverse_surprising_popularity(&responses);
        assert_eq!(result.metadata["second_order_agreement"], 1.0);
        // equal scores -> first seen wins
        assert_eq!(result.answer, "x");
    }

    #[test]
    fn isp_without_actual_votes_ignores_predictions() {
        let responses = vec![
            resp_pred("a", "", "x"),
            AgentResponse::failure("b", "m", "down").with_predicted_majority("x"),
        ];
        let result = inverse_surprising_popularity(&responses);
        assert!(!result.has_answer());
        assert_eq!(result.error(), Some("No valid votes for ISP"));
    }

    #[test]
    fn isp_counts_abstentions_in_denominator() {
        let responses = vec![resp("a", "x"), AgentResponse::failure("b", "m", "down")];
        let result = inverse_surprising_popularity(&responses);
        assert_eq!(result.metadata["actual_share"]["x"], 0.5);
        assert_eq!(result.metadata["second_order_agreement"], 1.0);
    }

    // ==================== Topic / dispatch ====================

    #[test]
    fn topic_vote_relabels_weighted() {
        let w = weights(&[("a", 2.0)]);
        let responses = vec![resp("a", "x"), resp("b", "y")];
        let weighted = weighted_vote(&responses, &w);
        let topic = topic_weighted_vote(&responses, &w, "math");

        assert_eq!(topic.strategy, Strategy::Topic);
        assert_eq!(topic.answer, weighted.answer);
        assert_eq!(topic.scores, weighted.scores);
        assert_eq!(topic.metadata["topic"], "math");
        assert_eq!(topic.metadata["topic_weighting"], "none");
    }

    #[test]
    fn aggregate_dispatches() {
        let responses = vec![resp("a", "x")];
        let w = BTreeMap::new();
        for strategy in Strategy::DIRECT {
            let result = aggregate(strategy, &responses, &w, None).unwrap();
            assert_eq!(result.strategy, strategy);
            assert_eq!(result.answer, "x");
        }
        let topic = aggregate(Strategy::Topic, &responses, &w, None).unwrap();
        assert_eq!(topic.metadata["topic"], "general");
    }

    #[test]
    fn aggregate_rejects_debate() {
        let err = aggregate(Strategy::Debate, &[], &BTreeMap::new(), None).unwrap_err();
        assert!(err.is_usage_error());
    }
}
