//! Progress notification port
//!
//! Defines the interface for reporting progress while agents are queried.

use consensus_domain::QueryStage;

/// Callback for progress updates during a consensus request
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a query round starts
    fn on_round_start(&self, stage: QueryStage, total_agents: usize);

    /// Called when one agent's query in the round has finished
    fn on_agent_complete(&self, stage: QueryStage, agent_id: &str, success: bool);

    /// Called when every agent in the round has answered
    fn on_round_complete(&self, stage: QueryStage);

    /// Called when a debate stops after the first round
    fn on_early_stop(&self, _answer: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _stage: QueryStage, _total_agents: usize) {}
    fn on_agent_complete(&self, _stage: QueryStage, _agent_id: &str, _success: bool) {}
    fn on_round_complete(&self, _stage: QueryStage) {}
}
