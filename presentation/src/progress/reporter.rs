//! Progress reporting while the agent panel is queried

use colored::Colorize;
use consensus_application::ports::progress::ProgressNotifier;
use consensus_domain::QueryStage;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports progress during a consensus request with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    fn stage_display_name(stage: QueryStage) -> &'static str {
        match stage {
            QueryStage::Direct => "Querying agents",
            QueryStage::Round1 => "Debate round 1",
            QueryStage::Round2 => "Debate round 2",
        }
    }

    fn stage_short_name(stage: QueryStage) -> &'static str {
        match stage {
            QueryStage::Direct => "Query",
            QueryStage::Round1 => "Round 1",
            QueryStage::Round2 => "Round 2",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, stage: QueryStage, total_agents: usize) {
        let pb = self.multi.add(ProgressBar::new(total_agents as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(Self::stage_display_name(stage));
        pb.set_message("Starting...");

        *self.round_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_agent_complete(&self, _stage: QueryStage, agent_id: &str, success: bool) {
        if let Some(pb) = self
            .round_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent_id)
            } else {
                format!("{} {}", "x".red(), agent_id)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, stage: QueryStage) {
        if let Some(pb) = self
            .round_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let name = Self::stage_short_name(stage);
            pb.finish_with_message(format!("{} complete!", name.green()));
        }
    }

    fn on_early_stop(&self, answer: &str) {
        let _ = self.multi.println(format!(
            "{} Unanimous after round 1 ({}), skipping round 2",
            "->".cyan(),
            answer.bold()
        ));
    }
}

/// Simple text-based progress (no fancy UI)
///
/// Writes to stderr so that JSON on stdout stays parseable.
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, stage: QueryStage, total_agents: usize) {
        let name = ProgressReporter::stage_display_name(stage);
        eprintln!("{} {} ({} agents)", "->".cyan(), name.bold(), total_agents);
    }

    fn on_agent_complete(&self, _stage: QueryStage, agent_id: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), agent_id);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), agent_id);
        }
    }

    fn on_round_complete(&self, _stage: QueryStage) {
        eprintln!();
    }

    fn on_early_stop(&self, answer: &str) {
        eprintln!(
            "{} Unanimous after round 1 ({}), skipping round 2",
            "->".cyan(),
            answer
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(
            ProgressReporter::stage_display_name(QueryStage::Round2),
            "Debate round 2"
        );
        assert_eq!(ProgressReporter::stage_short_name(QueryStage::Direct), "Query");
    }

    #[test]
    fn test_bar_lifecycle() {
        let reporter = ProgressReporter::new();
        reporter.on_round_start(QueryStage::Round1, 2);
        reporter.on_agent_complete(QueryStage::Round1, "a1", true);
        reporter.on_agent_complete(QueryStage::Round1, "a2", false);
        reporter.on_round_complete(QueryStage::Round1);
        assert!(reporter.round_bar.lock().unwrap().is_none());

        // completion without a started round is ignored
        reporter.on_agent_complete(QueryStage::Round2, "a1", true);
        reporter.on_round_complete(QueryStage::Round2);
    }
}
