//! Output formatter trait

use consensus_application::ConsensusReport;
use consensus_domain::OutputFormat;

/// Trait for formatting consensus reports
pub trait OutputFormatter {
    /// Format the complete report
    fn format(&self, report: &ConsensusReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &ConsensusReport) -> String;

    /// Format the consensus answer only (concise output)
    fn format_answer_only(&self, report: &ConsensusReport) -> String;

    /// Format in the requested output mode
    fn render(&self, report: &ConsensusReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(report),
            OutputFormat::Answer => self.format_answer_only(report),
            OutputFormat::Json => self.format_json(report),
        }
    }
}
