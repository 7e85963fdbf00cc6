//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use consensus_domain::Strategy;
use std::path::PathBuf;

/// Output format for consensus results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aggregate, every agent's response, weights and debate rounds
    Full,
    /// Only the consensus answer
    Answer,
    /// JSON output
    Json,
}

impl From<OutputFormat> for consensus_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Answer => Self::Answer,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for agent-consensus
#[derive(Parser, Debug)]
#[command(name = "agent-consensus")]
#[command(author, version, about = "Multi-agent consensus - combine answers from several models")]
#[command(long_about = r#"
agent-consensus asks a panel of independent model agents the same question
and combines their answers into one consensus answer.

Strategies:
  majority   Most frequent normalized answer
  weighted   Learned agent weight x self-reported confidence
  isp        Inverse surprising popularity (actual vs. predicted share)
  topic      Weighted vote over the agents tagged for the question's topic
  debate     Two rounds; agents see their peers' answers before revising

Configuration files are loaded from (in priority order):
1. CONSENSUS_* environment variables
2. --config <path>        Explicit config file
3. ./consensus.toml       Project-level config
4. ~/.config/agent-consensus/config.toml   Global config

Example:
  agent-consensus ask "What is 2+2?"
  agent-consensus ask -s debate --mock "What is the capital of France?"
  agent-consensus feedback paris -a llama=paris -a qwen=lyon
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the agent panel a question
    Ask(AskArgs),

    /// Learn from the correct answer to an earlier question
    Feedback(FeedbackArgs),

    /// List the configured agents
    Agents,

    /// Show the learned agent weights
    Weights,

    /// Probe every enabled agent's backend
    Health,

    /// Show configuration sources and validate the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    /// Aggregation strategy (default from config)
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<Strategy>,

    /// Sampling temperature; omit for deterministic (0.0) sampling
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Sampling seed (debate round 2 uses seed + 7)
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Maximum tokens each agent may generate
    #[arg(long, default_value_t = 64)]
    pub max_tokens: u32,

    /// Query at most this many agents
    #[arg(long, value_name = "N")]
    pub max_agents: Option<usize>,

    /// Known correct answer; updates agent weights after aggregation
    #[arg(long, value_name = "ANSWER")]
    pub ground_truth: Option<String>,

    /// Use deterministic offline agents instead of the model servers
    #[arg(long)]
    pub mock: bool,

    /// Compute every single-round strategy and include them in the report
    #[arg(long)]
    pub compute_all: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// The correct answer
    pub ground_truth: String,

    /// An agent's answer as AGENT=ANSWER (repeatable)
    #[arg(short, long = "answer", value_name = "AGENT=ANSWER", value_parser = parse_agent_answer, required = true)]
    pub answers: Vec<(String, String)>,
}

fn parse_agent_answer(value: &str) -> Result<(String, String), String> {
    let (agent, answer) = value
        .split_once('=')
        .ok_or_else(|| format!("expected AGENT=ANSWER, got '{}'", value))?;
    let agent = agent.trim();
    if agent.is_empty() {
        return Err(format!("missing agent id in '{}'", value));
    }
    Ok((agent.to_string(), answer.trim().to_string()))
}
