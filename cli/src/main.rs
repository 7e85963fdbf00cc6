//! CLI entrypoint for agent-consensus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consensus_application::{
    AgentQuery, AgentRegistry, AggregationManager, InMemoryWeightRepository, QueryLogger,
    RecordFeedbackInput, RecordFeedbackUseCase, RunConsensusInput, RunConsensusUseCase,
    WeightRepository, WeightStore,
};
use consensus_domain::OutputFormat;
use consensus_infrastructure::{
    ConfigLoader, FileConfig, JsonWeightRepository, JsonlQueryLogger, MockAgentQuery,
};
use consensus_presentation::{
    AskArgs, Cli, Command, ConsoleFormatter, FeedbackArgs, OutputFormatter, ProgressReporter,
    SimpleProgress,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Everything a subcommand needs, built once from the loaded configuration
struct App {
    config: FileConfig,
    registry: Arc<AgentRegistry>,
    query: Arc<dyn AgentQuery>,
    mock_query: Arc<dyn AgentQuery>,
    logger: Option<Arc<dyn QueryLogger>>,
}

impl App {
    fn build(config: FileConfig) -> Result<Self> {
        let consensus_config = config.consensus_config();

        let repository: Arc<dyn WeightRepository> = if config.global.weights_path.trim().is_empty()
        {
            warn!("weights_path is empty; learned weights will not be persisted");
            Arc::new(InMemoryWeightRepository::new())
        } else {
            Arc::new(JsonWeightRepository::new(&config.global.weights_path))
        };
        let store = Arc::new(WeightStore::open(repository));
        let manager = Arc::new(AggregationManager::new(
            store,
            consensus_config.learning_rule,
        ));
        let registry = Arc::new(
            AgentRegistry::new(config.agent_descriptors(), manager)
                .context("Failed to initialize agent weights")?,
        );

        let mock_query: Arc<dyn AgentQuery> = Arc::new(MockAgentQuery::new());
        let query = Self::backend(&config, &mock_query)?;

        let logger = if config.global.query_log_path.trim().is_empty() {
            None
        } else {
            JsonlQueryLogger::open(&config.global.query_log_path)
                .map(|logger| Arc::new(logger) as Arc<dyn QueryLogger>)
        };

        Ok(Self {
            config,
            registry,
            query,
            mock_query,
            logger,
        })
    }

    #[cfg(feature = "http")]
    fn backend(config: &FileConfig, _mock: &Arc<dyn AgentQuery>) -> Result<Arc<dyn AgentQuery>> {
        let timeout = std::time::Duration::from_secs(config.global.request_timeout_s);
        let client = consensus_infrastructure::HttpAgentQuery::new(timeout)
            .context("Failed to create HTTP client")?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "http"))]
    fn backend(_config: &FileConfig, mock: &Arc<dyn AgentQuery>) -> Result<Arc<dyn AgentQuery>> {
        warn!("Built without the http feature; every query uses mock agents");
        Ok(Arc::clone(mock))
    }

    async fn ask(&self, args: AskArgs, quiet: bool) -> Result<()> {
        let (default_strategy, _) = self.config.global.parse_default_strategy();
        let strategy = args.strategy.unwrap_or(default_strategy);

        let mut input = RunConsensusInput::new(args.question)
            .with_strategy(strategy)
            .with_seed(args.seed)
            .with_max_tokens(args.max_tokens)
            .with_max_agents(args.max_agents)
            .with_mock(args.mock)
            .with_compute_all(args.compute_all);
        if let Some(temperature) = args.temperature {
            input = input.with_temperature(temperature);
        }
        if let Some(truth) = args.ground_truth {
            input = input.with_ground_truth(truth);
        }

        let mut use_case = RunConsensusUseCase::new(Arc::clone(&self.query), Arc::clone(&self.registry))
            .with_mock_query(Arc::clone(&self.mock_query))
            .with_config(self.config.consensus_config());
        if let Some(logger) = &self.logger {
            use_case = use_case.with_logger(Arc::clone(logger));
        }

        info!("Asking {} agents with strategy {}", self.registry.enabled_agents().len(), strategy);

        let report = if quiet || !self.config.output.show_progress {
            use_case.execute(input).await?
        } else if self.config.output.color {
            let progress = ProgressReporter::new();
            use_case.execute_with_progress(input, &progress).await?
        } else {
            use_case.execute_with_progress(input, &SimpleProgress).await?
        };

        let format: OutputFormat = args
            .output
            .map(Into::into)
            .or(self.config.output.format)
            .unwrap_or_default();
        println!("{}", ConsoleFormatter.render(&report, format).trim_end());

        Ok(())
    }

    fn feedback(&self, args: FeedbackArgs) -> Result<()> {
        let input = args.answers.into_iter().fold(
            RecordFeedbackInput::new(args.ground_truth),
            |input, (agent, answer)| input.with_answer(agent, answer),
        );

        let mut use_case = RecordFeedbackUseCase::new(Arc::clone(self.registry.manager()));
        if let Some(logger) = &self.logger {
            use_case = use_case.with_logger(Arc::clone(logger));
        }

        let weights = use_case
            .execute(input)
            .context("Failed to persist updated weights")?;
        println!("Updated weights:");
        print!("{}", ConsoleFormatter::format_weights(&weights));
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let report = self.registry.check_health(self.query.as_ref()).await;
        print!("{}", ConsoleFormatter::format_health(&report));
        if !report.is_ok() {
            let unhealthy = report.agents.iter().filter(|a| !a.healthy).count();
            bail!(
                "{} of {} agents are unreachable",
                unhealthy,
                report.agent_count
            );
        }
        Ok(())
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    Ok(ConfigLoader::load(cli.config.as_deref())?)
}

fn show_config(cli: &Cli, config: &FileConfig) {
    print!(
        "{}",
        ConsoleFormatter::format_config_sources(&ConfigLoader::config_sources(
            cli.config.as_deref()
        ))
    );

    let global = &config.global;
    println!();
    println!("default_strategy     {}", global.default_strategy);
    println!("request_timeout_s    {}", global.request_timeout_s);
    println!("debate_timeout_s     {}", global.effective_debate_timeout_s());
    println!("weight_learning_rate {}", global.weight_learning_rate);
    println!("weight bounds        [{}, {}]", global.min_weight, global.max_weight);
    println!("weights_path         {}", global.weights_path);
    println!("query_log_path       {}", global.query_log_path);

    print!(
        "{}",
        ConsoleFormatter::format_agents(&config.agent_descriptors(), &Default::default())
    );

    let issues = config.validate();
    if issues.is_empty() {
        println!("\nConfiguration is valid");
    } else {
        println!();
        print!("{}", ConsoleFormatter::format_issues(&issues));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Starting agent-consensus");

    let config = load_config(&cli)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    if matches!(cli.command, Command::Config) {
        show_config(&cli, &config);
        return Ok(());
    }

    let warnings = ConfigLoader::check(&config)?;
    if !warnings.is_empty() {
        eprint!("{}", ConsoleFormatter::format_issues(&warnings));
    }

    // === Dependency Injection ===
    let app = App::build(config)?;

    match cli.command {
        Command::Ask(args) => app.ask(args, cli.quiet).await?,
        Command::Feedback(args) => app.feedback(args)?,
        Command::Agents => {
            print!(
                "{}",
                ConsoleFormatter::format_agents(&app.registry.agents(), &app.registry.weights())
            );
        }
        Command::Weights => {
            println!("Agent weights:");
            print!("{}", ConsoleFormatter::format_weights(&app.registry.weights()));
        }
        Command::Health => app.health().await?,
        Command::Config => {}
    }

    Ok(())
}
