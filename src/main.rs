use anyhow::Result;
use clap::Parser;
use log::info;
use salmon_mcts::config::{self, EngineConfig};
use salmon_mcts::logging::{setup_logging, DEFAULT_LOG_SPEC};
use salmon_mcts::UciHandler;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "salmon-mcts", version, about)]
struct Cli {
    /// Policy oracle: random or capture
    #[arg(long, default_value = config::DEFAULT_POLICY)]
    policy: String,

    /// Weight file for the policy oracle
    #[arg(long)]
    policy_file: Option<PathBuf>,

    /// Value oracle: zero, material or rollout
    #[arg(long, default_value = config::DEFAULT_VALUE)]
    value: String,

    /// Weight file for the value oracle
    #[arg(long)]
    value_file: Option<PathBuf>,

    /// Exploration weight in the UCB formula
    #[arg(short = 'c', long, default_value_t = config::DEFAULT_CONFIDENCE)]
    confidence: f32,

    /// Seed for reproducible searches
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum plies per random playout
    #[arg(long, default_value_t = config::DEFAULT_ROLLOUT_DEPTH)]
    rollout_depth: u32,

    /// Log filter, e.g. "info" or "salmon_mcts=debug". RUST_LOG takes precedence.
    #[arg(long, default_value = DEFAULT_LOG_SPEC)]
    log_level: String,
}

impl From<Cli> for EngineConfig {
    fn from(cli: Cli) -> Self {
        EngineConfig {
            policy_name: cli.policy,
            policy_file: cli.policy_file,
            value_name: cli.value,
            value_file: cli.value_file,
            confidence: cli.confidence,
            rollout_depth: cli.rollout_depth,
            seed: cli.seed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level)?;

    let config = EngineConfig::from(cli);
    info!("starting with {:?}", config);

    let mut uci = UciHandler::new(config)?;
    uci.run()
}
