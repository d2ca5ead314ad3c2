use anyhow::Result;
use clap::Parser;
use log::info;
use strider::{
    policy::PolicyKind,
    rollout::{run, RolloutConfig},
};

/// Roll out a fixed policy in the standard locomotion environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file (YAML); defaults are used if not given
    #[arg(short, long)]
    config: Option<String>,

    /// Number of episodes
    #[arg(short, long)]
    n_episodes: Option<usize>,

    /// Policy
    #[arg(short, long, value_enum)]
    policy: Option<PolicyKind>,

    /// Seed of the random policy
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory under which the run directory is created
    #[arg(short, long)]
    log_dir: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RolloutConfig::load(path)?,
        None => RolloutConfig::default(),
    };
    if let Some(v) = args.n_episodes {
        config = config.n_episodes(v);
    }
    if let Some(v) = args.policy {
        config = config.policy(v);
    }
    if let Some(v) = args.seed {
        config = config.seed(v);
    }
    if let Some(v) = args.log_dir {
        config = config.log_dir(v);
    }

    let summary = run(&config)?;
    let mean = summary.returns.iter().sum::<f32>() / summary.returns.len().max(1) as f32;
    info!("Returns: {:?}, mean = {}", summary.returns, mean);
    info!("Saved at {}", summary.run_dir.display());

    Ok(())
}
