use anyhow::Result;
use clap::Parser;
use feature_discovery::cli::{Command, RootArgs};
use feature_discovery::workflow::{run_config, run_discover};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Discover(args) => run_discover(args),
        Command::Config(args) => run_config(args),
    }
}
