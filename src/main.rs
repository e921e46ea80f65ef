use clap::Parser;
use firstapp::cli::{run, Cli};
use firstapp::logging::{init_logging_with_config, LogConfig};
use firstapp::runtime_config::RuntimeConfig;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let started_at = Instant::now();
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;

    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let cli = Cli::parse();
    run(&cli, runtime, started_at)
}
