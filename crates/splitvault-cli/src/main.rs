mod cli;
mod client;
mod config;
mod serve;

use crate::cli::{Command, ConfigCommand};
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point: run one of the two services, or act as a client of a running coordinator.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    init_tracing(config.debug);

    match cli.command {
        Command::Coordinator => serve::run_coordinator(&config).await?,
        Command::Storage => serve::run_storage(&config).await?,
        Command::Store { id, payload } => {
            let url = resolve_coordinator_url(cli.coordinator_url, &config);
            client::store(&url, &id, &payload).await?
        }
        Command::Retrieve { id, key } => {
            let url = resolve_coordinator_url(cli.coordinator_url, &config);
            client::retrieve(&url, &id, &key).await?
        }
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        Command::Version => print_version(),
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    // RUST_LOG wins; the debug flag only moves the fallback level.
    let fallback = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("splitvault {}", env!("CARGO_PKG_VERSION"));
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

fn resolve_coordinator_url(flag: Option<String>, config: &config::Config) -> String {
    flag.unwrap_or_else(|| format!("http://localhost:{}", config.coordinator.listen_port))
}
