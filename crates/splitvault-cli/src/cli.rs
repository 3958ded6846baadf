use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface definition: run either service, or talk to a running coordinator.
#[derive(Parser, Debug)]
#[command(
    name = "splitvault",
    about = "Split-trust encrypted storage: coordinator, storage service, and client",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Config file to read instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Coordinator base URL for `store`/`retrieve` (defaults to localhost on the configured port).
    #[arg(long, global = true)]
    pub coordinator_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the encryption coordinator.
    Coordinator,
    /// Serve the storage service.
    Storage,
    /// Store a payload through a running coordinator and print its key.
    Store {
        #[arg(long)]
        id: String,
        #[arg(required = true)]
        payload: Vec<String>,
    },
    /// Fetch and decrypt a payload through a running coordinator.
    Retrieve {
        #[arg(long)]
        id: String,
        /// Base64 key printed by `store`.
        #[arg(long)]
        key: String,
    },
    /// Manage configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version and exit.
    Version,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_subcommands() {
        let cli = Cli::try_parse_from(["splitvault", "coordinator"]).expect("parse");
        assert_eq!(cli.command, Command::Coordinator);

        let cli = Cli::try_parse_from(["splitvault", "storage", "--config", "/etc/sv.toml"])
            .expect("parse");
        assert_eq!(cli.command, Command::Storage);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/sv.toml")));
    }

    #[test]
    fn parses_store_with_multi_word_payload() {
        let cli = Cli::try_parse_from(["splitvault", "store", "--id", "user1", "hello", "world"])
            .expect("parse");
        assert_eq!(
            cli.command,
            Command::Store {
                id: "user1".into(),
                payload: vec!["hello".into(), "world".into()],
            }
        );
    }

    #[test]
    fn store_requires_payload() {
        assert!(Cli::try_parse_from(["splitvault", "store", "--id", "user1"]).is_err());
    }

    #[test]
    fn parses_retrieve_with_coordinator_url() {
        let cli = Cli::try_parse_from([
            "splitvault",
            "retrieve",
            "--id",
            "user1",
            "--key",
            "abc=",
            "--coordinator-url",
            "http://10.0.0.2:8080",
        ])
        .expect("parse");
        assert_eq!(
            cli.command,
            Command::Retrieve {
                id: "user1".into(),
                key: "abc=".into(),
            }
        );
        assert_eq!(cli.coordinator_url.as_deref(), Some("http://10.0.0.2:8080"));
    }

    #[test]
    fn parses_config_init_subcommand() {
        let cli = Cli::try_parse_from(["splitvault", "config", "init"]).expect("parse");
        assert_eq!(cli.command, Command::Config(ConfigCommand::Init));
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["splitvault"]).is_err());
    }
}
