//! CLI subcommand definitions.
//!
//! Uses clap derive to define the subcommand hierarchy:
//! - `start` (default) -- run the bot
//! - `config show|path` -- inspect configuration
//! - `version` -- print build/version info

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Moderation-poll bot for group chats.
#[derive(Parser, Debug)]
#[command(
    name = "votewarden",
    version = env!("CARGO_PKG_VERSION"),
    about = "votewarden — group moderation polls: members vote to mute or ban"
)]
pub struct Cli {
    /// Path to the configuration file (default: user config dir).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot (default when no subcommand is given).
    Start,

    /// Read configuration.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print build/version info.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (token masked).
    Show,

    /// Print the configuration file path in use.
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_start() {
        let cli = Cli::try_parse_from(["votewarden"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["votewarden", "start", "--config", "/tmp/w.json5"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/w.json5")));
        assert!(matches!(cli.command, Some(Command::Start)));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["votewarden", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Config(ConfigCommand::Path))));

        let cli = Cli::try_parse_from(["votewarden", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Config(ConfigCommand::Show))));
    }
}
