//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tropescope - Classify text for identity-based rhetorical tropes.
#[derive(Debug, Parser)]
#[command(name = "tropescope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "TROPESCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a single text
    Classify {
        /// Text to classify
        text: String,
    },

    /// Classify every line of a file ("-" reads stdin)
    Batch {
        /// Input file, one text per line
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_command() {
        let cli = Cli::parse_from(["tropescope", "classify", "They control the banks."]);
        match cli.command {
            Command::Classify { text } => assert_eq!(text, "They control the banks."),
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["tropescope", "batch", "inputs.txt", "--config", "tropescope.toml", "--pretty"]);
        assert_eq!(cli.config, Some(PathBuf::from("tropescope.toml")));
        assert!(cli.pretty);
        assert!(matches!(cli.command, Command::Batch { .. }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["tropescope"]).is_err());
    }
}
