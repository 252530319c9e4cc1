//! Tradeoff CLI: runs the Comparison Tool API or a one-shot comparison.
//!
//! `tradeoff serve` (the default) starts the HTTP server; `tradeoff compare`
//! analyzes a request file and prints the report.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Tradeoff: compare options without declaring a winner
#[derive(Parser, Debug)]
#[command(name = "tradeoff", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subcommand (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Use the offline mock analyzer instead of the LLM
        #[arg(long)]
        mock: bool,
    },
    /// Compare options from a JSON request file and print the report
    Compare {
        /// Path to a request body, e.g. {"question": ..., "options": [...], "criteria": [...]}
        file: PathBuf,
        /// Use the offline mock analyzer instead of the LLM
        #[arg(long)]
        mock: bool,
    },
    /// Print the effective configuration (secrets omitted)
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            host: None,
            port: None,
            mock: false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "tradeoff", "tradeoff")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tradeoff.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let command = cli.command.unwrap_or_default();
    commands::handle_command(command, cli.config.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["tradeoff"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Commands::default());
    }

    #[test]
    fn test_serve_flags() {
        let cli =
            Cli::try_parse_from(["tradeoff", "serve", "--host", "127.0.0.1", "-p", "9000", "--mock"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: Some("127.0.0.1".into()),
                port: Some(9000),
                mock: true,
            })
        );
    }

    #[test]
    fn test_compare_with_global_flags() {
        let cli = Cli::try_parse_from(["tradeoff", "compare", "req.json", "-vv", "-c", "my.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert_eq!(
            cli.command,
            Some(Commands::Compare {
                file: PathBuf::from("req.json"),
                mock: false,
            })
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["tradeoff", "serve", "--port", "99999"]).is_err());
    }
}
