//! Command-line interface: `serve` and `analyze`.

pub mod commands;
pub mod display;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{AnalyzeArgs, ServeArgs};

/// Should I buy it? Multi-agent purchase research.
#[derive(Parser, Debug)]
#[command(name = "shouldibuy", version, about)]
pub struct Cli {
    /// Path to a YAML config file (defaults to ./shouldibuy.yaml when present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of styled text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Analyze one product in-process and print the verdict
    Analyze(AnalyzeArgs),
}

impl Commands {
    /// `analyze` owns stdout, so its logs go to stderr.
    pub const fn logs_to_stderr(&self) -> bool {
        matches!(self, Self::Analyze(_))
    }
}

/// Print a command failure and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "shouldibuy",
            "analyze",
            "Sony WH-1000XM5",
            "--owns",
            "Sony WH-1000XM4",
            "--json",
        ]);
        assert!(cli.json);
        assert!(cli.command.logs_to_stderr());
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.product, "Sony WH-1000XM5");
                assert_eq!(args.owns.as_deref(), Some("Sony WH-1000XM4"));
            }
            Commands::Serve(_) => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::parse_from([
            "shouldibuy",
            "--config",
            "prod.yaml",
            "serve",
            "--port",
            "9000",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("prod.yaml")));
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
            }
            Commands::Analyze(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_analyze_requires_product() {
        assert!(Cli::try_parse_from(["shouldibuy", "analyze"]).is_err());
    }
}
