mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use muisti::{Config, MemoryStore};
use output::{ErrorResponse, print_json};

/// muisti - category-scoped semantic memory for AI agents
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Emit JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "muisti=debug" } else { "muisti=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                });
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, muisti::Error> {
    let config = Config::load()?;
    config.ensure_directories()?;

    let store = MemoryStore::open_sqlite(&config.database_path, config.embedding_dims)?;
    commands::execute(&cli.command, &store, &config, cli.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::parse_from(["muisti", "add", "notes", "some text", "-m", "k=v"]);
        assert!(!cli.json);
        match cli.command {
            commands::Commands::Add { category, text, meta, id } => {
                assert_eq!(category, "notes");
                assert_eq!(text, "some text");
                assert_eq!(meta, vec!["k=v".to_string()]);
                assert!(id.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["muisti", "count", "notes", "--json", "--verbose"]);
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parses_search_options() {
        let cli = Cli::parse_from([
            "muisti",
            "search",
            "notes",
            "query text",
            "-l",
            "3",
            "--max-distance",
            "0.2",
            "--unique",
        ]);
        match cli.command {
            commands::Commands::Search {
                limit,
                max_distance,
                unique,
                ..
            } => {
                assert_eq!(limit, Some(3));
                assert_eq!(max_distance, Some(0.2));
                assert!(unique);
            }
            _ => panic!("expected search command"),
        }
    }
}
