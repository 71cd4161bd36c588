use crate::config::OutputStyle;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Search log records with simple terms or nested boolean filters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file holding the log records (overrides `data_path` in the config)
    #[arg(short, long, global = true, env = "LOG_SEARCH_DATA")]
    pub data: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (defaults to the config value, then text)
    #[arg(short = 'F', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write results to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// When to colorize output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Records whose browser OR country contains the given terms (case-insensitive)
    Search {
        /// Browser term, e.g. "chrome"
        browser: String,
        /// Country term, e.g. "philippines"
        country: String,
    },
    /// Records matching a JSON filter such as '{"NOT": {"IS": {"country": "Italy"}}}'
    AdvancedSearch {
        /// Filter expression; an empty or missing query returns no records
        query: Option<String>,
    },
    /// List the searchable fields and operators
    Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputStyle> for OutputFormat {
    fn from(style: OutputStyle) -> Self {
        match style {
            OutputStyle::Text => OutputFormat::Text,
            OutputStyle::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl Cli {
    /// Format from the command line, else from the config
    pub fn effective_format(&self, configured: OutputStyle) -> OutputFormat {
        self.format.unwrap_or_else(|| configured.into())
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_advanced_search() {
        let cli = Cli::try_parse_from([
            "log-search",
            "--data",
            "logs.json",
            "advanced-search",
            r#"{"IS": {"browser": "Chrome"}}"#,
            "-F",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("logs.json")));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::AdvancedSearch { query } => assert!(query.is_some()),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_format_falls_back_to_config() {
        let cli = Cli::try_parse_from(["log-search", "-vv", "search", "IE", "philippines"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.effective_format(OutputStyle::Json), OutputFormat::Json);
    }
}
