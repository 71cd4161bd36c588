pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod logging;
pub mod record;
pub mod schema;
pub mod search;
pub mod value;

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};
use tracing::debug;

pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use filter::{BadRequest, FilterError, FilterNode, Predicate, normalize_and_compile};
pub use record::{JsonFileStore, LogRecord, MemoryStore, Record, RecordStore, StorageError};
pub use schema::{FieldDescriptor, FieldKind, Schema};
pub use search::{Search, SearchError, execute, parse_query};

fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write output file '{}'", path.display())),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

fn resolve_data_path(cli_data: Option<&Path>, configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    match cli_data.or(configured) {
        Some(path) => Ok(path.to_path_buf()),
        None => bail!("No record file given; pass --data <FILE> or set data_path in the config"),
    }
}

fn render(records: &[LogRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => display::format_results_text(records),
        OutputFormat::Json => display::format_results_json(records),
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    logging::init(cli.verbose, cli.quiet);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    let format = cli.effective_format(config.output.format);
    let output = cli.output.as_deref();
    debug!(?format, config = ?cli.config, "starting");

    match &cli.command {
        Commands::Fields => {
            let schema = LogRecord::schema();
            let registry = filter::OperatorRegistry::builtin();
            let content = match format {
                OutputFormat::Text => display::format_fields_text(schema, registry),
                OutputFormat::Json => display::format_fields_json(schema, registry),
            };
            write_output(output, &content)
        }
        Commands::Search { browser, country } => {
            let path = resolve_data_path(cli.data.as_deref(), config.data_path.as_deref())?;
            let store = JsonFileStore::new(path);
            let results = Search::new(&store, LogRecord::schema()).simple(browser, country)?;
            write_output(output, &render(&results, format))
        }
        Commands::AdvancedSearch { query } => {
            let query = query.as_deref().map(str::trim).unwrap_or_default();
            if query.is_empty() {
                debug!("empty query, returning no records");
                return write_output(output, &render(&[], format));
            }

            let raw = parse_query(query, config.query.lenient_json)?;
            let path = resolve_data_path(cli.data.as_deref(), config.data_path.as_deref())?;
            let store = JsonFileStore::new(path);
            let results = Search::new(&store, LogRecord::schema())
                .with_normalizer(config.query.normalizer())
                .advanced(&raw)?;
            write_output(output, &render(&results, format))
        }
    }
}
