use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map `-v` / `-q` to a log level. Quiet wins over verbose.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global stderr subscriber. `RUST_LOG` overrides the level
/// derived from the command line. Calling this twice is harmless.
pub fn init(verbose: u8, quiet: bool) {
    let default_level = level_for(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
