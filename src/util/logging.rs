//! Structured logging setup for stagegate
//!
//! Logging uses the `tracing` ecosystem and always writes to stderr, so stage
//! output printed on stdout stays clean for piping.
//!
//! - Console output with pretty formatting (default)
//! - Optional JSON output
//! - `RUST_LOG` takes precedence when set
//! - Can only be initialized once per process
//!
//! # Example
//!
//! ```no_run
//! use stagegate::util::logging;
//! use tracing::info;
//!
//! logging::init_from_env();
//! info!(stage = "requirements", "Stage started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise
const NOISY_DEPENDENCIES: [&str; 3] = ["h2", "hyper", "reqwest"];

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level for stagegate's own targets
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    /// Include the module target (e.g. stagegate::pipeline) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// JSON output with full metadata
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            ..Default::default()
        }
    }

    /// Picks the preset for the command-line front-end, then applies `level`.
    ///
    /// JSON output uses the production preset; verbose console output uses
    /// the development preset.
    pub fn for_cli(level: Level, verbose: bool, use_json: bool) -> Self {
        let preset = if use_json {
            Self::production()
        } else if verbose {
            Self::development()
        } else {
            Self::default()
        };

        Self { level, ..preset }
    }
}

/// Parses a log level from a string (case-insensitive).
///
/// Unknown values fall back to `INFO` with a warning on stderr.
///
/// ```
/// use stagegate::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let mut filter = EnvFilter::new(format!("warn,stagegate={}", level));
    for target in NOISY_DEPENDENCIES {
        if let Ok(directive) = format!("{}=warn", target).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Initializes the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Whether `STAGEGATE_LOG_JSON` asks for JSON output
pub fn json_from_env() -> bool {
    env::var("STAGEGATE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Initializes logging from `STAGEGATE_LOG_LEVEL` and `STAGEGATE_LOG_JSON`
pub fn init_from_env() {
    let level_str = env::var("STAGEGATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_logging(LoggingConfig::for_cli(
        parse_level(&level_str),
        false,
        json_from_env(),
    ));
}
