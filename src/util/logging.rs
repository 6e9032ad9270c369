//! Structured logging setup for xmlfactory
//!
//! Plan assembly and runtime construction emit `tracing` events; this module
//! installs a `tracing-subscriber` pipeline to display them. Nothing here is
//! required for the factory to work: without a subscriber the events are
//! simply dropped.
//!
//! ```no_run
//! use xmlfactory::util::logging;
//!
//! // XMLFACTORY_LOG_LEVEL=debug shows every assembled plan
//! logging::init_from_env();
//! ```

use crate::config::FactoryConfig;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for `xmlfactory` events
    pub level: Level,

    pub use_json: bool,

    /// Include the module target (e.g. xmlfactory::plan::assembler)
    pub include_target: bool,

    /// Include file and line number
    pub include_location: bool,

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
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Console output at debug level, so every plan listing is visible.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }

    pub fn from_factory_config(config: &FactoryConfig) -> Self {
        Self::with_level(parse_level(&config.log_level))
    }
}

/// Parses a level name case-insensitively, falling back to INFO.
///
/// ```
/// use xmlfactory::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("TRACE"), Level::TRACE);
/// assert_eq!(parse_level("loud"), Level::INFO);
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

/// Installs the global subscriber. Only the first call has any effect.
///
/// `RUST_LOG` directives are honoured; the configured level is added for the
/// `xmlfactory` target on top of them.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive(format!("xmlfactory={}", config.level).parse().unwrap());

        let layer = fmt::layer()
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `XMLFACTORY_LOG_LEVEL` and `XMLFACTORY_LOG_JSON`.
pub fn init_from_env() {
    let level_str = env::var("XMLFACTORY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level = parse_level(&level_str);

    let use_json = env::var("XMLFACTORY_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level,
        use_json,
        ..Default::default()
    });
}

pub fn with_level(level_str: &str) {
    init_logging(LoggingConfig::with_level(parse_level(level_str)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
        assert!(!config.include_location);
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert!(config.use_json);
        assert!(config.include_location);
        assert!(config.include_thread_ids);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.use_json);
    }

    #[test]
    fn test_from_factory_config() {
        let factory_config = FactoryConfig {
            log_level: "trace".to_string(),
            allow_dtd: false,
            nodes_limit: 100,
            max_input_bytes: 1024,
        };

        let config = LoggingConfig::from_factory_config(&factory_config);
        assert_eq!(config.level, Level::TRACE);
        assert!(!config.use_json);
    }

    #[test]
    fn test_init_twice_is_noop() {
        init_logging(LoggingConfig::with_level(Level::WARN));
        init_logging(LoggingConfig::development());
        tracing::debug!("logging initialized");
    }
}
