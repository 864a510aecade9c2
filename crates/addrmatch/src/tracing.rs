//! Logging setup for addrmatch binaries.
//!
//! Log output is a single compact fmt layer filtered by the configured
//! `--log-level`, unless `RUST_LOG` is set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Install the global subscriber at `level`.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init(level: &str) {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(env_filter(level));

    tracing_subscriber::registry().with(layer).init();
}

/// Filter for `level`, or the one described by `RUST_LOG`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Directives for a configured level name.
///
/// Unknown names fall back to `info`. At `debug` and `trace` the HTTP
/// connection internals stay at `warn` so request spans remain readable.
pub fn directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    let level = if LEVELS.contains(&level.as_str()) {
        level
    } else {
        "info".to_string()
    };

    match level.as_str() {
        "trace" | "debug" => format!("{level},hyper=warn,hyper_util=warn"),
        _ => level,
    }
}

/// addrmatch segment prefixes for logging.
pub mod prefix {
    /// Graceful startup prefix
    pub const OPEN: &str = "✿";
    /// Graceful shutdown prefix
    pub const CLOSE: &str = "❀";
    /// Corpus operations prefix
    pub const CORPUS: &str = "⊔";
    /// Lookup request prefix
    pub const LOOKUP: &str = "꩜";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_follow_configured_level() {
        assert_eq!(directives("info"), "info");
        assert_eq!(directives(" WARN "), "warn");
        assert_eq!(directives("debug"), "debug,hyper=warn,hyper_util=warn");
        assert_eq!(directives("trace"), "trace,hyper=warn,hyper_util=warn");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(directives("verbose"), "info");
        assert_eq!(directives(""), "info");
    }

    #[test]
    fn test_directives_parse() {
        for level in LEVELS {
            let parsed: Result<EnvFilter, _> = directives(level).parse();
            assert!(parsed.is_ok(), "{level}");
        }
    }
}
