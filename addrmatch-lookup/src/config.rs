//! Service configuration
//!
//! Every option can be given on the command line or through the
//! environment; the command line wins.

use std::net::SocketAddr;
use std::path::PathBuf;

use addrmatch::{Error, Result};
use addrmatch_core::{CsvSource, MatcherConfig};
use clap::{ArgAction, Parser};

/// Lookup service configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "addrmatch-lookup")]
#[command(about = "Fuzzy address lookup service")]
#[command(version)]
pub struct LookupConfig {
    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// HTTP server address (overrides port)
    #[arg(short, long, env = "ADDRMATCH_ADDRESS")]
    pub address: Option<String>,

    /// CSV file holding the address book
    #[arg(long, env = "ADDRMATCH_CORPUS", default_value = "addresses.csv")]
    pub corpus: PathBuf,

    /// Header of the address column
    #[arg(long, env = "ADDRMATCH_COLUMN", default_value = "Address")]
    pub column: String,

    /// Maximum admitted score, 0.0 (exact only) to 1.0 (anything)
    #[arg(long, env = "ADDRMATCH_THRESHOLD", default_value_t = 0.4)]
    pub threshold: f64,

    /// Positional drift, in characters, that costs a full point of score
    #[arg(long, env = "ADDRMATCH_DISTANCE", default_value_t = 100)]
    pub distance: usize,

    /// Shortest matched run credited towards a match
    #[arg(long = "min-match-chars", env = "ADDRMATCH_MIN_MATCH_CHARS", default_value_t = 3)]
    pub min_match_char_length: usize,

    /// Alternates returned next to the best match
    #[arg(long, env = "ADDRMATCH_MAX_ALTERNATES", default_value_t = 3)]
    pub max_alternates: usize,

    /// Load the corpus on first request instead of at startup
    #[arg(long, env = "ADDRMATCH_LAZY")]
    pub lazy: bool,

    /// Send permissive CORS headers
    #[arg(long, env = "ADDRMATCH_CORS", default_value_t = true, action = ArgAction::Set)]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            address: None,
            corpus: PathBuf::from("addresses.csv"),
            column: addrmatch_core::corpus::DEFAULT_COLUMN.to_string(),
            threshold: 0.4,
            distance: 100,
            min_match_char_length: 3,
            max_alternates: 3,
            lazy: false,
            cors: true,
            log_level: "info".to_string(),
        }
    }
}

impl LookupConfig {
    /// Check values clap cannot range-check on its own.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.column.trim().is_empty() {
            return Err(Error::Config("address column must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let raw = match &self.address {
            Some(address) => address.clone(),
            None => format!("0.0.0.0:{}", self.port),
        };
        raw.parse()
            .map_err(|e| Error::Config(format!("failed to parse address '{}': {}", raw, e)))
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            threshold: self.threshold,
            distance: self.distance,
            min_match_char_length: self.min_match_char_length,
            ..Default::default()
        }
    }

    pub fn corpus_source(&self) -> CsvSource {
        CsvSource::with_column(&self.corpus, self.column.trim())
    }
}
