//! Address lookup service - Main Entry Point
//!
//! Usage:
//!     addrmatch-lookup --corpus addresses.csv --port 3001
//!     addrmatch-lookup --corpus addresses.csv --lazy

use std::sync::Arc;

use addrmatch::tracing::prefix;
use addrmatch_core::{CorpusLoader, FuzzyMatcher};
use addrmatch_lookup::{build_router, serve, LookupConfig, LookupService};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> addrmatch::Result<()> {
    let config = LookupConfig::parse();
    addrmatch::tracing::init(&config.log_level);

    config.validate()?;
    let addr = config.socket_addr()?;

    info!("{} Initializing address lookup service", prefix::OPEN);
    info!("  Version: {}", env!("CARGO_PKG_VERSION"));
    let source = config.corpus_source();
    info!(
        "  Corpus: {} (column {:?})",
        source.path().display(),
        source.column()
    );
    info!(
        "  Threshold: {}, distance: {}, min match chars: {}",
        config.threshold, config.distance, config.min_match_char_length
    );

    let loader = Arc::new(CorpusLoader::new(source));
    let matcher = FuzzyMatcher::with_config(config.matcher_config());
    let service = Arc::new(LookupService::new(loader, matcher, config.max_alternates));

    if config.lazy {
        info!("{} Corpus will load on first request", prefix::CORPUS);
    } else {
        service.warm().await?;
    }

    let router = build_router(service, config.cors);
    serve(router, addr).await
}
