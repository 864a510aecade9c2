//! Lookup service: corpus cache, matcher and request counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use addrmatch::tracing::prefix;
use addrmatch_core::{Corpus, CorpusLoader, FuzzyMatcher, LoadResult, RankedResult};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{LookupError, LookupResult};

/// Shortest accepted query, counted in characters after trimming
pub const MIN_QUERY_CHARS: usize = 3;

/// An alternate candidate next to the best match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternate {
    pub address: String,
    pub confidence: u8,
}

/// Result of a well-formed lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Matched {
        address: String,
        confidence: u8,
        alternates: Vec<Alternate>,
    },
    NoMatch,
}

impl LookupOutcome {
    fn from_ranked(result: &RankedResult, max_alternates: usize) -> Self {
        let Some(best) = result.best() else {
            return LookupOutcome::NoMatch;
        };

        LookupOutcome::Matched {
            address: best.candidate.to_string(),
            confidence: best.confidence(),
            alternates: result
                .alternates(max_alternates)
                .iter()
                .map(|m| Alternate {
                    address: m.candidate.to_string(),
                    confidence: m.confidence(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub address_count: usize,
    pub loaded: bool,
    pub source: String,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub address_count: usize,
    pub queries_served: u64,
    pub avg_query_time_us: u64,
    pub uptime_seconds: u64,
    pub fingerprint: Option<String>,
}

/// Shared state behind every HTTP handler
pub struct LookupService {
    loader: Arc<CorpusLoader>,
    matcher: FuzzyMatcher,
    max_alternates: usize,
    start_time: Instant,
    queries_served: AtomicU64,
    total_query_time_us: AtomicU64,
}

impl LookupService {
    pub fn new(loader: Arc<CorpusLoader>, matcher: FuzzyMatcher, max_alternates: usize) -> Self {
        Self {
            loader,
            matcher,
            max_alternates,
            start_time: Instant::now(),
            queries_served: AtomicU64::new(0),
            total_query_time_us: AtomicU64::new(0),
        }
    }

    fn record_query(&self, time_us: u64) {
        self.queries_served.fetch_add(1, Ordering::Relaxed);
        self.total_query_time_us.fetch_add(time_us, Ordering::Relaxed);
    }

    /// Load the corpus ahead of the first request.
    pub async fn warm(&self) -> LoadResult<Corpus> {
        let corpus = self.loader.load().await?;
        info!(
            "{} Corpus ready: {} addresses from {}",
            prefix::CORPUS,
            corpus.len(),
            self.loader.describe()
        );
        Ok(corpus)
    }

    /// Match `query` against the corpus.
    ///
    /// The query is trimmed before validation and matching; callers echo
    /// their own untrimmed text.
    pub async fn lookup(&self, query: &str) -> LookupResult<LookupOutcome> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return Err(LookupError::query_too_short());
        }

        let corpus = self.loader.load().await?;

        let start = Instant::now();
        let result = self.matcher.search(&corpus, trimmed);
        let time_us = start.elapsed().as_micros() as u64;
        self.record_query(time_us);

        debug!(
            query = trimmed,
            matches = result.len(),
            time_us,
            "{} Address lookup",
            prefix::LOOKUP
        );

        Ok(LookupOutcome::from_ranked(&result, self.max_alternates))
    }

    pub fn health(&self) -> HealthReport {
        let cached = self.loader.cached();
        HealthReport {
            status: "ok",
            address_count: cached.as_ref().map_or(0, Corpus::len),
            loaded: cached.is_some(),
            source: self.loader.describe(),
            fingerprint: cached.map(|c| c.fingerprint().to_string()),
        }
    }

    pub fn stats(&self) -> StatsReport {
        let cached = self.loader.cached();
        let queries = self.queries_served.load(Ordering::Relaxed);
        let total_time = self.total_query_time_us.load(Ordering::Relaxed);

        let avg_time = if queries > 0 { total_time / queries } else { 0 };

        StatsReport {
            address_count: cached.as_ref().map_or(0, Corpus::len),
            queries_served: queries,
            avg_query_time_us: avg_time,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            fingerprint: cached.map(|c| c.fingerprint().to_string()),
        }
    }
}

impl std::fmt::Debug for LookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupService")
            .field("loader", &self.loader)
            .field("max_alternates", &self.max_alternates)
            .field("queries_served", &self.queries_served.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrmatch_core::MemorySource;

    fn service(records: &[&str]) -> LookupService {
        let loader = CorpusLoader::new(MemorySource::new(records.iter().copied()));
        LookupService::new(Arc::new(loader), FuzzyMatcher::new(), 3)
    }

    #[tokio::test]
    async fn test_short_query_rejected_before_load() {
        let service = service(&["100 Main St"]);

        for query in ["", "ab", "  ab  ", "\t\n"] {
            let err = service.lookup(query).await.unwrap_err();
            assert!(matches!(err, LookupError::Validation(_)), "{query:?}");
        }
        assert!(!service.health().loaded);
        assert_eq!(service.stats().queries_served, 0);
    }

    #[tokio::test]
    async fn test_match_with_alternates() {
        let service = service(&[
            "2133 W Edgemont Ave",
            "2135 W Edgemont Ave",
            "2137 W Edgemont Ave",
            "2139 W Edgemont Ave",
            "2131 W Edgemont Ave",
            "100 Main St",
        ]);

        let outcome = service.lookup("  2133 W Edgemont Ave ").await.unwrap();
        let LookupOutcome::Matched {
            address,
            confidence,
            alternates,
        } = outcome
        else {
            panic!("expected a match");
        };

        assert_eq!(address, "2133 W Edgemont Ave");
        assert_eq!(confidence, 100);
        assert_eq!(alternates.len(), 3);
        assert!(alternates.iter().all(|a| a.address != address));
        assert!(alternates
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[tokio::test]
    async fn test_no_match_is_ok() {
        let service = service(&["100 Main St"]);
        let outcome = service.lookup("xyz completely unrelated query").await.unwrap();
        assert_eq!(outcome, LookupOutcome::NoMatch);
        assert_eq!(service.stats().queries_served, 1);
    }

    #[tokio::test]
    async fn test_health_and_stats_after_warm() {
        let service = service(&["5 Oak St", "100 Main St"]);

        let health = service.health();
        assert!(!health.loaded);
        assert_eq!(health.address_count, 0);
        assert!(health.fingerprint.is_none());

        let corpus = service.warm().await.unwrap();
        let health = service.health();
        assert!(health.loaded);
        assert_eq!(health.address_count, 2);
        assert_eq!(health.fingerprint.as_deref(), Some(corpus.fingerprint()));

        service.lookup("5 oak st").await.unwrap();
        service.lookup("100 main").await.unwrap();
        let stats = service.stats();
        assert_eq!(stats.queries_served, 2);
        assert_eq!(stats.address_count, 2);
    }
}
