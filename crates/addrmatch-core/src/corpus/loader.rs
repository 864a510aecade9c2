//! Single-flight corpus cache

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::error::{LoadError, LoadResult};
use super::source::CorpusSource;
use super::Corpus;

/// Loads a corpus once and serves it until invalidated.
///
/// Concurrent first-time callers join the same in-flight load, so the
/// source is read at most once per cache lifetime. A failed load leaves the
/// cache empty and the next caller retries.
pub struct CorpusLoader {
    source: Arc<dyn CorpusSource>,
    // Swapped for a fresh cell on invalidation; in-flight loads finish
    // against the cell they started with
    cell: RwLock<Arc<OnceCell<Corpus>>>,
    reads: AtomicU64,
}

impl CorpusLoader {
    pub fn new(source: impl CorpusSource + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<dyn CorpusSource>) -> Self {
        Self {
            source,
            cell: RwLock::new(Arc::new(OnceCell::new())),
            reads: AtomicU64::new(0),
        }
    }

    /// Return the cached corpus, reading the source on first use.
    pub async fn load(&self) -> LoadResult<Corpus> {
        let cell = self.cell.read().clone();
        cell.get_or_try_init(|| self.populate()).await.cloned()
    }

    /// The cached corpus, without touching the source
    pub fn cached(&self) -> Option<Corpus> {
        self.cell.read().get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.read().initialized()
    }

    /// Drop the cached corpus; the next `load` re-reads the source.
    pub fn invalidate(&self) {
        *self.cell.write() = Arc::new(OnceCell::new());
        info!(source = %self.source.describe(), "Corpus cache invalidated");
    }

    /// Number of times the source has been read
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    async fn populate(&self) -> LoadResult<Corpus> {
        let start = Instant::now();
        let source = Arc::clone(&self.source);
        self.reads.fetch_add(1, Ordering::Relaxed);

        let records = tokio::task::spawn_blocking(move || source.read())
            .await
            .map_err(|e| LoadError::Task(e.to_string()))??;

        let corpus = Corpus::from_records(records);
        let describe = self.source.describe();

        if corpus.is_empty() {
            warn!(source = %describe, "Corpus source produced no addresses");
        }

        info!(
            count = corpus.len(),
            source = %describe,
            fingerprint = corpus.fingerprint(),
            load_time_ms = start.elapsed().as_millis() as u64,
            "Loaded {} addresses",
            corpus.len()
        );

        Ok(corpus)
    }
}

impl std::fmt::Debug for CorpusLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusLoader")
            .field("source", &self.source.describe())
            .field("loaded", &self.is_loaded())
            .field("reads", &self.read_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemorySource;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Slow source that counts reads and can be told to fail
    struct CountingSource {
        records: Vec<String>,
        reads: Arc<AtomicUsize>,
        fail_next: Mutex<bool>,
        delay: Duration,
    }

    impl CountingSource {
        fn new(records: &[&str], delay: Duration) -> (Self, Arc<AtomicUsize>) {
            let reads = Arc::new(AtomicUsize::new(0));
            let source = Self {
                records: records.iter().map(|r| r.to_string()).collect(),
                reads: Arc::clone(&reads),
                fail_next: Mutex::new(false),
                delay,
            };
            (source, reads)
        }
    }

    impl CorpusSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn read(&self) -> LoadResult<Vec<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            if std::mem::take(&mut *self.fail_next.lock()) {
                return Err(LoadError::Task("injected failure".to_string()));
            }
            Ok(self.records.clone())
        }
    }

    #[tokio::test]
    async fn test_load_is_cached() {
        let loader = CorpusLoader::new(MemorySource::new(["5 Oak St", "100 Main St"]));
        assert!(loader.cached().is_none());
        assert!(!loader.is_loaded());

        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(loader.read_count(), 1);
        assert!(loader.cached().unwrap().ptr_eq(&first));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_loads_read_once() {
        let (source, reads) =
            CountingSource::new(&["2133 W Edgemont Ave", "100 Main St"], Duration::from_millis(50));
        let loader = Arc::new(CorpusLoader::new(source));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.load().await })
            })
            .collect();

        let mut corpora = Vec::new();
        for handle in handles {
            corpora.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(loader.read_count(), 1);
        assert!(corpora.iter().all(|c| c.ptr_eq(&corpora[0])));
        assert_eq!(corpora[0].len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let (source, reads) = CountingSource::new(&["5 Oak St"], Duration::ZERO);
        *source.fail_next.lock() = true;
        let loader = CorpusLoader::new(source);

        assert!(matches!(loader.load().await, Err(LoadError::Task(_))));
        assert!(loader.cached().is_none());

        let corpus = loader.load().await.unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let (source, reads) = CountingSource::new(&["5 Oak St"], Duration::ZERO);
        let loader = CorpusLoader::new(source);

        let first = loader.load().await.unwrap();
        loader.invalidate();
        assert!(loader.cached().is_none());

        let second = loader.load().await.unwrap();
        loader.load().await.unwrap();

        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert!(!first.ptr_eq(&second));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_source_loads_empty_corpus() {
        let loader = CorpusLoader::new(MemorySource::new(["", "   "]));
        let corpus = loader.load().await.unwrap();
        assert!(corpus.is_empty());
        assert!(loader.is_loaded());
    }
}
