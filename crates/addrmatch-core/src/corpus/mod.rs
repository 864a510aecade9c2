//! Corpus loading
//!
//! A [`Corpus`] is the immutable, ordered list of candidate addresses a
//! matcher searches. It is produced once from a [`CorpusSource`] and cached
//! by a [`CorpusLoader`] until explicitly invalidated.
//!
//! # Example
//!
//! ```rust
//! use addrmatch_core::corpus::{CorpusLoader, MemorySource};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let loader = CorpusLoader::new(MemorySource::new(["  5 Oak St ", "", "100 Main St"]));
//!
//! let corpus = loader.load().await.unwrap();
//! assert_eq!(corpus.len(), 2);
//! assert_eq!(&*corpus[0], "5 Oak St");
//!
//! // Served from cache
//! loader.load().await.unwrap();
//! assert_eq!(loader.read_count(), 1);
//! # });
//! ```

mod error;
mod loader;
mod source;

use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::sync::Arc;

use ahash::AHasher;

pub use error::{LoadError, LoadResult};
pub use loader::CorpusLoader;
pub use source::{CorpusSource, CsvSource, MemorySource, DEFAULT_COLUMN};

/// A single address; identity is its exact text
pub type Candidate = Arc<str>;

/// Immutable, ordered candidate list. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct Corpus {
    entries: Arc<[Candidate]>,
    fingerprint: String,
}

impl Corpus {
    /// Build from raw records, trimming each and skipping empty ones.
    /// Order and duplicates are preserved.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Arc<[Candidate]> = records
            .into_iter()
            .filter_map(|r| {
                let trimmed = r.as_ref().trim();
                (!trimmed.is_empty()).then(|| Arc::from(trimmed))
            })
            .collect();

        let fingerprint = compute_fingerprint(&entries);
        Self {
            entries,
            fingerprint,
        }
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.entries.iter()
    }

    /// Content hash for change detection
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// True when both corpora share the same storage
    pub fn ptr_eq(&self, other: &Corpus) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::from_records(std::iter::empty::<&str>())
    }
}

impl PartialEq for Corpus {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Corpus {}

impl Index<usize> for Corpus {
    type Output = Candidate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn compute_fingerprint(entries: &[Candidate]) -> String {
    let mut hasher = AHasher::default();
    for entry in entries {
        entry.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}
