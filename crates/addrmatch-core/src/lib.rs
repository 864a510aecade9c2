//! addrmatch Core Engine
//!
//! Approximate address matching over a static catalog: which known address
//! best matches a noisy, typo-ridden or transcribed input string?
//!
//! - [`corpus`] - load-once, immutable address catalog and its sources
//! - [`fuzzy`] - bitap scoring and ranking of a corpus against a query
//!
//! # Features
//!
//! - `native` - Enable all native optimizations
//! - `parallel` - Parallel scoring via rayon for large corpora
//!
//! # Example
//!
//! ```rust
//! use addrmatch_core::{Corpus, FuzzyMatcher};
//!
//! let corpus = Corpus::from_records(["5 Oak St", "100 Main St", "5 Oak St"]);
//! let result = FuzzyMatcher::new().search(&corpus, "5 oak st");
//!
//! assert_eq!(result.best().unwrap().score, 0.0);
//! assert_eq!(result.iter().filter(|m| m.score == 0.0).count(), 2);
//! ```

pub mod corpus;
pub mod fuzzy;

// Re-export main types at crate root
pub use corpus::{
    Candidate, Corpus, CorpusLoader, CorpusSource, CsvSource, LoadError, LoadResult, MemorySource,
};
pub use fuzzy::{FuzzyMatcher, Match, MatcherConfig, RankedResult};
