//! Fuzzy Matching Engine
//!
//! Approximate substring matching of a query against every candidate of a
//! [`Corpus`](crate::corpus::Corpus), tolerant of typos, partial words and
//! transcription noise.
//!
//! # Scoring
//!
//! 1. Identical text (after case folding) scores 0.0
//! 2. Otherwise a bitap search credits matches with bounded edits and
//!    positional drift: `errors / len + drift / distance`
//! 3. Matched runs shorter than `min_match_char_length` are not credited
//! 4. A field-length exponent favours short candidates
//! 5. Scores above `threshold` are dropped; the rest sort ascending
//!
//! # Example
//!
//! ```rust
//! use addrmatch_core::corpus::Corpus;
//! use addrmatch_core::fuzzy::FuzzyMatcher;
//!
//! let corpus = Corpus::from_records(["2133 W Edgemont Ave", "100 Main St"]);
//! let matcher = FuzzyMatcher::new();
//!
//! let result = matcher.search(&corpus, "2133 w edgemint");
//! let best = result.best().unwrap();
//! assert_eq!(&*best.candidate, "2133 W Edgemont Ave");
//! assert!(best.confidence() >= 60);
//! ```

mod bitap;
mod engine;

pub use bitap::{compute_score, BitapPattern, BitapResult, MAX_BITS};
pub use engine::{confidence, FuzzyMatcher, Match, MatcherConfig, RankedResult};
