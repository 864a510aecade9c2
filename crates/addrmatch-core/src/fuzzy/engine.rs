//! FuzzyMatcher - ranks a corpus against a query

use std::sync::Arc;

use super::bitap::BitapPattern;
use crate::corpus::{Candidate, Corpus};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A candidate admitted by the matcher
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub candidate: Candidate,
    /// Position of the candidate in the corpus
    pub index: usize,
    /// 0.0 is a perfect match, 1.0 no similarity
    pub score: f64,
    /// Matched character ranges, populated when `include_matches` is set
    pub indices: Vec<(usize, usize)>,
}

impl Match {
    /// Integer percentage shown to users
    pub fn confidence(&self) -> u8 {
        confidence(self.score)
    }
}

/// `round((1 - score) * 100)`, clamped to 0..=100
pub fn confidence(score: f64) -> u8 {
    ((1.0 - score) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Matches ordered best first; ties keep corpus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult {
    matches: Vec<Match>,
}

impl RankedResult {
    fn from_unsorted(mut matches: Vec<Match>) -> Self {
        // sort_by is stable, so equal scores stay in corpus order
        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        Self { matches }
    }

    pub fn best(&self) -> Option<&Match> {
        self.matches.first()
    }

    /// Up to `limit` matches following the best one
    pub fn alternates(&self, limit: usize) -> &[Match] {
        let rest = self.matches.get(1..).unwrap_or_default();
        &rest[..rest.len().min(limit)]
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn into_vec(self) -> Vec<Match> {
        self.matches
    }
}

impl IntoIterator for RankedResult {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// Matcher configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Maximum admitted score (0.0 exact only, 1.0 anything)
    pub threshold: f64,
    /// Drift, in characters, that costs a full point of score
    pub distance: usize,
    /// Matched runs shorter than this are not credited
    pub min_match_char_length: usize,
    /// Where in the candidate the query is expected to start
    pub location: usize,
    /// Score on edit accuracy alone
    pub ignore_location: bool,
    /// Keep scanning the whole candidate after a good match
    pub find_all_matches: bool,
    pub case_sensitive: bool,
    /// Report matched character ranges on each `Match`
    pub include_matches: bool,
    /// Skip the field-length exponent
    pub ignore_field_norm: bool,
    pub field_norm_weight: f64,
    /// Corpus size at which scoring switches to rayon
    pub parallel_threshold: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            distance: 100,
            min_match_char_length: 3,
            location: 0,
            ignore_location: false,
            find_all_matches: false,
            case_sensitive: false,
            include_matches: false,
            ignore_field_norm: false,
            field_norm_weight: 1.0,
            parallel_threshold: 1000,
        }
    }
}

/// Stateless fuzzy matcher; safe to share across threads.
///
/// With the `parallel` feature, corpora of at least `parallel_threshold`
/// candidates are scored with rayon.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: MatcherConfig,
}

impl FuzzyMatcher {
    /// Create a matcher with default configuration
    pub fn new() -> Self {
        Self::with_config(MatcherConfig::default())
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Rank every candidate of `corpus` against `query`.
    pub fn search(&self, corpus: &Corpus, query: &str) -> RankedResult {
        if corpus.is_empty() {
            return RankedResult::default();
        }

        let pattern = BitapPattern::new(query, self.config.case_sensitive);
        let matches = self.match_corpus(&pattern, corpus.entries());
        RankedResult::from_unsorted(matches)
    }

    /// Score a single candidate; `None` when it falls outside the threshold.
    pub fn score(&self, candidate: &str, query: &str) -> Option<f64> {
        let pattern = BitapPattern::new(query, self.config.case_sensitive);
        self.score_candidate(&pattern, candidate)
            .map(|(score, _)| score)
    }

    #[cfg(feature = "parallel")]
    fn match_corpus(&self, pattern: &BitapPattern, entries: &[Candidate]) -> Vec<Match> {
        if entries.len() >= self.config.parallel_threshold {
            entries
                .par_iter()
                .enumerate()
                .filter_map(|(index, candidate)| self.match_single(pattern, index, candidate))
                .collect()
        } else {
            self.match_sequential(pattern, entries)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn match_corpus(&self, pattern: &BitapPattern, entries: &[Candidate]) -> Vec<Match> {
        self.match_sequential(pattern, entries)
    }

    fn match_sequential(&self, pattern: &BitapPattern, entries: &[Candidate]) -> Vec<Match> {
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| self.match_single(pattern, index, candidate))
            .collect()
    }

    fn match_single(
        &self,
        pattern: &BitapPattern,
        index: usize,
        candidate: &Candidate,
    ) -> Option<Match> {
        self.score_candidate(pattern, candidate)
            .map(|(score, indices)| Match {
                candidate: Arc::clone(candidate),
                index,
                score,
                indices,
            })
    }

    fn score_candidate(
        &self,
        pattern: &BitapPattern,
        candidate: &str,
    ) -> Option<(f64, Vec<(usize, usize)>)> {
        let result = pattern.search_in(candidate, &self.config);
        if !result.is_match {
            return None;
        }

        let score = if result.score == 0.0 || self.config.ignore_field_norm {
            result.score
        } else {
            result
                .score
                .powf(field_norm(candidate, self.config.field_norm_weight))
        };

        (score <= self.config.threshold).then_some((score, result.indices))
    }
}

/// `1 / tokens^(0.5 * weight)`, rounded to three decimals.
///
/// Raising a score in (0, 1) to this power favours short candidates: the
/// same raw score counts for less in a long address.
fn field_norm(text: &str, weight: f64) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    let norm = 1.0 / (tokens as f64).powf(0.5 * weight);
    (norm * 1000.0).round() / 1000.0
}
