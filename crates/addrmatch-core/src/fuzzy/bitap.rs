//! Bitap approximate substring search
//!
//! Bit-parallel matching with insertions, deletions and substitutions.
//! Each pattern is split into chunks of at most [`MAX_BITS`] characters so a
//! chunk's state fits in one `u32`. A chunk is scored as
//!
//! ```text
//! errors / chunk_len + |expected_location - found_location| / distance
//! ```
//!
//! and the candidate's raw score is the mean over chunks.

use ahash::AHashMap;

use super::engine::MatcherConfig;

/// Longest pattern a single bitap pass can track.
pub const MAX_BITS: usize = 32;

/// Lowest score a non-identical match can receive.
const MIN_FUZZY_SCORE: f64 = 0.001;

/// Outcome of searching one text with a compiled pattern
#[derive(Debug, Clone, PartialEq)]
pub struct BitapResult {
    pub is_match: bool,
    pub score: f64,
    /// Inclusive character ranges credited as matched
    pub indices: Vec<(usize, usize)>,
}

impl BitapResult {
    fn no_match() -> Self {
        Self {
            is_match: false,
            score: 1.0,
            indices: Vec::new(),
        }
    }
}

struct Chunk {
    pattern: Vec<char>,
    alphabet: AHashMap<char, u32>,
    start_index: usize,
}

impl Chunk {
    fn new(pattern: &[char], start_index: usize) -> Self {
        Self {
            pattern: pattern.to_vec(),
            alphabet: pattern_alphabet(pattern),
            start_index,
        }
    }
}

/// A query compiled into bitap chunks, reusable across every candidate.
pub struct BitapPattern {
    pattern: Vec<char>,
    chunks: Vec<Chunk>,
    case_sensitive: bool,
}

impl BitapPattern {
    pub fn new(pattern: &str, case_sensitive: bool) -> Self {
        let pattern = fold(pattern, case_sensitive);
        let len = pattern.len();
        let mut chunks = Vec::new();

        if len > 0 && len <= MAX_BITS {
            chunks.push(Chunk::new(&pattern, 0));
        } else if len > MAX_BITS {
            let remainder = len % MAX_BITS;
            let end = len - remainder;
            let mut i = 0;
            while i < end {
                chunks.push(Chunk::new(&pattern[i..i + MAX_BITS], i));
                i += MAX_BITS;
            }
            // Tail chunk overlaps the previous one so every chunk is full width
            if remainder > 0 {
                let start = len - MAX_BITS;
                chunks.push(Chunk::new(&pattern[start..], start));
            }
        }

        Self {
            pattern,
            chunks,
            case_sensitive,
        }
    }

    /// Search `text`, returning the averaged chunk score.
    pub fn search_in(&self, text: &str, config: &MatcherConfig) -> BitapResult {
        let text = fold(text, self.case_sensitive);

        if self.pattern == text {
            let indices = if text.is_empty() {
                Vec::new()
            } else {
                vec![(0, text.len() - 1)]
            };
            return BitapResult {
                is_match: true,
                score: 0.0,
                indices,
            };
        }

        if self.chunks.is_empty() {
            return BitapResult::no_match();
        }

        let mut all_indices = Vec::new();
        let mut total_score = 0.0;
        let mut has_matches = false;

        for chunk in &self.chunks {
            let result = search_chunk(&text, chunk, config.location + chunk.start_index, config);
            if result.is_match {
                has_matches = true;
            }
            total_score += result.score;
            if config.include_matches {
                all_indices.extend(result.indices);
            }
        }

        if !has_matches {
            return BitapResult::no_match();
        }

        BitapResult {
            is_match: true,
            score: total_score / self.chunks.len() as f64,
            indices: all_indices,
        }
    }
}

fn fold(s: &str, case_sensitive: bool) -> Vec<char> {
    if case_sensitive {
        s.chars().collect()
    } else {
        s.to_lowercase().chars().collect()
    }
}

/// Bit mask per character: bit `len - i - 1` is set when `pattern[i] == c`.
fn pattern_alphabet(pattern: &[char]) -> AHashMap<char, u32> {
    let len = pattern.len();
    let mut mask = AHashMap::with_capacity(len);
    for (i, &c) in pattern.iter().enumerate() {
        *mask.entry(c).or_insert(0) |= 1 << (len - i - 1);
    }
    mask
}

/// Score for a match with `errors` edits found at `current_location`.
pub fn compute_score(
    pattern_len: usize,
    errors: usize,
    current_location: usize,
    expected_location: usize,
    distance: usize,
    ignore_location: bool,
) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    if ignore_location {
        return accuracy;
    }

    let proximity = expected_location.abs_diff(current_location);
    if distance == 0 {
        return if proximity > 0 { 1.0 } else { accuracy };
    }

    accuracy + proximity as f64 / distance as f64
}

/// Collapse a per-character match mask into inclusive runs of at least
/// `min_len` characters.
pub fn mask_to_indices(mask: &[bool], min_len: usize) -> Vec<(usize, usize)> {
    let mut indices = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &matched) in mask.iter().enumerate() {
        match (matched, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    indices.push((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }

    if let Some(s) = start {
        if mask.len() - s >= min_len {
            indices.push((s, mask.len() - 1));
        }
    }

    indices
}

fn find_from(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if from > text.len() || pattern.len() > text.len() - from {
        return None;
    }
    text[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|pos| pos + from)
}

fn search_chunk(text: &[char], chunk: &Chunk, location: usize, config: &MatcherConfig) -> BitapResult {
    let pattern = &chunk.pattern;
    let pattern_len = pattern.len();
    let text_len = text.len();
    let distance = config.distance;
    let ignore_location = config.ignore_location;

    let expected_location = location.min(text_len);
    let score_at = |errors: usize, current: usize| {
        compute_score(
            pattern_len,
            errors,
            current,
            expected_location,
            distance,
            ignore_location,
        )
    };

    let mut current_threshold = config.threshold;
    let compute_matches = config.min_match_char_length > 1 || config.include_matches;
    let mut match_mask = if compute_matches {
        vec![false; text_len]
    } else {
        Vec::new()
    };

    // Exact occurrences tighten the threshold before the fuzzy pass
    let mut cursor = expected_location;
    while let Some(index) = find_from(text, pattern, cursor) {
        current_threshold = current_threshold.min(score_at(0, index));
        cursor = index + pattern_len;
        if compute_matches {
            match_mask[index..index + pattern_len].fill(true);
        }
    }

    let mut best_location: Option<usize> = None;
    let mut best_score = 1.0;
    let mut last_bits: Vec<u32> = Vec::new();
    let mut bin_max = pattern_len + text_len;
    let top_bit: u32 = 1 << (pattern_len - 1);

    for errors in 0..pattern_len {
        // Widest window around the expected location that can still beat
        // the working threshold at this error level
        let mut bin_min = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            if score_at(errors, expected_location + bin_mid) <= current_threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = (expected_location as isize - bin_mid as isize + 1).max(1) as usize;
        let finish = if config.find_all_matches {
            text_len
        } else {
            (expected_location + bin_mid).min(text_len) + pattern_len
        };

        let mut bits = vec![0u32; finish + 2];
        bits[finish + 1] = (1u32 << errors) - 1;

        let last = |k: usize| last_bits.get(k).copied().unwrap_or(0);

        let mut j = finish;
        while j >= start {
            let current_location = j - 1;
            let char_match = text
                .get(current_location)
                .and_then(|c| chunk.alphabet.get(c))
                .copied()
                .unwrap_or(0);

            if compute_matches && current_location < text_len {
                match_mask[current_location] = char_match != 0;
            }

            // Exact extension
            bits[j] = ((bits[j + 1] << 1) | 1) & char_match;

            // Substitution, insertion and deletion from the previous level
            if errors > 0 {
                bits[j] |= ((last(j + 1) | last(j)) << 1) | 1 | last(j + 1);
            }

            if bits[j] & top_bit != 0 {
                let score = score_at(errors, current_location);
                if score <= current_threshold {
                    current_threshold = score;
                    best_score = score;
                    best_location = Some(current_location);

                    if current_location <= expected_location {
                        break;
                    }

                    // Past the expected location: only scan as far again on the left
                    start = (2 * expected_location as isize - current_location as isize).max(1)
                        as usize;
                }
            }

            j -= 1;
        }

        // No point in trying more errors if even a perfect location loses
        if score_at(errors + 1, expected_location) > current_threshold {
            break;
        }

        last_bits = bits;
    }

    if best_location.is_none() {
        return BitapResult::no_match();
    }

    let mut result = BitapResult {
        is_match: true,
        score: best_score.max(MIN_FUZZY_SCORE),
        indices: Vec::new(),
    };

    if compute_matches {
        let indices = mask_to_indices(&match_mask, config.min_match_char_length);
        if indices.is_empty() {
            return BitapResult::no_match();
        }
        if config.include_matches {
            result.indices = indices;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MatcherConfig {
        MatcherConfig::default()
    }

    #[test]
    fn test_identical_text_scores_zero() {
        let pattern = BitapPattern::new("5 Oak St", false);
        let result = pattern.search_in("5 oak st", &config());
        assert!(result.is_match);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_case_sensitive_identity() {
        let pattern = BitapPattern::new("Main", true);
        let result = pattern.search_in("main", &config());
        assert!(result.score > 0.0);
    }

    #[test]
    fn test_exact_prefix_gets_floor_score() {
        let pattern = BitapPattern::new("main", false);
        let result = pattern.search_in("main st", &config());
        assert!(result.is_match);
        assert_eq!(result.score, MIN_FUZZY_SCORE);
    }

    #[test]
    fn test_single_substitution() {
        let pattern = BitapPattern::new("2133 w edgemint", false);
        let result = pattern.search_in("2133 W Edgemont Ave", &config());
        assert!(result.is_match);
        assert!((result.score - 1.0 / 15.0).abs() < 1e-9, "got {}", result.score);
    }

    #[test]
    fn test_drift_increases_score() {
        let pattern = BitapPattern::new("main", false);
        let near = pattern.search_in("1 main st", &config());
        let far = pattern.search_in("1234567890 main st", &config());
        assert!(near.is_match && far.is_match);
        assert!(near.score < far.score);
        assert!((far.score - 0.11).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_text_does_not_match() {
        let pattern = BitapPattern::new("xyz completely unrelated query", false);
        let result = pattern.search_in("100 Main St", &config());
        assert!(!result.is_match);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_long_pattern_is_chunked() {
        let text = "12345 North Saint Lawrence Boulevard Apartment 9";
        let pattern = BitapPattern::new(text, false);
        assert_eq!(pattern.chunks.len(), 2);
        assert_eq!(pattern.chunks[1].start_index, text.chars().count() - MAX_BITS);

        let result = pattern.search_in("12345 North Saint Lawrence Boulevard Apartment 8", &config());
        assert!(result.is_match);
        assert!(result.score > 0.0 && result.score < 0.1);
    }

    #[test]
    fn test_empty_pattern() {
        let pattern = BitapPattern::new("", false);
        assert!(pattern.chunks.is_empty());
        assert!(!pattern.search_in("100 Main St", &config()).is_match);
        assert!(pattern.search_in("", &config()).is_match);
    }

    #[test]
    fn test_short_pattern_does_not_panic() {
        let pattern = BitapPattern::new("ab", false);
        let result = pattern.search_in("100 Main St", &config());
        assert!(!result.is_match);
    }

    #[test]
    fn test_min_match_char_length_rejects_scattered_hits() {
        // Only isolated characters of the text appear in the pattern
        let cfg = MatcherConfig {
            threshold: 1.0,
            ..config()
        };
        let pattern = BitapPattern::new("axbxc", false);
        let result = pattern.search_in("a-b-c", &cfg);
        assert!(!result.is_match);
    }

    #[test]
    fn test_include_matches_reports_ranges() {
        let cfg = MatcherConfig {
            include_matches: true,
            ..config()
        };
        let pattern = BitapPattern::new("oak", false);
        let result = pattern.search_in("5 oak st", &cfg);
        assert!(result.is_match);
        assert!(result.indices.contains(&(2, 4)));
    }

    #[test]
    fn test_compute_score_is_monotonic() {
        let base = compute_score(10, 2, 5, 0, 100, false);
        assert!(compute_score(10, 1, 5, 0, 100, false) < base);
        assert!(compute_score(10, 2, 3, 0, 100, false) < base);
        assert_eq!(compute_score(10, 0, 0, 0, 100, false), 0.0);
        assert_eq!(compute_score(10, 2, 50, 0, 100, true), 0.2);
        assert_eq!(compute_score(10, 0, 1, 0, 0, false), 1.0);
    }

    #[test]
    fn test_mask_to_indices() {
        let mask = [true, true, true, false, true, true, false, true, true, true, true];
        assert_eq!(mask_to_indices(&mask, 3), vec![(0, 2), (7, 10)]);
        assert_eq!(mask_to_indices(&mask, 1), vec![(0, 2), (4, 5), (7, 10)]);
        assert!(mask_to_indices(&[], 3).is_empty());
    }
}
