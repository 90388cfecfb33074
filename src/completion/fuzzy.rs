//! Fuzzy-match scoring for completion filter text.
//!
//! The contract callers rely on:
//! - an empty pattern matches every candidate with score `0.0`
//! - `matches` returns `None` when the candidate does not contain the
//!   pattern as a (case-smart) subsequence
//! - better matches score higher: a case-exact prefix beats a scattered
//!   subsequence
//!
//! The exact numbers are an implementation detail; only the ordering of
//! scores is meaningful.

/// A compiled filter pattern, reusable across many candidates.
pub struct FuzzyMatchPattern {
    chars: Vec<char>,
}

const PREFIX_BONUS: f64 = 2.0;
const CASE_EXACT_BONUS: f64 = 1.0;
const ADJACENCY_BONUS: f64 = 1.0;
const WORD_START_BONUS: f64 = 1.5;
const GAP_PENALTY: f64 = 0.1;

impl FuzzyMatchPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Scores `candidate` against the pattern. `None` means no match.
    pub fn matches(&self, candidate: &str) -> Option<f64> {
        if self.chars.is_empty() {
            return Some(0.0);
        }

        let candidate: Vec<char> = candidate.chars().collect();
        let mut score = 0.0;
        let mut position = 0usize;
        let mut previous_hit: Option<usize> = None;

        for &wanted in &self.chars {
            let found = candidate[position..]
                .iter()
                .position(|&c| chars_match(wanted, c))?;
            let hit = position + found;

            if chars_match_exact(wanted, candidate[hit]) {
                score += CASE_EXACT_BONUS;
            }
            if hit == 0 {
                score += PREFIX_BONUS;
            } else if is_word_start(&candidate, hit) {
                score += WORD_START_BONUS;
            }
            match previous_hit {
                Some(previous) if hit == previous + 1 => score += ADJACENCY_BONUS,
                Some(previous) => score -= GAP_PENALTY * (hit - previous - 1) as f64,
                None => score -= GAP_PENALTY * hit as f64,
            }

            previous_hit = Some(hit);
            position = hit + 1;
        }

        // Shorter candidates win ties between otherwise equal matches.
        Some(score - GAP_PENALTY * (candidate.len() - position) as f64)
    }
}

/// Case-smart comparison: a lowercase pattern character matches either
/// case, an uppercase one only matches uppercase.
fn chars_match(wanted: char, candidate: char) -> bool {
    if wanted.is_uppercase() {
        wanted == candidate
    } else {
        wanted == candidate || wanted.to_lowercase().eq(candidate.to_lowercase())
    }
}

fn chars_match_exact(wanted: char, candidate: char) -> bool {
    wanted == candidate
}

/// Word boundaries in identifier-style candidates: the start of a camelCase
/// hump or the character after a separator.
fn is_word_start(candidate: &[char], index: usize) -> bool {
    let current = candidate[index];
    let previous = candidate[index - 1];
    (current.is_uppercase() && !previous.is_uppercase())
        || previous == '_'
        || previous == '.'
        || previous == ':'
}
