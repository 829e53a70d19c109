//! Dictionary membership, hooks and pattern search (spec.md §3, §4.2).
//!
//! Grounded on `examples/duni-k-scrabbler/src/dict.rs`'s node/edge DAWG for
//! the overall shape of a word-list abstraction, generalized here to the
//! richer contract spec.md §4.2 requires (hooks, base scores, pattern
//! search, anagrams) and backed by plain `HashSet`/`HashMap` rather than a
//! hand-rolled arena, since the packed traversal structure that needs to be
//! allocation-free lives in [`crate::gaddag`], not here.

use crate::config::tile_value;
use std::collections::{HashMap, HashSet};

/// Legal words, with the 2-letter allow-list kept separate since it takes
/// precedence over the main list for length-2 lookups (spec.md §3).
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: HashSet<String>,
    two_letter: HashSet<String>,
    front_hooks: Option<HashMap<String, Vec<char>>>,
    back_hooks: Option<HashMap<String, Vec<char>>>,
    base_scores: Option<HashMap<String, u32>>,
}

impl Dictionary {
    /// Builds a dictionary from a main word list (length >= 2) and an
    /// explicit 2-letter allow-list. Does not precompute hook/base-score
    /// indices; see [`Dictionary::with_indices`].
    pub fn build(
        words: impl IntoIterator<Item = String>,
        two_letter: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| w.to_ascii_uppercase())
                .filter(|w| w.len() >= 2)
                .collect(),
            two_letter: two_letter
                .into_iter()
                .map(|w| w.to_ascii_uppercase())
                .filter(|w| w.len() == 2)
                .collect(),
            front_hooks: None,
            back_hooks: None,
            base_scores: None,
        }
    }

    /// Precomputes front/back hook and base-score indices, per
    /// `engine/dictionary.py`'s startup pass.
    pub fn with_indices(mut self) -> Self {
        let mut front: HashMap<String, Vec<char>> = HashMap::new();
        let mut back: HashMap<String, Vec<char>> = HashMap::new();
        let mut scores: HashMap<String, u32> = HashMap::new();

        let all_words = self.words.iter().chain(self.two_letter.iter());
        for word in all_words.clone() {
            let score = word.chars().map(tile_value).sum();
            scores.insert(word.clone(), score);
        }
        for word in all_words {
            for letter in 'A'..='Z' {
                let candidate = format!("{letter}{word}");
                if self.is_valid(&candidate) {
                    front.entry(word.clone()).or_default().push(letter);
                }
                let candidate = format!("{word}{letter}");
                if self.is_valid(&candidate) {
                    back.entry(word.clone()).or_default().push(letter);
                }
            }
        }

        self.front_hooks = Some(front);
        self.back_hooks = Some(back);
        self.base_scores = Some(scores);
        self
    }

    /// `true` if `word` (case-insensitive) is a legal Crossplay word
    /// (spec.md §4.2). Length-2 words check the allow-list, not the main
    /// list.
    pub fn is_valid(&self, word: &str) -> bool {
        let word = word.to_ascii_uppercase();
        match word.len() {
            0 | 1 => false,
            2 => self.two_letter.contains(&word),
            _ => self.words.contains(&word),
        }
    }

    /// Letters `L` such that `L + word` is a legal word.
    pub fn get_front_hooks(&self, word: &str) -> Vec<char> {
        let word = word.to_ascii_uppercase();
        if let Some(index) = &self.front_hooks {
            return index.get(&word).cloned().unwrap_or_default();
        }
        ('A'..='Z')
            .filter(|l| self.is_valid(&format!("{l}{word}")))
            .collect()
    }

    /// Letters `L` such that `word + L` is a legal word.
    pub fn get_back_hooks(&self, word: &str) -> Vec<char> {
        let word = word.to_ascii_uppercase();
        if let Some(index) = &self.back_hooks {
            return index.get(&word).cloned().unwrap_or_default();
        }
        ('A'..='Z')
            .filter(|l| self.is_valid(&format!("{word}{l}")))
            .collect()
    }

    /// The unmultiplied point value of `word` (sum of tile values, no
    /// premiums) — the base-score index if present, otherwise computed on
    /// the fly.
    pub fn base_score(&self, word: &str) -> u32 {
        let word = word.to_ascii_uppercase();
        if let Some(index) = &self.base_scores {
            if let Some(&score) = index.get(&word) {
                return score;
            }
        }
        word.chars().map(tile_value).sum()
    }

    /// Every dictionary word of `pattern`'s length matching it position-wise
    /// (`?` in `pattern` is a wildcard) — spec.md §4.2 `find_words`.
    pub fn find_words(&self, pattern: &str) -> Vec<String> {
        let pattern: Vec<char> = pattern.to_ascii_uppercase().chars().collect();
        let candidates: Box<dyn Iterator<Item = &String>> = if pattern.len() == 2 {
            Box::new(self.two_letter.iter())
        } else {
            Box::new(self.words.iter())
        };
        candidates
            .filter(|w| word_matches_pattern(w, &pattern))
            .cloned()
            .collect()
    }

    /// Every dictionary word (any length) that can be formed from a subset
    /// of `rack` (letters plus `?` wildcards) — a natural complement to
    /// `find_words`, ported from `engine/dictionary.py::find_anagrams`.
    pub fn find_anagrams(&self, rack: &str) -> Vec<String> {
        let mut counts = [0i32; 27];
        for c in rack.to_ascii_uppercase().chars() {
            counts[rack_index(c)] += 1;
        }
        let all_words = self.words.iter().chain(self.two_letter.iter());
        all_words
            .filter(|w| can_form_from_rack(w, &counts))
            .cloned()
            .collect()
    }
}

fn rack_index(c: char) -> usize {
    if c == crate::config::BLANK {
        26
    } else {
        (c.to_ascii_uppercase() as usize) - ('A' as usize)
    }
}

fn can_form_from_rack(word: &str, rack_counts: &[i32; 27]) -> bool {
    let mut remaining = *rack_counts;
    'letters: for c in word.chars() {
        let idx = (c.to_ascii_uppercase() as usize) - ('A' as usize);
        if remaining[idx] > 0 {
            remaining[idx] -= 1;
            continue 'letters;
        }
        if remaining[26] > 0 {
            remaining[26] -= 1;
            continue 'letters;
        }
        return false;
    }
    true
}

fn word_matches_pattern(word: &str, pattern: &[char]) -> bool {
    if word.len() != pattern.len() {
        return false;
    }
    word.chars()
        .zip(pattern.iter())
        .all(|(w, &p)| p == '?' || w.to_ascii_uppercase() == p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        Dictionary::build(
            ["CAT", "CATS", "CARE", "CARES", "BAT", "RATS"]
                .iter()
                .map(|s| s.to_string()),
            ["AT", "TS", "BE"].iter().map(|s| s.to_string()),
        )
        .with_indices()
    }

    #[test]
    fn two_letter_allow_list_takes_precedence() {
        let dict = sample();
        assert!(dict.is_valid("AT"));
        assert!(!dict.is_valid("CA")); // not in the allow-list
        assert!(!dict.is_valid("A"));
    }

    #[test]
    fn longer_words_use_main_list() {
        let dict = sample();
        assert!(dict.is_valid("cares"));
        assert!(!dict.is_valid("CARZ"));
    }

    #[test]
    fn front_and_back_hooks_match_scan_fallback() {
        let dict = sample();
        let indexed = dict.get_back_hooks("CAT");
        let scanned: Vec<char> = ('A'..='Z')
            .filter(|l| dict.is_valid(&format!("CAT{l}")))
            .collect();
        assert_eq!(indexed, scanned);
        assert!(indexed.contains(&'S'));
    }

    #[test]
    fn find_words_matches_pattern_with_wildcards() {
        let dict = sample();
        let matches = dict.find_words("CA??");
        assert!(matches.contains(&"CATS".to_string()));
        assert!(matches.contains(&"CARE".to_string()));
    }

    #[test]
    fn find_anagrams_respects_blank_as_wildcard() {
        let dict = sample();
        let matches = dict.find_anagrams("CA?");
        assert!(matches.contains(&"CAT".to_string()) || matches.contains(&"BAT".to_string()));
    }

    #[test]
    fn base_score_sums_tile_values() {
        let dict = sample();
        // C(3) + A(1) + T(1) = 5
        assert_eq!(dict.base_score("CAT"), 5);
    }
}
