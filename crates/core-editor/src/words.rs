//! Global word-frequency table backing autocomplete.
//!
//! The table is rebuilt by scanning every open document's word runs, with an
//! optional static dictionary merged in below live words. Suggestions are the
//! prefix matches ordered by weight descending, then word ascending, a
//! total, stable order. Accepting a suggestion locks its weight to the
//! maximum so it dominates future rankings, including across rebuilds.

use core_text::boundary::is_word_char;
use std::collections::{HashMap, HashSet};

/// Weight assigned to an accepted suggestion.
pub const LOCKED_WEIGHT: u32 = u32::MAX / 2;

/// Weight added per occurrence in an open document.
const LIVE_WEIGHT: u32 = 4;
/// Weight of a dictionary word not seen in any document.
const DICT_WEIGHT: u32 = 1;
/// Shorter runs are noise, not completion candidates.
const MIN_WORD_LEN: usize = 2;

#[derive(Default)]
pub struct WordTable {
    weights: HashMap<String, u32>,
    dictionary: Vec<String>,
    locked: HashSet<String>,
}

impl WordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dictionary(&mut self, words: impl IntoIterator<Item = String>) {
        self.dictionary = words
            .into_iter()
            .filter(|w| w.chars().count() >= MIN_WORD_LEN)
            .collect();
    }

    /// Rescan the given document texts from scratch.
    pub fn rebuild<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.weights.clear();
        for text in texts {
            let mut run = String::new();
            for c in text.as_ref().chars().chain(std::iter::once('\n')) {
                if is_word_char(c) {
                    run.push(c);
                    continue;
                }
                if run.chars().count() >= MIN_WORD_LEN {
                    *self.weights.entry(std::mem::take(&mut run)).or_insert(0) += LIVE_WEIGHT;
                } else {
                    run.clear();
                }
            }
        }
        for w in &self.dictionary {
            self.weights.entry(w.clone()).or_insert(DICT_WEIGHT);
        }
        for w in &self.locked {
            self.weights.insert(w.clone(), LOCKED_WEIGHT);
        }
    }

    /// Pin a word at the maximum weight, surviving rebuilds.
    pub fn lock_in(&mut self, word: &str) {
        self.locked.insert(word.to_string());
        self.weights.insert(word.to_string(), LOCKED_WEIGHT);
    }

    /// Completion candidates for `prefix`: strict extensions only, ordered by
    /// (weight desc, word asc).
    pub fn suggest(&self, prefix: &str) -> Vec<String> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<(&String, u32)> = self
            .weights
            .iter()
            .filter(|(w, _)| w.starts_with(prefix) && w.as_str() != prefix)
            .map(|(w, &n)| (w, n))
            .collect();
        hits.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hits.into_iter().map(|(w, _)| w.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frequency_orders_before_alphabet() {
        let mut t = WordTable::new();
        t.rebuild(["alpha beta alpha alpha beta banana"]);
        assert_eq!(t.suggest("a"), vec!["alpha"]);
        // "beta" appears twice, "banana" once; frequency wins.
        assert_eq!(t.suggest("b"), vec!["beta", "banana"]);
    }

    #[test]
    fn ties_break_alphabetically() {
        let mut t = WordTable::new();
        t.rebuild(["zebra zulu"]);
        assert_eq!(t.suggest("z"), vec!["zebra", "zulu"]);
    }

    #[test]
    fn exact_prefix_is_not_its_own_suggestion() {
        let mut t = WordTable::new();
        t.rebuild(["word word wordy"]);
        assert_eq!(t.suggest("word"), vec!["wordy"]);
    }

    #[test]
    fn dictionary_ranks_below_live_words() {
        let mut t = WordTable::new();
        t.set_dictionary(["apple".to_string(), "apricot".to_string()]);
        t.rebuild(["apricot fn"]);
        assert_eq!(t.suggest("ap"), vec!["apricot", "apple"]);
    }

    #[test]
    fn locked_words_dominate_and_survive_rebuild() {
        let mut t = WordTable::new();
        t.rebuild(["aaa aaa aaa aab"]);
        assert_eq!(t.suggest("aa"), vec!["aaa", "aab"]);
        t.lock_in("aab");
        assert_eq!(t.suggest("aa"), vec!["aab", "aaa"]);
        t.rebuild(["aaa aaa aaa aab"]);
        assert_eq!(t.suggest("aa"), vec!["aab", "aaa"]);
    }

    #[test]
    fn short_runs_are_skipped() {
        let mut t = WordTable::new();
        t.rebuild(["a ab"]);
        assert_eq!(t.suggest("a"), vec!["ab"]);
    }
}
