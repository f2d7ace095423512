// src/matcher.rs
//! Token → lexicon matching.
//!
//! For every category, every lexicon entry is tested against the token
//! sequence. A word seen `k` times yields ONE match with `count == k`, so the
//! category count is the number of occurrences, not distinct words.
//!
//! Two strategies exist:
//! - `ExactToken` (default): the entry must equal a whole token.
//! - `BoundaryRegex`: the escaped entry is searched in the space-joined tokens,
//!   with `\b` anchors when the entry starts/ends with a letter. This agrees
//!   with `ExactToken` on single words, but may differ on multi-word phrases
//!   and on entries that start or end with punctuation. Pass it the tokens
//!   before n-gram expansion; the joined text already holds every phrase, and
//!   synthesized n-grams would repeat each word inside them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::lexicon::Lexicon;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    #[default]
    ExactToken,
    BoundaryRegex,
}

/// Inclusive weight window for calibrated (data-driven) PERMA categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn contains(&self, w: f64) -> bool {
        w >= self.min && w <= self.max
    }
}

/// Thresholds only ever apply to PERMA-style weighted categories.
pub fn is_perma_category(name: &str) -> bool {
    name.starts_with("POS") || name.starts_with("NEG")
}

/// A matched lexicon word and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub word: String,
    pub weight: f64,
    pub count: usize,
}

impl Match {
    pub fn is_repeated(&self) -> bool {
        self.count > 1
    }

    /// The word repeated once per occurrence.
    pub fn occurrences(&self) -> impl Iterator<Item = &str> {
        std::iter::repeat(self.word.as_str()).take(self.count)
    }

    /// `word`, or `word[k]` for repeated matches.
    pub fn printable(&self) -> String {
        if self.is_repeated() {
            format!("{}[{}]", self.word, self.count)
        } else {
            self.word.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryMatches {
    pub name: String,
    pub matches: Vec<Match>,
}

impl CategoryMatches {
    /// Total occurrences across all matched words.
    pub fn count(&self) -> usize {
        self.matches.iter().map(|m| m.count).sum()
    }

    pub fn printable(&self) -> Vec<String> {
        self.matches.iter().map(Match::printable).collect()
    }
}

/// Per-category matches for one lexicon, in lexicon order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSet {
    pub categories: Vec<CategoryMatches>,
}

impl MatchSet {
    pub fn get(&self, name: &str) -> Option<&CategoryMatches> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Occurrence count for one category (0 when the lexicon lacks it).
    pub fn count(&self, name: &str) -> usize {
        self.get(name).map_or(0, CategoryMatches::count)
    }

    /// Matched words of every category starting with `prefix`, one entry per
    /// occurrence. A word matched by several of those categories is only
    /// taken from the first one.
    pub fn words(&self, prefix: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cat in self.categories.iter().filter(|c| c.name.starts_with(prefix)) {
            for m in &cat.matches {
                if seen.insert(m.word.as_str()) {
                    out.extend(m.occurrences().map(str::to_string));
                }
            }
        }
        out
    }

    /// `words(prefix).len()` without building the list.
    pub fn total(&self, prefix: &str) -> usize {
        let mut seen = HashSet::new();
        self.categories
            .iter()
            .filter(|c| c.name.starts_with(prefix))
            .flat_map(|c| c.matches.iter())
            .filter(|m| seen.insert(m.word.as_str()))
            .map(|m| m.count)
            .sum()
    }

    /// Category → compacted word list (`word` / `word[k]`).
    pub fn printable(&self) -> Vec<(String, Vec<String>)> {
        self.categories
            .iter()
            .map(|c| (c.name.clone(), c.printable()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    strategy: MatchStrategy,
    thresholds: Option<WeightRange>,
}

impl Matcher {
    /// `thresholds` is `Some` only for data-driven lexicon variants.
    pub fn new(strategy: MatchStrategy, thresholds: Option<WeightRange>) -> Self {
        Self {
            strategy,
            thresholds,
        }
    }

    pub fn match_lexicon(&self, tokens: &[String], lexicon: &Lexicon) -> MatchSet {
        let counter = OccurrenceCounter::new(self.strategy, tokens);
        let categories = lexicon
            .categories()
            .iter()
            .map(|cat| {
                let filter = self.thresholds.filter(|_| is_perma_category(cat.name()));
                let patterns: &[Option<Regex>] = match self.strategy {
                    MatchStrategy::ExactToken => &[],
                    MatchStrategy::BoundaryRegex => cat.boundary_patterns(),
                };
                let matches = cat
                    .entries()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, e)| {
                        let pattern = patterns.get(i).and_then(Option::as_ref);
                        let count = counter.count(&e.word, pattern);
                        if count == 0 {
                            return None;
                        }
                        if filter.is_some_and(|r| !r.contains(e.weight)) {
                            return None;
                        }
                        Some(Match {
                            word: e.word.clone(),
                            weight: e.weight,
                            count,
                        })
                    })
                    .collect();
                CategoryMatches {
                    name: cat.name().to_string(),
                    matches,
                }
            })
            .collect();
        MatchSet { categories }
    }
}

enum OccurrenceCounter {
    Exact(HashMap<String, usize>),
    Boundary(String),
}

impl OccurrenceCounter {
    fn new(strategy: MatchStrategy, tokens: &[String]) -> Self {
        match strategy {
            MatchStrategy::ExactToken => {
                let mut counts = HashMap::with_capacity(tokens.len());
                for t in tokens {
                    *counts.entry(t.clone()).or_insert(0) += 1;
                }
                OccurrenceCounter::Exact(counts)
            }
            MatchStrategy::BoundaryRegex => OccurrenceCounter::Boundary(tokens.join(" ")),
        }
    }

    /// `pattern` is the entry's precompiled boundary regex, if any.
    fn count(&self, word: &str, pattern: Option<&Regex>) -> usize {
        match self {
            OccurrenceCounter::Exact(counts) => counts.get(word).copied().unwrap_or(0),
            OccurrenceCounter::Boundary(text) => {
                pattern.map_or(0, |re| re.find_iter(text).count())
            }
        }
    }
}

/// Escape `word` and add `\b` anchors where the word starts (and ends) with a letter.
///
/// The trailing anchor is added only when the leading one is, and only if
/// some letter in the entry is followed by whitespace or the end, so entries
/// ending in punctuation (`"great!"`) or single letters (`"o"`) still match on
/// their own and not inside other words.
pub fn boundary_regex(word: &str) -> Result<Regex, regex::Error> {
    let starts_alpha = word.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    let mut pat = regex::escape(word);
    if starts_alpha {
        pat.insert_str(0, r"\b");
        if letter_before_space_or_end(word) {
            pat.push_str(r"\b");
        }
    }
    Regex::new(&pat)
}

fn letter_before_space_or_end(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars.iter().enumerate().any(|(i, c)| {
        c.is_ascii_alphabetic() && chars.get(i + 1).map_or(true, |n| n.is_whitespace())
    })
}
