//! In-memory lexicon model and JSON normalization.
//!
//! Two file shapes are accepted and normalized into [`Lexicon`]:
//!
//! ```json
//! { "POS_P": { "happy": 0.52, "joy": 0.41 }, "NEG_P": { "sad": -0.3 } }
//! ```
//!
//! ```json
//! { "1": { "term": "happy", "weight": 0.52, "category": "POS_P" } }
//! ```
//!
//! Category order and word order follow the file; printable word lists
//! depend on that order.

pub mod source;
pub mod store;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::matcher::boundary_regex;

pub use source::{FsSource, HttpSource, LexiconSource};
pub use store::LexiconStore;

/// Every lexicon the analyzer knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexiconId {
    PermaDd,
    PermaManual,
    PermaManualTsp75,
    PermaSpanish,
    Prospection,
    Affect,
    Age,
    Gender,
    BigFive,
    DarkTriad,
}

impl LexiconId {
    pub const ALL: [LexiconId; 10] = [
        LexiconId::PermaDd,
        LexiconId::PermaManual,
        LexiconId::PermaManualTsp75,
        LexiconId::PermaSpanish,
        LexiconId::Prospection,
        LexiconId::Affect,
        LexiconId::Age,
        LexiconId::Gender,
        LexiconId::BigFive,
        LexiconId::DarkTriad,
    ];

    /// Path of the lexicon file relative to the source root.
    pub fn path(self) -> &'static str {
        match self {
            LexiconId::PermaDd => "json/perma/permaV3_dd.json",
            LexiconId::PermaManual => "json/perma/permaV3_manual.json",
            LexiconId::PermaManualTsp75 => "json/perma/permaV3_manual_tsp75.json",
            LexiconId::PermaSpanish => "json/perma/dd_spermaV3.json",
            LexiconId::Prospection => "json/prospection/prospection.json",
            LexiconId::Affect => "json/affect/affect.json",
            LexiconId::Age => "json/age/age.json",
            LexiconId::Gender => "json/gender/gender.json",
            LexiconId::BigFive => "json/bigfive/bigfive.json",
            LexiconId::DarkTriad => "json/dark/darktriad.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LexiconId::PermaDd => "perma_dd",
            LexiconId::PermaManual => "perma_manual",
            LexiconId::PermaManualTsp75 => "perma_manual_tsp75",
            LexiconId::PermaSpanish => "perma_spanish",
            LexiconId::Prospection => "prospection",
            LexiconId::Affect => "affect",
            LexiconId::Age => "age",
            LexiconId::Gender => "gender",
            LexiconId::BigFive => "big_five",
            LexiconId::DarkTriad => "dark_triad",
        }
    }
}

impl fmt::Display for LexiconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (word or phrase, weight) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexiconEntry {
    pub word: String,
    pub weight: f64,
}

/// A named category: ordered entries plus a word index for uniqueness.
#[derive(Debug, Clone, Default)]
pub struct Category {
    name: String,
    entries: Vec<LexiconEntry>,
    index: HashMap<String, usize>,
    /// Boundary patterns per entry, compiled on first boundary match.
    boundary: OnceCell<Vec<Option<Regex>>>,
}

impl Category {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn weight(&self, word: &str) -> Option<f64> {
        self.index.get(word).map(|&i| self.entries[i].weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// [`crate::matcher::boundary_regex`] of each entry, in entry order.
    ///
    /// Compiled once; lexica live behind `Arc` in the store, so every
    /// analysis after the first reuses them.
    pub fn boundary_patterns(&self) -> &[Option<Regex>] {
        self.boundary.get_or_init(|| {
            self.entries
                .iter()
                .map(|e| {
                    if e.word.is_empty() {
                        None
                    } else {
                        boundary_regex(&e.word).ok()
                    }
                })
                .collect()
        })
    }

    /// Insert or overwrite; word keys stay unique and keep their first position.
    fn upsert(&mut self, word: &str, weight: f64) {
        self.boundary = OnceCell::new();
        match self.index.get(word) {
            Some(&i) => self.entries[i].weight = weight,
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push(LexiconEntry {
                    word: word.to_string(),
                    weight,
                });
            }
        }
    }
}

/// Category name → (word → weight), in file order.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    categories: Vec<Category>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) `word` in `category`, creating the category on first use.
    pub fn insert(&mut self, category: &str, word: &str, weight: f64) {
        let idx = match self.categories.iter().position(|c| c.name == category) {
            Some(i) => i,
            None => {
                self.categories.push(Category::new(category));
                self.categories.len() - 1
            }
        };
        self.categories[idx].upsert(word, weight);
    }

    /// Builder-style [`Lexicon::insert`].
    pub fn with(mut self, category: &str, word: &str, weight: f64) -> Self {
        self.insert(category, word, weight);
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total entry count over all categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    /// Parse either supported file shape.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let root: Value = serde_json::from_str(raw)?;
        Self::from_json_value(&root)
    }

    pub fn from_json_value(root: &Value) -> anyhow::Result<Self> {
        let Value::Object(map) = root else {
            anyhow::bail!("lexicon root must be a JSON object");
        };
        if is_record_shape(map) {
            parse_records(map)
        } else {
            parse_categories(map)
        }
    }
}

/// `{id: {term, weight, category}}`: every value is an object carrying a `term`.
fn is_record_shape(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map
            .values()
            .all(|v| v.as_object().is_some_and(|o| o.contains_key("term")))
}

fn parse_categories(map: &Map<String, Value>) -> anyhow::Result<Lexicon> {
    let mut lex = Lexicon::new();
    for (cat, words) in map {
        let Value::Object(words) = words else {
            anyhow::bail!("category `{cat}` must map words to weights");
        };
        // Keep empty categories: scoring an empty category is a valid zero.
        if words.is_empty() {
            lex.categories.push(Category::new(cat));
        }
        for (word, weight) in words {
            let w = parse_weight(weight)
                .ok_or_else(|| anyhow::anyhow!("`{cat}`/`{word}`: weight is not a number"))?;
            lex.insert(cat, word, w);
        }
    }
    Ok(lex)
}

fn parse_records(map: &Map<String, Value>) -> anyhow::Result<Lexicon> {
    #[derive(Deserialize)]
    struct Record {
        term: String,
        weight: Value,
        category: String,
    }

    let mut lex = Lexicon::new();
    for (id, raw) in map {
        let rec: Record = serde_json::from_value(raw.clone())
            .map_err(|e| anyhow::anyhow!("record `{id}`: {e}"))?;
        let w = parse_weight(&rec.weight)
            .ok_or_else(|| anyhow::anyhow!("record `{id}`: weight is not a number"))?;
        lex.insert(&rec.category, &rec.term, w);
    }
    Ok(lex)
}

fn parse_weight(v: &Value) -> Option<f64> {
    let w = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    w.filter(|w| w.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_shape_in_file_order() {
        let lex = Lexicon::from_json_str(
            r#"{"POS_P": {"happy": 0.5, "joy": "0.25"}, "NEG_P": {"sad": -0.3}}"#,
        )
        .unwrap();
        let names: Vec<_> = lex.categories().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["POS_P", "NEG_P"]);
        let pos = lex.category("POS_P").unwrap();
        let words: Vec<_> = pos.entries().iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["happy", "joy"]);
        assert_eq!(pos.weight("joy"), Some(0.25));
        assert_eq!(lex.len(), 3);
    }

    #[test]
    fn parses_record_shape_grouping_by_category() {
        let lex = Lexicon::from_json_str(
            r#"{
                "0": {"term": "was", "weight": 0.2, "category": "PAST"},
                "1": {"term": "will", "weight": 0.4, "category": "FUTURE"},
                "2": {"term": "had", "weight": 0.1, "category": "PAST"}
            }"#,
        )
        .unwrap();
        assert_eq!(lex.categories().len(), 2);
        assert_eq!(lex.category("PAST").unwrap().len(), 2);
        assert_eq!(lex.category("FUTURE").unwrap().weight("will"), Some(0.4));
    }

    #[test]
    fn duplicate_records_do_not_duplicate_entries() {
        let lex = Lexicon::from_json_str(
            r#"{
                "a": {"term": "good", "weight": 1.0, "category": "POS_P"},
                "b": {"term": "good", "weight": 2.0, "category": "POS_P"}
            }"#,
        )
        .unwrap();
        let cat = lex.category("POS_P").unwrap();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.weight("good"), Some(2.0));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(Lexicon::from_json_str("[]").is_err());
        assert!(Lexicon::from_json_str(r#"{"POS_P": 3}"#).is_err());
        let err = Lexicon::from_json_str(r#"{"POS_P": {"x": true}}"#).unwrap_err();
        assert!(err.to_string().contains("POS_P"));
    }

    #[test]
    fn ids_have_stable_paths() {
        assert_eq!(LexiconId::PermaDd.path(), "json/perma/permaV3_dd.json");
        assert_eq!(LexiconId::DarkTriad.to_string(), "dark_triad");
        assert_eq!(LexiconId::ALL.len(), 10);
    }
}
