// src/report.rs
//! Aggregated results of one analysis.
//!
//! Every family follows the same path: match set → counts → scores →
//! printable word lists. Maps are `BTreeMap` so the JSON output is stable.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::lexicon::LexiconId;
use crate::matcher::MatchSet;
use crate::scoring::{round_to, score_or_none, Encoding};

/// Key used for the family-wide match total in `counts`.
pub const TOTAL: &str = "TOTAL";

/// Positive vs negative PERMA balance, rendered as a sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioStatement {
    NoMatches,
    AllPositive,
    AllNegative,
    Equal,
    /// `NEG_T / POS_T`, when negatives dominate.
    MoreNegative(f64),
    /// `POS_T / NEG_T`, when positives dominate.
    MorePositive(f64),
}

impl RatioStatement {
    pub fn from_totals(positive: usize, negative: usize) -> Self {
        match (positive, negative) {
            (0, 0) => RatioStatement::NoMatches,
            (0, _) => RatioStatement::AllNegative,
            (_, 0) => RatioStatement::AllPositive,
            (p, n) if p == n => RatioStatement::Equal,
            (p, n) if p < n => RatioStatement::MoreNegative(n as f64 / p as f64),
            (p, n) => RatioStatement::MorePositive(p as f64 / n as f64),
        }
    }
}

impl fmt::Display for RatioStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioStatement::NoMatches => f.write_str("There were no PERMA matches in the input."),
            RatioStatement::AllPositive => {
                f.write_str("Of the matches, 100% were positive PERMA matches.")
            }
            RatioStatement::AllNegative => {
                f.write_str("Of the matches, 100% were negative PERMA matches.")
            }
            RatioStatement::Equal => {
                f.write_str("There are an equal number of positive and negative PERMA matches.")
            }
            RatioStatement::MoreNegative(r) => write!(
                f,
                "For every positive PERMA match there are {r:.3} times as many negative PERMA matches."
            ),
            RatioStatement::MorePositive(r) => write!(
                f,
                "For every negative PERMA match there are {r:.3} times as many positive PERMA matches."
            ),
        }
    }
}

impl Serialize for RatioStatement {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// `part / whole * 100`, rounded to 2 decimals; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 2)
}

/// Counts, scores and printable words of one lexicon family.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FamilyReport {
    /// Per-category occurrence counts plus [`TOTAL`].
    pub counts: BTreeMap<String, usize>,
    pub scores: BTreeMap<String, Option<f64>>,
    pub words: BTreeMap<String, Vec<String>>,
}

impl FamilyReport {
    /// Score `scored` categories of `set` against `intercepts` (missing → 0).
    pub fn build(
        set: &MatchSet,
        scored: &[&str],
        intercepts: &[(&str, f64)],
        word_count: usize,
        encoding: Encoding,
    ) -> Self {
        let mut counts: BTreeMap<String, usize> = set
            .categories
            .iter()
            .map(|c| (c.name.clone(), c.count()))
            .collect();
        counts.insert(TOTAL.to_string(), set.total(""));

        let scores = scored
            .iter()
            .map(|&cat| {
                let intercept = crate::scoring::intercepts::lookup(intercepts, cat);
                (
                    cat.to_string(),
                    score_or_none(set.get(cat), word_count, intercept, encoding),
                )
            })
            .collect();

        Self {
            counts,
            scores,
            words: set.printable().into_iter().collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.counts.get(TOTAL).copied().unwrap_or(0)
    }

    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn score(&self, category: &str) -> Option<f64> {
        self.scores.get(category).copied().flatten()
    }
}

/// The root well-being report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermaReport {
    pub lexicon: LexiconId,
    /// Lexical values come from a data-driven (regression calibrated) lexicon.
    pub calibrated: bool,
    #[serde(flatten)]
    pub family: FamilyReport,
    pub positive_total: usize,
    pub negative_total: usize,
    pub neutral: usize,
    pub match_percent: f64,
    pub neutral_percent: f64,
    pub ratio: RatioStatement,
}

impl PermaReport {
    pub fn build(
        lexicon: LexiconId,
        calibrated: bool,
        set: &MatchSet,
        intercepts: &[(&str, f64)],
        word_count: usize,
        encoding: Encoding,
    ) -> Self {
        let family = FamilyReport::build(
            set,
            &crate::scoring::intercepts::PERMA_DIMENSIONS,
            intercepts,
            word_count,
            encoding,
        );
        let positive_total = set.total("POS");
        let negative_total = set.total("NEG");
        let total = family.total();
        let neutral = word_count.saturating_sub(total);
        Self {
            lexicon,
            calibrated,
            positive_total,
            negative_total,
            neutral,
            match_percent: percent(total, word_count),
            neutral_percent: percent(neutral, word_count),
            ratio: RatioStatement::from_totals(positive_total, negative_total),
            family,
        }
    }

    pub fn total(&self) -> usize {
        self.family.total()
    }
}

/// FUTURE-oriented words re-scored against the affect lexicon.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimismReport {
    /// FUTURE words fed to the affect lexicon, one per occurrence.
    pub future_words: Vec<String>,
    pub count: usize,
    pub score: Option<f64>,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderLabel {
    Male,
    Female,
    Unknown,
}

impl GenderLabel {
    /// Negative leans male, positive leans female; zero or no score is unknown.
    pub fn from_value(v: Option<f64>) -> Self {
        match v {
            Some(v) if v < 0.0 => GenderLabel::Male,
            Some(v) if v > 0.0 => GenderLabel::Female,
            _ => GenderLabel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicsReport {
    /// Predicted age in years, 2 decimals.
    pub age: Option<f64>,
    pub gender: Option<f64>,
    pub gender_label: GenderLabel,
}

impl DemographicsReport {
    pub fn new(age: Option<f64>, gender: Option<f64>) -> Self {
        Self {
            age: age.map(|a| round_to(a, 2)),
            gender,
            gender_label: GenderLabel::from_value(gender),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Frequency denominator (tokens, plus n-grams when they are counted).
    pub word_count: usize,
    /// Whitespace-separated words of the input.
    pub true_word_count: usize,
    /// Tokens before n-gram expansion.
    pub token_count: usize,
    pub perma: PermaReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prospection: Option<FamilyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affect: Option<FamilyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimism: Option<OptimismReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_five: Option<FamilyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_triad: Option<FamilyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<DemographicsReport>,
    /// Families skipped on this call and why.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::matcher::Matcher;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn ratio_statements() {
        assert_eq!(
            RatioStatement::from_totals(0, 5).to_string(),
            "Of the matches, 100% were negative PERMA matches."
        );
        assert_eq!(
            RatioStatement::from_totals(4, 0).to_string(),
            "Of the matches, 100% were positive PERMA matches."
        );
        assert_eq!(
            RatioStatement::from_totals(0, 0).to_string(),
            "There were no PERMA matches in the input."
        );
        assert_eq!(RatioStatement::from_totals(3, 3), RatioStatement::Equal);
        assert_eq!(
            RatioStatement::from_totals(2, 6).to_string(),
            "For every positive PERMA match there are 3.000 times as many negative PERMA matches."
        );
        assert_eq!(
            RatioStatement::from_totals(7, 3).to_string(),
            "For every negative PERMA match there are 2.333 times as many positive PERMA matches."
        );
    }

    #[test]
    fn perma_report_totals_and_percentages() {
        let lex = Lexicon::new()
            .with("POS_E", "love", 1.5)
            .with("POS_R", "friends", 2.0)
            .with("NEG_E", "hate", -1.0);
        let toks = tokens("i love my job and my friends");
        let set = Matcher::default().match_lexicon(&toks, &lex);
        let r = PermaReport::build(LexiconId::PermaManual, false, &set, &[], 7, Encoding::Binary);

        assert_eq!(r.positive_total, 2);
        assert_eq!(r.negative_total, 0);
        assert_eq!(r.total(), 2);
        assert_eq!(r.neutral, 5);
        assert_eq!(r.match_percent, 28.57);
        assert_eq!(r.neutral_percent, 71.43);
        assert_eq!(r.ratio, RatioStatement::AllPositive);
        assert_eq!(r.family.score("POS_E"), Some(1.5));
        assert_eq!(r.family.score("NEG_E"), Some(0.0));
        // Dimension missing from the lexicon has no score.
        assert_eq!(r.family.score("POS_M"), None);
        assert_eq!(r.family.words["POS_R"], vec!["friends"]);
    }

    #[test]
    fn family_report_counts_repeats_and_serializes_total() {
        let lex = Lexicon::new()
            .with("PAST", "was", 0.2)
            .with("FUTURE", "will", 0.4);
        let set = Matcher::default().match_lexicon(&tokens("i will go and will stay"), &lex);
        let f = FamilyReport::build(&set, &["PAST", "FUTURE"], &[("FUTURE", 1.0)], 6, Encoding::Binary);
        assert_eq!(f.count("FUTURE"), 2);
        assert_eq!(f.count("PAST"), 0);
        assert_eq!(f.total(), 2);
        assert!((f.score("FUTURE").unwrap() - 1.4).abs() < 1e-12);
        assert_eq!(f.words["FUTURE"], vec!["will[2]"]);

        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["counts"]["TOTAL"], 2);
    }

    #[test]
    fn gender_labels() {
        assert_eq!(GenderLabel::from_value(Some(-0.2)), GenderLabel::Male);
        assert_eq!(GenderLabel::from_value(Some(0.4)), GenderLabel::Female);
        assert_eq!(GenderLabel::from_value(Some(0.0)), GenderLabel::Unknown);
        assert_eq!(GenderLabel::from_value(None), GenderLabel::Unknown);
        let d = DemographicsReport::new(Some(23.218_86), Some(-0.1));
        assert_eq!(d.age, Some(23.22));
        assert_eq!(d.gender_label, GenderLabel::Male);
    }

    #[test]
    fn percent_of_zero_is_zero() {
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }
}
