//! Lexical value calculation.
//!
//! `score = Σ contribution(match) + intercept`, where a match contributes
//! - `Binary`:    its weight, once, however often the word occurred;
//! - `Frequency`: `(count / word_count) * weight`.
//!
//! Intercepts are the constants of each lexicon's published regression
//! calibration and live in [`intercepts`].

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::matcher::CategoryMatches;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Binary,
    Frequency,
}

/// Weighted sum of `matches` plus `intercept`.
///
/// Errors (`MissingMatches`, `InvalidWordCount`) are the "no score" cases;
/// callers surface them as `None` rather than NaN/infinity.
pub fn score(
    matches: Option<&CategoryMatches>,
    word_count: usize,
    intercept: f64,
    encoding: Encoding,
) -> Result<f64> {
    let matches = matches.ok_or(AnalysisError::MissingMatches)?;
    if word_count == 0 {
        return Err(AnalysisError::InvalidWordCount);
    }
    let wc = word_count as f64;
    let sum: f64 = matches
        .matches
        .iter()
        .map(|m| match encoding {
            Encoding::Binary => m.weight,
            Encoding::Frequency => (m.count as f64 / wc) * m.weight,
        })
        .sum();
    Ok(sum + intercept)
}

/// [`score`] with the error collapsed into the `None` sentinel.
pub fn score_or_none(
    matches: Option<&CategoryMatches>,
    word_count: usize,
    intercept: f64,
    encoding: Encoding,
) -> Option<f64> {
    match score(matches, word_count, intercept, encoding) {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Round half away from zero to `places` decimals (report formatting).
pub fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

pub mod intercepts {
    //! Closed intercept tables, versioned with the lexicon files they calibrate.

    pub const PERMA_DIMENSIONS: [&str; 10] = [
        "POS_P", "POS_E", "POS_R", "POS_M", "POS_A", "NEG_P", "NEG_E", "NEG_R", "NEG_M", "NEG_A",
    ];

    /// dd_spermaV3 (Spanish, data-driven).
    pub const PERMA_SPANISH: [(&str, f64); 10] = [
        ("POS_P", 2.675173871),
        ("POS_E", 2.055179283),
        ("POS_R", 1.977389757),
        ("POS_M", 1.738298902),
        ("POS_A", 3.414517804),
        ("NEG_P", 2.50468297),
        ("NEG_E", 1.673629622),
        ("NEG_R", 1.782788984),
        ("NEG_M", 1.52890284),
        ("NEG_A", 2.482131179),
    ];

    pub const PROSPECTION: [(&str, f64); 3] = [
        ("PAST", -0.649406376419),
        ("PRESENT", 0.236749577324),
        ("FUTURE", -0.570547567181),
    ];

    pub const AFFECT: [(&str, f64); 2] = [("AFFECT", 5.037104721), ("INTENSITY", 2.399762631)];

    pub const BIG_FIVE: [(&str, f64); 5] = [("O", 0.0), ("C", 0.0), ("E", 0.0), ("A", 0.0), ("N", 0.0)];

    pub const DARK_TRIAD: [(&str, f64); 4] = [
        ("darktriad", 0.632024388686),
        ("machiavellianism", 0.596743883684),
        ("narcissism", 0.714881303759),
        ("psychopathy", 0.48892463341),
    ];

    pub const AGE: f64 = 23.2188604687;
    pub const GENDER: f64 = -0.06724152;

    pub fn lookup(table: &[(&str, f64)], category: &str) -> f64 {
        table
            .iter()
            .find(|(name, _)| *name == category)
            .map_or(0.0, |(_, v)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Match;

    fn cat(entries: &[(&str, f64, usize)]) -> CategoryMatches {
        CategoryMatches {
            name: "POS_P".into(),
            matches: entries
                .iter()
                .map(|&(w, weight, count)| Match {
                    word: w.into(),
                    weight,
                    count,
                })
                .collect(),
        }
    }

    #[test]
    fn binary_ignores_repetition() {
        let once = cat(&[("love", 1.5, 1)]);
        let five = cat(&[("love", 1.5, 5)]);
        assert_eq!(score(Some(&once), 10, 0.0, Encoding::Binary).unwrap(), 1.5);
        assert_eq!(score(Some(&five), 10, 0.0, Encoding::Binary).unwrap(), 1.5);
    }

    #[test]
    fn frequency_scales_with_count_and_word_count() {
        let c1 = cat(&[("love", 2.0, 1)]);
        let c3 = cat(&[("love", 2.0, 3)]);
        let a = score(Some(&c1), 10, 0.0, Encoding::Frequency).unwrap();
        let b = score(Some(&c3), 10, 0.0, Encoding::Frequency).unwrap();
        let c = score(Some(&c3), 20, 0.0, Encoding::Frequency).unwrap();
        assert!((a - 0.2).abs() < 1e-12);
        assert!((b - 3.0 * a).abs() < 1e-12);
        assert!((c - b / 2.0).abs() < 1e-12);
    }

    #[test]
    fn intercept_is_added_after_the_sum() {
        let c = cat(&[("a", 1.0, 1), ("b", -0.25, 2)]);
        let v = score(Some(&c), 4, 5.0, Encoding::Binary).unwrap();
        assert!((v - 5.75).abs() < 1e-12);
        let empty = cat(&[]);
        assert_eq!(score(Some(&empty), 4, -0.5, Encoding::Binary).unwrap(), -0.5);
    }

    #[test]
    fn zero_word_count_and_missing_category_are_no_score() {
        let c = cat(&[("a", 1.0, 1)]);
        assert_eq!(
            score(Some(&c), 0, 0.0, Encoding::Frequency),
            Err(AnalysisError::InvalidWordCount)
        );
        assert_eq!(
            score(None, 5, 0.0, Encoding::Binary),
            Err(AnalysisError::MissingMatches)
        );
        assert_eq!(score_or_none(Some(&c), 0, 0.0, Encoding::Binary), None);
        assert_eq!(score_or_none(None, 5, 0.0, Encoding::Binary), None);
    }

    #[test]
    fn intercept_lookup_defaults_to_zero() {
        assert_eq!(intercepts::lookup(&intercepts::PROSPECTION, "FUTURE"), -0.570547567181);
        assert_eq!(intercepts::lookup(&intercepts::PROSPECTION, "NOPE"), 0.0);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(3.0, 3), 3.0);
    }
}
