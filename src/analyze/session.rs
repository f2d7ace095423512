// src/analyze/session.rs
//! Per-call analysis state and the synchronous scoring pass.

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::config::{AnalysisConfig, Features};
use crate::error::{AnalysisError, Result};
use crate::lexicon::{Lexicon, LexiconId, LexiconStore};
use crate::matcher::{MatchSet, MatchStrategy, Matcher};
use crate::ngrams;
use crate::report::{
    AnalysisReport, DemographicsReport, FamilyReport, OptimismReport, PermaReport,
};
use crate::scoring::{intercepts, score_or_none, Encoding};
use crate::telemetry::{anon_hash, ensure_metrics_described};
use crate::tokenize::{tokenize, true_word_count};

/// Transient state of one invocation. Built, scored, dropped.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    /// Trimmed, lower-cased input.
    pub text: String,
    /// Tokens before n-gram expansion (what the export writes).
    pub base_tokens: Vec<String>,
    /// Tokens the matcher sees.
    pub tokens: Vec<String>,
    /// Frequency denominator.
    pub word_count: usize,
    pub true_word_count: usize,
}

impl AnalysisSession {
    pub fn new(text: &str, config: &AnalysisConfig) -> Result<Self> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let base_tokens = tokenize(&text, config.clean_text);
        // Cleaning can strip every character (e.g. all non-ASCII input).
        if base_tokens.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let tokens = ngrams::expand(base_tokens.clone(), config.ngrams);
        let word_count = if config.count_ngrams {
            tokens.len()
        } else {
            base_tokens.len()
        };
        Ok(Self {
            true_word_count: true_word_count(&text),
            text,
            base_tokens,
            tokens,
            word_count,
        })
    }

    pub fn token_count(&self) -> usize {
        self.base_tokens.len()
    }

    /// Token sequence to match with `strategy`.
    ///
    /// Boundary matching searches the joined text, which already contains
    /// every phrase, so it must not also see the synthesized n-grams.
    pub fn match_tokens(&self, strategy: MatchStrategy) -> &[String] {
        match strategy {
            MatchStrategy::ExactToken => &self.tokens,
            MatchStrategy::BoundaryRegex => &self.base_tokens,
        }
    }
}

/// Lexica a config needs: the variant's PERMA lexicon, then [`family_lexica`].
pub fn required_lexica(config: &AnalysisConfig) -> Vec<LexiconId> {
    let mut ids = vec![config.variant.lexicon_id()];
    ids.extend(family_lexica(config));
    ids
}

/// Companion lexica for the effective features. Never includes a PERMA id.
pub fn family_lexica(config: &AnalysisConfig) -> Vec<LexiconId> {
    let (f, _) = config.effective_features();
    let mut ids = Vec::new();
    if f.prospection {
        ids.push(LexiconId::Prospection);
    }
    if f.affect {
        ids.push(LexiconId::Affect);
    }
    if f.big_five {
        ids.push(LexiconId::BigFive);
    }
    if f.dark_triad {
        ids.push(LexiconId::DarkTriad);
    }
    if f.age_gender {
        ids.push(LexiconId::Age);
        ids.push(LexiconId::Gender);
    }
    ids
}

/// Analyze against lexica already in `store`.
///
/// Fails with `LexiconNotLoaded` instead of scoring against a missing lexicon.
pub fn analyze_loaded(
    text: &str,
    config: &AnalysisConfig,
    store: &LexiconStore,
) -> Result<AnalysisReport> {
    let (features, warnings) = config.effective_features();
    run(text, config, features, warnings, store)
}

pub(crate) fn run(
    text: &str,
    config: &AnalysisConfig,
    features: Features,
    warnings: Vec<String>,
    store: &LexiconStore,
) -> Result<AnalysisReport> {
    ensure_metrics_described();
    let started = Instant::now();
    let session = AnalysisSession::new(text, config)?;
    let id = anon_hash(&session.text);
    let wc = session.word_count;
    let tokens = session.match_tokens(config.strategy);

    let variant = config.variant;
    let perma_id = variant.lexicon_id();
    let perma_lex = store.get(perma_id)?;
    let perma_set = Matcher::new(config.strategy, config.thresholds())
        .match_lexicon(tokens, &perma_lex);
    let perma = PermaReport::build(
        perma_id,
        variant.is_data_driven(),
        &perma_set,
        variant.intercepts(),
        wc,
        config.perma_encoding,
    );

    // Companion families are never threshold-filtered.
    let family = Matcher::new(config.strategy, None);
    let match_family = |id: LexiconId| -> Result<MatchSet> {
        let lex = store.get(id)?;
        Ok(family.match_lexicon(tokens, &lex))
    };

    let prospection_set = features
        .prospection
        .then(|| match_family(LexiconId::Prospection))
        .transpose()?;
    let prospection = prospection_set.as_ref().map(|set| {
        FamilyReport::build(
            set,
            &["PAST", "PRESENT", "FUTURE"],
            &intercepts::PROSPECTION,
            wc,
            Encoding::Binary,
        )
    });

    let affect = if features.affect {
        let set = match_family(LexiconId::Affect)?;
        Some(FamilyReport::build(
            &set,
            &["AFFECT", "INTENSITY"],
            &intercepts::AFFECT,
            wc,
            Encoding::Binary,
        ))
    } else {
        None
    };

    let optimism = match (&prospection_set, features.optimism) {
        (Some(prosp), true) => {
            let affect_lex = store.get(LexiconId::Affect)?;
            Some(optimism_report(prosp, &affect_lex, family, wc))
        }
        _ => None,
    };

    let big_five = if features.big_five {
        let set = match_family(LexiconId::BigFive)?;
        Some(FamilyReport::build(
            &set,
            &["O", "C", "E", "A", "N"],
            &intercepts::BIG_FIVE,
            wc,
            Encoding::Binary,
        ))
    } else {
        None
    };

    let dark_triad = if features.dark_triad {
        let set = match_family(LexiconId::DarkTriad)?;
        Some(FamilyReport::build(
            &set,
            &["darktriad", "machiavellianism", "narcissism", "psychopathy"],
            &intercepts::DARK_TRIAD,
            wc,
            Encoding::Binary,
        ))
    } else {
        None
    };

    let demographics = if features.age_gender {
        let age = match_family(LexiconId::Age)?;
        let gender = match_family(LexiconId::Gender)?;
        Some(DemographicsReport::new(
            score_or_none(age.get("AGE"), wc, intercepts::AGE, Encoding::Frequency),
            score_or_none(gender.get("GENDER"), wc, intercepts::GENDER, Encoding::Frequency),
        ))
    } else {
        None
    };

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    counter!("analyses_total").increment(1);
    histogram!("analysis_ms").record(elapsed_ms);
    for w in &warnings {
        debug!(target: "perma::analysis", %id, warning = %w, "family skipped");
    }
    info!(
        target: "perma::analysis",
        %id,
        lexicon = %perma_id,
        word_count = wc,
        tokens = session.token_count(),
        matches = perma.total(),
        elapsed_ms,
        "analysis complete"
    );

    Ok(AnalysisReport {
        word_count: wc,
        true_word_count: session.true_word_count,
        token_count: session.token_count(),
        perma,
        prospection,
        affect,
        optimism,
        big_five,
        dark_triad,
        demographics,
        warnings,
    })
}

/// FUTURE words (with multiplicity) re-matched against the affect lexicon.
fn optimism_report(
    prospection: &MatchSet,
    affect: &Lexicon,
    matcher: Matcher,
    word_count: usize,
) -> OptimismReport {
    let future_words = prospection.words("FUTURE");
    let set = matcher.match_lexicon(&future_words, affect);
    let cat = set.get("AFFECT");
    OptimismReport {
        count: set.count("AFFECT"),
        score: score_or_none(
            cat,
            word_count,
            intercepts::lookup(&intercepts::AFFECT, "AFFECT"),
            Encoding::Binary,
        ),
        words: cat.map(|c| c.printable()).unwrap_or_default(),
        future_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PermaVariant;
    use crate::ngrams::NgramMode;

    #[test]
    fn session_normalizes_and_counts() {
        let cfg = AnalysisConfig::default();
        let s = AnalysisSession::new("  I LOVE my job :)  ", &cfg).unwrap();
        assert_eq!(s.text, "i love my job :)");
        assert_eq!(s.base_tokens, vec!["i", "love", "my", "job", ":)"]);
        assert_eq!(s.word_count, 5);
        assert_eq!(s.true_word_count, 5);
    }

    #[test]
    fn blank_input_is_rejected() {
        let cfg = AnalysisConfig::default();
        assert_eq!(
            AnalysisSession::new(" \n\t ", &cfg).unwrap_err(),
            AnalysisError::EmptyInput
        );
    }

    #[test]
    fn ngrams_extend_tokens_but_not_the_denominator_by_default() {
        let mut cfg = AnalysisConfig {
            ngrams: NgramMode::BigramsAndTrigrams,
            ..Default::default()
        };
        let s = AnalysisSession::new("a b c", &cfg).unwrap();
        assert_eq!(s.tokens, vec!["a", "b", "c", "a b", "b c", "a b c"]);
        assert_eq!(s.word_count, 3);
        assert_eq!(s.token_count(), 3);

        cfg.count_ngrams = true;
        let s = AnalysisSession::new("a b c", &cfg).unwrap();
        assert_eq!(s.word_count, 6);
    }

    #[test]
    fn boundary_matching_sees_only_base_tokens() {
        let cfg = AnalysisConfig {
            ngrams: NgramMode::BigramsAndTrigrams,
            ..Default::default()
        };
        let s = AnalysisSession::new("i love it", &cfg).unwrap();
        assert_eq!(s.match_tokens(MatchStrategy::ExactToken).len(), 6);
        assert_eq!(s.match_tokens(MatchStrategy::BoundaryRegex), ["i", "love", "it"]);
    }

    #[test]
    fn required_lexica_follow_effective_features() {
        let cfg = AnalysisConfig {
            features: Features {
                affect: true,
                optimism: true,
                age_gender: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            required_lexica(&cfg),
            vec![LexiconId::PermaDd, LexiconId::Affect, LexiconId::Age, LexiconId::Gender]
        );
    }

    #[test]
    fn family_lexica_never_repeat_the_perma_lexicon() {
        for variant in [
            PermaVariant::DataDriven,
            PermaVariant::Manual,
            PermaVariant::ManualTsp75,
            PermaVariant::Spanish,
        ] {
            let cfg = AnalysisConfig {
                variant,
                features: Features::all(),
                ..Default::default()
            };
            let families = family_lexica(&cfg);
            assert!(!families.contains(&variant.lexicon_id()), "{variant:?}");
            let mut expected = vec![variant.lexicon_id()];
            expected.extend(families);
            assert_eq!(required_lexica(&cfg), expected);
        }
    }
}
