// src/config/analysis.rs
//! Analysis configuration: one immutable value per call.
//!
//! Lookup order for [`AnalysisConfig::load_default`]:
//! 1) `$PERMA_CONFIG_PATH`
//! 2) `config/analysis.toml`
//! 3) `config/analysis.json`
//! 4) built-in defaults
//!
//! `PERMA_VARIANT`, `PERMA_MIN_WEIGHT` and `PERMA_MAX_WEIGHT` are applied on
//! top; values that do not parse are ignored.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::warn;

use crate::lexicon::LexiconId;
use crate::matcher::{MatchStrategy, WeightRange};
use crate::ngrams::NgramMode;
use crate::scoring::{intercepts, Encoding};

pub const ENV_CONFIG_PATH: &str = "PERMA_CONFIG_PATH";
pub const ENV_VARIANT: &str = "PERMA_VARIANT";
pub const ENV_MIN_WEIGHT: &str = "PERMA_MIN_WEIGHT";
pub const ENV_MAX_WEIGHT: &str = "PERMA_MAX_WEIGHT";

/// Which PERMA lexicon scores the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermaVariant {
    /// English, data-driven weights.
    #[default]
    DataDriven,
    /// English, manually annotated.
    Manual,
    /// English, manual with terms above the 75th percentile.
    ManualTsp75,
    /// Spanish, data-driven weights.
    Spanish,
}

impl PermaVariant {
    pub fn lexicon_id(self) -> LexiconId {
        match self {
            PermaVariant::DataDriven => LexiconId::PermaDd,
            PermaVariant::Manual => LexiconId::PermaManual,
            PermaVariant::ManualTsp75 => LexiconId::PermaManualTsp75,
            PermaVariant::Spanish => LexiconId::PermaSpanish,
        }
    }

    /// Data-driven lexica carry calibrated weights and accept thresholds.
    pub fn is_data_driven(self) -> bool {
        matches!(self, PermaVariant::DataDriven | PermaVariant::Spanish)
    }

    /// Default `(min, max)` weight window for data-driven variants.
    pub fn default_weights(self) -> Option<(f64, f64)> {
        match self {
            PermaVariant::DataDriven => Some((-0.38, 0.86)),
            PermaVariant::Spanish => Some((-0.86, 3.35)),
            PermaVariant::Manual | PermaVariant::ManualTsp75 => None,
        }
    }

    pub fn intercepts(self) -> &'static [(&'static str, f64)] {
        match self {
            PermaVariant::Spanish => &intercepts::PERMA_SPANISH,
            _ => &[],
        }
    }

    /// The Spanish lexicon has no English-only companion families.
    pub fn supports_extras(self) -> bool {
        !matches!(self, PermaVariant::Spanish)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "data_driven" | "dd" => Some(PermaVariant::DataDriven),
            "manual" => Some(PermaVariant::Manual),
            "manual_tsp75" | "tsp75" => Some(PermaVariant::ManualTsp75),
            "spanish" | "es" => Some(PermaVariant::Spanish),
            _ => None,
        }
    }
}

/// Optional lexicon families; PERMA itself is always scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub prospection: bool,
    pub affect: bool,
    /// Needs both `prospection` and `affect`.
    pub optimism: bool,
    pub big_five: bool,
    pub dark_triad: bool,
    pub age_gender: bool,
}

impl Features {
    pub fn all() -> Self {
        Self {
            prospection: true,
            affect: true,
            optimism: true,
            big_five: true,
            dark_triad: true,
            age_gender: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub variant: PermaVariant,
    /// Lower weight bound for data-driven variants; variant default when unset.
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub features: Features,
    pub ngrams: NgramMode,
    /// Include n-grams in the frequency denominator.
    pub count_ngrams: bool,
    pub clean_text: bool,
    pub sort_export: bool,
    pub perma_encoding: Encoding,
    pub strategy: MatchStrategy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            variant: PermaVariant::default(),
            min_weight: None,
            max_weight: None,
            features: Features::default(),
            ngrams: NgramMode::None,
            count_ngrams: false,
            clean_text: false,
            sort_export: false,
            perma_encoding: Encoding::Binary,
            strategy: MatchStrategy::ExactToken,
        }
    }
}

impl AnalysisConfig {
    /// Weight window for the PERMA matcher; `None` for manual variants.
    pub fn thresholds(&self) -> Option<WeightRange> {
        let (dmin, dmax) = self.variant.default_weights()?;
        let min = self.min_weight.filter(|v| v.is_finite()).unwrap_or(dmin);
        let max = self.max_weight.filter(|v| v.is_finite()).unwrap_or(dmax);
        Some(WeightRange::new(min, max))
    }

    /// Feature set actually run, plus a note for each feature that was dropped.
    pub fn effective_features(&self) -> (Features, Vec<String>) {
        let mut f = self.features;
        let mut notes = Vec::new();

        if !self.variant.supports_extras() {
            let requested = f.prospection || f.affect || f.optimism || f.big_five || f.age_gender;
            if requested {
                notes.push(
                    "spanish variant: prospection, affect, optimism, big five and age/gender are unavailable"
                        .to_string(),
                );
            }
            f.prospection = false;
            f.affect = false;
            f.optimism = false;
            f.big_five = false;
            f.age_gender = false;
        }
        if f.optimism && !(f.prospection && f.affect) {
            notes.push("optimism needs both prospection and affect; skipped".to_string());
            f.optimism = false;
        }
        (f, notes)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing analysis config (toml)")
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing analysis config (json)")
    }

    /// Load from an explicit path; `.json` is parsed as JSON, everything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analysis config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext == "json" {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Env path, then the fallback files, then defaults; env overrides last.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/analysis.toml");
            let json_p = PathBuf::from("config/analysis.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(ENV_VARIANT) {
            match PermaVariant::parse(&raw) {
                Some(v) => self.variant = v,
                None => warn!(target: "perma::config", value = %raw, "ignoring unknown {ENV_VARIANT}"),
            }
        }
        if let Some(v) = parse_weight_env(env::var(ENV_MIN_WEIGHT).ok()) {
            self.min_weight = Some(v);
        }
        if let Some(v) = parse_weight_env(env::var(ENV_MAX_WEIGHT).ok()) {
            self.max_weight = Some(v);
        }
    }
}

fn parse_weight_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
