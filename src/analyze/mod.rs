// src/analyze/mod.rs
//! Analysis entry: load what the config needs, then run one scoring pass.

pub mod session;

use std::sync::Arc;

use tracing::warn;

use crate::config::{AnalysisConfig, Features};
use crate::error::{AnalysisError, Result};
use crate::lexicon::{LexiconId, LexiconStore};
use crate::report::AnalysisReport;

pub use session::{analyze_loaded, family_lexica, required_lexica, AnalysisSession};

/// Owns a handle to the shared store; cheap to clone.
#[derive(Clone)]
pub struct Analyzer {
    store: Arc<LexiconStore>,
}

impl Analyzer {
    pub fn new(store: Arc<LexiconStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<LexiconStore> {
        &self.store
    }

    /// Load the required lexica and analyze `text`.
    ///
    /// A PERMA load failure fails the call. A companion family that fails to
    /// load is left out of the report with a warning.
    pub async fn analyze(&self, text: &str, config: &AnalysisConfig) -> Result<AnalysisReport> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let (mut features, mut warnings) = config.effective_features();

        self.store.load(config.variant.lexicon_id()).await?;

        for err in self.store.load_all(&family_lexica(config)).await {
            if let AnalysisError::LexiconLoadFailure { id, .. } = &err {
                disable_family(&mut features, *id);
            }
            warn!(target: "perma::analysis", error = %err, "skipping lexicon family");
            warnings.push(err.to_string());
        }

        session::run(text, config, features, warnings, &self.store)
    }
}

fn disable_family(f: &mut Features, id: LexiconId) {
    match id {
        LexiconId::Prospection => {
            f.prospection = false;
            f.optimism = false;
        }
        LexiconId::Affect => {
            f.affect = false;
            f.optimism = false;
        }
        LexiconId::BigFive => f.big_five = false,
        LexiconId::DarkTriad => f.dark_triad = false,
        LexiconId::Age | LexiconId::Gender => f.age_gender = false,
        LexiconId::PermaDd
        | LexiconId::PermaManual
        | LexiconId::PermaManualTsp75
        | LexiconId::PermaSpanish => {}
    }
}
