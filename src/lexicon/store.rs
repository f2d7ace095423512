// src/lexicon/store.rs
//! Process-scoped lexicon cache.
//!
//! A load in flight is kept as a `Shared` future in the slot map. Every
//! concurrent `load` for the same id awaits that one future and gets its
//! result, error included, so the source is hit once per attempt. Success
//! replaces the entry with the parsed lexicon; failure removes it, and the
//! next explicit `load` starts a fresh fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use metrics::counter;
use tracing::{debug, info, warn};

use super::{Lexicon, LexiconId, LexiconSource};
use crate::error::{AnalysisError, Result};
use crate::telemetry::ensure_metrics_described;

type PendingLoad = Shared<BoxFuture<'static, Result<Arc<Lexicon>>>>;

enum Slot {
    Ready(Arc<Lexicon>),
    /// `attempt` tells a finished load whether the entry is still its own.
    Pending { attempt: u64, load: PendingLoad },
}

#[derive(Default)]
struct Slots {
    by_id: HashMap<LexiconId, Slot>,
    attempts: u64,
}

pub struct LexiconStore {
    source: Arc<dyn LexiconSource>,
    slots: Mutex<Slots>,
}

impl LexiconStore {
    pub fn new(source: Arc<dyn LexiconSource>) -> Self {
        ensure_metrics_described();
        Self {
            source,
            slots: Mutex::new(Slots::default()),
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn loaded(&self, id: LexiconId) -> Option<Arc<Lexicon>> {
        match self.slots().by_id.get(&id) {
            Some(Slot::Ready(lex)) => Some(lex.clone()),
            _ => None,
        }
    }

    /// Load `id` once and cache it. Later calls return the cached lexicon.
    pub async fn load(&self, id: LexiconId) -> Result<Arc<Lexicon>> {
        let (attempt, pending) = {
            let mut slots = self.slots();
            match slots.by_id.get(&id) {
                Some(Slot::Ready(lex)) => return Ok(lex.clone()),
                Some(Slot::Pending { attempt, load }) => (*attempt, load.clone()),
                None => {
                    slots.attempts += 1;
                    let attempt = slots.attempts;
                    let load = fetch_and_parse(self.source.clone(), id).boxed().shared();
                    slots.by_id.insert(
                        id,
                        Slot::Pending {
                            attempt,
                            load: load.clone(),
                        },
                    );
                    (attempt, load)
                }
            }
        };

        let result = pending.await;

        let mut slots = self.slots();
        let own_entry = match slots.by_id.get(&id) {
            // Seeded by `insert` while the fetch ran; the seeded lexicon wins.
            Some(Slot::Ready(lex)) => return Ok(lex.clone()),
            Some(Slot::Pending { attempt: a, .. }) => *a == attempt,
            None => false,
        };
        if own_entry {
            match &result {
                Ok(lex) => {
                    slots.by_id.insert(id, Slot::Ready(lex.clone()));
                }
                Err(_) => {
                    slots.by_id.remove(&id);
                }
            }
        }
        result
    }

    /// Load several lexica concurrently; returns the failures, if any.
    pub async fn load_all(&self, ids: &[LexiconId]) -> Vec<AnalysisError> {
        let results = join_all(ids.iter().map(|&id| self.load(id))).await;
        results.into_iter().filter_map(|r| r.err()).collect()
    }

    pub fn is_loaded(&self, id: LexiconId) -> bool {
        self.loaded(id).is_some()
    }

    /// Cached lexicon, or `LexiconNotLoaded` when no load has completed yet.
    pub fn get(&self, id: LexiconId) -> Result<Arc<Lexicon>> {
        self.loaded(id).ok_or(AnalysisError::LexiconNotLoaded(id))
    }

    /// Seed an already-parsed lexicon. Append-only: an existing entry wins.
    pub fn insert(&self, id: LexiconId, lexicon: Lexicon) -> bool {
        let mut slots = self.slots();
        if let Some(Slot::Ready(_)) = slots.by_id.get(&id) {
            return false;
        }
        slots.by_id.insert(id, Slot::Ready(Arc::new(lexicon)));
        true
    }
}

async fn fetch_and_parse(source: Arc<dyn LexiconSource>, id: LexiconId) -> Result<Arc<Lexicon>> {
    counter!("lexicon_fetches_total").increment(1);
    debug!(target: "perma::lexicon", %id, source = source.name(), "fetching lexicon");

    let parsed = match source.fetch(id.path()).await {
        Ok(raw) => Lexicon::from_json_str(&raw),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(lex) => {
            counter!("lexicon_loads_total").increment(1);
            info!(
                target: "perma::lexicon",
                %id,
                categories = lex.categories().len(),
                entries = lex.len(),
                "lexicon loaded"
            );
            Ok(Arc::new(lex))
        }
        Err(e) => {
            counter!("lexicon_load_failures_total").increment(1);
            warn!(target: "perma::lexicon", %id, error = %format!("{e:#}"), "lexicon load failed");
            Err(AnalysisError::LexiconLoadFailure {
                id,
                reason: format!("{e:#}"),
            })
        }
    }
}
