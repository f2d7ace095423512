//! Logging and metrics helpers shared by the store and the analysis pipeline.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// One-time metrics registration so the series exist before the first event.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "lexicon_fetches_total",
            "Lexicon fetches issued to the source."
        );
        describe_counter!(
            "lexicon_loads_total",
            "Lexica parsed and cached in the store."
        );
        describe_counter!(
            "lexicon_load_failures_total",
            "Lexicon fetch/parse failures."
        );
        describe_counter!("analyses_total", "Completed analysis runs.");
        describe_histogram!("analysis_ms", "Analysis time in milliseconds.");
    });
}

/// Short, stable id for an input text. Raw text never goes into the logs.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Install the compact fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("perma=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("i love my job");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("i love my job"));
        assert_ne!(a, anon_hash("i love my job!"));
    }
}
