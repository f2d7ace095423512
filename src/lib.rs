// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod analyze;
pub mod config;
pub mod error;
pub mod export;
pub mod lexicon;
pub mod matcher;
pub mod ngrams;
pub mod report;
pub mod scoring;
pub mod telemetry;
pub mod tokenize;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{analyze_loaded, AnalysisSession, Analyzer};
pub use crate::config::{AnalysisConfig, Features, PermaVariant};
pub use crate::error::AnalysisError;
pub use crate::lexicon::{FsSource, HttpSource, Lexicon, LexiconId, LexiconSource, LexiconStore};
pub use crate::report::{AnalysisReport, RatioStatement};
