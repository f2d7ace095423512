//! Error kinds for a single analysis invocation.
//!
//! None of these are fatal to the process: the caller can retry with the
//! same or corrected input once the cause is fixed.

use crate::lexicon::LexiconId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Blank or whitespace-only input; nothing is computed.
    #[error("input text is empty")]
    EmptyInput,

    /// Fetching or parsing a lexicon failed. Previously loaded lexica are untouched.
    #[error("failed to load lexicon `{id}`: {reason}")]
    LexiconLoadFailure { id: LexiconId, reason: String },

    /// Analysis needs a lexicon that has not finished loading.
    #[error("lexicon `{0}` is not loaded")]
    LexiconNotLoaded(LexiconId),

    /// Scoring was asked to divide by a zero word count.
    #[error("word count must be greater than zero")]
    InvalidWordCount,

    /// Scoring was asked for a category the lexicon does not have.
    #[error("category has no match list")]
    MissingMatches,
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
