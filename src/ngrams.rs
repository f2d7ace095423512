//! N-gram expansion for lexica with multi-word entries.

use serde::{Deserialize, Serialize};

/// Which synthesized n-grams are appended to the token sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NgramMode {
    #[default]
    None,
    Bigrams,
    BigramsAndTrigrams,
}

/// Space-joined windows of `n` consecutive tokens; `max(0, len - n + 1)` items.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// Append the n-grams selected by `mode` to `tokens` (bigrams first).
pub fn expand(mut tokens: Vec<String>, mode: NgramMode) -> Vec<String> {
    let extra = match mode {
        NgramMode::None => return tokens,
        NgramMode::Bigrams => ngrams(&tokens, 2),
        NgramMode::BigramsAndTrigrams => {
            let mut v = ngrams(&tokens, 2);
            v.extend(ngrams(&tokens, 3));
            v
        }
    };
    tokens.extend(extra);
    tokens
}
