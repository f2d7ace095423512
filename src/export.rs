// src/export.rs
//! Token export: one token per line, taken before n-gram expansion.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Newline-delimited tokens. Sorting works on a copy; `tokens` keeps its order.
pub fn render(tokens: &[String], sort: bool) -> String {
    let mut owned;
    let lines: &[String] = if sort {
        owned = tokens.to_vec();
        owned.sort();
        &owned
    } else {
        tokens
    };
    let mut out = String::with_capacity(lines.iter().map(|t| t.len() + 1).sum());
    for t in lines {
        out.push_str(t);
        out.push('\n');
    }
    out
}

/// `PPTA_Tokens_<unix-millis>.csv`
pub fn file_name(now: DateTime<Utc>) -> String {
    format!("PPTA_Tokens_{}.csv", now.timestamp_millis())
}

/// Write the export into `dir` and return the file path.
pub async fn write_to(dir: &Path, tokens: &[String], sort: bool) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating export dir {}", dir.display()))?;
    let path = dir.join(file_name(Utc::now()));
    tokio::fs::write(&path, render(tokens, sort))
        .await
        .with_context(|| format!("writing token export {}", path.display()))?;
    info!(target: "perma::export", path = %path.display(), tokens = tokens.len(), "token export written");
    Ok(path)
}
