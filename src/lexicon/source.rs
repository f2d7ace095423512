// src/lexicon/source.rs
//! Where lexicon JSON comes from. The store only sees raw text keyed by path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

#[async_trait]
pub trait LexiconSource: Send + Sync {
    /// Fetch the raw JSON document stored under `path`.
    async fn fetch(&self, path: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Reads lexica from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl LexiconSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("reading lexicon from {}", full.display()))
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

/// Fetches lexica over HTTP relative to a base URL (e.g. a static file host).
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("perma-text-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building lexicon http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl LexiconSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        resp.text()
            .await
            .with_context(|| format!("reading body of {url}"))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
