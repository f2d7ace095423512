//! PERMA text analyzer: command-line entrypoint.
//!
//! Reads text from `--text`, `--file` or stdin, loads lexica from a directory
//! or an HTTP base URL, and prints the analysis report as JSON.

use std::io::Read as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use perma_text_analyzer::{
    export, telemetry, AnalysisConfig, AnalysisSession, Analyzer, FsSource, HttpSource,
    LexiconSource, LexiconStore,
};

#[derive(Debug, Parser)]
#[command(name = "perma", version, about = "Score text against PERMA and companion lexica")]
struct Cli {
    /// Text to analyze.
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the text from a file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Analysis config (TOML or JSON). Defaults to the PERMA_CONFIG_PATH lookup.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory holding the `json/` lexicon tree.
    #[arg(long, env = "PERMA_LEXICON_DIR", default_value = ".")]
    lexicon_dir: PathBuf,

    /// Fetch lexica over HTTP from this base URL instead of the directory.
    #[arg(long, env = "PERMA_LEXICON_URL")]
    lexicon_url: Option<String>,

    /// Also write the token export into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(t) = &cli.text {
        return Ok(t.clone());
    }
    if let Some(p) = &cli.file {
        return std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading text from stdin")?;
    Ok(buf)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (PERMA_* settings, RUST_LOG).
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(p) => {
            let mut c = AnalysisConfig::load_from(p)?;
            c.apply_env_overrides();
            c
        }
        None => AnalysisConfig::load_default()?,
    };

    let source: Arc<dyn LexiconSource> = match &cli.lexicon_url {
        Some(url) => Arc::new(HttpSource::new(url)?),
        None => Arc::new(FsSource::new(&cli.lexicon_dir)),
    };
    info!(target: "perma", source = source.name(), variant = ?config.variant, "starting analysis");

    let analyzer = Analyzer::new(Arc::new(LexiconStore::new(source)));
    let text = read_input(&cli)?;
    let report = analyzer.analyze(&text, &config).await?;

    if let Some(dir) = &cli.export_dir {
        let session = AnalysisSession::new(&text, &config)?;
        let path = export::write_to(dir, &session.base_tokens, config.sort_export).await?;
        eprintln!("token export: {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
