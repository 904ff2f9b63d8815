//! One-shot ingestion commands: `layman inspect`, `layman repo`, `layman page`.
//!
//! Each runs a single pipeline stage and prints the resulting source's
//! summary, which is handy for checking what the model will see.

use anyhow::{Context, Result};
use std::path::Path;

use crate::classify::classify;
use crate::config::Config;
use crate::github::GitHubClient;
use crate::ingest::{ingest_file, ingest_page, ingest_repository};
use crate::models::{Source, SourceDetails};
use crate::web::PageFetcher;

/// Read a local file and ingest it as an upload named by its file name.
pub fn load_local_file(path: &Path) -> Result<Source> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(ingest_file(&name, &bytes)?)
}

pub fn run_inspect(path: &Path) -> Result<()> {
    let source = load_local_file(path)?;
    let classification = classify(&source.name);

    println!("{:<10} {}", "name", source.name);
    println!("{:<10} {:?}", "category", classification.category());
    if let SourceDetails::File {
        language, size, ..
    } = &source.details
    {
        println!("{:<10} {}", "language", language);
        println!("{:<10} {} bytes", "size", size);
    }
    println!();
    println!("{}", source.summary);
    Ok(())
}

pub async fn run_repo(config: &Config, url: &str) -> Result<()> {
    let client = GitHubClient::new(&config.fetch)?;
    let source = ingest_repository(&client, url).await?;

    println!("{}", source.summary);
    if let SourceDetails::Repository { files, .. } = &source.details {
        println!();
        for file in files {
            println!("  {:<40} {:>8} bytes", file.path, file.size);
        }
    }
    Ok(())
}

pub async fn run_page(config: &Config, url: &str) -> Result<()> {
    let fetcher = PageFetcher::new(&config.fetch)?;
    let source = ingest_page(&fetcher, url).await?;

    println!("{}", source.summary);
    Ok(())
}
