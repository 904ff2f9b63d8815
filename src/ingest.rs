//! Source ingestion.
//!
//! Turns uploaded files, GitHub repositories and web pages into [`Source`]
//! records. Each function applies the size cap for its kind; the resulting
//! sources are never modified afterwards.

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::github::{parse_github_url, GitHubClient};
use crate::models::{new_source_id, Source, SourceDetails};
use crate::summarize::summarize;
use crate::truncate::{exceeds, truncate_with_marker, FILE_CONTENT_CAP, FILE_TRUNCATION_MARKER};
use crate::web::PageFetcher;

/// Files beyond this count in one upload are ignored.
pub const MAX_UPLOAD_FILES: usize = 10;

/// A file received from a client, before ingestion.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Build a file source from raw upload bytes.
///
/// The summary is computed over the full text; `content` is capped at
/// [`FILE_CONTENT_CAP`] characters.
pub fn ingest_file(name: &str, bytes: &[u8]) -> Result<Source> {
    let text =
        std::str::from_utf8(bytes).map_err(|_| Error::UnreadableFile(name.to_string()))?;
    let size = bytes.len() as u64;
    let classification = classify(name);

    let summary = summarize(text, name, classification.language, size);
    if exceeds(text, FILE_CONTENT_CAP) {
        debug!(file = name, cap = FILE_CONTENT_CAP, "truncating upload content");
    }
    let content = truncate_with_marker(text, FILE_CONTENT_CAP, FILE_TRUNCATION_MARKER);

    Ok(Source {
        id: new_source_id(),
        name: name.to_string(),
        content,
        summary,
        details: SourceDetails::File {
            language: classification.language.to_string(),
            file_type: classification.extension,
            size,
        },
    })
}

/// Ingest up to [`MAX_UPLOAD_FILES`] files.
///
/// A file that fails is logged and left out; it never fails the batch.
pub fn ingest_files(files: &[UploadedFile]) -> Result<Vec<Source>> {
    if files.is_empty() {
        return Err(Error::NoFiles);
    }

    let sources: Vec<Source> = files
        .iter()
        .take(MAX_UPLOAD_FILES)
        .filter_map(|file| match ingest_file(&file.name, &file.bytes) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(file = %file.name, error = %e, "failed to process file");
                None
            }
        })
        .collect();

    if files.len() > MAX_UPLOAD_FILES {
        info!(
            received = files.len(),
            limit = MAX_UPLOAD_FILES,
            "ignoring files beyond upload limit"
        );
    }

    Ok(sources)
}

/// Fetch a GitHub repository and build its source.
pub async fn ingest_repository(client: &GitHubClient, url: &str) -> Result<Source> {
    let repo = parse_github_url(url)?;
    let digest = client.fetch_repository(&repo).await?;

    Ok(Source {
        id: new_source_id(),
        name: repo.full_name(),
        content: digest.combined_content,
        summary: digest.summary,
        details: SourceDetails::Repository {
            url: url.to_string(),
            files: digest.files,
        },
    })
}

/// Fetch a web page and build its source, named by title or host.
pub async fn ingest_page(fetcher: &PageFetcher, url: &str) -> Result<Source> {
    let page = fetcher.fetch_page(url).await?;
    let name = if page.title.is_empty() {
        page.domain.clone()
    } else {
        page.title.clone()
    };

    Ok(Source {
        id: new_source_id(),
        name,
        content: page.content,
        summary: page.summary,
        details: SourceDetails::Webpage {
            url: url.to_string(),
            title: page.title,
            description: page.description,
        },
    })
}
