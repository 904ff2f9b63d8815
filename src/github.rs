//! GitHub repository fetcher.
//!
//! Builds a bounded digest of a repository through the REST contents API
//! without cloning it:
//!
//! 1. `GET /repos/{owner}/{repo}` for description, language and stars.
//! 2. `GET /repos/{owner}/{repo}/contents` for the root listing.
//! 3. Root files that are key manifests or have a source extension become
//!    candidates.
//! 4. The first root directory named `src`, `lib` or `app` is listed once
//!    (no deeper recursion) and its source files are appended.
//! 5. The first [`MAX_CANDIDATES`] candidates in discovery order are
//!    downloaded one at a time, skipping anything of [`MAX_FILE_BYTES`] or
//!    more. A failed download skips that file only.
//!
//! Failures of steps 1 and 2 abort the whole fetch with
//! [`Error::RepositoryUnavailable`] / [`Error::ContentsUnavailable`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::models::RepositoryFile;
use crate::truncate::{truncate_with_marker, REPO_FILE_CAP, REPO_FILE_TRUNCATION_MARKER};

/// Root-level files always worth reading.
const KEY_FILES: &[&str] = &[
    "README.md",
    "package.json",
    "tsconfig.json",
    "Cargo.toml",
    "requirements.txt",
    "go.mod",
    "pom.xml",
];

const SOURCE_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".py", ".go", ".rs", ".java", ".cpp", ".c", ".php",
];

/// Conventional source directories, probed in listing order.
const SOURCE_DIRS: &[&str] = &["src", "lib", "app"];

pub const MAX_CANDIDATES: usize = 10;
/// Files reported at this size or larger are never downloaded.
pub const MAX_FILE_BYTES: u64 = 50_000;

static REPO_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"github\.com/([^/]+)/([^/?#]+)").expect("valid regex"));

/// `owner/name` pair parsed from a GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Parse `https://github.com/{owner}/{repo}[.git][/...]`.
pub fn parse_github_url(url: &str) -> Result<RepoRef> {
    if !url.contains("github.com") {
        return Err(Error::InvalidGithubUrl(url.to_string()));
    }

    let caps = REPO_PATH_RE
        .captures(url)
        .ok_or_else(|| Error::InvalidGithubUrl(format!("unable to parse {}", url)))?;

    let owner = caps[1].to_string();
    let raw_name = &caps[2];
    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name).to_string();

    if name.is_empty() {
        return Err(Error::InvalidGithubUrl(format!("unable to parse {}", url)));
    }

    Ok(RepoRef { owner, name })
}

/// Repository metadata from `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
}

/// One entry of a contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    fn is_dir(&self) -> bool {
        self.entry_type == "dir"
    }

    fn has_source_extension(&self) -> bool {
        SOURCE_EXTENSIONS.iter().any(|ext| self.name.ends_with(ext))
    }
}

/// Everything a repository source is built from.
#[derive(Debug, Clone)]
pub struct RepositoryDigest {
    pub combined_content: String,
    pub files: Vec<RepositoryFile>,
    pub summary: String,
}

/// Root directory to probe for additional sources, if any.
pub fn find_source_dir(root: &[ContentEntry]) -> Option<&ContentEntry> {
    root.iter()
        .find(|e| e.is_dir() && SOURCE_DIRS.contains(&e.name.as_str()))
}

/// Root manifests and sources, then probed-directory sources, capped at
/// [`MAX_CANDIDATES`].
pub fn select_candidates<'a>(
    root: &'a [ContentEntry],
    source_dir: &'a [ContentEntry],
) -> Vec<&'a ContentEntry> {
    let from_root = root
        .iter()
        .filter(|e| e.is_file() && (KEY_FILES.contains(&e.name.as_str()) || e.has_source_extension()));
    let from_dir = source_dir
        .iter()
        .filter(|e| e.is_file() && e.has_source_extension());

    from_root.chain(from_dir).take(MAX_CANDIDATES).collect()
}

/// HTTP client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_repository(&self, repo: &RepoRef) -> Result<RepositoryDigest> {
        let base = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.name);

        let resp = self.client.get(&base).send().await?;
        if !resp.status().is_success() {
            return Err(Error::RepositoryUnavailable(resp.status().as_u16()));
        }
        let info: RepositoryInfo = resp.json().await?;

        let resp = self.client.get(format!("{}/contents", base)).send().await?;
        if !resp.status().is_success() {
            return Err(Error::ContentsUnavailable(resp.status().as_u16()));
        }
        let root: Vec<ContentEntry> = resp.json().await?;

        let source_dir = match find_source_dir(&root) {
            Some(dir) => self.list_dir(&base, &dir.path).await,
            None => Vec::new(),
        };

        let candidates = select_candidates(&root, &source_dir);
        debug!(
            repo = %repo.full_name(),
            candidates = candidates.len(),
            "selected repository files"
        );

        let mut combined = format!(
            "Repository: {}\nDescription: {}\nLanguage: {}\nStars: {}\n\n",
            repo.full_name(),
            info.description.as_deref().unwrap_or("No description available"),
            info.language.as_deref().unwrap_or("Unknown"),
            info.stargazers_count
        );
        let mut files = Vec::new();

        for entry in candidates {
            if entry.size >= MAX_FILE_BYTES {
                debug!(path = %entry.path, size = entry.size, "skipping large file");
                continue;
            }
            let Some(download_url) = entry.download_url.as_deref() else {
                continue;
            };

            let content = match self.download(download_url).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "failed to fetch repository file");
                    continue;
                }
            };

            combined.push_str(&format!("\n--- {} ---\n", entry.path));
            combined.push_str(&truncate_with_marker(
                &content,
                REPO_FILE_CAP,
                REPO_FILE_TRUNCATION_MARKER,
            ));
            combined.push_str("\n\n");

            files.push(RepositoryFile {
                name: entry.name.clone(),
                path: entry.path.clone(),
                content,
                size: entry.size,
            });
        }

        let summary = format!(
            "GitHub Repository: {}\nLanguage: {}\nDescription: {}\nFiles analyzed: {}\nKey files: {}",
            repo.full_name(),
            info.language.as_deref().unwrap_or("Unknown"),
            info.description.as_deref().unwrap_or("No description available"),
            files.len(),
            files
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        info!(repo = %repo.full_name(), files = files.len(), "fetched repository");

        Ok(RepositoryDigest {
            combined_content: combined,
            files,
            summary,
        })
    }

    /// List a subdirectory; any failure yields an empty listing.
    async fn list_dir(&self, base: &str, path: &str) -> Vec<ContentEntry> {
        let result = async {
            let resp = self
                .client
                .get(format!("{}/contents/{}", base, path))
                .send()
                .await?
                .error_for_status()?;
            resp.json::<Vec<ContentEntry>>().await
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!(path, error = %e, "failed to list source directory");
            Vec::new()
        })
    }

    async fn download(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::HttpStatus(resp.status().as_u16()));
        }
        Ok(resp.text().await?)
    }
}
