//! Error types for source ingestion and chat.
//!
//! Every failure maps to one of three [`ErrorKind`]s, which the HTTP layer
//! turns into a status code:
//!
//! | Kind | Status | Examples |
//! |------|--------|----------|
//! | `InvalidInput` | 400 | malformed URL, empty upload, unparseable GitHub URL |
//! | `UpstreamUnavailable` | 500 | repository, listing, page, or transport failures |
//! | `ProviderFailure` | 500 | completion API errors |

use thiserror::Error;

/// Result alias used by the ingestion pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    UpstreamUnavailable,
    ProviderFailure,
}

#[derive(Debug, Error)]
pub enum Error {
    /// The URL is not an absolute `http`/`https` URL.
    #[error("Invalid URL provided: {0}")]
    InvalidUrl(String),

    /// The URL does not point at `github.com/{owner}/{repo}`.
    #[error("Invalid GitHub URL: {0}")]
    InvalidGithubUrl(String),

    /// An upload request carried no files.
    #[error("No files provided")]
    NoFiles,

    /// A chat request carried an empty message.
    #[error("Message must not be empty")]
    EmptyMessage,

    /// An uploaded file could not be read as UTF-8 text.
    #[error("{0} is not valid UTF-8 text")]
    UnreadableFile(String),

    /// The repository metadata call returned a non-success status.
    #[error("Repository not found or not accessible: {0}")]
    RepositoryUnavailable(u16),

    /// The repository contents listing returned a non-success status.
    #[error("Failed to fetch repository contents: {0}")]
    ContentsUnavailable(u16),

    /// A fetched page returned a non-success status.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// Network, timeout, or decoding failure on an outbound call.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The completion provider failed to produce a reply.
    #[error("Completion provider failed: {0}")]
    Provider(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl(_)
            | Error::InvalidGithubUrl(_)
            | Error::NoFiles
            | Error::EmptyMessage
            | Error::UnreadableFile(_) => ErrorKind::InvalidInput,
            Error::RepositoryUnavailable(_)
            | Error::ContentsUnavailable(_)
            | Error::HttpStatus(_)
            | Error::Transport(_) => ErrorKind::UpstreamUnavailable,
            Error::Provider(_) => ErrorKind::ProviderFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_invalid_input() {
        assert_eq!(Error::NoFiles.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            Error::InvalidUrl("ftp://x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            Error::InvalidGithubUrl("https://example.com".into()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_fetch_errors_are_upstream() {
        assert_eq!(
            Error::RepositoryUnavailable(404).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            Error::ContentsUnavailable(500).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(Error::HttpStatus(503).kind(), ErrorKind::UpstreamUnavailable);
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::NoFiles.to_string(), "No files provided");
        assert_eq!(
            Error::ContentsUnavailable(403).to_string(),
            "Failed to fetch repository contents: 403"
        );
        assert_eq!(
            Error::Provider("boom".into()).kind(),
            ErrorKind::ProviderFailure
        );
    }
}
