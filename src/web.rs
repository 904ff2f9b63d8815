//! Web page fetcher and HTML text extraction.
//!
//! Extraction is regex-based, not a DOM parse. Order matters:
//! `<script>`/`<style>` blocks are removed before generic tag stripping,
//! otherwise script bodies leak into the extracted text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::truncate::{truncate_with_marker, PAGE_CONTENT_CAP, PAGE_TRUNCATION_MARKER};

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("valid regex"));

static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']+)["']"#)
        .expect("valid regex")
});

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));

static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extracted digest of a fetched page.
#[derive(Debug, Clone)]
pub struct WebPage {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub description: String,
    /// Visible text, capped at [`PAGE_CONTENT_CAP`] characters.
    pub content: String,
    pub summary: String,
}

/// Parse `input` as an absolute `http`/`https` URL.
pub fn validate_url(input: &str) -> Result<Url> {
    let url = Url::parse(input).map_err(|_| Error::InvalidUrl(input.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(Error::InvalidUrl(input.to_string())),
    }
}

/// Host of `url`, or `"Unknown domain"`.
pub fn domain_of(url: &Url) -> String {
    url.host_str()
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown domain".to_string())
}

pub fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

pub fn extract_description(html: &str) -> String {
    DESCRIPTION_RE
        .captures(html)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

/// Visible text: scripts and styles removed, tags stripped, whitespace
/// collapsed, then capped.
pub fn extract_text(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    truncate_with_marker(text.trim(), PAGE_CONTENT_CAP, PAGE_TRUNCATION_MARKER)
}

/// Build a [`WebPage`] from already-fetched HTML.
pub fn digest_html(url: &Url, html: &str) -> WebPage {
    let title = extract_title(html);
    let description = extract_description(html);
    let content = extract_text(html);
    let domain = domain_of(url);

    let summary = format!(
        "URL: {}\nTitle: {}\nDomain: {}\nDescription: {}\nContent length: {} characters",
        url,
        title,
        domain,
        description,
        content.chars().count()
    );

    WebPage {
        url: url.to_string(),
        domain,
        title,
        description,
        content,
        summary,
    }
}

/// HTTP client for arbitrary web pages.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch_page(&self, input: &str) -> Result<WebPage> {
        let url = validate_url(input)?;

        let resp = self.client.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(Error::HttpStatus(resp.status().as_u16()));
        }
        let html = resp.text().await?;

        let page = digest_html(&url, &html);
        info!(url = %page.url, chars = page.content.chars().count(), "fetched page");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url("https://example.com/a").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_script_removed_before_tags() {
        let text = extract_text("<script>alert(1)</script><p>Hello</p>");
        assert!(text.contains("Hello"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn test_multiline_script_and_style() {
        let html = "<html><head><STYLE type=\"text/css\">\nbody { color: red }\n</STYLE>\
                    <script type=\"module\">\nconst x = 1;\n</script></head>\
                    <body><h1>Title</h1>\n\n<p>Body   text</p></body></html>";
        assert_eq!(extract_text(html), "Title Body text");
    }

    #[test]
    fn test_title_and_description() {
        let html = r#"<html><head><TITLE lang="en">  My Page </TITLE>
            <meta name="description" content="A test page"></head></html>"#;
        assert_eq!(extract_title(html), "My Page");
        assert_eq!(extract_description(html), "A test page");
    }

    #[test]
    fn test_missing_title_and_description() {
        assert_eq!(extract_title("<p>no head</p>"), "");
        assert_eq!(extract_description("<p>no head</p>"), "");
    }

    #[test]
    fn test_long_text_capped() {
        let html = format!("<p>{}</p>", "x".repeat(PAGE_CONTENT_CAP + 50));
        let text = extract_text(&html);
        assert!(text.ends_with(PAGE_TRUNCATION_MARKER));
        assert_eq!(text.chars().count(), PAGE_CONTENT_CAP + 3);
    }

    #[test]
    fn test_digest_summary() {
        let url = validate_url("https://docs.example.org/guide").unwrap();
        let page = digest_html(&url, "<title>Guide</title><p>Read me</p>");
        assert_eq!(page.domain, "docs.example.org");
        assert_eq!(page.title, "Guide");
        assert!(page.content.contains("Read me"));
        assert!(page.summary.contains("Domain: docs.example.org"));
        assert!(page
            .summary
            .contains(&format!("Content length: {} characters", page.content.len())));
    }
}
