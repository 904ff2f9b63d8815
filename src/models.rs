//! Core data models shared by the ingestion pipeline, the HTTP service and
//! the interactive client.
//!
//! The JSON shapes match what browser clients send back on each chat turn,
//! so deserialization is lenient: older clients label repositories `github`
//! and pages `url`, use `type` instead of `role`, and send numeric ids.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A normalized, bounded unit of context the assistant can reference.
///
/// Sources are built once by the ingestion functions and never mutated;
/// removing one drops it from the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub details: SourceDetails,
}

/// Kind-specific metadata, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceDetails {
    File {
        #[serde(default)]
        language: String,
        #[serde(rename = "fileType", default)]
        file_type: String,
        #[serde(default)]
        size: u64,
    },
    #[serde(alias = "github")]
    Repository {
        #[serde(default)]
        url: String,
        #[serde(default)]
        files: Vec<RepositoryFile>,
    },
    #[serde(alias = "url")]
    Webpage {
        #[serde(default)]
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
    },
}

/// The three kinds of [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Repository,
    Webpage,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Repository => "repository",
            SourceKind::Webpage => "webpage",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self.details {
            SourceDetails::File { .. } => SourceKind::File,
            SourceDetails::Repository { .. } => SourceKind::Repository,
            SourceDetails::Webpage { .. } => SourceKind::Webpage,
        }
    }

    /// Origin URL for repositories and web pages.
    pub fn url(&self) -> Option<&str> {
        match &self.details {
            SourceDetails::File { .. } => None,
            SourceDetails::Repository { url, .. } | SourceDetails::Webpage { url, .. } => {
                Some(url)
            }
        }
    }
}

/// One fetched file of a repository source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryFile {
    pub name: String,
    pub path: String,
    pub content: String,
    pub size: u64,
}

/// Generate a source id: millisecond timestamp plus a random suffix.
pub fn new_source_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..12])
}

// ============ Conversation ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Up,
    Down,
    #[default]
    None,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "type")]
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, citations: Vec<String>) -> Self {
        Self::new(Role::Assistant, content.into(), Some(citations))
    }

    fn new(role: Role, content: String, citations: Option<Vec<String>>) -> Self {
        Self {
            id: new_source_id(),
            role,
            content,
            citations,
            feedback: None,
        }
    }
}

/// Accept ids sent either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_are_unique() {
        let a = new_source_id();
        let b = new_source_id();
        assert_ne!(a, b);
        assert!(a.len() > 12);
    }

    #[test]
    fn test_file_source_serializes_with_type_tag() {
        let src = Source {
            id: "1".into(),
            name: "app.py".into(),
            content: "print()".into(),
            summary: "s".into(),
            details: SourceDetails::File {
                language: "Python".into(),
                file_type: "py".into(),
                size: 7,
            },
        };
        let v = serde_json::to_value(&src).unwrap();
        assert_eq!(v["type"], "file");
        assert_eq!(v["language"], "Python");
        assert_eq!(v["fileType"], "py");
        assert_eq!(v["size"], 7);
        let back: Source = serde_json::from_value(v).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn test_legacy_source_labels() {
        let gh: Source = serde_json::from_value(json!({
            "id": 1700000000000u64,
            "type": "github",
            "name": "rust-lang/rust",
            "url": "https://github.com/rust-lang/rust",
            "content": "Repository: rust-lang/rust"
        }))
        .unwrap();
        assert_eq!(gh.kind(), SourceKind::Repository);
        assert_eq!(gh.id, "1700000000000");
        assert_eq!(gh.summary, "");

        let page: Source = serde_json::from_value(json!({
            "id": "x",
            "type": "url",
            "name": "Example",
            "content": "hi"
        }))
        .unwrap();
        assert_eq!(page.kind(), SourceKind::Webpage);
        assert_eq!(page.url(), Some(""));
    }

    #[test]
    fn test_legacy_message_shape() {
        let m: Message = serde_json::from_value(json!({
            "id": 1,
            "type": "assistant",
            "content": "Hi!"
        }))
        .unwrap();
        assert_eq!(m.role, Role::Assistant);
        assert_eq!(m.id, "1");
        assert!(m.citations.is_none());
    }

    #[test]
    fn test_message_without_id() {
        let m: Message = serde_json::from_value(json!({
            "role": "user",
            "content": "what does this do?"
        }))
        .unwrap();
        assert_eq!(m.id, "");
        assert_eq!(m.content, "what does this do?");
    }

    #[test]
    fn test_message_feedback_roundtrip() {
        let m: Message = serde_json::from_value(json!({
            "id": "a",
            "role": "user",
            "content": "q",
            "feedback": "down"
        }))
        .unwrap();
        assert_eq!(m.feedback, Some(Feedback::Down));
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["role"], "user");
        assert!(v.get("citations").is_none());
    }
}
