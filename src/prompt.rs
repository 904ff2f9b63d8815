//! Prompt assembly and citation extraction.
//!
//! Both functions are pure. With no sources the model is steered toward
//! clarifying questions; with sources, each one becomes a labeled block in
//! a context section ahead of the user's message.

use serde::Serialize;

use crate::models::{Message, Source, SourceDetails};

pub const SYSTEM_PROMPT: &str = "You are Layman, a helpful AI assistant that helps non-technical users understand how their applications work.

Your role is to:
1. Ask clarifying questions when users give vague requests
2. Explain technical concepts in plain language
3. Provide citations to relevant code files, APIs, or documentation
4. Help users understand flows, dependencies, and system architecture

Always be conversational, helpful, and ask follow-up questions to better understand what the user needs.";

/// System and user prompt pair sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Assemble the prompt for one chat turn.
///
/// History is serialized in full; callers that want a shorter window trim
/// it beforehand.
pub fn build_prompt(message: &str, history: &[Message], sources: &[Source]) -> Prompt {
    let history_json = if history.is_empty() {
        "No previous context".to_string()
    } else {
        serde_json::to_string(history).unwrap_or_else(|_| "No previous context".to_string())
    };

    let user = if sources.is_empty() {
        format!(
            "User message: \"{message}\"

Previous conversation context: {history_json}

Please respond with clarifying questions to help understand what the user needs. Be specific and ask about:
- Which part of the system they're asking about
- What their role is (PM, designer, support, etc.)
- Whether they need technical details or business impact
- Any specific scenarios or edge cases they're concerned about

Format your response as a natural conversation, not a list of questions."
        )
    } else {
        let context = sources
            .iter()
            .map(source_block)
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "Context from the user's sources:

{context}

User message: \"{message}\"

Previous conversation context: {history_json}

Answer using the context above. Explain in plain language and cite the specific sources you relied on by name. If the context does not cover the question, say so and ask a clarifying question."
        )
    };

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// `name (type):` header, kind-specific metadata lines, then the content.
fn source_block(source: &Source) -> String {
    let mut block = format!("{} ({}):\n", source.name, source.kind());
    match &source.details {
        SourceDetails::File {
            language, size, ..
        } => {
            block.push_str(&format!("Language: {}\nSize: {} bytes\n", language, size));
        }
        SourceDetails::Repository { url, .. } if !url.is_empty() => {
            block.push_str(&format!("URL: {}\n", url));
        }
        SourceDetails::Webpage {
            url, description, ..
        } => {
            if !url.is_empty() {
                block.push_str(&format!("URL: {}\n", url));
            }
            if !description.is_empty() {
                block.push_str(&format!("Description: {}\n", description));
            }
        }
        _ => {}
    }
    block.push_str(&source.content);
    block
}

/// Names of sources mentioned in `response`, case-insensitively, in source
/// order, each at most once.
///
/// A plain substring test: coincidental matches count and paraphrases do
/// not. Sources with an empty name are never cited.
pub fn extract_citations(response: &str, sources: &[Source]) -> Vec<String> {
    let haystack = response.to_lowercase();
    let mut cited: Vec<String> = Vec::new();

    for source in sources {
        if source.name.is_empty() || cited.contains(&source.name) {
            continue;
        }
        if haystack.contains(&source.name.to_lowercase()) {
            cited.push(source.name.clone());
        }
    }

    cited
}
