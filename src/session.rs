//! Client-side conversation state.
//!
//! The service keeps nothing between requests; a [`Session`] is owned by
//! the client (the interactive `layman chat` loop) and passed by reference
//! to each turn. Nothing here is persisted.

use crate::chat::{run_turn, ChatReply};
use crate::error::{Error, Result};
use crate::llm::CompletionProvider;
use crate::models::{Feedback, Message, Role, Source};

/// Assistant message recorded in place of a reply when a turn fails.
pub const FAILED_TURN_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<Message>,
    sources: Vec<Source>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn add_source(&mut self, source: Source) {
        self.sources.push(source);
    }

    /// Drop the source with `id` from the active set, returning it.
    pub fn remove_source(&mut self, id: &str) -> Option<Source> {
        let idx = self.sources.iter().position(|s| s.id == id)?;
        Some(self.sources.remove(idx))
    }

    /// Append an assistant note that is not a model reply (e.g. "Removed source").
    pub fn note(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content, Vec::new()));
    }

    /// Run one turn and record both the user message and the reply.
    ///
    /// When the turn fails, [`FAILED_TURN_REPLY`] is recorded as the reply
    /// and the error is returned.
    pub async fn ask(
        &mut self,
        provider: &dyn CompletionProvider,
        message: &str,
        history_window: Option<usize>,
    ) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        let result = run_turn(
            provider,
            message,
            &self.messages,
            &self.sources,
            history_window,
        )
        .await;

        self.messages.push(Message::user(message.trim()));
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                self.messages
                    .push(Message::assistant(FAILED_TURN_REPLY, Vec::new()));
                return Err(e);
            }
        };
        self.messages.push(Message::assistant(
            reply.response.clone(),
            reply.citations.clone(),
        ));
        Ok(reply)
    }

    /// Set feedback on the latest assistant message. Returns `false` if there is none.
    pub fn rate_last_reply(&mut self, feedback: Feedback) -> bool {
        match self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.role == Role::Assistant)
        {
            Some(message) => {
                message.feedback = Some(feedback);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_file;
    use crate::prompt::Prompt;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl CompletionProvider for Echo {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, _prompt: &Prompt) -> anyhow::Result<String> {
            Ok("Look at main.rs".to_string())
        }
    }

    #[tokio::test]
    async fn test_ask_appends_messages() {
        let mut session = Session::new();
        session.add_source(ingest_file("main.rs", b"fn main() {}").unwrap());

        let reply = session.ask(&Echo, "what is this?", None).await.unwrap();
        assert_eq!(reply.citations, vec!["main.rs"]);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(
            session.messages()[1].citations.as_deref(),
            Some(&["main.rs".to_string()][..])
        );
    }

    struct Down;

    #[async_trait]
    impl CompletionProvider for Down {
        fn model_name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _prompt: &Prompt) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_empty_message_not_recorded() {
        let mut session = Session::new();
        assert!(session.ask(&Echo, "  ", None).await.is_err());
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_failed_turn_records_apology() {
        let mut session = Session::new();
        assert!(session.ask(&Down, "hello", None).await.is_err());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].content, "hello");
        assert_eq!(session.messages()[1].role, Role::Assistant);
        assert_eq!(session.messages()[1].content, FAILED_TURN_REPLY);

        // The apology is sent as history on the next turn.
        session.ask(&Echo, "again", None).await.unwrap();
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn test_remove_source() {
        let mut session = Session::new();
        let src = ingest_file("a.md", b"# A").unwrap();
        let id = src.id.clone();
        session.add_source(src);
        assert!(session.remove_source("missing").is_none());
        let removed = session.remove_source(&id).unwrap();
        assert_eq!(removed.name, "a.md");
        assert!(session.sources().is_empty());
    }

    #[test]
    fn test_rate_last_reply() {
        let mut session = Session::new();
        assert!(!session.rate_last_reply(Feedback::Up));
        session.note("first");
        session.note("second");
        assert!(session.rate_last_reply(Feedback::Down));
        assert_eq!(session.messages()[1].feedback, Some(Feedback::Down));
        assert_eq!(session.messages()[0].feedback, None);
    }
}
