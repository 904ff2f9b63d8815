//! Interactive terminal client (`layman chat`).
//!
//! Holds a [`Session`] for the lifetime of the process and talks to the
//! completion provider directly, without going through the HTTP service.
//!
//! Lines starting with `/` are commands; anything else is a question.

use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::github::GitHubClient;
use crate::ingest::{ingest_page, ingest_repository};
use crate::inspect::load_local_file;
use crate::llm::{create_provider, CompletionProvider};
use crate::models::{Feedback, Source};
use crate::session::Session;
use crate::web::PageFetcher;

const HELP: &str = "Commands:
  /add-file <path>     add a local file
  /add-github <url>    add a GitHub repository
  /add-url <url>       add a web page
  /remove <id>         remove a source
  /sources             list active sources
  /up, /down           rate the last reply
  /help                show this help
  /quit                exit";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    AddFile(PathBuf),
    AddGithub(String),
    AddUrl(String),
    Remove(String),
    Sources,
    Rate(Feedback),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if !line.starts_with('/') {
        return Command::Ask(line.to_string());
    }

    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    match (cmd, arg.is_empty()) {
        ("/add-file", false) => Command::AddFile(PathBuf::from(arg)),
        ("/add-github", false) => Command::AddGithub(arg.to_string()),
        ("/add-url", false) => Command::AddUrl(arg.to_string()),
        ("/remove", false) => Command::Remove(arg.to_string()),
        ("/sources", _) => Command::Sources,
        ("/up", _) => Command::Rate(Feedback::Up),
        ("/down", _) => Command::Rate(Feedback::Down),
        ("/help", _) => Command::Help,
        ("/quit" | "/exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

struct Client {
    config: Config,
    github: GitHubClient,
    pages: PageFetcher,
    provider: std::sync::Arc<dyn CompletionProvider>,
    session: Session,
}

impl Client {
    fn added(&mut self, source: Source) {
        println!("added {} ({}) id={}", source.name, source.kind(), source.id);
        self.session
            .note(format!("Successfully loaded content from {}", source.name));
        self.session.add_source(source);
    }

    async fn add(&mut self, cmd: &Command) {
        let result = match cmd {
            Command::AddFile(path) => load_local_file(path),
            Command::AddGithub(url) => ingest_repository(&self.github, url)
                .await
                .map_err(Into::into),
            Command::AddUrl(url) => ingest_page(&self.pages, url).await.map_err(Into::into),
            _ => return,
        };
        match result {
            Ok(source) => self.added(source),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    /// Returns `false` when the loop should stop.
    async fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Ask(q) if q.is_empty() => {}
            Command::Ask(q) => {
                match self
                    .session
                    .ask(self.provider.as_ref(), &q, self.config.llm.history_window)
                    .await
                {
                    Ok(reply) => {
                        println!("\n{}\n", reply.response);
                        if !reply.citations.is_empty() {
                            println!("sources cited: {}\n", reply.citations.join(", "));
                        }
                    }
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            Command::AddFile(_) | Command::AddGithub(_) | Command::AddUrl(_) => {
                self.add(&cmd).await;
            }
            Command::Remove(id) => match self.session.remove_source(&id) {
                Some(source) => {
                    println!("removed {}", source.name);
                    self.session.note(format!("Removed source: {}", source.name));
                }
                None => eprintln!("no source with id {}", id),
            },
            Command::Sources => {
                if self.session.sources().is_empty() {
                    println!("no sources loaded");
                }
                for s in self.session.sources() {
                    match s.url() {
                        Some(url) => println!(
                            "{:<28} {:<11} {} <{}>",
                            s.id,
                            s.kind().as_str(),
                            s.name,
                            url
                        ),
                        None => println!("{:<28} {:<11} {}", s.id, s.kind().as_str(), s.name),
                    }
                }
            }
            Command::Rate(feedback) => {
                if !self.session.rate_last_reply(feedback) {
                    eprintln!("nothing to rate yet");
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
            Command::Unknown(line) => eprintln!("unknown command: {} (try /help)", line),
        }
        true
    }
}

/// Run the interactive loop until `/quit` or end of input.
pub async fn run_chat(
    config: &Config,
    files: Vec<PathBuf>,
    repos: Vec<String>,
    urls: Vec<String>,
) -> Result<()> {
    let mut client = Client {
        config: config.clone(),
        github: GitHubClient::new(&config.fetch)?,
        pages: PageFetcher::new(&config.fetch)?,
        provider: create_provider(&config.llm)?,
        session: Session::new(),
    };

    let preload = files
        .into_iter()
        .map(Command::AddFile)
        .chain(repos.into_iter().map(Command::AddGithub))
        .chain(urls.into_iter().map(Command::AddUrl));
    for cmd in preload {
        client.add(&cmd).await;
    }

    println!(
        "Hi! I'm Layman. Ask me anything about your app, code, or technical questions. (/help for commands)"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !client.handle(parse_command(&line)).await {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_question() {
        assert_eq!(
            parse_command("  how does auth work?  "),
            Command::Ask("how does auth work?".into())
        );
    }

    #[test]
    fn test_add_commands() {
        assert_eq!(
            parse_command("/add-file src/main.rs"),
            Command::AddFile(PathBuf::from("src/main.rs"))
        );
        assert_eq!(
            parse_command("/add-github https://github.com/a/b"),
            Command::AddGithub("https://github.com/a/b".into())
        );
        assert_eq!(
            parse_command("/add-url   https://example.com "),
            Command::AddUrl("https://example.com".into())
        );
    }

    #[test]
    fn test_missing_argument_is_unknown() {
        assert!(matches!(parse_command("/add-file"), Command::Unknown(_)));
        assert!(matches!(parse_command("/remove"), Command::Unknown(_)));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("/sources"), Command::Sources);
        assert_eq!(parse_command("/up"), Command::Rate(Feedback::Up));
        assert_eq!(parse_command("/down"), Command::Rate(Feedback::Down));
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert!(matches!(parse_command("/bogus"), Command::Unknown(_)));
    }
}
