//! # Layman CLI (`layman`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `layman serve` | Start the HTTP service |
//! | `layman inspect <path>` | Classify and summarize a local file |
//! | `layman repo <url>` | Fetch a GitHub repository digest |
//! | `layman page <url>` | Fetch a web page digest |
//! | `layman chat` | Interactive session in the terminal |
//!
//! ## Examples
//!
//! ```bash
//! layman --config ./config/layman.toml serve
//! layman page https://doc.rust-lang.org/book/
//! layman chat --github https://github.com/tokio-rs/axum --file notes.md
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use layman::{config, inspect, logging, repl, server};

const DEFAULT_CONFIG: &str = "./config/layman.toml";

/// Layman: chat with an LLM about your files, repositories, and web pages.
#[derive(Parser)]
#[command(name = "layman", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/layman.toml`; built-in defaults are used when
    /// that file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service.
    ///
    /// Binds to `[server].bind` and serves `/chat`, `/sources/files`,
    /// `/sources/github`, `/sources/url`, and `/health`.
    Serve,

    /// Classify and summarize a local file as if it were uploaded.
    Inspect {
        path: PathBuf,
    },

    /// Fetch a GitHub repository digest and print its summary.
    Repo {
        /// Repository URL, e.g. `https://github.com/owner/repo`.
        url: String,
    },

    /// Fetch a web page digest and print its summary.
    Page {
        url: String,
    },

    /// Start an interactive chat session.
    ///
    /// Sources given here are loaded before the first prompt; more can be
    /// added with `/add-file`, `/add-github`, and `/add-url`.
    Chat {
        /// Local file to load (repeatable).
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// GitHub repository URL to load (repeatable).
        #[arg(long = "github")]
        repos: Vec<String>,

        /// Web page URL to load (repeatable).
        #[arg(long = "url")]
        urls: Vec<String>,
    },
}

fn load(path: Option<&PathBuf>) -> Result<config::Config> {
    match path {
        Some(p) => config::load_config(p),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if default.exists() {
                config::load_config(&default)
            } else {
                Ok(config::Config::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load(cli.config.as_ref())?;
    logging::init(&cfg.log.filter);

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Inspect { path } => {
            inspect::run_inspect(&path)?;
        }
        Commands::Repo { url } => {
            inspect::run_repo(&cfg, &url).await?;
        }
        Commands::Page { url } => {
            inspect::run_page(&cfg, &url).await?;
        }
        Commands::Chat { files, repos, urls } => {
            repl::run_chat(&cfg, files, repos, urls).await?;
        }
    }

    Ok(())
}
