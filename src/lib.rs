//! # Layman
//!
//! Chat with an LLM about your own code and documents.
//!
//! Layman ingests uploaded files, GitHub repositories, and web pages into
//! bounded, summarized [`models::Source`] records, then answers questions
//! about them through a chat completion provider. Replies carry a naive
//! list of the sources they mention.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Files / GitHub / │──▶│   Ingest     │──▶│   Source    │
//! │    Web pages     │   │ classify +   │   │  (bounded)  │
//! └──────────────────┘   │ summarize    │   └──────┬──────┘
//!                        └──────────────┘          │
//!                                                  ▼
//!                   ┌──────────┐   ┌────────────────────────┐
//!                   │   LLM    │◀──│ Prompt + citations     │
//!                   └──────────┘   └────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! layman serve                                  # start the HTTP service
//! layman inspect src/main.rs                    # classify and summarize a file
//! layman repo https://github.com/tokio-rs/axum  # digest a repository
//! layman chat --file README.md                  # interactive session
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Sources, messages, and their JSON shapes |
//! | [`classify`] | Filename → category and language |
//! | [`summarize`] | Per-category file digests |
//! | [`truncate`] | Size caps and truncation markers |
//! | [`github`] | GitHub repository fetcher |
//! | [`web`] | Web page fetcher and HTML text extraction |
//! | [`ingest`] | Builds sources from uploads, repositories, and pages |
//! | [`prompt`] | Prompt assembly and citation extraction |
//! | [`llm`] | Chat completion provider abstraction |
//! | [`chat`] | One stateless chat turn |
//! | [`session`] | Client-held conversation state |
//! | [`server`] | HTTP service |

pub mod chat;
pub mod classify;
pub mod config;
pub mod error;
pub mod github;
pub mod ingest;
pub mod inspect;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod repl;
pub mod server;
pub mod session;
pub mod summarize;
pub mod truncate;
pub mod web;
