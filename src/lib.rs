//! desktop4mistral is a terminal chat client for the hosted Mistral API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation session, the single-flight dispatch
//!   worker and its lifecycle, and the [`core::app::App`] controller.
//! - [`commands`] intercepts slash commands (`/read`, `/wiki_id`,
//!   `/wiki_search`, `/git`, `/help`) before anything reaches the model.
//! - [`services`] provides the filesystem, web, MediaWiki and git
//!   collaborators those commands use.
//! - [`api`] defines the Mistral wire payloads and the reqwest-backed client.
//! - [`ui`] renders the terminal interface and runs the interactive loop.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod services;
pub mod ui;
pub mod utils;
