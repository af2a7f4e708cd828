//! Terminal client for an endless feed of Wikipedia article summaries.
//!
//! - `content` - MediaWiki adapter (random batches, search)
//! - `api` - `/api` backend adapter (session, likes, views, history)
//! - `controller` - feed state machine and command runner
//! - `app`, `ui` - application state and the ratatui front end

pub mod api;
pub mod app;
pub mod config;
pub mod content;
pub mod controller;
pub mod keybindings;
pub mod theme;
pub mod types;
pub mod ui;
pub mod util;

#[cfg(test)]
mod testing;
