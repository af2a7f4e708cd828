//! Terminal User Interface.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard dispatch
//! - `events` - background task results
//! - `helpers` - background task spawning
//! - `render` - view dispatch, full-screen loading and retry states
//! - `header`, `card`, `saved`, `status`, `help` - widgets

mod card;
mod events;
mod header;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod saved;
mod status;

pub use loop_runner::{run, Action};
