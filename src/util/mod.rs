//! Terminal text helpers and URL checks.
//!
//! ```
//! use wikifeed::util::{browsable_url, strip_control_chars, truncate_to_width};
//!
//! assert_eq!(strip_control_chars("\x1b[31mRust\x1b[0m"), "Rust");
//! assert_eq!(truncate_to_width("Encyclopedia", 6), "Encyc…");
//! assert!(browsable_url("file:///etc/passwd").is_err());
//! ```

mod links;
mod text;

pub use links::{browsable_url, open_in_browser, OpenUrlError};
pub use text::{display_width, one_line, strip_control_chars, truncate_to_width};

/// Longest search query accepted from the search box.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
