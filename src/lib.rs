//! Readalong - text-to-speech with spoken-word highlighting
//!
//! Feeds paragraphs of text to a platform speech engine, tracks how much of
//! the text has been spoken, and keeps a styled copy of the text with the
//! word currently being spoken highlighted.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod speech;
pub mod styled;

pub use coordinator::{PlaybackCounters, SpeechCoordinator, SpeechListener, SpeechSettings};
pub use error::{ReadalongError, Result};
pub use styled::{Color, Font, Style, StyleRun, StyledText};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "readalong";
