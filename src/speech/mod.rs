//! Speech synthesis system

pub mod backends;
pub mod engine;
pub mod segments;

pub use engine::{create_engine, EngineEvent, SpeechEngine, SpeechRequest, POST_SEGMENT_DELAY};
pub use segments::{split_paragraphs, Segment};
