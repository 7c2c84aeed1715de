//! Speech engine abstraction
//!
//! The coordinator never talks to a platform speech API directly. It submits
//! [`SpeechRequest`]s through the [`SpeechEngine`] trait and later receives
//! [`EngineEvent`]s back, in the order the segments were submitted.

use crate::{ReadalongError, Result};
use log::info;
use std::ops::Range;
use std::time::Duration;

/// Pause inserted after each segment
pub const POST_SEGMENT_DELAY: Duration = Duration::from_millis(5);

/// One segment to be spoken, with the voice settings to speak it with
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// Normalized 0.0-1.0, 0.5 is the engine's normal rate
    pub rate: f32,
    /// Multiplier, 1.0 is the engine's normal pitch
    pub pitch: f32,
    /// 0.0-1.0
    pub volume: f32,
    /// BCP 47 language code such as `en-US`
    pub voice_language: Option<String>,
    pub post_delay: Duration,
}

/// Progress events emitted by an engine
///
/// Offsets and lengths are UTF-16 code units within the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine started speaking the next submitted segment
    SegmentStarted,
    /// The engine is about to speak `range` of the current segment
    WordBoundary {
        range: Range<usize>,
        segment_length: usize,
    },
    /// The engine finished speaking the current segment
    SegmentFinished { segment_length: usize },
}

/// Speech engine trait
///
/// Implementations queue submitted segments and speak them first-in,
/// first-out. Events may be produced on any thread but are only handed out
/// through [`SpeechEngine::drain_events`], so the owner processes them on
/// its own thread.
pub trait SpeechEngine {
    /// Queue a segment behind anything already queued
    fn submit(&mut self, request: SpeechRequest) -> Result<()>;

    /// Pause at the next word boundary
    fn pause(&mut self) -> Result<()>;

    /// Continue after a pause
    fn resume(&mut self) -> Result<()>;

    /// Stop immediately and discard queued segments
    fn stop(&mut self) -> Result<()>;

    /// True while segments are queued, being spoken, or paused
    fn is_producing(&self) -> bool;

    /// Take all events produced since the last call, oldest first
    fn drain_events(&mut self) -> Vec<EngineEvent>;
}

/// Create the platform speech engine
pub fn create_engine() -> Result<Box<dyn SpeechEngine>> {
    let platform = std::env::consts::OS;
    info!("Creating native speech engine for platform: {}", platform);

    use super::backends::native::NativeEngine;

    match NativeEngine::new() {
        Ok(engine) => {
            info!("Successfully initialized native TTS backend");
            Ok(Box::new(engine))
        }
        Err(e) => Err(ReadalongError::Speech(format!(
            "Failed to initialize speech backend for platform '{}': {}",
            platform, e
        ))),
    }
}
