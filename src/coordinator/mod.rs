//! Speech coordinator
//!
//! The coordinator owns the text being read and the voice settings. It
//! submits one engine request per paragraph and turns the engine's progress
//! events into a progress ratio and a styled copy of the text with the
//! current word highlighted, which it forwards to the registered listener.
//!
//! Everything runs on the owner's thread: engine events are pulled with
//! [`SpeechCoordinator::pump`] (or fed in with
//! [`SpeechCoordinator::handle_event`]) and the listener is called
//! synchronously from there.

pub mod counters;
pub mod listener;

pub use counters::PlaybackCounters;
pub use listener::SpeechListener;

use crate::config::Config;
use crate::speech::{split_paragraphs, EngineEvent, SpeechEngine, SpeechRequest, POST_SEGMENT_DELAY};
use crate::styled::{Color, Style, StyledText, BASE_FONT, FALLBACK_FONT};
use log::{debug, info, warn};
use std::ops::Range;

/// Color of text that is not being spoken
pub const DEFAULT_TEXT_COLOR: Color = Color::BLACK;

/// Voice settings forwarded with every segment
///
/// Values are passed to the engine unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    /// Normalized 0.0-1.0, 0.5 is the engine's normal rate
    pub rate: f32,
    /// Multiplier, 1.0 is normal
    pub pitch: f32,
    /// 0.0-1.0
    pub volume: f32,
    /// Preferred voice language, e.g. `en-US`
    pub voice_language: Option<String>,
}

impl SpeechSettings {
    pub const DEFAULT_RATE: f32 = 0.5;
    pub const DEFAULT_PITCH: f32 = 1.0;
    pub const DEFAULT_VOLUME: f32 = 1.0;
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: Self::DEFAULT_RATE,
            pitch: Self::DEFAULT_PITCH,
            volume: Self::DEFAULT_VOLUME,
            voice_language: None,
        }
    }
}

/// Reads text aloud and tracks what is being spoken
pub struct SpeechCoordinator {
    engine: Box<dyn SpeechEngine>,
    listener: Option<Box<dyn SpeechListener>>,
    settings: SpeechSettings,
    highlight_color: Color,

    /// Source text
    text: String,

    /// Copy of `text` carrying the highlight
    styled: StyledText,

    counters: PlaybackCounters,

    /// Range currently highlighted in `styled`
    highlight: Option<Range<usize>>,
}

impl SpeechCoordinator {
    /// Create a coordinator with default settings
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            listener: None,
            settings: SpeechSettings::default(),
            highlight_color: Color::ORANGE,
            text: String::new(),
            styled: StyledText::with_font("", BASE_FONT.clone()),
            counters: PlaybackCounters::default(),
            highlight: None,
        }
    }

    /// Create a coordinator using persisted settings
    pub fn with_config(engine: Box<dyn SpeechEngine>, config: &Config) -> Self {
        let mut coordinator = Self::new(engine);
        coordinator.settings = config.speech_settings();
        coordinator.highlight_color = config.highlight_color();
        info!(
            "Coordinator settings: rate {}, pitch {}, volume {}, voice {:?}",
            coordinator.settings.rate,
            coordinator.settings.pitch,
            coordinator.settings.volume,
            coordinator.settings.voice_language
        );
        coordinator
    }

    pub fn set_listener(&mut self, listener: Box<dyn SpeechListener>) {
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn settings(&self) -> &SpeechSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SpeechSettings {
        &mut self.settings
    }

    pub fn highlight_color(&self) -> Color {
        self.highlight_color
    }

    /// Color used for the word being spoken
    ///
    /// Takes effect from the next word.
    pub fn set_highlight_color(&mut self, color: Color) {
        self.highlight_color = color;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn styled_text(&self) -> &StyledText {
        &self.styled
    }

    pub fn counters(&self) -> PlaybackCounters {
        self.counters
    }

    /// Range of the styled text currently highlighted
    pub fn highlight(&self) -> Option<Range<usize>> {
        self.highlight.clone()
    }

    /// True while the engine has segments queued, speaking or paused
    pub fn is_speaking(&self) -> bool {
        self.engine.is_producing()
    }

    /// Replace the text to read
    ///
    /// Resets the styled text and counters. Call [`stop`](Self::stop) first
    /// if the previous text is still being spoken.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.styled = StyledText::with_font(&self.text, BASE_FONT.clone());
        self.counters = PlaybackCounters::default();
        self.highlight = None;
        debug!("Text set: {} UTF-16 units", self.styled.len());
    }

    /// Start reading the text, or resume if the engine is still busy
    pub fn speak(&mut self) {
        if self.engine.is_producing() {
            info!("Engine busy, resuming instead of restarting");
            if let Err(e) = self.engine.resume() {
                warn!("Failed to resume speech: {}", e);
            }
            return;
        }

        self.clear_highlight();

        let segments = split_paragraphs(&self.text);
        self.counters = PlaybackCounters::new(segments.len());
        if segments.is_empty() {
            debug!("Nothing to speak");
            return;
        }
        info!("Speaking {} segments", segments.len());

        for segment in segments {
            let request = SpeechRequest {
                text: segment.text,
                rate: self.settings.rate,
                pitch: self.settings.pitch,
                volume: self.settings.volume,
                voice_language: self.settings.voice_language.clone(),
                post_delay: POST_SEGMENT_DELAY,
            };
            self.counters.total_length += segment.len;
            if let Err(e) = self.engine.submit(request) {
                warn!("Failed to submit segment: {}", e);
            }
        }
        debug!("Total text length: {}", self.counters.total_length);
    }

    /// Pause at the next word boundary
    pub fn pause(&mut self) {
        if let Err(e) = self.engine.pause() {
            warn!("Failed to pause speech: {}", e);
        }
    }

    /// Stop immediately, dropping queued segments
    pub fn stop(&mut self) {
        if let Err(e) = self.engine.stop() {
            warn!("Failed to stop speech: {}", e);
        }
    }

    /// Handle every event the engine has produced so far
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let events = self.engine.drain_events();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::SegmentStarted => self.on_segment_start(),
            EngineEvent::WordBoundary {
                range,
                segment_length,
            } => self.on_word_boundary(range, segment_length),
            EngineEvent::SegmentFinished { segment_length } => {
                self.on_segment_finish(segment_length)
            }
        }
    }

    pub fn on_segment_start(&mut self) {
        self.counters.segment_started();
        debug!(
            "Segment {}/{} started",
            self.counters.current_segment, self.counters.total_segments
        );
        if let Some(listener) = self.listener.as_mut() {
            listener.on_start();
        }
    }

    /// The engine is about to speak `range` of the current segment
    pub fn on_word_boundary(&mut self, range: Range<usize>, segment_length: usize) {
        let start = self.counters.offset_in_text(range.start);
        let in_text = start..start + range.len();
        let progress = self.counters.progress_at(range.start);
        debug!(
            "Word {:?} of {} -> {:?} in text, progress {:.3}",
            range, segment_length, in_text, progress
        );

        self.clear_highlight();

        let font = self
            .styled
            .font_at(in_text.start)
            .cloned()
            .unwrap_or_else(|| FALLBACK_FONT.clone());
        self.styled
            .set_style(in_text.clone(), Style::new(self.highlight_color, font));
        self.highlight = Some(in_text);

        self.notify_progress(progress);
    }

    pub fn on_segment_finish(&mut self, segment_length: usize) {
        self.counters.segment_finished(segment_length);
        debug!(
            "Segment {}/{} finished, spoken {}/{}",
            self.counters.current_segment,
            self.counters.total_segments,
            self.counters.spoken_length,
            self.counters.total_length
        );

        if self.counters.on_last_segment() {
            self.clear_highlight();
        }
        let progress = self.counters.progress();
        self.notify_progress(progress);

        if let Some(listener) = self.listener.as_mut() {
            listener.on_finish();
        }
    }

    /// Restore the highlighted range to the default color, keeping its font
    fn clear_highlight(&mut self) {
        if let Some(range) = self.highlight.take() {
            let font = self
                .styled
                .font_at(range.start)
                .cloned()
                .unwrap_or_else(|| FALLBACK_FONT.clone());
            self.styled
                .set_style(range, Style::new(DEFAULT_TEXT_COLOR, font));
        }
    }

    fn notify_progress(&mut self, ratio: f32) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_progress(ratio, &self.styled);
        }
    }
}
