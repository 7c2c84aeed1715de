//! Presentation listener
//!
//! Hosts implement this to render playback state. The coordinator calls it
//! synchronously while handling engine events, on the coordinator's thread.

use crate::styled::StyledText;

pub trait SpeechListener {
    /// A segment started playing
    fn on_start(&mut self) {}

    /// A segment finished playing
    fn on_finish(&mut self) {}

    /// Playback progressed to `ratio` (0.0-1.0); `styled` is the text with
    /// the current word highlighted
    fn on_progress(&mut self, ratio: f32, styled: &StyledText);
}
