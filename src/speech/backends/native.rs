//! Native Rust TTS backend using the tts crate
//!
//! The `tts` crate provides a unified interface to:
//! - Speech Dispatcher on Linux
//! - AVFoundation on macOS/iOS
//! - WinRT / SAPI on Windows
//!
//! It reports when an utterance begins and ends, but not word boundaries and
//! it has no pause. This backend fills both gaps: each segment gets a single
//! boundary event spanning the whole segment, and pausing stops the platform
//! while keeping the unfinished segments for [`SpeechEngine::resume`].

use crate::speech::{EngineEvent, SpeechEngine, SpeechRequest};
use crate::{ReadalongError, Result};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use tts::Tts as TtsCrate;

/// Utterance callbacks forwarded from the platform thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Begin,
    End,
}

/// A submitted segment that has not finished yet
#[derive(Debug)]
struct Pending {
    request: SpeechRequest,
    len: usize,
    /// Start event already emitted
    started: bool,
}

/// Voice parameters currently applied to the platform
#[derive(Debug, Default, PartialEq)]
struct Applied {
    rate: Option<f32>,
    pitch: Option<f32>,
    volume: Option<f32>,
    voice_language: Option<String>,
}

/// Bookkeeping for submitted segments, independent of the platform
///
/// Turns utterance begin/end signals into [`EngineEvent`]s in FIFO order.
#[derive(Debug, Default)]
struct SegmentQueue {
    /// Submitted segments, head is the one being spoken
    pending: VecDeque<Pending>,

    /// Events ready for the owner
    ready: VecDeque<EngineEvent>,

    /// Platform stopped by `pause`, pending segments kept
    paused: bool,
}

impl SegmentQueue {
    fn push(&mut self, request: SpeechRequest) {
        let len = request.text.encode_utf16().count();
        self.pending.push_back(Pending {
            request,
            len,
            started: false,
        });
        if !self.paused {
            self.finish_silent_segments();
        }
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    /// Mark paused; false if there was nothing to pause
    fn pause(&mut self) -> bool {
        if self.paused || self.pending.is_empty() {
            return false;
        }
        self.paused = true;
        true
    }

    /// Leave the paused state, returning the segments to hand back to the platform
    fn resume(&mut self) -> Option<Vec<SpeechRequest>> {
        if !self.paused {
            return None;
        }
        self.paused = false;
        let requests = self.pending.iter().map(|p| p.request.clone()).collect();
        self.finish_silent_segments();
        Some(requests)
    }

    /// Drop pending segments and any events not yet handed out
    fn clear(&mut self) {
        self.pending.clear();
        self.ready.clear();
        self.paused = false;
    }

    fn is_producing(&self) -> bool {
        self.paused || !self.pending.is_empty() || !self.ready.is_empty()
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        self.ready.drain(..).collect()
    }

    /// Emit start/finish for empty segments that reached the head of the queue
    ///
    /// The platform never sees them, so nothing else would finish them.
    fn finish_silent_segments(&mut self) {
        while self.pending.front().map_or(false, |p| p.len == 0) {
            if let Some(pending) = self.pending.pop_front() {
                if !pending.started {
                    self.ready.push_back(EngineEvent::SegmentStarted);
                }
                self.ready
                    .push_back(EngineEvent::SegmentFinished { segment_length: 0 });
            }
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Begin => {
                let Some(head) = self.pending.front_mut() else {
                    debug!("Utterance began with nothing queued");
                    return;
                };
                if head.started {
                    // Resubmitted after a pause
                    return;
                }
                head.started = true;
                let len = head.len;
                self.ready.push_back(EngineEvent::SegmentStarted);
                self.ready.push_back(EngineEvent::WordBoundary {
                    range: 0..len,
                    segment_length: len,
                });
            }
            Signal::End => {
                let Some(done) = self.pending.pop_front() else {
                    debug!("Utterance ended with nothing queued");
                    return;
                };
                self.ready.push_back(EngineEvent::SegmentFinished {
                    segment_length: done.len,
                });
                self.finish_silent_segments();
            }
        }
    }
}

/// Native TTS backend using the tts crate
pub struct NativeEngine {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    queue: SegmentQueue,

    /// Utterance callbacks from the platform
    signals: Receiver<Signal>,

    applied: Applied,
}

impl NativeEngine {
    /// Create a new native speech engine
    ///
    /// Fails if the platform cannot report utterance progress, since nothing
    /// could be tracked without it.
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| ReadalongError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        let features = tts.supported_features();
        if !features.utterance_callbacks {
            return Err(ReadalongError::Speech(
                "Platform TTS does not report utterance progress".to_string(),
            ));
        }

        let (tx, signals) = mpsc::channel();
        let begin_tx = tx.clone();
        tts.on_utterance_begin(Some(Box::new(move |_| {
            let _ = begin_tx.send(Signal::Begin);
        })))
        .map_err(|e| ReadalongError::Speech(format!("Failed to register callback: {}", e)))?;
        tts.on_utterance_end(Some(Box::new(move |_| {
            let _ = tx.send(Signal::End);
        })))
        .map_err(|e| ReadalongError::Speech(format!("Failed to register callback: {}", e)))?;

        debug!("Native TTS backend created successfully");

        Ok(Self {
            tts,
            queue: SegmentQueue::default(),
            signals,
            applied: Applied::default(),
        })
    }

    /// Map a normalized rate (0.5 = normal) onto the platform range
    fn convert_rate(&self, rate: f32) -> f32 {
        let rate = rate.clamp(0.0, 1.0);
        let (min, normal, max) = (
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        if rate <= 0.5 {
            min + (normal - min) * (rate / 0.5)
        } else {
            normal + (max - normal) * ((rate - 0.5) / 0.5)
        }
    }

    /// Map a pitch multiplier onto the platform range
    fn convert_pitch(&self, pitch: f32) -> f32 {
        (self.tts.normal_pitch() * pitch).clamp(self.tts.min_pitch(), self.tts.max_pitch())
    }

    /// Map a 0.0-1.0 volume onto the platform range
    fn convert_volume(&self, volume: f32) -> f32 {
        let (min, max) = (self.tts.min_volume(), self.tts.max_volume());
        min + (max - min) * volume.clamp(0.0, 1.0)
    }

    /// Apply the request's voice parameters if they differ from the last ones
    fn apply_voice_settings(&mut self, request: &SpeechRequest) -> Result<()> {
        let features = self.tts.supported_features();

        if self.applied.rate != Some(request.rate) {
            if features.rate {
                let rate = self.convert_rate(request.rate);
                debug!("Setting rate to {} (platform {})", request.rate, rate);
                self.tts
                    .set_rate(rate)
                    .map_err(|e| ReadalongError::Speech(format!("Failed to set rate: {}", e)))?;
            } else {
                warn!("Rate control not supported on this platform");
            }
            self.applied.rate = Some(request.rate);
        }

        if self.applied.pitch != Some(request.pitch) {
            if features.pitch {
                let pitch = self.convert_pitch(request.pitch);
                debug!("Setting pitch to {} (platform {})", request.pitch, pitch);
                self.tts
                    .set_pitch(pitch)
                    .map_err(|e| ReadalongError::Speech(format!("Failed to set pitch: {}", e)))?;
            } else {
                warn!("Pitch control not supported on this platform");
            }
            self.applied.pitch = Some(request.pitch);
        }

        if self.applied.volume != Some(request.volume) {
            if features.volume {
                let volume = self.convert_volume(request.volume);
                debug!("Setting volume to {} (platform {})", request.volume, volume);
                self.tts
                    .set_volume(volume)
                    .map_err(|e| ReadalongError::Speech(format!("Failed to set volume: {}", e)))?;
            } else {
                warn!("Volume control not supported on this platform");
            }
            self.applied.volume = Some(request.volume);
        }

        if self.applied.voice_language != request.voice_language {
            if let Some(code) = &request.voice_language {
                if features.voice {
                    self.select_voice(code)?;
                } else {
                    warn!("Voice selection not supported on this platform");
                }
            }
            self.applied.voice_language = request.voice_language.clone();
        }

        Ok(())
    }

    /// Select the first voice speaking `code`; unknown codes keep the current voice
    fn select_voice(&mut self, code: &str) -> Result<()> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| ReadalongError::Speech(format!("Failed to get voices: {}", e)))?;

        let wanted = code.to_lowercase();
        let found = voices.iter().find(|voice| {
            let tag = voice.language().to_string().to_lowercase();
            tag == wanted || tag.split('-').next() == Some(wanted.as_str())
        });

        match found {
            Some(voice) => {
                debug!("Selecting voice: {:?}", voice);
                self.tts
                    .set_voice(voice)
                    .map_err(|e| ReadalongError::Speech(format!("Failed to set voice: {}", e)))?;
            }
            None => warn!(
                "No voice for language '{}' (have {} voices), using default",
                code,
                voices.len()
            ),
        }

        Ok(())
    }

    /// Hand a segment to the platform queue
    fn speak_segment(&mut self, request: &SpeechRequest) -> Result<()> {
        if request.text.is_empty() {
            return Ok(());
        }
        self.apply_voice_settings(request)?;

        debug!("Speaking: {}", request.text);
        self.tts.speak(request.text.as_str(), false).map_err(|e| {
            error!("Failed to speak: {}", e);
            ReadalongError::Speech(format!("Speak failed: {}", e))
        })?;

        Ok(())
    }

    fn take_signals(&mut self) {
        while let Ok(signal) = self.signals.try_recv() {
            self.queue.handle_signal(signal);
        }
    }

    fn discard_signals(&mut self) {
        while self.signals.try_recv().is_ok() {}
    }
}

impl SpeechEngine for NativeEngine {
    fn submit(&mut self, request: SpeechRequest) -> Result<()> {
        if request.post_delay > std::time::Duration::ZERO {
            debug!("Post-segment delay not supported, ignoring {:?}", request.post_delay);
        }

        if !self.queue.is_paused() {
            self.speak_segment(&request)?;
        }
        self.queue.push(request);

        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.queue.is_paused() {
            return Ok(());
        }
        // Take callbacks that already happened before the platform forgets them
        self.take_signals();
        if !self.queue.pause() {
            return Ok(());
        }

        info!("Pausing speech ({} segments pending)", self.queue.len());
        self.tts.stop().map_err(|e| {
            error!("Failed to pause speech: {}", e);
            ReadalongError::Speech(format!("Pause failed: {}", e))
        })?;

        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        // Anything the stopped platform reported after the pause is stale
        if self.queue.is_paused() {
            self.discard_signals();
        }
        let Some(requests) = self.queue.resume() else {
            return Ok(());
        };

        info!("Resuming speech ({} segments pending)", requests.len());
        for request in &requests {
            self.speak_segment(request)?;
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Stopping speech, discarding {} segments", self.queue.len());
        self.queue.clear();
        self.tts.stop().map_err(|e| {
            error!("Failed to stop speech: {}", e);
            ReadalongError::Speech(format!("Stop failed: {}", e))
        })?;
        self.discard_signals();

        Ok(())
    }

    fn is_producing(&self) -> bool {
        self.queue.is_producing()
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        if !self.queue.is_paused() {
            self.take_signals();
        }
        self.queue.take_events()
    }
}
