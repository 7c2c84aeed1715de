//! Playback counters and progress math

/// Counters for one `speak()` pass
///
/// Lengths are UTF-16 code units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCounters {
    /// Segments submitted
    pub total_segments: usize,
    /// 1-based index of the segment being spoken, 0 before the first starts
    pub current_segment: usize,
    /// Sum of all segment lengths
    pub total_length: usize,
    /// Length of finished segments, plus one per finished segment for the
    /// newline that separated it from the next
    ///
    /// This runs one past `total_length` once the last segment finishes,
    /// because the last segment has no trailing newline.
    pub spoken_length: usize,
}

impl PlaybackCounters {
    /// Fresh counters for `total_segments` segments
    pub fn new(total_segments: usize) -> Self {
        Self {
            total_segments,
            ..Self::default()
        }
    }

    pub fn segment_started(&mut self) {
        self.current_segment += 1;
    }

    /// Account for a finished segment and the delimiter after it
    pub fn segment_finished(&mut self, segment_length: usize) {
        self.spoken_length += segment_length + 1;
    }

    /// Offset into the full text of a position within the current segment
    pub fn offset_in_text(&self, offset_in_segment: usize) -> usize {
        self.spoken_length + offset_in_segment
    }

    /// True once the last submitted segment has started
    pub fn on_last_segment(&self) -> bool {
        self.current_segment == self.total_segments
    }

    /// Fraction of the text reached at `offset_in_segment` of the current segment
    pub fn progress_at(&self, offset_in_segment: usize) -> f32 {
        ratio(self.offset_in_text(offset_in_segment), self.total_length)
    }

    /// Fraction of the text in finished segments
    pub fn progress(&self) -> f32 {
        ratio(self.spoken_length, self.total_length)
    }
}

/// `done / total` clamped to `[0, 1]`; empty text reports no progress
fn ratio(done: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (done as f32 / total as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counters() {
        let counters = PlaybackCounters::new(3);
        assert_eq!(counters.total_segments, 3);
        assert_eq!(counters.current_segment, 0);
        assert_eq!(counters.total_length, 0);
        assert_eq!(counters.spoken_length, 0);
    }

    #[test]
    fn test_progress_with_empty_text() {
        let counters = PlaybackCounters::new(0);
        assert_eq!(counters.progress(), 0.0);
        assert_eq!(counters.progress_at(5), 0.0);
        assert!(counters.on_last_segment());
    }

    #[test]
    fn test_progress_after_first_of_two() {
        let mut counters = PlaybackCounters::new(2);
        counters.total_length = 10;
        counters.segment_started();
        counters.segment_finished(5);

        assert_eq!(counters.spoken_length, 6);
        assert!((counters.progress() - 0.6).abs() < f32::EPSILON);
        assert_eq!(counters.offset_in_text(2), 8);
    }

    #[test]
    fn test_progress_is_clamped_after_overcount() {
        let mut counters = PlaybackCounters::new(1);
        counters.total_length = 5;
        counters.segment_started();
        counters.segment_finished(5);

        assert_eq!(counters.spoken_length, 6);
        assert_eq!(counters.progress(), 1.0);
    }
}
