//! Gapless playback scheduling for streamed model audio.
//!
//! Audio chunks arrive from the realtime triage stream out of step with the
//! output clock. Each chunk is queued at `max(next_start_time, current_time)`
//! so chunks never overlap and the scheduled start never regresses. An
//! interruption from the model stops every queued source and rewinds the
//! clock to zero.
//!
//! The server does not relay vendor audio; `/ws/triage` carries text only.
//! This scheduler is library surface for voice clients built on this crate,
//! fed with [`AudioBuffer::duration`](super::audio::AudioBuffer::duration).

use std::collections::BTreeMap;

/// Identifier for a scheduled audio source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

/// One chunk placed on the output timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledChunk {
    pub id: SourceId,
    pub start: f64,
    pub end: f64,
}

/// Rejected scheduling inputs.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("current time must be finite and non-negative, got {0}")]
    InvalidClock(f64),
    #[error("chunk duration must be finite and non-negative, got {0}")]
    InvalidDuration(f64),
}

/// Output timeline for one live session.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    next_start_time: f64,
    next_id: u64,
    active: BTreeMap<SourceId, ScheduledChunk>,
}

impl PlaybackScheduler {
    /// Create an empty timeline starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest time the next chunk may start.
    pub fn next_start_time(&self) -> f64 {
        self.next_start_time
    }

    /// Sources queued or playing, ordered by scheduling order.
    pub fn active_sources(&self) -> impl Iterator<Item = &ScheduledChunk> {
        self.active.values()
    }

    /// `true` when nothing is queued or playing.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Queue a chunk of `duration` seconds given the output clock `current_time`.
    ///
    /// # Errors
    /// Returns [`PlaybackError`] when either input is negative or not finite;
    /// the timeline is left untouched.
    ///
    /// # Examples
    /// ```
    /// use telesaude::domain::playback::PlaybackScheduler;
    ///
    /// let mut scheduler = PlaybackScheduler::new();
    /// let first = scheduler.schedule(1.0, 0.5).expect("valid chunk");
    /// let second = scheduler.schedule(1.1, 0.25).expect("valid chunk");
    /// assert_eq!(first.start, 1.0);
    /// assert_eq!(second.start, 1.5);
    /// ```
    pub fn schedule(
        &mut self,
        current_time: f64,
        duration: f64,
    ) -> Result<ScheduledChunk, PlaybackError> {
        if !current_time.is_finite() || current_time < 0.0 {
            return Err(PlaybackError::InvalidClock(current_time));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(PlaybackError::InvalidDuration(duration));
        }

        let start = self.next_start_time.max(current_time);
        let end = start + duration;
        self.next_start_time = end;

        let id = SourceId(self.next_id);
        self.next_id += 1;
        let chunk = ScheduledChunk { id, start, end };
        self.active.insert(id, chunk);
        Ok(chunk)
    }

    /// Forget a source that finished playing on its own.
    ///
    /// Returns `false` when the source was unknown (already finished or
    /// stopped by an interruption).
    pub fn finish(&mut self, id: SourceId) -> bool {
        self.active.remove(&id).is_some()
    }

    /// Stop every source and rewind the clock.
    ///
    /// The returned chunks are the ones the caller must stop on the output
    /// device. The active set is empty afterwards.
    pub fn interrupt(&mut self) -> Vec<ScheduledChunk> {
        self.next_start_time = 0.0;
        std::mem::take(&mut self.active).into_values().collect()
    }
}
