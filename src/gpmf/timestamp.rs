//! Convenience structure for dealing with estimated relative timestamps.
//!
//! GPMF samples carry no individual time. Here a sample's time is estimated
//! from its position in the stream and the stream's (estimated) sample rate,
//! so these are approximations, not wall-clock truth.

use time::{self, Duration};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
/// Timestamp containing estimated time since the first sample of a stream
/// and the estimated duration of a single sample.
pub struct Timestamp {
    /// Time passed since the first sample.
    pub relative: Duration,
    /// Sample duration, i.e. time until the next sample.
    pub duration: Duration,
}

impl Timestamp {
    /// Estimate the timestamp for the sample at zero-based `ordinal`
    /// in a stream logged at `rate` Hz.
    pub fn estimate(ordinal: u64, rate: f64) -> Self {
        Self {
            relative: Duration::saturating_seconds_f64(ordinal as f64 / rate),
            duration: Duration::saturating_seconds_f64(1.0 / rate),
        }
    }

    /// New Timestamp from seconds.
    pub fn from_seconds(relative: f64, duration: f64) -> Self {
        Self {
            relative: Duration::saturating_seconds_f64(relative),
            duration: Duration::saturating_seconds_f64(duration),
        }
    }

    /// Returns `Timestamp.relative` as milliseconds.
    pub fn relative_ms(&self) -> i128 {
        self.relative.whole_milliseconds()
    }

    /// Returns `Timestamp.duration` as milliseconds.
    pub fn duration_ms(&self) -> i128 {
        self.duration.whole_milliseconds()
    }

    /// Offsets `self` by the end of `other`, e.g. to continue
    /// timing from a previous clip in the same recording session.
    ///
    /// Order matters: `other`'s duration is included.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            relative: self.relative + other.relative + other.duration,
            ..*self
        }
    }
}
