//! Per-type sample streams.

use time::Duration;

use crate::constants::MAX_CAPTURED_ELEMENTS;
use crate::FourCC;

use super::Timestamp;

/// A single observation of one stream type.
/// Holds at most 16 scale corrected values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    fourcc: FourCC,
    /// Estimated seconds since the first sample of the stream.
    timestamp: f64,
    values: [f64; MAX_CAPTURED_ELEMENTS],
    len: u8,
}

impl Sample {
    /// New sample. Values beyond the first 16 are dropped.
    pub fn new(fourcc: FourCC, timestamp: f64, values: &[f64]) -> Self {
        let len = values.len().min(MAX_CAPTURED_ELEMENTS);
        let mut buf = [0.0; MAX_CAPTURED_ELEMENTS];
        buf[..len].copy_from_slice(&values[..len]);
        Self {
            fourcc,
            timestamp,
            values: buf,
            len: len as u8,
        }
    }

    pub fn fourcc(&self) -> FourCC {
        self.fourcc
    }

    /// Estimated time in seconds, `ordinal / sample rate`.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn values(&self) -> &[f64] {
        &self.values[..self.len as usize]
    }

    /// Value at `index`, if captured.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values().get(index).copied()
    }
}

/// All samples of one type across a recording, in temporal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub(crate) fourcc: FourCC,
    pub(crate) samples: Vec<Sample>,
    pub(crate) elements_per_sample: usize,
    pub(crate) sample_rate: f64,
}

impl Stream {
    pub fn fourcc(&self) -> FourCC {
        self.fourcc
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Elements per sample as logged by the device,
    /// fixed by the first decoded record of this type.
    /// May exceed the number of values kept per sample (16).
    pub fn elements_per_sample(&self) -> usize {
        self.elements_per_sample
    }

    /// Number of values kept per sample.
    pub fn captured_elements(&self) -> usize {
        self.elements_per_sample.min(MAX_CAPTURED_ELEMENTS)
    }

    /// Estimated sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Estimated timestamp for sample at `index`.
    pub fn time(&self, index: usize) -> Option<Timestamp> {
        (index < self.len()).then(|| Timestamp::estimate(index as u64, self.sample_rate))
    }

    /// Estimated time span covered by the stream,
    /// saturating at `Duration::MAX`.
    pub fn duration(&self) -> Duration {
        Duration::saturating_seconds_f64(self.len() as f64 / self.sample_rate)
    }

    /// All values at element `index` (e.g. `0` for latitude in `GPS5`).
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.samples.iter()
            .filter_map(|s| s.get(index))
            .collect()
    }
}
