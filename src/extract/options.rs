//! Extraction limits and sample rate estimates.

use std::collections::HashMap;

use crate::constants::{
    DEVICE_NAME_SCAN,
    GROWTH_SLACK,
    INITIAL_CAPACITY,
    MAX_ELEMENTS,
    MAX_PAYLOAD_SIZE,
    MAX_STREAM_TYPES,
    MIN_SAMPLE_RATE,
};
use crate::gpmf::StreamFamily;
use crate::FourCC;

/// Estimated sample rates in Hz.
///
/// GPMF streams do not state a sample rate per payload, and the documented
/// rates vary between devices and recording modes. Defaults are set per sensor
/// family and can be overridden per FourCC. Treat them as estimates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleRates {
    overrides: HashMap<FourCC, f64>,
}

impl SampleRates {
    pub const GPS: f64 = 18.0;
    pub const INERTIAL: f64 = 200.0;
    pub const ORIENTATION: f64 = 30.0;
    pub const OTHER: f64 = 1.0;

    /// Default rate for a sensor family.
    pub fn family_default(family: StreamFamily) -> f64 {
        match family {
            StreamFamily::Gps => Self::GPS,
            StreamFamily::Inertial => Self::INERTIAL,
            StreamFamily::Orientation => Self::ORIENTATION,
            StreamFamily::Other => Self::OTHER,
        }
    }

    /// Rate for `fourcc`, override first.
    pub fn estimate(&self, fourcc: &FourCC) -> f64 {
        self.overrides.get(fourcc)
            .copied()
            .unwrap_or_else(|| Self::family_default(fourcc.family()))
    }

    /// Override the rate for `fourcc`. Rates that are not finite,
    /// or below 0.001 Hz, are ignored.
    pub fn set(&mut self, fourcc: FourCC, hz: f64) -> bool {
        if hz.is_finite() && hz >= MIN_SAMPLE_RATE {
            self.overrides.insert(fourcc, hz);
            true
        } else {
            log::warn!("Ignoring invalid sample rate {hz} for {fourcc}");
            false
        }
    }
}

/// Limits and estimates for one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Payloads above this size (bytes) are skipped.
    pub max_payload_size: u64,
    /// Max distinct stream types. Further types are dropped.
    pub max_stream_types: usize,
    /// Initial sample capacity per stream type.
    pub initial_capacity: usize,
    /// Samples reserved on top of an incoming batch when a buffer grows.
    pub growth_slack: usize,
    /// Records with more elements per sample than this are skipped.
    pub max_elements: usize,
    /// Number of leading payloads searched for the device name.
    pub device_name_scan: usize,
    pub rates: SampleRates,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            max_stream_types: MAX_STREAM_TYPES,
            initial_capacity: INITIAL_CAPACITY,
            growth_slack: GROWTH_SLACK,
            max_elements: MAX_ELEMENTS,
            device_name_scan: DEVICE_NAME_SCAN,
            rates: SampleRates::default(),
        }
    }
}

impl ExtractOptions {
    pub fn with_rate(mut self, fourcc: FourCC, hz: f64) -> Self {
        self.rates.set(fourcc, hz);
        self
    }

    pub fn with_max_stream_types(mut self, max: usize) -> Self {
        self.max_stream_types = max;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_payload_size(mut self, size: u64) -> Self {
        self.max_payload_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_estimates() {
        let rates = SampleRates::default();
        assert_eq!(rates.estimate(&FourCC::GPS5), 18.0);
        assert_eq!(rates.estimate(&FourCC::ACCL), 200.0);
        assert_eq!(rates.estimate(&FourCC::GYRO), 200.0);
        assert_eq!(rates.estimate(&FourCC::CORI), 30.0);
        assert_eq!(rates.estimate(&FourCC::SHUT), 1.0);
    }

    #[test]
    fn overrides() {
        let options = ExtractOptions::default()
            .with_rate(FourCC::CORI, 1.0)
            .with_rate(FourCC::GYRO, 0.0);
        assert_eq!(options.rates.estimate(&FourCC::CORI), 1.0);
        // invalid override ignored
        assert_eq!(options.rates.estimate(&FourCC::GYRO), 200.0);
    }

    #[test]
    fn rate_floor() {
        let mut rates = SampleRates::default();
        assert!(!rates.set(FourCC::GPS5, 1e-300));
        assert!(!rates.set(FourCC::GPS5, f64::NAN));
        assert!(!rates.set(FourCC::GPS5, f64::INFINITY));
        assert_eq!(rates.estimate(&FourCC::GPS5), 18.0);
        assert!(rates.set(FourCC::GPS5, 0.001));
        assert_eq!(rates.estimate(&FourCC::GPS5), 0.001);
    }
}
