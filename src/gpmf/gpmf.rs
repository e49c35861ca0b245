//! Extracted GPMF telemetry for a single recording.
//!
//! Input:
//! - original, unedited GoPro MP4 clips (`.MP4`, `.LRV`)
//! - raw GPMF "files" extracted via e.g. FFmpeg
//! - byte slices
//! - any [`PayloadSource`]
//!
//! Content will vary between devices and data types.
//! Timestamps are estimates, derived from each sample's position
//! in its stream and an estimated sample rate.
//!
//! ```rs
//! use gpmf_telemetry::Gpmf;
//! use std::path::Path;
//!
//! fn main() -> Result<(), gpmf_telemetry::GpmfError> {
//!     let gpmf = Gpmf::new(Path::new("GOPRO_VIDEO.MP4"))?;
//!     for stream in gpmf.iter() {
//!         println!("{} {} samples", stream.fourcc(), stream.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use time::Duration;

use crate::extract::{ExtractOptions, Extractor, LogObserver, Observer};
use crate::gopro::{device_name_string, locate_device_name};
use crate::source::{self, PayloadSource, RawSource};
use crate::{DeviceName, Gps, GpmfError, SensorData, SensorType, Statistics};

use super::{FourCC, KlvDecoder, Stream};

/// Telemetry streams for one recording, one per FourCC,
/// in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gpmf {
    /// GPMF streams.
    pub streams: Vec<Stream>,
    /// Path/s to the source/s the GPMF data was extracted from.
    pub source: Vec<PathBuf>,
    /// Device name (`DVNM`), if logged.
    pub device: Option<String>,
}

impl Gpmf {
    /// GPMF from file. Either an unedited GoPro MP4-file,
    /// or a "raw" GPMF-file, extracted via FFmpeg.
    pub fn new(path: &Path) -> Result<Self, GpmfError> {
        Self::with_options(path, &ExtractOptions::default())
    }

    pub fn with_options(path: &Path, options: &ExtractOptions) -> Result<Self, GpmfError> {
        let mut source = source::open(path)?;
        let mut gpmf = Self::from_source(source.as_mut(), options, &mut LogObserver)?;
        gpmf.source.push(path.to_owned());
        Ok(gpmf)
    }

    /// GPMF from any payload source.
    pub fn from_source<S, O>(source: &mut S, options: &ExtractOptions, observer: &mut O) -> Result<Self, GpmfError>
    where
        S: PayloadSource + ?Sized,
        O: Observer + ?Sized,
    {
        let device = locate_device_name(source, &KlvDecoder, options)
            .map(|raw| device_name_string(&raw));
        let streams = Extractor::new(options.to_owned())
            .extract(source, observer)?;

        Ok(Self {
            streams,
            source: Vec::new(),
            device,
        })
    }

    /// GPMF from byte slice, e.g. a raw GPMF dump.
    /// Each top level record (`DEVC`) is one payload.
    pub fn from_slice(slice: &[u8]) -> Result<Self, GpmfError> {
        let mut source = RawSource::from_vec(slice.to_owned());
        Self::from_source(&mut source, &ExtractOptions::default(), &mut LogObserver)
    }

    /// Returns number of `Streams`.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter()
    }

    pub fn into_streams(self) -> Vec<Stream> {
        self.streams
    }

    /// Returns first discovered stream.
    pub fn first(&self) -> Option<&Stream> {
        self.streams.first()
    }

    /// Returns last discovered stream.
    pub fn last(&self) -> Option<&Stream> {
        self.streams.last()
    }

    /// Find stream with specified FourCC.
    pub fn find(&self, fourcc: &FourCC) -> Option<&Stream> {
        self.iter().find(|s| &s.fourcc() == fourcc)
    }

    /// FourCCs of all streams, in order of first appearance.
    pub fn types(&self) -> Vec<FourCC> {
        self.iter().map(|s| s.fourcc()).collect()
    }

    /// Device model, derived from `DVNM`.
    pub fn device_name(&self) -> Option<DeviceName> {
        self.device.as_deref().map(DeviceName::from_str)
    }

    /// Longest estimated stream duration.
    pub fn duration(&self) -> Duration {
        self.iter()
            .map(|s| s.duration())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Longest estimated stream duration as milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.duration().whole_milliseconds() as i64
    }

    /// For `GPS5` models, Hero10 and earlier.
    pub fn gps5(&self) -> Gps {
        self.find(&FourCC::GPS5)
            .map(Gps::from_stream)
            .unwrap_or_default()
    }

    /// For `GPS9` models, Hero11 and later.
    /// Each point includes datetime, DOP and GPS fix.
    pub fn gps9(&self) -> Gps {
        self.find(&FourCC::GPS9)
            .map(Gps::from_stream)
            .unwrap_or_default()
    }

    /// `GPS9` if logged, otherwise `GPS5`.
    /// Hero11 logs both.
    pub fn gps(&self) -> Gps {
        let gps9 = self.gps9();
        if gps9.is_empty() {
            self.gps5()
        } else {
            gps9
        }
    }

    /// Sensor data. Available sensors depend on model.
    pub fn sensor(&self, sensor_type: &SensorType) -> Option<SensorData> {
        let device = self.device_name().unwrap_or_default();
        sensor_type.fourcc()
            .and_then(|fourcc| self.find(&fourcc))
            .and_then(|stream| SensorData::new(stream, &device))
    }

    /// Distance, speed, altitude and exposure summary.
    pub fn statistics(&self) -> Statistics {
        Statistics::new(self)
    }
}

impl IntoIterator for Gpmf {
    type Item = Stream;
    type IntoIter = std::vec::IntoIter<Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.into_iter()
    }
}
