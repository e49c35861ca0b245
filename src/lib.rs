//! Extract GoPro GPMF telemetry into per-sensor time series.
//!
//! All GPMF payloads in a recording are walked in order, and every stream
//! record found is decoded into scale corrected samples, accumulated per
//! FourCC (`GPS5`, `ACCL`, `GYRO`, ...). Timestamps are estimated from
//! each sample's position in its stream and an estimated sample rate.
//!
//! A corrupt payload or record is skipped, never aborting the
//! extraction as a whole.
//!
//! ```rs
//! use gpmf_telemetry::{Gpmf, FourCC};
//! use std::path::Path;
//!
//! fn main() -> Result<(), gpmf_telemetry::GpmfError> {
//!     let gpmf = Gpmf::new(Path::new("GOPRO_VIDEO.MP4"))?;
//!     if let Some(gps) = gpmf.find(&FourCC::GPS5) {
//!         println!("{} GPS5 samples at ~{} Hz", gps.len(), gps.sample_rate());
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod constants;
pub mod export;
pub mod extract;
pub mod files;
pub mod gpmf;
pub mod source;
mod content_types;
mod errors;
mod gopro;

use std::path::Path;

use gpmf::{Decode, KlvDecoder};

pub use content_types::{Gps, GoProPoint, Statistics};
pub use content_types::sensor::{Orientation, SensorData, SensorField, SensorType};
pub use errors::{FailureKind, GpmfError};
pub use extract::{
    ExtractEvent,
    ExtractOptions,
    Extractor,
    LogObserver,
    NoopObserver,
    Observer,
    SampleRates,
};
pub use gopro::{device_name_string, locate_device_name, DeviceName, GoProFileType};
pub use gpmf::{
    FourCC,
    Gpmf,
    Sample,
    Stream,
    StreamFamily,
    Timestamp,
};

/// Whether `path` holds any GPMF telemetry, i.e. at least one
/// payload that decodes as GPMF.
pub fn has_telemetry(path: &Path) -> bool {
    let Ok(mut source) = source::open(path) else {
        return false;
    };
    let mut scratch = Vec::new();
    (0..source.payload_count()).any(|index| {
        let size = source.payload_size(index);
        size > 0
            && size <= constants::MAX_PAYLOAD_SIZE
            && source.payload(&mut scratch, index)
                .and_then(|payload| KlvDecoder.init(payload).map(|_| ()))
                .is_ok()
    })
}

/// All telemetry streams in `path`, or `None` if the file
/// could not be opened or yielded no samples.
pub fn extract_all(path: &Path) -> Option<Gpmf> {
    match Gpmf::new(path) {
        Ok(gpmf) if !gpmf.is_empty() => Some(gpmf),
        Ok(_) => None,
        Err(err) => {
            log::warn!("No telemetry extracted from {}: {err}", path.display());
            None
        }
    }
}

/// Device name (`DVNM`) logged in `path`, e.g. "HERO11 Black".
pub fn device_name(path: &Path) -> Option<String> {
    let mut source = source::open(path).ok()?;
    locate_device_name(source.as_mut(), &KlvDecoder, &ExtractOptions::default())
        .map(|raw| device_name_string(&raw))
}

/// Release all memory held by an extraction result.
pub fn release(gpmf: Gpmf) {
    drop(gpmf)
}
