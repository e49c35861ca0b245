//! Payload sources. A payload is one self-contained chunk of GPMF data,
//! typically one second of telemetry stored as one MP4 sample.

use std::path::Path;

use crate::GpmfError;

mod memory;
mod mp4;
mod raw;

pub use memory::MemorySource;
pub use mp4::{Mp4Source, PayloadOffset};
pub use raw::RawSource;

/// Indexed access to the GPMF payloads of a recording.
pub trait PayloadSource {
    /// Number of payloads.
    fn payload_count(&self) -> usize;

    /// Size in bytes of payload at `index`, `0` if out of range.
    fn payload_size(&self, index: usize) -> u64;

    /// Raw bytes for payload at `index`.
    ///
    /// Implementations that need to read into memory do so into
    /// `scratch`, which callers reuse between payloads.
    fn payload<'s>(&'s mut self, scratch: &'s mut Vec<u8>, index: usize) -> Result<&'s [u8], GpmfError>;
}

/// Open a payload source for `path`. MP4 containers (`.mp4`, `.lrv`, `.mov`)
/// use the GPMF track, anything else is read as a "raw" GPMF file,
/// e.g. a track extracted via FFmpeg.
pub fn open(path: &Path) -> Result<Box<dyn PayloadSource>, GpmfError> {
    if !path.exists() {
        return Err(GpmfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display())
        )));
    }
    if is_mp4(path) {
        Ok(Box::new(Mp4Source::new(path)?))
    } else {
        Ok(Box::new(RawSource::new(path)?))
    }
}

pub(crate) fn is_mp4(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| matches!(s.to_lowercase().as_str(), "mp4" | "lrv" | "mov"))
        .unwrap_or(false)
}
