//! "Raw" GPMF files, e.g. the `GoPro MET` track extracted with FFmpeg:
//! `ffmpeg -i GH010026.MP4 -codec copy -map 0:3 -f rawvideo GH010026.gpmf`

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::constants::MAX_RAW_FILE_SIZE;
use crate::gpmf::KlvHeader;
use crate::GpmfError;

use super::PayloadSource;

/// A raw GPMF file held in memory, split into its top level records
/// (normally `DEVC`), one payload each.
#[derive(Debug, Clone)]
pub struct RawSource {
    path: Option<PathBuf>,
    data: Vec<u8>,
    payloads: Vec<Range<usize>>,
}

impl RawSource {
    /// Read raw GPMF file. Max size is 50MB.
    pub fn new(path: &Path) -> Result<Self, GpmfError> {
        let size = path.metadata()?.len();
        if size > MAX_RAW_FILE_SIZE {
            return Err(GpmfError::MaxFileSizeExceeded {
                max: MAX_RAW_FILE_SIZE,
                got: size,
                path: path.to_owned()
            })
        }
        let mut source = Self::from_vec(std::fs::read(path)?);
        source.path = Some(path.to_owned());
        Ok(source)
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        let payloads = split(&data);
        Self {
            path: None,
            data,
            payloads,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Byte ranges of top level records. A record that overruns the end
/// of data is kept as is, and fails to decode later.
/// Splitting stops at the first key that is not a printable FourCC,
/// so data that is not GPMF yields no payloads.
fn split(data: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        if data[offset..].iter().all(|b| *b == 0) {
            break;
        }
        let Ok(header) = KlvHeader::read(data, offset) else {
            break;
        };
        if header.fourcc().is_invalid() {
            // zero padding
            offset += 4;
            continue;
        }
        if !header.fourcc().is_valid_key() {
            break;
        }
        let end = (offset + header.record_size()).min(data.len());
        ranges.push(offset..end);
        offset = end;
    }
    ranges
}

impl PayloadSource for RawSource {
    fn payload_count(&self) -> usize {
        self.payloads.len()
    }

    fn payload_size(&self, index: usize) -> u64 {
        self.payloads.get(index)
            .map(|r| r.len() as u64)
            .unwrap_or(0)
    }

    fn payload<'s>(&'s mut self, _scratch: &'s mut Vec<u8>, index: usize) -> Result<&'s [u8], GpmfError> {
        let count = self.payloads.len();
        self.payloads.get(index)
            .and_then(|r| self.data.get(r.clone()))
            .ok_or(GpmfError::PayloadOutOfRange { index, count })
    }
}
