//! GPMF payloads in GoPro MP4 files.
//!
//! The telemetry track is located via its handler name (`GoPro MET`)
//! or its sample description (`gpmd`). Payload locations are derived from
//! the track's sample tables (`stsz`, `stsc`, `stco`/`co64`).
//! Files without a telemetry track, but with a `GPMF` box in
//! `moov/udta` yield that box as a single payload.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use binrw::{BinRead, BinReaderExt, BinResult};

use crate::constants::{
    GOPRO_METADATA_FORMAT,
    GOPRO_METADATA_HANDLER,
    GOPRO_UDTA_GPMF_FOURCC,
    MAX_RAW_FILE_SIZE,
};
use crate::GpmfError;

use super::PayloadSource;

/// MP4 atom header. `size == 1` means a 64-bit size follows,
/// `size == 0` that the atom extends to the end of the file.
#[derive(Debug, Clone, Copy, BinRead)]
#[br(big)]
struct AtomHeader {
    size: u32,
    name: [u8; 4],
}

/// Byte offset and size of a single payload in the MP4 file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadOffset {
    pub position: u64,
    pub size: u64,
}

/// GPMF payloads in an MP4 file. Only offsets are kept in memory,
/// payloads are read on request.
#[derive(Debug)]
pub struct Mp4Source {
    path: PathBuf,
    file: File,
    offsets: Vec<PayloadOffset>,
}

impl Mp4Source {
    pub fn new(path: &Path) -> Result<Self, GpmfError> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();

        let (moov, moov_start) = read_moov(&mut file, len, path)?;
        let offsets = match gpmf_track_offsets(&moov)? {
            Some(offsets) => offsets,
            None => udta_offset(&moov, moov_start)
                .map(|o| vec![o])
                .ok_or_else(|| GpmfError::NoGpmfTrack(path.to_owned()))?,
        };

        Ok(Self {
            path: path.to_owned(),
            file,
            offsets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offsets(&self) -> &[PayloadOffset] {
        &self.offsets
    }
}

impl PayloadSource for Mp4Source {
    fn payload_count(&self) -> usize {
        self.offsets.len()
    }

    fn payload_size(&self, index: usize) -> u64 {
        self.offsets.get(index)
            .map(|o| o.size)
            .unwrap_or(0)
    }

    fn payload<'s>(&'s mut self, scratch: &'s mut Vec<u8>, index: usize) -> Result<&'s [u8], GpmfError> {
        let offset = self.offsets.get(index)
            .copied()
            .ok_or(GpmfError::PayloadOutOfRange { index, count: self.offsets.len() })?;
        let size = offset.size as usize;

        scratch.clear();
        scratch.try_reserve(size)?;
        scratch.resize(size, 0);
        self.file.seek(SeekFrom::Start(offset.position))?;
        self.file.read_exact(scratch)?;

        Ok(scratch.as_slice())
    }
}

/// Locate `moov` at top level and read its body into memory.
/// Returns the body and its absolute position.
fn read_moov(file: &mut File, len: u64, path: &Path) -> Result<(Vec<u8>, u64), GpmfError> {
    let mut pos = 0;
    while pos + 8 <= len {
        file.seek(SeekFrom::Start(pos))?;
        let header: AtomHeader = file.read_be()?;
        let (header_size, size) = match header.size {
            0 => (8, len - pos),
            1 => (16, file.read_be::<u64>()?),
            s => (8, s as u64),
        };
        if size < header_size || pos.checked_add(size).map_or(true, |end| end > len) {
            return Err(GpmfError::InvalidMp4(format!(
                "atom '{}' at {pos} has invalid size {size}",
                String::from_utf8_lossy(&header.name)
            )));
        }
        if &header.name == b"moov" {
            let body_size = size - header_size;
            if body_size > MAX_RAW_FILE_SIZE {
                return Err(GpmfError::MaxFileSizeExceeded {
                    max: MAX_RAW_FILE_SIZE,
                    got: body_size,
                    path: path.to_owned()
                })
            }
            let mut moov = vec![0; body_size as usize];
            file.read_exact(&mut moov)?;
            return Ok((moov, pos + header_size));
        }
        pos += size;
    }

    Err(GpmfError::InvalidMp4(format!("no 'moov' atom in {}", path.display())))
}

/// Child atoms of an in-memory atom body. Yields `(name, body offset, body)`,
/// stops at the first malformed header.
fn atoms(data: &[u8]) -> impl Iterator<Item = ([u8; 4], usize, &[u8])> {
    let mut pos = 0_usize;
    std::iter::from_fn(move || {
        let header = data.get(pos..pos + 8)?;
        let mut size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let name = [header[4], header[5], header[6], header[7]];
        let mut header_size = 8;
        if size == 1 {
            let large = data.get(pos + 8..pos + 16)?;
            size = u64::from_be_bytes(large.try_into().ok()?);
            header_size = 16;
        } else if size == 0 {
            size = (data.len() - pos) as u64;
        }
        let end = pos.checked_add(usize::try_from(size).ok()?)?;
        if (size as usize) < header_size || end > data.len() {
            return None;
        }
        let item = (name, pos + header_size, &data[pos + header_size..end]);
        pos = end;
        Some(item)
    })
}

fn child<'a>(data: &'a [u8], name: &[u8; 4]) -> Option<&'a [u8]> {
    atoms(data)
        .find(|(n, _, _)| n == name)
        .map(|(_, _, body)| body)
}

fn path<'a>(data: &'a [u8], names: &[&[u8; 4]]) -> Option<&'a [u8]> {
    names.iter().try_fold(data, |body, name| child(body, name))
}

fn is_gpmf_track(trak: &[u8]) -> bool {
    let handler = path(trak, &[b"mdia", b"hdlr"])
        .and_then(|hdlr| hdlr.get(24..))
        .map(|name| String::from_utf8_lossy(name).contains(GOPRO_METADATA_HANDLER))
        .unwrap_or(false);
    let format = path(trak, &[b"mdia", b"minf", b"stbl", b"stsd"])
        .and_then(|stsd| stsd.get(12..16))
        .map(|fmt| fmt == GOPRO_METADATA_FORMAT)
        .unwrap_or(false);
    handler || format
}

/// Payload offsets for the GPMF track, if there is one.
fn gpmf_track_offsets(moov: &[u8]) -> Result<Option<Vec<PayloadOffset>>, GpmfError> {
    let Some(trak) = atoms(moov)
        .filter(|(name, _, _)| name == b"trak")
        .map(|(_, _, body)| body)
        .find(|trak| is_gpmf_track(trak))
    else {
        return Ok(None);
    };

    let stbl = path(trak, &[b"mdia", b"minf", b"stbl"])
        .ok_or_else(|| GpmfError::InvalidMp4("GPMF track has no sample table".to_owned()))?;

    let sizes = sample_sizes(stbl)?;
    let chunks = chunk_offsets(stbl)?;
    let stsc = sample_to_chunk(stbl)?;

    Ok(Some(layout(&sizes, &chunks, &stsc)))
}

/// Entry count of a sample table atom, read after `preamble` bytes
/// (version, flags, ...). Errors if the entries do not fit in `body`.
fn table_header(body: &[u8], preamble: usize, entry_size: usize) -> Result<(Cursor<&[u8]>, usize), GpmfError> {
    let mut cursor = Cursor::new(body);
    cursor.seek(SeekFrom::Start(preamble as u64))?;
    let count = cursor.read_be::<u32>()? as usize;
    if count.saturating_mul(entry_size) > body.len().saturating_sub(preamble + 4) {
        return Err(GpmfError::InvalidMp4(format!("sample table with {count} entries exceeds atom size")));
    }
    Ok((cursor, count))
}

fn sample_sizes(stbl: &[u8]) -> Result<Vec<u64>, GpmfError> {
    let stsz = child(stbl, b"stsz")
        .ok_or_else(|| GpmfError::InvalidMp4("no 'stsz' atom".to_owned()))?;
    let mut cursor = Cursor::new(stsz);
    cursor.seek(SeekFrom::Start(4))?;
    let uniform = cursor.read_be::<u32>()?;
    let (mut cursor, count) = table_header(stsz, 8, if uniform == 0 { 4 } else { 0 })?;
    if uniform != 0 {
        let mut sizes = Vec::new();
        sizes.try_reserve_exact(count)?;
        sizes.resize(count, uniform as u64);
        return Ok(sizes);
    }
    let sizes = (0..count)
        .map(|_| cursor.read_be::<u32>().map(|s| s as u64))
        .collect::<BinResult<Vec<u64>>>()?;
    Ok(sizes)
}

fn chunk_offsets(stbl: &[u8]) -> Result<Vec<u64>, GpmfError> {
    if let Some(stco) = child(stbl, b"stco") {
        let (mut cursor, count) = table_header(stco, 4, 4)?;
        let offsets = (0..count)
            .map(|_| cursor.read_be::<u32>().map(|o| o as u64))
            .collect::<BinResult<Vec<u64>>>()?;
        return Ok(offsets);
    }
    let co64 = child(stbl, b"co64")
        .ok_or_else(|| GpmfError::InvalidMp4("no 'stco' or 'co64' atom".to_owned()))?;
    let (mut cursor, count) = table_header(co64, 4, 8)?;
    let offsets = (0..count)
        .map(|_| cursor.read_be::<u64>())
        .collect::<BinResult<Vec<u64>>>()?;
    Ok(offsets)
}

#[derive(Debug, Clone, Copy, BinRead)]
#[br(big)]
struct StscEntry {
    first_chunk: u32,
    samples_per_chunk: u32,
    _description: u32,
}

fn sample_to_chunk(stbl: &[u8]) -> Result<Vec<StscEntry>, GpmfError> {
    let Some(stsc) = child(stbl, b"stsc") else {
        // one sample per chunk
        return Ok(vec![StscEntry { first_chunk: 1, samples_per_chunk: 1, _description: 1 }]);
    };
    let (mut cursor, count) = table_header(stsc, 4, 12)?;
    let entries = (0..count)
        .map(|_| cursor.read_be::<StscEntry>())
        .collect::<BinResult<Vec<StscEntry>>>()?;
    Ok(entries)
}

/// Combine sample sizes, chunk offsets and the sample-to-chunk table
/// into absolute sample positions.
fn layout(sizes: &[u64], chunks: &[u64], stsc: &[StscEntry]) -> Vec<PayloadOffset> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut sample = 0;
    for (i, chunk_offset) in chunks.iter().enumerate() {
        let chunk = i as u32 + 1;
        let per_chunk = stsc.iter()
            .take_while(|e| e.first_chunk <= chunk)
            .last()
            .map(|e| e.samples_per_chunk)
            .unwrap_or(1);
        let mut position = *chunk_offset;
        for _ in 0..per_chunk {
            let Some(size) = sizes.get(sample) else {
                return offsets;
            };
            offsets.push(PayloadOffset { position, size: *size });
            position += size;
            sample += 1;
        }
    }
    offsets
}

/// `moov/udta/GPMF` as a single payload.
/// `moov_start` is the absolute file position of the `moov` body.
fn udta_offset(moov: &[u8], moov_start: u64) -> Option<PayloadOffset> {
    let (_, udta_start, udta) = atoms(moov).find(|(n, _, _)| n == b"udta")?;
    let (_, gpmf_start, gpmf) = atoms(udta).find(|(n, _, _)| n == GOPRO_UDTA_GPMF_FOURCC)?;
    Some(PayloadOffset {
        position: moov_start + (udta_start + gpmf_start) as u64,
        size: gpmf.len() as u64,
    })
}
