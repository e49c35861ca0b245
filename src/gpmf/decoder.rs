//! Record decoder for a single GPMF payload.
//!
//! The extraction engine is written against [`Decode`] and [`RecordCursor`],
//! [`KlvDecoder`] is the GPMF implementation.
//!
//! A cursor walks the KLV tree in document order. After `init` or `reset`
//! it sits before the first record, so the first `find_next` may match it.
//! Cursors are cheap to clone, which is how look-ahead is done without
//! losing the position of an outer loop.

use std::io::Cursor;

use crate::constants::MAX_NEST_DEPTH;
use crate::{FourCC, GpmfError};

use super::klv::{expand_type_def, KlvHeader, ValueType, HEADER_SIZE};

/// How far `find_next` may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Levels {
    /// Siblings within the current nest only.
    Current,
    /// Any record, descending into and climbing out of nests.
    Recurse,
}

/// Creates a record cursor for one payload.
pub trait Decode {
    type Cursor<'a>: RecordCursor;

    /// Validate `payload` and return a cursor positioned before its
    /// first record. The slice length is the payload length in bytes.
    fn init<'a>(&self, payload: &'a [u8]) -> Result<Self::Cursor<'a>, GpmfError>;
}

/// Position within a decoded payload.
pub trait RecordCursor: Clone {
    /// Move back to before the first record.
    fn reset(&mut self);

    /// Advance to the next record with key `key`.
    /// On failure the cursor is left where it was.
    fn find_next(&mut self, key: FourCC, levels: Levels) -> Result<(), GpmfError>;

    /// Descend into the current nested record, positioned before
    /// its first child.
    fn enter(&mut self) -> Result<(), GpmfError>;

    /// From a stream record (`STRM`), move to the record holding its
    /// samples, past any grouping layer.
    fn seek_to_samples(&mut self) -> Result<(), GpmfError>;

    /// Key of the current record, zero if there is none.
    fn key(&self) -> FourCC;

    /// Number of samples (structures) in the current record.
    fn sample_count(&self) -> usize;

    /// Number of elements per sample in the current record.
    fn elements_per_sample(&self) -> usize;

    /// Unpadded value bytes of the current record.
    fn raw_data(&self) -> &[u8];

    /// Write scale corrected values for samples `first..first + count`
    /// into `dest`, sample after sample.
    fn scaled_values(&self, dest: &mut [f64], first: usize, count: usize) -> Result<(), GpmfError>;
}

/// GPMF decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct KlvDecoder;

impl Decode for KlvDecoder {
    type Cursor<'a> = KlvCursor<'a>;

    fn init<'a>(&self, payload: &'a [u8]) -> Result<Self::Cursor<'a>, GpmfError> {
        KlvCursor::new(payload)
    }
}

/// Cursor over the KLV tree of a single payload.
#[derive(Debug, Clone)]
pub struct KlvCursor<'a> {
    buf: &'a [u8],
    /// Offset of the current record header.
    pos: usize,
    /// `false` while positioned before the record at `pos`.
    on_record: bool,
    /// End offsets of the nests we are in, outermost first.
    /// `nest_start[i]` is the header offset of that nest.
    nest_end: [usize; MAX_NEST_DEPTH],
    nest_start: [usize; MAX_NEST_DEPTH],
    level: usize,
}

impl<'a> KlvCursor<'a> {
    /// Validates the complete KLV structure of `buf`.
    pub fn new(buf: &'a [u8]) -> Result<Self, GpmfError> {
        if buf.len() < HEADER_SIZE {
            return Err(GpmfError::BadStructure { offset: 0, reason: "payload smaller than a header" });
        }
        validate(buf, 0, buf.len(), 0)?;
        Ok(Self {
            buf,
            pos: 0,
            on_record: false,
            nest_end: [0; MAX_NEST_DEPTH],
            nest_start: [0; MAX_NEST_DEPTH],
            level: 0,
        })
    }

    fn end(&self) -> usize {
        if self.level == 0 {
            self.buf.len()
        } else {
            self.nest_end[self.level - 1]
        }
    }

    /// Header of the current record. Structure was validated
    /// on creation, so this only fails before the first record.
    fn header(&self) -> Option<KlvHeader> {
        if !self.on_record {
            return None;
        }
        KlvHeader::read(self.buf, self.pos).ok()
    }

    /// Header at `pos`, `None` for padding or end of data.
    fn header_at(&self, pos: usize) -> Option<KlvHeader> {
        if pos + HEADER_SIZE > self.end() {
            return None;
        }
        KlvHeader::read(self.buf, pos).ok()
            .filter(|h| !h.fourcc().is_invalid())
    }

    /// Move to the next record in document order.
    fn next(&mut self, levels: Levels) -> bool {
        if !self.on_record {
            if self.header_at(self.pos).is_some() {
                self.on_record = true;
                return true;
            }
            return false;
        }
        let Some(header) = self.header() else {
            return false;
        };

        let mut pos = if levels == Levels::Recurse
            && header.is_nested()
            && header.repeat > 0
            && self.level < MAX_NEST_DEPTH
        {
            self.nest_start[self.level] = self.pos;
            self.nest_end[self.level] = self.pos + header.record_size();
            self.level += 1;
            self.pos + HEADER_SIZE
        } else {
            self.pos + header.record_size()
        };

        loop {
            if self.header_at(pos).is_some() {
                self.pos = pos;
                return true;
            }
            if levels == Levels::Current || self.level == 0 {
                return false;
            }
            // climb out of the exhausted nest
            self.level -= 1;
            pos = self.nest_end[self.level];
        }
    }

    /// Value of a sibling with key `key` in any enclosing nest,
    /// innermost first. Used for sticky metadata such as `SCAL` and `TYPE`.
    fn sticky(&self, key: FourCC) -> Option<(KlvHeader, usize)> {
        (0..self.level).rev().find_map(|lvl| {
            let mut pos = self.nest_start[lvl] + HEADER_SIZE;
            let end = self.nest_end[lvl];
            while pos + HEADER_SIZE <= end {
                let header = KlvHeader::read(self.buf, pos).ok()?;
                if header.fourcc().is_invalid() {
                    break;
                }
                if header.fourcc() == key {
                    return Some((header, pos + HEADER_SIZE));
                }
                pos += header.record_size();
            }
            None
        })
    }

    /// Element types for the current record.
    fn element_types(&self, header: &KlvHeader) -> Result<Vec<ValueType>, GpmfError> {
        match ValueType::from_u8(header.value_type)? {
            ValueType::Complex => {
                let (type_header, offset) = self.sticky(FourCC::TYPE)
                    .ok_or(GpmfError::NoSuchRecord(FourCC::TYPE))?;
                let def = &self.buf[offset..offset + type_header.data_size()];
                let types = expand_type_def(def)?;
                let size: usize = types.iter().filter_map(|t| t.size()).sum();
                if size != header.struct_size as usize {
                    return Err(GpmfError::BadStructure {
                        offset: self.pos,
                        reason: "TYPE does not match structure size",
                    });
                }
                Ok(types)
            }
            value_type => {
                let size = value_type.size()
                    .ok_or(GpmfError::UnsupportedType(header.value_type))?;
                if header.struct_size as usize % size != 0 {
                    return Err(GpmfError::BadStructure {
                        offset: self.pos,
                        reason: "structure size not a multiple of type size",
                    });
                }
                Ok(vec![value_type; header.struct_size as usize / size])
            }
        }
    }

    /// Scale divisors from `SCAL`, one per element or a single one for all.
    fn scales(&self) -> Result<Vec<f64>, GpmfError> {
        let Some((header, offset)) = self.sticky(FourCC::SCAL) else {
            return Ok(vec![1.0]);
        };
        let value_type = ValueType::from_u8(header.value_type)?;
        let size = value_type.size()
            .filter(|_| value_type.is_numeric())
            .ok_or(GpmfError::UnsupportedType(header.value_type))?;
        let count = header.data_size() / size;
        let mut cursor = Cursor::new(&self.buf[offset..offset + header.data_size()]);
        (0..count).map(|_| value_type.read_f64(&mut cursor))
            .map(|s| s.map(|v| if v == 0.0 { 1.0 } else { v }))
            .collect()
    }
}

/// Checks that every record in `start..end` and its descendants
/// fits inside its parent.
fn validate(buf: &[u8], start: usize, end: usize, depth: usize) -> Result<(), GpmfError> {
    if depth > MAX_NEST_DEPTH {
        return Err(GpmfError::BadStructure { offset: start, reason: "nesting too deep" });
    }
    let mut pos = start;
    while pos + HEADER_SIZE <= end {
        let header = KlvHeader::read(buf, pos)?;
        if header.fourcc().is_invalid() {
            // zero padding up to the end
            break;
        }
        if !header.fourcc().is_valid_key() {
            return Err(GpmfError::BadStructure { offset: pos, reason: "invalid key" });
        }
        let record_end = pos + header.record_size();
        if record_end > end {
            return Err(GpmfError::BadStructure { offset: pos, reason: "record overruns parent" });
        }
        if header.is_nested() {
            validate(buf, pos + HEADER_SIZE, record_end, depth + 1)?;
        }
        pos = record_end;
    }
    Ok(())
}

impl<'a> RecordCursor for KlvCursor<'a> {
    fn reset(&mut self) {
        self.pos = 0;
        self.on_record = false;
        self.level = 0;
    }

    fn find_next(&mut self, key: FourCC, levels: Levels) -> Result<(), GpmfError> {
        let saved = self.clone();
        while self.next(levels) {
            if self.key() == key {
                return Ok(());
            }
        }
        *self = saved;
        Err(GpmfError::NoSuchRecord(key))
    }

    fn enter(&mut self) -> Result<(), GpmfError> {
        let header = self.header()
            .filter(|h| h.is_nested())
            .ok_or(GpmfError::BadStructure { offset: self.pos, reason: "not a nested record" })?;
        if self.level >= MAX_NEST_DEPTH {
            return Err(GpmfError::BadStructure { offset: self.pos, reason: "nesting too deep" });
        }
        self.nest_start[self.level] = self.pos;
        self.nest_end[self.level] = self.pos + header.record_size();
        self.level += 1;
        self.pos += HEADER_SIZE;
        self.on_record = false;
        Ok(())
    }

    fn seek_to_samples(&mut self) -> Result<(), GpmfError> {
        let saved = self.clone();
        let result = self.seek_to_samples_inner();
        if result.is_err() {
            *self = saved;
        }
        result
    }

    fn key(&self) -> FourCC {
        self.header()
            .map(|h| h.fourcc())
            .unwrap_or_default()
    }

    fn sample_count(&self) -> usize {
        self.header()
            .map(|h| h.repeat as usize)
            .unwrap_or(0)
    }

    fn elements_per_sample(&self) -> usize {
        self.header()
            .and_then(|h| self.element_types(&h).ok())
            .map(|types| types.len())
            .unwrap_or(0)
    }

    fn raw_data(&self) -> &[u8] {
        match self.header() {
            Some(h) => &self.buf[self.pos + HEADER_SIZE..self.pos + HEADER_SIZE + h.data_size()],
            None => &[],
        }
    }

    fn scaled_values(&self, dest: &mut [f64], first: usize, count: usize) -> Result<(), GpmfError> {
        let header = self.header()
            .ok_or(GpmfError::BadStructure { offset: self.pos, reason: "no current record" })?;
        if header.is_nested() {
            return Err(GpmfError::UnsupportedType(0));
        }
        let types = self.element_types(&header)?;
        if let Some(t) = types.iter().find(|t| !t.is_numeric()) {
            return Err(GpmfError::UnsupportedType(t.to_u8()));
        }
        let elements = types.len();
        if first + count > header.repeat as usize {
            return Err(GpmfError::BadStructure { offset: self.pos, reason: "sample range out of bounds" });
        }
        if dest.len() < count * elements {
            return Err(GpmfError::SafetyBound {
                what: "destination capacity",
                got: (count * elements) as u64,
                max: dest.len() as u64,
            });
        }
        let scales = self.scales()?;

        let struct_size = header.struct_size as usize;
        let data = self.raw_data();
        let mut cursor = Cursor::new(&data[first * struct_size..(first + count) * struct_size]);
        for (i, value) in dest[..count * elements].iter_mut().enumerate() {
            let element = i % elements;
            let raw = types[element].read_f64(&mut cursor)?;
            let scale = scales.get(element).or(scales.first()).copied().unwrap_or(1.0);
            *value = raw / scale;
        }
        Ok(())
    }
}

impl<'a> KlvCursor<'a> {
    fn seek_to_samples_inner(&mut self) -> Result<(), GpmfError> {
        self.enter()?;
        let mut last: Option<KlvCursor<'a>> = None;
        while self.next(Levels::Current) {
            let header = self.header()
                .ok_or(GpmfError::BadStructure { offset: self.pos, reason: "unreadable record" })?;
            if header.is_nested() {
                // grouping wrapper, the samples are its first concrete record
                self.enter()?;
                while self.next(Levels::Current) {
                    let inner = self.header()
                        .ok_or(GpmfError::BadStructure { offset: self.pos, reason: "unreadable record" })?;
                    if !inner.is_nested() && !inner.fourcc().is_invalid() {
                        return Ok(());
                    }
                }
                return Err(GpmfError::NoSuchRecord(FourCC::default()));
            }
            last = Some(self.clone());
        }
        let last = last.ok_or(GpmfError::NoSuchRecord(FourCC::default()))?;
        if last.key().is_structural() {
            return Err(GpmfError::NoSuchRecord(last.key()));
        }
        *self = last;
        Ok(())
    }
}
