//! GPMF key-length-value header and value types.
//!
//! Each KLV starts with an 8 byte big-endian header:
//! `[fourcc: 4][type: 1][struct size: 1][repeat: 2]`.
//! The value that follows is `struct size * repeat` bytes,
//! zero padded to a 32-bit boundary. Type `0` means the value
//! is a nested list of KLVs.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt};

use crate::{FourCC, GpmfError};

/// KLV header size in bytes.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big)]
pub struct KlvHeader {
    pub fourcc: [u8; 4],
    pub value_type: u8,
    pub struct_size: u8,
    pub repeat: u16,
}

impl KlvHeader {
    /// Parse the header at `offset`.
    pub fn read(buf: &[u8], offset: usize) -> Result<Self, GpmfError> {
        let bytes = offset.checked_add(HEADER_SIZE)
            .and_then(|end| buf.get(offset..end))
            .ok_or(GpmfError::BadStructure {
                offset,
                reason: "truncated header",
            })?;
        Ok(Cursor::new(bytes).read_be::<KlvHeader>()?)
    }

    pub fn fourcc(&self) -> FourCC {
        FourCC(self.fourcc)
    }

    pub fn is_nested(&self) -> bool {
        self.value_type == 0
    }

    /// Value size in bytes, without padding.
    pub fn data_size(&self) -> usize {
        self.struct_size as usize * self.repeat as usize
    }

    /// Value size in bytes, including padding to 32-bit.
    pub fn padded_size(&self) -> usize {
        (self.data_size() + 3) & !3
    }

    /// Full record size, header included.
    pub fn record_size(&self) -> usize {
        HEADER_SIZE + self.padded_size()
    }
}

/// GPMF value types. Documented in <https://github.com/gopro/gpmf-parser>.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// `b` single byte signed integer
    I8,
    /// `B` single byte unsigned integer
    U8,
    /// `c` ASCII character string
    Char,
    /// `d` 64-bit double precision (IEEE 754)
    F64,
    /// `f` 32-bit float (IEEE 754)
    F32,
    /// `F` 32-bit four character key
    FourCC,
    /// `G` 128-bit ID (like UUID)
    Guid,
    /// `j` 64-bit signed integer
    I64,
    /// `J` 64-bit unsigned integer
    U64,
    /// `l` 32-bit signed integer
    I32,
    /// `L` 32-bit unsigned integer
    U32,
    /// `q` 32-bit Q15.16 fixed point
    Q15_16,
    /// `Q` 64-bit Q31.32 fixed point
    Q31_32,
    /// `s` 16-bit signed integer
    I16,
    /// `S` 16-bit unsigned integer
    U16,
    /// `U` UTC date time string, "yymmddhhmmss.sss"
    Utc,
    /// `?` complex structure, described by `TYPE`
    Complex,
    /// `0` nested KLVs
    Nested,
}

impl ValueType {
    pub fn from_u8(value_type: u8) -> Result<Self, GpmfError> {
        let t = match value_type {
            b'b' => Self::I8,
            b'B' => Self::U8,
            b'c' => Self::Char,
            b'd' => Self::F64,
            b'f' => Self::F32,
            b'F' => Self::FourCC,
            b'G' => Self::Guid,
            b'j' => Self::I64,
            b'J' => Self::U64,
            b'l' => Self::I32,
            b'L' => Self::U32,
            b'q' => Self::Q15_16,
            b'Q' => Self::Q31_32,
            b's' => Self::I16,
            b'S' => Self::U16,
            b'U' => Self::Utc,
            b'?' => Self::Complex,
            0 => Self::Nested,
            other => return Err(GpmfError::UnsupportedType(other)),
        };
        Ok(t)
    }

    /// Size in bytes of a single element.
    /// `None` for types without a fixed element size.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::I8 | Self::U8 | Self::Char => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::F32 | Self::FourCC | Self::I32 | Self::U32 | Self::Q15_16 => Some(4),
            Self::F64 | Self::I64 | Self::U64 | Self::Q31_32 => Some(8),
            Self::Guid | Self::Utc => Some(16),
            Self::Complex | Self::Nested => None,
        }
    }

    /// Whether elements of this type convert to `f64`.
    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            Self::Char | Self::FourCC | Self::Guid | Self::Utc | Self::Complex | Self::Nested
        )
    }

    /// Read one element at the cursor position as `f64`.
    pub(crate) fn read_f64(&self, cursor: &mut Cursor<&[u8]>) -> Result<f64, GpmfError> {
        let value = match self {
            Self::I8 => cursor.read_be::<i8>()? as f64,
            Self::U8 => cursor.read_be::<u8>()? as f64,
            Self::I16 => cursor.read_be::<i16>()? as f64,
            Self::U16 => cursor.read_be::<u16>()? as f64,
            Self::I32 => cursor.read_be::<i32>()? as f64,
            Self::U32 => cursor.read_be::<u32>()? as f64,
            Self::I64 => cursor.read_be::<i64>()? as f64,
            Self::U64 => cursor.read_be::<u64>()? as f64,
            Self::F32 => cursor.read_be::<f32>()? as f64,
            Self::F64 => cursor.read_be::<f64>()?,
            Self::Q15_16 => cursor.read_be::<i32>()? as f64 / 65_536.0,
            Self::Q31_32 => cursor.read_be::<i64>()? as f64 / 4_294_967_296.0,
            t => return Err(GpmfError::UnsupportedType(t.to_u8())),
        };
        Ok(value)
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Self::I8 => b'b',
            Self::U8 => b'B',
            Self::Char => b'c',
            Self::F64 => b'd',
            Self::F32 => b'f',
            Self::FourCC => b'F',
            Self::Guid => b'G',
            Self::I64 => b'j',
            Self::U64 => b'J',
            Self::I32 => b'l',
            Self::U32 => b'L',
            Self::Q15_16 => b'q',
            Self::Q31_32 => b'Q',
            Self::I16 => b's',
            Self::U16 => b'S',
            Self::Utc => b'U',
            Self::Complex => b'?',
            Self::Nested => 0,
        }
    }
}

/// Elements in one structure can not exceed its `u8` structure size.
const MAX_TYPE_ELEMENTS: usize = u8::MAX as usize;

/// Expand a `TYPE` definition into one value type per element,
/// e.g. `"lLf"` or `"s[3]"` (`[n]` repeats the preceding type).
pub fn expand_type_def(def: &[u8]) -> Result<Vec<ValueType>, GpmfError> {
    let mut types: Vec<ValueType> = Vec::new();
    let mut i = 0;
    while i < def.len() {
        match def[i] {
            0 => break,
            b'[' => {
                let close = def[i..].iter()
                    .position(|&b| b == b']')
                    .map(|p| p + i)
                    .ok_or(GpmfError::BadStructure { offset: i, reason: "unterminated TYPE array" })?;
                let count: usize = std::str::from_utf8(&def[i + 1..close])
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .ok_or(GpmfError::BadStructure { offset: i, reason: "invalid TYPE array size" })?;
                let last = *types.last()
                    .ok_or(GpmfError::BadStructure { offset: i, reason: "TYPE array without type" })?;
                // one instance is already pushed
                let extra = count.saturating_sub(1);
                types.len().checked_add(extra)
                    .filter(|&n| n <= MAX_TYPE_ELEMENTS)
                    .ok_or(GpmfError::BadStructure { offset: i, reason: "TYPE array exceeds structure size" })?;
                types.extend(std::iter::repeat(last).take(extra));
                i = close + 1;
            }
            t => {
                let value_type = ValueType::from_u8(t)?;
                if value_type.size().is_none() {
                    return Err(GpmfError::UnsupportedType(t));
                }
                if types.len() >= MAX_TYPE_ELEMENTS {
                    return Err(GpmfError::BadStructure { offset: i, reason: "TYPE exceeds structure size" });
                }
                types.push(value_type);
                i += 1;
            }
        }
    }
    Ok(types)
}
