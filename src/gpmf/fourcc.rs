//! GPMF Four CC, i.e. general stream identifier.
//! Not all are covered or documented, so `FourCC` wraps the raw
//! four bytes rather than enumerating every known key.
//! An all-zero FourCC is the padding/terminator key and is never
//! a valid stream type.

use std::fmt::Display;

/// Four character code. Descriptions lifted from official GPMF documentation (<https://github.com/gopro/gpmf-parser>)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

/// Broad sensor families, used for estimating sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFamily {
    /// `GPS5`, `GPS9`, `GPSU`...
    Gps,
    /// Accelerometer, gyroscope, magnetometer.
    Inertial,
    /// Camera/image orientation quaternions, gravity vector.
    Orientation,
    Other,
}

impl FourCC {
    // FOURCC RESERVED FOR GPMF STRUCTURE
    /// unique device source for metadata
    pub const DEVC: Self = Self(*b"DEVC");
    /// device/track ID
    pub const DVID: Self = Self(*b"DVID");
    /// device name, e.g. "Hero7 Black"
    pub const DVNM: Self = Self(*b"DVNM");
    /// Nested signal stream of metadata/telemetry
    pub const STRM: Self = Self(*b"STRM");
    /// Stream name, free text
    pub const STNM: Self = Self(*b"STNM");
    /// Comments for any stream
    pub const RMRK: Self = Self(*b"RMRK");
    /// Scaling factor (divisor)
    pub const SCAL: Self = Self(*b"SCAL");
    /// Standard Units (like SI)
    pub const SIUN: Self = Self(*b"SIUN");
    /// Display units
    pub const UNIT: Self = Self(*b"UNIT");
    /// Typedefs for complex structures
    pub const TYPE: Self = Self(*b"TYPE");
    /// Total Samples delivered since record start
    pub const TSMP: Self = Self(*b"TSMP");
    /// Time Offset
    pub const TIMO: Self = Self(*b"TIMO");
    /// Empty payload count
    pub const EMPT: Self = Self(*b"EMPT");
    /// Start/end timestamps (ms), older devices
    pub const TICK: Self = Self(*b"TICK");
    pub const TOCK: Self = Self(*b"TOCK");
    /// Input orientation, e.g. "ZXY"
    pub const ORIN: Self = Self(*b"ORIN");
    /// Output orientation
    pub const ORIO: Self = Self(*b"ORIO");
    /// Orientation matrix
    pub const MTRX: Self = Self(*b"MTRX");
    /// Microsecond timestamp
    pub const STMP: Self = Self(*b"STMP");

    // DEVICE/DATA SPECIFIC FOURCC
    /// 3-axis accelerometer, m/s²
    pub const ACCL: Self = Self(*b"ACCL");
    /// 3-axis gyroscope, rad/s
    pub const GYRO: Self = Self(*b"GYRO");
    /// Magnetometer, µT
    pub const MAGN: Self = Self(*b"MAGN");
    /// Camera orientation quaternions
    pub const CORI: Self = Self(*b"CORI");
    /// Image orientation quaternions
    pub const IORI: Self = Self(*b"IORI");
    /// Gravity vector
    pub const GRAV: Self = Self(*b"GRAV");
    /// Lat., long., alt. (WGS 84), 2D speed, 3D speed (Hero5-10)
    pub const GPS5: Self = Self(*b"GPS5");
    /// Lat., long., alt., 2D, 3D, days, secs, DOP, fix (Hero11+)
    pub const GPS9: Self = Self(*b"GPS9");
    /// GPS fix
    pub const GPSF: Self = Self(*b"GPSF");
    /// GPS dilution of precision (DOP x100)
    pub const GPSP: Self = Self(*b"GPSP");
    /// GPS UTC time
    pub const GPSU: Self = Self(*b"GPSU");
    /// Exposure time
    pub const SHUT: Self = Self(*b"SHUT");
    /// Sensor ISO
    pub const ISOE: Self = Self(*b"ISOE");
    /// Sensor gain (ISO), newer models
    pub const ISOG: Self = Self(*b"ISOG");
    /// White balance, Kelvin
    pub const WBAL: Self = Self(*b"WBAL");
    /// White balance RGB gains
    pub const WRGB: Self = Self(*b"WRGB");
    /// Camera temperature, °C
    pub const TMPC: Self = Self(*b"TMPC");

    /// FourCC from a byte slice. Returns `None` unless `slice`
    /// holds exactly four bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 4]>::try_from(slice).ok().map(Self)
    }

    /// FourCC from the GPMF key as a `u32`,
    /// first character in the least significant byte.
    pub fn from_u32(key: u32) -> Self {
        Self(key.to_le_bytes())
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Generate `FourCC` from `&str`. Shorter strings are
    /// space padded, longer ones truncated.
    pub fn from_str(fourcc: &str) -> Self {
        let mut code = [b' '; 4];
        fourcc.bytes()
            .take(4)
            .enumerate()
            .for_each(|(i, b)| code[i] = b);
        Self(code)
    }

    /// FourCC as string. Non-UTF-8 bytes are replaced.
    pub fn to_str(&self) -> String {
        String::from_utf8_lossy(&self.0).to_string()
    }

    /// Zero padding / end marker.
    pub fn is_invalid(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Printable ASCII key, letters, digits and space only.
    pub fn is_valid_key(&self) -> bool {
        self.0.iter().all(|b| b.is_ascii_alphanumeric() || *b == b' ')
    }

    /// Keys that describe a stream rather than hold its samples.
    pub fn is_structural(&self) -> bool {
        matches!(
            *self,
            Self::DEVC | Self::DVID | Self::DVNM | Self::STRM | Self::STNM
                | Self::RMRK | Self::SCAL | Self::SIUN | Self::UNIT | Self::TYPE
                | Self::TSMP | Self::TIMO | Self::EMPT | Self::TICK | Self::TOCK
                | Self::ORIN | Self::ORIO | Self::MTRX
        )
    }

    pub fn family(&self) -> StreamFamily {
        match &self.0 {
            [b'G', b'P', b'S', _] => StreamFamily::Gps,
            b"ACCL" | b"GYRO" | b"MAGN" => StreamFamily::Inertial,
            b"CORI" | b"IORI" | b"GRAV" => StreamFamily::Orientation,
            _ => StreamFamily::Other,
        }
    }
}

impl Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}
