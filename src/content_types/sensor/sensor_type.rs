use std::fmt::Display;

use crate::FourCC;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SensorType {
    Accelerometer,
    GravityVector,
    Gyroscope,
    #[default]
    Unknown
}

impl Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorType::Accelerometer => write!(f, "Accelerometer"),
            SensorType::GravityVector => write!(f, "GravityVector"),
            SensorType::Gyroscope => write!(f, "Gyroscope"),
            SensorType::Unknown => write!(f, "Unknown"),
        }
    }
}

impl SensorType {
    pub fn from_fourcc(fourcc: &FourCC) -> Self {
        match *fourcc {
            FourCC::ACCL => Self::Accelerometer,
            FourCC::GRAV => Self::GravityVector,
            FourCC::GYRO => Self::Gyroscope,
            _ => Self::Unknown
        }
    }

    /// FourCC of the stream holding the raw data.
    pub fn fourcc(&self) -> Option<FourCC> {
        match self {
            Self::Accelerometer => Some(FourCC::ACCL),
            Self::GravityVector => Some(FourCC::GRAV),
            Self::Gyroscope => Some(FourCC::GYRO),
            Self::Unknown => None
        }
    }

    /// SI units of the scale corrected values.
    pub fn units(&self) -> Option<&'static str> {
        match self {
            Self::Accelerometer => Some("m/s²"),
            Self::Gyroscope => Some("rad/s"),
            // unit vector
            Self::GravityVector | Self::Unknown => None,
        }
    }
}
