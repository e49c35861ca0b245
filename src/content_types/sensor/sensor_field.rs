use std::fmt::Display;

use crate::DeviceName;

/// Order in which a device logs the x, y, z axes.
/// Logged in `ORIN` for later models.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    XYZ,
    #[default]
    XZY,
    YZX,
    YXZ,
    ZXY,
    ZYX,
    Invalid,
}

impl From<&str> for Orientation {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "XYZ" => Self::XYZ,
            "XZY" => Self::XZY,
            "YZX" => Self::YZX,
            "YXZ" => Self::YXZ,
            "ZXY" => Self::ZXY,
            "ZYX" => Self::ZYX,
            _ => Self::Invalid,
        }
    }
}

impl Orientation {
    /// Assumed axis order for `device`. Hero5 Black and
    /// Hero6 Black log `ZXY`. Later models default to `XZY`, see
    /// <https://github.com/gopro/gpmf-parser/issues/170#issuecomment-1322414755>
    pub fn for_device(device: &DeviceName) -> Self {
        match device {
            DeviceName::Hero5Black | DeviceName::Hero6Black => Self::ZXY,
            _ => Self::XZY,
        }
    }
}

/// Single 3-axis sensor reading:
/// - Accelerometer (acceleration, m/s2)
/// - Gyroscope (rotation, rad/s)
/// - Gravity vector (direction of gravity)
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SensorField {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Display for SensorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<x: {:>3.08}, y: {:>3.08}, z: {:>3.08}>", self.x, self.y, self.z)
    }
}

impl SensorField {
    /// Field from scale corrected values, reordered per `orientation`.
    pub fn new(xyz: &[f64], orientation: &Orientation) -> Option<Self> {
        let (x, y, z) = match orientation {
            Orientation::XYZ => (*xyz.get(0)?, *xyz.get(1)?, *xyz.get(2)?),
            Orientation::XZY => (*xyz.get(0)?, *xyz.get(2)?, *xyz.get(1)?),
            Orientation::YZX => (*xyz.get(2)?, *xyz.get(0)?, *xyz.get(1)?),
            Orientation::YXZ => (*xyz.get(1)?, *xyz.get(0)?, *xyz.get(2)?),
            Orientation::ZXY => (*xyz.get(1)?, *xyz.get(2)?, *xyz.get(0)?),
            Orientation::ZYX => (*xyz.get(2)?, *xyz.get(1)?, *xyz.get(0)?),
            Orientation::Invalid => return None
        };
        Some(Self { x, y, z })
    }
}
