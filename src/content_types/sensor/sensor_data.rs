use crate::{DeviceName, Stream};

use super::{Orientation, SensorField, SensorType};

/// Sensor data for a whole recording:
/// - Accelerometer, fields are acceleration (m/s2).
/// - Gyroscope, fields are rotation (rad/s).
/// - Gravity vector, fields are direction of gravity in relation to camera angle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SensorData {
    /// Camera device name
    pub device: DeviceName,
    /// Accelerometer, gyroscope, gravimeter
    pub sensor: SensorType,
    pub units: Option<&'static str>,
    pub orientation: Orientation,
    pub fields: Vec<SensorField>,
    /// Estimated sample rate (Hz).
    pub sample_rate: f64,
}

impl SensorData {
    /// Parse sensor data from an `ACCL`, `GYRO` or `GRAV` stream.
    pub fn new(stream: &Stream, device: &DeviceName) -> Option<Self> {
        let sensor = SensorType::from_fourcc(&stream.fourcc());
        if sensor == SensorType::Unknown || stream.captured_elements() < 3 {
            return None;
        }
        let orientation = match sensor {
            // unit vector in camera coordinates
            SensorType::GravityVector => Orientation::XYZ,
            _ => Orientation::for_device(device),
        };

        let fields = stream.iter()
            .filter_map(|s| SensorField::new(s.values(), &orientation))
            .collect::<Vec<_>>();

        Some(Self {
            device: device.to_owned(),
            sensor,
            units: sensor.units(),
            orientation,
            fields,
            sample_rate: stream.sample_rate(),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns all x-axis values.
    pub fn x(&self) -> Vec<f64> {
        self.fields.iter().map(|f| f.x).collect()
    }

    /// Returns all y-axis values.
    pub fn y(&self) -> Vec<f64> {
        self.fields.iter().map(|f| f.y).collect()
    }

    /// Returns all z-axis values.
    pub fn z(&self) -> Vec<f64> {
        self.fields.iter().map(|f| f.z).collect()
    }

    /// Returns all x, y, z values as vector of tuples `(x, y, z)`.
    pub fn xyz(&self) -> Vec<(f64, f64, f64)> {
        self.fields.iter()
            .map(|f| (f.x, f.y, f.z))
            .collect()
    }

    /// Linear mean value of all x values.
    pub fn x_mean(&self) -> Option<f64> {
        mean_value(&self.x())
    }

    /// Linear mean value of all y values.
    pub fn y_mean(&self) -> Option<f64> {
        mean_value(&self.y())
    }

    /// Linear mean value of all z values.
    pub fn z_mean(&self) -> Option<f64> {
        mean_value(&self.z())
    }

    /// Returns linear mean values of all x, y, z values as tuple `(x, y, z)`.
    pub fn xyz_mean(&self) -> Option<(f64, f64, f64)> {
        if self.fields.is_empty() {
            return None;
        }
        let (x, y, z) = self.fields.iter()
            .fold((0., 0., 0.), |acc, f| (acc.0 + f.x, acc.1 + f.y, acc.2 + f.z));
        let len = self.fields.len() as f64;

        Some((x / len, y / len, z / len))
    }
}

/// Returns the linear mean value.
fn mean_value(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
