//! 3-axis sensor views: accelerometer, gyroscope, gravity vector.

mod sensor_data;
mod sensor_field;
mod sensor_type;

pub use sensor_data::SensorData;
pub use sensor_field::{Orientation, SensorField};
pub use sensor_type::SensorType;
