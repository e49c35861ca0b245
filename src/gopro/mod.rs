//! GoPro related structs and methods.

pub mod device_name;
pub mod filetype;

pub use device_name::{device_name_string, locate_device_name, DeviceName};
pub use filetype::GoProFileType;
