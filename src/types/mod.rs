//! Value types for command parameters and device classification.

mod brightness;
mod color;
mod device_type;
mod target;
mod temperature;
mod transition;

pub use brightness::Brightness;
pub use color::Rgba;
pub use device_type::{DeviceKind, DeviceType};
pub use target::{Target, is_zone_address};
pub use temperature::ColorTemperature;
pub use transition::Transition;
