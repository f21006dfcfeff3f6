//! Device classification by discovery type code.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Raw device type byte as reported by discovery.
///
/// Known codes are exposed as associated constants. Codes this crate has
/// not seen stay representable and classify as lights.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceType(u8);

impl DeviceType {
    pub const ON_OFF_LIGHT: DeviceType = DeviceType(0x01);
    pub const COLORTEMP_DIMMABLE_LIGHT: DeviceType = DeviceType(0x02);
    pub const DIMMABLE_LIGHT: DeviceType = DeviceType(0x04);
    pub const COLOR_LIGHT: DeviceType = DeviceType(0x08);
    pub const EXT_COLOR_LIGHT: DeviceType = DeviceType(0x0A);
    pub const PLUG: DeviceType = DeviceType(0x10);
    pub const SENSOR: DeviceType = DeviceType(0x20);
    pub const TWO_BUTTON_SWITCH: DeviceType = DeviceType(0x40);
    pub const FOUR_BUTTON_SWITCH: DeviceType = DeviceType(0x41);

    pub fn from_code(code: u8) -> Self {
        DeviceType(code)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// The known category for this code, if any.
    pub fn kind(self) -> Option<DeviceKind> {
        DeviceKind::create(self.0)
    }

    pub fn is_plug(self) -> bool {
        self == Self::PLUG
    }

    pub fn is_sensor(self) -> bool {
        self == Self::SENSOR
    }

    pub fn is_two_button_switch(self) -> bool {
        self == Self::TWO_BUTTON_SWITCH
    }

    pub fn is_four_button_switch(self) -> bool {
        self == Self::FOUR_BUTTON_SWITCH
    }

    pub fn is_switch(self) -> bool {
        self.is_two_button_switch() || self.is_four_button_switch()
    }

    /// Anything that is not a switch, plug, or sensor, unknown codes
    /// included.
    pub fn is_light(self) -> bool {
        !self.is_switch() && !self.is_plug() && !self.is_sensor()
    }

    /// Whether the device accepts the brightness command.
    ///
    /// Everything but plugs and plain on/off lights passes, so switches
    /// and sensors land on the permissive side; gate on [`is_light`]
    /// first when that matters.
    ///
    /// [`is_light`]: DeviceType::is_light
    pub fn supports_brightness(self) -> bool {
        self == Self::COLORTEMP_DIMMABLE_LIGHT
            || self == Self::DIMMABLE_LIGHT
            || (!self.is_plug() && self != Self::ON_OFF_LIGHT)
    }

    /// Whether the device accepts the color temperature command.
    pub fn supports_temperature(self) -> bool {
        self == Self::COLORTEMP_DIMMABLE_LIGHT || self == Self::EXT_COLOR_LIGHT
    }

    /// Whether the device accepts the RGBA color command.
    pub fn supports_color(self) -> bool {
        self == Self::EXT_COLOR_LIGHT || self == Self::COLOR_LIGHT
    }
}

/// Known device categories by discovery type code.
#[derive(Debug, Serialize, Deserialize, Clone, EnumIter, PartialEq)]
pub enum DeviceKind {
    OnOffLight = 0x01,
    ColortempDimmableLight = 0x02,
    DimmableLight = 0x04,
    ColorLight = 0x08,
    ExtColorLight = 0x0A,
    Plug = 0x10,
    Sensor = 0x20,
    TwoButtonSwitch = 0x40,
    FourButtonSwitch = 0x41,
}

impl DeviceKind {
    pub fn create(code: u8) -> Option<Self> {
        DeviceKind::iter().find(|kind| kind.clone() as u8 == code)
    }

    pub fn code(&self) -> u8 {
        self.clone() as u8
    }
}
