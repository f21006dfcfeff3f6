//! Command identifiers and request body encoding.
//!
//! Every request body for a targeted command starts with the 8-byte
//! addressing field; command-specific parameters follow at fixed offsets.

use crate::frame::{FLAG_NODE, FLAG_ZONE};
use crate::types::{Brightness, ColorTemperature, Rgba, Target, Transition};

/// Identifiers of the gateway commands this client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    /// Enumerate every paired device with its full state.
    ListAllNodes = 0x13,
    /// Enumerate zone ids and names.
    ListAllZones = 0x1E,
    /// Name and member MACs of one zone.
    GetZoneInfo = 0x26,
    /// Set brightness with an optional fade.
    SetBrightness = 0x31,
    /// Hard on/off.
    SetOnOff = 0x32,
    /// Set white color temperature with an optional fade.
    SetTemperature = 0x33,
    /// Set RGBA color with an optional fade.
    SetColor = 0x36,
    /// Recall a scene stored on the gateway.
    ActivateScene = 0x52,
    /// Query the live state of one device.
    GetStatus = 0x68,
    /// Fade in from off.
    SoftOn = 0xDB,
    /// Fade out to off.
    SoftOff = 0xDC,
}

impl CommandId {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Whether the gateway accepts this command with the zone flag set.
    ///
    /// Only these commands take part in zone-address inference; everything
    /// else always goes out addressed to a single device.
    pub fn accepts_zone_target(self) -> bool {
        matches!(
            self,
            CommandId::SetBrightness
                | CommandId::SetOnOff
                | CommandId::SetTemperature
                | CommandId::SetColor
                | CommandId::GetStatus
        )
    }
}

/// Header flag for a command aimed at the given target.
pub(crate) fn frame_flag(command: CommandId, target: Target) -> u8 {
    if command.accepts_zone_target() && target.is_zone() {
        FLAG_ZONE
    } else {
        FLAG_NODE
    }
}

fn target_body(target: Target, len: usize) -> Vec<u8> {
    let mut body = vec![0u8; len];
    body[..8].copy_from_slice(&target.wire_bytes());
    body
}

/// Body of [`CommandId::ListAllNodes`].
pub(crate) fn discover_nodes() -> Vec<u8> {
    vec![0x01]
}

/// Body of [`CommandId::ListAllZones`].
pub(crate) fn discover_zones() -> Vec<u8> {
    vec![0x00]
}

/// Body of [`CommandId::GetZoneInfo`].
pub(crate) fn zone_info(zone: u16) -> Vec<u8> {
    zone.to_le_bytes().to_vec()
}

/// Body of [`CommandId::GetStatus`].
pub(crate) fn status(target: Target) -> Vec<u8> {
    target_body(target, 8)
}

/// Body of [`CommandId::SetOnOff`].
pub(crate) fn on_off(target: Target, on: bool) -> Vec<u8> {
    let mut body = target_body(target, 9);
    body[8] = u8::from(on);
    body
}

/// Body of [`CommandId::SoftOn`] and [`CommandId::SoftOff`].
pub(crate) fn soft_on_off(target: Target, transition: Transition) -> Vec<u8> {
    let mut body = target_body(target, 10);
    body[8..10].copy_from_slice(&transition.deciseconds().to_le_bytes());
    body
}

/// Body of [`CommandId::SetBrightness`].
pub(crate) fn brightness(target: Target, level: Brightness, transition: Transition) -> Vec<u8> {
    let mut body = target_body(target, 11);
    body[8] = level.value();
    body[9..11].copy_from_slice(&transition.deciseconds().to_le_bytes());
    body
}

/// Body of [`CommandId::SetTemperature`].
pub(crate) fn temperature(
    target: Target,
    temperature: ColorTemperature,
    transition: Transition,
) -> Vec<u8> {
    let mut body = target_body(target, 12);
    body[8..10].copy_from_slice(&temperature.kelvin().to_le_bytes());
    body[10..12].copy_from_slice(&transition.deciseconds().to_le_bytes());
    body
}

/// Body of [`CommandId::SetColor`].
pub(crate) fn color(target: Target, color: &Rgba, transition: Transition) -> Vec<u8> {
    let mut body = target_body(target, 14);
    body[8] = color.red();
    body[9] = color.green();
    body[10] = color.blue();
    body[11] = color.alpha();
    body[12..14].copy_from_slice(&transition.deciseconds().to_le_bytes());
    body
}

/// Body of [`CommandId::ActivateScene`].
pub(crate) fn activate_scene(scene: u8) -> Vec<u8> {
    vec![scene, 0x00]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC: u64 = 0x0011_2233_4455_6677;
    const MAC_BYTES: [u8; 8] = [0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x00];

    fn device() -> Target {
        Target::device(MAC)
    }

    #[test]
    fn test_discovery_bodies() {
        assert_eq!(discover_nodes(), vec![0x01]);
        assert_eq!(discover_zones(), vec![0x00]);
        assert_eq!(zone_info(0x0201), vec![0x01, 0x02]);
    }

    #[test]
    fn test_status_body_is_the_bare_address() {
        assert_eq!(status(device()), MAC_BYTES.to_vec());
        assert_eq!(
            status(Target::zone(5)),
            vec![0x05, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_on_off_body() {
        let mut expected = MAC_BYTES.to_vec();
        expected.push(0x01);
        assert_eq!(on_off(device(), true), expected);

        expected[8] = 0x00;
        assert_eq!(on_off(device(), false), expected);
    }

    #[test]
    fn test_soft_on_off_body_carries_the_fade() {
        let mut expected = MAC_BYTES.to_vec();
        expected.extend_from_slice(&[0x2C, 0x01]);
        assert_eq!(
            soft_on_off(device(), Transition::from_deciseconds(300)),
            expected
        );
    }

    #[test]
    fn test_brightness_body_layout() {
        let mut expected = MAC_BYTES.to_vec();
        expected.extend_from_slice(&[50, 0x0A, 0x00]);
        assert_eq!(
            brightness(
                device(),
                Brightness::create_or(50),
                Transition::from_deciseconds(10)
            ),
            expected
        );
    }

    #[test]
    fn test_temperature_body_layout() {
        let mut expected = MAC_BYTES.to_vec();
        expected.extend_from_slice(&[0x8C, 0x0A, 0x00, 0x00]);
        let warm = ColorTemperature::create_or(2700);
        assert_eq!(
            temperature(device(), warm, Transition::immediate()),
            expected
        );
    }

    #[test]
    fn test_color_body_layout() {
        let mut expected = MAC_BYTES.to_vec();
        expected.extend_from_slice(&[255, 128, 64, 255, 0x05, 0x00]);
        assert_eq!(
            color(
                device(),
                &Rgba::rgb(255, 128, 64),
                Transition::from_deciseconds(5)
            ),
            expected
        );
    }

    #[test]
    fn test_scene_body_has_a_trailing_zero() {
        assert_eq!(activate_scene(7), vec![0x07, 0x00]);
    }

    #[test]
    fn test_zone_flag_only_for_zone_capable_commands() {
        let zone = Target::zone(1);
        assert_eq!(frame_flag(CommandId::SetOnOff, zone), FLAG_ZONE);
        assert_eq!(frame_flag(CommandId::SetBrightness, zone), FLAG_ZONE);
        assert_eq!(frame_flag(CommandId::GetStatus, zone), FLAG_ZONE);
        assert_eq!(frame_flag(CommandId::SoftOn, zone), FLAG_NODE);
        assert_eq!(frame_flag(CommandId::ActivateScene, zone), FLAG_NODE);
        assert_eq!(frame_flag(CommandId::SetOnOff, device()), FLAG_NODE);
    }

    #[test]
    fn test_command_values() {
        assert_eq!(CommandId::ListAllNodes.value(), 0x13);
        assert_eq!(CommandId::ListAllZones.value(), 0x1E);
        assert_eq!(CommandId::GetZoneInfo.value(), 0x26);
        assert_eq!(CommandId::SetBrightness.value(), 0x31);
        assert_eq!(CommandId::SetOnOff.value(), 0x32);
        assert_eq!(CommandId::SetTemperature.value(), 0x33);
        assert_eq!(CommandId::SetColor.value(), 0x36);
        assert_eq!(CommandId::ActivateScene.value(), 0x52);
        assert_eq!(CommandId::GetStatus.value(), 0x68);
        assert_eq!(CommandId::SoftOn.value(), 0xDB);
        assert_eq!(CommandId::SoftOff.value(), 0xDC);
    }
}
