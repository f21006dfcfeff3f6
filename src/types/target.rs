//! Command addressing.

use serde::{Deserialize, Serialize};

/// Addressee of a command: a single device by MAC, or a zone by id.
///
/// The wire encodes both in the same 8-byte field. Devices fill it with
/// their 64-bit MAC in little-endian order; zones put their 16-bit id in
/// the first two bytes and leave the rest zero.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Device(u64),
    Zone(u16),
}

impl Target {
    pub fn device(mac: u64) -> Self {
        Target::Device(mac)
    }

    pub fn zone(id: u16) -> Self {
        Target::Zone(id)
    }

    pub fn is_zone(&self) -> bool {
        matches!(self, Target::Zone(_))
    }

    /// The 8-byte addressing field as it appears in a request body.
    pub(crate) fn wire_bytes(self) -> [u8; 8] {
        match self {
            Target::Device(mac) => mac.to_le_bytes(),
            Target::Zone(id) => {
                let mut bytes = [0u8; 8];
                bytes[..2].copy_from_slice(&id.to_le_bytes());
                bytes
            }
        }
    }
}

/// Guesses whether a raw 64-bit address names a zone rather than a device.
///
/// Zone ids only occupy the low 16 bits, so an address whose upper six
/// bytes are all zero is taken to be a zone. This is a heuristic, not a
/// protocol field: a (nonexistent in practice) device MAC of that shape
/// would be misclassified, and zero is treated as a device address.
/// Construct a [`Target`] explicitly to bypass the guess.
///
/// # Examples
///
/// ```
/// use lightify_rs::is_zone_address;
///
/// assert!(is_zone_address(1));
/// assert!(is_zone_address(0xFFFF));
/// assert!(!is_zone_address(0));
/// assert!(!is_zone_address(0x0001_0000));
/// assert!(!is_zone_address(0x84182600_0000_1D5F));
/// ```
pub fn is_zone_address(raw: u64) -> bool {
    raw != 0 && raw >> 16 == 0
}

impl From<u64> for Target {
    fn from(raw: u64) -> Self {
        if is_zone_address(raw) {
            Target::Zone(raw as u16)
        } else {
            Target::Device(raw)
        }
    }
}

impl From<u16> for Target {
    fn from(id: u16) -> Self {
        Target::Zone(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_wire_bytes_little_endian() {
        let target = Target::device(0x0011_2233_4455_6677);
        assert_eq!(
            target.wire_bytes(),
            [0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x00]
        );
    }

    #[test]
    fn test_zone_wire_bytes_pad_with_zeros() {
        let target = Target::zone(0x0102);
        assert_eq!(target.wire_bytes(), [0x02, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_zone_address_boundaries() {
        assert!(!is_zone_address(0));
        assert!(is_zone_address(1));
        assert!(is_zone_address(u16::MAX as u64));
        assert!(!is_zone_address(u16::MAX as u64 + 1));
        assert!(!is_zone_address(u64::MAX));
    }

    #[test]
    fn test_from_raw_address() {
        assert_eq!(Target::from(3u64), Target::Zone(3));
        assert_eq!(Target::from(0u64), Target::Device(0));
        assert_eq!(
            Target::from(0x8418_2600_0000_1D5F_u64),
            Target::Device(0x8418_2600_0000_1D5F)
        );
    }
}
