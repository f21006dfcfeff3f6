//! Devices as the gateway reports them.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::commands::CommandId;
use crate::errors::Error;
use crate::frame::{Frame, hex_encode};
use crate::response::FrameReader;
use crate::types::{DeviceKind, DeviceType, Rgba};

type Result<T> = std::result::Result<T, Error>;

/// One paired device from a discovery sweep, state snapshot included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Short id assigned by the gateway.
    pub id: u16,
    /// 64-bit device MAC.
    pub mac: u64,
    /// Raw device type code.
    pub device_type: DeviceType,
    /// Firmware revision, big-endian as printed on the box.
    pub firmware_version: u32,
    /// Raw reachability byte; zero means unreachable.
    pub online: u8,
    /// Id of the zone the device belongs to, zero for none.
    pub group_id: u16,
    /// Raw power byte; 1 is on, 0 is off.
    pub status: u8,
    /// Last acknowledged brightness byte, unvalidated.
    pub brightness: u8,
    /// Last acknowledged color temperature in Kelvin.
    pub temperature: u16,
    /// Last acknowledged RGBA color.
    pub color: Rgba,
    /// Device name, trimmed of trailing NUL padding.
    pub name: String,
}

impl DeviceInfo {
    /// Discovery reports devices in fixed 50-byte records.
    pub(crate) const ITEM_LEN: usize = 50;

    pub(crate) fn decode(reader: &FrameReader<'_>, pos: usize) -> Result<Self> {
        Ok(DeviceInfo {
            id: reader.u16_le(pos)?,
            mac: reader.u64_le(pos + 2)?,
            device_type: DeviceType::from_code(reader.u8(pos + 10)?),
            firmware_version: reader.u32_be(pos + 11)?,
            online: reader.u8(pos + 15)?,
            group_id: reader.u16_le(pos + 16)?,
            status: reader.u8(pos + 18)?,
            brightness: reader.u8(pos + 19)?,
            temperature: reader.u16_le(pos + 20)?,
            color: Rgba::rgba(
                reader.u8(pos + 22)?,
                reader.u8(pos + 23)?,
                reader.u8(pos + 24)?,
                reader.u8(pos + 25)?,
            ),
            name: reader.string(pos + 26, pos + Self::ITEM_LEN),
        })
    }

    /// MAC rendered as hex in wire byte order.
    pub fn friendly_mac(&self) -> String {
        hex_encode(&self.mac.to_le_bytes())
    }

    pub fn is_on(&self) -> bool {
        self.status == 1
    }

    pub fn is_online(&self) -> bool {
        self.online != 0
    }

    /// The known category for this device's type code, if any.
    pub fn kind(&self) -> Option<DeviceKind> {
        self.device_type.kind()
    }
}

/// Live state of one device, from a status query.
///
/// The gateway answers for devices it cannot reach too; in that case
/// `request_status` is nonzero and the state fields are absent.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// 64-bit device MAC echoed from the request.
    pub mac: u64,
    /// Zero when the device answered; nonzero when it could not be
    /// reached.
    pub request_status: u8,
    /// Raw reachability byte, zero when the query failed.
    pub online: u8,
    pub status: Option<u8>,
    pub brightness: Option<u8>,
    pub temperature: Option<u16>,
    pub color: Option<Rgba>,
}

impl DeviceStatus {
    /// Status responses put their single record at fixed absolute
    /// offsets rather than in the item region proper.
    pub(crate) fn decode(frame: &Frame) -> Result<Self> {
        let reader = FrameReader::new(frame, CommandId::GetStatus);
        let mac = reader.u64_le(11)?;
        let request_status = reader.u8(19)?;
        if request_status != 0 {
            return Ok(DeviceStatus {
                mac,
                request_status,
                online: 0,
                status: None,
                brightness: None,
                temperature: None,
                color: None,
            });
        }
        Ok(DeviceStatus {
            mac,
            request_status,
            online: reader.u8(20)?,
            status: Some(reader.u8(21)?),
            brightness: Some(reader.u8(22)?),
            temperature: Some(reader.u16_le(23)?),
            color: Some(Rgba::rgba(
                reader.u8(25)?,
                reader.u8(26)?,
                reader.u8(27)?,
                reader.u8(28)?,
            )),
        })
    }

    /// MAC rendered as hex in wire byte order.
    pub fn friendly_mac(&self) -> String {
        hex_encode(&self.mac.to_le_bytes())
    }

    pub fn is_on(&self) -> Option<bool> {
        self.status.map(|status| status == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FLAG_NODE;
    use crate::response;

    fn discovery_item() -> Vec<u8> {
        let mut item = Vec::with_capacity(DeviceInfo::ITEM_LEN);
        item.extend_from_slice(&1u16.to_le_bytes());
        item.extend_from_slice(&0x0013_8A01_0203_0405u64.to_le_bytes());
        item.push(0x08);
        item.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        item.push(0x01);
        item.extend_from_slice(&2u16.to_le_bytes());
        item.push(0x01);
        item.push(254);
        item.extend_from_slice(&2700u16.to_le_bytes());
        item.extend_from_slice(&[255, 128, 64, 255]);
        item.extend_from_slice(b"Kitchen lamp");
        item.resize(DeviceInfo::ITEM_LEN, 0);
        item
    }

    fn discovery_frame(items: &[&[u8]]) -> Frame {
        let mut body = vec![0x00];
        body.extend_from_slice(&(items.len() as u16).to_le_bytes());
        for item in items {
            body.extend_from_slice(item);
        }
        Frame::new(FLAG_NODE, CommandId::ListAllNodes.value(), 9, &body)
    }

    #[test]
    fn test_decode_discovery_record() {
        let item = discovery_item();
        let frame = discovery_frame(&[&item]);
        let devices = response::decode_items(
            &frame,
            CommandId::ListAllNodes,
            Some(DeviceInfo::ITEM_LEN),
            DeviceInfo::decode,
        )
        .unwrap();

        assert_eq!(devices.len(), 1);
        let device = &devices[0];
        assert_eq!(device.id, 1);
        assert_eq!(device.mac, 0x0013_8A01_0203_0405);
        assert_eq!(device.friendly_mac(), "05040302018a1300");
        assert_eq!(device.device_type, DeviceType::COLOR_LIGHT);
        assert_eq!(device.kind(), Some(DeviceKind::ColorLight));
        assert_eq!(device.firmware_version, 0x0102_0304);
        assert!(device.is_online());
        assert_eq!(device.group_id, 2);
        assert!(device.is_on());
        assert_eq!(device.brightness, 254);
        assert_eq!(device.temperature, 2700);
        assert_eq!(device.color, Rgba::rgb(255, 128, 64));
        assert_eq!(device.name, "Kitchen lamp");
    }

    #[test]
    fn test_decode_two_discovery_records() {
        let first = discovery_item();
        let mut second = discovery_item();
        second[0] = 2;
        second[18] = 0;
        let frame = discovery_frame(&[&first, &second]);
        let devices = response::decode_items(
            &frame,
            CommandId::ListAllNodes,
            Some(DeviceInfo::ITEM_LEN),
            DeviceInfo::decode,
        )
        .unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].id, 2);
        assert!(!devices[1].is_on());
    }

    fn status_frame(request_status: u8) -> Frame {
        let mut body = vec![0x00];
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&0xAAu64.to_le_bytes());
        body.push(request_status);
        if request_status == 0 {
            body.push(0x01);
            body.push(0x01);
            body.push(75);
            body.extend_from_slice(&4000u16.to_le_bytes());
            body.extend_from_slice(&[10, 20, 30, 255]);
        }
        Frame::new(FLAG_NODE, CommandId::GetStatus.value(), 3, &body)
    }

    #[test]
    fn test_decode_reachable_status() {
        let status = DeviceStatus::decode(&status_frame(0)).unwrap();
        assert_eq!(status.mac, 0xAA);
        assert_eq!(status.request_status, 0);
        assert_eq!(status.online, 1);
        assert_eq!(status.is_on(), Some(true));
        assert_eq!(status.brightness, Some(75));
        assert_eq!(status.temperature, Some(4000));
        assert_eq!(status.color, Some(Rgba::rgba(10, 20, 30, 255)));
    }

    #[test]
    fn test_decode_unreachable_status_has_no_state() {
        let status = DeviceStatus::decode(&status_frame(0xFF)).unwrap();
        assert_eq!(status.request_status, 0xFF);
        assert_eq!(status.online, 0);
        assert_eq!(status.is_on(), None);
        assert_eq!(status.brightness, None);
        assert_eq!(status.temperature, None);
        assert_eq!(status.color, None);
    }
}
