//! Decoding of response frames.
//!
//! Every response carries a failure byte and an item count ahead of its
//! items. Numeric reads are bounds checked and turn short frames into
//! [`Error::TruncatedResponse`]; string reads clamp instead, because the
//! gateway pads names with trailing zeros and firmware revisions disagree
//! about how many.

use serde::Serialize;

use crate::commands::CommandId;
use crate::errors::Error;
use crate::frame::{Frame, hex_encode};

type Result<T> = std::result::Result<T, Error>;

/// Absolute offset of the first item in a response frame.
pub(crate) const ITEMS_OFFSET: usize = 11;

const FAILURE_OFFSET: usize = 8;
const COUNT_OFFSET: usize = 9;

/// Bounds-checked field access into one response frame.
pub(crate) struct FrameReader<'a> {
    frame: &'a Frame,
    command: CommandId,
}

impl<'a> FrameReader<'a> {
    pub fn new(frame: &'a Frame, command: CommandId) -> Self {
        FrameReader { frame, command }
    }

    fn bytes(&self, pos: usize, len: usize) -> Result<&'a [u8]> {
        self.frame
            .as_bytes()
            .get(pos..pos + len)
            .ok_or_else(|| Error::truncated(self.command, self.frame.as_bytes().len()))
    }

    pub fn u8(&self, pos: usize) -> Result<u8> {
        Ok(self.bytes(pos, 1)?[0])
    }

    pub fn u16_le(&self, pos: usize) -> Result<u16> {
        let bytes = self.bytes(pos, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn u32_be(&self, pos: usize) -> Result<u32> {
        let bytes = self.bytes(pos, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn u64_le(&self, pos: usize) -> Result<u64> {
        let bytes = self.bytes(pos, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Name field between `start` and `end`, clamped to the frame.
    pub fn string(&self, start: usize, end: usize) -> String {
        read_fixed_width_null_terminated_string(self.frame.as_bytes(), start, end)
    }

    pub fn failure_code(&self) -> Result<u8> {
        self.u8(FAILURE_OFFSET)
    }

    pub fn item_count(&self) -> Result<u16> {
        self.u16_le(COUNT_OFFSET)
    }
}

/// Failure byte of a response, nonzero when the gateway rejected the
/// command.
pub(crate) fn failure_code(frame: &Frame, command: CommandId) -> Result<u8> {
    FrameReader::new(frame, command).failure_code()
}

/// Item count advertised by a response.
pub(crate) fn item_count(frame: &Frame, command: CommandId) -> Result<u16> {
    FrameReader::new(frame, command).item_count()
}

/// Decodes the item region of a response.
///
/// `package_size` fixes the per-item stride; when `None` the stride is
/// derived by dividing the region evenly by the advertised count. A count
/// of zero yields an empty vector without touching the item region; a
/// count the region cannot hold is a truncated response.
pub(crate) fn decode_items<T>(
    frame: &Frame,
    command: CommandId,
    package_size: Option<usize>,
    mut decode: impl FnMut(&FrameReader<'_>, usize) -> Result<T>,
) -> Result<Vec<T>> {
    let reader = FrameReader::new(frame, command);
    let count = reader.item_count()? as usize;
    if count == 0 {
        return Ok(Vec::new());
    }
    let region = frame.as_bytes().len().saturating_sub(ITEMS_OFFSET);
    let stride = match package_size {
        Some(size) => size,
        None => region / count,
    };
    if stride == 0 || count * stride > region {
        return Err(Error::truncated(command, frame.as_bytes().len()));
    }
    (0..count)
        .map(|item| decode(&reader, ITEMS_OFFSET + item * stride))
        .collect()
}

/// Reads a fixed-width, zero-padded name field as UTF-8.
///
/// The field occupies `start..end`; decoding stops at the first NUL byte
/// and invalid UTF-8 is replaced rather than rejected. Bounds outside the
/// buffer clamp to it.
///
/// # Examples
///
/// ```
/// use lightify_rs::read_fixed_width_null_terminated_string;
///
/// let field = b"Kitchen\0\0\0\0\0\0\0\0\0";
/// assert_eq!(read_fixed_width_null_terminated_string(field, 0, 16), "Kitchen");
/// ```
pub fn read_fixed_width_null_terminated_string(buffer: &[u8], start: usize, end: usize) -> String {
    let end = end.min(buffer.len());
    let start = start.min(end);
    let field = &buffer[start..end];
    let terminated = field
        .iter()
        .position(|&byte| byte == 0)
        .map_or(field, |nul| &field[..nul]);
    String::from_utf8_lossy(terminated).into_owned()
}

/// Per-device acknowledgement inside a state-changing command's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    /// MAC of the acknowledging device.
    pub mac: u64,
    /// Raw per-device status byte; zero is success.
    pub status: u8,
}

impl CommandAck {
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }

    /// MAC rendered as hex in wire byte order.
    pub fn friendly_mac(&self) -> String {
        hex_encode(&self.mac.to_le_bytes())
    }
}

/// Decodes the default acknowledgement shape: 8-byte MAC plus one status
/// byte per addressed device.
pub(crate) fn decode_acks(frame: &Frame, command: CommandId) -> Result<Vec<CommandAck>> {
    decode_items(frame, command, None, |reader, pos| {
        Ok(CommandAck {
            mac: reader.u64_le(pos)?,
            status: reader.u8(pos + 8)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FLAG_NODE;

    fn response(command: CommandId, failure: u8, count: u16, items: &[u8]) -> Frame {
        let mut body = vec![failure];
        body.extend_from_slice(&count.to_le_bytes());
        body.extend_from_slice(items);
        Frame::new(FLAG_NODE, command.value(), 1, &body)
    }

    #[test]
    fn test_failure_and_count_fields() {
        let frame = response(CommandId::GetStatus, 0x15, 0, &[]);
        assert_eq!(failure_code(&frame, CommandId::GetStatus).unwrap(), 0x15);
        assert_eq!(item_count(&frame, CommandId::GetStatus).unwrap(), 0);
    }

    #[test]
    fn test_zero_items_decodes_empty() {
        let frame = response(CommandId::ListAllNodes, 0, 0, &[]);
        let items: Vec<u8> =
            decode_items(&frame, CommandId::ListAllNodes, Some(50), |reader, pos| {
                reader.u8(pos)
            })
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_derived_stride_splits_the_region_evenly() {
        let frame = response(CommandId::ListAllZones, 0, 3, &[1, 0, 2, 0, 3, 0]);
        let ids = decode_items(&frame, CommandId::ListAllZones, None, |reader, pos| {
            reader.u16_le(pos)
        })
        .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_short_frame_is_truncated_not_a_panic() {
        let frame = response(CommandId::GetStatus, 0, 1, &[0xAA]);
        let result = decode_items(&frame, CommandId::GetStatus, Some(12), |reader, pos| {
            reader.u64_le(pos)
        });
        assert!(matches!(
            result,
            Err(Error::TruncatedResponse {
                command: CommandId::GetStatus,
                ..
            })
        ));
    }

    #[test]
    fn test_overstated_count_is_rejected() {
        // One 9-byte ack on the wire but a count of ten; a derived stride
        // of zero must not decode the same record over and over.
        let mut items = 1u64.to_le_bytes().to_vec();
        items.push(0x00);
        let frame = response(CommandId::SetOnOff, 0, 10, &items);
        let result = decode_acks(&frame, CommandId::SetOnOff);
        assert!(matches!(
            result,
            Err(Error::TruncatedResponse {
                command: CommandId::SetOnOff,
                ..
            })
        ));
    }

    #[test]
    fn test_fixed_stride_larger_than_the_region_is_rejected() {
        let frame = response(CommandId::ListAllNodes, 0, 2, &[0xAA; 50]);
        let result = decode_items(&frame, CommandId::ListAllNodes, Some(50), |reader, pos| {
            reader.u8(pos)
        });
        assert!(matches!(result, Err(Error::TruncatedResponse { .. })));
    }

    #[test]
    fn test_name_field_stops_at_nul() {
        let buffer = b"ab\0cd";
        assert_eq!(read_fixed_width_null_terminated_string(buffer, 0, 5), "ab");
        assert_eq!(read_fixed_width_null_terminated_string(buffer, 3, 5), "cd");
    }

    #[test]
    fn test_name_field_clamps_out_of_range_bounds() {
        let buffer = b"zone";
        assert_eq!(
            read_fixed_width_null_terminated_string(buffer, 0, 64),
            "zone"
        );
        assert_eq!(read_fixed_width_null_terminated_string(buffer, 9, 12), "");
    }

    #[test]
    fn test_ack_decoding() {
        let mut items = 0x0011_2233_4455_6677u64.to_le_bytes().to_vec();
        items.push(0x00);
        let frame = response(CommandId::SetOnOff, 0, 1, &items);
        let acks = decode_acks(&frame, CommandId::SetOnOff).unwrap();
        assert_eq!(acks.len(), 1);
        assert!(acks[0].succeeded());
        assert_eq!(acks[0].mac, 0x0011_2233_4455_6677);
        assert_eq!(acks[0].friendly_mac(), "7766554433221100");
    }

    #[test]
    fn test_failed_ack_is_reported_per_device() {
        let mut items = 1u64.to_le_bytes().to_vec();
        items.push(0x01);
        items.extend_from_slice(&2u64.to_le_bytes());
        items.push(0x00);
        let frame = response(CommandId::SetBrightness, 0, 2, &items);
        let acks = decode_acks(&frame, CommandId::SetBrightness).unwrap();
        assert!(!acks[0].succeeded());
        assert!(acks[1].succeeded());
    }
}
