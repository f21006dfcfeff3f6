//! Zones (device groups) as the gateway reports them.

use serde::{Deserialize, Serialize};

use crate::commands::CommandId;
use crate::errors::Error;
use crate::frame::Frame;
use crate::response::FrameReader;
use crate::types::Target;

type Result<T> = std::result::Result<T, Error>;

/// One zone from the zone listing: id and name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub id: u16,
    /// Zone name, trimmed of trailing NUL padding.
    pub name: String,
}

impl ZoneSummary {
    /// Zone listing items carry a 16-byte name after the id.
    const NAME_LEN: usize = 16;

    pub(crate) fn decode(reader: &FrameReader<'_>, pos: usize) -> Result<Self> {
        Ok(ZoneSummary {
            id: reader.u16_le(pos)?,
            name: reader.string(pos + 2, pos + 2 + Self::NAME_LEN),
        })
    }

    /// This zone as a command target.
    pub fn target(&self) -> Target {
        Target::Zone(self.id)
    }
}

/// Name and member devices of one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDetails {
    /// Zone id echoed from the query.
    pub id: u16,
    pub name: String,
    /// MACs of the member devices.
    pub devices: Vec<u64>,
}

impl ZoneDetails {
    /// Zone info responses use one fixed record at absolute offsets:
    /// a 15-byte name, a member count, then 8-byte MACs. The advertised
    /// item count is unreliable for this command and is ignored.
    pub(crate) fn decode(frame: &Frame, id: u16) -> Result<Self> {
        let reader = FrameReader::new(frame, CommandId::GetZoneInfo);
        let name = reader.string(11, 26);
        let count = reader.u8(27)? as usize;
        let devices = (0..count)
            .map(|member| reader.u64_le(28 + member * 8))
            .collect::<Result<Vec<u64>>>()?;
        Ok(ZoneDetails { id, name, devices })
    }

    /// This zone as a command target.
    pub fn target(&self) -> Target {
        Target::Zone(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FLAG_NODE;
    use crate::response;

    #[test]
    fn test_decode_zone_listing() {
        let mut items = Vec::new();
        for (id, name) in [(1u16, b"Living room\0\0\0\0\0"), (2u16, b"Hall\0\0\0\0\0\0\0\0\0\0\0\0")] {
            items.extend_from_slice(&id.to_le_bytes());
            items.extend_from_slice(name);
        }
        let mut body = vec![0x00];
        body.extend_from_slice(&2u16.to_le_bytes());
        body.extend_from_slice(&items);
        let frame = Frame::new(FLAG_NODE, CommandId::ListAllZones.value(), 4, &body);

        let zones = response::decode_items(
            &frame,
            CommandId::ListAllZones,
            None,
            ZoneSummary::decode,
        )
        .unwrap();

        assert_eq!(
            zones,
            vec![
                ZoneSummary {
                    id: 1,
                    name: "Living room".into()
                },
                ZoneSummary {
                    id: 2,
                    name: "Hall".into()
                },
            ]
        );
        assert_eq!(zones[0].target(), Target::Zone(1));
    }

    #[test]
    fn test_decode_zone_details() {
        let mut body = vec![0x00];
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(b"Bedroom\0\0\0\0\0\0\0\0");
        body.push(0xEE);
        body.push(2);
        body.extend_from_slice(&0xA1u64.to_le_bytes());
        body.extend_from_slice(&0xB2u64.to_le_bytes());
        let frame = Frame::new(FLAG_NODE, CommandId::GetZoneInfo.value(), 7, &body);

        let details = ZoneDetails::decode(&frame, 3).unwrap();
        assert_eq!(details.id, 3);
        assert_eq!(details.name, "Bedroom");
        assert_eq!(details.devices, vec![0xA1, 0xB2]);
        assert_eq!(details.target(), Target::Zone(3));
    }

    #[test]
    fn test_zone_details_with_no_members() {
        let mut body = vec![0x00];
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(b"Empty\0\0\0\0\0\0\0\0\0\0");
        body.push(0x00);
        body.push(0);
        let frame = Frame::new(FLAG_NODE, CommandId::GetZoneInfo.value(), 8, &body);

        let details = ZoneDetails::decode(&frame, 9).unwrap();
        assert_eq!(details.name, "Empty");
        assert!(details.devices.is_empty());
    }
}
