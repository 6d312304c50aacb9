//! Raw packet framing and validation.
//!
//! A [`RawPacket`] is one framed message as delivered by the transport:
//! either a binary frame (sync byte, group-enable byte, one field word per
//! group, payload, CRC) or an ascii register record (`$VNxxx,...*XX`).
//! Decoding records the declared groups or message type and the integrity
//! outcome; [`RawPacket::validate`] then decides, against the negotiated
//! output configuration, whether the payload may be extracted at all.
//!
//! Validation is a hard boundary. Accepting a frame whose declared groups
//! differ from the configuration would silently corrupt every field read
//! after the first mismatch, so any difference, extra or missing, rejects
//! the whole frame.

use crate::config::{OutputConfig, OutputMode};
use crate::groups::{AsciiAsyncType, CommonGroup, ImuGroup, OutputGroups, WireGroups};
use crate::integrity;
use crate::{Error, Result};

/// First byte of every binary frame.
pub const SYNC_BYTE: u8 = 0xfa;

#[derive(Debug, Clone)]
pub enum PacketKind {
    Binary { groups: WireGroups },
    Ascii { msg: AsciiAsyncType },
}

#[derive(Debug, Clone)]
pub struct RawPacket {
    kind: PacketKind,
    data: Vec<u8>,
    payload_start: usize,
    payload_end: usize,
    valid: bool,
}

impl RawPacket {
    /// Decode one framed message. Dispatches on the first byte: [`SYNC_BYTE`]
    /// opens a binary frame, `$` an ascii record.
    ///
    /// The integrity check (CRC-16 or XOR-8) is computed here and recorded as
    /// the packet's validity; it does not fail the decode, since rejection
    /// policy belongs to [`RawPacket::validate`].
    ///
    /// # Errors
    /// [`Error::NotEnoughData`] or [`Error::Framing`] when the bytes cannot
    /// be framed at all.
    pub fn decode(dat: &[u8]) -> Result<RawPacket> {
        match dat.first() {
            Some(&SYNC_BYTE) => Self::decode_binary(dat),
            Some(b'$') => Self::decode_ascii(dat),
            Some(b) => Err(Error::Framing(format!("unrecognized start byte {b:#04x}"))),
            None => Err(Error::NotEnoughData { actual: 0, minimum: 1 }),
        }
    }

    fn decode_binary(dat: &[u8]) -> Result<RawPacket> {
        if dat.len() < 2 {
            return Err(Error::NotEnoughData { actual: dat.len(), minimum: 2 });
        }
        let declared = OutputGroups::from_bits(dat[1])
            .ok_or_else(|| Error::Framing(format!("undefined group bits {:#04x}", dat[1])))?;

        // one field-enable word per declared group, ascending bit order
        let mut groups = WireGroups::default();
        let mut pos = 2;
        for group in [
            OutputGroups::COMMON,
            OutputGroups::TIME,
            OutputGroups::IMU,
            OutputGroups::GPS,
            OutputGroups::ATTITUDE,
            OutputGroups::INS,
        ] {
            if !declared.contains(group) {
                continue;
            }
            if dat.len() < pos + 2 {
                return Err(Error::NotEnoughData { actual: dat.len(), minimum: pos + 2 });
            }
            let word = u16::from_le_bytes([dat[pos], dat[pos + 1]]);
            pos += 2;
            if group == OutputGroups::COMMON {
                groups.common = CommonGroup::from_bits_retain(word);
            } else if group == OutputGroups::IMU {
                groups.imu = ImuGroup::from_bits_retain(word);
            } else {
                // field words of groups this driver never negotiates are not
                // retained; the group bit alone rejects the frame later
                groups.extra |= group;
            }
        }

        if dat.len() < pos + 2 {
            return Err(Error::NotEnoughData { actual: dat.len(), minimum: pos + 2 });
        }

        Ok(RawPacket {
            kind: PacketKind::Binary { groups },
            payload_start: pos,
            payload_end: dat.len() - 2,
            valid: integrity::verify_crc16(dat),
            data: dat.to_vec(),
        })
    }

    fn decode_ascii(dat: &[u8]) -> Result<RawPacket> {
        let star = dat
            .iter()
            .rposition(|&b| b == b'*')
            .ok_or_else(|| Error::Framing("missing checksum delimiter".to_string()))?;
        if dat.len() < star + 3 {
            return Err(Error::NotEnoughData { actual: dat.len(), minimum: star + 3 });
        }

        let stored = std::str::from_utf8(&dat[star + 1..star + 3])
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(|| Error::Framing("unparseable checksum digits".to_string()))?;
        let valid = integrity::xor8(&dat[1..star]) == stored;

        let body = &dat[1..star];
        let comma = body.iter().position(|&b| b == b',');
        let tag = std::str::from_utf8(&body[..comma.unwrap_or(body.len())])
            .map_err(|_| Error::Framing("register tag is not valid utf-8".to_string()))?;

        Ok(RawPacket {
            kind: PacketKind::Ascii { msg: AsciiAsyncType::from_tag(tag) },
            // values between the tag's comma and the `*`
            payload_start: comma.map_or(star, |c| c + 2),
            payload_end: star,
            valid,
            data: dat.to_vec(),
        })
    }

    /// Override the computed validity with the transport's own checksum
    /// outcome.
    #[must_use]
    pub fn with_validity(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &PacketKind {
        &self.kind
    }

    /// True when the frame passed its CRC or checksum.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The extractable bytes: binary field data, or the ascii value list.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[self.payload_start..self.payload_end]
    }

    /// Check this packet against the negotiated output configuration.
    ///
    /// # Errors
    /// [`Error::GroupMismatch`] or [`Error::WrongAsciiType`] when the packet
    /// is not the shape the configuration promises, [`Error::Checksum`] when
    /// the integrity check failed.
    pub fn validate(&self, config: &OutputConfig) -> Result<()> {
        match (config.mode(), &self.kind) {
            (OutputMode::Binary, PacketKind::Binary { groups }) => {
                let want = config.expected_groups();
                if *groups != want {
                    return Err(Error::GroupMismatch { want, got: *groups });
                }
            }
            (OutputMode::Binary, PacketKind::Ascii { .. }) => {
                return Err(Error::GroupMismatch {
                    want: config.expected_groups(),
                    got: WireGroups::default(),
                });
            }
            (OutputMode::Ascii, PacketKind::Ascii { msg }) => {
                if *msg != AsciiAsyncType::Vnqmr {
                    return Err(Error::WrongAsciiType(*msg));
                }
            }
            (OutputMode::Ascii, PacketKind::Binary { .. }) => {
                return Err(Error::WrongAsciiType(AsciiAsyncType::Unknown));
            }
        }

        if !self.valid {
            return Err(Error::Checksum);
        }
        Ok(())
    }
}
