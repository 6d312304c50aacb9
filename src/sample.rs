//! Decoded measurement samples and the ordered field schema.
//!
//! The payload layout of an accepted frame is a fixed, order-dependent field
//! sequence determined by the negotiated output configuration. That order
//! lives in exactly one place, [`wire_schema`] / [`ascii_schema`], so it
//! cannot drift between call sites: extraction walks the schema and nothing
//! else decides what byte comes next.
//!
//! Fields whose group is on the wire are always consumed, even when their
//! publication is disabled; skipping them would desynchronize every read
//! after them. Unpublished values decode to `None`, never to a zero that
//! could pass for a real reading.

use serde::{Deserialize, Serialize};

use crate::bytes::Cursor;
use crate::config::OutputConfig;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Orientation quaternion, vector part first, scalar last.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// One fully extracted measurement sample.
///
/// Optional fields are `None` when their publication is disabled in the
/// output configuration. Ascii records carry neither a startup time nor a
/// pulse count; both decode as zero in that mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedSample {
    /// Nanoseconds since device power-up.
    pub device_time_ns: u64,
    pub orientation: Quaternion,
    pub magnetic_field: Option<Vector3>,
    pub temperature_c: Option<f32>,
    pub pressure_kpa: Option<f32>,
    /// Device count of observed sync-in pulse edges.
    pub sync_pulse_count: u32,
    pub linear_acceleration: Vector3,
    pub angular_rate: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    TimeStartup,
    Quaternion,
    MagneticField,
    Temperature,
    Pressure,
    SyncInCount,
    Acceleration,
    AngularRate,
}

impl FieldKind {
    /// Encoded size in a binary payload.
    pub(crate) fn wire_len(self) -> usize {
        match self {
            FieldKind::TimeStartup => 8,
            FieldKind::Quaternion => 16,
            FieldKind::MagneticField | FieldKind::Acceleration | FieldKind::AngularRate => 12,
            FieldKind::Temperature | FieldKind::Pressure => 4,
            FieldKind::SyncInCount => 4,
        }
    }

    /// Number of comma-separated values in an ascii record.
    fn ascii_len(self) -> usize {
        match self {
            FieldKind::Quaternion => 4,
            FieldKind::MagneticField | FieldKind::Acceleration | FieldKind::AngularRate => 3,
            FieldKind::Temperature | FieldKind::Pressure => 1,
            FieldKind::TimeStartup | FieldKind::SyncInCount => 1,
        }
    }
}

/// One step of the extraction order: what to read, and whether the decoded
/// value is published or discarded after being consumed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    pub kind: FieldKind,
    pub publish: bool,
}

/// Field order of a conforming binary payload.
///
/// Group order follows the group-enable byte, field order within a group
/// follows the field-enable word; both were fixed when the output registers
/// were written.
pub(crate) fn wire_schema(config: &OutputConfig) -> [Field; 8] {
    [
        Field { kind: FieldKind::TimeStartup, publish: true },
        Field { kind: FieldKind::Quaternion, publish: true },
        Field { kind: FieldKind::MagneticField, publish: config.enable_mag() },
        Field { kind: FieldKind::Temperature, publish: config.enable_temp() },
        Field { kind: FieldKind::Pressure, publish: config.enable_pres() },
        Field { kind: FieldKind::SyncInCount, publish: true },
        Field { kind: FieldKind::Acceleration, publish: true },
        Field { kind: FieldKind::AngularRate, publish: true },
    ]
}

/// Field order of a `VNQMR` ascii record. Acceleration and angular rate keep
/// the record's own order here; they are not rearranged to match the binary
/// group order.
pub(crate) fn ascii_schema(config: &OutputConfig) -> [Field; 4] {
    [
        Field { kind: FieldKind::Quaternion, publish: true },
        Field { kind: FieldKind::MagneticField, publish: config.enable_mag() },
        Field { kind: FieldKind::Acceleration, publish: true },
        Field { kind: FieldKind::AngularRate, publish: true },
    ]
}

/// Extract the field sequence from a validated binary payload.
///
/// The payload is consumed strictly left to right with no backtracking.
///
/// # Errors
/// [`Error::NotEnoughData`] if the payload ends before the schema does; no
/// partial sample is ever returned.
pub fn extract(payload: &[u8], config: &OutputConfig) -> Result<DecodedSample> {
    let mut cur = Cursor::new(payload);
    let mut sample = DecodedSample::default();

    for field in wire_schema(config) {
        match field.kind {
            FieldKind::TimeStartup => sample.device_time_ns = cur.read_u64()?,
            FieldKind::Quaternion => sample.orientation = read_quat(&mut cur)?,
            FieldKind::MagneticField => {
                let v = read_vec3(&mut cur)?;
                sample.magnetic_field = field.publish.then_some(v);
            }
            FieldKind::Temperature => {
                let v = cur.read_f32()?;
                sample.temperature_c = field.publish.then_some(v);
            }
            FieldKind::Pressure => {
                let v = cur.read_f32()?;
                sample.pressure_kpa = field.publish.then_some(v);
            }
            FieldKind::SyncInCount => sample.sync_pulse_count = cur.read_u32()?,
            FieldKind::Acceleration => sample.linear_acceleration = read_vec3(&mut cur)?,
            FieldKind::AngularRate => sample.angular_rate = read_vec3(&mut cur)?,
        }
    }

    Ok(sample)
}

/// Extract the field sequence from the body of a validated ascii record
/// (the comma-separated values between the register tag and `*`).
///
/// # Errors
/// [`Error::Ascii`] on a wrong field count or an unparseable value.
pub fn extract_ascii(body: &[u8], config: &OutputConfig) -> Result<DecodedSample> {
    let text = std::str::from_utf8(body)
        .map_err(|_| Error::Ascii("record is not valid utf-8".to_string()))?;

    let schema = ascii_schema(config);
    let want: usize = schema.iter().map(|f| f.kind.ascii_len()).sum();
    let values: Vec<&str> = if text.is_empty() {
        vec![]
    } else {
        text.split(',').collect()
    };
    if values.len() != want {
        return Err(Error::Ascii(format!(
            "expected {want} fields, got {}",
            values.len()
        )));
    }

    let mut values = values.into_iter();
    let mut next = move || -> Result<f32> {
        // length checked above
        let v = values.next().expect("field count already verified");
        v.trim()
            .parse::<f32>()
            .map_err(|_| Error::Ascii(format!("unparseable field {v:?}")))
    };

    let mut sample = DecodedSample::default();
    for field in schema {
        match field.kind {
            FieldKind::Quaternion => {
                sample.orientation = Quaternion {
                    x: next()?,
                    y: next()?,
                    z: next()?,
                    w: next()?,
                };
            }
            FieldKind::MagneticField => {
                let v = Vector3 { x: next()?, y: next()?, z: next()? };
                sample.magnetic_field = field.publish.then_some(v);
            }
            FieldKind::Acceleration => {
                sample.linear_acceleration = Vector3 { x: next()?, y: next()?, z: next()? };
            }
            FieldKind::AngularRate => {
                sample.angular_rate = Vector3 { x: next()?, y: next()?, z: next()? };
            }
            // never scheduled in ascii mode
            FieldKind::TimeStartup
            | FieldKind::Temperature
            | FieldKind::Pressure
            | FieldKind::SyncInCount => {
                return Err(Error::Ascii(format!(
                    "field {:?} cannot appear in an ascii record",
                    field.kind
                )));
            }
        }
    }

    Ok(sample)
}

fn read_vec3(cur: &mut Cursor) -> Result<Vector3> {
    Ok(Vector3 {
        x: cur.read_f32()?,
        y: cur.read_f32()?,
        z: cur.read_f32()?,
    })
}

fn read_quat(cur: &mut Cursor) -> Result<Quaternion> {
    Ok(Quaternion {
        x: cur.read_f32()?,
        y: cur.read_f32()?,
        z: cur.read_f32()?,
        w: cur.read_f32()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputMode;

    fn payload(device_time_ns: u64) -> Vec<u8> {
        let mut dat = vec![];
        dat.extend_from_slice(&device_time_ns.to_le_bytes());
        for v in [0.1f32, 0.2, 0.3, 0.9] {
            dat.extend_from_slice(&v.to_le_bytes());
        }
        for v in [21.0f32, -4.5, 47.25] {
            dat.extend_from_slice(&v.to_le_bytes());
        }
        dat.extend_from_slice(&23.5f32.to_le_bytes());
        dat.extend_from_slice(&101.3f32.to_le_bytes());
        dat.extend_from_slice(&7u32.to_le_bytes());
        for v in [0.0f32, 0.0, -9.81] {
            dat.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0.01f32, -0.02, 0.03] {
            dat.extend_from_slice(&v.to_le_bytes());
        }
        dat
    }

    #[test]
    fn extracts_all_fields_in_order() {
        let config = OutputConfig::default();
        let sample = extract(&payload(123_456_789), &config).unwrap();

        assert_eq!(sample.device_time_ns, 123_456_789);
        assert_eq!(sample.orientation, Quaternion { x: 0.1, y: 0.2, z: 0.3, w: 0.9 });
        assert_eq!(sample.magnetic_field, Some(Vector3 { x: 21.0, y: -4.5, z: 47.25 }));
        assert_eq!(sample.temperature_c, Some(23.5));
        assert_eq!(sample.pressure_kpa, Some(101.3));
        assert_eq!(sample.sync_pulse_count, 7);
        assert_eq!(sample.linear_acceleration, Vector3 { x: 0.0, y: 0.0, z: -9.81 });
        assert_eq!(sample.angular_rate, Vector3 { x: 0.01, y: -0.02, z: 0.03 });
    }

    #[test]
    fn disabled_fields_are_consumed_but_not_published() {
        let config = OutputConfig::new(OutputMode::Binary, 100, false, false, false);
        let sample = extract(&payload(1), &config).unwrap();

        assert_eq!(sample.magnetic_field, None);
        assert_eq!(sample.temperature_c, None);
        assert_eq!(sample.pressure_kpa, None);
        // fields after the mag/pres bundle still line up
        assert_eq!(sample.sync_pulse_count, 7);
        assert_eq!(sample.angular_rate, Vector3 { x: 0.01, y: -0.02, z: 0.03 });
    }

    #[test]
    fn truncated_payload_is_fatal() {
        let config = OutputConfig::default();
        let dat = payload(1);
        let err = extract(&dat[..dat.len() - 1], &config).unwrap_err();
        assert!(matches!(err, Error::NotEnoughData { .. }));
    }

    #[test]
    fn ascii_record_round_trip() {
        let config = OutputConfig::new(OutputMode::Ascii, 40, true, false, false);
        let body = b"-0.017386,-0.000303,+0.001984,+0.999847,\
                     +1.0670,-0.2568,+3.0696,\
                     -0.0431,+0.0438,-9.8356,\
                     -0.001222,-0.000450,-0.001218";
        let sample = extract_ascii(body, &config).unwrap();

        assert_eq!(sample.orientation.w, 0.999847);
        assert_eq!(sample.magnetic_field, Some(Vector3 { x: 1.0670, y: -0.2568, z: 3.0696 }));
        assert_eq!(sample.linear_acceleration.z, -9.8356);
        assert_eq!(sample.angular_rate.y, -0.000450);
        // not on the ascii wire at all
        assert_eq!(sample.device_time_ns, 0);
        assert_eq!(sample.sync_pulse_count, 0);
        assert_eq!(sample.temperature_c, None);
        assert_eq!(sample.pressure_kpa, None);
    }

    #[test]
    fn ascii_mag_disabled_still_consumes_fields() {
        let config = OutputConfig::new(OutputMode::Ascii, 40, false, false, false);
        let body = b"0,0,0,1,9,9,9,0,0,-9.81,0,0,0";
        let sample = extract_ascii(body, &config).unwrap();
        assert_eq!(sample.magnetic_field, None);
        assert_eq!(sample.linear_acceleration.z, -9.81);
    }

    #[test]
    fn ascii_field_count_is_enforced() {
        let config = OutputConfig::new(OutputMode::Ascii, 40, true, false, false);
        let err = extract_ascii(b"1,2,3", &config).unwrap_err();
        assert!(matches!(err, Error::Ascii(_)));
    }

    #[test]
    fn ascii_bad_number_is_fatal() {
        let config = OutputConfig::new(OutputMode::Ascii, 40, true, false, false);
        let err = extract_ascii(b"1,2,3,4,5,6,7,8,9,10,11,12,junk", &config).unwrap_err();
        assert!(matches!(err, Error::Ascii(_)));
    }
}
