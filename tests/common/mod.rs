use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hifitime::{Duration, Epoch};

use vn100::clock::WallClock;
use vn100::integrity::{crc16, xor8};
use vn100::sample::{Quaternion, Vector3};

pub const BASELINE_GROUPS: u8 = 0x05;
pub const BASELINE_COMMON: u16 = 0x2411;
pub const BASELINE_IMU: u16 = 0x0600;

/// All fields of one synthetic measurement, in wire order.
#[derive(Debug, Clone, Copy)]
pub struct Fields {
    pub device_time_ns: u64,
    pub orientation: Quaternion,
    pub magnetic_field: Vector3,
    pub temperature_c: f32,
    pub pressure_kpa: f32,
    pub sync_pulse_count: u32,
    pub linear_acceleration: Vector3,
    pub angular_rate: Vector3,
}

impl Fields {
    pub fn sample() -> Self {
        Fields {
            device_time_ns: 2_500_000_000,
            orientation: Quaternion { x: -0.017386, y: -0.000303, z: 0.001984, w: 0.999847 },
            magnetic_field: Vector3 { x: 1.0670, y: -0.2568, z: 3.0696 },
            temperature_c: 23.81,
            pressure_kpa: 101.325,
            sync_pulse_count: 12,
            linear_acceleration: Vector3 { x: -0.0431, y: 0.0438, z: -9.8356 },
            angular_rate: Vector3 { x: -0.001222, y: -0.000450, z: -0.001218 },
        }
    }
}

fn push_vec3(dat: &mut Vec<u8>, v: Vector3) {
    for f in [v.x, v.y, v.z] {
        dat.extend_from_slice(&f.to_le_bytes());
    }
}

/// Encode a baseline binary frame around `fields`, CRC included.
pub fn encode_binary(fields: &Fields) -> Vec<u8> {
    encode_binary_with_words(BASELINE_COMMON, BASELINE_IMU, &encode_payload(fields))
}

/// Encode just the payload bytes of a baseline frame.
pub fn encode_payload(fields: &Fields) -> Vec<u8> {
    let mut dat = vec![];
    dat.extend_from_slice(&fields.device_time_ns.to_le_bytes());
    for f in [
        fields.orientation.x,
        fields.orientation.y,
        fields.orientation.z,
        fields.orientation.w,
    ] {
        dat.extend_from_slice(&f.to_le_bytes());
    }
    push_vec3(&mut dat, fields.magnetic_field);
    dat.extend_from_slice(&fields.temperature_c.to_le_bytes());
    dat.extend_from_slice(&fields.pressure_kpa.to_le_bytes());
    dat.extend_from_slice(&fields.sync_pulse_count.to_le_bytes());
    push_vec3(&mut dat, fields.linear_acceleration);
    push_vec3(&mut dat, fields.angular_rate);
    dat
}

/// Encode a binary frame with explicit group field words, CRC included.
pub fn encode_binary_with_words(common: u16, imu: u16, payload: &[u8]) -> Vec<u8> {
    let mut dat = vec![0xfa, BASELINE_GROUPS];
    dat.extend_from_slice(&common.to_le_bytes());
    dat.extend_from_slice(&imu.to_le_bytes());
    dat.extend_from_slice(payload);
    let crc = crc16(&dat[1..]);
    dat.extend_from_slice(&crc.to_be_bytes());
    dat
}

/// Encode an ascii record with a correct XOR-8 checksum.
pub fn encode_ascii(body: &str) -> Vec<u8> {
    format!("${body}*{:02X}\r\n", xor8(body.as_bytes())).into_bytes()
}

/// Wall clock that advances one hour per read, so any read after the anchor
/// shows up as an hour-sized jump in the output. Clones share the call
/// counter, letting a test keep a handle on a clock it moved into a decoder.
#[derive(Clone)]
pub struct SteppingClock {
    base: Epoch,
    calls: Arc<AtomicU64>,
}

impl SteppingClock {
    pub fn new(base: Epoch) -> Self {
        SteppingClock { base, calls: Arc::new(AtomicU64::new(0)) }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WallClock for SteppingClock {
    fn now(&self) -> Epoch {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::from_hours(n as f64)
    }
}
