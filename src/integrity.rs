//! Frame integrity checks.
//!
//! Binary frames carry a CRC-16/XMODEM over every byte after the sync byte,
//! appended most-significant byte first. Ascii records carry an XOR of the
//! bytes between `$` and `*`, rendered as two uppercase hex digits.

use crc::{Crc, CRC_16_XMODEM};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC-16/XMODEM over `data`.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Verify a binary frame, sync byte included, crc included.
#[must_use]
pub fn verify_crc16(frame: &[u8]) -> bool {
    if frame.len() < 3 {
        return false;
    }
    let data_end = frame.len() - 2;
    let computed = crc16(&frame[1..data_end]);
    let stored = u16::from_be_bytes([frame[data_end], frame[data_end + 1]]);
    computed == stored
}

/// XOR-8 checksum of an ascii record body (the bytes between `$` and `*`).
#[must_use]
pub fn xor8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc ^ b)
}
