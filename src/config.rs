//! Negotiated output configuration.
//!
//! [`OutputConfig`] is built once during device setup and shared by value
//! with everything downstream; every later decode decision (which groups a
//! frame must declare, which fields sit where in the payload, which optional
//! fields get published) derives from it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::groups::{CommonGroup, ImuGroup, OutputGroups, WireGroups};
use crate::sample;

/// The sensor's fixed internal sampling rate in Hz. All async output rates
/// are decimations of this rate.
pub const BASE_RATE: u32 = 800;

/// Output rate substituted when the requested rate is not usable.
pub const DEFAULT_RATE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    /// Framed binary output (sync byte, group words, fixed-width fields, CRC).
    Binary,
    /// Ascii register records (`$VNQMR,...*XX`).
    Ascii,
}

/// Which measurement groups were negotiated with the device, and at what
/// output rate.
///
/// Construction corrects the requested rate to one the base rate can evenly
/// decimate and applies the text-mode field policy; the corrected values are
/// authoritative for all downstream components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    mode: OutputMode,
    rate: u32,
    enable_mag: bool,
    enable_temp: bool,
    enable_pres: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig::new(OutputMode::Binary, DEFAULT_RATE as i32, true, true, true)
    }
}

impl OutputConfig {
    pub fn new(
        mode: OutputMode,
        rate: i32,
        enable_mag: bool,
        mut enable_temp: bool,
        mut enable_pres: bool,
    ) -> Self {
        let rate = fix_rate(rate, DEFAULT_RATE);

        // Temperature and pressure only exist in the binary mag/pres bundle;
        // the ascii measurement record cannot carry them.
        if mode == OutputMode::Ascii && (enable_temp || enable_pres) {
            warn!("ascii output cannot carry pressure or temperature; disabling both");
            enable_temp = false;
            enable_pres = false;
        }

        OutputConfig {
            mode,
            rate,
            enable_mag,
            enable_temp,
            enable_pres,
        }
    }

    #[must_use]
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Corrected output rate in Hz. Always divides [`BASE_RATE`] evenly.
    #[must_use]
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// The divisor written to the async output rate register.
    #[must_use]
    pub fn rate_divisor(&self) -> u32 {
        BASE_RATE / self.rate
    }

    #[must_use]
    pub fn enable_mag(&self) -> bool {
        self.enable_mag
    }

    #[must_use]
    pub fn enable_temp(&self) -> bool {
        self.enable_temp
    }

    #[must_use]
    pub fn enable_pres(&self) -> bool {
        self.enable_pres
    }

    /// The exact group set a conforming binary frame must declare.
    ///
    /// The baseline groups are always negotiated; the optional mag/temp/pres
    /// outputs ride the common-group MAGPRES bundle, so enabling or disabling
    /// them changes publication, not the wire set.
    #[must_use]
    pub fn expected_groups(&self) -> WireGroups {
        match self.mode {
            OutputMode::Binary => WireGroups {
                common: CommonGroup::TIMESTARTUP
                    | CommonGroup::QUATERNION
                    | CommonGroup::MAGPRES
                    | CommonGroup::SYNCINCNT,
                imu: ImuGroup::ACCEL | ImuGroup::ANGULARRATE,
                extra: OutputGroups::empty(),
            },
            OutputMode::Ascii => WireGroups::default(),
        }
    }

    /// Expected length in bytes of a conforming binary frame, header and CRC
    /// included.
    #[must_use]
    pub fn binary_frame_len(&self) -> usize {
        let payload: usize = sample::wire_schema(self)
            .iter()
            .map(|f| f.kind.wire_len())
            .sum();
        // sync + group byte + two group field words + payload + crc
        1 + 1 + 2 * 2 + payload + 2
    }
}

/// Correct `requested` to the largest rate that does not exceed it and
/// evenly decimates `BASE_RATE`. Non-positive requests fall back to
/// `default`.
pub(crate) fn fix_rate(requested: i32, default: u32) -> u32 {
    let mut rate = if requested <= 0 {
        warn!(requested, default, "requested rate is not positive, using default");
        default
    } else {
        requested as u32
    };
    if rate > BASE_RATE {
        warn!(requested = rate, base = BASE_RATE, "requested rate exceeds base rate");
        return BASE_RATE;
    }
    if BASE_RATE % rate != 0 {
        let requested = rate;
        while BASE_RATE % rate != 0 {
            rate -= 1;
        }
        warn!(
            requested,
            corrected = rate,
            base = BASE_RATE,
            "requested rate cannot evenly decimate base rate"
        );
    }
    rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(800, 800; "base rate passes through")]
    #[test_case(400, 400; "even divisor passes through")]
    #[test_case(100, 100; "default rate passes through")]
    #[test_case(300, 200; "rounds down to a divisor")]
    #[test_case(250, 200; "skips non-divisor candidates")]
    #[test_case(500, 400; "large non-divisor")]
    #[test_case(7, 5; "small non-divisor")]
    #[test_case(0, 100; "zero falls back to default")]
    #[test_case(-20, 100; "negative falls back to default")]
    #[test_case(900, 800; "clamped to base rate")]
    fn rate_correction(requested: i32, expected: u32) {
        let got = fix_rate(requested, DEFAULT_RATE);
        assert_eq!(got, expected);
        assert_eq!(BASE_RATE % got, 0);
    }

    #[test]
    fn divisor_matches_corrected_rate() {
        let config = OutputConfig::new(OutputMode::Binary, 200, true, true, true);
        assert_eq!(config.rate(), 200);
        assert_eq!(config.rate_divisor(), 4);
    }

    #[test]
    fn ascii_disables_temp_and_pres() {
        let config = OutputConfig::new(OutputMode::Ascii, 40, true, true, true);
        assert!(config.enable_mag());
        assert!(!config.enable_temp());
        assert!(!config.enable_pres());
    }

    #[test]
    fn binary_keeps_temp_and_pres() {
        let config = OutputConfig::default();
        assert!(config.enable_temp());
        assert!(config.enable_pres());
    }

    #[test]
    fn baseline_frame_len() {
        // 6 header + 72 payload + 2 crc
        assert_eq!(OutputConfig::default().binary_frame_len(), 80);
    }

    #[test]
    fn expected_groups_ignore_publication_flags() {
        let all = OutputConfig::new(OutputMode::Binary, 100, true, true, true);
        let none = OutputConfig::new(OutputMode::Binary, 100, false, false, false);
        assert_eq!(all.expected_groups(), none.expected_groups());
        assert_eq!(all.expected_groups().common.bits(), 0x2411);
        assert_eq!(all.expected_groups().imu.bits(), 0x0600);
    }
}
