//! Binary output group flags and ascii async message types.
//!
//! The VN-100 async binary frame declares its contents up front: a
//! group-enable byte followed by one 16-bit field-enable word per enabled
//! group. The field words negotiated at setup time fix the payload layout for
//! the whole session, which is why [`WireGroups`] equality is a hard
//! precondition for field extraction.

use bitflags::bitflags;

bitflags! {
    /// Group-enable byte, the first byte after the sync byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputGroups: u8 {
        const COMMON = 1 << 0;
        const TIME = 1 << 1;
        const IMU = 1 << 2;
        const GPS = 1 << 3;
        const ATTITUDE = 1 << 4;
        const INS = 1 << 5;
    }
}

bitflags! {
    /// Field-enable word for the common output group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommonGroup: u16 {
        const TIMESTARTUP = 0x0001;
        const TIMEGPS = 0x0002;
        const TIMESYNCIN = 0x0004;
        const YAWPITCHROLL = 0x0008;
        const QUATERNION = 0x0010;
        const ANGULARRATE = 0x0020;
        const POSITION = 0x0040;
        const VELOCITY = 0x0080;
        const ACCEL = 0x0100;
        const IMU = 0x0200;
        const MAGPRES = 0x0400;
        const DELTATHETA = 0x0800;
        const INSSTATUS = 0x1000;
        const SYNCINCNT = 0x2000;
        const TIMEGPSPPS = 0x4000;
    }
}

bitflags! {
    /// Field-enable word for the IMU output group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImuGroup: u16 {
        const IMUSTATUS = 0x0001;
        const UNCOMPMAG = 0x0002;
        const UNCOMPACCEL = 0x0004;
        const UNCOMPGYRO = 0x0008;
        const TEMP = 0x0010;
        const PRES = 0x0020;
        const DELTATHETA = 0x0040;
        const DELTAVEL = 0x0080;
        const MAG = 0x0100;
        const ACCEL = 0x0200;
        const ANGULARRATE = 0x0400;
        const SENSSAT = 0x0800;
    }
}

/// The complete set of groups a binary frame declares.
///
/// Groups other than common and IMU are never negotiated by this driver, so
/// their field words are not retained; their presence alone (`extra`) is
/// enough to reject the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireGroups {
    pub common: CommonGroup,
    pub imu: ImuGroup,
    pub extra: OutputGroups,
}

impl Default for WireGroups {
    fn default() -> Self {
        WireGroups {
            common: CommonGroup::empty(),
            imu: ImuGroup::empty(),
            extra: OutputGroups::empty(),
        }
    }
}

/// Ascii async message type, from the register tag of a `$VNxxx` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AsciiAsyncType {
    /// Yaw, pitch, roll.
    Vnypr,
    /// Quaternion.
    Vnqtn,
    /// Quaternion, magnetic, acceleration, angular rate.
    Vnqmr,
    /// Magnetic measurements.
    Vnmag,
    /// Acceleration measurements.
    Vnacc,
    /// Angular rate measurements.
    Vngyr,
    /// Yaw, pitch, roll, magnetic, acceleration, angular rate.
    Vnymr,
    /// Anything this driver does not stream.
    Unknown,
}

impl AsciiAsyncType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "VNYPR" => AsciiAsyncType::Vnypr,
            "VNQTN" => AsciiAsyncType::Vnqtn,
            "VNQMR" => AsciiAsyncType::Vnqmr,
            "VNMAG" => AsciiAsyncType::Vnmag,
            "VNACC" => AsciiAsyncType::Vnacc,
            "VNGYR" => AsciiAsyncType::Vngyr,
            "VNYMR" => AsciiAsyncType::Vnymr,
            _ => AsciiAsyncType::Unknown,
        }
    }
}
