//! Device-reported error classification.
//!
//! The sensor pushes `$VNERR` style error codes on a channel independent of
//! the measurement stream. [`decode`] is a pure classification table; it
//! never logs or unwinds, the caller decides what a [`Disposition::Fatal`]
//! means for the session.

/// Known VN-100 system error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SensorError {
    HardFault = 1,
    SerialBufferOverflow = 2,
    InvalidChecksum = 3,
    InvalidCommand = 4,
    NotEnoughParameters = 5,
    TooManyParameters = 6,
    InvalidParameter = 7,
    InvalidRegister = 8,
    UnauthorizedAccess = 9,
    WatchdogReset = 10,
    OutputBufferOverflow = 11,
    InsufficientBaudRate = 12,
    ErrorBufferOverflow = 255,
}

impl SensorError {
    pub fn from_code(code: u8) -> Option<SensorError> {
        Some(match code {
            1 => SensorError::HardFault,
            2 => SensorError::SerialBufferOverflow,
            3 => SensorError::InvalidChecksum,
            4 => SensorError::InvalidCommand,
            5 => SensorError::NotEnoughParameters,
            6 => SensorError::TooManyParameters,
            7 => SensorError::InvalidParameter,
            8 => SensorError::InvalidRegister,
            9 => SensorError::UnauthorizedAccess,
            10 => SensorError::WatchdogReset,
            11 => SensorError::OutputBufferOverflow,
            12 => SensorError::InsufficientBaudRate,
            255 => SensorError::ErrorBufferOverflow,
            _ => return None,
        })
    }

    fn reason(self) -> &'static str {
        match self {
            SensorError::HardFault => "hard fault, processor will force restart",
            SensorError::SerialBufferOverflow => "serial buffer overflow",
            SensorError::InvalidChecksum => "invalid checksum on command packet",
            SensorError::InvalidCommand => "invalid command",
            SensorError::NotEnoughParameters => "not enough parameters",
            SensorError::TooManyParameters => "too many parameters",
            SensorError::InvalidParameter => "invalid parameter",
            SensorError::InvalidRegister => "invalid register",
            SensorError::UnauthorizedAccess => "unauthorized access to a register",
            SensorError::WatchdogReset => {
                "watchdog reset has occurred, device should restart within 50ms"
            }
            SensorError::OutputBufferOverflow => "output buffer overflow",
            SensorError::InsufficientBaudRate => {
                "insufficient baud rate for requested async output and rate"
            }
            SensorError::ErrorBufferOverflow => "system error buffer overflow",
        }
    }
}

/// What the caller should do about a device-reported error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Code zero: nothing happened.
    Ignore,
    /// A transient the session survives; log it and continue.
    Warn(&'static str),
    /// The device or command stream is in an unrecoverable state; end the
    /// session.
    Fatal(String),
}

/// Classify a device error code.
///
/// A serial buffer overflow means a command longer than the device can ever
/// accept was issued, and an unrecognized code means we no longer understand
/// the device; both indicate programming errors rather than recoverable
/// transients, so both are fatal.
#[must_use]
pub fn decode(code: u8) -> Disposition {
    if code == 0 {
        return Disposition::Ignore;
    }
    match SensorError::from_code(code) {
        Some(SensorError::SerialBufferOverflow) => {
            Disposition::Fatal(SensorError::SerialBufferOverflow.reason().to_string())
        }
        Some(err) => Disposition::Warn(err.reason()),
        None => Disposition::Fatal(format!("unknown device error code {code}")),
    }
}
