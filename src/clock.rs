//! Device-to-host clock reconciliation.
//!
//! The sensor stamps every binary sample with nanoseconds since its own
//! power-up, a timebase far steadier over short spans than repeated host
//! wall-clock reads. The reconciler reads the wall clock exactly once, to
//! anchor the first sample, and from then on advances the emitted timestamp
//! by the device-clock delta alone. Output timestamps are therefore
//! monotonic and jitter-free, at the cost of accumulating any device
//! clock-rate error linearly over the session.

use hifitime::{Duration, Epoch};
use tracing::warn;

/// Source of host wall-clock readings.
///
/// The decode engine only ever calls this to place an anchor; production use
/// is [`SystemClock`], tests substitute a scripted clock.
pub trait WallClock: Send + Sync {
    fn now(&self) -> Epoch;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> Epoch {
        Epoch::now().expect("system wall clock unavailable")
    }
}

#[derive(Debug, Clone, Copy)]
struct LastStamp {
    host: Epoch,
    device_ns: u64,
}

/// Converts device elapsed time into a continuous host-clock timestamp
/// stream. One per streaming session; never reset while the session lives.
#[derive(Debug, Default)]
pub struct ClockReconciler {
    last: Option<LastStamp>,
    regressions: u64,
}

impl ClockReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the host timestamp for a sample stamped `device_ns` by the
    /// sensor.
    ///
    /// The first call anchors against `clock`. A device time running
    /// backwards (device reset, or a wrapped counter) re-anchors the same
    /// way rather than emitting a negative step; the event is logged and
    /// counted but the sample is still stamped.
    pub fn reconcile(&mut self, device_ns: u64, clock: &dyn WallClock) -> Epoch {
        let host = match self.last {
            Some(last) if device_ns >= last.device_ns => {
                last.host + Duration::from_total_nanoseconds(i128::from(device_ns - last.device_ns))
            }
            Some(last) => {
                warn!(
                    previous_ns = last.device_ns,
                    current_ns = device_ns,
                    "device clock moved backwards, re-anchoring to wall clock"
                );
                self.regressions += 1;
                clock.now()
            }
            None => clock.now(),
        };
        self.last = Some(LastStamp { host, device_ns });
        host
    }

    /// Number of device clock regressions observed this session.
    #[must_use]
    pub fn regressions(&self) -> u64 {
        self.regressions
    }
}
