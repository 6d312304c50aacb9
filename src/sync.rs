//! Sync-out pulse bookkeeping.
//!
//! When sync output is enabled the sensor raises a hardware pulse every
//! `skip_count + 1` internal samples and reports the running count of
//! observed sync-in edges in every measurement. [`SyncInfo`] derives the
//! register values at configuration time and tracks the `(count, time)` pair
//! of the most recent pulse edge as samples are decoded.
//!
//! The pulse state is read by diagnostics and trigger-aligned consumers on
//! other threads, so the pair is kept behind a mutex and only ever updated
//! or snapshotted together; a reader cannot observe a new count with an old
//! timestamp.

use std::sync::{Mutex, PoisonError};

use hifitime::Epoch;
use serde::Serialize;
use tracing::info;

use crate::config::{fix_rate, BASE_RATE};

/// Sync-out rate substituted when the requested rate is not usable.
pub const DEFAULT_SYNC_RATE: i32 = 20;
/// Default sync-out pulse width in microseconds.
pub const DEFAULT_PULSE_WIDTH_US: u32 = 1_000;

const MAX_PULSE_WIDTH_US: u32 = 10_000;

/// A coherent copy of the pulse state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SyncSnapshot {
    /// Device-reported count of the last observed pulse edge.
    pub pulse_count: u32,
    /// Host timestamp of the sample on which that edge was first seen, or
    /// `None` before any edge has been observed.
    pub pulse_time: Option<Epoch>,
}

#[derive(Debug, Default)]
struct PulseState {
    count: u32,
    time: Option<Epoch>,
}

/// Sync-pulse configuration and edge tracking for one streaming session.
#[derive(Debug)]
pub struct SyncInfo {
    rate: i32,
    skip_count: u32,
    pulse_width_us: u32,
    state: Mutex<PulseState>,
}

impl Default for SyncInfo {
    fn default() -> Self {
        SyncInfo::disabled()
    }
}

impl SyncInfo {
    /// Derive sync register values from the desired pulse rate. A rate of
    /// zero or less disables synchronization entirely.
    pub fn new(rate: i32, pulse_width_us: u32) -> Self {
        if rate <= 0 {
            return SyncInfo {
                rate,
                skip_count: 0,
                pulse_width_us,
                state: Mutex::new(PulseState::default()),
            };
        }

        let rate = fix_rate(rate, DEFAULT_SYNC_RATE as u32);
        info!(rate, "sync out rate");

        let pulse_width_us = if pulse_width_us > MAX_PULSE_WIDTH_US {
            info!(
                requested_us = pulse_width_us,
                "sync out pulse width is over 10ms, reset to 1ms"
            );
            DEFAULT_PULSE_WIDTH_US
        } else {
            pulse_width_us
        };

        SyncInfo {
            rate: rate as i32,
            skip_count: BASE_RATE / rate - 1,
            pulse_width_us,
            state: Mutex::new(PulseState::default()),
        }
    }

    /// A `SyncInfo` with synchronization disabled; `update` is a no-op.
    pub fn disabled() -> Self {
        SyncInfo::new(0, DEFAULT_PULSE_WIDTH_US)
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.rate > 0
    }

    /// Corrected sync-out rate in Hz, or the disabled request.
    #[must_use]
    pub fn rate(&self) -> i32 {
        self.rate
    }

    /// Internal samples skipped between pulses.
    #[must_use]
    pub fn skip_count(&self) -> u32 {
        self.skip_count
    }

    #[must_use]
    pub fn pulse_width_us(&self) -> u32 {
        self.pulse_width_us
    }

    /// Record the pulse counter extracted from a decoded sample.
    ///
    /// An unchanged count leaves the stored pair untouched, so consumers can
    /// detect "no new pulse since the last sample" by an unchanged
    /// timestamp. A changed count stores count and timestamp together.
    pub fn update(&self, count: u32, time: Epoch) {
        if !self.enabled() {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.count != count {
            state.count = count;
            state.time = Some(time);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SyncSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        SyncSnapshot {
            pulse_count: state.count,
            pulse_time: state.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hifitime::Duration;

    #[test]
    fn skip_count_from_rate() {
        let sync = SyncInfo::new(200, 500);
        assert!(sync.enabled());
        assert_eq!(sync.rate(), 200);
        assert_eq!(sync.skip_count(), 3);
    }

    #[test]
    fn uneven_rate_is_corrected_first() {
        let sync = SyncInfo::new(300, 500);
        assert_eq!(sync.rate(), 200);
        assert_eq!(sync.skip_count(), 3);
    }

    #[test]
    fn pulse_width_clamp() {
        assert_eq!(SyncInfo::new(20, 15_000).pulse_width_us(), 1_000);
        assert_eq!(SyncInfo::new(20, 500).pulse_width_us(), 500);
        assert_eq!(SyncInfo::new(20, 10_000).pulse_width_us(), 10_000);
    }

    #[test]
    fn update_tracks_edges_only() {
        let sync = SyncInfo::new(DEFAULT_SYNC_RATE, DEFAULT_PULSE_WIDTH_US);
        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 3, 1);
        let t1 = t0 + Duration::from_seconds(0.01);
        let t2 = t1 + Duration::from_seconds(0.01);

        assert_eq!(sync.snapshot().pulse_time, None);

        sync.update(1, t0);
        assert_eq!(sync.snapshot(), SyncSnapshot { pulse_count: 1, pulse_time: Some(t0) });

        // same count: the pair must not move
        sync.update(1, t1);
        assert_eq!(sync.snapshot(), SyncSnapshot { pulse_count: 1, pulse_time: Some(t0) });

        sync.update(2, t2);
        assert_eq!(sync.snapshot(), SyncSnapshot { pulse_count: 2, pulse_time: Some(t2) });
    }

    #[test]
    fn disabled_sync_ignores_updates() {
        let sync = SyncInfo::disabled();
        assert!(!sync.enabled());
        sync.update(5, Epoch::from_gregorian_utc_at_midnight(2024, 3, 1));
        assert_eq!(sync.snapshot(), SyncSnapshot { pulse_count: 0, pulse_time: None });
    }
}
