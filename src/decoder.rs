//! The packet decode pipeline.
//!
//! One [`Decoder`] per streaming session, driven synchronously from the
//! transport's packet callback: validate the frame against the negotiated
//! configuration, extract the ordered field sequence, assign the host
//! timestamp, update the sync-pulse state. Nothing here blocks or performs
//! I/O; a rejected packet is an error to drop, never a reason to end the
//! session.
//!
//! The decoder itself requires `&mut` per packet. A transport that invokes
//! its data callback from more than one thread must serialize calls to
//! [`Decoder::decode`]; the shared [`SyncInfo`] handle is safe to read from
//! anywhere.

use std::sync::Arc;

use hifitime::Epoch;
use serde::Serialize;
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::clock::{ClockReconciler, SystemClock, WallClock};
use crate::config::{OutputConfig, OutputMode};
use crate::packet::RawPacket;
use crate::sample::{self, DecodedSample};
use crate::sync::SyncInfo;
use crate::Result;

/// A decoded sample together with its reconciled host timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StampedSample {
    pub host_time: Epoch,
    pub sample: DecodedSample,
}

/// Decodes validated measurement packets into [`StampedSample`]s.
///
/// # Examples
/// ```no_run
/// use vn100::config::OutputConfig;
/// use vn100::decoder::Decoder;
/// use vn100::packet::RawPacket;
///
/// let mut decoder = Decoder::builder().config(OutputConfig::default()).build();
/// let frame: &[u8] = &[];
/// let stamped = decoder.decode(&RawPacket::decode(frame)?)?;
/// # Ok::<(), vn100::Error>(())
/// ```
#[derive(TypedBuilder)]
pub struct Decoder {
    config: OutputConfig,
    /// Wall-clock source used to anchor the timestamp stream.
    #[builder(default = Box::new(SystemClock))]
    clock: Box<dyn WallClock>,
    /// Shared pulse bookkeeping; defaults to sync disabled.
    #[builder(default)]
    sync: Arc<SyncInfo>,
    #[builder(default, setter(skip))]
    reconciler: ClockReconciler,
}

impl Decoder {
    /// Run one packet through the full pipeline.
    ///
    /// Every published sample has passed group/type/checksum validation and
    /// complete field extraction; there is no partial success.
    ///
    /// # Errors
    /// Any decode-time [`crate::Error`]. All of them mean "drop this packet
    /// and await the next one"; none of them end the session.
    pub fn decode(&mut self, packet: &RawPacket) -> Result<StampedSample> {
        if let Err(err) = packet.validate(&self.config) {
            warn!(%err, "rejected packet");
            return Err(err);
        }

        let zult = match self.config.mode() {
            OutputMode::Binary => sample::extract(packet.payload(), &self.config),
            OutputMode::Ascii => sample::extract_ascii(packet.payload(), &self.config),
        };
        let sample = match zult {
            Ok(sample) => sample,
            Err(err) => {
                warn!(%err, "dropping undecodable packet");
                return Err(err);
            }
        };

        let host_time = match self.config.mode() {
            OutputMode::Binary => self
                .reconciler
                .reconcile(sample.device_time_ns, self.clock.as_ref()),
            // ascii records carry no device time to reconcile against
            OutputMode::Ascii => self.clock.now(),
        };

        if self.config.mode() == OutputMode::Binary {
            self.sync.update(sample.sync_pulse_count, host_time);
        }

        Ok(StampedSample { host_time, sample })
    }

    #[must_use]
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Handle to the shared sync-pulse state.
    #[must_use]
    pub fn sync(&self) -> Arc<SyncInfo> {
        Arc::clone(&self.sync)
    }

    /// Device clock regressions observed this session.
    #[must_use]
    pub fn clock_regressions(&self) -> u64 {
        self.reconciler.regressions()
    }
}
