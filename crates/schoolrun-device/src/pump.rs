//! The fix pump — one task per tracking driver device.
//!
//! Per-tick failures are isolated: a failed sample or submission never stops
//! the next scheduled tick. The only fatal condition is the user revoking
//! location access.

use std::time::Duration;

use anyhow::Result;
use tokio::{sync::watch, time::MissedTickBehavior};
use uuid::Uuid;

use crate::source::{LocationSource, SourceError};

/// Where accepted samples go. Implemented by [`crate::IngestClient`] for the
/// real endpoint and by in-memory collectors in tests.
pub trait FixSink: Send + Sync {
  async fn submit(&self, driver_id: Uuid, sample: &crate::source::Sample) -> Result<()>;
}

/// Counters reported when a pump run ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
  pub submitted: u64,
  /// Submissions the server rejected or that failed in transit. The next
  /// tick is the retry; the pump never buffers.
  pub failed:    u64,
  /// Ticks skipped because the source had no sample.
  pub skipped:   u64,
}

pub struct FixPump {
  driver_id: Uuid,
  interval:  Duration,
}

impl FixPump {
  pub fn new(driver_id: Uuid, interval: Duration) -> Self {
    Self { driver_id, interval }
  }

  /// Sample and submit on every tick until `stop` flips to `true` (or its
  /// sender is dropped), starting with an immediate first tick.
  ///
  /// Returns the accumulated stats on a clean stop, or
  /// [`SourceError::PermissionDenied`] when location access is revoked —
  /// which must reach the user, not be retried forever.
  pub async fn run<C, L>(
    &self,
    sink: &C,
    source: &mut L,
    mut stop: watch::Receiver<bool>,
  ) -> Result<PumpStats, SourceError>
  where
    C: FixSink,
    L: LocationSource,
  {
    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = PumpStats::default();

    loop {
      tokio::select! {
        _ = ticker.tick() => {}
        changed = stop.changed() => {
          if changed.is_err() || *stop.borrow() {
            tracing::info!(driver = %self.driver_id, ?stats, "tracking stopped");
            return Ok(stats);
          }
          continue;
        }
      }

      let sample = match source.sample().await {
        Ok(sample) => sample,
        Err(SourceError::PermissionDenied) => {
          tracing::error!(driver = %self.driver_id, "location permission revoked; stopping pump");
          return Err(SourceError::PermissionDenied);
        }
        Err(error) => {
          tracing::warn!(driver = %self.driver_id, %error, "no sample this tick");
          stats.skipped += 1;
          continue;
        }
      };

      match sink.submit(self.driver_id, &sample).await {
        Ok(()) => stats.submitted += 1,
        Err(error) => {
          tracing::warn!(driver = %self.driver_id, %error, "fix submission failed");
          stats.failed += 1;
        }
      }
    }
  }
}
