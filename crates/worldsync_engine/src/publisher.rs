//! Outbound publisher: periodic local state broadcast.

use crate::transport::{Frame, Transport};
use crate::world::World;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use worldsync_protocol::{encode_snapshot, EntitySnapshot};

/// Counts from one publisher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublisherReport {
    /// Timer ticks observed.
    pub ticks: u64,
    /// Messages handed to the transport successfully.
    pub sent: u64,
    /// Ticks with no local entity to report.
    pub skipped: u64,
    /// Ticks whose encode or send failed.
    pub failed: u64,
}

/// Samples the local entity and sends its position at a fixed cadence.
pub struct Publisher<'a, T: ?Sized, W: ?Sized> {
    transport: &'a T,
    world: &'a W,
    local_id: &'a str,
    interval: Duration,
}

impl<'a, T, W> Publisher<'a, T, W>
where
    T: Transport + ?Sized,
    W: World + ?Sized,
{
    /// Creates a publisher for `local_id`.
    pub fn new(transport: &'a T, world: &'a W, local_id: &'a str, interval: Duration) -> Self {
        Self {
            transport,
            world,
            local_id,
            interval,
        }
    }

    /// Runs until the connection closes or `cancel` fires.
    ///
    /// Missed ticks fire in a burst so the schedule stays fixed; a slow send
    /// never coalesces ticks.
    pub async fn run(&self, cancel: CancellationToken) -> PublisherReport {
        let mut report = PublisherReport::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        debug!(interval = ?self.interval, "publisher started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if self.transport.state().is_closed() {
                break;
            }

            report.ticks += 1;
            self.tick(&mut report).await;
        }

        info!(
            ticks = report.ticks,
            sent = report.sent,
            failed = report.failed,
            "publisher stopped"
        );
        report
    }

    /// Performs a single publish attempt.
    pub async fn tick(&self, report: &mut PublisherReport) {
        let Some(position) = self.world.local_position() else {
            trace!("local entity not spawned, nothing to publish");
            report.skipped += 1;
            return;
        };

        let snapshot = EntitySnapshot::new(self.local_id, position);
        let message = match encode_snapshot(&snapshot) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "failed to encode local position");
                report.failed += 1;
                return;
            }
        };

        match self.transport.send(Frame::Text(message)).await {
            Ok(()) => {
                debug!(id = self.local_id, position = %position, "position sent");
                report.sent += 1;
            }
            Err(e) => {
                warn!(error = %e, "failed to send local position");
                report.failed += 1;
            }
        }
    }
}
