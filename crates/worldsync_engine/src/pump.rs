//! Inbound pump: continuous state reception.

use crate::error::ReceiveError;
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::transport::{Frame, Transport};
use crate::world::World;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use worldsync_protocol::decode_batch;

/// Why the pump stopped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PumpExit {
    /// The peer closed the connection and a courteous close was sent.
    PeerClosed,
    /// The transport failed.
    TransportFailure(String),
    /// The connection was closed locally.
    #[default]
    Closed,
    /// The client was shut down.
    Cancelled,
}

/// Counts from one pump run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Frames received.
    pub frames: u64,
    /// Batches decoded and applied.
    pub batches: u64,
    /// Frames that failed to decode and were skipped.
    pub decode_failures: u64,
    /// Accumulated reconciliation counts.
    pub reconciled: ReconcileReport,
    /// Why the pump stopped.
    pub exit: PumpExit,
}

/// Pulls frames, decodes them, and applies each batch inline.
pub struct Pump<'a, T: ?Sized, W: ?Sized> {
    transport: &'a T,
    world: &'a W,
    reconciler: &'a Reconciler,
}

impl<'a, T, W> Pump<'a, T, W>
where
    T: Transport + ?Sized,
    W: World + ?Sized,
{
    /// Creates a pump.
    pub fn new(transport: &'a T, world: &'a W, reconciler: &'a Reconciler) -> Self {
        Self {
            transport,
            world,
            reconciler,
        }
    }

    /// Runs until the connection ends or `cancel` fires.
    ///
    /// Frames are handled strictly in arrival order. A frame that fails to
    /// decode is logged and skipped; only transport-level outcomes end the
    /// loop.
    pub async fn run(&self, cancel: CancellationToken) -> PumpReport {
        let mut report = PumpReport::default();

        debug!("pump started");
        report.exit = loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break PumpExit::Cancelled,
                received = self.transport.receive_next() => received,
            };

            match received {
                Ok(frame) => {
                    report.frames += 1;
                    self.handle_frame(&frame, &mut report);
                }
                Err(ReceiveError::PeerClosed) => {
                    info!("connection closed by server");
                    self.transport.close_courteous().await;
                    break PumpExit::PeerClosed;
                }
                Err(ReceiveError::TransportFailure(e)) => {
                    error!(error = %e, "receive failed");
                    break PumpExit::TransportFailure(e);
                }
                Err(ReceiveError::NotConnected) => {
                    break if cancel.is_cancelled() {
                        PumpExit::Cancelled
                    } else {
                        PumpExit::Closed
                    };
                }
            }
        };

        info!(
            frames = report.frames,
            batches = report.batches,
            decode_failures = report.decode_failures,
            exit = ?report.exit,
            "pump stopped"
        );
        report
    }

    /// Decodes one frame and applies it. Returns false if it was skipped.
    pub fn handle_frame(&self, frame: &Frame, report: &mut PumpReport) -> bool {
        debug!(bytes = frame.len(), "frame received");

        match decode_batch(frame.as_bytes()) {
            Ok(batch) => {
                let applied = self.reconciler.apply(self.world, &batch);
                report.batches += 1;
                report.reconciled.merge(applied);
                true
            }
            Err(e) => {
                warn!(error = %e, "skipping undecodable frame");
                report.decode_failures += 1;
                false
            }
        }
    }
}
