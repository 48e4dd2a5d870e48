//! Client lifecycle controller.

use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::publisher::{Publisher, PublisherReport};
use crate::pump::{Pump, PumpReport};
use crate::reconciler::Reconciler;
use crate::state::ConnectionState;
use crate::transport::Transport;
use crate::world::World;
use crate::ws::WsTransport;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

/// A connected client that has not started its loops yet.
///
/// Owns exactly one transport. [`start`](Self::start) consumes the client,
/// so a connection can never be pumped twice.
pub struct SyncClient<T, W> {
    config: ClientConfig,
    transport: Arc<T>,
    world: Arc<W>,
}

impl<W: World + 'static> SyncClient<WsTransport, W> {
    /// Validates `config` and connects over WebSocket.
    pub async fn connect(config: ClientConfig, world: Arc<W>) -> SyncResult<Self> {
        config.validate()?;
        let transport = WsTransport::connect(&config).await?;
        Ok(Self::with_transport(config, Arc::new(transport), world))
    }
}

impl<T, W> SyncClient<T, W>
where
    T: Transport + 'static,
    W: World + 'static,
{
    /// Wraps an already connected transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<T>, world: Arc<W>) -> Self {
        Self {
            config,
            transport,
            world,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Spawns the publisher and the pump on the current runtime.
    pub fn start(self) -> ClientHandle<T> {
        let cancel = CancellationToken::new();
        let span = tracing::info_span!("client", id = %self.config.local_id);

        let publisher = self.config.publish_enabled.then(|| {
            let transport = Arc::clone(&self.transport);
            let world = Arc::clone(&self.world);
            let local_id = self.config.local_id.clone();
            let interval = self.config.send_interval;
            let cancel = cancel.clone();
            tokio::spawn(
                async move {
                    Publisher::new(&*transport, &*world, &local_id, interval)
                        .run(cancel)
                        .await
                }
                .instrument(span.clone()),
            )
        });

        let pump = {
            let transport = Arc::clone(&self.transport);
            let world = Arc::clone(&self.world);
            let reconciler = Reconciler::new(self.config.local_id.clone(), self.config.self_echo);
            let cancel = cancel.clone();
            tokio::spawn(
                async move { Pump::new(&*transport, &*world, &reconciler).run(cancel).await }
                    .instrument(span),
            )
        };

        info!(
            id = %self.config.local_id,
            publish = self.config.publish_enabled,
            "client started"
        );

        ClientHandle {
            transport: self.transport,
            cancel,
            publisher,
            pump,
        }
    }
}

/// Outcome of a client run.
#[derive(Debug, Clone, Default)]
pub struct ClientReport {
    /// Publisher counts, if publishing was enabled.
    pub publisher: Option<PublisherReport>,
    /// Pump counts and exit reason.
    pub pump: PumpReport,
}

/// Controls a running client: both loops are cancelled and joined together.
pub struct ClientHandle<T> {
    transport: Arc<T>,
    cancel: CancellationToken,
    publisher: Option<JoinHandle<PublisherReport>>,
    pump: JoinHandle<PumpReport>,
}

impl<T: Transport + 'static> ClientHandle<T> {
    /// Returns the connection state.
    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Returns a token that shuts the loops down when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true once the pump has stopped.
    pub fn is_finished(&self) -> bool {
        self.pump.is_finished()
    }

    /// Aborts the connection and joins both loops.
    pub async fn shutdown(self) -> SyncResult<ClientReport> {
        info!("client shutting down");
        self.cancel.cancel();
        self.transport.close();
        self.join().await
    }

    /// Waits for the connection to end on its own, then joins both loops.
    pub async fn wait(mut self) -> SyncResult<ClientReport> {
        let pump = (&mut self.pump)
            .await
            .map_err(|e| SyncError::Task(e.to_string()))?;
        self.cancel.cancel();

        let publisher = match self.publisher.take() {
            Some(handle) => Some(handle.await.map_err(|e| SyncError::Task(e.to_string()))?),
            None => None,
        };
        Ok(ClientReport { publisher, pump })
    }

    async fn join(self) -> SyncResult<ClientReport> {
        let pump = self
            .pump
            .await
            .map_err(|e| SyncError::Task(e.to_string()))?;
        let publisher = match self.publisher {
            Some(handle) => Some(handle.await.map_err(|e| SyncError::Task(e.to_string()))?),
            None => None,
        };
        Ok(ClientReport { publisher, pump })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReceiveError;
    use crate::pump::PumpExit;
    use crate::transport::MockTransport;
    use crate::world::MemoryWorld;
    use std::time::Duration;
    use worldsync_protocol::Position;
    use worldsync_testkit::fixtures::SINGLE_PLAYER_FRAME;

    fn config() -> ClientConfig {
        ClientConfig::new("me").with_send_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn shutdown_joins_both_loops() {
        let transport = Arc::new(MockTransport::new());
        let world = Arc::new(MemoryWorld::with_local(Position::ORIGIN));

        let handle =
            SyncClient::with_transport(config(), Arc::clone(&transport), Arc::clone(&world))
                .start();
        tokio::time::sleep(Duration::from_millis(35)).await;

        let report = tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("shutdown should not hang")
            .unwrap();

        assert_eq!(report.pump.exit, PumpExit::Cancelled);
        let published = report.publisher.unwrap();
        assert!(published.sent >= 1);
        assert_eq!(transport.state(), ConnectionState::Closed);
        assert_eq!(transport.aborts(), 1);
    }

    #[tokio::test]
    async fn wait_returns_after_peer_close() {
        let transport = Arc::new(MockTransport::new());
        let world = Arc::new(MemoryWorld::new());

        transport.push_frame(SINGLE_PLAYER_FRAME);
        transport.push_error(ReceiveError::PeerClosed);

        let handle =
            SyncClient::with_transport(config(), Arc::clone(&transport), Arc::clone(&world))
                .start();
        let report = tokio::time::timeout(Duration::from_secs(1), handle.wait())
            .await
            .expect("client should stop on peer close")
            .unwrap();

        assert_eq!(report.pump.exit, PumpExit::PeerClosed);
        assert_eq!(report.pump.batches, 1);
        assert_eq!(transport.courteous_closes(), 1);
        assert_eq!(world.position_of("p1"), Some(Position::new(1.0, 0.0, 2.0)));
    }

    #[tokio::test]
    async fn publishing_can_be_disabled() {
        let transport = Arc::new(MockTransport::new());
        let world = Arc::new(MemoryWorld::with_local(Position::ORIGIN));

        let handle = SyncClient::with_transport(
            config().with_publish(false),
            Arc::clone(&transport),
            world,
        )
        .start();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let report = handle.shutdown().await.unwrap();
        assert!(report.publisher.is_none());
        assert!(transport.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn connect_validates_config() {
        let world = Arc::new(MemoryWorld::new());
        let err = SyncClient::connect(ClientConfig::default(), world)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
