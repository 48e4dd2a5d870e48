//! # WorldSync Engine
//!
//! Client runtime that keeps a local entity registry synchronized with a
//! game-state server over one WebSocket connection.
//!
//! This crate provides:
//! - Connection state machine (connecting → open → closing → closed)
//! - WebSocket transport plus a transport trait for tests and embedders
//! - Outbound publisher (fixed-rate local position broadcast)
//! - Inbound pump (frame decode and inline reconciliation)
//! - Reconciler (create-if-absent, else update-in-place)
//! - Lifecycle controller that cancels and joins both loops together
//!
//! ## Architecture
//!
//! Two tasks share one transport and one world:
//! 1. The publisher samples the local entity and sends it every interval
//! 2. The pump receives frames in order and applies each batch to the world
//!
//! Each loop owns its own failure domain. Neither retries; both stop once
//! the connection reaches `Closed` or the client is shut down.
//!
//! ## Key Invariants
//!
//! - At most one connection per client
//! - `Closed` is absorbing: sends and receives fail fast afterwards
//! - A bad frame is skipped, never fatal to the pump
//! - Entities are created lazily and never removed

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod publisher;
mod pump;
mod reconciler;
mod state;
mod transport;
mod world;
mod ws;

pub use client::{ClientHandle, ClientReport, SyncClient};
pub use config::{ClientConfig, SelfEchoPolicy, DEFAULT_SEND_INTERVAL, DEFAULT_SERVER_URL};
pub use error::{ConnectError, ReceiveError, SendError, SyncError, SyncResult};
pub use publisher::{Publisher, PublisherReport};
pub use pump::{Pump, PumpExit, PumpReport};
pub use reconciler::{ReconcileReport, Reconciler};
pub use state::{ConnectionState, ConnectionStatus};
pub use transport::{Frame, MockTransport, Transport};
pub use world::{EntityHandle, MemoryWorld, RemoteEntity, World};
pub use ws::WsTransport;
