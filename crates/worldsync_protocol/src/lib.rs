//! # WorldSync Protocol
//!
//! Wire types and JSON codec for the WorldSync entity protocol.
//!
//! This crate provides:
//! - `Position` and `EntitySnapshot` for per-entity state
//! - `SnapshotBatch` for one inbound broadcast
//! - JSON encoding of outbound position messages
//! - JSON decoding of inbound snapshot batches
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Wire format
//!
//! Outbound (client to server), one frame per message:
//!
//! ```json
//! { "id": "p1", "content": { "x": 1.0, "y": 0.0, "z": 2.0 } }
//! ```
//!
//! Inbound (server to client):
//!
//! ```json
//! { "players": [ { "id": "p1", "content": { "x": 1.0, "y": 0.0, "z": 2.0 } } ] }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod messages;
mod snapshot;

pub use error::{DecodeError, EncodeError};
pub use messages::{decode_batch, decode_batch_str, encode_snapshot};
pub use snapshot::{EntitySnapshot, Position, SnapshotBatch};
