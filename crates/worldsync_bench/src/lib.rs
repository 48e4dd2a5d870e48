//! Benchmark utilities.

use worldsync_protocol::{EntitySnapshot, Position, SnapshotBatch};

/// Generate a batch of `count` snapshots spread over `id_pool` identifiers.
///
/// Positions are deterministic so runs are comparable.
pub fn generate_batch(count: usize, id_pool: usize) -> SnapshotBatch {
    let pool = id_pool.max(1);
    (0..count)
        .map(|i| {
            let f = i as f32;
            EntitySnapshot::new(
                format!("player-{}", i % pool),
                Position::new(f * 0.5, (f * 0.25).sin(), -f),
            )
        })
        .collect()
}

/// Serialize a batch to broadcast frame text.
pub fn batch_text(batch: &SnapshotBatch) -> String {
    serde_json::to_string(batch).unwrap_or_default()
}
