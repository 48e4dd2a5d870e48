//! Property-based test generators using proptest.
//!
//! Coordinates are drawn from quarter steps so they survive a JSON round
//! trip without rounding.

use proptest::prelude::*;
use worldsync_protocol::{EntitySnapshot, Position, SnapshotBatch};

/// Strategy for a finite coordinate in `[-1024, 1024]`, in quarter steps.
pub fn coordinate_strategy() -> impl Strategy<Value = f32> {
    (-4096i32..=4096).prop_map(|q| q as f32 / 4.0)
}

/// Strategy for a finite position.
pub fn position_strategy() -> impl Strategy<Value = Position> {
    (
        coordinate_strategy(),
        coordinate_strategy(),
        coordinate_strategy(),
    )
        .prop_map(|(x, y, z)| Position::new(x, y, z))
}

/// Strategy for a remote identifier drawn from `p0..p{pool}`.
///
/// A small pool makes repeated identifiers likely. Never yields `"me"`.
pub fn entity_id_strategy(pool: usize) -> impl Strategy<Value = String> {
    (0..pool.max(1)).prop_map(|i| format!("p{i}"))
}

/// Strategy for a single remote snapshot.
pub fn snapshot_strategy(pool: usize) -> impl Strategy<Value = EntitySnapshot> {
    (entity_id_strategy(pool), position_strategy())
        .prop_map(|(id, position)| EntitySnapshot::new(id, position))
}

/// Strategy for a batch of up to `max_len` snapshots over `pool` identifiers.
pub fn snapshot_batch_strategy(pool: usize, max_len: usize) -> impl Strategy<Value = SnapshotBatch> {
    prop::collection::vec(snapshot_strategy(pool), 0..=max_len).prop_map(SnapshotBatch::new)
}

/// Strategy for the wire text of a batch.
pub fn batch_text_strategy(pool: usize, max_len: usize) -> impl Strategy<Value = String> {
    snapshot_batch_strategy(pool, max_len).prop_map(|batch| crate::fixtures::batch_frame(&batch))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
