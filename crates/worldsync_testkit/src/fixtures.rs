//! Canned wire frames and batch builders.

use worldsync_protocol::{EntitySnapshot, Position, SnapshotBatch};

/// A batch carrying one player, `p1` at `(1, 0, 2)`.
pub const SINGLE_PLAYER_FRAME: &str = r#"{"players":[{"id":"p1","content":{"x":1,"y":0,"z":2}}]}"#;

/// A batch with no players.
pub const EMPTY_FRAME: &str = r#"{"players":[]}"#;

/// A batch where `p1` appears twice; the second entry wins.
pub const DUPLICATE_FRAME: &str = concat!(
    r#"{"players":["#,
    r#"{"id":"p1","content":{"x":1,"y":1,"z":1}},"#,
    r#"{"id":"p2","content":{"x":0,"y":0,"z":0}},"#,
    r#"{"id":"p1","content":{"x":2,"y":2,"z":2}}"#,
    r#"]}"#
);

/// Frames that must fail to decode.
pub const MALFORMED_FRAMES: &[&str] = &[
    "",
    "not json",
    r#"{"players":"#,
    r#"{"players":{}}"#,
    r#"{"other":[]}"#,
    r#"{"players":[{"content":{"x":1,"y":0,"z":2}}]}"#,
    r#"{"players":[{"id":"p1"}]}"#,
    r#"{"players":[{"id":"p1","content":{"x":1,"y":0}}]}"#,
    r#"{"players":[{"id":"p1","content":{"x":"1","y":0,"z":2}}]}"#,
    r#"{"players":[{"id":"","content":{"x":1,"y":0,"z":2}}]}"#,
    r#"{"players":[{"id":"p1","content":{"x":1e39,"y":0,"z":2}}]}"#,
];

/// Builds a batch from `(id, [x, y, z])` pairs.
pub fn batch(items: &[(&str, [f32; 3])]) -> SnapshotBatch {
    items
        .iter()
        .map(|(id, p)| EntitySnapshot::new(*id, Position::from(*p)))
        .collect()
}

/// Serializes a batch to the text a server would broadcast.
///
/// # Panics
///
/// Panics if the batch contains non-finite coordinates.
pub fn batch_frame(batch: &SnapshotBatch) -> String {
    assert!(
        batch.iter().all(|s| s.position.is_finite()),
        "fixture batches must be finite"
    );
    serde_json::to_string(batch).expect("Failed to serialize batch")
}
