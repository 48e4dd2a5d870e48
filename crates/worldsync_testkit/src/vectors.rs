//! Wire test vectors for the snapshot protocol.
//!
//! Shared with server implementations so both ends agree on what decodes.

use serde::{Deserialize, Serialize};
use worldsync_protocol::{EntitySnapshot, Position};

/// A decode test vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Inbound frame text.
    pub input: String,
    /// Snapshots the frame decodes to, in order.
    pub expected: Vec<EntitySnapshot>,
    /// Set when the frame must be rejected.
    pub expected_error: Option<String>,
}

impl WireVector {
    fn ok(id: &str, description: &str, input: &str, expected: Vec<EntitySnapshot>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: input.into(),
            expected,
            expected_error: None,
        }
    }

    fn err(id: &str, description: &str, input: &str, error: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: input.into(),
            expected: Vec::new(),
            expected_error: Some(error.into()),
        }
    }
}

fn snap(id: &str, x: f32, y: f32, z: f32) -> EntitySnapshot {
    EntitySnapshot::new(id, Position::new(x, y, z))
}

/// Inbound batch vectors.
pub fn batch_vectors() -> Vec<WireVector> {
    vec![
        WireVector::ok(
            "batch_single",
            "One player",
            r#"{"players":[{"id":"p1","content":{"x":1,"y":0,"z":2}}]}"#,
            vec![snap("p1", 1.0, 0.0, 2.0)],
        ),
        WireVector::ok("batch_empty", "No players", r#"{"players":[]}"#, vec![]),
        WireVector::ok(
            "batch_fractional",
            "Fractional and negative coordinates",
            r#"{"players":[{"id":"a","content":{"x":-0.5,"y":12.25,"z":-3}}]}"#,
            vec![snap("a", -0.5, 12.25, -3.0)],
        ),
        WireVector::ok(
            "batch_duplicate",
            "Duplicate identifiers keep arrival order",
            r#"{"players":[{"id":"p1","content":{"x":1,"y":1,"z":1}},{"id":"p1","content":{"x":2,"y":2,"z":2}}]}"#,
            vec![snap("p1", 1.0, 1.0, 1.0), snap("p1", 2.0, 2.0, 2.0)],
        ),
        WireVector::ok(
            "batch_unknown_fields",
            "Unknown fields are ignored",
            r#"{"tick":7,"players":[{"id":"p1","name":"x","content":{"x":1,"y":0,"z":2,"w":9}}]}"#,
            vec![snap("p1", 1.0, 0.0, 2.0)],
        ),
        WireVector::err("batch_truncated", "Truncated JSON", r#"{"players":"#, "malformed"),
        WireVector::err("batch_no_players", "Missing players array", r#"{}"#, "malformed"),
        WireVector::err(
            "batch_missing_axis",
            "Position without z",
            r#"{"players":[{"id":"p1","content":{"x":1,"y":0}}]}"#,
            "malformed",
        ),
        WireVector::err(
            "batch_empty_id",
            "Empty identifier",
            r#"{"players":[{"id":"","content":{"x":1,"y":0,"z":2}}]}"#,
            "empty_id",
        ),
        WireVector::err(
            "batch_out_of_range",
            "Coordinate beyond f32 range",
            r#"{"players":[{"id":"p1","content":{"x":1e39,"y":0,"z":2}}]}"#,
            "non_finite",
        ),
    ]
}

/// Outbound position vectors: `input` is unused, `expected[0]` is encoded.
pub fn position_vectors() -> Vec<WireVector> {
    vec![
        WireVector::ok(
            "position_origin",
            "Local entity at origin",
            r#"{"id":"me","content":{"x":0.0,"y":0.0,"z":0.0}}"#,
            vec![snap("me", 0.0, 0.0, 0.0)],
        ),
        WireVector::ok(
            "position_fractional",
            "Local entity at a fractional position",
            r#"{"id":"me","content":{"x":1.5,"y":-2.0,"z":0.25}}"#,
            vec![snap("me", 1.5, -2.0, 0.25)],
        ),
    ]
}

/// Exports all vectors as JSON.
pub fn all_vectors_json() -> String {
    #[derive(Serialize)]
    struct AllVectors {
        batch: Vec<WireVector>,
        position: Vec<WireVector>,
    }

    let all = AllVectors {
        batch: batch_vectors(),
        position: position_vectors(),
    };

    serde_json::to_string_pretty(&all).expect("Failed to serialize vectors")
}
