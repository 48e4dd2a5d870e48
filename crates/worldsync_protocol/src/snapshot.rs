//! Entity snapshots and batches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in world space.
///
/// Serialized as `{ "x": .., "y": .., "z": .. }`, the `content` object of a
/// snapshot on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Position {
    /// The origin.
    pub const ORIGIN: Position = Position::new(0.0, 0.0, 0.0);

    /// Creates a new position.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns true if every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Position {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One entity's reported position.
///
/// This is both the outbound message and the element type of an inbound
/// batch. There are no velocity, rotation, or timestamp fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity identifier.
    pub id: String,
    /// Reported position (`content` on the wire).
    #[serde(rename = "content")]
    pub position: Position,
}

impl EntitySnapshot {
    /// Creates a new snapshot.
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// The snapshots delivered in one inbound message.
///
/// Order is the order received. The same identifier may appear more than
/// once; consumers resolve duplicates last-write-wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotBatch {
    /// Snapshots in arrival order (`players` on the wire).
    #[serde(rename = "players")]
    pub snapshots: Vec<EntitySnapshot>,
}

impl SnapshotBatch {
    /// Creates a batch from snapshots.
    pub fn new(snapshots: Vec<EntitySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Returns the number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if the batch carries no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Iterates over snapshots in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntitySnapshot> {
        self.snapshots.iter()
    }
}

impl FromIterator<EntitySnapshot> for SnapshotBatch {
    fn from_iter<I: IntoIterator<Item = EntitySnapshot>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SnapshotBatch {
    type Item = &'a EntitySnapshot;
    type IntoIter = std::slice::Iter<'a, EntitySnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
