//! Maps inbound snapshot batches onto local entity identity.

use crate::config::SelfEchoPolicy;
use crate::world::World;
use tracing::trace;
use worldsync_protocol::SnapshotBatch;

/// Counts from applying one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entities created for unseen identifiers.
    pub created: u64,
    /// Position updates applied to known entities.
    pub updated: u64,
    /// Snapshots dropped because they carried the local identifier.
    pub skipped_self: u64,
}

impl ReconcileReport {
    /// Adds another report's counts to this one.
    pub fn merge(&mut self, other: ReconcileReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped_self += other.skipped_self;
    }
}

/// Applies snapshot batches to a [`World`].
///
/// For each snapshot in arrival order: unseen identifiers get a new entity
/// at the snapshot's position, known identifiers are teleported to it.
/// Entities are never removed. Duplicates within a batch therefore resolve
/// last-write-wins, and applying the same batch twice leaves the world as
/// applying it once.
#[derive(Debug, Clone)]
pub struct Reconciler {
    local_id: String,
    self_echo: SelfEchoPolicy,
}

impl Reconciler {
    /// Creates a reconciler for the given local identity.
    pub fn new(local_id: impl Into<String>, self_echo: SelfEchoPolicy) -> Self {
        Self {
            local_id: local_id.into(),
            self_echo,
        }
    }

    /// Returns the local identity.
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Returns the self-echo policy.
    pub fn self_echo(&self) -> SelfEchoPolicy {
        self.self_echo
    }

    /// Applies one batch.
    pub fn apply<W: World + ?Sized>(&self, world: &W, batch: &SnapshotBatch) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for snapshot in batch {
            if self.self_echo == SelfEchoPolicy::Ignore && snapshot.id == self.local_id {
                report.skipped_self += 1;
                continue;
            }

            match world.find(&snapshot.id) {
                Some(handle) => {
                    world.set_position(handle, snapshot.position);
                    report.updated += 1;
                }
                None => {
                    world.create_entity(&snapshot.id, snapshot.position);
                    trace!(id = %snapshot.id, position = %snapshot.position, "entity created");
                    report.created += 1;
                }
            }
        }

        report
    }
}
