//! The world collaborator.
//!
//! The scene engine that owns entity lifecycle lives outside this crate.
//! The sync client reaches it only through the [`World`] trait: lookup by
//! identifier, create, set position, and a read of the local entity's
//! position for the publisher.

use parking_lot::RwLock;
use std::collections::HashMap;
use worldsync_protocol::Position;

/// Opaque handle to an entity owned by a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(u64);

impl EntityHandle {
    /// Creates a handle from a raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Callback interface onto the local scene.
///
/// The pump writes through `create_entity` and `set_position` while the
/// publisher reads `local_position` from another task, so implementations
/// must serialize access internally.
pub trait World: Send + Sync {
    /// Finds the entity tagged with `id`.
    fn find(&self, id: &str) -> Option<EntityHandle>;

    /// Creates an entity tagged with `id` at `position`.
    ///
    /// If `id` is already taken the existing handle is returned unchanged.
    fn create_entity(&self, id: &str, position: Position) -> EntityHandle;

    /// Moves an entity. Unknown handles are ignored.
    fn set_position(&self, handle: EntityHandle, position: Position);

    /// Returns the local entity's position, or `None` if it is not spawned.
    fn local_position(&self) -> Option<Position>;
}

/// A remote entity held by [`MemoryWorld`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntity {
    /// Identifier the entity is tagged with.
    pub id: String,
    /// Current position.
    pub position: Position,
}

#[derive(Debug, Default)]
struct MemoryWorldInner {
    by_id: HashMap<String, EntityHandle>,
    entities: HashMap<EntityHandle, RemoteEntity>,
    next_handle: u64,
    local: Option<Position>,
    creations: u64,
    position_updates: u64,
}

/// An in-memory world for tests and headless clients.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    inner: RwLock<MemoryWorldInner>,
}

impl MemoryWorld {
    /// Creates an empty world with no local entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a world whose local entity is spawned at `position`.
    pub fn with_local(position: Position) -> Self {
        let world = Self::new();
        world.set_local_position(Some(position));
        world
    }

    /// Spawns, moves, or despawns (`None`) the local entity.
    pub fn set_local_position(&self, position: Option<Position>) {
        self.inner.write().local = position;
    }

    /// Returns the position of the entity tagged with `id`.
    pub fn position_of(&self, id: &str) -> Option<Position> {
        let inner = self.inner.read();
        let handle = inner.by_id.get(id)?;
        inner.entities.get(handle).map(|e| e.position)
    }

    /// Returns all remote entities sorted by identifier.
    pub fn entities(&self) -> Vec<RemoteEntity> {
        let mut entities: Vec<RemoteEntity> = self.inner.read().entities.values().cloned().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities
    }

    /// Returns the number of remote entities.
    pub fn len(&self) -> usize {
        self.inner.read().entities.len()
    }

    /// Returns true if no remote entity exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many entities have been created.
    pub fn creations(&self) -> u64 {
        self.inner.read().creations
    }

    /// Returns how many position updates have been applied.
    pub fn position_updates(&self) -> u64 {
        self.inner.read().position_updates
    }
}

impl World for MemoryWorld {
    fn find(&self, id: &str) -> Option<EntityHandle> {
        self.inner.read().by_id.get(id).copied()
    }

    fn create_entity(&self, id: &str, position: Position) -> EntityHandle {
        let mut inner = self.inner.write();
        // One entity per identifier.
        if let Some(&handle) = inner.by_id.get(id) {
            return handle;
        }
        inner.next_handle += 1;
        let handle = EntityHandle(inner.next_handle);

        inner.by_id.insert(id.to_string(), handle);
        inner.entities.insert(
            handle,
            RemoteEntity {
                id: id.to_string(),
                position,
            },
        );
        inner.creations += 1;
        handle
    }

    fn set_position(&self, handle: EntityHandle, position: Position) {
        let mut inner = self.inner.write();
        if let Some(entity) = inner.entities.get_mut(&handle) {
            entity.position = position;
            inner.position_updates += 1;
        }
    }

    fn local_position(&self) -> Option<Position> {
        self.inner.read().local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_find() {
        let world = MemoryWorld::new();
        assert!(world.find("p1").is_none());

        let handle = world.create_entity("p1", Position::new(1.0, 0.0, 2.0));
        assert_eq!(world.find("p1"), Some(handle));
        assert_eq!(world.position_of("p1"), Some(Position::new(1.0, 0.0, 2.0)));
        assert_eq!(world.creations(), 1);
    }

    #[test]
    fn handles_are_distinct() {
        let world = MemoryWorld::new();
        let a = world.create_entity("a", Position::ORIGIN);
        let b = world.create_entity("b", Position::ORIGIN);
        assert_ne!(a, b);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn create_is_idempotent_per_id() {
        let world = MemoryWorld::new();
        let first = world.create_entity("p1", Position::new(1.0, 0.0, 2.0));
        let second = world.create_entity("p1", Position::new(9.0, 9.0, 9.0));

        assert_eq!(first, second);
        assert_eq!(world.len(), 1);
        assert_eq!(world.entities().len(), 1);
        assert_eq!(world.creations(), 1);
        assert_eq!(world.position_of("p1"), Some(Position::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn set_position_moves_entity() {
        let world = MemoryWorld::new();
        let handle = world.create_entity("p1", Position::ORIGIN);

        world.set_position(handle, Position::new(5.0, 5.0, 5.0));
        assert_eq!(world.position_of("p1"), Some(Position::new(5.0, 5.0, 5.0)));
        assert_eq!(world.position_updates(), 1);
    }

    #[test]
    fn set_position_ignores_unknown_handle() {
        let world = MemoryWorld::new();
        world.set_position(EntityHandle::from_raw(99), Position::ORIGIN);
        assert_eq!(world.position_updates(), 0);
    }

    #[test]
    fn local_entity_lifecycle() {
        let world = MemoryWorld::new();
        assert_eq!(world.local_position(), None);

        world.set_local_position(Some(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(world.local_position(), Some(Position::new(1.0, 2.0, 3.0)));

        let world = MemoryWorld::with_local(Position::ORIGIN);
        assert_eq!(world.local_position(), Some(Position::ORIGIN));
    }

    #[test]
    fn entities_sorted_by_id() {
        let world = MemoryWorld::new();
        world.create_entity("zed", Position::ORIGIN);
        world.create_entity("amy", Position::ORIGIN);

        let ids: Vec<String> = world.entities().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["amy", "zed"]);
    }
}
