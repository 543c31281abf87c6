//! Room directory: the process-wide registry of rooms.

use std::collections::HashMap;

use gambit_protocol::RoomId;

use crate::Room;

/// Maps room identifiers to rooms, creating them lazily on first
/// reference.
///
/// There is no removal operation: rooms persist empty for the process
/// lifetime. That is a documented limitation, not an oversight — see the
/// decision log in DESIGN.md.
#[derive(Debug, Default)]
pub struct RoomDirectory<B> {
    rooms: HashMap<RoomId, Room<B>>,
}

impl<B> RoomDirectory<B> {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Returns the room for `id`, creating it with a board from `init`
    /// if this is the first reference. Never fails.
    pub fn get_or_create(
        &mut self,
        id: &RoomId,
        init: impl FnOnce() -> B,
    ) -> &mut Room<B> {
        self.rooms.entry(id.clone()).or_insert_with(|| {
            tracing::info!(room = %id, "room created");
            Room::new(init())
        })
    }

    /// Returns the room for `id` if it exists. Move/reset/leave intents
    /// referencing an unknown room are no-ops, so they go through here
    /// rather than `get_or_create`.
    pub fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room<B>> {
        self.rooms.get_mut(id)
    }

    /// Iterates over every room. The disconnect sweep uses this because
    /// the transport layer does not track which rooms a connection
    /// joined.
    pub fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (&RoomId, &mut Room<B>)> {
        self.rooms.iter_mut()
    }

    /// Returns the number of rooms ever created.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no room has been created yet.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
