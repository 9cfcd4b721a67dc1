use crate::room::Room;
use huddle_core::{ConnectionId, Participant, RoomId};
use std::collections::HashMap;
use tracing::debug;

/// Authoritative room membership.
///
/// `joined` is the per-connection view of `rooms`: a connection appears in it
/// exactly when it is a member of the room it points to. Every operation
/// updates both maps before returning, and a room is dropped as soon as its
/// last member is removed.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    joined: HashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `participant` in `room_id` and returns the members that were
    /// already there. A connection holds at most one room, so joining a new
    /// room silently drops the previous membership.
    pub fn join(&mut self, room_id: &RoomId, participant: Participant) -> Vec<Participant> {
        let connection_id = participant.connection_id;

        if let Some(current) = self.joined.get(&connection_id).cloned() {
            if &current != room_id {
                self.leave(&current, &connection_id);
            }
        }

        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone()));

        let existing = room
            .members()
            .iter()
            .filter(|p| p.connection_id != connection_id)
            .cloned()
            .collect();

        room.upsert(participant);
        self.joined.insert(connection_id, room_id.clone());

        debug!(
            "{} joined room '{}' ({} members)",
            connection_id,
            room_id,
            room.len()
        );
        existing
    }

    /// Removes the member. Returns `None` when it was not in that room.
    pub fn leave(
        &mut self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Participant> {
        if self.joined.get(connection_id) != Some(room_id) {
            return None;
        }

        let room = self.rooms.get_mut(room_id)?;
        let removed = room.remove(connection_id);
        self.joined.remove(connection_id);

        if room.is_empty() {
            self.rooms.remove(room_id);
            debug!("Room '{}' is empty, dropping it", room_id);
        }

        removed
    }

    /// Disconnect cleanup: leaves whatever room the connection was in.
    pub fn remove_connection(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Option<(RoomId, Participant)> {
        let room_id = self.joined.get(connection_id).cloned()?;
        let participant = self.leave(&room_id, connection_id)?;
        Some((room_id, participant))
    }

    pub fn members(&self, room_id: &RoomId) -> &[Participant] {
        self.rooms.get(room_id).map(Room::members).unwrap_or(&[])
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.joined.get(connection_id)
    }

    pub fn participant(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        let room_id = self.joined.get(connection_id)?;
        self.rooms
            .get(room_id)?
            .members()
            .iter()
            .find(|p| &p.connection_id == connection_id)
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
