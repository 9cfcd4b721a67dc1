use huddle_core::{ConnectionId, Participant, RoomId};

/// Members of one room, kept in join order.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<Participant>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|p| &p.connection_id == connection_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Re-registration of a known connection replaces its entry in place.
    pub(crate) fn upsert(&mut self, participant: Participant) {
        match self
            .members
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => *existing = participant,
            None => self.members.push(participant),
        }
    }

    pub(crate) fn remove(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let index = self
            .members
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }
}
