use huddle_core::{ConnectionId, Participant};

/// Other members of the current room, in join order.
#[derive(Debug, Default)]
pub struct Roster {
    members: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the roster with an `existing-participants` snapshot.
    pub fn reset(&mut self, members: Vec<Participant>) {
        self.members = members;
    }

    pub fn upsert(&mut self, participant: Participant) {
        match self
            .members
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => *existing = participant,
            None => self.members.push(participant),
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let index = self
            .members
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.members
            .iter()
            .find(|p| &p.connection_id == connection_id)
    }

    /// Display name, or the connection id when unknown.
    pub fn name_of(&self, connection_id: &ConnectionId) -> String {
        self.get(connection_id)
            .map(|p| p.user_name.clone())
            .unwrap_or_else(|| connection_id.to_string())
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|p| p.connection_id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}
