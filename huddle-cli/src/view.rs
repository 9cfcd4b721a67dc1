use huddle_client::EngineEvent;

/// Tracks whether the room is joined yet. The relay answers `join-room`
/// with the first roster, not with `welcome`.
#[derive(Debug, Default)]
pub struct JoinTracker {
    joined: bool,
}

impl JoinTracker {
    /// True exactly once, on the event that confirms the join.
    pub fn observe(&mut self, event: &EngineEvent) -> bool {
        if self.joined || !matches!(event, EngineEvent::Roster(_)) {
            return false;
        }
        self.joined = true;
        true
    }
}
