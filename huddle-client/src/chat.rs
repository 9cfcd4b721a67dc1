use chrono::{DateTime, Local};
use huddle_core::{ConnectionId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Local, strictly increasing.
    pub id: u64,
    pub room_id: RoomId,
    pub sender: String,
    pub body: String,
    /// As supplied by the sender.
    pub timestamp: String,
    pub received_at: DateTime<Local>,
    pub connection_id: ConnectionId,
    /// Our own message, echoed back by the relay.
    pub own: bool,
}

/// Chat log in relay-arrival order. Only [`ChatChannel::clear`] removes
/// entries.
#[derive(Debug, Default)]
pub struct ChatChannel {
    messages: Vec<ChatMessage>,
    next_id: u64,
    own_id: Option<ConnectionId>,
}

impl ChatChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_own_id(&mut self, connection_id: ConnectionId) {
        self.own_id = Some(connection_id);
    }

    pub fn record(
        &mut self,
        room_id: RoomId,
        sender: String,
        body: String,
        timestamp: String,
        connection_id: ConnectionId,
    ) -> &ChatMessage {
        self.next_id += 1;
        let own = self.own_id == Some(connection_id);

        self.messages.push(ChatMessage {
            id: self.next_id,
            room_id,
            sender,
            body,
            timestamp,
            received_at: Local::now(),
            connection_id,
            own,
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Sender-side timestamp in the same short form browsers show.
pub fn chat_timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}
