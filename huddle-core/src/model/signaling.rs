use crate::model::connection::ConnectionId;
use crate::model::participant::Participant;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Envelopes a client sends to the relay.
///
/// Wire form is `{"event": "join-room", "data": {...}}`. SDP and candidate
/// payloads stay as raw JSON so the relay forwards them untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientSignal {
    JoinRoom {
        room_id: RoomId,
        user_name: String,
        user_id: String,
    },
    LeaveRoom {
        room_id: RoomId,
        user_name: String,
    },
    SendMessage {
        room_id: RoomId,
        message: String,
        sender: String,
        timestamp: String,
    },
    SendOffer {
        offer: Value,
        to_socket: ConnectionId,
    },
    SendAnswer {
        answer: Value,
        to_socket: ConnectionId,
    },
    SendIceCandidate {
        candidate: Value,
        to_socket: ConnectionId,
    },
    InitiateCall {
        room_id: RoomId,
        caller_name: String,
    },
    AcceptCall {
        caller_id: ConnectionId,
    },
    RejectCall {
        caller_id: ConnectionId,
    },
}

/// Envelopes the relay sends to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum RelaySignal {
    Welcome {
        connection_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    ExistingParticipants(Vec<Participant>),
    UserJoined(Participant),
    UserLeft {
        connection_id: ConnectionId,
        user_name: String,
    },
    UserDisconnected {
        connection_id: ConnectionId,
        user_name: String,
    },
    ReceiveMessage {
        room_id: RoomId,
        message: String,
        sender: String,
        timestamp: String,
        connection_id: ConnectionId,
    },
    ReceiveOffer {
        offer: Value,
        from_socket: ConnectionId,
    },
    ReceiveAnswer {
        answer: Value,
        from_socket: ConnectionId,
    },
    ReceiveIceCandidate {
        candidate: Value,
        from_socket: ConnectionId,
    },
    IncomingCall {
        caller_id: ConnectionId,
        caller_name: String,
    },
    CallAccepted {
        acceptor_id: ConnectionId,
    },
    CallRejected {
        rejector_id: ConnectionId,
    },
}

impl ClientSignal {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::SendMessage { .. } => "send-message",
            Self::SendOffer { .. } => "send-offer",
            Self::SendAnswer { .. } => "send-answer",
            Self::SendIceCandidate { .. } => "send-ice-candidate",
            Self::InitiateCall { .. } => "initiate-call",
            Self::AcceptCall { .. } => "accept-call",
            Self::RejectCall { .. } => "reject-call",
        }
    }
}
