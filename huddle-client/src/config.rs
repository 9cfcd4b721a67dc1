use huddle_core::{IceServerConfig, RoomId};

use crate::media::MediaConstraints;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:5000/ws";

/// Everything a client session needs before it connects.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub room_id: RoomId,
    pub user_name: String,
    pub user_id: String,
    pub constraints: MediaConstraints,
    /// Used in addition to the servers the relay announces.
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(room_id: impl Into<RoomId>, user_name: impl Into<String>) -> Self {
        let user_name = user_name.into();
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            room_id: room_id.into(),
            user_id: format!("user_{}", user_name),
            user_name,
            constraints: MediaConstraints::default(),
            ice_servers: Vec::new(),
        }
    }
}
