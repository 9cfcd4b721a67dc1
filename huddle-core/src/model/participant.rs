use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};

/// A room member as other members see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub user_name: String,
    pub user_id: String,
}

impl Participant {
    pub fn new(
        connection_id: ConnectionId,
        user_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            connection_id,
            user_name: user_name.into(),
            user_id: user_id.into(),
        }
    }
}
