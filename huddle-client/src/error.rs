use crate::link::NegotiationState;
use huddle_core::ConnectionId;
use thiserror::Error;

/// Camera or microphone could not be opened. Fatal to one call attempt only.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media access denied: {0}")]
    Denied(String),
    #[error("no usable media device: {0}")]
    Unavailable(String),
}

/// Failure on a single peer link.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("cannot {action} while {state:?}")]
    InvalidState {
        state: NegotiationState,
        action: &'static str,
    },
    #[error("offer from {0} collided with our own pending offer")]
    Glare(ConnectionId),
    #[error("no link to {0}")]
    UnknownPeer(ConnectionId),
    #[error("malformed {what}: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("peer transport failed: {0}")]
    Transport(String),
}

impl NegotiationError {
    pub(crate) fn transport(err: anyhow::Error) -> Self {
        Self::Transport(format!("{:#}", err))
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    #[error("a call is already in progress")]
    CallInProgress,
    #[error("not in a call")]
    NoCall,
    #[error("no incoming call to answer")]
    NoInvite,
    #[error("local media is not held")]
    NoMedia,
    #[error("not connected to the relay yet")]
    NotConnected,
}
