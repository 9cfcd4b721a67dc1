use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

use crate::media::{LocalMedia, RemoteStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Something the underlying peer connection reported.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    CandidateGenerated(IceCandidate),
    StateChanged(TransportState),
    RemoteStream(RemoteStream),
}

/// A [`PeerEvent`] tagged with the link generation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEvent {
    pub remote: ConnectionId,
    pub epoch: u64,
    pub event: PeerEvent,
}

/// Sender handed to a transport for its callbacks.
#[derive(Debug, Clone)]
pub struct PeerEventTx {
    remote: ConnectionId,
    epoch: u64,
    tx: mpsc::UnboundedSender<LinkEvent>,
}

impl PeerEventTx {
    pub fn new(remote: ConnectionId, epoch: u64, tx: mpsc::UnboundedSender<LinkEvent>) -> Self {
        Self { remote, epoch, tx }
    }

    pub fn remote(&self) -> ConnectionId {
        self.remote
    }

    /// False once the owning engine is gone.
    pub fn send(&self, event: PeerEvent) -> bool {
        self.tx
            .send(LinkEvent {
                remote: self.remote,
                epoch: self.epoch,
                event,
            })
            .is_ok()
    }
}

/// Opens peer connections.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        remote: ConnectionId,
        ice_servers: &[IceServerConfig],
        media: Option<&LocalMedia>,
        events: PeerEventTx,
    ) -> Result<Box<dyn PeerTransport>>;
}

/// One live peer connection.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Creates an offer and installs it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Applies a remote offer and returns the installed answer.
    async fn accept_offer(&self, offer: SessionDescription) -> Result<SessionDescription>;

    async fn accept_answer(&self, answer: SessionDescription) -> Result<()>;

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
