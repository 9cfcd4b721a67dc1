use huddle_core::{ConnectionId, IceCandidate, SessionDescription};
use tracing::debug;

use crate::error::NegotiationError;
use crate::link::{LinkRole, Negotiation, NegotiationState, PeerTransport, TransportState};
use crate::media::RemoteStream;

/// One peer connection to one remote participant.
pub struct PeerLink {
    remote: ConnectionId,
    role: LinkRole,
    epoch: u64,
    negotiation: Negotiation,
    transport: Box<dyn PeerTransport>,
    transport_state: TransportState,
    remote_streams: Vec<RemoteStream>,
}

impl PeerLink {
    pub(crate) fn new(
        remote: ConnectionId,
        role: LinkRole,
        epoch: u64,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        Self {
            remote,
            role,
            epoch,
            negotiation: Negotiation::new(remote),
            transport,
            transport_state: TransportState::Connecting,
            remote_streams: Vec::new(),
        }
    }

    pub fn remote(&self) -> ConnectionId {
        self.remote
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> NegotiationState {
        self.negotiation.state()
    }

    pub fn is_connected(&self) -> bool {
        self.negotiation.state() == NegotiationState::Connected
    }

    /// The media path reported itself connected.
    pub fn is_transport_up(&self) -> bool {
        self.transport_state == TransportState::Connected
    }

    pub fn pending_candidates(&self) -> usize {
        self.negotiation.pending_len()
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport_state
    }

    pub fn remote_streams(&self) -> &[RemoteStream] {
        &self.remote_streams
    }

    pub(crate) async fn create_offer(&mut self) -> Result<SessionDescription, NegotiationError> {
        self.negotiation.local_offer()?;
        self.transport
            .create_offer()
            .await
            .map_err(NegotiationError::transport)
    }

    /// Applies the offer and returns our answer.
    pub(crate) async fn apply_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        self.negotiation.remote_offer()?;
        let answer = self
            .transport
            .accept_offer(offer)
            .await
            .map_err(NegotiationError::transport)?;
        self.negotiation.local_answer()?;

        self.flush_candidates().await?;
        Ok(answer)
    }

    pub(crate) async fn apply_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.negotiation.remote_answer()?;
        self.transport
            .accept_answer(answer)
            .await
            .map_err(NegotiationError::transport)?;

        self.flush_candidates().await
    }

    pub(crate) async fn apply_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        match self.negotiation.candidate(candidate) {
            Some(candidate) => self.add_candidate(candidate).await,
            None => {
                debug!(
                    "Holding candidate for {} ({} queued)",
                    self.remote,
                    self.negotiation.pending_len()
                );
                Ok(())
            }
        }
    }

    pub(crate) fn take_pending_candidates(&mut self) -> Vec<IceCandidate> {
        self.negotiation.drain_pending()
    }

    pub(crate) fn set_transport_state(&mut self, state: TransportState) {
        self.transport_state = state;
    }

    pub(crate) fn add_remote_stream(&mut self, stream: RemoteStream) {
        self.remote_streams.push(stream);
    }

    /// Closes the connection and drops the remote stream handles.
    pub(crate) async fn close(mut self) -> Result<(), NegotiationError> {
        self.negotiation.close();
        self.remote_streams.clear();
        self.transport_state = TransportState::Closed;
        self.transport
            .close()
            .await
            .map_err(NegotiationError::transport)
    }

    async fn flush_candidates(&mut self) -> Result<(), NegotiationError> {
        let ready = self.negotiation.take_ready();
        if !ready.is_empty() {
            debug!("Flushing {} queued candidate(s) for {}", ready.len(), self.remote);
        }
        for candidate in ready {
            self.add_candidate(candidate).await?;
        }
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        self.transport
            .add_candidate(candidate)
            .await
            .map_err(NegotiationError::transport)
    }
}
