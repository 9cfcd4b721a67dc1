use huddle_core::{ClientSignal, ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{MediaError, NegotiationError};
use crate::link::{
    LinkEvent, LinkRole, NegotiationState, PeerConnector, PeerEvent, PeerEventTx, PeerLink,
    TransportState,
};
use crate::media::{LocalMedia, MediaConstraints, MediaDevices, RemoteStream};
use crate::relay_client::SignalSink;

/// What a peer transport event meant for the link set.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkUpdate {
    TransportUp(ConnectionId),
    /// The link failed and has been destroyed.
    Lost(ConnectionId),
    RemoteStream(RemoteStream),
}

/// Owns the local capture and one [`PeerLink`] per remote participant.
///
/// A failing link is destroyed on its own and reported to the caller;
/// the other links keep running.
///
/// When both sides offer at once, the side with the lower connection id
/// drops its own offer and answers; the other keeps its offer.
pub struct ConnectionSupervisor {
    local_id: Option<ConnectionId>,
    connector: Arc<dyn PeerConnector>,
    devices: Arc<dyn MediaDevices>,
    signals: Arc<dyn SignalSink>,
    link_tx: mpsc::UnboundedSender<LinkEvent>,
    ice_servers: Vec<IceServerConfig>,
    links: HashMap<ConnectionId, PeerLink>,
    local_media: Option<LocalMedia>,
    next_epoch: u64,
}

impl ConnectionSupervisor {
    pub fn new(
        connector: Arc<dyn PeerConnector>,
        devices: Arc<dyn MediaDevices>,
        signals: Arc<dyn SignalSink>,
        link_tx: mpsc::UnboundedSender<LinkEvent>,
    ) -> Self {
        Self {
            local_id: None,
            connector,
            devices,
            signals,
            link_tx,
            ice_servers: Vec::new(),
            links: HashMap::new(),
            local_media: None,
            next_epoch: 0,
        }
    }

    /// Our connection id as assigned by the relay.
    pub fn set_local_id(&mut self, local_id: ConnectionId) {
        self.local_id = Some(local_id);
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn set_ice_servers(&mut self, ice_servers: Vec<IceServerConfig>) {
        self.ice_servers = ice_servers;
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    /// Opens camera/microphone, or returns the capture already held.
    pub async fn acquire_local_media(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<&LocalMedia, MediaError> {
        if self.local_media.is_none() {
            let media = self.devices.acquire(constraints).await?;
            info!("Local media acquired ({} tracks)", media.tracks().len());
            self.local_media = Some(media);
        }

        self.local_media
            .as_ref()
            .ok_or_else(|| MediaError::Unavailable("capture vanished".into()))
    }

    pub fn local_media(&self) -> Option<&LocalMedia> {
        self.local_media.as_ref()
    }

    pub fn release_local_media(&mut self) {
        if self.local_media.take().is_some() {
            info!("Local media released");
        }
    }

    /// Returns the link to `remote`, creating it if needed. A new offerer link
    /// sends its initial offer before this returns.
    pub async fn create_link(
        &mut self,
        remote: ConnectionId,
        role: LinkRole,
    ) -> Result<&PeerLink, NegotiationError> {
        if !self.links.contains_key(&remote) {
            self.open_link(remote, role).await?;

            if role == LinkRole::Offerer {
                if let Err(e) = self.send_offer(remote).await {
                    self.destroy_link(remote).await;
                    return Err(e);
                }
            }
        } else {
            debug!("Reusing link to {}", remote);
        }

        self.links
            .get(&remote)
            .ok_or(NegotiationError::UnknownPeer(remote))
    }

    pub async fn apply_remote_offer(
        &mut self,
        remote: ConnectionId,
        offer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        let colliding = self
            .links
            .get(&remote)
            .is_some_and(|link| link.state() == NegotiationState::HaveLocalOffer);
        if colliding {
            match self.local_id {
                Some(local_id) if local_id < remote => self.roll_back(remote).await?,
                Some(_) => {
                    info!("Offer collision with {}, keeping ours", remote);
                    return Ok(());
                }
                None => return self.fail_link(remote, NegotiationError::Glare(remote)).await,
            }
        }

        self.ensure_link(remote).await?;

        let result = match self.links.get_mut(&remote) {
            Some(link) => link.apply_offer(offer).await,
            None => Err(NegotiationError::UnknownPeer(remote)),
        };

        match result.and_then(|answer| {
            answer
                .to_value()
                .map_err(|source| NegotiationError::Malformed {
                    what: "answer",
                    source,
                })
        }) {
            Ok(answer) => {
                self.signals.send_signal(ClientSignal::SendAnswer {
                    answer,
                    to_socket: remote,
                });
                Ok(())
            }
            Err(e) => self.fail_link(remote, e).await,
        }
    }

    pub async fn apply_remote_answer(
        &mut self,
        remote: ConnectionId,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        let Some(link) = self.links.get_mut(&remote) else {
            return Err(NegotiationError::UnknownPeer(remote));
        };

        let result = link.apply_answer(answer).await;
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.fail_link(remote, e).await,
        }
    }

    pub async fn apply_remote_candidate(
        &mut self,
        remote: ConnectionId,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        self.ensure_link(remote).await?;

        let result = match self.links.get_mut(&remote) {
            Some(link) => link.apply_candidate(candidate).await,
            None => Err(NegotiationError::UnknownPeer(remote)),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => self.fail_link(remote, e).await,
        }
    }

    /// Closes and forgets the link. Returns false when there was none.
    pub async fn destroy_link(&mut self, remote: ConnectionId) -> bool {
        let Some(link) = self.links.remove(&remote) else {
            return false;
        };

        if let Err(e) = link.close().await {
            warn!("Closing link to {} failed: {}", remote, e);
        }
        info!("Link to {} destroyed", remote);
        true
    }

    /// Destroys every link, then releases local media.
    pub async fn destroy_all(&mut self) {
        let remotes: Vec<ConnectionId> = self.links.keys().copied().collect();
        for remote in remotes {
            self.destroy_link(remote).await;
        }
        self.release_local_media();
    }

    /// Applies a transport event. Events from links that were since
    /// destroyed or replaced are ignored.
    pub async fn handle_link_event(&mut self, event: LinkEvent) -> Option<LinkUpdate> {
        let remote = event.remote;
        let Some(link) = self.links.get_mut(&remote) else {
            debug!("Event for unknown link {} ignored", remote);
            return None;
        };
        if link.epoch() != event.epoch {
            debug!("Stale event for {} (epoch {}) ignored", remote, event.epoch);
            return None;
        }

        match event.event {
            PeerEvent::CandidateGenerated(candidate) => {
                match candidate.to_value() {
                    Ok(candidate) => self.signals.send_signal(ClientSignal::SendIceCandidate {
                        candidate,
                        to_socket: remote,
                    }),
                    Err(e) => error!("Failed to encode local candidate: {}", e),
                }
                None
            }
            PeerEvent::StateChanged(state) => {
                link.set_transport_state(state);
                match state {
                    TransportState::Connected => Some(LinkUpdate::TransportUp(remote)),
                    TransportState::Failed | TransportState::Closed => {
                        warn!("Link to {} went {:?}", remote, state);
                        self.destroy_link(remote).await;
                        Some(LinkUpdate::Lost(remote))
                    }
                    _ => None,
                }
            }
            PeerEvent::RemoteStream(stream) => {
                link.add_remote_stream(stream.clone());
                Some(LinkUpdate::RemoteStream(stream))
            }
        }
    }

    pub fn link(&self, remote: &ConnectionId) -> Option<&PeerLink> {
        self.links.get(remote)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn remotes(&self) -> Vec<ConnectionId> {
        self.links.keys().copied().collect()
    }

    /// Whether some link's media path is up.
    pub fn has_connected_link(&self) -> bool {
        self.links.values().any(PeerLink::is_transport_up)
    }

    async fn ensure_link(&mut self, remote: ConnectionId) -> Result<(), NegotiationError> {
        if self.links.contains_key(&remote) {
            return Ok(());
        }
        self.open_link(remote, LinkRole::Answerer).await
    }

    async fn open_link(
        &mut self,
        remote: ConnectionId,
        role: LinkRole,
    ) -> Result<(), NegotiationError> {
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let events = PeerEventTx::new(remote, epoch, self.link_tx.clone());

        let transport = self
            .connector
            .connect(remote, &self.ice_servers, self.local_media.as_ref(), events)
            .await
            .map_err(NegotiationError::transport)?;

        info!("Link to {} created as {:?}", remote, role);
        self.links
            .insert(remote, PeerLink::new(remote, role, epoch, transport));
        Ok(())
    }

    async fn send_offer(&mut self, remote: ConnectionId) -> Result<(), NegotiationError> {
        let link = self
            .links
            .get_mut(&remote)
            .ok_or(NegotiationError::UnknownPeer(remote))?;

        let offer = link
            .create_offer()
            .await?
            .to_value()
            .map_err(|source| NegotiationError::Malformed {
                what: "offer",
                source,
            })?;

        self.signals.send_signal(ClientSignal::SendOffer {
            offer,
            to_socket: remote,
        });
        Ok(())
    }

    /// Replaces our unanswered offer to `remote` with a fresh answerer link.
    /// Candidates that already arrived from `remote` move to the new link.
    async fn roll_back(&mut self, remote: ConnectionId) -> Result<(), NegotiationError> {
        let Some(mut stale) = self.links.remove(&remote) else {
            return Ok(());
        };
        let early = stale.take_pending_candidates();
        if let Err(e) = stale.close().await {
            warn!("Closing link to {} failed: {}", remote, e);
        }
        info!("Offer collision with {}, answering theirs", remote);

        self.open_link(remote, LinkRole::Answerer).await?;
        if let Some(link) = self.links.get_mut(&remote) {
            for candidate in early {
                link.apply_candidate(candidate).await?;
            }
        }
        Ok(())
    }

    async fn fail_link(
        &mut self,
        remote: ConnectionId,
        err: NegotiationError,
    ) -> Result<(), NegotiationError> {
        warn!("Negotiation with {} failed: {}", remote, err);
        self.destroy_link(remote).await;
        Err(err)
    }
}
