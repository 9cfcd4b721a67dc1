use anyhow::{Result, bail};
use async_trait::async_trait;
use huddle_client::{
    LocalMedia, PeerConnector, PeerEvent, PeerEventTx, PeerTransport, TransportState,
};
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// What one mock transport saw.
#[derive(Debug, Clone, Default)]
pub struct TransportLog {
    pub had_media: bool,
    pub offers_created: usize,
    pub remote_offer: Option<SessionDescription>,
    pub remote_answer: Option<SessionDescription>,
    pub candidates: Vec<IceCandidate>,
    pub closed: bool,
}

#[derive(Default)]
struct ConnectorState {
    opened: usize,
    live: usize,
    refuse_offers_from: HashSet<ConnectionId>,
    logs: HashMap<ConnectionId, Arc<Mutex<TransportLog>>>,
    events: HashMap<ConnectionId, PeerEventTx>,
}

/// Peer connector whose transports succeed instantly and report Connected
/// as soon as both descriptions are in place.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers from `remote` will fail to apply.
    pub fn refuse_offers_from(&self, remote: ConnectionId) {
        self.state.lock().unwrap().refuse_offers_from.insert(remote);
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    /// Transports opened and not closed yet.
    pub fn live(&self) -> usize {
        self.state.lock().unwrap().live
    }

    /// Log of the latest transport opened towards `remote`.
    pub fn log(&self, remote: &ConnectionId) -> Option<TransportLog> {
        let state = self.state.lock().unwrap();
        state.logs.get(remote).map(|log| log.lock().unwrap().clone())
    }

    /// Event sender of the latest transport opened towards `remote`.
    pub fn events(&self, remote: &ConnectionId) -> Option<PeerEventTx> {
        self.state.lock().unwrap().events.get(remote).cloned()
    }
}

#[async_trait]
impl PeerConnector for MockConnector {
    async fn connect(
        &self,
        remote: ConnectionId,
        _ice_servers: &[IceServerConfig],
        media: Option<&LocalMedia>,
        events: PeerEventTx,
    ) -> Result<Box<dyn PeerTransport>> {
        let log = Arc::new(Mutex::new(TransportLog {
            had_media: media.is_some(),
            ..Default::default()
        }));

        let refuse_offers = {
            let mut state = self.state.lock().unwrap();
            state.opened += 1;
            state.live += 1;
            state.logs.insert(remote, log.clone());
            state.events.insert(remote, events.clone());
            state.refuse_offers_from.contains(&remote)
        };

        Ok(Box::new(MockTransport {
            remote,
            log,
            events,
            refuse_offers,
            connector: self.state.clone(),
        }))
    }
}

struct MockTransport {
    remote: ConnectionId,
    log: Arc<Mutex<TransportLog>>,
    events: PeerEventTx,
    refuse_offers: bool,
    connector: Arc<Mutex<ConnectorState>>,
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        self.log.lock().unwrap().offers_created += 1;
        Ok(SessionDescription::offer(format!("mock-offer-to-{}", self.remote)))
    }

    async fn accept_offer(&self, offer: SessionDescription) -> Result<SessionDescription> {
        if self.refuse_offers {
            bail!("mock transport refuses offers from {}", self.remote);
        }
        self.log.lock().unwrap().remote_offer = Some(offer);
        self.events
            .send(PeerEvent::StateChanged(TransportState::Connected));
        Ok(SessionDescription::answer(format!("mock-answer-to-{}", self.remote)))
    }

    async fn accept_answer(&self, answer: SessionDescription) -> Result<()> {
        self.log.lock().unwrap().remote_answer = Some(answer);
        self.events
            .send(PeerEvent::StateChanged(TransportState::Connected));
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.log.lock().unwrap().candidates.push(candidate);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if !log.closed {
            log.closed = true;
            self.connector.lock().unwrap().live -= 1;
        }
        Ok(())
    }
}
