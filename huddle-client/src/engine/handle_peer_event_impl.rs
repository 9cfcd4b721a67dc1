use tracing::info;

use crate::call::CallPhase;
use crate::engine::{ClientEngine, EngineEvent};
use crate::link::LinkEvent;
use crate::supervisor::LinkUpdate;

impl ClientEngine {
    /// Returns true when this event made the call active.
    pub(super) async fn handle_peer_event(&mut self, event: LinkEvent) -> bool {
        match self.call.supervisor_mut().handle_link_event(event).await {
            Some(LinkUpdate::TransportUp(remote)) => {
                info!("Media path to {} is up", self.roster.name_of(&remote));
                if self.call.refresh_phase() {
                    self.emit(EngineEvent::CallPhase(CallPhase::Active));
                    return true;
                }
            }
            Some(LinkUpdate::Lost(remote)) => {
                let name = self.roster.name_of(&remote);
                self.notice(format!("Connection to {} lost", name));
            }
            Some(LinkUpdate::RemoteStream(stream)) => self.emit(EngineEvent::RemoteStream(stream)),
            None => {}
        }
        false
    }
}
