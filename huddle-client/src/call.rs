use huddle_core::{ClientSignal, ConnectionId, RoomId};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::link::LinkRole;
use crate::media::{MediaConstraints, MediaKind};
use crate::relay_client::SignalSink;
use crate::supervisor::ConnectionSupervisor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    Starting,
    Active,
    Ended,
}

#[derive(Debug, Clone)]
pub struct CallSession {
    pub room_id: RoomId,
    pub started_at: Instant,
    /// Whole seconds since the call went active.
    pub elapsed: u64,
}

/// An `incoming-call` the user has not answered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInvite {
    pub caller_id: ConnectionId,
    pub caller_name: String,
}

/// Call lifecycle on top of a [`ConnectionSupervisor`].
///
/// `Idle -> Starting -> Active -> Ended -> Idle`. Media is held from the
/// moment a call starts (or is accepted) until it ends.
pub struct CallSessionController {
    supervisor: ConnectionSupervisor,
    signals: Arc<dyn SignalSink>,
    constraints: MediaConstraints,
    phase: CallPhase,
    session: Option<CallSession>,
    invite: Option<CallInvite>,
    muted: bool,
    camera_on: bool,
}

impl CallSessionController {
    pub fn new(
        supervisor: ConnectionSupervisor,
        signals: Arc<dyn SignalSink>,
        constraints: MediaConstraints,
    ) -> Self {
        Self {
            supervisor,
            signals,
            constraints,
            phase: CallPhase::Idle,
            session: None,
            invite: None,
            muted: false,
            camera_on: true,
        }
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&CallSession> {
        self.session.as_ref()
    }

    pub fn elapsed(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.elapsed)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_camera_on(&self) -> bool {
        self.camera_on
    }

    pub fn in_call(&self) -> bool {
        matches!(self.phase, CallPhase::Starting | CallPhase::Active)
    }

    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut ConnectionSupervisor {
        &mut self.supervisor
    }

    pub fn pending_invite(&self) -> Option<&CallInvite> {
        self.invite.as_ref()
    }

    /// Acquires media, invites the room, and offers to every member. An
    /// invite still ringing is declined first.
    pub async fn start_call(
        &mut self,
        room_id: &RoomId,
        caller_name: &str,
        members: &[ConnectionId],
    ) -> Result<(), ClientError> {
        if self.phase != CallPhase::Idle {
            return Err(ClientError::CallInProgress);
        }

        self.phase = CallPhase::Starting;
        if let Err(e) = self.supervisor.acquire_local_media(&self.constraints).await {
            warn!("Call aborted, no local media: {}", e);
            self.phase = CallPhase::Idle;
            return Err(e.into());
        }

        if let Some(invite) = self.invite.take() {
            info!("Declining call from {} to start our own", invite.caller_name);
            self.signals.send_signal(ClientSignal::RejectCall {
                caller_id: invite.caller_id,
            });
        }

        self.signals.send_signal(ClientSignal::InitiateCall {
            room_id: room_id.clone(),
            caller_name: caller_name.to_string(),
        });

        for remote in members {
            if let Err(e) = self.supervisor.create_link(*remote, LinkRole::Offerer).await {
                warn!("Could not offer to {}: {}", remote, e);
            }
        }

        self.session = Some(CallSession {
            room_id: room_id.clone(),
            started_at: Instant::now(),
            elapsed: 0,
        });
        info!("Call starting in '{}' with {} peer(s)", room_id, members.len());
        Ok(())
    }

    /// Records an invite. Returns false when busy or already ringing.
    pub fn on_incoming_call(&mut self, caller_id: ConnectionId, caller_name: String) -> bool {
        if self.phase != CallPhase::Idle || self.invite.is_some() {
            return false;
        }
        self.invite = Some(CallInvite {
            caller_id,
            caller_name,
        });
        true
    }

    /// Forgets the invite if it came from `caller_id`.
    pub fn cancel_invite_from(&mut self, caller_id: &ConnectionId) -> Option<CallInvite> {
        if self.invite.as_ref().map(|i| &i.caller_id) == Some(caller_id) {
            return self.invite.take();
        }
        None
    }

    /// Acquires media and tells the caller we are in. A media failure turns
    /// the answer into a rejection.
    pub async fn accept_call(&mut self, room_id: &RoomId) -> Result<CallInvite, ClientError> {
        if self.phase != CallPhase::Idle {
            return Err(ClientError::CallInProgress);
        }
        let invite = self.invite.take().ok_or(ClientError::NoInvite)?;

        if let Err(e) = self.supervisor.acquire_local_media(&self.constraints).await {
            warn!("Cannot answer {}: {}", invite.caller_name, e);
            self.signals.send_signal(ClientSignal::RejectCall {
                caller_id: invite.caller_id,
            });
            return Err(e.into());
        }

        self.signals.send_signal(ClientSignal::AcceptCall {
            caller_id: invite.caller_id,
        });
        self.phase = CallPhase::Starting;
        self.session = Some(CallSession {
            room_id: room_id.clone(),
            started_at: Instant::now(),
            elapsed: 0,
        });
        info!("Accepted call from {}", invite.caller_name);
        Ok(invite)
    }

    pub fn reject_call(&mut self) -> Result<CallInvite, ClientError> {
        let invite = self.invite.take().ok_or(ClientError::NoInvite)?;
        self.signals.send_signal(ClientSignal::RejectCall {
            caller_id: invite.caller_id,
        });
        info!("Rejected call from {}", invite.caller_name);
        Ok(invite)
    }

    /// Moves `Starting` to `Active` once some link's transport is connected.
    /// Returns true on that transition only.
    pub fn refresh_phase(&mut self) -> bool {
        if self.phase != CallPhase::Starting || !self.supervisor.has_connected_link() {
            return false;
        }

        self.phase = CallPhase::Active;
        if let Some(session) = self.session.as_mut() {
            session.started_at = Instant::now();
            session.elapsed = 0;
        }
        info!("Call is active");
        true
    }

    /// One second of an active call.
    pub fn tick(&mut self) -> Option<u64> {
        if self.phase != CallPhase::Active {
            return None;
        }
        let session = self.session.as_mut()?;
        session.elapsed += 1;
        Some(session.elapsed)
    }

    /// A participant left mid-call: only its link goes away.
    pub async fn participant_left(&mut self, remote: ConnectionId) -> bool {
        self.supervisor.destroy_link(remote).await
    }

    /// Tears everything down and returns to `Idle`.
    pub async fn end_call(&mut self) -> Result<(), ClientError> {
        if !self.in_call() {
            return Err(ClientError::NoCall);
        }

        self.phase = CallPhase::Ended;
        self.supervisor.destroy_all().await;
        self.session = None;
        self.muted = false;
        self.camera_on = true;
        self.phase = CallPhase::Idle;
        info!("Call ended");
        Ok(())
    }

    /// Releases media and links whatever the phase. Used when leaving.
    pub async fn shutdown(&mut self) {
        self.invite = None;
        self.supervisor.destroy_all().await;
        self.session = None;
        self.muted = false;
        self.camera_on = true;
        self.phase = CallPhase::Idle;
    }

    /// Returns the new muted flag.
    pub fn toggle_mute(&mut self) -> Result<bool, ClientError> {
        let media = self.supervisor.local_media().ok_or(ClientError::NoMedia)?;
        let muted = !self.muted;
        media.set_enabled(MediaKind::Audio, !muted);
        self.muted = muted;
        Ok(muted)
    }

    /// Returns the new camera-on flag.
    pub fn toggle_camera(&mut self) -> Result<bool, ClientError> {
        let media = self.supervisor.local_media().ok_or(ClientError::NoMedia)?;
        let camera_on = !self.camera_on;
        media.set_enabled(MediaKind::Video, camera_on);
        self.camera_on = camera_on;
        Ok(camera_on)
    }
}
