use huddle_core::{
    ClientSignal, ConnectionId, IceCandidate, Participant, RelaySignal, SessionDescription,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::call::{CallPhase, CallSessionController};
use crate::chat::{ChatChannel, ChatMessage};
use crate::config::ClientConfig;
use crate::link::{LinkEvent, PeerConnector};
use crate::media::{MediaDevices, RemoteStream};
use crate::relay_client::SignalSink;
use crate::roster::Roster;
use crate::supervisor::ConnectionSupervisor;

mod handle_command_impl;
mod handle_peer_event_impl;
mod handle_signal_impl;

const CALL_TICK: Duration = Duration::from_secs(1);

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    SendChat(String),
    StartCall,
    EndCall,
    AcceptCall,
    RejectCall,
    ToggleMute,
    ToggleCamera,
    Leave,
}

/// What the user should see.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Welcome {
        connection_id: ConnectionId,
    },
    /// Everyone else in the room.
    Roster(Vec<Participant>),
    Chat(ChatMessage),
    IncomingCall {
        caller_id: ConnectionId,
        caller_name: String,
    },
    CallPhase(CallPhase),
    /// Seconds since the call went active.
    CallTick(u64),
    CallRejected {
        rejector_id: ConnectionId,
        user_name: String,
    },
    RemoteStream(RemoteStream),
    Notice(String),
}

/// Negotiation input from the caller of a pending invite, kept until the
/// user answers.
#[derive(Debug)]
enum HeldSignal {
    Offer {
        from: ConnectionId,
        offer: SessionDescription,
    },
    Candidate {
        from: ConnectionId,
        candidate: IceCandidate,
    },
}

impl HeldSignal {
    fn remote(&self) -> ConnectionId {
        match self {
            Self::Offer { from, .. } | Self::Candidate { from, .. } => *from,
        }
    }
}

/// One client session: relay input, peer transport events, user commands
/// and the call ticker, all handled on a single task.
pub struct ClientEngine {
    config: ClientConfig,
    own_id: Option<ConnectionId>,
    signals: Arc<dyn SignalSink>,
    roster: Roster,
    chat: ChatChannel,
    call: CallSessionController,
    held: Vec<HeldSignal>,
    link_rx: Option<mpsc::UnboundedReceiver<LinkEvent>>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl ClientEngine {
    pub fn new(
        config: ClientConfig,
        signals: Arc<dyn SignalSink>,
        connector: Arc<dyn PeerConnector>,
        devices: Arc<dyn MediaDevices>,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();

        let supervisor = ConnectionSupervisor::new(connector, devices, signals.clone(), link_tx);
        let call = CallSessionController::new(supervisor, signals.clone(), config.constraints);

        let engine = Self {
            config,
            own_id: None,
            signals,
            roster: Roster::new(),
            chat: ChatChannel::new(),
            call,
            held: Vec::new(),
            link_rx: Some(link_rx),
            events,
        };
        (engine, events_rx)
    }

    /// Runs until `Leave`, the command channel closing, or the relay
    /// going away. Links and local media are released on the way out.
    pub async fn run(
        mut self,
        mut relay_rx: mpsc::UnboundedReceiver<RelaySignal>,
        mut commands: mpsc::UnboundedReceiver<EngineCommand>,
    ) {
        let Some(mut link_rx) = self.link_rx.take() else {
            return;
        };

        let mut ticker = tokio::time::interval(CALL_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                signal = relay_rx.recv() => match signal {
                    Some(signal) => self.handle_signal(signal).await,
                    None => {
                        self.notice("Disconnected from relay");
                        break;
                    }
                },

                Some(event) = link_rx.recv() => {
                    if self.handle_peer_event(event).await {
                        ticker.reset();
                    }
                }

                command = commands.recv() => match command {
                    Some(EngineCommand::Leave) | None => break,
                    Some(command) => self.handle_command(command).await,
                },

                _ = ticker.tick(), if self.call.phase() == CallPhase::Active => {
                    if let Some(elapsed) = self.call.tick() {
                        self.emit(EngineEvent::CallTick(elapsed));
                    }
                }
            }
        }

        self.leave().await;
    }

    async fn leave(&mut self) {
        let was_in_call = self.call.in_call();
        self.call.shutdown().await;
        self.held.clear();
        if was_in_call {
            self.emit(EngineEvent::CallPhase(CallPhase::Idle));
        }

        if self.own_id.is_some() {
            self.signals.send_signal(ClientSignal::LeaveRoom {
                room_id: self.config.room_id.clone(),
                user_name: self.config.user_name.clone(),
            });
        }
        self.roster.clear();
        info!("Left room '{}'", self.config.room_id);
    }

    fn emit(&self, event: EngineEvent) {
        if self.events.send(event).is_err() {
            debug!("No one is listening for engine events");
        }
    }

    fn notice(&self, text: impl Into<String>) {
        self.emit(EngineEvent::Notice(text.into()));
    }

    fn emit_roster(&self) {
        self.emit(EngineEvent::Roster(self.roster.members().to_vec()));
    }

    /// Whether negotiation from `from` must wait for the user to answer.
    fn must_hold(&self, from: &ConnectionId) -> bool {
        self.call
            .pending_invite()
            .is_some_and(|invite| &invite.caller_id == from)
    }
}
