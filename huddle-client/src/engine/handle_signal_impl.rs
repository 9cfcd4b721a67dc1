use huddle_core::{ClientSignal, ConnectionId, IceCandidate, RelaySignal, SessionDescription};
use tracing::{debug, info, warn};

use crate::engine::{ClientEngine, EngineEvent, HeldSignal};
use crate::error::NegotiationError;

impl ClientEngine {
    pub(super) async fn handle_signal(&mut self, signal: RelaySignal) {
        match signal {
            RelaySignal::Welcome {
                connection_id,
                ice_servers,
            } => {
                info!(
                    "Connected as {} ({} ICE servers)",
                    connection_id,
                    ice_servers.len()
                );
                self.own_id = Some(connection_id);
                self.chat.set_own_id(connection_id);
                self.call.supervisor_mut().set_local_id(connection_id);

                let mut servers = ice_servers;
                servers.extend(self.config.ice_servers.iter().cloned());
                self.call.supervisor_mut().set_ice_servers(servers);

                self.emit(EngineEvent::Welcome { connection_id });
                self.signals.send_signal(ClientSignal::JoinRoom {
                    room_id: self.config.room_id.clone(),
                    user_name: self.config.user_name.clone(),
                    user_id: self.config.user_id.clone(),
                });
            }

            RelaySignal::ExistingParticipants(members) => {
                info!("Joined '{}' with {} other(s)", self.config.room_id, members.len());
                self.roster.reset(members);
                self.emit_roster();
            }

            RelaySignal::UserJoined(participant) => {
                info!("{} joined", participant.user_name);
                self.roster.upsert(participant);
                self.emit_roster();
            }

            RelaySignal::UserLeft {
                connection_id,
                user_name,
            }
            | RelaySignal::UserDisconnected {
                connection_id,
                user_name,
            } => self.on_member_gone(connection_id, user_name).await,

            RelaySignal::ReceiveMessage {
                room_id,
                message,
                sender,
                timestamp,
                connection_id,
            } => {
                if room_id != self.config.room_id {
                    debug!("Chat for room '{}' ignored", room_id);
                    return;
                }
                let entry = self
                    .chat
                    .record(room_id, sender, message, timestamp, connection_id)
                    .clone();
                self.emit(EngineEvent::Chat(entry));
            }

            RelaySignal::ReceiveOffer { offer, from_socket } => {
                match SessionDescription::from_value(offer) {
                    Ok(offer) => self.on_remote_offer(from_socket, offer).await,
                    Err(e) => warn!("Malformed offer from {}: {}", from_socket, e),
                }
            }

            RelaySignal::ReceiveAnswer {
                answer,
                from_socket,
            } => match SessionDescription::from_value(answer) {
                Ok(answer) => {
                    let result = self
                        .call
                        .supervisor_mut()
                        .apply_remote_answer(from_socket, answer)
                        .await;
                    if let Err(e) = result {
                        self.report_link_error(from_socket, e);
                    }
                }
                Err(e) => warn!("Malformed answer from {}: {}", from_socket, e),
            },

            RelaySignal::ReceiveIceCandidate {
                candidate,
                from_socket,
            } => {
                if candidate.is_null() {
                    debug!("End of candidates from {}", from_socket);
                    return;
                }
                match IceCandidate::from_value(candidate) {
                    Ok(candidate) => self.on_remote_candidate(from_socket, candidate).await,
                    Err(e) => warn!("Malformed candidate from {}: {}", from_socket, e),
                }
            }

            RelaySignal::IncomingCall {
                caller_id,
                caller_name,
            } => {
                if self.call.on_incoming_call(caller_id, caller_name.clone()) {
                    info!("{} is calling", caller_name);
                    self.emit(EngineEvent::IncomingCall {
                        caller_id,
                        caller_name,
                    });
                } else {
                    debug!("Busy, call from {} ignored", caller_name);
                }
            }

            RelaySignal::CallAccepted { acceptor_id } => {
                let name = self.roster.name_of(&acceptor_id);
                self.notice(format!("{} joined the call", name));
            }

            RelaySignal::CallRejected { rejector_id } => {
                let user_name = self.roster.name_of(&rejector_id);
                self.call.participant_left(rejector_id).await;
                self.emit(EngineEvent::CallRejected {
                    rejector_id,
                    user_name,
                });
            }
        }
    }

    async fn on_member_gone(&mut self, connection_id: ConnectionId, user_name: String) {
        info!("{} left", user_name);
        self.roster.remove(&connection_id);
        self.held.retain(|held| held.remote() != connection_id);

        if self.call.cancel_invite_from(&connection_id).is_some() {
            self.notice(format!("{} hung up", user_name));
        }
        if self.call.participant_left(connection_id).await {
            debug!("Dropped link to {}", user_name);
        }

        self.emit_roster();
        self.notice(format!("{} left the room", user_name));
    }

    async fn on_remote_offer(&mut self, from: ConnectionId, offer: SessionDescription) {
        if self.must_hold(&from) {
            self.held.push(HeldSignal::Offer { from, offer });
            return;
        }
        if !self.call.in_call() {
            debug!("Offer from {} outside a call ignored", from);
            return;
        }

        let result = self
            .call
            .supervisor_mut()
            .apply_remote_offer(from, offer)
            .await;
        if let Err(e) = result {
            self.report_link_error(from, e);
        }
    }

    async fn on_remote_candidate(&mut self, from: ConnectionId, candidate: IceCandidate) {
        if self.must_hold(&from) {
            self.held.push(HeldSignal::Candidate { from, candidate });
            return;
        }
        if !self.call.in_call() {
            debug!("Candidate from {} outside a call ignored", from);
            return;
        }

        let result = self
            .call
            .supervisor_mut()
            .apply_remote_candidate(from, candidate)
            .await;
        if let Err(e) = result {
            self.report_link_error(from, e);
        }
    }

    /// Replays what the caller sent while the invite was pending.
    pub(super) async fn replay_held(&mut self, caller_id: ConnectionId) {
        let held = std::mem::take(&mut self.held);
        debug!("Replaying {} held signal(s) from {}", held.len(), caller_id);

        for signal in held {
            if signal.remote() != caller_id {
                continue;
            }
            let result = match signal {
                HeldSignal::Offer { from, offer } => {
                    self.call
                        .supervisor_mut()
                        .apply_remote_offer(from, offer)
                        .await
                }
                HeldSignal::Candidate { from, candidate } => {
                    self.call
                        .supervisor_mut()
                        .apply_remote_candidate(from, candidate)
                        .await
                }
            };
            if let Err(e) = result {
                self.report_link_error(caller_id, e);
            }
        }
    }

    pub(super) fn report_link_error(&self, remote: ConnectionId, err: NegotiationError) {
        warn!("Link to {} failed: {}", remote, err);
        let name = self.roster.name_of(&remote);
        self.notice(format!("Connection to {} failed: {}", name, err));
    }
}
