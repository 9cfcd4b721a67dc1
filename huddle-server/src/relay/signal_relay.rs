use crate::room::RoomRegistry;
use huddle_core::{ClientSignal, ConnectionId, Participant, RelaySignal, RoomId};
use tracing::{debug, info, warn};

/// One envelope addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub signal: RelaySignal,
}

impl Outbound {
    pub fn new(to: ConnectionId, signal: RelaySignal) -> Self {
        Self { to, signal }
    }
}

/// Dispatch table from client envelopes to registry changes and deliveries.
///
/// Every handler finishes its registry mutation before it builds the
/// notifications for it, and nothing here touches I/O: the caller decides how
/// the returned [`Outbound`] list reaches the wire.
#[derive(Debug, Default)]
pub struct SignalRelay {
    registry: RoomRegistry,
}

impl SignalRelay {
    pub fn new(registry: RoomRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn handle(&mut self, from: ConnectionId, signal: ClientSignal) -> Vec<Outbound> {
        debug!("{} -> {}", from, signal.event_name());

        match signal {
            ClientSignal::JoinRoom {
                room_id,
                user_name,
                user_id,
            } => self.join(from, room_id, Participant::new(from, user_name, user_id)),

            ClientSignal::LeaveRoom { room_id, .. } => self.leave(from, &room_id),

            ClientSignal::SendMessage {
                room_id,
                message,
                sender,
                timestamp,
            } => {
                if !self.is_member(&from, &room_id) {
                    warn!(
                        "Dropping chat from {} for room '{}' it has not joined",
                        from, room_id
                    );
                    return Vec::new();
                }

                let signal = RelaySignal::ReceiveMessage {
                    room_id: room_id.clone(),
                    message,
                    sender,
                    timestamp,
                    connection_id: from,
                };
                self.fan_out(&room_id, None, signal)
            }

            ClientSignal::SendOffer { offer, to_socket } => Self::forward(
                to_socket,
                RelaySignal::ReceiveOffer {
                    offer,
                    from_socket: from,
                },
            ),

            ClientSignal::SendAnswer { answer, to_socket } => Self::forward(
                to_socket,
                RelaySignal::ReceiveAnswer {
                    answer,
                    from_socket: from,
                },
            ),

            ClientSignal::SendIceCandidate {
                candidate,
                to_socket,
            } => Self::forward(
                to_socket,
                RelaySignal::ReceiveIceCandidate {
                    candidate,
                    from_socket: from,
                },
            ),

            ClientSignal::InitiateCall {
                room_id,
                caller_name,
            } => {
                if !self.is_member(&from, &room_id) {
                    warn!(
                        "Dropping call invite from {} for room '{}' it has not joined",
                        from, room_id
                    );
                    return Vec::new();
                }

                info!("{} ({}) starts a call in '{}'", caller_name, from, room_id);
                let signal = RelaySignal::IncomingCall {
                    caller_id: from,
                    caller_name,
                };
                self.fan_out(&room_id, Some(&from), signal)
            }

            ClientSignal::AcceptCall { caller_id } => {
                Self::forward(caller_id, RelaySignal::CallAccepted { acceptor_id: from })
            }

            ClientSignal::RejectCall { caller_id } => {
                Self::forward(caller_id, RelaySignal::CallRejected { rejector_id: from })
            }
        }
    }

    /// Transport went away: drop the membership and tell the room.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        let Some((room_id, participant)) = self.registry.remove_connection(&connection_id) else {
            return Vec::new();
        };

        info!("{} disconnected from room '{}'", participant.user_name, room_id);
        let signal = RelaySignal::UserDisconnected {
            connection_id,
            user_name: participant.user_name,
        };
        self.fan_out(&room_id, None, signal)
    }

    fn join(
        &mut self,
        from: ConnectionId,
        room_id: RoomId,
        participant: Participant,
    ) -> Vec<Outbound> {
        let mut out = Vec::new();

        if let Some(current) = self.registry.room_of(&from).cloned() {
            if current != room_id {
                out.extend(self.leave(from, &current));
            }
        }

        info!("{} joined room '{}'", participant.user_name, room_id);
        let existing = self.registry.join(&room_id, participant.clone());

        out.extend(existing.iter().map(|member| {
            Outbound::new(member.connection_id, RelaySignal::UserJoined(participant.clone()))
        }));
        out.push(Outbound::new(from, RelaySignal::ExistingParticipants(existing)));
        out
    }

    fn leave(&mut self, from: ConnectionId, room_id: &RoomId) -> Vec<Outbound> {
        let Some(participant) = self.registry.leave(room_id, &from) else {
            return Vec::new();
        };

        info!("{} left room '{}'", participant.user_name, room_id);
        let signal = RelaySignal::UserLeft {
            connection_id: from,
            user_name: participant.user_name,
        };
        self.fan_out(room_id, None, signal)
    }

    fn is_member(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        self.registry.room_of(connection_id) == Some(room_id)
    }

    fn fan_out(
        &self,
        room_id: &RoomId,
        except: Option<&ConnectionId>,
        signal: RelaySignal,
    ) -> Vec<Outbound> {
        self.registry
            .members(room_id)
            .iter()
            .filter(|member| Some(&member.connection_id) != except)
            .map(|member| Outbound::new(member.connection_id, signal.clone()))
            .collect()
    }

    fn forward(to: ConnectionId, signal: RelaySignal) -> Vec<Outbound> {
        vec![Outbound::new(to, signal)]
    }
}
