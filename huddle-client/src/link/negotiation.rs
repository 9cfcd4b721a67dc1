use crate::error::NegotiationError;
use huddle_core::{ConnectionId, IceCandidate};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    /// Produces the initial offer.
    Offerer,
    Answerer,
}

/// Offer/answer progress of one peer link.
///
/// `Connected` means both descriptions are in place. A connected link can
/// renegotiate, which moves it back through one of the `Have*` states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    HaveLocalOffer,
    HaveRemoteOffer,
    Connected,
    Closed,
}

/// Negotiation state machine plus the candidates that arrived too early.
///
/// Candidates are only usable once a remote description has been applied;
/// anything earlier is queued and handed back by [`Negotiation::take_ready`].
#[derive(Debug)]
pub struct Negotiation {
    remote: ConnectionId,
    state: NegotiationState,
    remote_applied: bool,
    pending: VecDeque<IceCandidate>,
}

impl Negotiation {
    pub fn new(remote: ConnectionId) -> Self {
        Self {
            remote,
            state: NegotiationState::New,
            remote_applied: false,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn local_offer(&mut self) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::New | NegotiationState::Connected => {
                self.state = NegotiationState::HaveLocalOffer;
                Ok(())
            }
            state => Err(NegotiationError::InvalidState {
                state,
                action: "create an offer",
            }),
        }
    }

    pub fn remote_offer(&mut self) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::New | NegotiationState::Connected => {
                self.state = NegotiationState::HaveRemoteOffer;
                self.remote_applied = true;
                Ok(())
            }
            NegotiationState::HaveLocalOffer => Err(NegotiationError::Glare(self.remote)),
            state => Err(NegotiationError::InvalidState {
                state,
                action: "apply a remote offer",
            }),
        }
    }

    pub fn local_answer(&mut self) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::HaveRemoteOffer => {
                self.state = NegotiationState::Connected;
                Ok(())
            }
            state => Err(NegotiationError::InvalidState {
                state,
                action: "answer",
            }),
        }
    }

    pub fn remote_answer(&mut self) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::HaveLocalOffer => {
                self.state = NegotiationState::Connected;
                self.remote_applied = true;
                Ok(())
            }
            state => Err(NegotiationError::InvalidState {
                state,
                action: "apply a remote answer",
            }),
        }
    }

    /// Returns the candidate back when it can be applied right away,
    /// otherwise keeps it for later.
    pub fn candidate(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        match self.state {
            NegotiationState::Closed => None,
            _ if self.remote_applied => Some(candidate),
            _ => {
                self.pending.push_back(candidate);
                None
            }
        }
    }

    /// Queued candidates, in arrival order, once they can be applied.
    pub fn take_ready(&mut self) -> Vec<IceCandidate> {
        if !self.remote_applied {
            return Vec::new();
        }
        self.pending.drain(..).collect()
    }

    /// Hands back everything still queued, whatever the state.
    pub fn drain_pending(&mut self) -> Vec<IceCandidate> {
        self.pending.drain(..).collect()
    }

    pub fn close(&mut self) {
        self.state = NegotiationState::Closed;
        self.pending.clear();
    }
}
