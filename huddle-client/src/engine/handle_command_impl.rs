use huddle_core::ClientSignal;
use tracing::debug;

use crate::call::CallPhase;
use crate::chat::chat_timestamp;
use crate::engine::{ClientEngine, EngineCommand, EngineEvent};
use crate::error::ClientError;

impl ClientEngine {
    pub(super) async fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::SendChat(body) => self.send_chat(&body),

            EngineCommand::StartCall => {
                let members = self.roster.ids();
                let result = self
                    .call
                    .start_call(&self.config.room_id, &self.config.user_name, &members)
                    .await;
                match result {
                    Ok(()) => {
                        // Anything held belonged to the invite start_call declined.
                        self.held.clear();
                        self.emit(EngineEvent::CallPhase(CallPhase::Starting));
                    }
                    Err(e) => self.notice(format!("Cannot start call: {}", e)),
                }
            }

            EngineCommand::AcceptCall => match self.call.accept_call(&self.config.room_id).await {
                Ok(invite) => {
                    self.emit(EngineEvent::CallPhase(CallPhase::Starting));
                    self.replay_held(invite.caller_id).await;
                }
                Err(e) => {
                    self.held.clear();
                    self.notice(format!("Cannot answer: {}", e));
                }
            },

            EngineCommand::RejectCall => match self.call.reject_call() {
                Ok(invite) => self.held.retain(|held| held.remote() != invite.caller_id),
                Err(e) => self.notice(e.to_string()),
            },

            EngineCommand::EndCall => match self.call.end_call().await {
                Ok(()) => {
                    self.emit(EngineEvent::CallPhase(CallPhase::Ended));
                    self.emit(EngineEvent::CallPhase(CallPhase::Idle));
                }
                Err(e) => self.notice(e.to_string()),
            },

            EngineCommand::ToggleMute => match self.call.toggle_mute() {
                Ok(true) => self.notice("Microphone muted"),
                Ok(false) => self.notice("Microphone on"),
                Err(e) => self.notice(e.to_string()),
            },

            EngineCommand::ToggleCamera => match self.call.toggle_camera() {
                Ok(true) => self.notice("Camera on"),
                Ok(false) => self.notice("Camera off"),
                Err(e) => self.notice(e.to_string()),
            },

            // Handled by the run loop.
            EngineCommand::Leave => {}
        }
    }

    fn send_chat(&mut self, body: &str) {
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        if self.own_id.is_none() {
            self.notice(ClientError::NotConnected.to_string());
            return;
        }

        debug!("Sending chat to '{}'", self.config.room_id);
        self.signals.send_signal(ClientSignal::SendMessage {
            room_id: self.config.room_id.clone(),
            message: body.to_string(),
            sender: self.config.user_name.clone(),
            timestamp: chat_timestamp(),
        });
    }
}
