use crate::relay::{RelayCommand, SignalRelay};
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Owns the relay state and applies commands strictly one at a time, so the
/// registry never sees two handlers interleave.
pub struct RelayActor {
    relay: SignalRelay,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn SignalingOutput>,
}

impl RelayActor {
    pub fn new(
        relay: SignalRelay,
        command_rx: mpsc::Receiver<RelayCommand>,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            relay,
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        let outbound = match cmd {
            RelayCommand::Signal {
                connection_id,
                signal,
            } => self.relay.handle(connection_id, signal),

            RelayCommand::Disconnect { connection_id } => self.relay.disconnect(connection_id),
        };

        for out in outbound {
            self.output.send_signal(out.to, out.signal).await;
        }
    }
}
