use huddle_core::{ClientSignal, ConnectionId};

/// Input of the relay actor, produced by the WebSocket handlers.
#[derive(Debug)]
pub enum RelayCommand {
    /// A parsed envelope from a live connection.
    Signal {
        connection_id: ConnectionId,
        signal: ClientSignal,
    },

    /// The WebSocket behind this connection is gone.
    Disconnect { connection_id: ConnectionId },
}
