use async_trait::async_trait;
use huddle_core::{ConnectionId, RelaySignal};

/// Delivery side of the relay. Implementations must not wait for the remote
/// end: a send either lands in the connection's queue or is dropped.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_signal(&self, connection_id: ConnectionId, signal: RelaySignal);
}
