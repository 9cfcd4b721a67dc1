mod connection;
mod participant;
mod room;
mod session;
mod signaling;

pub use connection::ConnectionId;
pub use participant::Participant;
pub use room::RoomId;
pub use session::{IceCandidate, SdpType, SessionDescription};
pub use signaling::{ClientSignal, IceServerConfig, RelaySignal};
