mod negotiation;
mod peer_link;
mod rtc_transport;
mod transport;

pub use negotiation::*;
pub use peer_link::*;
pub use rtc_transport::*;
pub use transport::*;
