mod config;
mod relay;
mod room;
mod server;
mod signaling;

pub use config::*;
pub use relay::*;
pub use room::*;
pub use server::*;
pub use signaling::*;
