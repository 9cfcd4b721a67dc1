mod relay_actor;
mod relay_command;
mod signal_relay;

pub use relay_actor::*;
pub use relay_command::*;
pub use signal_relay::*;
