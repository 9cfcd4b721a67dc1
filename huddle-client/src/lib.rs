mod call;
mod chat;
mod config;
mod engine;
mod error;
mod link;
mod media;
mod relay_client;
mod roster;
mod supervisor;

pub use call::*;
pub use chat::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use link::*;
pub use media::*;
pub use relay_client::*;
pub use roster::*;
pub use supervisor::*;
