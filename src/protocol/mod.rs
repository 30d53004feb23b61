pub mod command;
pub mod constants;
pub mod control;
mod message;

pub use command::Command;
pub use constants::*;
pub use control::PeerBandwidthLimitType;
pub use message::*;
