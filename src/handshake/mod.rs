mod packets;

pub use packets::*;
