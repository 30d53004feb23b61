mod amf;
mod chunk;
mod connection;
mod handshake;
mod protocol;
mod server;
mod utils;

// Re-export commonly used types at crate root
pub use amf::*;
pub use chunk::*;
pub use connection::*;
pub use handshake::*;
pub use protocol::*;
pub use utils::*;

// Server exports
pub use server::{listen_and_serve, RtmpServer, ServerConfig, ServerConfigBuilder};
