mod config;
mod server;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use server::{listen_and_serve, RtmpServer};
