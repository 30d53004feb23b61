// Minimal ingest server: accepts RTMP publishers and logs the session.
//
// Usage:
//   cargo run --example simple_server
//
// Then point an encoder at it, e.g.:
//   ffmpeg -re -i input.mp4 -c copy -f flv rtmp://127.0.0.1/live/cam0

use log::info;
use rtmpd::{Result, RtmpServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let config = ServerConfig::builder().host("0.0.0.0").port(1935).build()?;

    info!(
        "starting RTMP ingest server on {}:{}",
        config.host, config.port
    );
    let server = RtmpServer::new(config);
    server.listen().await
}
