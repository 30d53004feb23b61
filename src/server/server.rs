use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::net::TcpListener;

use crate::connection::Connection;
use crate::server::config::ServerConfig;
use crate::Result;

/// First retry delay after a transient accept failure
const ACCEPT_RETRY_INITIAL: Duration = Duration::from_millis(5);

/// Retry delay cap; doubling stops here
const ACCEPT_RETRY_MAX: Duration = Duration::from_secs(1);

/// Accepts TCP peers and runs one [`Connection`] task per peer.
///
/// The server itself holds nothing but configuration; every piece of
/// per-peer state lives inside the task that owns the socket.
pub struct RtmpServer {
    config: Arc<ServerConfig>,
}

impl RtmpServer {
    /// Create new server
    pub fn new(config: ServerConfig) -> Self {
        RtmpServer {
            config: Arc::new(config),
        }
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and accept forever
    pub async fn listen(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("RTMP server listening on {}", addr);
        self.serve(listener).await
    }

    /// Accept connections from an already-bound listener. Transient
    /// accept failures are retried with backoff; anything else is
    /// fatal and returned.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut retry_delay = Duration::ZERO;

        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) if is_transient_accept_error(&e) => {
                    retry_delay = if retry_delay.is_zero() {
                        ACCEPT_RETRY_INITIAL
                    } else {
                        (retry_delay * 2).min(ACCEPT_RETRY_MAX)
                    };
                    warn!("accept error: {}; retrying in {:?}", e, retry_delay);
                    tokio::time::sleep(retry_delay).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            retry_delay = Duration::ZERO;

            info!("accepted connection from {}", peer_addr);
            if let Err(e) = stream.set_nodelay(true) {
                warn!("failed to set TCP_NODELAY for {}: {}", peer_addr, e);
            }

            let config = self.config.clone();
            tokio::spawn(async move {
                let mut connection = Connection::new(stream, config);
                match connection.serve().await {
                    Ok(()) => info!("connection from {} closed", peer_addr),
                    Err(e) => error!("connection from {} failed: {}", peer_addr, e),
                }
                // Dropping the connection closes the socket.
            });
        }
    }
}

/// Bind addr (":1935"-style addresses get the wildcard host) and serve
/// with the default configuration.
pub async fn listen_and_serve(addr: &str) -> Result<()> {
    let addr = match addr {
        "" => "0.0.0.0:1935".to_string(),
        a if a.starts_with(':') => format!("0.0.0.0{}", a),
        a => a.to_string(),
    };
    let listener = TcpListener::bind(&addr).await?;
    info!("RTMP server listening on {}", addr);

    let server = RtmpServer::new(ServerConfig::default());
    server.serve(listener).await
}

fn is_transient_accept_error(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        e.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::Interrupted
            | ErrorKind::WouldBlock
    )
}
