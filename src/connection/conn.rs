use std::sync::Arc;

use log::{debug, trace};
use tokio::io::{
    AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, ReadHalf, WriteHalf,
};
use tokio::time::timeout;

use crate::chunk::ChunkReader;
use crate::connection::SessionState;
use crate::handshake::{C0S0, C1S1, C2S2, HANDSHAKE_PACKET_SIZE, RTMP_VERSION};
use crate::protocol::constants::*;
use crate::protocol::{command, control, Command, PeerBandwidthLimitType, RtmpMessage};
use crate::server::ServerConfig;
use crate::{ByteBuffer, Error, Result};

/// Read/write buffer size for the peer socket
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Drives one publisher connection: the handshake, then a loop decoding
/// messages and answering the command sequence that takes the peer from
/// `connect` to `publish`. All state lives here; one task owns one
/// `Connection` and nothing is shared.
pub struct Connection<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: BufWriter<WriteHalf<S>>,
    config: Arc<ServerConfig>,
    state: SessionState,
    chunks: ChunkReader,
    stream_name: String,
    last_acknowledged: u64,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, config: Arc<ServerConfig>) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Connection {
            reader: BufReader::with_capacity(STREAM_BUFFER_SIZE, read_half),
            writer: BufWriter::with_capacity(STREAM_BUFFER_SIZE, write_half),
            config,
            state: SessionState::Uninitialized,
            chunks: ChunkReader::new(),
            stream_name: String::new(),
            last_acknowledged: 0,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the connection to completion: handshake, then the message
    /// loop. Returns Ok on a clean peer close; the caller logs and
    /// closes the socket either way.
    pub async fn serve(&mut self) -> Result<()> {
        self.handshake().await?;

        loop {
            let message = match self.config.idle_timeout {
                Some(limit) => {
                    match timeout(limit, self.chunks.read_message(&mut self.reader)).await {
                        Ok(result) => result?,
                        Err(_) => {
                            return Err(Error::timeout(format!(
                                "no data from peer within {:?}",
                                limit
                            )))
                        }
                    }
                }
                None => self.chunks.read_message(&mut self.reader).await?,
            };

            let Some(message) = message else {
                debug!("peer closed the connection");
                return Ok(());
            };

            self.dispatch(message).await?;
            self.maybe_acknowledge().await?;
        }
    }

    ///  +-------------+                           +-------------+
    ///  |   Client    |      TCP/IP Network       |   Server    |
    ///  +-------------+            |              +-------------+
    ///        |                    |                     |
    ///  Uninitialized    C0+C1     |              Uninitialized
    ///        |------------------->|------------------->|
    ///        |                    |       S0+S1        |
    ///  Version sent               |<-------------------|
    ///        |                    |              Version sent
    ///        |                    |        S2          |
    ///        |                    |<-------------------|
    ///     Ack sent      C2        |                 Ack sent
    ///        |------------------->|------------------->|
    ///  Handshake done             |             Handshake done
    async fn handshake(&mut self) -> Result<()> {
        debug!("begin RTMP handshake");

        // << C0
        let mut version = [0u8; 1];
        self.read_handshake_packet(&mut version).await?;
        let c0 = C0S0::parse(&version)?;
        if c0.version > RTMP_VERSION {
            return Err(Error::UnsupportedVersion(c0.version));
        }

        // >> S0
        self.writer.write_all(&C0S0::new().bytes()).await?;
        self.writer.flush().await?;
        self.state.advance_to(SessionState::VersionSent)?;

        // << C1
        let mut packet = [0u8; HANDSHAKE_PACKET_SIZE];
        self.read_handshake_packet(&mut packet).await?;
        let c1 = C1S1::parse(&packet)?;

        // >> S1
        let s1 = C1S1::new(0);
        self.writer.write_all(&s1.bytes()).await?;
        self.writer.flush().await?;
        self.state.advance_to(SessionState::AckSent)?;

        // >> S2
        let s2 = C2S2::answering(&c1);
        self.writer.write_all(&s2.bytes()).await?;
        self.writer.flush().await?;

        // << C2
        self.read_handshake_packet(&mut packet).await?;
        let c2 = C2S2::parse(&packet)?;
        if !c2.matches_random(&s1) {
            return Err(Error::RandomEchoMismatch);
        }

        self.state.advance_to(SessionState::HandshakeDone)?;
        debug!("handshake complete");
        Ok(())
    }

    /// Fill buf completely, reporting how far we got if the peer hangs
    /// up mid-packet.
    async fn read_handshake_packet(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(Error::IncompleteHandshake {
                    got: filled,
                    expected: buf.len(),
                });
            }
            filled += n;
        }
        Ok(())
    }

    async fn dispatch(&mut self, message: RtmpMessage) -> Result<()> {
        match message.message_type_id {
            MSG_TYPE_SET_CHUNK_SIZE => {
                if message.payload.len() != 4 {
                    return Err(Error::protocol(format!(
                        "Set Chunk Size payload should be 4 bytes, got {}",
                        message.payload.len()
                    )));
                }
                let size = u32::from_be_bytes([
                    message.payload[0],
                    message.payload[1],
                    message.payload[2],
                    message.payload[3],
                ]);
                if size == 0 || size & 0x8000_0000 != 0 {
                    return Err(Error::protocol(format!("invalid chunk size: {:#x}", size)));
                }
                debug!("peer set chunk size to {}", size);
                self.chunks.set_chunk_size(size as usize);
            }
            MSG_TYPE_ABORT => {
                let csid = read_u32_payload(&message)?;
                debug!("peer aborted chunk stream {}", csid);
                self.chunks.abort(csid);
            }
            MSG_TYPE_ACK => {
                let sequence_number = read_u32_payload(&message)?;
                debug!("peer acknowledged {} bytes", sequence_number);
            }
            MSG_TYPE_USER_CONTROL => {
                let mut buffer = ByteBuffer::new(message.payload.clone());
                let event_type = buffer.read_u16_be()?;
                debug!(
                    "user control event {} ({} byte payload)",
                    event_type,
                    message.payload.len()
                );
            }
            MSG_TYPE_WINDOW_ACK => {
                let window = read_u32_payload(&message)?;
                debug!("peer window acknowledgement size is {}", window);
            }
            MSG_TYPE_SET_PEER_BW => {
                if message.payload.len() < 5 {
                    return Err(Error::protocol("Set Peer Bandwidth payload too short"));
                }
                let window = u32::from_be_bytes([
                    message.payload[0],
                    message.payload[1],
                    message.payload[2],
                    message.payload[3],
                ]);
                debug!(
                    "peer bandwidth {} (limit type {})",
                    window, message.payload[4]
                );
            }
            MSG_TYPE_AUDIO | MSG_TYPE_VIDEO => {
                // Content reception is the end of the line for the core:
                // payloads are handed off here and not persisted.
                trace!(
                    "{} message: {} bytes at timestamp {} on stream {}",
                    message.type_name(),
                    message.payload.len(),
                    message.timestamp,
                    message.message_stream_id
                );
            }
            MSG_TYPE_COMMAND_AMF0 => {
                self.handle_command(&message).await?;
            }
            MSG_TYPE_DATA_AMF0 | MSG_TYPE_DATA_AMF3 | MSG_TYPE_SHARED_OBJECT_AMF0
            | MSG_TYPE_SHARED_OBJECT_AMF3 | MSG_TYPE_COMMAND_AMF3 | MSG_TYPE_AGGREGATE => {
                debug!(
                    "{} message ({} bytes)",
                    message.type_name(),
                    message.payload.len()
                );
            }
            other => {
                // Forward compatibility: drained by the chunk reader,
                // nothing else to do.
                debug!(
                    "discarding message with unknown type id {} ({} bytes)",
                    other,
                    message.payload.len()
                );
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, message: &RtmpMessage) -> Result<()> {
        let cmd = Command::parse(&message.payload)?;
        debug!(
            "received {:?} command (transaction id {})",
            cmd.name, cmd.transaction_id
        );

        match cmd.name.as_str() {
            "connect" => self.on_connect(&cmd, message).await,
            "releaseStream" => {
                self.require_state(SessionState::ConnectResponseSent, "releaseStream")?;
                Ok(())
            }
            "FCPublish" => self.on_fc_publish(&cmd).await,
            "createStream" => self.on_create_stream(&cmd).await,
            "publish" => self.on_publish(&cmd).await,
            other => {
                debug!("ignoring unsupported command {:?}", other);
                Ok(())
            }
        }
    }

    async fn on_connect(&mut self, cmd: &Command, message: &RtmpMessage) -> Result<()> {
        // librtmp (ffmpeg) can leave a stray 0xc3 chunk delimiter inside
        // the connect payload without counting it in the message length.
        // When one shows up, one transport byte must be consumed to
        // realign the stream.
        if message.payload.contains(&0xC3) {
            let skipped = self.reader.read_u8().await?;
            debug!(
                "stray 0xc3 in connect payload, consumed realignment byte {:#04x}",
                skipped
            );
        }

        self.writer
            .write_all(&control::window_acknowledgement_size(
                self.config.window_ack_size,
            )?)
            .await?;
        self.writer
            .write_all(&control::set_peer_bandwidth(
                self.config.peer_bandwidth,
                PeerBandwidthLimitType::Dynamic,
            )?)
            .await?;
        self.writer
            .write_all(&control::user_stream_begin(0)?)
            .await?;
        self.writer
            .write_all(&control::set_chunk_size(self.config.chunk_size)?)
            .await?;
        self.writer
            .write_all(&command::connect_result(cmd.transaction_id)?)
            .await?;
        self.writer.flush().await?;

        self.state.advance_to(SessionState::ConnectResponseSent)
    }

    async fn on_fc_publish(&mut self, cmd: &Command) -> Result<()> {
        self.require_state(SessionState::ConnectResponseSent, "FCPublish")?;

        let stream_name = cmd.stream_name()?;
        debug!("FCPublish for stream {:?}", stream_name);

        self.writer
            .write_all(&command::on_fc_publish(cmd.transaction_id, &stream_name)?)
            .await?;
        self.writer.flush().await?;

        self.stream_name = stream_name;
        Ok(())
    }

    async fn on_create_stream(&mut self, cmd: &Command) -> Result<()> {
        self.require_state(SessionState::ConnectResponseSent, "createStream")?;

        self.writer
            .write_all(&command::create_stream_result(cmd.transaction_id)?)
            .await?;
        self.writer.flush().await?;

        self.state
            .advance_to(SessionState::CreateStreamResponseSent)
    }

    async fn on_publish(&mut self, cmd: &Command) -> Result<()> {
        self.require_state(SessionState::CreateStreamResponseSent, "publish")?;
        if self.state == SessionState::PublishingContent {
            debug!("publish received while already publishing, ignoring");
            return Ok(());
        }

        // Prefer the name in the publish arguments; fall back to the one
        // FCPublish recorded.
        let stream_name = match cmd.stream_name() {
            Ok(name) => {
                self.stream_name = name.clone();
                name
            }
            Err(_) => self.stream_name.clone(),
        };
        debug!("publish starting for stream {:?}", stream_name);

        self.writer
            .write_all(&control::user_stream_begin(1)?)
            .await?;
        self.writer
            .write_all(&command::on_status_publish_start(
                cmd.transaction_id,
                &stream_name,
            )?)
            .await?;
        self.writer.flush().await?;

        self.state.advance_to(SessionState::PublishingContent)
    }

    fn require_state(&self, at_least: SessionState, what: &str) -> Result<()> {
        if self.state < at_least {
            return Err(Error::protocol(format!(
                "{} command received in state {:?}, requires {:?}",
                what, self.state, at_least
            )));
        }
        Ok(())
    }

    /// Emit an Acknowledgement each time a full window of bytes has
    /// arrived since the last one.
    async fn maybe_acknowledge(&mut self) -> Result<()> {
        let received = self.chunks.bytes_received();
        if received - self.last_acknowledged >= self.config.window_ack_size as u64 {
            self.writer
                .write_all(&control::acknowledgement(received as u32)?)
                .await?;
            self.writer.flush().await?;
            self.last_acknowledged = received;
            debug!("acknowledged {} bytes", received);
        }
        Ok(())
    }
}

fn read_u32_payload(message: &RtmpMessage) -> Result<u32> {
    if message.payload.len() < 4 {
        return Err(Error::protocol(format!(
            "{} payload should be 4 bytes, got {}",
            message.type_name(),
            message.payload.len()
        )));
    }
    Ok(u32::from_be_bytes([
        message.payload[0],
        message.payload[1],
        message.payload[2],
        message.payload[3],
    ]))
}
