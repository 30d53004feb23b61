use std::collections::HashMap;
use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::chunk::{BasicHeader, ChunkHeader};
use crate::protocol::{RtmpMessage, DEFAULT_CHUNK_SIZE};
use crate::{Error, Result};

/// Per chunk stream decode state: the header fields that format 1/2/3
/// chunks inherit, plus the message being assembled.
#[derive(Debug, Default)]
struct ChunkStreamContext {
    timestamp: u32,
    timestamp_delta: u32,
    message_length: u32,
    message_type_id: u8,
    message_stream_id: u32,

    /// A format 0/1/2 header has been seen on this chunk stream
    has_prior: bool,

    buffer: Vec<u8>,
    bytes_remaining: usize,
}

impl ChunkStreamContext {
    fn is_assembling(&self) -> bool {
        self.bytes_remaining > 0
    }
}

/// Stateful chunk decoder for one connection.
///
/// Messages longer than the chunk size arrive as an initial format
/// 0/1/2 chunk followed by format 3 continuations on the same chunk
/// stream; `read_message` accumulates them and only surfaces complete
/// messages.
pub struct ChunkReader {
    streams: HashMap<u32, ChunkStreamContext>,
    chunk_size: usize,
    bytes_received: u64,
}

impl ChunkReader {
    pub fn new() -> Self {
        ChunkReader {
            streams: HashMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE as usize,
            bytes_received: 0,
        }
    }

    /// Apply a Set Chunk Size announced by the peer
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size;
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Wire bytes consumed so far, for acknowledgement windowing
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Discard a partially assembled message (Abort message semantics)
    pub fn abort(&mut self, chunk_stream_id: u32) {
        if let Some(context) = self.streams.get_mut(&chunk_stream_id) {
            context.buffer.clear();
            context.bytes_remaining = 0;
        }
    }

    /// Read chunks until a message completes. Returns `None` on EOF at
    /// a message boundary, which is how peers hang up cleanly.
    pub async fn read_message<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut R,
    ) -> Result<Option<RtmpMessage>> {
        loop {
            let first = match reader.read_u8().await {
                Ok(byte) => byte,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    // EOF between messages is how peers hang up; EOF with
                    // a message half assembled is not.
                    if self.streams.values().any(|c| c.is_assembling()) {
                        return Err(Error::chunk("connection closed in the middle of a message"));
                    }
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            let (basic, basic_size) = BasicHeader::read_rest(first, reader).await?;
            let (header, rest_size) = ChunkHeader::read_after_basic(basic, reader).await?;
            self.bytes_received += (basic_size + rest_size) as u64;

            if let Some(message) = self.accept_chunk(header, reader).await? {
                return Ok(Some(message));
            }
        }
    }

    /// Merge one chunk into its stream context, returning the message
    /// if this chunk completed it.
    async fn accept_chunk<R: AsyncRead + Unpin>(
        &mut self,
        header: ChunkHeader,
        reader: &mut R,
    ) -> Result<Option<RtmpMessage>> {
        let csid = header.basic.chunk_stream_id;
        let format = header.basic.format;
        let context = self.streams.entry(csid).or_default();

        if context.is_assembling() && format != 3 {
            return Err(Error::chunk(format!(
                "format {} chunk interrupts message assembly on chunk stream {}",
                format, csid
            )));
        }
        if format != 0 && !context.has_prior {
            return Err(Error::chunk(format!(
                "format {} chunk without a preceding full header on chunk stream {}",
                format, csid
            )));
        }

        match format {
            0 => {
                context.timestamp = header.message.timestamp;
                context.timestamp_delta = 0;
                context.message_length = header.message.message_length;
                context.message_type_id = header.message.message_type_id;
                context.message_stream_id = header.message.message_stream_id;
                context.has_prior = true;
            }
            1 => {
                context.timestamp_delta = header.message.timestamp_delta;
                context.timestamp = context.timestamp.wrapping_add(context.timestamp_delta);
                context.message_length = header.message.message_length;
                context.message_type_id = header.message.message_type_id;
            }
            2 => {
                context.timestamp_delta = header.message.timestamp_delta;
                context.timestamp = context.timestamp.wrapping_add(context.timestamp_delta);
            }
            _ => {
                // Format 3 starting a fresh message repeats the last delta;
                // as a continuation it changes nothing.
                if !context.is_assembling() {
                    context.timestamp = context.timestamp.wrapping_add(context.timestamp_delta);
                }
            }
        }

        if !context.is_assembling() {
            context.bytes_remaining = context.message_length as usize;
            context.buffer.clear();
            context.buffer.reserve(context.bytes_remaining);
        }

        let take = context.bytes_remaining.min(self.chunk_size);
        let start = context.buffer.len();
        context.buffer.resize(start + take, 0);
        reader.read_exact(&mut context.buffer[start..]).await?;
        context.bytes_remaining -= take;
        self.bytes_received += take as u64;

        if context.bytes_remaining > 0 {
            return Ok(None);
        }

        Ok(Some(RtmpMessage {
            chunk_stream_id: csid,
            timestamp: context.timestamp,
            message_type_id: context.message_type_id,
            message_stream_id: context.message_stream_id,
            payload: std::mem::take(&mut context.buffer),
        }))
    }
}

impl Default for ChunkReader {
    fn default() -> Self {
        ChunkReader::new()
    }
}
