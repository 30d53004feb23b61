//! Protocol control (message types 1-6) and user control builders.
//!
//! Every builder returns a complete chunk: a format 0 header on chunk
//! stream 2 followed by the payload, ready to be written to the peer.

use crate::chunk::{BasicHeader, ChunkHeader, MessageHeader};
use crate::protocol::constants::*;
use crate::{ByteBuffer, Result};

/// User control event: Stream Begin
const EVENT_STREAM_BEGIN: u16 = 0;

/// Set Peer Bandwidth limit type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerBandwidthLimitType {
    Hard,
    Soft,
    Dynamic,
}

impl PeerBandwidthLimitType {
    pub fn as_byte(self) -> u8 {
        match self {
            PeerBandwidthLimitType::Hard => 0,
            PeerBandwidthLimitType::Soft => 1,
            PeerBandwidthLimitType::Dynamic => 2,
        }
    }
}

fn control_chunk(message_type_id: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let header = ChunkHeader {
        basic: BasicHeader::new(0, CHUNK_STREAM_PROTOCOL),
        message: MessageHeader {
            message_length: payload.len() as u32,
            message_type_id,
            ..Default::default()
        },
    };
    let mut chunk = header.bytes()?;
    chunk.extend_from_slice(payload);
    Ok(chunk)
}

/// Set Chunk Size (type 1). The high bit of the size is reserved and
/// always cleared on the wire.
pub fn set_chunk_size(size: u32) -> Result<Vec<u8>> {
    let mut payload = ByteBuffer::with_capacity(4);
    payload.write_u32_be(size & 0x7FFF_FFFF)?;
    control_chunk(MSG_TYPE_SET_CHUNK_SIZE, payload.as_slice())
}

/// Abort (type 2): tells the peer to drop the partial message on the
/// given chunk stream.
pub fn abort(chunk_stream_id: u32) -> Result<Vec<u8>> {
    let mut payload = ByteBuffer::with_capacity(4);
    payload.write_u32_be(chunk_stream_id)?;
    control_chunk(MSG_TYPE_ABORT, payload.as_slice())
}

/// Acknowledgement (type 3): the number of bytes received so far.
pub fn acknowledgement(sequence_number: u32) -> Result<Vec<u8>> {
    let mut payload = ByteBuffer::with_capacity(4);
    payload.write_u32_be(sequence_number)?;
    control_chunk(MSG_TYPE_ACK, payload.as_slice())
}

/// Window Acknowledgement Size (type 5).
pub fn window_acknowledgement_size(size: u32) -> Result<Vec<u8>> {
    let mut payload = ByteBuffer::with_capacity(4);
    payload.write_u32_be(size)?;
    control_chunk(MSG_TYPE_WINDOW_ACK, payload.as_slice())
}

/// Set Peer Bandwidth (type 6): window size plus the limit type.
pub fn set_peer_bandwidth(size: u32, limit_type: PeerBandwidthLimitType) -> Result<Vec<u8>> {
    let mut payload = ByteBuffer::with_capacity(5);
    payload.write_u32_be(size)?;
    payload.write_u8(limit_type.as_byte())?;
    control_chunk(MSG_TYPE_SET_PEER_BW, payload.as_slice())
}

/// User Control Stream Begin (type 4, event 0) for the given message
/// stream.
pub fn user_stream_begin(stream_id: u32) -> Result<Vec<u8>> {
    let mut payload = ByteBuffer::with_capacity(6);
    payload.write_u16_be(EVENT_STREAM_BEGIN)?;
    payload.write_u32_be(stream_id)?;
    control_chunk(MSG_TYPE_USER_CONTROL, payload.as_slice())
}
