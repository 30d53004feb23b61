use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{ByteBuffer, Error, Result};

/// 24-bit timestamp fields saturate to this value on the wire; the full
/// 32-bit value then follows as the extended timestamp.
pub const EXTENDED_TIMESTAMP_SENTINEL: u32 = 0x00FF_FFFF;

/// Largest chunk stream id expressible by the 3-byte basic header form
pub const MAX_CHUNK_STREAM_ID: u32 = 65599;

/// Basic header: 2-bit format plus the chunk stream id.
///
/// The wire form is picked by the id range. Ids 0 and 1 in the 6-bit
/// field are not ids at all but markers selecting the 2- and 3-byte
/// forms, so 0 and 1 are unencodable and ids start at 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicHeader {
    pub format: u8,
    pub chunk_stream_id: u32,
}

impl BasicHeader {
    pub fn new(format: u8, chunk_stream_id: u32) -> Self {
        BasicHeader {
            format,
            chunk_stream_id,
        }
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        if self.format > 3 {
            return Err(Error::UnknownFormat(self.format));
        }
        match self.chunk_stream_id {
            2..=63 => Ok(vec![(self.format << 6) | self.chunk_stream_id as u8]),
            64..=319 => Ok(vec![self.format << 6, (self.chunk_stream_id - 64) as u8]),
            320..=MAX_CHUNK_STREAM_ID => {
                let id = (self.chunk_stream_id - 64) as u16;
                let mut out = vec![(self.format << 6) | 1];
                out.extend_from_slice(&id.to_be_bytes());
                Ok(out)
            }
            other => Err(Error::InvalidChunkStreamId(other)),
        }
    }

    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self> {
        let first = reader.read_u8().await?;
        let (header, _) = Self::read_rest(first, reader).await?;
        Ok(header)
    }

    /// Finish decoding once the first byte is in hand. Returns the
    /// header and the wire size including that first byte.
    pub(crate) async fn read_rest<R: AsyncRead + Unpin>(
        first: u8,
        reader: &mut R,
    ) -> Result<(Self, usize)> {
        let format = first >> 6;
        match first & 0x3F {
            0 => {
                let id = reader.read_u8().await?;
                Ok((BasicHeader::new(format, id as u32 + 64), 2))
            }
            1 => {
                let mut id = [0u8; 2];
                reader.read_exact(&mut id).await?;
                Ok((BasicHeader::new(format, u16::from_be_bytes(id) as u32 + 64), 3))
            }
            id => Ok((BasicHeader::new(format, id as u32), 1)),
        }
    }
}

/// Message header in the shape selected by the basic header's format:
/// 11 bytes (absolute timestamp, length, type id, stream id), 7 bytes
/// (delta, length, type id), 3 bytes (delta only) or empty. Fields a
/// format omits are inherited from the previous chunk on the same chunk
/// stream; see [`ChunkReader`](crate::ChunkReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub timestamp: u32,
    pub timestamp_delta: u32,
    pub message_length: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
}

impl MessageHeader {
    pub fn bytes(&self, format: u8) -> Result<Vec<u8>> {
        let timestamp = self.timestamp.min(EXTENDED_TIMESTAMP_SENTINEL);
        let delta = self.timestamp_delta.min(EXTENDED_TIMESTAMP_SENTINEL);

        let mut buffer = ByteBuffer::with_capacity(11);
        match format {
            0 => {
                buffer.write_u24_be(timestamp)?;
                buffer.write_u24_be(self.message_length)?;
                buffer.write_u8(self.message_type_id)?;
                // The one little-endian field in the protocol
                buffer.write_u32_le(self.message_stream_id)?;
            }
            1 => {
                buffer.write_u24_be(delta)?;
                buffer.write_u24_be(self.message_length)?;
                buffer.write_u8(self.message_type_id)?;
            }
            2 => {
                buffer.write_u24_be(delta)?;
            }
            3 => {}
            other => return Err(Error::UnknownFormat(other)),
        }
        Ok(buffer.into_vec())
    }

    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R, format: u8) -> Result<Self> {
        let mut header = MessageHeader::default();
        match format {
            0 => {
                let mut raw = [0u8; 11];
                reader.read_exact(&mut raw).await?;
                let mut buffer = ByteBuffer::new(raw.to_vec());
                header.timestamp = buffer.read_u24_be()?;
                header.message_length = buffer.read_u24_be()?;
                header.message_type_id = buffer.read_u8()?;
                header.message_stream_id = buffer.read_u32_le()?;
            }
            1 => {
                let mut raw = [0u8; 7];
                reader.read_exact(&mut raw).await?;
                let mut buffer = ByteBuffer::new(raw.to_vec());
                header.timestamp_delta = buffer.read_u24_be()?;
                header.message_length = buffer.read_u24_be()?;
                header.message_type_id = buffer.read_u8()?;
            }
            2 => {
                let mut raw = [0u8; 3];
                reader.read_exact(&mut raw).await?;
                let mut buffer = ByteBuffer::new(raw.to_vec());
                header.timestamp_delta = buffer.read_u24_be()?;
            }
            3 => {}
            other => return Err(Error::UnknownFormat(other)),
        }
        Ok(header)
    }

    fn wire_size(format: u8) -> usize {
        match format {
            0 => 11,
            1 => 7,
            2 => 3,
            _ => 0,
        }
    }
}

/// Complete chunk header: basic header, message header and the extended
/// timestamp folded back into the logical timestamp fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub basic: BasicHeader,
    pub message: MessageHeader,
}

impl ChunkHeader {
    pub fn bytes(&self) -> Result<Vec<u8>> {
        let mut out = self.basic.bytes()?;
        out.extend_from_slice(&self.message.bytes(self.basic.format)?);
        match self.basic.format {
            0 if self.message.timestamp >= EXTENDED_TIMESTAMP_SENTINEL => {
                out.extend_from_slice(&self.message.timestamp.to_be_bytes());
            }
            1 | 2 if self.message.timestamp_delta >= EXTENDED_TIMESTAMP_SENTINEL => {
                out.extend_from_slice(&self.message.timestamp_delta.to_be_bytes());
            }
            _ => {}
        }
        Ok(out)
    }

    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self> {
        let basic = BasicHeader::read_from(reader).await?;
        let (header, _) = Self::read_after_basic(basic, reader).await?;
        Ok(header)
    }

    /// Read the message header and any extended timestamp that follows
    /// an already-decoded basic header. Returns the header and the
    /// number of bytes consumed after the basic header.
    pub(crate) async fn read_after_basic<R: AsyncRead + Unpin>(
        basic: BasicHeader,
        reader: &mut R,
    ) -> Result<(Self, usize)> {
        let mut message = MessageHeader::read_from(reader, basic.format).await?;
        let mut consumed = MessageHeader::wire_size(basic.format);

        match basic.format {
            0 if message.timestamp == EXTENDED_TIMESTAMP_SENTINEL => {
                message.timestamp = reader.read_u32().await?;
                consumed += 4;
            }
            1 | 2 if message.timestamp_delta == EXTENDED_TIMESTAMP_SENTINEL => {
                message.timestamp_delta = reader.read_u32().await?;
                consumed += 4;
            }
            _ => {}
        }

        Ok((ChunkHeader { basic, message }, consumed))
    }
}
