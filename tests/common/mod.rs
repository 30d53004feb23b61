// Shared helpers: a minimal scripted RTMP publisher used to exercise
// the server from the outside.

use rtmpd::{
    Amf0Encoder, Amf0Value, BasicHeader, ChunkHeader, Command, MessageHeader, C1S1, C2S2,
    HANDSHAKE_PACKET_SIZE, MSG_TYPE_COMMAND_AMF0, RTMP_VERSION,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A command message read back from the server.
#[derive(Debug)]
pub struct ServerCommand {
    pub name: String,
    pub transaction_id: f64,
    pub arguments: Vec<Amf0Value>,
    pub message_stream_id: u32,
}

/// Drive the client side of the handshake, asserting each server
/// packet, and leave the connection ready for commands.
pub async fn client_handshake<S: AsyncRead + AsyncWrite + Unpin>(stream: &mut S) {
    let c1 = C1S1::new(0);
    stream.write_all(&[RTMP_VERSION]).await.unwrap();
    stream.write_all(&c1.bytes()).await.unwrap();

    let mut s0 = [0u8; 1];
    stream.read_exact(&mut s0).await.unwrap();
    assert_eq!(s0, [RTMP_VERSION], "S0 should carry version 3");

    let mut packet = [0u8; HANDSHAKE_PACKET_SIZE];
    stream.read_exact(&mut packet).await.unwrap();
    let s1 = C1S1::parse(&packet).unwrap();

    stream.read_exact(&mut packet).await.unwrap();
    let s2 = C2S2::parse(&packet).unwrap();
    assert_eq!(
        s2.random_echo, c1.random_bytes,
        "S2 must echo C1's random bytes"
    );

    stream
        .write_all(&C2S2::answering(&s1).bytes())
        .await
        .unwrap();
}

/// Encode a client command as a single format 0 chunk on chunk stream 3.
pub fn command_chunk(name: &str, transaction_id: f64, rest: &[Amf0Value]) -> Vec<u8> {
    let mut encoder = Amf0Encoder::new();
    encoder
        .encode(&Amf0Value::String(name.to_string()))
        .unwrap();
    encoder.encode(&Amf0Value::Number(transaction_id)).unwrap();
    for value in rest {
        encoder.encode(value).unwrap();
    }
    let payload = encoder.into_bytes();
    assert!(
        payload.len() <= 128,
        "scripted commands must fit the initial chunk size"
    );

    let mut chunk = ChunkHeader {
        basic: BasicHeader::new(0, 3),
        message: MessageHeader {
            message_length: payload.len() as u32,
            message_type_id: MSG_TYPE_COMMAND_AMF0,
            ..Default::default()
        },
    }
    .bytes()
    .unwrap();
    chunk.extend_from_slice(&payload);
    chunk
}

/// Encode a media message, split into chunks of `chunk_size` with
/// format 3 continuations, the way encoders put large frames on the
/// wire.
pub fn media_message_chunks(
    chunk_stream_id: u32,
    message_type_id: u8,
    message_stream_id: u32,
    timestamp: u32,
    payload: &[u8],
    chunk_size: usize,
) -> Vec<u8> {
    let mut wire = ChunkHeader {
        basic: BasicHeader::new(0, chunk_stream_id),
        message: MessageHeader {
            timestamp,
            timestamp_delta: 0,
            message_length: payload.len() as u32,
            message_type_id,
            message_stream_id,
        },
    }
    .bytes()
    .unwrap();

    let first = payload.len().min(chunk_size);
    wire.extend_from_slice(&payload[..first]);

    let mut offset = first;
    while offset < payload.len() {
        wire.extend_from_slice(&BasicHeader::new(3, chunk_stream_id).bytes().unwrap());
        let end = (offset + chunk_size).min(payload.len());
        wire.extend_from_slice(&payload[offset..end]);
        offset = end;
    }
    wire
}

/// Read one complete command chunk the server sent on chunk stream 3.
pub async fn read_command<S: AsyncRead + Unpin>(stream: &mut S) -> ServerCommand {
    let mut header = [0u8; 12];
    stream.read_exact(&mut header).await.unwrap();
    assert_eq!(header[0], 0x03, "commands arrive on chunk stream 3, format 0");
    assert_eq!(header[7], MSG_TYPE_COMMAND_AMF0);

    let length = u32::from_be_bytes([0, header[4], header[5], header[6]]) as usize;
    let message_stream_id = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload).await.unwrap();

    let command = Command::parse(&payload).unwrap();
    let arguments = command.arguments().unwrap();
    ServerCommand {
        name: command.name,
        transaction_id: command.transaction_id,
        arguments,
        message_stream_id,
    }
}

/// Read exactly `N` bytes.
pub async fn read_exactly<S: AsyncRead + Unpin, const N: usize>(stream: &mut S) -> [u8; N] {
    let mut buf = [0u8; N];
    stream.read_exact(&mut buf).await.unwrap();
    buf
}
