//! AMF0 command parsing and the server's command responses.
//!
//! Response builders return complete chunks: a format 0 header on chunk
//! stream 3 (message type 20) followed by the AMF0 payload.

use std::collections::HashMap;

use crate::amf::{Amf0Decoder, Amf0Encoder, Amf0Value};
use crate::chunk::{BasicHeader, ChunkHeader, MessageHeader};
use crate::protocol::constants::*;
use crate::{ByteBuffer, Result};

/// Server version advertised in the connect response
const FMS_VERSION: &str = "FMS/3,5,7,7009";

/// Message stream id carried by the publish-start onStatus. Not derived
/// from the RTMP spec; matches what FMS is observed to send.
const ON_STATUS_STREAM_ID: u32 = 0x0100_0000;

pub const CODE_CONNECT_SUCCESS: &str = "NetConnection.Connect.Success";
pub const CODE_PUBLISH_START: &str = "NetStream.Publish.Start";
pub const LEVEL_STATUS: &str = "status";

/// An inbound command message: name, transaction id and whatever
/// arguments follow.
///
/// Arguments are kept as raw bytes rather than parsed eagerly; peers
/// with the stray-0xC3 bug (see the connection driver) produce argument
/// bytes that only some commands can safely decode.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub transaction_id: f64,
    rest: Vec<u8>,
}

impl Command {
    /// Parse the command name and transaction id from a payload
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut buffer = ByteBuffer::new(payload.to_vec());
        let mut decoder = Amf0Decoder::new(&mut buffer);
        let name = decoder.read_string()?;
        let transaction_id = decoder.read_double()?;
        let position = buffer.position();
        let rest = buffer.into_vec().split_off(position);
        Ok(Command {
            name,
            transaction_id,
            rest,
        })
    }

    /// Decode the argument values following the transaction id
    pub fn arguments(&self) -> Result<Vec<Amf0Value>> {
        let mut buffer = ByteBuffer::new(self.rest.clone());
        let mut decoder = Amf0Decoder::new(&mut buffer);
        let mut values = Vec::new();
        while decoder.has_remaining() {
            values.push(decoder.decode()?);
        }
        Ok(values)
    }

    /// The stream name argument of FCPublish/publish: a null command
    /// object followed by the name.
    pub fn stream_name(&self) -> Result<String> {
        let mut buffer = ByteBuffer::new(self.rest.clone());
        let mut decoder = Amf0Decoder::new(&mut buffer);
        let _command_object = decoder.decode()?;
        decoder.read_string()
    }
}

fn command_chunk(message_stream_id: u32, payload: Vec<u8>) -> Result<Vec<u8>> {
    let header = ChunkHeader {
        basic: BasicHeader::new(0, CHUNK_STREAM_COMMAND),
        message: MessageHeader {
            message_length: payload.len() as u32,
            message_type_id: MSG_TYPE_COMMAND_AMF0,
            message_stream_id,
            ..Default::default()
        },
    };
    let mut chunk = header.bytes()?;
    chunk.extend_from_slice(&payload);
    Ok(chunk)
}

fn string(value: &str) -> Amf0Value {
    Amf0Value::String(value.to_string())
}

/// `_result` for connect: server properties and a Connect.Success
/// information object.
pub fn connect_result(transaction_id: f64) -> Result<Vec<u8>> {
    let mut properties = HashMap::new();
    properties.insert("fmsVer".to_string(), string(FMS_VERSION));
    properties.insert("capabilities".to_string(), Amf0Value::Number(31.0));
    properties.insert("mode".to_string(), Amf0Value::Number(1.0));

    let mut data = HashMap::new();
    data.insert("version".to_string(), string("3,5,7,7009"));

    let mut information = HashMap::new();
    information.insert("code".to_string(), string(CODE_CONNECT_SUCCESS));
    information.insert("description".to_string(), string("Connection succeeded."));
    information.insert("data".to_string(), Amf0Value::Object(data));
    information.insert("objectEncoding".to_string(), Amf0Value::Number(0.0));
    information.insert("level".to_string(), string(LEVEL_STATUS));

    let mut encoder = Amf0Encoder::new();
    encoder.encode(&string("_result"))?;
    encoder.encode(&Amf0Value::Number(transaction_id))?;
    encoder.encode(&Amf0Value::Object(properties))?;
    encoder.encode(&Amf0Value::Object(information))?;

    command_chunk(0, encoder.into_bytes())
}

/// `onFCPublish` answering FCPublish. The Number(1) between the null
/// and the information object mirrors what FMS-compatible servers send.
pub fn on_fc_publish(transaction_id: f64, stream_name: &str) -> Result<Vec<u8>> {
    let mut information = HashMap::new();
    information.insert("level".to_string(), string(LEVEL_STATUS));
    information.insert("code".to_string(), string(CODE_PUBLISH_START));
    information.insert(
        "description".to_string(),
        Amf0Value::String(format!("FCPublish to stream {}.", stream_name)),
    );

    let mut encoder = Amf0Encoder::new();
    encoder.encode(&string("onFCPublish"))?;
    encoder.encode(&Amf0Value::Number(transaction_id))?;
    encoder.encode(&Amf0Value::Null)?;
    encoder.encode(&Amf0Value::Number(1.0))?;
    encoder.encode(&Amf0Value::Object(information))?;

    command_chunk(0, encoder.into_bytes())
}

/// `_result` for createStream, returning stream id 1.
pub fn create_stream_result(transaction_id: f64) -> Result<Vec<u8>> {
    let mut encoder = Amf0Encoder::new();
    encoder.encode(&string("_result"))?;
    encoder.encode(&Amf0Value::Number(transaction_id))?;
    encoder.encode(&Amf0Value::Null)?;
    encoder.encode(&Amf0Value::Number(1.0))?;

    command_chunk(0, encoder.into_bytes())
}

/// `onStatus` publish-start for the named stream.
pub fn on_status_publish_start(transaction_id: f64, stream_name: &str) -> Result<Vec<u8>> {
    let mut information = HashMap::new();
    information.insert("code".to_string(), string(CODE_PUBLISH_START));
    information.insert(
        "description".to_string(),
        Amf0Value::String(format!("Publishing {}.", stream_name)),
    );
    information.insert("level".to_string(), string(LEVEL_STATUS));

    let mut encoder = Amf0Encoder::new();
    encoder.encode(&string("onStatus"))?;
    encoder.encode(&Amf0Value::Number(transaction_id))?;
    encoder.encode(&Amf0Value::Null)?;
    encoder.encode(&Amf0Value::Object(information))?;

    command_chunk(ON_STATUS_STREAM_ID, encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split a builder's output into its 12-byte header and payload,
    /// checking the header against the expected length and stream id.
    fn split_chunk(chunk: &[u8], message_stream_id: [u8; 4]) -> Vec<u8> {
        assert_eq!(chunk[0], 0x03); // format 0, chunk stream 3
        assert_eq!(&chunk[1..4], &[0x00, 0x00, 0x00]); // timestamp
        let length =
            u32::from_be_bytes([0, chunk[4], chunk[5], chunk[6]]) as usize;
        assert_eq!(chunk[7], MSG_TYPE_COMMAND_AMF0);
        assert_eq!(&chunk[8..12], &message_stream_id); // little endian
        assert_eq!(chunk.len(), 12 + length);
        chunk[12..].to_vec()
    }

    fn parse(payload: Vec<u8>) -> (String, f64, Vec<Amf0Value>) {
        let command = Command::parse(&payload).unwrap();
        let arguments = command.arguments().unwrap();
        (command.name, command.transaction_id, arguments)
    }

    #[test]
    fn test_command_parse_keeps_arguments() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&string("publish")).unwrap();
        encoder.encode(&Amf0Value::Number(5.0)).unwrap();
        encoder.encode(&Amf0Value::Null).unwrap();
        encoder.encode(&string("cam0")).unwrap();
        encoder.encode(&string("live")).unwrap();

        let command = Command::parse(&encoder.into_bytes()).unwrap();
        assert_eq!(command.name, "publish");
        assert_eq!(command.transaction_id, 5.0);
        assert_eq!(command.stream_name().unwrap(), "cam0");
        assert_eq!(command.arguments().unwrap().len(), 3);
    }

    #[test]
    fn test_connect_result_shape() {
        let chunk = connect_result(1.0).unwrap();
        let payload = split_chunk(&chunk, [0x00, 0x00, 0x00, 0x00]);
        let (name, transaction_id, arguments) = parse(payload);

        assert_eq!(name, "_result");
        assert_eq!(transaction_id, 1.0);
        assert_eq!(arguments.len(), 2);

        let properties = &arguments[0];
        assert_eq!(
            properties.get_property("fmsVer").and_then(|v| v.as_string()),
            Some(FMS_VERSION)
        );
        assert_eq!(
            properties.get_property("capabilities").and_then(|v| v.as_number()),
            Some(31.0)
        );

        let information = &arguments[1];
        assert_eq!(
            information.get_property("code").and_then(|v| v.as_string()),
            Some(CODE_CONNECT_SUCCESS)
        );
        assert_eq!(
            information
                .get_property("data")
                .and_then(|v| v.get_property("version"))
                .and_then(|v| v.as_string()),
            Some("3,5,7,7009")
        );
        assert_eq!(
            information.get_property("objectEncoding").and_then(|v| v.as_number()),
            Some(0.0)
        );
    }

    #[test]
    fn test_on_fc_publish_shape() {
        let chunk = on_fc_publish(3.0, "cam0").unwrap();
        let payload = split_chunk(&chunk, [0x00, 0x00, 0x00, 0x00]);
        let (name, transaction_id, arguments) = parse(payload);

        assert_eq!(name, "onFCPublish");
        assert_eq!(transaction_id, 3.0);
        assert_eq!(arguments[0], Amf0Value::Null);
        assert_eq!(arguments[1], Amf0Value::Number(1.0));
        assert_eq!(
            arguments[2].get_property("description").and_then(|v| v.as_string()),
            Some("FCPublish to stream cam0.")
        );
    }

    #[test]
    fn test_create_stream_result_returns_stream_one() {
        let chunk = create_stream_result(4.0).unwrap();
        let payload = split_chunk(&chunk, [0x00, 0x00, 0x00, 0x00]);
        let (name, transaction_id, arguments) = parse(payload);

        assert_eq!(name, "_result");
        assert_eq!(transaction_id, 4.0);
        assert_eq!(arguments, vec![Amf0Value::Null, Amf0Value::Number(1.0)]);
    }

    #[test]
    fn test_on_status_stream_id_and_info() {
        let chunk = on_status_publish_start(5.0, "cam0").unwrap();
        // 0x01000000 little endian
        let payload = split_chunk(&chunk, [0x00, 0x00, 0x00, 0x01]);
        let (name, _, arguments) = parse(payload);

        assert_eq!(name, "onStatus");
        assert_eq!(arguments[0], Amf0Value::Null);
        let information = &arguments[1];
        assert_eq!(
            information.get_property("code").and_then(|v| v.as_string()),
            Some(CODE_PUBLISH_START)
        );
        assert_eq!(
            information.get_property("description").and_then(|v| v.as_string()),
            Some("Publishing cam0.")
        );
        assert_eq!(
            information.get_property("level").and_then(|v| v.as_string()),
            Some(LEVEL_STATUS)
        );
    }
}
