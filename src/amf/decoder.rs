use std::collections::HashMap;

use crate::amf::{markers, Amf0Value};
use crate::{ByteBuffer, Error, Result};

/// Streaming AMF0 reader over a [`ByteBuffer`].
///
/// Command dispatch only needs the first two values (name and
/// transaction id); [`read_string`](Amf0Decoder::read_string) and
/// [`read_double`](Amf0Decoder::read_double) read those without paying
/// for a full value parse, while [`decode`](Amf0Decoder::decode) handles
/// everything else.
pub struct Amf0Decoder<'a> {
    buffer: &'a mut ByteBuffer,
}

impl<'a> Amf0Decoder<'a> {
    pub fn new(buffer: &'a mut ByteBuffer) -> Self {
        Amf0Decoder { buffer }
    }

    /// Check if decoder has remaining data to decode
    pub fn has_remaining(&self) -> bool {
        self.buffer.remaining() > 0
    }

    /// Read a value that must be a string
    pub fn read_string(&mut self) -> Result<String> {
        let marker = self.buffer.read_u8()?;
        match marker {
            markers::STRING => self.decode_short_string(),
            markers::LONG_STRING => self.decode_long_string(),
            _ => Err(Error::amf_decode(format!(
                "expected string, got marker 0x{:02x}",
                marker
            ))),
        }
    }

    /// Read a value that must be a number
    pub fn read_double(&mut self) -> Result<f64> {
        let marker = self.buffer.read_u8()?;
        if marker != markers::NUMBER {
            return Err(Error::amf_decode(format!(
                "expected number, got marker 0x{:02x}",
                marker
            )));
        }
        Ok(self.buffer.read_f64_be()?)
    }

    /// Read the next value, whatever its type
    pub fn decode(&mut self) -> Result<Amf0Value> {
        let marker = self.buffer.read_u8()?;
        match marker {
            markers::NUMBER => Ok(Amf0Value::Number(self.buffer.read_f64_be()?)),
            markers::BOOLEAN => Ok(Amf0Value::Boolean(self.buffer.read_u8()? != 0)),
            markers::STRING => Ok(Amf0Value::String(self.decode_short_string()?)),
            markers::OBJECT => Ok(Amf0Value::Object(self.decode_properties()?)),
            markers::NULL => Ok(Amf0Value::Null),
            markers::UNDEFINED => Ok(Amf0Value::Undefined),
            markers::ECMA_ARRAY => self.decode_ecma_array(),
            markers::STRICT_ARRAY => self.decode_strict_array(),
            markers::LONG_STRING => Ok(Amf0Value::String(self.decode_long_string()?)),
            markers::AVMPLUS_OBJECT => {
                Err(Error::amf_decode("AMF3 value in AMF0 stream is not supported"))
            }
            _ => Err(Error::amf_decode(format!("unknown AMF0 marker: 0x{:02x}", marker))),
        }
    }

    fn decode_short_string(&mut self) -> Result<String> {
        let len = self.buffer.read_u16_be()? as usize;
        let bytes = self.buffer.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::amf_decode(format!("invalid UTF-8 in string: {}", e)))
    }

    fn decode_long_string(&mut self) -> Result<String> {
        let len = self.buffer.read_u32_be()? as usize;
        let bytes = self.buffer.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::amf_decode(format!("invalid UTF-8 in long string: {}", e)))
    }

    /// Property list shared by objects and ECMA arrays: repeated
    /// name/value pairs until the empty-name object-end marker.
    fn decode_properties(&mut self) -> Result<HashMap<String, Amf0Value>> {
        let mut object = HashMap::new();
        loop {
            let name_len = self.buffer.read_u16_be()? as usize;
            if name_len == 0 {
                let end = self.buffer.read_u8()?;
                if end != markers::OBJECT_END {
                    return Err(Error::amf_decode(format!(
                        "expected object end, got marker 0x{:02x}",
                        end
                    )));
                }
                break;
            }
            let name = String::from_utf8(self.buffer.read_bytes(name_len)?)
                .map_err(|e| Error::amf_decode(format!("invalid UTF-8 in property name: {}", e)))?;
            let value = self.decode()?;
            object.insert(name, value);
        }
        Ok(object)
    }

    fn decode_ecma_array(&mut self) -> Result<Amf0Value> {
        let _count = self.buffer.read_u32_be()?; // advisory, pairs are terminated
        Ok(Amf0Value::EcmaArray(self.decode_properties()?))
    }

    fn decode_strict_array(&mut self) -> Result<Amf0Value> {
        let count = self.buffer.read_u32_be()? as usize;
        let mut array = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            array.push(self.decode()?);
        }
        Ok(Amf0Value::StrictArray(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::Amf0Encoder;

    fn decode_all(bytes: Vec<u8>) -> Vec<Amf0Value> {
        let mut buffer = ByteBuffer::new(bytes);
        let mut decoder = Amf0Decoder::new(&mut buffer);
        let mut values = Vec::new();
        while decoder.has_remaining() {
            values.push(decoder.decode().unwrap());
        }
        values
    }

    #[test]
    fn test_decode_scalars() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::String("connect".to_string())).unwrap();
        encoder.encode(&Amf0Value::Number(1.0)).unwrap();
        encoder.encode(&Amf0Value::Boolean(true)).unwrap();
        encoder.encode(&Amf0Value::Null).unwrap();

        let values = decode_all(encoder.into_bytes());
        assert_eq!(values[0], Amf0Value::String("connect".to_string()));
        assert_eq!(values[1], Amf0Value::Number(1.0));
        assert_eq!(values[2], Amf0Value::Boolean(true));
        assert_eq!(values[3], Amf0Value::Null);
    }

    #[test]
    fn test_decode_object_round_trip() {
        let mut obj = HashMap::new();
        obj.insert("app".to_string(), Amf0Value::String("live".to_string()));
        obj.insert("objectEncoding".to_string(), Amf0Value::Number(0.0));
        let original = Amf0Value::Object(obj);

        let mut encoder = Amf0Encoder::new();
        encoder.encode(&original).unwrap();

        let values = decode_all(encoder.into_bytes());
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], original);
    }

    #[test]
    fn test_read_string_and_double() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::String("publish".to_string())).unwrap();
        encoder.encode(&Amf0Value::Number(5.0)).unwrap();

        let mut buffer = ByteBuffer::new(encoder.into_bytes());
        let mut decoder = Amf0Decoder::new(&mut buffer);
        assert_eq!(decoder.read_string().unwrap(), "publish");
        assert_eq!(decoder.read_double().unwrap(), 5.0);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_read_string_rejects_number() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::Number(2.0)).unwrap();

        let mut buffer = ByteBuffer::new(encoder.into_bytes());
        let mut decoder = Amf0Decoder::new(&mut buffer);
        assert!(matches!(decoder.read_string(), Err(Error::AmfDecode(_))));
    }

    #[test]
    fn test_amf3_marker_rejected() {
        let mut buffer = ByteBuffer::new(vec![markers::AVMPLUS_OBJECT, 0x00]);
        let mut decoder = Amf0Decoder::new(&mut buffer);
        assert!(decoder.decode().is_err());
    }

    #[test]
    fn test_truncated_string_fails() {
        // Declared length 10, only 3 bytes present
        let mut buffer = ByteBuffer::new(vec![markers::STRING, 0x00, 0x0A, b'a', b'b', b'c']);
        let mut decoder = Amf0Decoder::new(&mut buffer);
        assert!(decoder.decode().is_err());
    }
}
