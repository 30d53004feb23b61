use std::collections::HashMap;

use crate::amf::{markers, Amf0Value};
use crate::{ByteBuffer, Error, Result};

/// Serialises [`Amf0Value`]s into a growing buffer.
pub struct Amf0Encoder {
    buffer: ByteBuffer,
}

impl Amf0Encoder {
    pub fn new() -> Self {
        Amf0Encoder {
            buffer: ByteBuffer::with_capacity(256),
        }
    }

    pub fn encode(&mut self, value: &Amf0Value) -> Result<()> {
        match value {
            Amf0Value::Number(n) => self.encode_number(*n),
            Amf0Value::Boolean(b) => self.encode_boolean(*b),
            Amf0Value::String(s) => self.encode_string(s),
            Amf0Value::Object(obj) => self.encode_object(obj),
            Amf0Value::Null => Ok(self.buffer.write_u8(markers::NULL)?),
            Amf0Value::Undefined => Ok(self.buffer.write_u8(markers::UNDEFINED)?),
            Amf0Value::EcmaArray(obj) => self.encode_ecma_array(obj),
            Amf0Value::StrictArray(arr) => self.encode_strict_array(arr),
        }
    }

    /// Consume the encoder, returning the serialised bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_vec()
    }

    fn encode_number(&mut self, value: f64) -> Result<()> {
        self.buffer.write_u8(markers::NUMBER)?;
        self.buffer.write_f64_be(value)?;
        Ok(())
    }

    fn encode_boolean(&mut self, value: bool) -> Result<()> {
        self.buffer.write_u8(markers::BOOLEAN)?;
        self.buffer.write_u8(u8::from(value))?;
        Ok(())
    }

    fn encode_string(&mut self, value: &str) -> Result<()> {
        // Strings above the u16 length limit take the long form
        if value.len() > u16::MAX as usize {
            self.buffer.write_u8(markers::LONG_STRING)?;
            self.buffer.write_u32_be(value.len() as u32)?;
        } else {
            self.buffer.write_u8(markers::STRING)?;
            self.buffer.write_u16_be(value.len() as u16)?;
        }
        self.buffer.write_bytes(value.as_bytes())?;
        Ok(())
    }

    fn encode_object(&mut self, obj: &HashMap<String, Amf0Value>) -> Result<()> {
        self.buffer.write_u8(markers::OBJECT)?;
        self.encode_properties(obj)
    }

    fn encode_ecma_array(&mut self, obj: &HashMap<String, Amf0Value>) -> Result<()> {
        self.buffer.write_u8(markers::ECMA_ARRAY)?;
        self.buffer.write_u32_be(obj.len() as u32)?;
        self.encode_properties(obj)
    }

    fn encode_strict_array(&mut self, arr: &[Amf0Value]) -> Result<()> {
        self.buffer.write_u8(markers::STRICT_ARRAY)?;
        self.buffer.write_u32_be(arr.len() as u32)?;
        for value in arr {
            self.encode(value)?;
        }
        Ok(())
    }

    fn encode_properties(&mut self, obj: &HashMap<String, Amf0Value>) -> Result<()> {
        for (key, value) in obj {
            self.encode_property_name(key)?;
            self.encode(value)?;
        }
        // Empty name followed by the end marker terminates the list
        self.buffer.write_u16_be(0)?;
        self.buffer.write_u8(markers::OBJECT_END)?;
        Ok(())
    }

    /// Object keys are written without a type marker
    fn encode_property_name(&mut self, name: &str) -> Result<()> {
        if name.len() > u16::MAX as usize {
            return Err(Error::amf_encode(format!(
                "property name too long: {} bytes",
                name.len()
            )));
        }
        self.buffer.write_u16_be(name.len() as u16)?;
        self.buffer.write_bytes(name.as_bytes())?;
        Ok(())
    }
}

impl Default for Amf0Encoder {
    fn default() -> Self {
        Amf0Encoder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_string() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::String("_result".to_string())).unwrap();
        assert_eq!(
            encoder.into_bytes(),
            [
                markers::STRING,
                0x00,
                0x07,
                b'_',
                b'r',
                b'e',
                b's',
                b'u',
                b'l',
                b't'
            ]
        );
    }

    #[test]
    fn test_encode_number() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::Number(1.0)).unwrap();
        assert_eq!(
            encoder.into_bytes(),
            [markers::NUMBER, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_null_and_boolean() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::Null).unwrap();
        encoder.encode(&Amf0Value::Boolean(false)).unwrap();
        assert_eq!(encoder.into_bytes(), [markers::NULL, markers::BOOLEAN, 0x00]);
    }

    #[test]
    fn test_empty_object_is_just_terminator() {
        let mut encoder = Amf0Encoder::new();
        encoder.encode(&Amf0Value::Object(HashMap::new())).unwrap();
        assert_eq!(
            encoder.into_bytes(),
            [markers::OBJECT, 0x00, 0x00, markers::OBJECT_END]
        );
    }
}
