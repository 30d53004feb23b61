mod decoder;
mod encoder;

pub use decoder::*;
pub use encoder::*;

use std::collections::HashMap;

/// AMF0 value as used by RTMP command payloads.
///
/// The command flows only ever exchange numbers, booleans, strings,
/// nulls and string-keyed objects; the remaining markers are decoded for
/// tolerance of chatty encoders (FFmpeg sends metadata as ECMA arrays).
/// AMF3 is a different serialisation and is not supported here.
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value {
    Number(f64),                          // 0x00
    Boolean(bool),                        // 0x01
    String(String),                       // 0x02
    Object(HashMap<String, Amf0Value>),   // 0x03
    Null,                                 // 0x05
    Undefined,                            // 0x06
    EcmaArray(HashMap<String, Amf0Value>), // 0x08
    StrictArray(Vec<Amf0Value>),          // 0x0A
}

/// AMF0 type markers
pub mod markers {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const LONG_STRING: u8 = 0x0C;
    pub const AVMPLUS_OBJECT: u8 = 0x11; // AMF3 escape, unsupported
}

impl Amf0Value {
    /// Extract number value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string reference
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract boolean value
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract object reference
    pub fn as_object(&self) -> Option<&HashMap<String, Amf0Value>> {
        match self {
            Amf0Value::Object(obj) | Amf0Value::EcmaArray(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get property from object
    pub fn get_property(&self, key: &str) -> Option<&Amf0Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Check if null or undefined
    pub fn is_null(&self) -> bool {
        matches!(self, Amf0Value::Null | Amf0Value::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let mut obj = HashMap::new();
        obj.insert("app".to_string(), Amf0Value::String("live".to_string()));
        let value = Amf0Value::Object(obj);

        assert_eq!(
            value.get_property("app").and_then(|v| v.as_string()),
            Some("live")
        );
        assert_eq!(value.get_property("missing"), None);
        assert!(Amf0Value::Null.is_null());
        assert!(Amf0Value::Undefined.is_null());
        assert_eq!(Amf0Value::Number(31.0).as_number(), Some(31.0));
    }
}
