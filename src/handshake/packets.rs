use crate::{current_timestamp, generate_random_bytes, ByteBuffer, Error, Result};

/// RTMP version the server speaks and answers with
pub const RTMP_VERSION: u8 = 3;

/// Size of the C1/S1/C2/S2 packets
pub const HANDSHAKE_PACKET_SIZE: usize = 1536;

/// Size of the random region of a time/random packet
pub const HANDSHAKE_RANDOM_SIZE: usize = HANDSHAKE_PACKET_SIZE - 8;

fn check_length(data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(Error::IncompleteHandshake {
            got: data.len(),
            expected,
        });
    }
    Ok(())
}

/// Version packet (C0/S0): a single octet carrying the protocol version.
///
/// A server that does not recognise the client's requested version
/// answers with 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C0S0 {
    pub version: u8,
}

impl C0S0 {
    pub fn new() -> Self {
        C0S0 {
            version: RTMP_VERSION,
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        check_length(data, 1)?;
        Ok(C0S0 { version: data[0] })
    }

    pub fn bytes(&self) -> Vec<u8> {
        vec![self.version]
    }
}

impl Default for C0S0 {
    fn default() -> Self {
        C0S0::new()
    }
}

/// Time/random packet (C1/S1): 4-byte big-endian timestamp, 4 zero
/// bytes, then 1528 random octets the peer must echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C1S1 {
    pub timestamp: u32,
    pub random_bytes: Vec<u8>,
}

impl C1S1 {
    pub fn new(timestamp: u32) -> Self {
        C1S1 {
            timestamp,
            random_bytes: generate_random_bytes(HANDSHAKE_RANDOM_SIZE),
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        check_length(data, HANDSHAKE_PACKET_SIZE)?;
        let mut buffer = ByteBuffer::new(data[..HANDSHAKE_PACKET_SIZE].to_vec());
        let timestamp = buffer.read_u32_be()?;
        let _zero = buffer.read_u32_be()?;
        let random_bytes = buffer.read_bytes(HANDSHAKE_RANDOM_SIZE)?;
        Ok(C1S1 {
            timestamp,
            random_bytes,
        })
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut buffer = ByteBuffer::with_capacity(HANDSHAKE_PACKET_SIZE);
        buffer.write_u32_be(self.timestamp).unwrap();
        buffer.write_u32_be(0).unwrap();
        buffer.write_bytes(&self.random_bytes).unwrap();
        buffer.into_vec()
    }
}

/// Echo packet (C2/S2): the peer's timestamp, the local read time, then
/// the peer's 1528 random bytes echoed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C2S2 {
    pub timestamp: u32,
    pub timestamp2: u32,
    pub random_echo: Vec<u8>,
}

impl C2S2 {
    /// Build the echo answering a peer's time/random packet
    pub fn answering(peer: &C1S1) -> Self {
        C2S2 {
            timestamp: peer.timestamp,
            timestamp2: current_timestamp(),
            random_echo: peer.random_bytes.clone(),
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        check_length(data, HANDSHAKE_PACKET_SIZE)?;
        let mut buffer = ByteBuffer::new(data[..HANDSHAKE_PACKET_SIZE].to_vec());
        let timestamp = buffer.read_u32_be()?;
        let timestamp2 = buffer.read_u32_be()?;
        let random_echo = buffer.read_bytes(HANDSHAKE_RANDOM_SIZE)?;
        Ok(C2S2 {
            timestamp,
            timestamp2,
            random_echo,
        })
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut buffer = ByteBuffer::with_capacity(HANDSHAKE_PACKET_SIZE);
        buffer.write_u32_be(self.timestamp).unwrap();
        buffer.write_u32_be(self.timestamp2).unwrap();
        buffer.write_bytes(&self.random_echo).unwrap();
        buffer.into_vec()
    }

    /// Proof the peer round-tripped our time/random packet
    pub fn matches_random(&self, sent: &C1S1) -> bool {
        self.random_echo == sent.random_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s0_is_version_three() {
        assert_eq!(C0S0::new().bytes(), [0x03]);
    }

    #[test]
    fn test_c0s0_parse() {
        let c0 = C0S0::parse(&[0x03]).unwrap();
        assert_eq!(c0.version, 3);

        // Parsing does not reject; the connection driver decides
        let c0 = C0S0::parse(&[0x06]).unwrap();
        assert_eq!(c0.version, 6);

        assert!(matches!(
            C0S0::parse(&[]),
            Err(Error::IncompleteHandshake { got: 0, expected: 1 })
        ));
    }

    #[test]
    fn test_c1s1_layout_and_round_trip() {
        let original = C1S1::new(0);
        let bytes = original.bytes();

        assert_eq!(bytes.len(), HANDSHAKE_PACKET_SIZE);
        assert_eq!(&bytes[0..8], &[0; 8]); // timestamp 0 and the zero field
        assert_eq!(&bytes[8..], &original.random_bytes[..]);

        let parsed = C1S1::parse(&bytes).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_echo_copies_peer_random() {
        let c1 = C1S1::new(42);
        let s2 = C2S2::answering(&c1);

        assert_eq!(s2.timestamp, 42);
        assert_eq!(s2.random_echo, c1.random_bytes);
        assert_eq!(&s2.bytes()[8..], &c1.random_bytes[..]);
    }

    #[test]
    fn test_echo_round_trip() {
        let c1 = C1S1::new(7);
        let s2 = C2S2::answering(&c1);
        let parsed = C2S2::parse(&s2.bytes()).unwrap();
        assert_eq!(parsed, s2);
        assert!(parsed.matches_random(&c1));
    }

    #[test]
    fn test_single_byte_perturbation_fails_echo_check() {
        let s1 = C1S1::new(0);
        let mut echo = C2S2 {
            timestamp: s1.timestamp,
            timestamp2: 0,
            random_echo: s1.random_bytes.clone(),
        };
        assert!(echo.matches_random(&s1));

        echo.random_echo[100] ^= 0x01;
        assert!(!echo.matches_random(&s1));
    }

    #[test]
    fn test_short_packets_rejected() {
        assert!(matches!(
            C1S1::parse(&[0u8; 100]),
            Err(Error::IncompleteHandshake { got: 100, expected: HANDSHAKE_PACKET_SIZE })
        ));
        assert!(matches!(
            C2S2::parse(&[0u8; 1535]),
            Err(Error::IncompleteHandshake { .. })
        ));
    }
}
