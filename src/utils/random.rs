use rand::{rng, RngCore};

/// Fill a fresh buffer with unpredictable bytes for the handshake
/// time/random packet.
pub fn generate_random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng().fill_bytes(&mut bytes);
    bytes
}
