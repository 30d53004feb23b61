use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in milliseconds, truncated to 32 bits as the wire
/// timestamp fields require.
pub fn current_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before UNIX epoch")
        .as_millis() as u32
}
