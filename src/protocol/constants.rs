// Message type ids
pub const MSG_TYPE_SET_CHUNK_SIZE: u8 = 1;
pub const MSG_TYPE_ABORT: u8 = 2;
pub const MSG_TYPE_ACK: u8 = 3;
pub const MSG_TYPE_USER_CONTROL: u8 = 4;
pub const MSG_TYPE_WINDOW_ACK: u8 = 5;
pub const MSG_TYPE_SET_PEER_BW: u8 = 6;
pub const MSG_TYPE_AUDIO: u8 = 8;
pub const MSG_TYPE_VIDEO: u8 = 9;
pub const MSG_TYPE_DATA_AMF3: u8 = 15;
pub const MSG_TYPE_SHARED_OBJECT_AMF3: u8 = 16;
pub const MSG_TYPE_COMMAND_AMF3: u8 = 17;
pub const MSG_TYPE_DATA_AMF0: u8 = 18;
pub const MSG_TYPE_SHARED_OBJECT_AMF0: u8 = 19;
pub const MSG_TYPE_COMMAND_AMF0: u8 = 20;
pub const MSG_TYPE_AGGREGATE: u8 = 22;

// Chunk stream ids the server emits on
pub const CHUNK_STREAM_PROTOCOL: u32 = 2;
pub const CHUNK_STREAM_COMMAND: u32 = 3;

// Defaults
pub const DEFAULT_CHUNK_SIZE: u32 = 128;
pub const DEFAULT_WINDOW_ACK_SIZE: u32 = 2_500_000;
pub const DEFAULT_PEER_BANDWIDTH: u32 = 2_500_000;
pub const DEFAULT_OUTGOING_CHUNK_SIZE: u32 = 4096;
