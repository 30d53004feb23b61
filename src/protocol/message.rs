use crate::protocol::constants::*;

/// A complete RTMP message, reassembled from one or more chunks.
#[derive(Debug, Clone)]
pub struct RtmpMessage {
    pub chunk_stream_id: u32,
    pub timestamp: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
    pub payload: Vec<u8>,
}

impl RtmpMessage {
    /// Check if this is an audio message
    pub fn is_audio(&self) -> bool {
        self.message_type_id == MSG_TYPE_AUDIO
    }

    /// Check if this is a video message
    pub fn is_video(&self) -> bool {
        self.message_type_id == MSG_TYPE_VIDEO
    }

    /// Human-readable name of the message type, for logging
    pub fn type_name(&self) -> &'static str {
        match self.message_type_id {
            MSG_TYPE_SET_CHUNK_SIZE => "Set Chunk Size",
            MSG_TYPE_ABORT => "Abort",
            MSG_TYPE_ACK => "Acknowledgement",
            MSG_TYPE_USER_CONTROL => "User Control",
            MSG_TYPE_WINDOW_ACK => "Window Acknowledgement Size",
            MSG_TYPE_SET_PEER_BW => "Set Peer Bandwidth",
            MSG_TYPE_AUDIO => "Audio",
            MSG_TYPE_VIDEO => "Video",
            MSG_TYPE_DATA_AMF3 => "Data (AMF3)",
            MSG_TYPE_SHARED_OBJECT_AMF3 => "Shared Object (AMF3)",
            MSG_TYPE_COMMAND_AMF3 => "Command (AMF3)",
            MSG_TYPE_DATA_AMF0 => "Data (AMF0)",
            MSG_TYPE_SHARED_OBJECT_AMF0 => "Shared Object (AMF0)",
            MSG_TYPE_COMMAND_AMF0 => "Command (AMF0)",
            MSG_TYPE_AGGREGATE => "Aggregate",
            _ => "Unknown",
        }
    }
}
