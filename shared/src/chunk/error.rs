use thiserror::Error;

use crate::ids::StreamId;

/// Errors that can occur while splitting or reassembling chunked payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The splitter was configured with a frame size of zero
    #[error("Invalid chunk frame size {max_frame_size}. Frames must carry at least one byte")]
    InvalidFrameSize {
        max_frame_size: usize,
    },

    /// Payload length does not fit the 32-bit length field
    #[error("Payload of {payload_size} bytes exceeds the 32-bit chunk length field")]
    PayloadTooLarge {
        payload_size: usize,
    },

    /// Splitting the payload would produce too many frames
    #[error("Chunk frame limit of {limit} exceeded. Splitting would produce {frames} frames. Consider breaking the data into smaller payloads")]
    FrameLimitExceeded {
        limit: usize,
        frames: usize,
    },

    /// The begin frame header is larger than allowed
    #[error("Chunk header of {header_size} bytes exceeds the limit of {limit} bytes")]
    HeaderTooLarge {
        header_size: usize,
        limit: usize,
    },

    /// A continue/complete frame arrived for a stream that was never begun
    #[error("Received chunk frame for unknown stream {stream_id}. The begin frame was lost or the stream was already discarded")]
    UnknownStream {
        stream_id: StreamId,
    },

    /// A begin frame did not start at offset zero
    #[error("Begin frame for stream {stream_id} has offset {offset}. Begin frames must start at offset 0")]
    InvalidBeginOffset {
        stream_id: StreamId,
        offset: u32,
    },

    /// A frame declared a different total length than the stream's begin frame
    #[error("Chunk frame for stream {stream_id} declares total length {received}, but the stream began with {declared}. Partial stream discarded")]
    LengthMismatch {
        stream_id: StreamId,
        declared: u32,
        received: u32,
    },

    /// A frame's slice reaches past the declared total length
    #[error("Chunk frame for stream {stream_id} covers bytes {offset}..{end} beyond total length {total_length}. Partial stream discarded")]
    FrameOutOfBounds {
        stream_id: StreamId,
        offset: u32,
        end: u64,
        total_length: u32,
    },

    /// A frame's slice partly covers bytes an earlier frame already wrote
    #[error("Chunk frame for stream {stream_id} covers bytes {offset}..{end}, overlapping an earlier slice. Partial stream discarded")]
    OverlappingFrame {
        stream_id: StreamId,
        offset: u32,
        end: u64,
    },

    /// A begin frame declared a stream larger than the receiver accepts
    #[error("Chunk stream {stream_id} declares {total_length} bytes, above the receiver limit of {limit} bytes")]
    StreamTooLarge {
        stream_id: StreamId,
        total_length: u32,
        limit: usize,
    },
}
