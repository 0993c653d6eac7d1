use log::trace;

use crate::{
    chunk::{
        chunk_frame::{ChunkFrame, ChunkFrameKind},
        error::ChunkError,
    },
    constants::{MAX_CHUNK_HEADER_BYTES, MAX_FRAMES_PER_STREAM},
    ids::StreamId,
};

/// Splits payloads that are too large for a single transport message into
/// a stream of offset-addressed frames
pub struct ChunkSplitter {
    max_frame_size: usize,
}

impl ChunkSplitter {
    pub fn try_new(max_frame_size: usize) -> Result<Self, ChunkError> {
        if max_frame_size == 0 {
            return Err(ChunkError::InvalidFrameSize { max_frame_size });
        }
        Ok(Self { max_frame_size })
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Number of frames a payload of `payload_size` bytes splits into
    pub fn frame_count(&self, payload_size: usize) -> usize {
        payload_size.div_ceil(self.max_frame_size).max(1)
    }

    /// Split `payload` under a fresh stream id. The first frame carries the
    /// total length and `header`; every frame carries at most
    /// `max_frame_size` bytes of payload.
    pub fn split(&self, payload: &[u8], header: &[u8]) -> Result<Vec<ChunkFrame>, ChunkError> {
        let total_length = u32::try_from(payload.len()).map_err(|_| ChunkError::PayloadTooLarge {
            payload_size: payload.len(),
        })?;
        if header.len() > MAX_CHUNK_HEADER_BYTES {
            return Err(ChunkError::HeaderTooLarge {
                header_size: header.len(),
                limit: MAX_CHUNK_HEADER_BYTES,
            });
        }
        let frame_count = self.frame_count(payload.len());
        if frame_count > MAX_FRAMES_PER_STREAM {
            return Err(ChunkError::FrameLimitExceeded {
                limit: MAX_FRAMES_PER_STREAM,
                frames: frame_count,
            });
        }

        let stream_id = StreamId::generate();
        let mut frames = Vec::with_capacity(frame_count);

        if payload.is_empty() {
            frames.push(ChunkFrame {
                kind: ChunkFrameKind::Begin,
                stream_id,
                total_length,
                offset: 0,
                header: header.into(),
                data: Box::new([]),
            });
            return Ok(frames);
        }

        for (index, slice) in payload.chunks(self.max_frame_size).enumerate() {
            let kind = if index == 0 {
                ChunkFrameKind::Begin
            } else if index + 1 == frame_count {
                ChunkFrameKind::Complete
            } else {
                ChunkFrameKind::Continue
            };
            let header: Box<[u8]> = if index == 0 { header.into() } else { Box::new([]) };
            frames.push(ChunkFrame {
                kind,
                stream_id,
                total_length,
                // payload.len() fits u32, so every offset does too
                offset: (index * self.max_frame_size) as u32,
                header,
                data: slice.into(),
            });
        }

        trace!(
            "Split {} bytes into {} frames on stream {:?}",
            payload.len(),
            frames.len(),
            stream_id
        );

        Ok(frames)
    }
}
