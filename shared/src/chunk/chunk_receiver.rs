use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
};

use log::{debug, warn};

use crate::{
    chunk::{chunk_frame::ChunkFrame, error::ChunkError},
    ids::StreamId,
};

/// A chunked payload whose every byte has arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPayload {
    pub stream_id: StreamId,
    pub header: Box<[u8]>,
    pub payload: Vec<u8>,
}

enum Coverage {
    New,
    Repeat,
    Overlap,
}

struct ChunkStream {
    total_length: u32,
    header: Box<[u8]>,
    buffer: Vec<u8>,
    // start -> end of every slice written so far, never overlapping
    received: BTreeMap<u32, u32>,
    received_bytes: u64,
    high_water_mark: u64,
}

impl ChunkStream {
    fn new(total_length: u32, header: Box<[u8]>) -> Self {
        Self {
            total_length,
            header,
            buffer: vec![0; total_length as usize],
            received: BTreeMap::new(),
            received_bytes: 0,
            high_water_mark: 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.received_bytes == self.total_length as u64
    }

    // Records `start..end` unless it touches bytes already written
    fn cover(&mut self, start: u32, end: u32) -> Coverage {
        if let Some((&before, &before_end)) = self.received.range(..=start).next_back() {
            if before == start && before_end == end {
                return Coverage::Repeat;
            }
            if before_end > start {
                return Coverage::Overlap;
            }
        }
        let after = self
            .received
            .range((Bound::Excluded(start), Bound::Unbounded))
            .next();
        if let Some((&after, _)) = after {
            if after < end {
                return Coverage::Overlap;
            }
        }
        self.received.insert(start, end);
        Coverage::New
    }
}

/// Reassembles chunk streams from one remote source
pub struct ChunkReceiver {
    streams: HashMap<StreamId, ChunkStream>,
    max_stream_bytes: usize,
}

impl ChunkReceiver {
    pub fn new(max_stream_bytes: usize) -> Self {
        Self {
            streams: HashMap::new(),
            max_stream_bytes,
        }
    }

    /// Accumulate a frame into its stream.
    ///
    /// Returns Ok(None) while bytes are still missing, Ok(Some(...)) once the
    /// stream is complete, or Err if the frame breaks the protocol. On error
    /// the partial stream is discarded.
    pub fn receive(&mut self, frame: ChunkFrame) -> Result<Option<AssembledPayload>, ChunkError> {
        let stream_id = frame.stream_id;

        if frame.is_begin() {
            if self.streams.contains_key(&stream_id) {
                warn!("Ignoring duplicate begin frame for chunk stream {:?}", stream_id);
                return Ok(None);
            }
            if frame.offset != 0 {
                return Err(ChunkError::InvalidBeginOffset {
                    stream_id,
                    offset: frame.offset,
                });
            }
            if frame.total_length as usize > self.max_stream_bytes {
                return Err(ChunkError::StreamTooLarge {
                    stream_id,
                    total_length: frame.total_length,
                    limit: self.max_stream_bytes,
                });
            }
            self.streams.insert(
                stream_id,
                ChunkStream::new(frame.total_length, frame.header.clone()),
            );
        }

        let Some(stream) = self.streams.get_mut(&stream_id) else {
            return Err(ChunkError::UnknownStream { stream_id });
        };

        if frame.total_length != stream.total_length {
            let declared = stream.total_length;
            self.streams.remove(&stream_id);
            return Err(ChunkError::LengthMismatch {
                stream_id,
                declared,
                received: frame.total_length,
            });
        }

        let end = frame.end();
        if end > stream.total_length as u64 {
            let total_length = stream.total_length;
            self.streams.remove(&stream_id);
            return Err(ChunkError::FrameOutOfBounds {
                stream_id,
                offset: frame.offset,
                end,
                total_length,
            });
        }

        // end fits in u32 once bounded by total_length
        if !frame.data.is_empty() {
            match stream.cover(frame.offset, end as u32) {
                Coverage::New => {}
                Coverage::Repeat => {
                    warn!(
                        "Ignoring repeated chunk at offset {} of stream {:?}",
                        frame.offset, stream_id
                    );
                    return Ok(None);
                }
                Coverage::Overlap => {
                    self.streams.remove(&stream_id);
                    return Err(ChunkError::OverlappingFrame {
                        stream_id,
                        offset: frame.offset,
                        end,
                    });
                }
            }

            let start = frame.offset as usize;
            stream.buffer[start..start + frame.data.len()].copy_from_slice(&frame.data);
            stream.received_bytes += frame.data.len() as u64;
            stream.high_water_mark = stream.high_water_mark.max(end);
        }

        if !stream.is_complete() {
            return Ok(None);
        }

        // we have received all bytes! hand the payload over
        let Some(stream) = self.streams.remove(&stream_id) else {
            return Ok(None);
        };
        debug!(
            "Reassembled chunk stream {:?} ({} bytes)",
            stream_id, stream.total_length
        );
        Ok(Some(AssembledPayload {
            stream_id,
            header: stream.header,
            payload: stream.buffer,
        }))
    }

    /// Number of streams still waiting on bytes
    pub fn open_streams(&self) -> usize {
        self.streams.len()
    }

    /// Highest byte offset seen so far on an open stream
    pub fn high_water_mark(&self, stream_id: &StreamId) -> Option<u64> {
        self.streams
            .get(stream_id)
            .map(|stream| stream.high_water_mark)
    }

    /// Drop every partial stream, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.streams.len();
        self.streams.clear();
        count
    }
}
