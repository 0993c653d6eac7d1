use strokesync_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use crate::ids::StreamId;

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum ChunkFrameKind {
    // The first frame of a stream. Declares the header and opens the stream.
    Begin,
    // A full-size slice in the middle of a stream
    Continue,
    // The last slice, which may be shorter than the others
    Complete,
}

/// One transport-sized slice of a chunked payload.
///
/// Slices are addressed by byte offset, so once the begin frame has been
/// seen the rest may arrive in any order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkFrame {
    pub kind: ChunkFrameKind,
    pub stream_id: StreamId,
    pub total_length: u32,
    pub offset: u32,
    /// Only carried by `Begin` frames
    pub header: Box<[u8]>,
    pub data: Box<[u8]>,
}

impl ChunkFrame {
    pub fn is_begin(&self) -> bool {
        self.kind == ChunkFrameKind::Begin
    }

    /// Exclusive end offset of this frame's slice
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.data.len() as u64
    }
}

impl Serde for ChunkFrame {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let index: u8 = match self.kind {
            ChunkFrameKind::Begin => 0,
            ChunkFrameKind::Continue => 1,
            ChunkFrameKind::Complete => 2,
        };
        UnsignedInteger::<2>::new(index).ser(writer);
        self.stream_id.ser(writer);
        self.total_length.ser(writer);
        self.offset.ser(writer);
        if self.is_begin() {
            self.header.ser(writer);
        }
        self.data.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let kind = match UnsignedInteger::<2>::de(reader)?.get() {
            0 => ChunkFrameKind::Begin,
            1 => ChunkFrameKind::Continue,
            2 => ChunkFrameKind::Complete,
            _ => return Err(SerdeErr),
        };
        let stream_id = StreamId::de(reader)?;
        let total_length = u32::de(reader)?;
        let offset = u32::de(reader)?;
        let header = if kind == ChunkFrameKind::Begin {
            Box::<[u8]>::de(reader)?
        } else {
            Box::new([])
        };
        let data = Box::<[u8]>::de(reader)?;

        Ok(Self {
            kind,
            stream_id,
            total_length,
            offset,
            header,
            data,
        })
    }
}
