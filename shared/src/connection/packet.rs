use strokesync_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{
    chunk::chunk_frame::ChunkFrame, connection::packet_type::PacketType, ids::BatchId,
};

/// Everything that goes over the transport is one of these
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    Command(Box<[u8]>),
    Chunk(ChunkFrame),
    Ack(BatchId),
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Command(_) => PacketType::Command,
            Packet::Chunk(_) => PacketType::Chunk,
            Packet::Ack(_) => PacketType::Ack,
        }
    }

    pub fn to_bytes(&self) -> Box<[u8]> {
        let mut writer = BitWriter::new();
        self.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = BitReader::new(bytes);
        Self::de(&mut reader)
    }
}

impl Serde for Packet {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.packet_type().ser(writer);
        match self {
            Packet::Command(bytes) => bytes.ser(writer),
            Packet::Chunk(frame) => frame.ser(writer),
            Packet::Ack(batch_id) => batch_id.ser(writer),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match PacketType::de(reader)? {
            PacketType::Command => Ok(Packet::Command(Box::<[u8]>::de(reader)?)),
            PacketType::Chunk => Ok(Packet::Chunk(ChunkFrame::de(reader)?)),
            PacketType::Ack => Ok(Packet::Ack(BatchId::de(reader)?)),
        }
    }
}

/// What a reassembled chunk stream contains, carried in the begin frame's
/// header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// A single command node too large for one frame
    Command,
    /// A compressed `HistoryBatch`
    HistoryBatch,
}

impl PayloadKind {
    pub fn to_header(self) -> [u8; 1] {
        match self {
            PayloadKind::Command => [0],
            PayloadKind::HistoryBatch => [1],
        }
    }

    pub fn from_header(header: &[u8]) -> Option<Self> {
        match header {
            [0] => Some(PayloadKind::Command),
            [1] => Some(PayloadKind::HistoryBatch),
            _ => None,
        }
    }
}
