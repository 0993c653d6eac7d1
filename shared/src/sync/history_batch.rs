use strokesync_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{command::command_node::CommandNode, ids::BatchId};

/// A group of history commands sent as one compressed, chunked transfer
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryBatch {
    pub batch_id: BatchId,
    pub nodes: Vec<CommandNode>,
}

impl HistoryBatch {
    pub fn new(nodes: Vec<CommandNode>) -> Self {
        Self {
            batch_id: BatchId::generate(),
            nodes,
        }
    }

    pub fn to_bytes(&self) -> Box<[u8]> {
        let mut writer = BitWriter::with_capacity(
            self.nodes.iter().map(CommandNode::encoded_len).sum::<usize>() + 32,
        );
        self.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = BitReader::new(bytes);
        Self::de(&mut reader)
    }
}

impl Serde for HistoryBatch {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.batch_id.ser(writer);
        self.nodes.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let batch_id = BatchId::de(reader)?;
        let nodes = Vec::<CommandNode>::de(reader)?;
        Ok(Self { batch_id, nodes })
    }
}
