use strokesync_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{command::operation::Operation, ids::CommandId, types::Timestamp};

/// The unit of replication: one editing operation plus its place in the
/// command graph.
///
/// A node declares up front how many direct children it will have. The
/// resolver on the receiving side holds the node back until exactly that many
/// children have arrived and are themselves complete.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandNode {
    id: CommandId,
    parent_id: Option<CommandId>,
    expected_child_count: u32,
    timestamp: Timestamp,
    operation: Operation,
    materialized: bool,
}

impl CommandNode {
    pub fn new(
        id: CommandId,
        parent_id: Option<CommandId>,
        expected_child_count: u32,
        timestamp: Timestamp,
        operation: Operation,
    ) -> Self {
        Self {
            id,
            parent_id,
            expected_child_count,
            timestamp,
            operation,
            materialized: false,
        }
    }

    /// A childless root node with a fresh id
    pub fn root(operation: Operation, timestamp: Timestamp) -> Self {
        Self::new(CommandId::generate(), None, 0, timestamp, operation)
    }

    /// A root node that will be followed by `expected_child_count` children
    pub fn parent(operation: Operation, timestamp: Timestamp, expected_child_count: u32) -> Self {
        Self::new(
            CommandId::generate(),
            None,
            expected_child_count,
            timestamp,
            operation,
        )
    }

    /// A childless node under `parent`
    pub fn child_of(parent: &CommandNode, operation: Operation, timestamp: Timestamp) -> Self {
        Self::new(
            CommandId::generate(),
            Some(parent.id),
            0,
            timestamp,
            operation,
        )
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn parent_id(&self) -> Option<CommandId> {
        self.parent_id
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn expected_child_count(&self) -> u32 {
        self.expected_child_count
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Runs the operation's local materialize step. Only the first call does
    /// any work; returns whether this call ran it.
    pub fn materialize(&mut self) -> bool {
        if self.materialized {
            return false;
        }
        self.operation.materialize();
        self.materialized = true;
        true
    }

    /// Encoded size on the wire, in bytes
    pub fn encoded_len(&self) -> usize {
        (self.bit_length() as usize).div_ceil(8)
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

    fn payload_bytes(&self) -> Box<[u8]> {
        let mut writer = BitWriter::new();
        self.timestamp.ser(&mut writer);
        self.operation.ser(&mut writer);
        writer.to_bytes()
    }
}

// Wire shape: id, parent id (presence bit + id), expected child count,
// then the length-prefixed payload holding timestamp and operation.
impl Serde for CommandNode {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.id.ser(writer);
        self.parent_id.ser(writer);
        self.expected_child_count.ser(writer);
        self.payload_bytes().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let id = CommandId::de(reader)?;
        let parent_id = Option::<CommandId>::de(reader)?;
        let expected_child_count = u32::de(reader)?;
        let payload = Box::<[u8]>::de(reader)?;

        let mut payload_reader = BitReader::new(&payload);
        let timestamp = Timestamp::de(&mut payload_reader)?;
        let operation = Operation::de(&mut payload_reader)?;

        Ok(Self::new(
            id,
            parent_id,
            expected_child_count,
            timestamp,
            operation,
        ))
    }
}
