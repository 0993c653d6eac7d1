use strokesync_shared::{CommandId, CommandNode, CommandSink};

/// Records applied commands in apply order
#[derive(Default)]
pub struct RecordingSink {
    applied: Vec<CommandNode>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn applied(&self) -> &[CommandNode] {
        &self.applied
    }

    pub fn ids(&self) -> Vec<CommandId> {
        self.applied.iter().map(CommandNode::id).collect()
    }

    pub fn position(&self, id: &CommandId) -> Option<usize> {
        self.applied.iter().position(|node| node.id() == *id)
    }

    pub fn count_of(&self, id: &CommandId) -> usize {
        self.applied.iter().filter(|node| node.id() == *id).count()
    }
}

impl CommandSink for RecordingSink {
    fn apply(&mut self, node: CommandNode) {
        assert!(node.is_materialized(), "sink received an unmaterialized node");
        self.applied.push(node);
    }
}
