use crate::command::command_node::CommandNode;

/// Receives commands once their dependencies are satisfied. Each node is
/// handed over exactly once, already materialized, after its parent.
pub trait CommandSink {
    fn apply(&mut self, node: CommandNode);
}

impl CommandSink for Vec<CommandNode> {
    fn apply(&mut self, node: CommandNode) {
        self.push(node);
    }
}
