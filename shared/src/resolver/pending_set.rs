use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{command::command_node::CommandNode, ids::CommandId};

/// Nodes that have arrived but not yet been applied, along with the
/// parent-to-children links between them. Children are kept in arrival
/// order, and a parent does not need to have arrived to collect children.
#[derive(Default)]
pub struct PendingSet {
    nodes: IndexMap<CommandId, CommandNode>,
    children: HashMap<CommandId, Vec<CommandId>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the node and links it under its parent. Returns false and
    /// leaves the set untouched if the id is already present.
    pub fn insert(&mut self, node: CommandNode) -> bool {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return false;
        }
        if let Some(parent_id) = node.parent_id() {
            self.children.entry(parent_id).or_default().push(id);
        }
        self.nodes.insert(id, node);
        true
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &CommandId) -> Option<&CommandNode> {
        self.nodes.get(id)
    }

    /// Ids of the arrived children of `id`, in arrival order
    pub fn children_of(&self, id: &CommandId) -> &[CommandId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes a node and its child links. The node stays listed as a child
    /// of its own parent; callers remove whole subtrees top-down.
    pub fn remove(&mut self, id: &CommandId) -> Option<(CommandNode, Vec<CommandId>)> {
        let node = self.nodes.shift_remove(id)?;
        let children = self.children.remove(id).unwrap_or_default();
        Some((node, children))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pending nodes in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.values()
    }

    /// Removes every node whose id matches, along with the child lists kept
    /// under a matching id. Returns how many nodes were removed.
    pub fn discard_where(&mut self, mut matches: impl FnMut(&CommandId) -> bool) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|id, _| !matches(id));
        self.children.retain(|parent_id, _| !matches(parent_id));
        before - self.nodes.len()
    }

    /// Drops everything, returning how many nodes were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.nodes.len();
        self.nodes.clear();
        self.children.clear();
        count
    }
}
