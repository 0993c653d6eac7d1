use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::{
    command::command_node::CommandNode,
    ids::CommandId,
    resolver::{command_sink::CommandSink, error::ResolverError, pending_set::PendingSet},
};

/// Holds incoming command nodes back until their whole subtree has arrived,
/// then applies the subtree parent first.
///
/// One resolver exists per remote source (peer and stream), so ids only need
/// to be unique within what a single source sends.
#[derive(Default)]
pub struct CommandResolver {
    pending: PendingSet,
    applied: HashSet<CommandId>,
}

impl CommandResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a node and apply whatever it completes.
    ///
    /// Returns how many nodes were applied to `sink` as a result. Duplicate
    /// offers are logged and ignored.
    pub fn offer(&mut self, node: CommandNode, sink: &mut dyn CommandSink) -> usize {
        match self.try_offer(node, sink) {
            Ok(applied) => applied,
            Err(error) => {
                debug!("Ignoring duplicate offer: {}", error);
                0
            }
        }
    }

    /// Like `offer`, but reports a duplicate id as an error
    pub fn try_offer(
        &mut self,
        node: CommandNode,
        sink: &mut dyn CommandSink,
    ) -> Result<usize, ResolverError> {
        offer_into(&mut self.pending, &mut self.applied, node, sink)
    }

    /// Like `try_offer`, but checks and records applied ids in `applied`
    /// instead of the resolver's own set. Resolvers sharing one set never
    /// apply the same id twice between them.
    pub fn try_offer_shared(
        &mut self,
        node: CommandNode,
        sink: &mut dyn CommandSink,
        applied: &mut HashSet<CommandId>,
    ) -> Result<usize, ResolverError> {
        offer_into(&mut self.pending, applied, node, sink)
    }

    /// Apply the subtree rooted at `id` if it is complete. Returns the number
    /// of nodes applied, which is zero if anything is still missing.
    pub fn try_resolve(&mut self, id: &CommandId, sink: &mut dyn CommandSink) -> usize {
        resolve_into(&mut self.pending, &mut self.applied, id, sink)
    }

    /// Drop pending nodes whose ids are in `applied`, returning how many
    /// were dropped
    pub fn discard_applied(&mut self, applied: &HashSet<CommandId>) -> usize {
        let dropped = self.pending.discard_where(|id| applied.contains(id));
        if dropped > 0 {
            debug!("Dropped {} pending commands applied from another stream", dropped);
        }
        dropped
    }

    /// Discard every pending node, returning how many were dropped
    pub fn teardown(&mut self) -> usize {
        let dropped = self.pending.clear();
        if dropped > 0 {
            debug!("Dropped {} unresolved commands", dropped);
        }
        dropped
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &CommandId) -> bool {
        self.pending.contains(id)
    }

    /// Whether `id` was applied through this resolver's own set. Offers made
    /// with `try_offer_shared` are recorded in the caller's set instead.
    pub fn is_applied(&self, id: &CommandId) -> bool {
        self.applied.contains(id)
    }
}

fn offer_into(
    pending: &mut PendingSet,
    applied: &mut HashSet<CommandId>,
    node: CommandNode,
    sink: &mut dyn CommandSink,
) -> Result<usize, ResolverError> {
    let id = node.id();

    if applied.contains(&id) {
        return Err(ResolverError::AlreadyApplied { id });
    }
    if pending.contains(&id) {
        return Err(ResolverError::AlreadyPending { id });
    }

    if let Some(parent_id) = node.parent_id() {
        if applied.contains(&parent_id) {
            warn!(
                "Command {:?} arrived after its parent {:?} was applied, holding it as an orphan",
                id, parent_id
            );
        }
    }

    pending.insert(node);

    if let Some(parent_id) = pending.get(&id).and_then(CommandNode::parent_id) {
        if let Some(parent) = pending.get(&parent_id) {
            let arrived = pending.children_of(&parent_id).len();
            if arrived > parent.expected_child_count() as usize {
                warn!(
                    "Command {:?} declared {} children but {} arrived, it will never resolve",
                    parent_id,
                    parent.expected_child_count(),
                    arrived
                );
            }
        }
    }

    let root = outstanding_root(pending, id);
    Ok(resolve_into(pending, applied, &root, sink))
}

fn resolve_into(
    pending: &mut PendingSet,
    applied: &mut HashSet<CommandId>,
    id: &CommandId,
    sink: &mut dyn CommandSink,
) -> usize {
    if !is_resolvable(pending, id) {
        trace!("Command {:?} is still waiting on its subtree", id);
        return 0;
    }

    let mut count = 0;
    let mut stack = vec![*id];
    while let Some(next) = stack.pop() {
        let Some((mut node, children)) = pending.remove(&next) else {
            continue;
        };
        // reversed so the first-arrived child is applied first
        stack.extend(children.into_iter().rev());
        node.materialize();
        applied.insert(next);
        sink.apply(node);
        count += 1;
    }

    debug!("Applied {} commands rooted at {:?}", count, id);
    count
}

// Top-most arrived ancestor of `id`
fn outstanding_root(pending: &PendingSet, id: CommandId) -> CommandId {
    let mut current = id;
    // bounded by the pending count so a forged cycle cannot spin forever
    for _ in 0..pending.len() {
        let Some(parent_id) = pending.get(&current).and_then(CommandNode::parent_id) else {
            break;
        };
        if !pending.contains(&parent_id) {
            break;
        }
        current = parent_id;
    }
    current
}

fn is_resolvable(pending: &PendingSet, id: &CommandId) -> bool {
    let Some(root) = pending.get(id) else {
        return false;
    };
    if !root.is_root() {
        return false;
    }

    let mut visited = HashSet::new();
    let mut stack = vec![*id];
    while let Some(next) = stack.pop() {
        if !visited.insert(next) {
            return false;
        }
        let Some(node) = pending.get(&next) else {
            return false;
        };
        let children = pending.children_of(&next);
        if children.len() != node.expected_child_count() as usize {
            return false;
        }
        stack.extend_from_slice(children);
    }
    true
}
