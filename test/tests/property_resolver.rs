/// PROPERTY-BASED TESTS: Dependency resolution invariants
///
/// Key invariants:
/// 1. Every node of a complete tree applies exactly once, whatever the
///    arrival order
/// 2. A parent always applies before its children
/// 3. Siblings apply in the order they arrived
/// 4. A subtree whose root never arrives never applies

use std::collections::HashMap;

use proptest::prelude::*;
use strokesync_shared::{CommandId, CommandNode, CommandResolver};
use strokesync_test::{tree_from_parents, RecordingSink};

// Parent index for node i + 1, drawn from 0..=i
fn parents_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<prop::sample::Index>(), 0..max_nodes).prop_map(|indices| {
        indices
            .iter()
            .enumerate()
            .map(|(i, index)| index.index(i + 1))
            .collect()
    })
}

// A tree plus a permutation of its node indices
fn shuffled_tree(max_nodes: usize) -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    parents_strategy(max_nodes).prop_flat_map(|parents| {
        let order: Vec<usize> = (0..=parents.len()).collect();
        (Just(parents), Just(order).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn prop_every_node_applies_once_parent_first((parents, order) in shuffled_tree(40)) {
        let nodes = tree_from_parents(&parents);
        let mut resolver = CommandResolver::new();
        let mut sink = RecordingSink::new();

        let mut applied = 0;
        for index in &order {
            applied += resolver.offer(nodes[*index].clone(), &mut sink);
        }

        prop_assert_eq!(applied, nodes.len());
        prop_assert_eq!(sink.len(), nodes.len());
        prop_assert_eq!(resolver.pending_count(), 0);

        for node in &nodes {
            prop_assert_eq!(sink.count_of(&node.id()), 1);
            if let Some(parent_id) = node.parent_id() {
                prop_assert!(sink.position(&parent_id) < sink.position(&node.id()));
            }
        }
    }

    #[test]
    fn prop_siblings_apply_in_arrival_order((parents, order) in shuffled_tree(40)) {
        let nodes = tree_from_parents(&parents);
        let mut resolver = CommandResolver::new();
        let mut sink = RecordingSink::new();

        let mut arrival: HashMap<CommandId, Vec<CommandId>> = HashMap::new();
        for index in &order {
            let node = &nodes[*index];
            if let Some(parent_id) = node.parent_id() {
                arrival.entry(parent_id).or_default().push(node.id());
            }
            resolver.offer(node.clone(), &mut sink);
        }

        for (parent_id, children) in arrival {
            let mut applied_children: Vec<(usize, CommandId)> = children
                .iter()
                .map(|child| (sink.position(child).unwrap_or(usize::MAX), *child))
                .collect();
            applied_children.sort();
            let applied_order: Vec<CommandId> =
                applied_children.into_iter().map(|(_, id)| id).collect();
            prop_assert_eq!(applied_order, children, "children of {:?}", parent_id);
        }
    }

    #[test]
    fn prop_missing_root_blocks_whole_tree((parents, order) in shuffled_tree(20)) {
        let nodes = tree_from_parents(&parents);
        let mut resolver = CommandResolver::new();
        let mut sink = RecordingSink::new();

        for index in order.iter().filter(|index| **index != 0) {
            resolver.offer(nodes[*index].clone(), &mut sink);
        }

        prop_assert!(sink.is_empty());
        prop_assert_eq!(resolver.pending_count(), nodes.len() - 1);
        prop_assert_eq!(resolver.teardown(), nodes.len() - 1);
        prop_assert_eq!(resolver.pending_count(), 0);
    }

    #[test]
    fn prop_redelivery_is_harmless((parents, order) in shuffled_tree(20)) {
        let nodes = tree_from_parents(&parents);
        let mut resolver = CommandResolver::new();
        let mut sink = RecordingSink::new();

        for index in order.iter().chain(order.iter()) {
            resolver.offer(nodes[*index].clone(), &mut sink);
        }

        prop_assert_eq!(sink.len(), nodes.len());
        for node in &nodes {
            prop_assert!(resolver.is_applied(&node.id()));
        }
    }
}

#[test]
fn orphan_never_applies_and_is_dropped_at_teardown() {
    let nodes = tree_from_parents(&[0, 0]);
    let orphan = CommandNode::new(
        CommandId::generate(),
        Some(CommandId::generate()),
        0,
        9,
        strokesync_test::compound("orphan"),
    );

    let mut resolver = CommandResolver::new();
    let mut sink = RecordingSink::new();
    resolver.offer(orphan.clone(), &mut sink);
    for node in &nodes {
        resolver.offer(node.clone(), &mut sink);
    }

    assert_eq!(sink.len(), 3);
    assert_eq!(sink.position(&orphan.id()), None);
    assert!(resolver.is_pending(&orphan.id()));
    assert_eq!(resolver.teardown(), 1);
    assert!(!resolver.is_pending(&orphan.id()));
}
