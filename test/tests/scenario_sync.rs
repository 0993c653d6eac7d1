/// SCENARIO TESTS: backfill pacing and dependency ordering between two
/// replicators over an in-memory transport

use std::time::Duration;

use strokesync_shared::{
    CommandNode, HistoryEntry, LocalHistory, Packet, ReplicationConfig, SyncCompleteEvent,
    SyncProgressEvent, SyncStartedEvent,
};
use strokesync_test::{compound, init_logger, TestSession};

fn native_history(count: usize) -> LocalHistory {
    let mut history = LocalHistory::new();
    for i in 0..count {
        history.push_native(CommandNode::root(
            compound(&format!("native-{}", i)),
            1_000 + i as u64,
        ));
    }
    history
}

#[test]
fn thousand_commands_go_out_in_seventeen_batches() {
    init_logger();
    let mut session = TestSession::new(ReplicationConfig::default());
    let history = native_history(1000);

    session.backfill_a_to_b(&history);
    let ticks = session.run_backfill(Duration::from_millis(60), 100);

    // one batch per tick, and b acknowledges each batch once
    assert_eq!(ticks, 17);
    assert_eq!(session.b.transport.frames_sent(), 17);
    assert_eq!(session.b.sink.len(), 1000);
    assert_eq!(
        session.b.replicator.peer(session.a.id).unwrap().counters().batches_received,
        17
    );

    let expected: Vec<_> = history
        .entries()
        .iter()
        .map(|entry| match entry {
            HistoryEntry::Native(node) => node.id(),
            HistoryEntry::Raw { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(session.b.sink.ids(), expected);

    let mut events = session.a.replicator.take_events();
    assert_eq!(events.read::<SyncStartedEvent>().count(), 1);
    let progress: Vec<_> = events.read::<SyncProgressEvent>().collect();
    assert_eq!(progress.len(), 1000);
    assert_eq!(progress.last(), Some(&(session.b.id, 1000, 1000)));
    let complete: Vec<_> = events.read::<SyncCompleteEvent>().collect();
    assert_eq!(complete, vec![session.b.id]);
}

#[test]
fn batches_wait_for_the_inter_batch_delay() {
    let mut session = TestSession::new(ReplicationConfig::default());
    session.backfill_a_to_b(&native_history(200));

    session.tick(Duration::ZERO);
    assert_eq!(session.b.sink.len(), 60);

    // the default delay is 50 ms
    session.tick(Duration::from_millis(30));
    assert_eq!(session.b.sink.len(), 60);
    session.tick(Duration::from_millis(20));
    assert_eq!(session.b.sink.len(), 120);
}

#[test]
fn empty_history_completes_on_first_tick() {
    let mut session = TestSession::new(ReplicationConfig::default());
    session.backfill_a_to_b(&LocalHistory::new());
    session.tick(Duration::ZERO);

    assert!(session.a.replicator.active_backfill().is_none());
    assert_eq!(session.a.transport.frames_sent(), 0);
    let mut events = session.a.replicator.take_events();
    assert_eq!(events.read::<SyncCompleteEvent>().count(), 1);
}

#[test]
fn raw_history_is_replayed_before_native_commands() {
    let mut session = TestSession::new(ReplicationConfig::default());
    let mut history = LocalHistory::new();
    history.push_raw(100, compound("early"));
    let native = CommandNode::root(compound("native"), 10);
    history.push_native(native.clone());
    history.push_raw(200, compound("later"));

    session.backfill_a_to_b(&history);
    session.run_backfill(Duration::from_millis(60), 10);

    let applied = session.b.sink.applied();
    assert_eq!(applied.len(), 3);
    assert_eq!(applied[2].id(), native.id());
    assert!(applied[0].timestamp() < applied[1].timestamp());
    assert!(applied[1].timestamp() < native.timestamp());
}

#[test]
fn children_offered_before_root_apply_root_first() {
    let mut session = TestSession::new(ReplicationConfig::default());
    let root = CommandNode::parent(compound("r"), 1, 2);
    let c1 = CommandNode::child_of(&root, compound("c1"), 2);
    let c2 = CommandNode::child_of(&root, compound("c2"), 3);

    session.a.send(&c2);
    session.a.send(&c1);
    session.deliver();
    assert!(session.b.sink.is_empty());

    session.a.send(&root);
    session.deliver();

    // siblings in arrival order
    assert_eq!(session.b.sink.ids(), vec![root.id(), c2.id(), c1.id()]);
}

#[test]
fn children_arriving_in_authoring_order_keep_it() {
    let mut session = TestSession::new(ReplicationConfig::default());
    let root = CommandNode::parent(compound("r"), 1, 2);
    let c1 = CommandNode::child_of(&root, compound("c1"), 2);
    let c2 = CommandNode::child_of(&root, compound("c2"), 3);

    session.a.send(&c1);
    session.a.send(&c2);
    session.a.send(&root);
    session.deliver();

    assert_eq!(session.b.sink.ids(), vec![root.id(), c1.id(), c2.id()]);
}

#[test]
fn backfill_sends_only_chunk_packets() {
    let mut session = TestSession::new(ReplicationConfig::default());
    session.backfill_a_to_b(&native_history(10));
    session.a.replicator.update(
        &session.now,
        &mut session.a.transport,
        &mut session.a.sink,
    );

    let packets = session.a.transport.peek_packets();
    assert!(!packets.is_empty());
    assert!(packets.iter().all(|packet| matches!(packet, Packet::Chunk(_))));
}
