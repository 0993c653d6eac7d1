/// RELIABILITY MODE TESTS: every backfill batch waits for the receiver's
/// acknowledgement before the next one goes out

use std::time::Duration;

use strokesync_shared::{
    AckConfig, CommandNode, LocalHistory, ReplicationConfig, SyncAbortReason, SyncAbortedEvent,
    SyncCompleteEvent, SyncConfig,
};
use strokesync_test::{compound, init_logger, TestSession};

fn reliable_config() -> ReplicationConfig {
    ReplicationConfig {
        sync: SyncConfig {
            reliability: Some(AckConfig {
                poll_interval: Duration::from_millis(100),
                resend_interval: Duration::from_secs(5),
                ack_timeout: Duration::from_secs(1),
            }),
            ..SyncConfig::default()
        },
        ..ReplicationConfig::default()
    }
}

fn history_of(count: usize) -> LocalHistory {
    let mut history = LocalHistory::new();
    for i in 0..count {
        history.push_native(CommandNode::root(compound(&format!("item-{}", i)), i as u64));
    }
    history
}

#[test]
fn next_batch_waits_for_acknowledgement() {
    init_logger();
    let mut session = TestSession::new(reliable_config());
    session.b.muted = true;
    session.backfill_a_to_b(&history_of(120));

    session.tick(Duration::from_millis(100));
    assert_eq!(session.b.sink.len(), 60);
    let batch_id = session
        .a
        .replicator
        .active_backfill()
        .and_then(|backfill| backfill.awaiting_batch())
        .expect("first batch should be awaiting its ack");
    assert!(session.a.replicator.awaiting_ack(session.b.id, &batch_id));

    for _ in 0..5 {
        session.tick(Duration::from_millis(100));
    }
    // b applied and acknowledged, but the ack is held back
    assert_eq!(session.b.sink.len(), 60);
    assert_eq!(session.b.transport.pending(), 1);

    session.b.muted = false;
    session.deliver();
    assert!(!session.a.replicator.awaiting_ack(session.b.id, &batch_id));

    session.tick(Duration::from_millis(100));
    assert_eq!(session.b.sink.len(), 120);

    // the final batch also needs its ack before the session completes
    assert!(session.a.replicator.active_backfill().is_some());
    session.run_backfill(Duration::from_millis(100), 5);

    let mut events = session.a.replicator.take_events();
    assert_eq!(events.read::<SyncCompleteEvent>().count(), 1);
    assert!(!events.has::<SyncAbortedEvent>());
}

#[test]
fn missing_acknowledgement_times_out() {
    let mut session = TestSession::new(reliable_config());
    session.b.muted = true;
    session.backfill_a_to_b(&history_of(200));

    session.tick(Duration::from_millis(100));
    assert_eq!(session.b.sink.len(), 60);

    for _ in 0..9 {
        session.tick(Duration::from_millis(100));
    }
    assert!(session.a.replicator.active_backfill().is_some());

    session.tick(Duration::from_millis(100));
    assert!(session.a.replicator.active_backfill().is_none());
    assert_eq!(session.b.sink.len(), 60);

    let mut events = session.a.replicator.take_events();
    assert_eq!(
        events.read::<SyncAbortedEvent>().collect::<Vec<_>>(),
        vec![(session.b.id, SyncAbortReason::AckTimeout)]
    );
    assert_eq!(events.read::<SyncCompleteEvent>().count(), 0);
}

#[test]
fn lost_frame_is_recovered_by_resend() {
    init_logger();
    let mut config = ReplicationConfig {
        max_frame_size: 64,
        ..reliable_config()
    };
    if let Some(ack_config) = config.sync.reliability.as_mut() {
        ack_config.resend_interval = Duration::from_millis(300);
    }
    let mut session = TestSession::new(config);
    session.backfill_a_to_b(&history_of(10));

    // the first attempt loses one of its frames
    session.now.add_duration(Duration::from_millis(100));
    session
        .a
        .replicator
        .update(&session.now, &mut session.a.transport, &mut session.a.sink);
    let mut frames = session.a.transport.drain();
    assert!(frames.len() > 1);
    frames.remove(1);
    for (_, bytes) in frames {
        session
            .b
            .replicator
            .receive_frame(session.a.id, &bytes, &mut session.b.sink, &mut session.b.transport)
            .expect("receive_frame failed");
    }
    assert!(session.b.sink.is_empty());

    // resent at 400ms, acknowledged at the 500ms poll
    let ticks = session.run_backfill(Duration::from_millis(100), 9);
    assert_eq!(ticks, 4);
    assert_eq!(session.b.sink.len(), 10);
    assert_eq!(session.b.transport.frames_sent(), 1);

    let mut events = session.a.replicator.take_events();
    assert_eq!(events.read::<SyncCompleteEvent>().count(), 1);
    assert!(!events.has::<SyncAbortedEvent>());
}

#[test]
fn prompt_acknowledgements_keep_the_pace() {
    let mut session = TestSession::new(reliable_config());
    session.backfill_a_to_b(&history_of(180));

    // one batch per poll interval
    let ticks = session.run_backfill(Duration::from_millis(100), 20);
    assert_eq!(ticks, 4);
    assert_eq!(session.b.sink.len(), 180);
    assert_eq!(session.b.transport.frames_sent(), 3);
}
