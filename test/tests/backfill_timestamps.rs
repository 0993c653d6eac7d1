/// BACKFILL TIMESTAMP TESTS
///
/// Raw history recorded before replication gets synthetic timestamps that
/// keep its order and land strictly below the first native command.

use proptest::prelude::*;
use strokesync_shared::{backfill_timestamps, CommandNode, LocalHistory};
use strokesync_test::compound;

#[test]
fn scales_into_the_native_ceiling() {
    assert_eq!(backfill_timestamps(&[0, 50, 100], Some(10)), vec![0, 4, 9]);
}

#[test]
fn keeps_input_order() {
    assert_eq!(
        backfill_timestamps(&[1_100, 1_000, 1_050], Some(101)),
        vec![100, 0, 50]
    );
}

#[test]
fn no_ceiling_rebases_to_zero() {
    assert_eq!(backfill_timestamps(&[500, 700, 600], None), vec![0, 200, 100]);
}

#[test]
fn zero_span_collapses_to_zero() {
    assert_eq!(backfill_timestamps(&[42, 42, 42], Some(1_000)), vec![0, 0, 0]);
}

#[test]
fn empty_input() {
    assert!(backfill_timestamps(&[], Some(10)).is_empty());
}

#[test]
fn prepared_backfill_puts_raw_items_first() {
    let mut history = LocalHistory::new();
    history.push_raw(10, compound("raw"));
    let native_stroke = CommandNode::root(compound("native"), 5_000);
    history.push_native(native_stroke.clone());
    history.push_raw(20, compound("raw"));

    let prepared = history.prepare_backfill();

    assert_eq!(prepared.len(), 3);
    assert_eq!(prepared[2].id(), native_stroke.id());
    assert!(prepared[0].timestamp() < prepared[1].timestamp());
    assert!(prepared[1].timestamp() < native_stroke.timestamp());
    assert!(prepared.iter().all(|node| node.parent_id().is_none()));
}

proptest! {
    #[test]
    fn prop_order_is_preserved(
        raw in prop::collection::vec(0u64..1_000_000_000, 1..64),
        ceiling in 1u64..1_000_000,
    ) {
        let mapped = backfill_timestamps(&raw, Some(ceiling));
        prop_assert_eq!(mapped.len(), raw.len());
        for i in 0..raw.len() {
            for j in 0..raw.len() {
                if raw[i] < raw[j] {
                    prop_assert!(mapped[i] <= mapped[j]);
                }
                if raw[i] == raw[j] {
                    prop_assert_eq!(mapped[i], mapped[j]);
                }
            }
        }
    }

    #[test]
    fn prop_stays_below_ceiling(
        raw in prop::collection::vec(any::<u64>(), 1..64),
        ceiling in 1u64..u64::MAX,
    ) {
        let mapped = backfill_timestamps(&raw, Some(ceiling));
        prop_assert!(mapped.iter().all(|timestamp| *timestamp < ceiling));
        prop_assert_eq!(mapped.iter().min().copied(), Some(0));
    }
}
