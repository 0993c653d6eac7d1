use log::debug;

use crate::{
    command::{command_node::CommandNode, operation::Operation},
    types::Timestamp,
};

/// One item of a peer's local editing history
#[derive(Clone, Debug, PartialEq)]
pub enum HistoryEntry {
    /// Already wrapped for replication
    Native(CommandNode),
    /// Recorded before replication started, with no node wrapper yet
    Raw {
        timestamp: Timestamp,
        operation: Operation,
    },
}

impl HistoryEntry {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            HistoryEntry::Native(node) => node.timestamp(),
            HistoryEntry::Raw { timestamp, .. } => *timestamp,
        }
    }
}

/// A peer's local history in the order it was recorded
#[derive(Clone, Debug, Default)]
pub struct LocalHistory {
    entries: Vec<HistoryEntry>,
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_native(&mut self, node: CommandNode) {
        self.entries.push(HistoryEntry::Native(node));
    }

    pub fn push_raw(&mut self, timestamp: Timestamp, operation: Operation) {
        self.entries.push(HistoryEntry::Raw {
            timestamp,
            operation,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Turns the history into the node sequence a backfill sends.
    ///
    /// Raw entries become childless roots whose timestamps are squeezed in
    /// below the first native command. Native nodes keep their recorded
    /// order, and each synthetic node is placed before the first native node
    /// it does not sort after.
    pub fn prepare_backfill(&self) -> Vec<CommandNode> {
        let ceiling = self.entries.iter().find_map(|entry| match entry {
            HistoryEntry::Native(node) => Some(node.timestamp()),
            HistoryEntry::Raw { .. } => None,
        });

        let raw: Vec<(Timestamp, &Operation)> = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                HistoryEntry::Raw {
                    timestamp,
                    operation,
                } => Some((*timestamp, operation)),
                HistoryEntry::Native(_) => None,
            })
            .collect();
        let raw_timestamps: Vec<Timestamp> = raw.iter().map(|(timestamp, _)| *timestamp).collect();
        let synthetic_timestamps = backfill_timestamps(&raw_timestamps, ceiling);

        let mut synthetic: Vec<CommandNode> = raw
            .into_iter()
            .zip(synthetic_timestamps)
            .map(|((_, operation), timestamp)| CommandNode::root(operation.clone(), timestamp))
            .collect();
        // stable, so raw entries with equal times keep their recorded order
        synthetic.sort_by_key(CommandNode::timestamp);

        let native = self.entries.iter().filter_map(|entry| match entry {
            HistoryEntry::Native(node) => Some(node.clone()),
            HistoryEntry::Raw { .. } => None,
        });

        let mut output = Vec::with_capacity(self.entries.len());
        let mut synthetic = synthetic.into_iter().peekable();
        for node in native {
            while let Some(next) = synthetic.next_if(|next| next.timestamp() <= node.timestamp()) {
                output.push(next);
            }
            output.push(node);
        }
        output.extend(synthetic);

        debug!(
            "Prepared {} history items for backfill ({} synthesized)",
            output.len(),
            raw_timestamps.len()
        );

        output
    }
}

/// Maps raw history timestamps onto `[0, ceiling)`, keeping their relative
/// order, so replayed raw items sort strictly before the first native
/// command.
///
/// With no ceiling the timestamps are only rebased to start at zero. A zero
/// span collapses every item to zero, as does a ceiling of zero.
pub fn backfill_timestamps(raw_timestamps: &[Timestamp], ceiling: Option<Timestamp>) -> Vec<Timestamp> {
    let (Some(earliest), Some(latest)) = (
        raw_timestamps.iter().min().copied(),
        raw_timestamps.iter().max().copied(),
    ) else {
        return Vec::new();
    };
    let total_span = latest - earliest;

    raw_timestamps
        .iter()
        .map(|timestamp| {
            let relative = timestamp - earliest;
            let Some(ceiling) = ceiling else {
                return relative;
            };
            if total_span == 0 {
                return 0;
            }
            let top = ceiling.saturating_sub(1);
            let scaled = (relative as u128 * top as u128) / total_span as u128;
            // scaled never exceeds top since relative <= total_span
            (scaled as u64).min(top)
        })
        .collect()
}
