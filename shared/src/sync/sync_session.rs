use std::collections::VecDeque;

use crate::{
    backends::Timer, command::command_node::CommandNode, ids::BatchId,
    sync::history_batch::HistoryBatch, types::PeerId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Started,
    Sending,
    Complete,
}

// A dispatched batch kept until the peer acknowledges it
pub(crate) struct AckWait {
    pub batch: HistoryBatch,
    pub poll_timer: Timer,
    pub resend_timer: Timer,
    pub deadline: Timer,
}

/// Backfill progress towards one peer
pub struct SyncSession {
    peer_id: PeerId,
    expected: usize,
    sent: usize,
    state: SyncState,
    pub(crate) remaining: VecDeque<CommandNode>,
    pub(crate) batch: Vec<CommandNode>,
    pub(crate) batch_cost: u32,
    pub(crate) delay_timer: Option<Timer>,
    pub(crate) ack_wait: Option<AckWait>,
}

impl SyncSession {
    pub(crate) fn new(peer_id: PeerId, items: Vec<CommandNode>) -> Self {
        Self {
            peer_id,
            expected: items.len(),
            sent: 0,
            state: SyncState::Started,
            remaining: items.into(),
            batch: Vec::new(),
            batch_cost: 0,
            delay_timer: None,
            ack_wait: None,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Batch id the session is blocked on, in reliability mode
    pub fn awaiting_batch(&self) -> Option<BatchId> {
        self.ack_wait.as_ref().map(|wait| wait.batch.batch_id)
    }

    pub(crate) fn set_state(&mut self, state: SyncState) {
        self.state = state;
    }

    /// Moves the next item into the open batch
    pub(crate) fn take_next(&mut self, cost: u32) -> bool {
        let Some(node) = self.remaining.pop_front() else {
            return false;
        };
        self.batch.push(node);
        self.batch_cost += cost;
        true
    }

    /// Counts `count` more items as handed to the transport
    pub(crate) fn mark_sent(&mut self, count: usize) {
        self.sent += count;
    }

    pub(crate) fn take_batch(&mut self) -> Vec<CommandNode> {
        self.batch_cost = 0;
        std::mem::take(&mut self.batch)
    }
}
