use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::{
    backends::{Instant, Timer},
    command::command_node::CommandNode,
    error::ReplicationError,
    events::{ReplicationEvents, SyncAbortReason},
    ids::BatchId,
    sync::{
        history_batch::HistoryBatch,
        sync_config::SyncConfig,
        sync_session::{AckWait, SyncSession, SyncState},
    },
    types::PeerId,
};

/// Where the scheduler hands finished batches, and how it learns they were
/// consumed
pub trait BatchDispatcher {
    /// Send a batch to `peer_id`. An error aborts the session.
    fn dispatch(&mut self, peer_id: PeerId, batch: HistoryBatch) -> Result<(), ReplicationError>;

    /// Consume an acknowledgement of `batch_id` from `peer_id`, returning
    /// whether one had arrived
    fn take_acknowledgement(&mut self, peer_id: PeerId, batch_id: &BatchId) -> bool;
}

/// Streams a full local history to newly joined peers, one peer at a time,
/// in throttled batches
pub struct SyncScheduler {
    config: SyncConfig,
    max_frame_size: usize,
    active: Option<SyncSession>,
    queue: VecDeque<(PeerId, Vec<CommandNode>)>,
}

impl SyncScheduler {
    pub fn new(config: SyncConfig, max_frame_size: usize) -> Self {
        Self {
            config,
            max_frame_size: max_frame_size.max(1),
            active: None,
            queue: VecDeque::new(),
        }
    }

    /// Queue a backfill of `items` to `peer_id`, starting it right away if
    /// nothing else is in flight
    pub fn request(&mut self, peer_id: PeerId, items: Vec<CommandNode>, events: &mut ReplicationEvents) {
        if self.active.is_none() {
            self.start(peer_id, items, events);
        } else {
            debug!(
                "Queueing backfill of {} items to peer {} behind the active session",
                items.len(),
                peer_id
            );
            self.queue.push_back((peer_id, items));
        }
    }

    /// Abort the active session if it targets `peer_id`, and drop any queued
    /// requests for it
    pub fn cancel(&mut self, peer_id: PeerId, events: &mut ReplicationEvents) {
        let before = self.queue.len();
        self.queue.retain(|(queued_peer, _)| *queued_peer != peer_id);
        let dropped = before - self.queue.len();
        if dropped > 0 {
            debug!("Dropped {} queued backfills for peer {}", dropped, peer_id);
        }

        if self.active_peer() == Some(peer_id) {
            self.abort(SyncAbortReason::Disconnected, events);
        }
    }

    /// Transmission tick
    pub fn update(
        &mut self,
        now: &Instant,
        dispatcher: &mut dyn BatchDispatcher,
        events: &mut ReplicationEvents,
    ) {
        if self.active.is_none() {
            let Some((peer_id, items)) = self.queue.pop_front() else {
                return;
            };
            self.start(peer_id, items, events);
        }

        let max_frame_size = self.max_frame_size;
        let Some(session) = self.active.as_mut() else {
            return;
        };
        let peer_id = session.peer_id();

        // inter-batch delay
        if let Some(timer) = &session.delay_timer {
            if !timer.ringing(now) {
                return;
            }
            session.delay_timer = None;
        }

        // acknowledgement wait
        if let Some(wait) = &mut session.ack_wait {
            let batch_id = wait.batch.batch_id;
            let mut acknowledged = false;
            if wait.poll_timer.ringing(now) {
                wait.poll_timer.reset(now);
                acknowledged = dispatcher.take_acknowledgement(peer_id, &batch_id);
            }
            if !acknowledged {
                if wait.deadline.ringing(now) {
                    warn!(
                        "Peer {} never acknowledged batch {:?}, aborting backfill",
                        peer_id, batch_id
                    );
                    self.abort(SyncAbortReason::AckTimeout, events);
                } else if wait.resend_timer.ringing(now) {
                    wait.resend_timer.reset(now);
                    debug!("Resending unacknowledged batch {:?} to peer {}", batch_id, peer_id);
                    // the dispatcher splits it under a fresh stream id
                    if let Err(error) = dispatcher.dispatch(peer_id, wait.batch.clone()) {
                        warn!("Failed to resend batch to peer {}: {}", peer_id, error);
                        self.abort(SyncAbortReason::DispatchFailed, events);
                    }
                }
                return;
            }
            session.ack_wait = None;
            if session.remaining.is_empty() && session.batch.is_empty() {
                self.complete(events);
                return;
            }
        }

        session.set_state(SyncState::Sending);

        while let Some(next) = session.remaining.front() {
            let cost = frame_cost(next, max_frame_size);
            if !session.batch.is_empty() && session.batch_cost.saturating_add(cost) > self.config.batch_size {
                let batch = session.take_batch();
                if self.dispatch(now, batch, dispatcher, events) {
                    self.arm_delay(now);
                }
                return;
            }
            session.take_next(cost);
        }

        let batch = session.take_batch();
        if !batch.is_empty() {
            if !self.dispatch(now, batch, dispatcher, events) {
                return;
            }
            if self.config.reliability.is_some() {
                // completes once the final batch is acknowledged
                return;
            }
        }
        self.complete(events);
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    pub fn active_peer(&self) -> Option<PeerId> {
        self.active.as_ref().map(SyncSession::peer_id)
    }

    pub fn session(&self) -> Option<&SyncSession> {
        self.active.as_ref()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Frames needed to send `node` at the configured frame size
    pub fn item_cost(&self, node: &CommandNode) -> u32 {
        frame_cost(node, self.max_frame_size)
    }

    fn start(&mut self, peer_id: PeerId, items: Vec<CommandNode>, events: &mut ReplicationEvents) {
        info!("Starting backfill of {} items to peer {}", items.len(), peer_id);
        self.active = Some(SyncSession::new(peer_id, items));
        events.push_sync_started(peer_id);
    }

    // Returns false if the session was aborted
    fn dispatch(
        &mut self,
        now: &Instant,
        batch: Vec<CommandNode>,
        dispatcher: &mut dyn BatchDispatcher,
        events: &mut ReplicationEvents,
    ) -> bool {
        let Some(session) = self.active.as_mut() else {
            return false;
        };
        let peer_id = session.peer_id();
        let batch = HistoryBatch::new(batch);
        let count = batch.nodes.len();
        debug!(
            "Dispatching batch {:?} of {} items to peer {} ({}/{})",
            batch.batch_id,
            count,
            peer_id,
            session.sent() + count,
            session.expected()
        );

        let kept = self.config.reliability.as_ref().map(|_| batch.clone());
        if let Err(error) = dispatcher.dispatch(peer_id, batch) {
            warn!("Failed to dispatch batch to peer {}: {}", peer_id, error);
            self.abort(SyncAbortReason::DispatchFailed, events);
            return false;
        }

        // progress only counts items the dispatcher accepted
        let first = session.sent() + 1;
        session.mark_sent(count);
        for sent in first..=session.sent() {
            events.push_sync_progress(peer_id, sent, session.expected());
        }

        if let (Some(ack_config), Some(batch)) = (&self.config.reliability, kept) {
            session.ack_wait = Some(AckWait {
                batch,
                poll_timer: Timer::new(ack_config.poll_interval, now),
                resend_timer: Timer::new(ack_config.resend_interval, now),
                deadline: Timer::new(ack_config.ack_timeout, now),
            });
        }
        true
    }

    fn arm_delay(&mut self, now: &Instant) {
        if let Some(session) = self.active.as_mut() {
            session.delay_timer = Some(Timer::new(self.config.inter_batch_delay, now));
        }
    }

    fn complete(&mut self, events: &mut ReplicationEvents) {
        let Some(mut session) = self.active.take() else {
            return;
        };
        session.set_state(SyncState::Complete);
        info!(
            "Backfill to peer {} complete ({} items)",
            session.peer_id(),
            session.sent()
        );
        events.push_sync_complete(session.peer_id());
    }

    fn abort(&mut self, reason: SyncAbortReason, events: &mut ReplicationEvents) {
        let Some(session) = self.active.take() else {
            return;
        };
        info!(
            "Backfill to peer {} aborted after {}/{} items: {:?}",
            session.peer_id(),
            session.sent(),
            session.expected(),
            reason
        );
        events.push_sync_aborted(session.peer_id(), reason);
    }
}

fn frame_cost(node: &CommandNode, max_frame_size: usize) -> u32 {
    let frames = node.encoded_len().div_ceil(max_frame_size).max(1);
    u32::try_from(frames).unwrap_or(u32::MAX)
}
