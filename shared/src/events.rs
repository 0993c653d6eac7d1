use std::{mem, vec::IntoIter};

use crate::{error::ReplicationError, types::PeerId};

/// Why a backfill session ended without completing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncAbortReason {
    /// The target peer disconnected mid-session
    Disconnected,
    /// A dispatched batch was never acknowledged within `ack_timeout`
    AckTimeout,
    /// A batch could not be encoded for sending
    DispatchFailed,
}

/// Everything that happened since the last `Replicator::take_events`
pub struct ReplicationEvents {
    connections: Vec<PeerId>,
    disconnections: Vec<(PeerId, usize)>,
    sync_started: Vec<PeerId>,
    sync_progress: Vec<(PeerId, usize, usize)>,
    sync_complete: Vec<PeerId>,
    sync_aborted: Vec<(PeerId, SyncAbortReason)>,
    errors: Vec<(PeerId, ReplicationError)>,
    empty: bool,
}

impl ReplicationEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            sync_started: Vec::new(),
            sync_progress: Vec::new(),
            sync_complete: Vec::new(),
            sync_aborted: Vec::new(),
            errors: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ReplicationEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ReplicationEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, peer_id: PeerId) {
        self.connections.push(peer_id);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, peer_id: PeerId, dropped_commands: usize) {
        self.disconnections.push((peer_id, dropped_commands));
        self.empty = false;
    }

    pub(crate) fn push_sync_started(&mut self, peer_id: PeerId) {
        self.sync_started.push(peer_id);
        self.empty = false;
    }

    pub(crate) fn push_sync_progress(&mut self, peer_id: PeerId, sent: usize, expected: usize) {
        self.sync_progress.push((peer_id, sent, expected));
        self.empty = false;
    }

    pub(crate) fn push_sync_complete(&mut self, peer_id: PeerId) {
        self.sync_complete.push(peer_id);
        self.empty = false;
    }

    pub(crate) fn push_sync_aborted(&mut self, peer_id: PeerId, reason: SyncAbortReason) {
        self.sync_aborted.push((peer_id, reason));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, peer_id: PeerId, error: ReplicationError) {
        self.errors.push((peer_id, error));
        self.empty = false;
    }
}

impl Default for ReplicationEvents {
    fn default() -> Self {
        Self::new()
    }
}

// Event Trait
pub trait ReplicationEvent {
    type Iter;

    fn iter(events: &mut ReplicationEvents) -> Self::Iter;

    fn has(events: &ReplicationEvents) -> bool;
}

macro_rules! replication_event {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name;
        impl ReplicationEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ReplicationEvents) -> Self::Iter {
                let list = mem::take(&mut events.$field);
                IntoIterator::into_iter(list)
            }

            fn has(events: &ReplicationEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

replication_event!(ConnectEvent, connections, PeerId);
replication_event!(
    /// Yields the peer and how many unresolved commands were dropped with it
    DisconnectEvent,
    disconnections,
    (PeerId, usize)
);
replication_event!(SyncStartedEvent, sync_started, PeerId);
replication_event!(
    /// Yields `(peer, sent, expected)` after every backfilled item
    SyncProgressEvent,
    sync_progress,
    (PeerId, usize, usize)
);
replication_event!(SyncCompleteEvent, sync_complete, PeerId);
replication_event!(SyncAbortedEvent, sync_aborted, (PeerId, SyncAbortReason));
replication_event!(
    /// Recoverable protocol errors. The offending transfer was dropped and
    /// the peer stays connected.
    ProtocolErrorEvent,
    errors,
    (PeerId, ReplicationError)
);
