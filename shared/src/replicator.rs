use std::{collections::HashMap, mem};

use log::{debug, info, warn};

use crate::{
    backends::Instant,
    chunk::chunk_splitter::ChunkSplitter,
    command::command_node::CommandNode,
    compression::{encoder::Encoder, error::DecoderError, worker::DecompressionWorker},
    config::ReplicationConfig,
    connection::{
        packet::{Packet, PayloadKind},
        peer_connection::{PeerConnection, ReceiveOutcome},
    },
    error::ReplicationError,
    events::ReplicationEvents,
    ids::BatchId,
    resolver::command_sink::CommandSink,
    sync::{
        history::LocalHistory,
        history_batch::HistoryBatch,
        sync_scheduler::{BatchDispatcher, SyncScheduler},
        sync_session::SyncSession,
    },
    transport::Transport,
    types::PeerId,
};

/// Replicates drawing commands between this process and its connected
/// peers: live edits as they happen, and full history to peers that join
/// late.
///
/// Driven from a single thread through `receive_frame` and `update`.
pub struct Replicator {
    config: ReplicationConfig,
    splitter: ChunkSplitter,
    encoder: Encoder,
    peers: HashMap<PeerId, PeerConnection>,
    scheduler: SyncScheduler,
    worker: Option<DecompressionWorker<PeerId>>,
    events: ReplicationEvents,
}

impl Replicator {
    /// Try to create a new Replicator, failing if the config cannot be used
    pub fn try_new(config: ReplicationConfig) -> Result<Self, ReplicationError> {
        let splitter = ChunkSplitter::try_new(config.max_frame_size)?;
        let encoder = Encoder::try_new(config.compression.clone())?;
        let worker = if config.offload_decompression {
            Some(DecompressionWorker::try_spawn(
                config.compression.clone(),
                config.max_decompressed_bytes,
            )?)
        } else {
            None
        };
        let scheduler = SyncScheduler::new(config.sync.clone(), config.max_frame_size);

        Ok(Self {
            config,
            splitter,
            encoder,
            peers: HashMap::new(),
            scheduler,
            worker,
            events: ReplicationEvents::new(),
        })
    }

    /// Create a new Replicator
    ///
    /// # Panics
    /// Panics if the config cannot be used, see `try_new`
    pub fn new(config: ReplicationConfig) -> Self {
        Self::try_new(config).expect("Failed to create Replicator")
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    // Peers

    pub fn connect_peer(&mut self, peer_id: PeerId) -> Result<(), ReplicationError> {
        if self.peers.contains_key(&peer_id) {
            return Err(ReplicationError::PeerAlreadyConnected { peer_id });
        }
        let connection = PeerConnection::try_new(peer_id, &self.config)?;
        self.peers.insert(peer_id, connection);
        info!("Peer {} connected", peer_id);
        self.events.push_connection(peer_id);
        Ok(())
    }

    /// Tear down everything held for `peer_id` and cancel any backfill to
    /// it. Returns how many unresolved commands were dropped.
    pub fn disconnect_peer(&mut self, peer_id: PeerId) -> Result<usize, ReplicationError> {
        let Some(mut connection) = self.peers.remove(&peer_id) else {
            return Err(ReplicationError::UnknownPeer { peer_id });
        };
        let dropped = connection.teardown();
        info!(
            "Peer {} disconnected, dropped {} unresolved commands",
            peer_id, dropped
        );
        self.scheduler.cancel(peer_id, &mut self.events);
        self.events.push_disconnection(peer_id, dropped);
        Ok(dropped)
    }

    pub fn is_connected(&self, peer_id: PeerId) -> bool {
        self.peers.contains_key(&peer_id)
    }

    /// Connected peers, in ascending order
    pub fn peer_ids(&self) -> Vec<PeerId> {
        let mut peer_ids: Vec<PeerId> = self.peers.keys().copied().collect();
        peer_ids.sort_unstable();
        peer_ids
    }

    pub fn peer(&self, peer_id: PeerId) -> Option<&PeerConnection> {
        self.peers.get(&peer_id)
    }

    // Outgoing

    /// Replicate one local command to every connected peer. Nodes too large
    /// for a single frame are chunked.
    pub fn send_command(
        &mut self,
        node: &CommandNode,
        transport: &mut dyn Transport,
    ) -> Result<(), ReplicationError> {
        let node_bytes = node.to_bytes();
        let packets: Vec<Box<[u8]>> = if node_bytes.len() <= self.splitter.max_frame_size() {
            vec![Packet::Command(node_bytes).to_bytes()]
        } else {
            self.splitter
                .split(&node_bytes, &PayloadKind::Command.to_header())?
                .into_iter()
                .map(|frame| Packet::Chunk(frame).to_bytes())
                .collect()
        };

        for peer_id in self.peer_ids() {
            for packet in &packets {
                send_packet(transport, peer_id, packet);
            }
        }
        Ok(())
    }

    /// Queue a backfill of `history` to a connected peer
    pub fn request_backfill(
        &mut self,
        peer_id: PeerId,
        history: &LocalHistory,
    ) -> Result<(), ReplicationError> {
        if !self.peers.contains_key(&peer_id) {
            return Err(ReplicationError::UnknownPeer { peer_id });
        }
        let items = history.prepare_backfill();
        self.scheduler.request(peer_id, items, &mut self.events);
        Ok(())
    }

    /// Whether the active backfill to `peer_id` is blocked on `batch_id`
    /// and no acknowledgement for it has arrived yet
    pub fn awaiting_ack(&self, peer_id: PeerId, batch_id: &BatchId) -> bool {
        let blocked = self.scheduler.session().is_some_and(|session| {
            session.peer_id() == peer_id && session.awaiting_batch() == Some(*batch_id)
        });
        blocked
            && self
                .peers
                .get(&peer_id)
                .is_some_and(|connection| !connection.has_acknowledged(batch_id))
    }

    pub fn active_backfill(&self) -> Option<&SyncSession> {
        self.scheduler.session()
    }

    // Incoming

    /// Handle one message received from `peer_id`.
    ///
    /// Returns how many commands were applied to `sink`. Protocol errors do
    /// not fail the call: the transfer is dropped, the error is logged and
    /// recorded as an event, and the peer stays connected.
    pub fn receive_frame(
        &mut self,
        peer_id: PeerId,
        bytes: &[u8],
        sink: &mut dyn CommandSink,
        transport: &mut dyn Transport,
    ) -> Result<usize, ReplicationError> {
        let Some(connection) = self.peers.get_mut(&peer_id) else {
            warn!("Dropping {} byte frame from unknown peer {}", bytes.len(), peer_id);
            return Err(ReplicationError::UnknownPeer { peer_id });
        };

        match connection.receive_packet(bytes, sink) {
            Ok(ReceiveOutcome::Live(applied)) => Ok(applied),
            Ok(ReceiveOutcome::HistoryBatch { batch_id, applied }) => {
                send_packet(transport, peer_id, &Packet::Ack(batch_id).to_bytes());
                Ok(applied)
            }
            Ok(ReceiveOutcome::CompressedBatch(compressed)) => {
                let submitted = self
                    .worker
                    .as_mut()
                    .is_some_and(|worker| worker.submit(peer_id, compressed));
                if !submitted {
                    warn!("Peer {}: no decompression worker to take the batch", peer_id);
                    connection.record_protocol_error();
                }
                Ok(0)
            }
            Ok(ReceiveOutcome::Ack(batch_id)) => {
                let awaited = self.scheduler.session().is_some_and(|session| {
                    session.peer_id() == peer_id && session.awaiting_batch() == Some(batch_id)
                });
                if !awaited {
                    // acks are sent in every mode, only the awaited one is kept
                    connection.take_acknowledgement(&batch_id);
                }
                Ok(0)
            }
            Ok(ReceiveOutcome::Pending) => Ok(0),
            Err(error) => {
                warn!("Peer {}: protocol error: {}", peer_id, error);
                self.events.push_error(peer_id, error.into());
                Ok(0)
            }
        }
    }

    // Ticking

    /// Apply batches the decompression worker has finished, then drive the
    /// backfill scheduler
    pub fn update(&mut self, now: &Instant, transport: &mut dyn Transport, sink: &mut dyn CommandSink) {
        if let Some(worker) = self.worker.as_mut() {
            let results = worker.drain_results();
            for result in results {
                self.apply_decompressed(result.tag, result.result, transport, sink);
            }
        }

        let mut dispatcher = OutgoingBatches {
            encoder: &mut self.encoder,
            splitter: &self.splitter,
            peers: &mut self.peers,
            transport,
        };
        self.scheduler.update(now, &mut dispatcher, &mut self.events);
    }

    /// Block until the decompression worker has drained, applying its
    /// results. Does nothing when decompression runs inline.
    pub fn flush_decompression(&mut self, transport: &mut dyn Transport, sink: &mut dyn CommandSink) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        for result in worker.flush() {
            self.apply_decompressed(result.tag, result.result, transport, sink);
        }
    }

    /// Everything that happened since the last call
    pub fn take_events(&mut self) -> ReplicationEvents {
        mem::take(&mut self.events)
    }

    fn apply_decompressed(
        &mut self,
        peer_id: PeerId,
        result: Result<Vec<u8>, DecoderError>,
        transport: &mut dyn Transport,
        sink: &mut dyn CommandSink,
    ) {
        let Some(connection) = self.peers.get_mut(&peer_id) else {
            debug!("Discarding decompressed batch for departed peer {}", peer_id);
            return;
        };

        let outcome = match result {
            Ok(bytes) => connection.receive_decompressed_batch(&bytes, sink),
            Err(error) => {
                connection.record_protocol_error();
                Err(error.into())
            }
        };

        match outcome {
            Ok(ReceiveOutcome::HistoryBatch { batch_id, .. }) => {
                send_packet(transport, peer_id, &Packet::Ack(batch_id).to_bytes());
            }
            Ok(_) => {}
            Err(error) => {
                warn!("Peer {}: protocol error: {}", peer_id, error);
                self.events.push_error(peer_id, error.into());
            }
        }
    }
}

// Compresses, chunks and sends backfill batches on the scheduler's behalf
struct OutgoingBatches<'a> {
    encoder: &'a mut Encoder,
    splitter: &'a ChunkSplitter,
    peers: &'a mut HashMap<PeerId, PeerConnection>,
    transport: &'a mut dyn Transport,
}

impl BatchDispatcher for OutgoingBatches<'_> {
    fn dispatch(&mut self, peer_id: PeerId, batch: HistoryBatch) -> Result<(), ReplicationError> {
        let compressed = self.encoder.try_encode(&batch.to_bytes())?;
        let frames = self
            .splitter
            .split(&compressed, &PayloadKind::HistoryBatch.to_header())?;
        for frame in frames {
            send_packet(&mut *self.transport, peer_id, &Packet::Chunk(frame).to_bytes());
        }
        Ok(())
    }

    fn take_acknowledgement(&mut self, peer_id: PeerId, batch_id: &BatchId) -> bool {
        self.peers
            .get_mut(&peer_id)
            .is_some_and(|connection| connection.take_acknowledgement(batch_id))
    }
}

/// # Panics
/// Panics if the packet is larger than the transport accepts. That means
/// `max_frame_size` is configured too close to the transport ceiling.
fn send_packet(transport: &mut dyn Transport, peer_id: PeerId, bytes: &[u8]) {
    let ceiling = transport.max_payload_size();
    if bytes.len() > ceiling {
        panic!(
            "Outgoing packet of {} bytes exceeds the transport ceiling of {} bytes. Lower `max_frame_size`",
            bytes.len(),
            ceiling
        );
    }
    transport.send_frame(peer_id, bytes);
}
