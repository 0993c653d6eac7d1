use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::{
    chunk::chunk_receiver::{AssembledPayload, ChunkReceiver},
    command::command_node::CommandNode,
    compression::decoder::Decoder,
    config::ReplicationConfig,
    connection::{
        error::{ConnectionError, PacketError},
        packet::{Packet, PayloadKind},
    },
    ids::{BatchId, CommandId},
    resolver::{command_resolver::CommandResolver, command_sink::CommandSink},
    sync::history_batch::HistoryBatch,
    types::{PeerId, SourceStream},
};

/// Per-peer traffic counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeerCounters {
    pub packets_received: u64,
    pub commands_applied: u64,
    pub batches_received: u64,
    pub protocol_errors: u64,
}

/// What handling one incoming packet produced
#[derive(Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The packet was consumed, applying this many live commands
    Live(usize),
    /// A chunk arrived but its stream is still incomplete
    Pending,
    /// A history batch was applied and must be acknowledged
    HistoryBatch { batch_id: BatchId, applied: usize },
    /// A compressed history batch is ready to be decompressed off-thread
    CompressedBatch(Vec<u8>),
    /// The peer acknowledged one of our batches
    Ack(BatchId),
}

/// Represents a connection to a remote peer: its inbound chunk streams,
/// one resolver per inbound stream, and the acknowledgements it has sent us.
/// Both resolvers share one applied set, so a command reaching us on the
/// live stream and again in a history batch is applied once.
pub struct PeerConnection {
    peer_id: PeerId,
    chunk_receiver: ChunkReceiver,
    live_resolver: CommandResolver,
    history_resolver: CommandResolver,
    applied_commands: HashSet<CommandId>,
    decoder: Decoder,
    offload_decompression: bool,
    acknowledged_batches: HashSet<BatchId>,
    counters: PeerCounters,
}

impl PeerConnection {
    pub fn try_new(peer_id: PeerId, config: &ReplicationConfig) -> Result<Self, ConnectionError> {
        Ok(Self {
            peer_id,
            chunk_receiver: ChunkReceiver::new(config.max_stream_bytes()),
            live_resolver: CommandResolver::new(),
            history_resolver: CommandResolver::new(),
            applied_commands: HashSet::new(),
            decoder: Decoder::try_new(config.compression.clone(), config.max_decompressed_bytes)?,
            offload_decompression: config.offload_decompression,
            acknowledged_batches: HashSet::new(),
            counters: PeerCounters::default(),
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn counters(&self) -> PeerCounters {
        self.counters
    }

    pub fn resolver(&self, stream: SourceStream) -> &CommandResolver {
        match stream {
            SourceStream::Live => &self.live_resolver,
            SourceStream::History => &self.history_resolver,
        }
    }

    pub fn open_chunk_streams(&self) -> usize {
        self.chunk_receiver.open_streams()
    }

    /// Whether a command from this peer has been applied, on either stream
    pub fn is_applied(&self, id: &CommandId) -> bool {
        self.applied_commands.contains(id)
    }

    /// Whether the peer has acknowledged `batch_id`
    pub fn has_acknowledged(&self, batch_id: &BatchId) -> bool {
        self.acknowledged_batches.contains(batch_id)
    }

    /// Consume a recorded acknowledgement, returning whether there was one
    pub fn take_acknowledgement(&mut self, batch_id: &BatchId) -> bool {
        self.acknowledged_batches.remove(batch_id)
    }

    /// Decode and route one packet from this peer.
    ///
    /// An error means the packet, or the transfer it belonged to, was
    /// dropped. The connection itself stays usable.
    pub fn receive_packet(
        &mut self,
        bytes: &[u8],
        sink: &mut dyn CommandSink,
    ) -> Result<ReceiveOutcome, ConnectionError> {
        self.counters.packets_received += 1;
        let result = self.route_packet(bytes, sink);
        if result.is_err() {
            self.counters.protocol_errors += 1;
        }
        result
    }

    /// Apply a history batch that was decompressed elsewhere
    pub fn receive_decompressed_batch(
        &mut self,
        bytes: &[u8],
        sink: &mut dyn CommandSink,
    ) -> Result<ReceiveOutcome, ConnectionError> {
        let result = self.apply_history_batch(bytes, sink);
        if result.is_err() {
            self.counters.protocol_errors += 1;
        }
        result
    }

    pub(crate) fn record_protocol_error(&mut self) {
        self.counters.protocol_errors += 1;
    }

    /// Drop every unresolved command, partial transfer, and recorded id.
    /// Returns how many commands were discarded.
    pub fn teardown(&mut self) -> usize {
        let streams = self.chunk_receiver.clear();
        if streams > 0 {
            debug!("Peer {}: dropped {} partial chunk streams", self.peer_id, streams);
        }
        self.applied_commands.clear();
        self.acknowledged_batches.clear();
        self.live_resolver.teardown() + self.history_resolver.teardown()
    }

    fn route_packet(
        &mut self,
        bytes: &[u8],
        sink: &mut dyn CommandSink,
    ) -> Result<ReceiveOutcome, ConnectionError> {
        let packet = Packet::from_bytes(bytes)
            .map_err(|_| PacketError::InvalidPacket { size: bytes.len() })?;

        match packet {
            Packet::Command(payload) => {
                let node = decode_command(&payload)?;
                Ok(ReceiveOutcome::Live(self.offer(SourceStream::Live, node, sink)))
            }
            Packet::Chunk(frame) => match self.chunk_receiver.receive(frame)? {
                Some(assembled) => self.receive_assembled(assembled, sink),
                None => Ok(ReceiveOutcome::Pending),
            },
            Packet::Ack(batch_id) => {
                trace!("Peer {} acknowledged batch {:?}", self.peer_id, batch_id);
                self.acknowledged_batches.insert(batch_id);
                Ok(ReceiveOutcome::Ack(batch_id))
            }
        }
    }

    fn receive_assembled(
        &mut self,
        assembled: AssembledPayload,
        sink: &mut dyn CommandSink,
    ) -> Result<ReceiveOutcome, ConnectionError> {
        match PayloadKind::from_header(&assembled.header) {
            Some(PayloadKind::Command) => {
                let node = decode_command(&assembled.payload)?;
                Ok(ReceiveOutcome::Live(self.offer(SourceStream::Live, node, sink)))
            }
            Some(PayloadKind::HistoryBatch) => {
                if self.offload_decompression {
                    return Ok(ReceiveOutcome::CompressedBatch(assembled.payload));
                }
                let decompressed = self.decoder.try_decode(&assembled.payload)?;
                self.apply_history_batch(&decompressed, sink)
            }
            None => {
                warn!(
                    "Peer {}: chunk stream {:?} has an unknown header",
                    self.peer_id, assembled.stream_id
                );
                Err(PacketError::UnknownPayloadKind {
                    header: assembled.header.into_vec(),
                }
                .into())
            }
        }
    }

    fn offer(
        &mut self,
        stream: SourceStream,
        node: CommandNode,
        sink: &mut dyn CommandSink,
    ) -> usize {
        let (resolver, other) = match stream {
            SourceStream::Live => (&mut self.live_resolver, &mut self.history_resolver),
            SourceStream::History => (&mut self.history_resolver, &mut self.live_resolver),
        };

        let applied = match resolver.try_offer_shared(node, sink, &mut self.applied_commands) {
            Ok(applied) => applied,
            Err(error) => {
                debug!("Peer {}: ignoring {:?} command: {}", self.peer_id, stream, error);
                0
            }
        };
        // copies still buffered on the other stream can never apply now
        if applied > 0 && other.pending_count() > 0 {
            other.discard_applied(&self.applied_commands);
        }

        self.counters.commands_applied += applied as u64;
        applied
    }

    fn apply_history_batch(
        &mut self,
        bytes: &[u8],
        sink: &mut dyn CommandSink,
    ) -> Result<ReceiveOutcome, ConnectionError> {
        let batch = HistoryBatch::from_bytes(bytes)
            .map_err(|_| PacketError::InvalidHistoryBatch { size: bytes.len() })?;
        self.counters.batches_received += 1;

        let batch_id = batch.batch_id;
        let mut applied = 0;
        for node in batch.nodes {
            applied += self.offer(SourceStream::History, node, sink);
        }

        debug!(
            "Peer {}: history batch {:?} applied {} commands, {} still pending",
            self.peer_id,
            batch_id,
            applied,
            self.history_resolver.pending_count()
        );
        Ok(ReceiveOutcome::HistoryBatch { batch_id, applied })
    }
}

fn decode_command(bytes: &[u8]) -> Result<CommandNode, PacketError> {
    CommandNode::from_bytes(bytes).map_err(|_| PacketError::InvalidCommand { size: bytes.len() })
}
