//! # Strokesync Shared
//! Command replication for collaborative drawing sessions: chunking,
//! compression, dependency resolution and history backfill.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use strokesync_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
    UnsignedVariableInteger,
};

mod backends;
mod chunk;
mod command;
mod compression;
mod config;
mod connection;
mod constants;
mod error;
mod events;
mod ids;
mod replicator;
mod resolver;
mod sync;
mod transport;
mod types;

pub use backends::{Instant, Timer};
pub use chunk::{
    chunk_frame::{ChunkFrame, ChunkFrameKind},
    chunk_receiver::{AssembledPayload, ChunkReceiver},
    chunk_splitter::ChunkSplitter,
    error::ChunkError,
};
pub use command::{
    command_node::CommandNode,
    operation::{
        CompoundData, DeleteData, EnvironmentData, Operation, StrokeData, StrokeGeometry,
        StrokePoint,
    },
};
pub use compression::{
    compression_config::CompressionMode,
    decoder::Decoder,
    encoder::Encoder,
    error::{DecoderError, EncoderError},
    worker::{DecompressionResult, DecompressionWorker},
};
pub use config::ReplicationConfig;
pub use connection::{
    error::{ConnectionError, PacketError},
    packet::{Packet, PayloadKind},
    packet_type::PacketType,
    peer_connection::{PeerConnection, PeerCounters, ReceiveOutcome},
};
pub use constants::*;
pub use error::ReplicationError;
pub use events::{
    ConnectEvent, DisconnectEvent, ProtocolErrorEvent, ReplicationEvent, ReplicationEvents,
    SyncAbortReason, SyncAbortedEvent, SyncCompleteEvent, SyncProgressEvent, SyncStartedEvent,
};
pub use ids::{BatchId, CommandId, StreamId};
pub use replicator::Replicator;
pub use resolver::{
    command_resolver::CommandResolver, command_sink::CommandSink, error::ResolverError,
    pending_set::PendingSet,
};
pub use sync::{
    history::{backfill_timestamps, HistoryEntry, LocalHistory},
    history_batch::HistoryBatch,
    sync_config::{AckConfig, SyncConfig},
    sync_scheduler::{BatchDispatcher, SyncScheduler},
    sync_session::{SyncSession, SyncState},
};
pub use transport::Transport;
pub use types::{PeerId, SourceStream, Timestamp};
