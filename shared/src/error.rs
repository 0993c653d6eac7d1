use strokesync_serde::SerdeErr;
use thiserror::Error;

use crate::{
    chunk::error::ChunkError,
    compression::error::{DecoderError, EncoderError},
    connection::error::{ConnectionError, PacketError},
    resolver::error::ResolverError,
    types::PeerId,
};

/// Top-level error type for replication
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] SerdeErr),

    /// Chunking error
    #[error("Chunk error: {0}")]
    Chunk(#[from] ChunkError),

    /// Compression error
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// Decompression error
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// Packet decoding error
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),

    /// Resolver error
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The peer is not connected
    #[error("Peer {peer_id} is not connected")]
    UnknownPeer {
        peer_id: PeerId,
    },

    /// The peer is already connected
    #[error("Peer {peer_id} is already connected")]
    PeerAlreadyConnected {
        peer_id: PeerId,
    },
}
