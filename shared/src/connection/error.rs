use thiserror::Error;

use crate::{
    chunk::error::ChunkError,
    compression::error::{DecoderError, EncoderError},
};

/// Errors that can occur while decoding what a peer sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// The packet envelope could not be decoded (SECURITY: potentially malicious packet)
    #[error("Invalid packet of {size} bytes received. This may indicate a malformed or malicious packet")]
    InvalidPacket {
        size: usize,
    },

    /// A command node payload could not be decoded
    #[error("Invalid command node payload of {size} bytes")]
    InvalidCommand {
        size: usize,
    },

    /// A decompressed history batch could not be decoded
    #[error("Invalid history batch payload of {size} bytes")]
    InvalidHistoryBatch {
        size: usize,
    },

    /// A chunk stream's header did not name a known payload kind
    #[error("Chunk stream header {header:?} does not name a known payload kind")]
    UnknownPayloadKind {
        header: Vec<u8>,
    },
}

/// General connection-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Encoder error
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// Decoder error
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// Chunk error
    #[error("Chunk error: {0}")]
    Chunk(#[from] ChunkError),

    /// Packet error
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),
}
