use crate::{
    compression::{compression_config::CompressionMode, FRAME_HEADER_BYTES},
    constants::{DEFAULT_MAX_DECOMPRESSED_BYTES, DEFAULT_MAX_FRAME_BYTES, FRAME_OVERHEAD_BYTES},
    sync::sync_config::SyncConfig,
};

/// Contains config properties which will be used by a Replicator
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicationConfig {
    /// Bytes of payload per chunk frame. Together with
    /// `FRAME_OVERHEAD_BYTES` this must stay under the transport's ceiling.
    pub max_frame_size: usize,
    /// How history batches are compressed
    pub compression: CompressionMode,
    /// Incoming batches that decompress past this are rejected
    pub max_decompressed_bytes: usize,
    /// Decompress incoming history batches on a worker thread
    pub offload_decompression: bool,
    /// Backfill pacing
    pub sync: SyncConfig,
}

impl ReplicationConfig {
    /// Largest chunk stream a peer is allowed to open
    pub fn max_stream_bytes(&self) -> usize {
        self.max_decompressed_bytes.saturating_add(FRAME_HEADER_BYTES)
    }

    /// Whether every packet this config produces fits a transport that
    /// accepts `max_payload_size` bytes
    pub fn fits_payload_ceiling(&self, max_payload_size: usize) -> bool {
        self.max_frame_size.saturating_add(FRAME_OVERHEAD_BYTES) <= max_payload_size
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_BYTES,
            compression: CompressionMode::default(),
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
            offload_decompression: false,
            sync: SyncConfig::default(),
        }
    }
}
