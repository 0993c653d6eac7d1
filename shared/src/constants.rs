// Frame size thresholds

/// Default ceiling on a single transport message, in bytes. Transports
/// report their real ceiling through `Transport::max_payload_size`.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1200;

/// Upper bound on the envelope around a chunk slice: packet tag, frame kind,
/// stream id, total length, offset, slice length, plus the begin frame's
/// header (at most `MAX_CHUNK_HEADER_BYTES`).
pub const FRAME_OVERHEAD_BYTES: usize = 64;

/// Largest opaque header a begin frame may carry
pub const MAX_CHUNK_HEADER_BYTES: usize = 16;

/// Default slice size used by the chunk splitter. Together with
/// `FRAME_OVERHEAD_BYTES` this stays under `DEFAULT_MAX_PAYLOAD_BYTES`.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024;

/// A single chunk stream may not be split into more frames than this.
/// At the default frame size this is roughly 1 GB.
pub const MAX_FRAMES_PER_STREAM: usize = 1 << 20;

/// Decompressed history batches larger than this are treated as corrupt
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;
