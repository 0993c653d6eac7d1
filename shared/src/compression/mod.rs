pub mod compression_config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod worker;

// Compressed frames start with the original length (u32, little endian)
// and a one-byte body marker.
pub(crate) const FRAME_HEADER_BYTES: usize = 5;
pub(crate) const BODY_RAW: u8 = 0;
pub(crate) const BODY_ZSTD: u8 = 1;
