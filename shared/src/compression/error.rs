use thiserror::Error;

/// Errors that can occur while compressing outgoing batches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    /// Failed to create compressor with the specified configuration
    #[error("Failed to create compressor with compression level {level}")]
    CompressorCreationFailed {
        level: i32,
    },

    /// Failed to create compressor with dictionary
    #[error("Failed to create compressor with dictionary (compression level {level})")]
    CompressorWithDictionaryFailed {
        level: i32,
    },

    /// Compression operation failed
    #[error("Failed to compress payload of {payload_size} bytes")]
    CompressionFailed {
        payload_size: usize,
    },

    /// Payload too large for the 32-bit length prefix
    #[error("Payload of {payload_size} bytes is too large to frame for compression")]
    PayloadTooLarge {
        payload_size: usize,
    },
}

/// Errors that can occur while decompressing incoming batches. None of these
/// are retryable: the transfer is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    /// Failed to create decompressor
    #[error("Failed to create decompressor")]
    DecompressorCreationFailed,

    /// Failed to create decompressor with dictionary
    #[error("Failed to create decompressor with dictionary")]
    DecompressorWithDictionaryFailed,

    /// Payload could not be decompressed (SECURITY: potentially malicious payload)
    #[error("Corrupt compressed payload of {payload_size} bytes (possible malformed or malicious data)")]
    CorruptPayload {
        payload_size: usize,
    },

    /// Declared decompressed size is above the configured ceiling
    #[error("Compressed payload declares {declared} bytes, above the limit of {limit} bytes")]
    SizeLimitExceeded {
        declared: usize,
        limit: usize,
    },
}
