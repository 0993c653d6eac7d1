use log::trace;
use zstd::bulk::Compressor;

use super::{
    compression_config::CompressionMode, error::EncoderError, BODY_RAW, BODY_ZSTD,
    FRAME_HEADER_BYTES,
};

/// Compresses history batches into self-describing frames.
pub struct Encoder {
    compressor: Option<Compressor<'static>>,
}

impl Encoder {
    /// Try to create a new Encoder with the specified compression mode
    pub fn try_new(compression_mode: CompressionMode) -> Result<Self, EncoderError> {
        let compressor = match compression_mode {
            CompressionMode::Disabled => None,
            CompressionMode::Default(compression_level) => Some(
                Compressor::new(compression_level).map_err(|_| {
                    EncoderError::CompressorCreationFailed {
                        level: compression_level,
                    }
                })?,
            ),
            CompressionMode::Dictionary(compression_level, dictionary) => Some(
                Compressor::with_dictionary(compression_level, &dictionary).map_err(|_| {
                    EncoderError::CompressorWithDictionaryFailed {
                        level: compression_level,
                    }
                })?,
            ),
        };

        Ok(Self { compressor })
    }

    /// Try to encode a payload, returning error on compression failure.
    ///
    /// The compressed body is only used when it is actually smaller than the
    /// input. Otherwise the payload is framed as-is.
    pub fn try_encode(&mut self, payload: &[u8]) -> Result<Vec<u8>, EncoderError> {
        let original_len =
            u32::try_from(payload.len()).map_err(|_| EncoderError::PayloadTooLarge {
                payload_size: payload.len(),
            })?;

        let compressed = match &mut self.compressor {
            Some(compressor) => Some(compressor.compress(payload).map_err(|_| {
                EncoderError::CompressionFailed {
                    payload_size: payload.len(),
                }
            })?),
            None => None,
        };

        let (marker, body): (u8, &[u8]) = match &compressed {
            Some(compressed) if compressed.len() < payload.len() => (BODY_ZSTD, compressed),
            _ => (BODY_RAW, payload),
        };

        trace!(
            "Encoded {} byte payload into {} byte body",
            payload.len(),
            body.len()
        );

        let mut output = Vec::with_capacity(FRAME_HEADER_BYTES + body.len());
        output.extend_from_slice(&original_len.to_le_bytes());
        output.push(marker);
        output.extend_from_slice(body);
        Ok(output)
    }
}
