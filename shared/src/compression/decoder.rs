use log::trace;
use zstd::bulk::Decompressor;

use super::{
    compression_config::CompressionMode, error::DecoderError, BODY_RAW, BODY_ZSTD,
    FRAME_HEADER_BYTES,
};

pub struct Decoder {
    decompressor: Decompressor<'static>,
    max_decompressed_bytes: usize,
}

impl Decoder {
    /// Try to create a new Decoder with the specified compression mode.
    ///
    /// A decoder in `Disabled` mode still accepts zstd bodies, since the
    /// frame marker says which one it got.
    pub fn try_new(
        compression_mode: CompressionMode,
        max_decompressed_bytes: usize,
    ) -> Result<Self, DecoderError> {
        let decompressor = match compression_mode {
            CompressionMode::Disabled | CompressionMode::Default(_) => {
                Decompressor::new().map_err(|_| DecoderError::DecompressorCreationFailed)?
            }
            CompressionMode::Dictionary(_, dictionary) => Decompressor::with_dictionary(&dictionary)
                .map_err(|_| DecoderError::DecompressorWithDictionaryFailed)?,
        };

        Ok(Self {
            decompressor,
            max_decompressed_bytes,
        })
    }

    /// Try to decode a payload, returning error on decompression failure
    ///
    /// SECURITY: This method processes untrusted network data. Any malformed or
    /// malicious payload will return an error instead of panicking, and the
    /// output buffer never grows past `max_decompressed_bytes`.
    pub fn try_decode(&mut self, payload: &[u8]) -> Result<Vec<u8>, DecoderError> {
        let corrupt = || DecoderError::CorruptPayload {
            payload_size: payload.len(),
        };

        if payload.len() < FRAME_HEADER_BYTES {
            return Err(corrupt());
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&payload[..4]);
        let original_len = u32::from_le_bytes(len_bytes) as usize;
        let marker = payload[4];
        let body = &payload[FRAME_HEADER_BYTES..];

        if original_len > self.max_decompressed_bytes {
            return Err(DecoderError::SizeLimitExceeded {
                declared: original_len,
                limit: self.max_decompressed_bytes,
            });
        }

        let output = match marker {
            BODY_RAW => body.to_vec(),
            BODY_ZSTD => self
                .decompressor
                .decompress(body, original_len)
                .map_err(|_| corrupt())?,
            _ => return Err(corrupt()),
        };

        if output.len() != original_len {
            return Err(corrupt());
        }

        trace!(
            "Decoded {} byte payload from {} byte frame",
            output.len(),
            payload.len()
        );
        Ok(output)
    }
}
