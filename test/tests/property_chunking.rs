/// PROPERTY-BASED TESTS: Chunk codec and compression round trips
///
/// Key invariants:
/// 1. Any payload split at any frame size reassembles byte for byte
/// 2. Frames after the begin frame may arrive in any order
/// 3. Any payload survives compression, and malformed input is rejected
///    as corrupt without panicking

use proptest::prelude::*;
use strokesync_shared::{
    ChunkFrame, ChunkReceiver, ChunkSplitter, CompressionMode, Decoder, DecoderError, Encoder,
    Packet,
};

fn reassemble(frames: Vec<ChunkFrame>) -> Option<Vec<u8>> {
    let mut receiver = ChunkReceiver::new(1 << 20);
    let mut output = None;
    for frame in frames {
        // every frame also goes through the packet envelope
        let bytes = Packet::Chunk(frame).to_bytes();
        let Ok(Packet::Chunk(frame)) = Packet::from_bytes(&bytes) else {
            return None;
        };
        if let Some(assembled) = receiver.receive(frame).ok()? {
            assert!(output.is_none(), "stream completed twice");
            output = Some(assembled.payload);
        }
    }
    output
}

proptest! {
    #[test]
    fn prop_chunks_reassemble(
        payload in prop::collection::vec(any::<u8>(), 0..4096),
        max_frame_size in 1usize..700,
    ) {
        let splitter = ChunkSplitter::try_new(max_frame_size).unwrap();
        let frames = splitter.split(&payload, &[1]).unwrap();

        prop_assert_eq!(frames.len(), splitter.frame_count(payload.len()));
        prop_assert!(frames.iter().all(|frame| frame.data.len() <= max_frame_size));
        prop_assert_eq!(reassemble(frames), Some(payload));
    }

    #[test]
    fn prop_chunks_reassemble_out_of_order(
        (payload, max_frame_size, order) in (prop::collection::vec(any::<u8>(), 1..2048), 1usize..200)
            .prop_flat_map(|(payload, max_frame_size)| {
                let count = payload.len().div_ceil(max_frame_size);
                let rest: Vec<usize> = (1..count).collect();
                (Just(payload), Just(max_frame_size), Just(rest).prop_shuffle())
            })
    ) {
        let splitter = ChunkSplitter::try_new(max_frame_size).unwrap();
        let frames = splitter.split(&payload, &[]).unwrap();

        let mut shuffled = vec![frames[0].clone()];
        shuffled.extend(order.iter().map(|index| frames[*index].clone()));
        prop_assert_eq!(reassemble(shuffled), Some(payload));
    }

    #[test]
    fn prop_compression_round_trips(
        payload in prop::collection::vec(any::<u8>(), 0..8192),
        level in 1i32..6,
    ) {
        let mut encoder = Encoder::try_new(CompressionMode::Default(level)).unwrap();
        let mut decoder = Decoder::try_new(CompressionMode::Default(level), 1 << 16).unwrap();
        let encoded = encoder.try_encode(&payload).unwrap();
        prop_assert_eq!(decoder.try_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn prop_malformed_compressed_body_is_corrupt(
        declared in 1u32..4096,
        body in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut frame = declared.to_le_bytes().to_vec();
        frame.push(1);
        // a leading zero can never start a zstd frame
        frame.push(0);
        frame.extend_from_slice(&body);

        let mut decoder = Decoder::try_new(CompressionMode::Default(3), 1 << 16).unwrap();
        let is_corrupt = matches!(
            decoder.try_decode(&frame),
            Err(DecoderError::CorruptPayload { .. })
        );
        prop_assert!(is_corrupt);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut decoder = Decoder::try_new(CompressionMode::Default(3), 1 << 16).unwrap();
        let _ = decoder.try_decode(&bytes);
        let _ = Packet::from_bytes(&bytes);
    }
}

#[test]
fn twelve_hundred_bytes_at_five_hundred_with_swapped_tail() {
    let payload: Vec<u8> = (0..1234u32).map(|i| (i * 7 % 256) as u8).collect();
    let splitter = ChunkSplitter::try_new(500).unwrap();
    let mut frames = splitter.split(&payload, &[1]).unwrap();

    let sizes: Vec<usize> = frames.iter().map(|frame| frame.data.len()).collect();
    assert_eq!(sizes, vec![500, 500, 234]);

    frames.swap(1, 2);
    assert_eq!(reassemble(frames), Some(payload));
}
