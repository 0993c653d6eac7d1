/// In-memory transport for E2E testing
/// Queues outgoing frames so a test can deliver, hold or inspect them

use std::collections::VecDeque;

use strokesync_shared::{Packet, PeerId, Transport, DEFAULT_MAX_PAYLOAD_BYTES};

pub struct LocalTransport {
    outbox: VecDeque<(PeerId, Box<[u8]>)>,
    max_payload_size: usize,
    frames_sent: usize,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::with_max_payload_size(DEFAULT_MAX_PAYLOAD_BYTES)
    }

    pub fn with_max_payload_size(max_payload_size: usize) -> Self {
        Self {
            outbox: VecDeque::new(),
            max_payload_size,
            frames_sent: 0,
        }
    }

    /// Take every frame sent since the last drain, oldest first
    pub fn drain(&mut self) -> Vec<(PeerId, Box<[u8]>)> {
        self.outbox.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    pub fn frames_sent(&self) -> usize {
        self.frames_sent
    }

    /// Decoded view of the queued frames, leaving them queued
    pub fn peek_packets(&self) -> Vec<Packet> {
        self.outbox
            .iter()
            .filter_map(|(_, bytes)| Packet::from_bytes(bytes).ok())
            .collect()
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LocalTransport {
    fn send_frame(&mut self, peer_id: PeerId, payload: &[u8]) {
        self.frames_sent += 1;
        self.outbox.push_back((peer_id, payload.into()));
    }

    fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}
