use crate::types::PeerId;

/// The unreliable, bounded-size message channel the application provides
pub trait Transport {
    /// Send one message to `peer_id`. Delivery is not guaranteed.
    fn send_frame(&mut self, peer_id: PeerId, payload: &[u8]);

    /// Largest message `send_frame` accepts
    fn max_payload_size(&self) -> usize;
}
