use std::time::Duration;

use strokesync_shared::{CommandNode, Instant, LocalHistory, PeerId, ReplicationConfig, Replicator};

use super::{LocalTransport, RecordingSink};

/// One side of a test session
pub struct TestPeer {
    pub id: PeerId,
    pub replicator: Replicator,
    pub transport: LocalTransport,
    pub sink: RecordingSink,
    /// While set, frames this peer sends are held instead of delivered
    pub muted: bool,
}

impl TestPeer {
    pub fn new(id: PeerId, config: ReplicationConfig) -> Self {
        Self {
            id,
            replicator: Replicator::try_new(config).expect("test config must be valid"),
            transport: LocalTransport::new(),
            sink: RecordingSink::new(),
            muted: false,
        }
    }

    pub fn send(&mut self, node: &CommandNode) {
        self.replicator
            .send_command(node, &mut self.transport)
            .expect("send_command failed");
    }
}

/// Two peers, `a` and `b`, connected to each other over in-memory
/// transports with a hand-driven clock
pub struct TestSession {
    pub a: TestPeer,
    pub b: TestPeer,
    pub now: Instant,
}

impl TestSession {
    pub fn new(config: ReplicationConfig) -> Self {
        Self::with_configs(config.clone(), config)
    }

    pub fn with_configs(a_config: ReplicationConfig, b_config: ReplicationConfig) -> Self {
        let mut a = TestPeer::new(1, a_config);
        let mut b = TestPeer::new(2, b_config);
        a.replicator.connect_peer(b.id).expect("connect failed");
        b.replicator.connect_peer(a.id).expect("connect failed");
        Self {
            a,
            b,
            now: Instant::now(),
        }
    }

    /// Have `a` backfill `history` to `b`
    pub fn backfill_a_to_b(&mut self, history: &LocalHistory) {
        self.a
            .replicator
            .request_backfill(self.b.id, history)
            .expect("request_backfill failed");
    }

    /// Deliver queued frames in both directions until nothing is left to
    /// send, skipping muted peers. Returns how many frames were delivered.
    pub fn deliver(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            let mut moved = 0;
            if !self.a.muted {
                moved += forward(&mut self.a, &mut self.b);
            }
            if !self.b.muted {
                moved += forward(&mut self.b, &mut self.a);
            }
            if moved == 0 {
                return delivered;
            }
            delivered += moved;
        }
    }

    /// Advance the clock, tick both replicators, then deliver
    pub fn tick(&mut self, elapsed: Duration) {
        self.now.add_duration(elapsed);
        self.a
            .replicator
            .update(&self.now, &mut self.a.transport, &mut self.a.sink);
        self.b
            .replicator
            .update(&self.now, &mut self.b.transport, &mut self.b.sink);
        self.deliver();
    }

    /// Tick until `a` has no backfill in flight. Returns the ticks taken.
    ///
    /// # Panics
    /// Panics if the backfill is still running after `limit` ticks
    pub fn run_backfill(&mut self, step: Duration, limit: usize) -> usize {
        for ticks in 1..=limit {
            self.tick(step);
            if self.a.replicator.active_backfill().is_none() {
                return ticks;
            }
        }
        panic!("backfill did not finish within {} ticks", limit);
    }
}

// Frames to a peer that has dropped the sender are discarded, as a real
// transport would after disconnect
fn forward(from: &mut TestPeer, to: &mut TestPeer) -> usize {
    let frames = from.transport.drain();
    let count = frames.len();
    for (target, bytes) in frames {
        assert_eq!(target, to.id, "frame addressed to an unknown peer");
        if !to.replicator.is_connected(from.id) {
            log::debug!("Discarding frame from disconnected peer {}", from.id);
            continue;
        }
        to.replicator
            .receive_frame(from.id, &bytes, &mut to.sink, &mut to.transport)
            .expect("receive_frame failed");
    }
    count
}
