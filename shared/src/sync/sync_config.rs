use std::time::Duration;

/// Contains config properties for history backfill
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// Cost units sent per batch. An item costs the number of chunk frames
    /// it needs, with a minimum of 1.
    pub batch_size: u32,
    /// Pause between consecutive batches to the same peer
    pub inter_batch_delay: Duration,
    /// When set, every batch must be acknowledged before the next one is
    /// sent
    pub reliability: Option<AckConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 60,
            inter_batch_delay: Duration::from_millis(50),
            reliability: None,
        }
    }
}

/// Acknowledgement polling used in reliability mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AckConfig {
    /// How often the scheduler checks whether the batch was consumed
    pub poll_interval: Duration,
    /// How long an unacknowledged batch waits before it is sent again
    pub resend_interval: Duration,
    /// How long to wait for an acknowledgement before giving up on the session
    pub ack_timeout: Duration,
}

impl Default for AckConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            resend_interval: Duration::from_secs(1),
            ack_timeout: Duration::from_secs(10),
        }
    }
}
