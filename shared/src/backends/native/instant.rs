use std::time::Duration;

/// A point in time on the local monotonic clock. Scheduling code receives the
/// current `Instant` as a parameter instead of reading the clock itself, so a
/// test can step time forward by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    inner: std::time::Instant,
}

impl Instant {
    /// Creates an Instant from the moment the method is called
    pub fn now() -> Self {
        Self {
            inner: std::time::Instant::now(),
        }
    }

    /// Returns time elapsed since the Instant, as seen from `now`
    pub fn elapsed(&self, now: &Self) -> Duration {
        now.inner.saturating_duration_since(self.inner)
    }

    /// Returns time until `self`, as seen from `now`
    pub fn until(&self, now: &Self) -> Duration {
        self.inner.saturating_duration_since(now.inner)
    }

    pub fn is_after(&self, other: &Self) -> bool {
        self.inner > other.inner
    }

    pub fn add_millis(&mut self, millis: u32) {
        self.inner += Duration::from_millis(millis as u64);
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.inner += duration;
    }
}
