use std::time::Duration;

use super::instant::Instant;

/// A Timer with a given duration after which it will enter into a "Ringing"
/// state. The Timer can be reset at a given time, or manually set to start
/// "Ringing" again.
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    /// Creates a new Timer with a given duration, started at `now`
    pub fn new(duration: Duration, now: &Instant) -> Self {
        Self {
            duration,
            last: *now,
        }
    }

    /// Reset the timer to start counting from `now`
    pub fn reset(&mut self, now: &Instant) {
        self.last = *now;
    }

    /// Returns whether the timer's duration has elapsed as of `now`
    pub fn ringing(&self, now: &Instant) -> bool {
        self.last.elapsed(now) >= self.duration
    }

    /// Time left before the timer rings
    pub fn remaining(&self, now: &Instant) -> Duration {
        self.duration.saturating_sub(self.last.elapsed(now))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
