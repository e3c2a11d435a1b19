use std::time::Duration;

use tokio::time::Instant;

/// Minimum spacing between processed stream messages. Independent from the
/// playback rate limit.
pub const RECEIVE_THROTTLE: Duration = Duration::from_millis(100);

/// Drops messages that arrive sooner than `min_gap` after the last admitted one.
#[derive(Debug, Clone)]
pub struct ReceiveThrottle {
    min_gap: Duration,
    last: Option<Instant>,
}

impl Default for ReceiveThrottle {
    fn default() -> Self {
        Self::new(RECEIVE_THROTTLE)
    }
}

impl ReceiveThrottle {
    pub fn new(min_gap: Duration) -> Self {
        Self { min_gap, last: None }
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.min_gap => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
