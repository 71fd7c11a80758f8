use tokio::sync::watch;

/// Scroll-to-bottom hint, fired only on every `batch_size`-th sequence
///
/// Purely a rendering policy: dropping ticks never affects the text.
pub struct ScrollThrottle {
    batch_size: u64,
    ticks: watch::Sender<u64>,
}

impl ScrollThrottle {
    /// Create a throttle firing on sequences divisible by `batch_size`
    pub fn new(batch_size: u64) -> Self {
        let (ticks, _) = watch::channel(0);
        Self {
            batch_size: batch_size.max(1),
            ticks,
        }
    }

    /// Record a received sequence; returns whether a scroll was requested
    pub fn observe(&self, sequence: u64) -> bool {
        if sequence % self.batch_size != 0 {
            return false;
        }
        self.ticks.send_modify(|count| *count += 1);
        true
    }

    /// Request an unconditional scroll, e.g. once the final text lands
    pub fn flush(&self) {
        self.ticks.send_modify(|count| *count += 1);
    }

    /// Receiver that changes each time a scroll is requested
    pub fn ticks(&self) -> watch::Receiver<u64> {
        self.ticks.subscribe()
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }
}
