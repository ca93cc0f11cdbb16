/// Tracks the most recent qualifying user gesture.
///
/// Times are plain milliseconds supplied by the caller (`Date.now()` in the
/// browser, a fake clock in tests) so this works on targets without
/// `std::time::Instant`.
#[derive(Debug, Clone)]
pub struct InteractionClock {
    last_interaction_ms: Option<f64>,
    timeout_ms: f64,
}

impl InteractionClock {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            last_interaction_ms: None,
            timeout_ms: timeout_ms as f64,
        }
    }

    pub fn record(&mut self, now_ms: f64) {
        self.last_interaction_ms = Some(now_ms);
    }

    /// True when no gesture was seen yet or the last one is older than the timeout.
    pub fn is_expired(&self, now_ms: f64) -> bool {
        match self.last_interaction_ms {
            None => true,
            Some(last) => now_ms - last > self.timeout_ms,
        }
    }
}
