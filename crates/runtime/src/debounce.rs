use foundation::time::Millis;

/// Cancel-and-restart timer for bursts of events.
///
/// Every [`Debouncer::schedule`] replaces the pending value and pushes the
/// deadline out to `now + window`. The value is released by
/// [`Debouncer::poll`] only once a full window has passed with no further
/// scheduling.
///
/// The debouncer never reads a clock. Callers supply `now`, which keeps the
/// behavior deterministic and replayable.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window_ms: u64,
    pending: Option<(Millis, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Restarts the timer with `value` as the latest payload.
    ///
    /// Returns `true` if an earlier pending value was cancelled.
    pub fn schedule(&mut self, now: Millis, value: T) -> bool {
        let deadline = now.saturating_add(self.window_ms);
        self.pending.replace((deadline, value)).is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(d, _)| *d)
    }

    /// Releases the pending value if its quiet window has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }
}
