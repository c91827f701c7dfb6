use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(450);

/// Single-slot cancellable timer
///
/// Scheduling replaces whatever was pending and restarts the delay, so
/// only the most recent payload can ever fire. Time is passed in rather
/// than read, which keeps the event loop in charge and tests exact.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, payload: T, now: Instant) {
        self.pending = Some((now + self.delay, payload));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The payload, once its delay has fully elapsed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(&self.pending, Some((due, _)) if *due <= now);
        if ready {
            self.pending.take().map(|(_, payload)| payload)
        } else {
            None
        }
    }

    /// How long the caller may sleep before something could fire
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(due, _)| due.saturating_duration_since(now))
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
