use std::time::{Duration, Instant};

/// Holds back a changing value until it has stopped changing for `delay`.
///
/// Time is passed in explicitly, so the caller decides how to wait (a channel
/// timeout, a render tick) and tests can step through it without sleeping.
#[derive(Debug)]
pub struct Debouncer<T> {
    settled: T,
    pending: Option<(T, Instant)>,
    delay: Duration,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// The initial value is available immediately, without waiting.
    pub fn new(initial: T, delay: Duration) -> Self {
        Debouncer {
            settled: initial,
            pending: None,
            delay,
        }
    }

    /// Records a new input and restarts the timer.
    pub fn input(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Promotes the pending value once its deadline has passed. Returns it if it differs
    /// from the previously settled one.
    pub fn settle(&mut self, now: Instant) -> Option<&T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {}
            _ => return None,
        }
        let (value, _) = self.pending.take()?;
        if value == self.settled {
            return None;
        }
        self.settled = value;
        Some(&self.settled)
    }

    #[cfg(test)]
    pub fn value(&self) -> &T {
        &self.settled
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Drops the pending input, e.g. on teardown.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
