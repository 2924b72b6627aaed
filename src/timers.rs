//! Phase timing for privilege checks.

use std::time::{Duration, Instant};

/// Adds the time between creation and drop to `slot`.
///
/// The slot is updated on every exit path, including early returns through
/// `?`.
///
/// ```rust,ignore
/// let mut pdp = Duration::ZERO;
/// let result = {
///     let _timer = PhaseTimer::new(&mut pdp);
///     self.pdp.evaluate(&principal, &attrs)?
/// };
/// ```
pub(crate) struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub(crate) fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

pub(crate) fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
