//! Schedule-once, cancellable deferred callbacks.

use std::time::Duration;

/// Handle to one armed deferred callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// The deferred-callback primitive consumed by the playback scheduler.
pub trait DeferredTimer {
    /// Arm a callback that becomes due after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TimerId;

    /// Disarm `id`. Cancelling an unknown or already-fired id is a no-op.
    fn cancel(&mut self, id: TimerId);
}

/// Deferred callbacks over a caller-driven clock.
///
/// The queue never reads wall time. The real-time driver feeds it `Instant`-derived
/// offsets; tests advance it directly, so both run identical scheduler code.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: Vec<(TimerId, Duration)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward. Earlier values are ignored; the clock is monotonic.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Number of armed, not yet fired callbacks.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest due callback, if any.
    pub fn next_due(&self) -> Option<(TimerId, Duration)> {
        self.pending.iter().copied().min_by_key(|(id, due)| (*due, *id))
    }

    /// Remove and return the earliest callback that is due at the current clock value.
    pub fn pop_due(&mut self) -> Option<TimerId> {
        let (id, due) = self.next_due()?;
        if due > self.now {
            return None;
        }
        self.pending.retain(|(p, _)| *p != id);
        Some(id)
    }

    /// Jump the clock to the earliest deadline and fire it.
    pub fn advance_to_next(&mut self) -> Option<TimerId> {
        let (_, due) = self.next_due()?;
        self.set_now(due);
        self.pop_due()
    }
}

impl DeferredTimer for TimerQueue {
    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push((id, self.now + delay));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(p, _)| *p != id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/timer.rs"]
mod tests;
