//! Deferred work: a minimal timer abstraction and the render-notification coalescer.

use std::time::{Duration, Instant};

/// Default delay between a render notification and the coalesced update.
pub const DEFAULT_COALESCE_DELAY: Duration = Duration::from_millis(1);

/// Handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One-shot timers. The host decides when they fire and reports back.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Scheduler backed by a sorted deadline list and a caller-driven clock.
///
/// Nothing fires on its own: the host polls [`TimerQueue::due`] from its
/// event loop. The clock can be set explicitly, which keeps tests deterministic.
#[derive(Clone, Debug)]
pub struct TimerQueue {
    now: Instant,
    next_id: u64,
    pending: Vec<(Instant, TimerId)>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub const fn starting_at(now: Instant) -> Self {
        Self {
            now,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    #[inline]
    pub const fn now(&self) -> Instant {
        self.now
    }

    /// Moves the clock. Going backwards is ignored.
    pub fn set_now(&mut self, now: Instant) {
        self.now = self.now.max(now);
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline, for sizing a poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|&(deadline, _)| deadline)
    }

    /// Time left until the earliest deadline, zero if already due.
    pub fn timeout(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(self.now))
    }

    /// Removes and returns every timer due at the current clock, earliest first.
    pub fn due(&mut self) -> Vec<TimerId> {
        let split = self
            .pending
            .partition_point(|&(deadline, _)| deadline <= self.now);
        self.pending.drain(..split).map(|(_, id)| id).collect()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        let at = self
            .pending
            .partition_point(|&(other, _)| other <= deadline);
        self.pending.insert(at, (deadline, id));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|&(_, other)| other != id);
    }
}

/// Collapses bursts of render notifications into one deferred update.
///
/// At most one timer is pending; notifications arriving while it is pending
/// are absorbed. The pending handle is cleared before the update runs, so an
/// update that renders again can schedule the next one.
#[derive(Clone, Debug)]
pub struct UpdateCoalescer {
    pending: Option<TimerId>,
    delay: Duration,
}

impl Default for UpdateCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_COALESCE_DELAY)
    }
}

impl UpdateCoalescer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            pending: None,
            delay,
        }
    }

    #[inline]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub const fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    #[inline]
    pub const fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    #[inline]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Handles a "render finished" notification; returns `true` if a timer was scheduled.
    pub fn notify<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, cancelled: bool) -> bool {
        if cancelled || self.pending.is_some() {
            return false;
        }
        let id = scheduler.schedule(self.delay);
        tracing::trace!(timer = id.get(), delay = ?self.delay, "update scheduled");
        self.pending = Some(id);
        true
    }

    /// Claims a fired timer; returns `true` if the update should run now.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Cancels the pending timer, if any.
    pub fn cancel<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut queue = TimerQueue::new();
        let late = queue.schedule(Duration::from_millis(5));
        let early = queue.schedule(Duration::from_millis(1));

        assert!(queue.due().is_empty());
        assert_eq!(queue.timeout(), Some(Duration::from_millis(1)));

        queue.advance(Duration::from_millis(10));
        assert_eq!(queue.due(), vec![early, late]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(Duration::ZERO);
        queue.cancel(id);
        assert!(queue.due().is_empty());
    }

    #[test]
    fn clock_does_not_go_backwards() {
        let start = Instant::now();
        let mut queue = TimerQueue::starting_at(start);
        queue.advance(Duration::from_millis(3));
        queue.set_now(start);
        assert_eq!(queue.now(), start + Duration::from_millis(3));
    }

    #[test]
    fn burst_of_notifications_schedules_once() {
        let mut queue = TimerQueue::new();
        let mut coalescer = UpdateCoalescer::default();

        assert!(coalescer.notify(&mut queue, false));
        for _ in 0..9 {
            assert!(!coalescer.notify(&mut queue, false));
        }
        assert_eq!(queue.len(), 1);

        queue.advance(coalescer.delay());
        let fired = queue.due();
        assert_eq!(fired.len(), 1);
        assert!(coalescer.fire(fired[0]));
        assert!(!coalescer.is_pending());

        // A render caused by the update schedules the next one.
        assert!(coalescer.notify(&mut queue, false));
    }

    #[test]
    fn cancelled_notification_is_ignored() {
        let mut queue = TimerQueue::new();
        let mut coalescer = UpdateCoalescer::default();
        assert!(!coalescer.notify(&mut queue, true));
        assert!(queue.is_empty());
    }

    #[test]
    fn stale_timer_is_not_claimed() {
        let mut queue = TimerQueue::new();
        let mut coalescer = UpdateCoalescer::default();
        coalescer.notify(&mut queue, false);
        let stale = coalescer.pending().unwrap();
        coalescer.cancel(&mut queue);

        assert!(queue.is_empty());
        assert!(!coalescer.fire(stale));
    }
}
