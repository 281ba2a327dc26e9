//! Coalesced "surface changed" notifications.
//!
//! Every surface-modifying call reports a change. The first change of a burst
//! asks the host's [`RepaintScheduler`] for one timer; later changes ride on
//! that pending timer. When it fires the host calls
//! [`RepaintTracker::on_repaint_timer`], which reports the burst exactly once.
//! Hosts without a timer can poll [`RepaintTracker::take_changed`] instead.

use std::fmt;
use std::time::Duration;

/// Host hook that arms and disarms the repaint timer.
pub trait RepaintScheduler {
    /// Arm a one-shot timer that fires after `delay`.
    fn schedule(&mut self, delay: Duration);
    /// Disarm a timer armed by `schedule`.
    fn cancel(&mut self);
}

pub struct RepaintTracker {
    pending: bool,
    changed: bool,
    delay: Duration,
    scheduler: Option<Box<dyn RepaintScheduler>>,
}

impl fmt::Debug for RepaintTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepaintTracker")
            .field("pending", &self.pending)
            .field("changed", &self.changed)
            .field("delay", &self.delay)
            .field("has_scheduler", &self.scheduler.is_some())
            .finish()
    }
}

impl Default for RepaintTracker {
    fn default() -> Self {
        Self::new(Duration::ZERO, None)
    }
}

impl RepaintTracker {
    pub fn new(delay: Duration, scheduler: Option<Box<dyn RepaintScheduler>>) -> Self {
        Self {
            pending: false,
            changed: false,
            delay,
            scheduler,
        }
    }

    /// Record a surface change, arming the timer if none is pending.
    pub fn schedule_change(&mut self) {
        self.changed = true;
        if self.pending {
            return;
        }
        self.pending = true;
        if let Some(scheduler) = self.scheduler.as_mut() {
            log::trace!(target: "canvas", "repaint scheduled in {:?}", self.delay);
            scheduler.schedule(self.delay);
        }
    }

    /// Timer callback. Returns `true` if a burst of changes was waiting.
    pub fn on_repaint_timer(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.changed = false;
        true
    }

    /// Pull-based alternative to the timer: returns and clears the changed
    /// flag, disarming any pending timer.
    pub fn take_changed(&mut self) -> bool {
        let changed = std::mem::take(&mut self.changed);
        self.cancel();
        changed
    }

    /// Drop a pending notification without reporting it.
    pub fn cancel(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn set_scheduler(&mut self, scheduler: Option<Box<dyn RepaintScheduler>>) {
        self.cancel();
        self.scheduler = scheduler;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        scheduled: Vec<Duration>,
        cancelled: usize,
    }

    struct CountingScheduler(Rc<RefCell<Calls>>);

    impl RepaintScheduler for CountingScheduler {
        fn schedule(&mut self, delay: Duration) {
            self.0.borrow_mut().scheduled.push(delay);
        }
        fn cancel(&mut self) {
            self.0.borrow_mut().cancelled += 1;
        }
    }

    fn tracker(delay_ms: u64) -> (RepaintTracker, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let tracker = RepaintTracker::new(
            Duration::from_millis(delay_ms),
            Some(Box::new(CountingScheduler(calls.clone()))),
        );
        (tracker, calls)
    }

    #[test]
    fn test_burst_schedules_once() {
        let (mut tracker, calls) = tracker(16);
        for _ in 0..10 {
            tracker.schedule_change();
        }
        assert_eq!(calls.borrow().scheduled, vec![Duration::from_millis(16)]);
        assert!(tracker.on_repaint_timer());
        assert!(!tracker.on_repaint_timer());

        tracker.schedule_change();
        assert_eq!(calls.borrow().scheduled.len(), 2);
    }

    #[test]
    fn test_take_changed_cancels_timer() {
        let (mut tracker, calls) = tracker(0);
        assert!(!tracker.take_changed());
        tracker.schedule_change();
        assert!(tracker.take_changed());
        assert!(!tracker.take_changed());
        assert_eq!(calls.borrow().cancelled, 1);
        assert!(!tracker.on_repaint_timer());
    }

    #[test]
    fn test_without_scheduler() {
        let mut tracker = RepaintTracker::default();
        tracker.schedule_change();
        assert!(tracker.is_pending());
        assert!(tracker.on_repaint_timer());
        assert!(!tracker.is_pending());
    }
}
