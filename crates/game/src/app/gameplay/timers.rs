/// Handle to a scheduled event, used to cancel it before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TimerId(u64);

#[derive(Debug)]
struct PendingTimer<E> {
    id: TimerId,
    due_at_seconds: f64,
    event: E,
}

/// Fire-once delayed events advanced by the simulation clock. Nothing fires
/// while the owner is not being stepped.
#[derive(Debug)]
pub(crate) struct TimerQueue<E> {
    now_seconds: f64,
    next_id: u64,
    pending: Vec<PendingTimer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            now_seconds: 0.0,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> TimerQueue<E> {
    pub(crate) fn schedule(&mut self, delay_seconds: f32, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.push(PendingTimer {
            id,
            due_at_seconds: self.now_seconds + f64::from(delay_seconds.max(0.0)),
            event,
        });
        id
    }

    /// Returns whether the timer was still pending.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        let Some(index) = self.pending.iter().position(|timer| timer.id == id) else {
            return false;
        };
        self.pending.remove(index);
        true
    }

    pub(crate) fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    /// Moves the clock forward and returns every event that came due, earliest
    /// first. Events due at the same instant keep their scheduling order.
    pub(crate) fn advance(&mut self, dt_seconds: f32) -> Vec<E> {
        self.now_seconds += f64::from(dt_seconds.max(0.0));
        let now = self.now_seconds;

        let (mut due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|timer| timer.due_at_seconds <= now);
        self.pending = waiting;

        due.sort_by(|a, b| {
            a.due_at_seconds
                .total_cmp(&b.due_at_seconds)
                .then(a.id.0.cmp(&b.id.0))
        });
        due.into_iter().map(|timer| timer.event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_once_when_due() {
        let mut timers = TimerQueue::default();
        let id = timers.schedule(1.0, "respawn");

        assert!(timers.advance(0.5).is_empty());
        assert!(timers.is_pending(id));
        assert_eq!(timers.advance(0.5), vec!["respawn"]);
        assert!(!timers.is_pending(id));
        assert!(timers.advance(10.0).is_empty());
    }

    #[test]
    fn due_events_come_out_in_due_order_then_schedule_order() {
        let mut timers = TimerQueue::default();
        timers.schedule(0.3, "late");
        timers.schedule(0.1, "early");
        timers.schedule(0.3, "late_second");

        assert_eq!(timers.advance(1.0), vec!["early", "late", "late_second"]);
    }

    #[test]
    fn cancelled_event_never_fires() {
        let mut timers = TimerQueue::default();
        let id = timers.schedule(0.2, 1);
        timers.schedule(0.2, 2);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(!timers.is_pending(id));
        assert_eq!(timers.advance(0.2), vec![2]);
    }

    #[test]
    fn delays_are_relative_to_current_clock() {
        let mut timers = TimerQueue::default();
        timers.advance(5.0);
        timers.schedule(1.0, ());
        assert!(timers.advance(0.75).is_empty());
        assert_eq!(timers.advance(0.25).len(), 1);
    }
}
