//! Cancellable timers for the single control thread
//!
//! The host loop asks for [`TimerQueue::next_deadline`], waits for input
//! until then, and drains [`TimerQueue::pop_due`]. Cancelling removes the
//! timer immediately, so a cancelled timer can never fire afterwards.

use std::time::{Duration, Instant};

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Refresh the live video; `generation` identifies the playback session
    PlaybackPoll { generation: u64 },
    /// End the session after the completion message
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    deadline: Instant,
    kind: TimerKind,
}

/// One-shot timers ordered by deadline
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire `delay` after `now`
    pub fn schedule(&mut self, now: Instant, delay: Duration, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline: now + delay,
            kind,
        });
        id
    }

    /// Remove a pending timer; returns whether it was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    /// Remove and return the earliest timer due at `now`
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, TimerKind)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.id.0))
            .map(|(index, _)| index)?;
        let timer = self.timers.remove(index);
        Some((timer.id, timer.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let late = queue.schedule(t0, Duration::from_millis(300), TimerKind::Shutdown);
        let early = queue.schedule(t0, Duration::from_millis(100), TimerKind::PlaybackPoll { generation: 1 });

        assert_eq!(queue.next_deadline(), Some(t0 + Duration::from_millis(100)));
        assert!(queue.pop_due(t0 + Duration::from_millis(50)).is_none());

        let now = t0 + Duration::from_millis(400);
        assert_eq!(queue.pop_due(now).map(|(id, _)| id), Some(early));
        assert_eq!(queue.pop_due(now).map(|(id, _)| id), Some(late));
        assert!(queue.pop_due(now).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let id = queue.schedule(t0, Duration::from_millis(10), TimerKind::Shutdown);

        assert!(queue.is_pending(id));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.pop_due(t0 + Duration::from_secs(1)).is_none());
        assert_eq!(queue.next_deadline(), None);
    }
}
