//! Deferred game consequences, drained once per tick.
//!
//! Every entry carries the session generation it was scheduled under. A restart bumps the
//! generation, so anything queued by the previous run is discarded when it comes due.

use smallvec::SmallVec;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Grows the chain once the eat animation has played.
    AddFollower,
    /// Drops the leader in at the bottom of `column` after its warning wave.
    SpawnLeader { column: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due: u64,
    generation: u32,
    event: Deferred,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
    generation: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Invalidates everything scheduled so far.
    pub fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn schedule(&mut self, due: u64, event: Deferred) {
        trace!(due, ?event, generation = self.generation, "Scheduled");
        self.queue.push(Scheduled {
            due,
            generation: self.generation,
            event,
        });
    }

    /// Removes and returns every event due at `now`, in due order.
    ///
    /// Events from an older generation are removed too, but never returned.
    pub fn drain_due(&mut self, now: u64) -> SmallVec<[Deferred; 4]> {
        let mut due: SmallVec<[Scheduled; 4]> = SmallVec::new();
        let generation = self.generation;
        self.queue.retain(|entry| {
            if entry.due > now {
                return true;
            }
            if entry.generation == generation {
                due.push(*entry);
            } else {
                trace!(event = ?entry.event, stale = entry.generation, "Dropped stale event");
            }
            false
        });
        // Stable, so equal deadlines keep their scheduling order.
        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.event).collect()
    }

    /// Pushes every deadline back by `ms`.
    pub fn shift(&mut self, ms: u64) {
        for entry in self.queue.iter_mut() {
            entry.due = entry.due.saturating_add(ms);
        }
    }

    /// Live entries of `event` still waiting to fire.
    pub fn pending(&self, event: Deferred) -> usize {
        self.queue
            .iter()
            .filter(|entry| entry.generation == self.generation && entry.event == event)
            .count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drains_only_due_events_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(300, Deferred::SpawnLeader { column: 4 });
        scheduler.schedule(100, Deferred::AddFollower);
        scheduler.schedule(900, Deferred::AddFollower);

        let due = scheduler.drain_due(300);
        assert_eq!(due.as_slice(), &[Deferred::AddFollower, Deferred::SpawnLeader { column: 4 }]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_pending_ignores_stale_generations() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, Deferred::AddFollower);
        scheduler.bump_generation();
        scheduler.schedule(200, Deferred::AddFollower);
        scheduler.schedule(200, Deferred::SpawnLeader { column: 2 });
        assert_eq!(scheduler.pending(Deferred::AddFollower), 1);
    }

    #[test]
    fn test_shift_delays_deadlines() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, Deferred::AddFollower);
        scheduler.shift(500);
        assert!(scheduler.drain_due(599).is_empty());
        assert_eq!(scheduler.drain_due(600).len(), 1);
    }
}
