//! Dynamic-ordered scheduler (§4.7): a mutable priority heap. Grounded in
//! the teacher's use of `priority-queue` (already a dependency of
//! `examples/radrow-satisfaction/solver/Cargo.toml`) for exactly this kind
//! of "pick the best candidate, then let priorities move around" structure.

use priority_queue::PriorityQueue;

use crate::ids::{ClauseId, GroupId};

use super::Scheduler;

/// A priority heap over groups whose priorities can be updated after
/// construction via [`DynamicScheduler::set_priority`]. The trait's
/// `notify_priority_changed` is a query-less hook (it names *that* a
/// priority changed, not the new value) and is a no-op here; callers that
/// recompute priorities externally call `set_priority` directly, as
/// `algorithms::deletion` does when wiring this scheduler to a priority
/// function of its own.
pub struct DynamicScheduler {
    heap: PriorityQueue<GroupId, i64>,
    fasttrack_bonus: i64,
}

impl DynamicScheduler {
    pub fn new(initial: impl IntoIterator<Item = (GroupId, i64)>) -> Self {
        let mut heap = PriorityQueue::new();
        for (g, priority) in initial {
            heap.push(g, priority);
        }
        DynamicScheduler {
            heap,
            fasttrack_bonus: 1,
        }
    }

    pub fn set_priority(&mut self, g: GroupId, priority: i64) {
        if self.heap.change_priority(&g, priority).is_none() {
            self.heap.push(g, priority);
        }
        self.fasttrack_bonus = self.fasttrack_bonus.max(priority.saturating_add(1));
    }
}

impl Scheduler for DynamicScheduler {
    fn next_candidate(&mut self) -> Option<GroupId> {
        self.heap.pop().map(|(g, _)| g)
    }

    fn reschedule(&mut self, g: GroupId) {
        self.heap.push(g, 0);
    }

    fn fasttrack(&mut self, g: GroupId) {
        let bonus = self.fasttrack_bonus;
        self.heap.push(g, bonus);
    }

    fn notify_removed(&mut self, _g: GroupId, _touched_neighbors: &[ClauseId]) {}

    fn notify_necessary(&mut self, _g: GroupId) {}

    fn notify_priority_changed(&mut self, _g: GroupId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_priority_first() {
        let mut sched = DynamicScheduler::new([(1, 5), (2, 9), (3, 1)]);
        assert_eq!(sched.next_candidate(), Some(2));
        sched.set_priority(3, 100);
        assert_eq!(sched.next_candidate(), Some(3));
        assert_eq!(sched.next_candidate(), Some(1));
    }
}
