//! Random scheduler (§4.7): shuffled once with a fixed seed, matching the
//! teacher's use of `rand` for branching/restart randomness
//! (`examples/radrow-satisfaction/solver/src/cdcl/restart_policies/luby.rs`).

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ids::{ClauseId, GroupId};

use super::Scheduler;

pub struct RandomScheduler {
    queue: VecDeque<GroupId>,
}

impl RandomScheduler {
    pub fn new(mut groups: Vec<GroupId>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        groups.shuffle(&mut rng);
        RandomScheduler {
            queue: groups.into(),
        }
    }
}

impl Scheduler for RandomScheduler {
    fn next_candidate(&mut self) -> Option<GroupId> {
        self.queue.pop_front()
    }

    fn reschedule(&mut self, g: GroupId) {
        self.queue.push_back(g);
    }

    fn fasttrack(&mut self, g: GroupId) {
        self.queue.push_front(g);
    }

    fn notify_removed(&mut self, _g: GroupId, _touched_neighbors: &[ClauseId]) {}

    fn notify_necessary(&mut self, _g: GroupId) {}

    fn notify_priority_changed(&mut self, _g: GroupId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_deterministic_order() {
        let mut a = RandomScheduler::new(vec![1, 2, 3, 4, 5], 42);
        let mut b = RandomScheduler::new(vec![1, 2, 3, 4, 5], 42);
        for _ in 0..5 {
            assert_eq!(a.next_candidate(), b.next_candidate());
        }
    }
}
