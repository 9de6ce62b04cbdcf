//! Length scheduler (§4.7): orders groups by the sum of active-literal
//! counts across their clauses. Semi-static — priorities are computed once
//! at insertion time; later removals elsewhere in the group set do not
//! retroactively re-heapify this scheduler.

use std::collections::VecDeque;

use crate::clause::ClauseStore;
use crate::group_set::GroupSet;
use crate::ids::{ClauseId, GroupId};

use super::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBias {
    Longest,
    Shortest,
}

pub struct LengthScheduler {
    queue: VecDeque<GroupId>,
}

impl LengthScheduler {
    pub fn new(store: &ClauseStore, gset: &GroupSet, groups: Vec<GroupId>, bias: LengthBias) -> Self {
        let mut scored: Vec<(usize, GroupId)> = groups
            .into_iter()
            .map(|g| {
                let length: usize = gset
                    .clauses_of(g)
                    .iter()
                    .map(|&id| store.get(id).active_literals().len())
                    .sum();
                (length, g)
            })
            .collect();

        match bias {
            LengthBias::Longest => scored.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1))),
            LengthBias::Shortest => scored.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1))),
        }

        LengthScheduler {
            queue: scored.into_iter().map(|(_, g)| g).collect(),
        }
    }
}

impl Scheduler for LengthScheduler {
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
    fn longest_clause_group_comes_first() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let short = store.make_clause(vec![1], 1, false).unwrap();
        let long = store.make_clause(vec![1, 2, 3], 2, false).unwrap();
        gset.set_clause_group(&store, short, 1).unwrap();
        gset.set_clause_group(&store, long, 2).unwrap();

        let mut sched = LengthScheduler::new(&store, &gset, vec![1, 2], LengthBias::Longest);
        assert_eq!(sched.next_candidate(), Some(2));
        assert_eq!(sched.next_candidate(), Some(1));
    }
}
