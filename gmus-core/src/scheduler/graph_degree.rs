//! Degree-based schedulers (§4.7): prefer the group most (or least)
//! entangled with the rest of the instance, biasing extraction towards
//! groups that are cheap to test in isolation or that are likely to
//! participate in many cores, depending on `DegreeBias`.
//!
//! `GraphDegreeScheduler` reads degree from the explicit `ResolutionGraph`
//! (`resolution_graph.rs`) once at construction, grounded in
//! `original_source/src/mus-2/mus_extraction_alg.hh`'s "order by resolvent
//! count" comment. `ImplicitDegreeScheduler` approximates the same idea from
//! occurrence-list counts alone, for configurations that opt out of building
//! the explicit graph (§9, "Resolution-graph maintenance cost").

use priority_queue::PriorityQueue;
use rustc_hash::FxHashMap;

use crate::clause::ClauseStore;
use crate::group_set::GroupSet;
use crate::ids::{ClauseId, GroupId};
use crate::resolution_graph::ResolutionGraph;

use super::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeBias {
    Min,
    Max,
}

impl DegreeBias {
    fn priority(self, degree: i64) -> i64 {
        match self {
            DegreeBias::Max => degree,
            DegreeBias::Min => -degree,
        }
    }
}

pub struct GraphDegreeScheduler {
    heap: PriorityQueue<GroupId, i64>,
    degree: FxHashMap<GroupId, i64>,
    clause_group: FxHashMap<ClauseId, GroupId>,
    bias: DegreeBias,
}

impl GraphDegreeScheduler {
    pub fn new(gset: &GroupSet, graph: &ResolutionGraph, groups: Vec<GroupId>, bias: DegreeBias) -> Self {
        let mut degree = FxHashMap::default();
        let mut clause_group = FxHashMap::default();
        let mut heap = PriorityQueue::new();

        for g in groups {
            let mut d: i64 = 0;
            for &c in gset.clauses_of(g) {
                clause_group.insert(c, g);
                d += graph.degree(c) as i64;
            }
            degree.insert(g, d);
            heap.push(g, bias.priority(d));
        }

        GraphDegreeScheduler {
            heap,
            degree,
            clause_group,
            bias,
        }
    }
}

impl Scheduler for GraphDegreeScheduler {
    fn next_candidate(&mut self) -> Option<GroupId> {
        self.heap.pop().map(|(g, _)| g)
    }

    fn reschedule(&mut self, g: GroupId) {
        let d = self.degree.get(&g).copied().unwrap_or(0);
        self.heap.push(g, self.bias.priority(d));
    }

    fn fasttrack(&mut self, g: GroupId) {
        self.heap.push(g, i64::MAX);
    }

    fn notify_removed(&mut self, _g: GroupId, touched_neighbors: &[ClauseId]) {
        for &c in touched_neighbors {
            if let Some(&owner) = self.clause_group.get(&c) {
                let d = self.degree.entry(owner).or_insert(0);
                *d = (*d - 1).max(0);
                if self.heap.get(&owner).is_some() {
                    self.heap.change_priority(&owner, self.bias.priority(*d));
                }
            }
        }
    }

    fn notify_necessary(&mut self, _g: GroupId) {}

    fn notify_priority_changed(&mut self, _g: GroupId) {}
}

/// Degree proxy from occurrence-list active counts alone: for each active
/// literal `l` of a clause, `occurrences(-l) - 1` is the number of other
/// clauses it could resolve with (ignoring tautology filtering). Computed
/// once; does not track removals.
pub struct ImplicitDegreeScheduler {
    heap: PriorityQueue<GroupId, i64>,
}

impl ImplicitDegreeScheduler {
    pub fn new(store: &ClauseStore, gset: &GroupSet, groups: Vec<GroupId>, bias: DegreeBias) -> Self {
        let mut heap = PriorityQueue::new();
        for g in groups {
            let mut d: i64 = 0;
            for &c in gset.clauses_of(g) {
                for &lit in store.get(c).active_literals() {
                    let (_, count) = gset.occurrences(-lit);
                    d += count.saturating_sub(1) as i64;
                }
            }
            heap.push(g, bias.priority(d));
        }
        ImplicitDegreeScheduler { heap }
    }
}

impl Scheduler for ImplicitDegreeScheduler {
    fn next_candidate(&mut self) -> Option<GroupId> {
        self.heap.pop().map(|(g, _)| g)
    }

    fn reschedule(&mut self, g: GroupId) {
        self.heap.push(g, 0);
    }

    fn fasttrack(&mut self, g: GroupId) {
        self.heap.push(g, i64::MAX);
    }

    fn notify_removed(&mut self, _g: GroupId, _touched_neighbors: &[ClauseId]) {}

    fn notify_necessary(&mut self, _g: GroupId) {}

    fn notify_priority_changed(&mut self, _g: GroupId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_bias_prefers_highest_degree() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let c1 = store.make_clause(vec![1, 2], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1], 2, false).unwrap();
        let c3 = store.make_clause(vec![-2], 3, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        gset.set_clause_group(&store, c3, 3).unwrap();

        let graph = ResolutionGraph::build(&store, &gset, false);
        let mut sched = GraphDegreeScheduler::new(&gset, &graph, vec![1, 2, 3], DegreeBias::Max);
        // group 1's clause resolves with both group 2 and group 3's clauses.
        assert_eq!(sched.next_candidate(), Some(1));
    }

    #[test]
    fn notify_removed_lowers_neighbor_priority() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let c1 = store.make_clause(vec![1, 2], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1], 2, false).unwrap();
        let c3 = store.make_clause(vec![-2], 3, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        gset.set_clause_group(&store, c3, 3).unwrap();

        let graph = ResolutionGraph::build(&store, &gset, false);
        let mut sched = GraphDegreeScheduler::new(&gset, &graph, vec![1, 2, 3], DegreeBias::Max);
        // removing c1's edge to c2 should drop group 2's degree to 0.
        sched.notify_removed(1, &[c2]);
        assert_eq!(*sched.degree.get(&2).unwrap(), 0);
    }
}
