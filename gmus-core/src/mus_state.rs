//! MUS state (C3): the mutable `R`/`N` annotations tracked during one
//! extraction run, their insertion-ordered histories, and the version
//! counter staleness depends on.
//!
//! Grounded in `original_source/src/mus-2/mus_data.hh` (`MUSData`); the
//! read/write-lock plumbing described there is left for the abstract
//! multi-worker variant of §5 and is not implemented here.

use std::collections::{HashSet, VecDeque};

use rustc_hash::FxHashSet;

use crate::clause::ClauseStore;
use crate::error::{GmusError, Result};
use crate::group_set::GroupSet;
use crate::ids::{ClauseId, GroupId, HARD_GROUP};
use crate::resolution_graph::ResolutionGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Untested,
    Necessary,
    Removed,
}

/// Holds `R`, `N`, their histories, the version counter and (optionally) a
/// live resolution graph, all scoped to one extraction run over one
/// [`GroupSet`].
pub struct MusState {
    removed: FxHashSet<GroupId>,
    necessary: FxHashSet<GroupId>,
    removed_list: VecDeque<GroupId>,
    necessary_list: VecDeque<GroupId>,
    fake: HashSet<GroupId>,
    version: u64,
    var_mode: bool,
    resolution_graph: Option<ResolutionGraph>,
}

impl MusState {
    pub fn new(var_mode: bool) -> Self {
        MusState {
            removed: FxHashSet::default(),
            necessary: FxHashSet::default(),
            removed_list: VecDeque::new(),
            necessary_list: VecDeque::new(),
            fake: HashSet::new(),
            version: 0,
            var_mode,
            resolution_graph: None,
        }
    }

    pub fn var_mode(&self) -> bool {
        self.var_mode
    }

    pub fn attach_resolution_graph(&mut self, graph: ResolutionGraph) {
        self.resolution_graph = Some(graph);
    }

    pub fn resolution_graph(&self) -> Option<&ResolutionGraph> {
        self.resolution_graph.as_ref()
    }

    pub fn resolution_graph_mut(&mut self) -> Option<&mut ResolutionGraph> {
        self.resolution_graph.as_mut()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn status(&self, g: GroupId) -> GroupStatus {
        if self.removed.contains(&g) {
            GroupStatus::Removed
        } else if self.necessary.contains(&g) {
            GroupStatus::Necessary
        } else {
            GroupStatus::Untested
        }
    }

    pub fn removed(&self) -> &FxHashSet<GroupId> {
        &self.removed
    }

    pub fn necessary(&self) -> &FxHashSet<GroupId> {
        &self.necessary
    }

    pub fn removed_list(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.removed_list.iter().copied()
    }

    pub fn necessary_list(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.necessary_list.iter().copied()
    }

    pub fn fake(&self) -> &HashSet<GroupId> {
        &self.fake
    }

    pub fn real_gsize(&self, gset: &GroupSet) -> usize {
        gset.groups().count() - self.removed.len()
    }

    pub fn num_untested(&self, gset: &GroupSet) -> usize {
        let has_g0 = gset.has_group0() as usize;
        gset.groups().count() - has_g0 - (self.necessary.len() + self.removed.len())
    }

    /// Marks `g` removed: inserts into `R`/`R_list`, removes its clauses from
    /// the group set, and (if a dynamic resolution graph is live) evicts its
    /// clauses from the graph, returning their former neighbours so a
    /// graph-aware scheduler can refresh priorities.
    pub fn mark_removed(
        &mut self,
        store: &mut ClauseStore,
        gset: &mut GroupSet,
        g: GroupId,
        fake: bool,
    ) -> Result<Vec<ClauseId>> {
        if self.removed.contains(&g) || self.necessary.contains(&g) {
            return Err(GmusError::LogicBug(format!(
                "group {g} already classified when marking removed"
            )));
        }
        debug_assert_ne!(g, HARD_GROUP, "group 0 must never be classified");

        let mut touched_neighbors = Vec::new();
        if let Some(graph) = self.resolution_graph.as_mut().filter(|g| g.is_dynamic()) {
            for &clause_id in gset.clauses_of(g) {
                touched_neighbors.extend(graph.remove_clause(clause_id));
            }
        }

        self.removed.insert(g);
        self.removed_list.push_front(g);
        gset.remove_group(store, g);
        if fake {
            self.fake.insert(g);
        }
        Ok(touched_neighbors)
    }

    /// Marks `g` necessary: inserts into `N`/`N_list`.
    pub fn mark_necessary(&mut self, g: GroupId, fake: bool) -> Result<()> {
        if self.removed.contains(&g) || self.necessary.contains(&g) {
            return Err(GmusError::LogicBug(format!(
                "group {g} already classified when marking necessary"
            )));
        }
        debug_assert_ne!(g, HARD_GROUP, "group 0 must never be classified");
        self.necessary.insert(g);
        self.necessary_list.push_front(g);
        if fake {
            self.fake.insert(g);
        }
        Ok(())
    }

    pub fn clear_lists(&mut self) {
        self.removed_list.clear();
        self.necessary_list.clear();
    }

    /// Invariant check used by tests and debug assertions: `R ∩ N = ∅`.
    pub fn check_invariants(&self) -> Result<()> {
        if self.removed.intersection(&self.necessary).next().is_some() {
            return Err(GmusError::LogicBug(
                "R and N are not disjoint".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_removed_then_necessary_is_rejected() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let c = store.make_clause(vec![1], 1, false).unwrap();
        gset.set_clause_group(&store, c, 1).unwrap();
        let mut state = MusState::new(false);
        state.mark_removed(&mut store, &mut gset, 1, false).unwrap();
        assert!(state.mark_necessary(1, false).is_err());
        assert_eq!(state.status(1), GroupStatus::Removed);
    }

    #[test]
    fn lists_are_most_recent_first() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        for g in 1..=3u32 {
            let c = store.make_clause(vec![g as i64], g, false).unwrap();
            gset.set_clause_group(&store, c, g).unwrap();
        }
        let mut state = MusState::new(false);
        state.mark_removed(&mut store, &mut gset, 1, false).unwrap();
        state.mark_removed(&mut store, &mut gset, 2, false).unwrap();
        state.mark_necessary(3, false).unwrap();
        assert_eq!(state.removed_list().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(state.necessary_list().collect::<Vec<_>>(), vec![3]);
    }
}
