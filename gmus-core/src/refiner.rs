//! Core refiner (C5): turns a solver's UNSAT core into the full set of
//! groups that can be marked unnecessary in one step.
//!
//! Grounded in `original_source/src/mus-2/mus_extractor.cc`'s refinement
//! step and `check_group_status.hh`'s `unnec_gids()`/`tainted_core()`.

use rustc_hash::FxHashSet;

use crate::group_set::GroupSet;
use crate::ids::{GroupId, HARD_GROUP};
use crate::mus_state::{GroupStatus, MusState};

/// Computes the set of groups to mark removed after `group` tested
/// unnecessary, given the solver's `core` (if refinement was requested) and
/// whether the query was tainted by the redundancy-removal trick.
///
/// When `core` is `None` (refinement not requested) or `tainted` is `true`,
/// only `group` itself is returned — refinement only fires when the core is
/// both present and trustworthy (§4.5).
pub fn refine_unnecessary(
    gset: &GroupSet,
    state: &MusState,
    group: GroupId,
    core: Option<&FxHashSet<GroupId>>,
    tainted: bool,
) -> Vec<GroupId> {
    let Some(core) = core.filter(|_| !tainted) else {
        return vec![group];
    };

    let mut unnecessary = vec![group];
    for g in gset.groups() {
        if g == group || g == HARD_GROUP || core.contains(&g) {
            continue;
        }
        if matches!(state.status(g), GroupStatus::Untested) {
            unnecessary.push(g);
        }
    }
    unnecessary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseStore;

    #[test]
    fn refines_beyond_the_core_when_untainted() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        for g in 1..=4u32 {
            let c = store.make_clause(vec![g as i64], g, false).unwrap();
            gset.set_clause_group(&store, c, g).unwrap();
        }
        let state = MusState::new(false);
        let core: FxHashSet<GroupId> = [1u32].into_iter().collect();
        let removed = refine_unnecessary(&gset, &state, 2, Some(&core), false);
        let mut removed_sorted = removed;
        removed_sorted.sort_unstable();
        assert_eq!(removed_sorted, vec![2, 3, 4]);
    }

    #[test]
    fn tainted_core_only_removes_the_probed_group() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        for g in 1..=3u32 {
            let c = store.make_clause(vec![g as i64], g, false).unwrap();
            gset.set_clause_group(&store, c, g).unwrap();
        }
        let state = MusState::new(false);
        let core: FxHashSet<GroupId> = [1u32].into_iter().collect();
        let removed = refine_unnecessary(&gset, &state, 2, Some(&core), true);
        assert_eq!(removed, vec![2]);
    }
}
