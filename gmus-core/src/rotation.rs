//! Model rotator (C6): propagates further necessary groups from a single
//! `SAT` answer by flipping the one literal that falsifies the probed
//! group's clause and checking whether that flip, in turn, falsifies some
//! other currently-satisfied clause.
//!
//! Grounded in `original_source/src/mus-2/mus_extractor.cc`'s rotation step;
//! the occurrence-list walk is the same one `basic_group_set.hh`'s
//! `occs_list.hh` is built to support.

use rustc_hash::FxHashSet;

use crate::clause::ClauseStore;
use crate::group_set::GroupSet;
use crate::ids::{var_of, ClauseId, GroupId, Literal, Variable};
use crate::mus_state::{GroupStatus, MusState};

pub struct RotationResult {
    /// Groups proven necessary by this rotation, always including the
    /// starting group.
    pub necessary: Vec<GroupId>,
    /// Groups whose necessity is suspected (the chain was cut short by the
    /// depth limit) but not proven; used to bias scheduling only.
    pub fasttrack: Vec<GroupId>,
}

#[inline]
fn literal_true(model: &[bool], lit: Literal) -> bool {
    let var = var_of(lit) as usize;
    if var == 0 || var > model.len() {
        return false;
    }
    model[var - 1] == (lit > 0)
}

/// Active literals of `g`'s clauses that are entirely falsified by `model`,
/// i.e. every active literal is false. Per the construction that calls this
/// (the probed group's clauses must be false under a model that satisfies
/// everything else), at least one should exist in the common case, but the
/// group may be multi-clause or the assumption degenerate — callers must
/// tolerate an empty result.
fn falsified_clauses_of(store: &ClauseStore, gset: &GroupSet, model: &[bool], g: GroupId) -> Vec<ClauseId> {
    gset.clauses_of(g)
        .iter()
        .copied()
        .filter(|&id| {
            let clause = store.get(id);
            !clause.is_removed()
                && clause
                    .active_literals()
                    .iter()
                    .all(|&lit| !literal_true(model, lit))
        })
        .collect()
}

/// Runs recursive model rotation starting from `group`, whose clauses are
/// falsified by `model`. `model` is mutated in place as the rotation
/// commits literal flips; the caller should treat it as scratch space after
/// the call (clone beforehand if the original model is still needed).
pub fn rotate(
    store: &ClauseStore,
    gset: &GroupSet,
    state: &MusState,
    model: &mut [bool],
    group: GroupId,
    depth_limit: Option<usize>,
) -> RotationResult {
    let mut necessary = vec![group];
    let mut fasttrack = Vec::new();

    if !gset.has_occurrence_lists() {
        return RotationResult {
            necessary,
            fasttrack,
        };
    }

    let mut necessary_set: FxHashSet<GroupId> = necessary.iter().copied().collect();
    let mut visited_vars: FxHashSet<Variable> = FxHashSet::default();

    let seeds = falsified_clauses_of(store, gset, model, group);
    let mut stack: Vec<(ClauseId, usize)> = seeds.into_iter().map(|c| (c, 0)).collect();

    while let Some((clause_id, depth)) = stack.pop() {
        if let Some(limit) = depth_limit {
            if depth >= limit {
                continue;
            }
        }
        let clause = store.get(clause_id);
        if clause.is_removed() {
            continue;
        }
        let literals: Vec<Literal> = clause.active_literals().to_vec();

        for lit in literals {
            let var = var_of(lit);
            if visited_vars.contains(&var) {
                continue;
            }

            // Flipping `var` makes `lit` true; any clause satisfied solely
            // by `-lit` becomes falsified by the flip. Soundness (§4.6)
            // requires that exactly one *other* group becomes falsified by
            // this flip — collect every eligible falsified candidate first
            // and only commit to a flip when they all agree on one group,
            // rather than taking whichever occurs first.
            let (candidates, _) = gset.occurrences(-lit);
            let mut eligible: Vec<(ClauseId, GroupId)> = Vec::new();
            for &candidate in candidates {
                if candidate == clause_id {
                    continue;
                }
                let cand_clause = store.get(candidate);
                if cand_clause.is_removed() {
                    continue;
                }
                let becomes_falsified = cand_clause
                    .active_literals()
                    .iter()
                    .all(|&m| m == -lit || !literal_true(model, m));
                if becomes_falsified {
                    let g = cand_clause.group();
                    if g != group
                        && !necessary_set.contains(&g)
                        && matches!(state.status(g), GroupStatus::Untested)
                    {
                        eligible.push((candidate, g));
                    }
                }
            }

            let mut distinct_groups: Vec<GroupId> = eligible.iter().map(|&(_, g)| g).collect();
            distinct_groups.sort_unstable();
            distinct_groups.dedup();
            let found = if distinct_groups.len() == 1 {
                eligible.first().copied()
            } else {
                None
            };

            if let Some((next_clause, next_group)) = found {
                let idx = var as usize - 1;
                if idx < model.len() {
                    model[idx] = !model[idx];
                }
                visited_vars.insert(var);
                necessary_set.insert(next_group);
                necessary.push(next_group);
                if depth_limit.map(|limit| depth + 1 < limit).unwrap_or(true) {
                    stack.push((next_clause, depth + 1));
                } else {
                    fasttrack.push(next_group);
                }
            }
        }
    }

    RotationResult {
        necessary,
        fasttrack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chain_rotation_finds_second_group() {
        // group 1: (1)        -- falsified when model[1]=false
        // group 2: (-1, 2)    -- critical on -1 when model[1]=false, model[2]=false
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(true);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1, 2], 2, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();

        let state = MusState::new(false);
        let mut model = vec![false, false]; // var1=false, var2=false
        let result = rotate(&store, &gset, &state, &mut model, 1, None);
        assert_eq!(result.necessary, vec![1, 2]);
    }

    /// A flip that falsifies clauses in *two* distinct untested groups at
    /// once proves neither necessary (§4.6's uniqueness precondition), so
    /// rotation must stop at the starting group instead of picking whichever
    /// candidate occurs first in the occurrence list.
    #[test]
    fn ambiguous_flip_proves_nothing() {
        // group 1: (1)         -- falsified when model[1]=false
        // group 2: (-1, 2)     -- also becomes falsified if var1 flips true
        // group 3: (-1, 3)     -- also becomes falsified if var1 flips true
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(true);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1, 2], 2, false).unwrap();
        let c3 = store.make_clause(vec![-1, 3], 3, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        gset.set_clause_group(&store, c3, 3).unwrap();

        let state = MusState::new(false);
        let mut model = vec![false, false, false]; // var1=var2=var3=false
        let result = rotate(&store, &gset, &state, &mut model, 1, None);
        assert_eq!(result.necessary, vec![1]);
    }

    #[test]
    fn no_occurrence_lists_falls_back_to_group_only() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        let state = MusState::new(false);
        let mut model = vec![false];
        let result = rotate(&store, &gset, &state, &mut model, 1, None);
        assert_eq!(result.necessary, vec![1]);
    }
}
