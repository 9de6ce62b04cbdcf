//! Dichotomic (binary search) driver (§4.8.3): used mostly for shallow
//! reductions in combination with one of the other two drivers. Given the
//! remaining untested groups in scheduler order, repeatedly tests the
//! satisfiability of a prefix (plus the already-necessary groups and
//! group 0); when the prefix is UNSAT the suffix is unnecessary in one
//! shot, when it is SAT the search narrows towards the groups that make it
//! UNSAT.
//!
//! Grounded in `original_source/src/mus-2/mus_extractor.cc`'s
//! `dichotomic_search()`: it does not classify a single group as necessary
//! by itself (a binary search only ever proves a whole suffix redundant),
//! so after narrowing to a one-group window this driver falls back to a
//! direct `is_necessary?` probe, exactly like `deletion::run` would for
//! that group, reusing the same SAT/UNSAT interpretation.

use crate::clause::ClauseStore;
use crate::error::Result;
use crate::group_set::GroupSet;
use crate::ids::GroupId;
use crate::mus_state::{GroupStatus, MusState};
use crate::oracle::{GroupOracle, GroupQuery, SolveOutcome};
use crate::scheduler::Scheduler;

use super::{apply_sat, apply_unsat, final_result, short_circuit_all_unnecessary, ExtractionOptions, ExtractionResult, IterationBudget};

/// Drains the scheduler into a plain sequence of still-untested groups.
/// Dichotomic search needs random access into the remaining order, which a
/// pull-only `Scheduler` does not offer, so the order is materialised once
/// up front; `reschedule`/`fasttrack` calls made while processing this
/// sequence only affect groups, if any, that a later top-level call
/// re-offers.
fn drain_untested(state: &MusState, scheduler: &mut dyn Scheduler) -> Vec<GroupId> {
    let mut order = Vec::new();
    while let Some(g) = scheduler.next_candidate() {
        if matches!(state.status(g), GroupStatus::Untested) {
            order.push(g);
        }
    }
    order
}

/// Solves the formula restricted to `{final clauses} ∪ necessary ∪ prefix`
/// by activating exactly `prefix` among the non-final candidate groups.
fn solve_prefix(
    oracle: &mut dyn GroupOracle,
    state: &MusState,
    all_candidates: &[GroupId],
    prefix_len: usize,
) -> SolveOutcome {
    let active: std::collections::HashSet<GroupId> = all_candidates[..prefix_len].iter().copied().collect();
    for &g in all_candidates {
        let should_be_active = active.contains(&g) || matches!(state.status(g), GroupStatus::Necessary);
        if should_be_active {
            let _ = oracle.activate(g);
        } else {
            let _ = oracle.deactivate(g);
        }
    }
    oracle.solve(&[])
}

pub fn run(
    store: &mut ClauseStore,
    gset: &mut GroupSet,
    state: &mut MusState,
    oracle: &mut dyn GroupOracle,
    scheduler: &mut dyn Scheduler,
    budget: &mut dyn IterationBudget,
    opts: &mut ExtractionOptions,
) -> Result<ExtractionResult> {
    if store.empty_clause().is_some() {
        short_circuit_all_unnecessary(store, gset, state)?;
        return Ok(final_result(gset, state));
    }

    loop {
        let mut window = drain_untested(state, scheduler);
        if window.is_empty() {
            break;
        }

        while window.len() > 1 {
            if !budget.allow_iteration() {
                for g in window {
                    scheduler.reschedule(g);
                }
                return Ok(ExtractionResult::Approximate);
            }

            let mid = window.len() / 2;
            match solve_prefix(oracle, state, &window, mid) {
                SolveOutcome::Unsat => {
                    // The prefix alone (plus necessary/group 0) is already
                    // UNSAT: every group in the suffix is unnecessary.
                    let core = if opts.refine { oracle.core().cloned() } else { None };
                    let suffix = &window[mid..];
                    let tainted = false;
                    for &g in suffix {
                        apply_unsat(store, gset, state, oracle, scheduler, g, core.as_ref(), tainted, opts)?;
                    }
                    window.truncate(mid);
                }
                SolveOutcome::Sat => {
                    // Narrow towards the half that, combined with the rest
                    // of the candidates still outside the prefix, is
                    // responsible for the instance's unsatisfiability: drop
                    // the first half, which on its own wasn't enough.
                    window.drain(..mid);
                }
                SolveOutcome::Unknown => {
                    for g in window.drain(..) {
                        scheduler.reschedule(g);
                    }
                    window.clear();
                    break;
                }
            }
        }

        let Some(&g) = window.first() else {
            continue;
        };
        if !budget.allow_iteration() {
            scheduler.reschedule(g);
            return Ok(ExtractionResult::Approximate);
        }

        let query = GroupQuery {
            group: g,
            refine: opts.refine,
            need_model: opts.rotation,
            use_rr: opts.use_rr,
        };
        let result = oracle.probe(query)?;
        match result.outcome {
            SolveOutcome::Unsat => {
                apply_unsat(store, gset, state, oracle, scheduler, g, result.core.as_ref(), result.tainted, opts)?;
            }
            SolveOutcome::Sat => {
                apply_sat(store, gset, state, scheduler, g, result.model, opts)?;
            }
            SolveOutcome::Unknown => {
                scheduler.reschedule(g);
            }
        }
    }

    Ok(final_result(gset, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::IncrementalOracle;
    use crate::scheduler::StaticOrderScheduler;

    /// `(x) ∧ (¬x)`: both groups necessary, same invariant as the other two
    /// drivers.
    #[test]
    fn two_group_contradiction_both_necessary() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(true);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1], 2, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();

        let mut state = MusState::new(false);
        let mut oracle = IncrementalOracle::new(gset.max_variable());
        oracle.add_group(&store, &gset, 1, false).unwrap();
        oracle.add_group(&store, &gset, 2, false).unwrap();

        let mut scheduler = StaticOrderScheduler::new(vec![1, 2]);
        let mut budget = crate::algorithms::UnboundedBudget;
        let mut opts = ExtractionOptions {
            rotation: false,
            ..ExtractionOptions::default()
        };

        let outcome = run(
            &mut store,
            &mut gset,
            &mut state,
            &mut oracle,
            &mut scheduler,
            &mut budget,
            &mut opts,
        )
        .unwrap();

        assert_eq!(outcome, ExtractionResult::Exact);
        assert_eq!(state.necessary().len(), 2);
        assert!(state.removed().is_empty());
    }

    /// `(x) ∧ (x ∨ y) ∧ (¬x)`: the redundant middle group should be cleared
    /// by a prefix-UNSAT step rather than by an individual probe.
    #[test]
    fn redundant_group_is_removed() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(true);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![1, 2], 2, false).unwrap();
        let c3 = store.make_clause(vec![-1], 3, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        gset.set_clause_group(&store, c3, 3).unwrap();

        let mut state = MusState::new(false);
        let mut oracle = IncrementalOracle::new(gset.max_variable());
        for g in [1u32, 2, 3] {
            oracle.add_group(&store, &gset, g, false).unwrap();
        }

        let mut scheduler = StaticOrderScheduler::new(vec![1, 2, 3]);
        let mut budget = crate::algorithms::UnboundedBudget;
        let mut opts = ExtractionOptions {
            rotation: false,
            use_rr: false,
            ..ExtractionOptions::default()
        };

        let outcome = run(
            &mut store,
            &mut gset,
            &mut state,
            &mut oracle,
            &mut scheduler,
            &mut budget,
            &mut opts,
        )
        .unwrap();

        assert_eq!(outcome, ExtractionResult::Exact);
        assert!(!state.necessary().contains(&2));
    }
}
