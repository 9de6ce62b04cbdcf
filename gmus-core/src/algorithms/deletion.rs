//! Deletion algorithm (§4.8.1): offer every untested group to the oracle in
//! scheduler order; UNSAT removes it (and whatever the refined core also
//! clears), SAT marks it (and whatever rotation finds) necessary.

use crate::clause::ClauseStore;
use crate::error::Result;
use crate::group_set::GroupSet;
use crate::mus_state::{GroupStatus, MusState};
use crate::oracle::{GroupOracle, GroupQuery, SolveOutcome};
use crate::scheduler::Scheduler;

use super::{apply_sat, apply_unsat, final_result, short_circuit_all_unnecessary, ExtractionOptions, ExtractionResult, IterationBudget};

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
        let Some(g) = scheduler.next_candidate() else {
            break;
        };
        if !matches!(state.status(g), GroupStatus::Untested) {
            continue;
        }
        if !budget.allow_iteration() {
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
                apply_unsat(
                    store,
                    gset,
                    state,
                    oracle,
                    scheduler,
                    g,
                    result.core.as_ref(),
                    result.tainted,
                    opts,
                )?;
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
    use crate::ids::GroupId;
    use crate::oracle::IncrementalOracle;
    use crate::scheduler::{LinearScheduler, StaticOrderScheduler};

    /// `(x) ∧ (¬x)` over two groups: both must end up necessary, since
    /// removing either leaves the remainder satisfiable.
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

        let mut scheduler = LinearScheduler::new(vec![1, 2], false);
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

    /// `(x) ∧ (x ∨ y) ∧ (¬x)`: the middle group is redundant given the
    /// first, so deletion should remove it and mark the other two necessary.
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

        // Offer the redundant group first so its removal is observed
        // directly rather than via rotation from a different group.
        let mut scheduler = StaticOrderScheduler::new(vec![2, 1, 3]);
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
        let removed: Vec<GroupId> = state.removed().iter().copied().collect();
        assert_eq!(removed, vec![2]);
    }
}
