//! Insertion algorithm (§4.8.2): grow a working set `W` (plus the always-on
//! final groups) from empty by repeatedly activating scheduler-picked
//! groups while the oracle stays SAT. The group whose activation flips the
//! oracle to UNSAT is a transition witness — `W` minus it was satisfiable,
//! `W` is not, so it is necessary. The UNSAT core identifies which of the
//! other members of `W` were actually needed for that contradiction; the
//! rest can be marked unnecessary immediately instead of waiting for a
//! later round to retest them.

use crate::clause::ClauseStore;
use crate::error::Result;
use crate::group_set::GroupSet;
use crate::ids::GroupId;
use crate::mus_state::{GroupStatus, MusState};
use crate::oracle::{GroupOracle, SolveOutcome};
use crate::rotation;
use crate::scheduler::Scheduler;

use super::{final_result, short_circuit_all_unnecessary, ExtractionOptions, ExtractionResult, IterationBudget};

fn next_untested(state: &MusState, scheduler: &mut dyn Scheduler) -> Option<GroupId> {
    loop {
        let g = scheduler.next_candidate()?;
        if matches!(state.status(g), GroupStatus::Untested) {
            return Some(g);
        }
    }
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

    for g in gset.groups() {
        let _ = oracle.deactivate(g);
    }

    let mut working: Vec<GroupId> = Vec::new();
    let mut pending_model: Option<Vec<bool>> = None;

    loop {
        match oracle.solve(&[]) {
            SolveOutcome::Sat => {
                pending_model = oracle.model().map(|m| m.to_vec());
                let Some(g) = next_untested(state, scheduler) else {
                    break;
                };
                if !budget.allow_iteration() {
                    for w in working.drain(..) {
                        let _ = oracle.deactivate(w);
                        scheduler.reschedule(w);
                    }
                    return Ok(ExtractionResult::Approximate);
                }
                oracle.activate(g)?;
                working.push(g);
            }
            SolveOutcome::Unknown => {
                let Some(stalled) = working.pop() else {
                    break;
                };
                oracle.deactivate(stalled)?;
                scheduler.reschedule(stalled);
            }
            SolveOutcome::Unsat if working.is_empty() => {
                // The permanent background alone is already unsatisfiable
                // (§8 property 11's sibling case for group 0): no non-hard
                // group is needed at all, so the GMUS is empty.
                break;
            }
            SolveOutcome::Unsat => {
                let witness = *working
                    .last()
                    .expect("insertion reaches UNSAT only after activating at least one group");
                let core = if opts.refine { oracle.core().cloned() } else { None };

                for &w in &working {
                    if w == witness {
                        continue;
                    }
                    let still_needed = core.as_ref().map_or(true, |c| c.contains(&w));
                    if still_needed {
                        oracle.deactivate(w)?;
                        scheduler.reschedule(w);
                    } else {
                        let touched = state.mark_removed(store, gset, w, false)?;
                        scheduler.notify_removed(w, &touched);
                        oracle.delete(w)?;
                    }
                }
                working.clear();
                state.bump_version();

                let necessary = if opts.rotation {
                    if let Some(mut model) = pending_model.take() {
                        let rotated =
                            rotation::rotate(store, gset, state, &mut model, witness, opts.rotation_depth);
                        for g in rotated.fasttrack {
                            scheduler.fasttrack(g);
                        }
                        rotated.necessary
                    } else {
                        vec![witness]
                    }
                } else {
                    vec![witness]
                };

                for &g in &necessary {
                    state.mark_necessary(g, false)?;
                    scheduler.notify_necessary(g);
                    // `g` may be a group rotation found necessary without it
                    // ever entering `working` this round; make sure it is
                    // (and stays) active for every future solve.
                    oracle.activate(g).ok();
                }
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

    /// `(x) ∧ (¬x)`: insertion must find both groups necessary, same as
    /// deletion, just via growth instead of shrinkage.
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

    /// `(x) ∧ (x ∨ y) ∧ (¬x)`: the middle group should come out unnecessary
    /// via the UNSAT-core check on the final (three-group) working set.
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

        let mut scheduler = StaticOrderScheduler::new(vec![2, 1, 3]);
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
        assert!(!state.necessary().contains(&2));
    }
}
