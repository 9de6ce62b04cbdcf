//! Extraction algorithms (C8): three drivers sharing one oracle/scheduler
//! contract, grounded in `original_source/src/mus-2/mus_extractor.cc`'s
//! `deletion()`/`insertion()`/`dichotomic_search()` (§4.8). All three
//! preserve "`gset \ R` is unsatisfiable" as a loop invariant.

pub mod deletion;
pub mod dichotomic;
pub mod insertion;

use rustc_hash::FxHashSet;

use crate::clause::ClauseStore;
use crate::error::Result;
use crate::group_set::GroupSet;
use crate::ids::{GroupId, HARD_GROUP};
use crate::mus_state::MusState;
use crate::refiner::refine_unnecessary;
use crate::rotation;

/// Whether an extraction run finished having classified every group, or
/// stopped early under a budget with some groups still untested (§4.8.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionResult {
    Exact,
    Approximate,
}

/// Knobs shared by all three drivers; a direct mapping of §6.1's
/// `set_finalize_necessary_groups`/RR/rotation configuration onto the
/// per-run options each algorithm consults.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionOptions {
    pub use_rr: bool,
    /// Disable RR after the first tainted result, per §4.8.1's "adaptive"
    /// tie-break; re-queries the affected groups individually afterwards.
    pub adaptive_rr: bool,
    pub refine: bool,
    pub rotation: bool,
    pub rotation_depth: Option<usize>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        ExtractionOptions {
            use_rr: false,
            adaptive_rr: true,
            refine: true,
            rotation: true,
            rotation_depth: None,
        }
    }
}

/// Resource gate consulted once per scheduler pop. Implemented by
/// `supervisor::Supervisor`; tests and simple callers can use
/// `UnboundedBudget`.
pub trait IterationBudget {
    /// Returns `false` once the run should stop early (§4.8.4 "configured
    /// CPU or iteration budget is exhausted").
    fn allow_iteration(&mut self) -> bool;
}

/// A budget that never runs out; used by tests and by callers that manage
/// termination some other way (e.g. a wall-clock timeout at a higher layer).
pub struct UnboundedBudget;

impl IterationBudget for UnboundedBudget {
    fn allow_iteration(&mut self) -> bool {
        true
    }
}

/// Marks every still-untested group unnecessary in one shot. Used for the
/// empty-clause short-circuit (§4.8.1 "a discovered empty clause short-
/// circuits to all groups unnecessary immediately") and shared by all three
/// drivers at startup.
pub(crate) fn short_circuit_all_unnecessary(
    store: &mut ClauseStore,
    gset: &mut GroupSet,
    state: &mut MusState,
) -> Result<()> {
    let untested: Vec<GroupId> = gset
        .groups()
        .filter(|&g| g != HARD_GROUP && matches!(state.status(g), crate::mus_state::GroupStatus::Untested))
        .collect();
    for g in untested {
        state.mark_removed(store, gset, g, false)?;
    }
    state.bump_version();
    Ok(())
}

/// Applies an UNSAT probe result to `state`/`scheduler`/`oracle`: refines
/// the core (if trustworthy) into the full unnecessary set, marks every
/// group in it removed (telling the oracle to permanently drop each one, so
/// a later `probe`'s own reactivation of the originally-probed group can't
/// resurrect a group this step just removed), and (if adaptive RR is on and
/// the result was tainted) disables RR on `opts` and fast-tracks the
/// refined groups for a cleaner re-test. Shared between `deletion` and
/// `insertion`, which both react to UNSAT the same way — only what they
/// solve over differs.
pub(crate) fn apply_unsat(
    store: &mut ClauseStore,
    gset: &mut GroupSet,
    state: &mut MusState,
    oracle: &mut dyn crate::oracle::GroupOracle,
    scheduler: &mut dyn crate::scheduler::Scheduler,
    group: GroupId,
    core: Option<&FxHashSet<GroupId>>,
    tainted: bool,
    opts: &mut ExtractionOptions,
) -> Result<Vec<GroupId>> {
    let unnecessary = refine_unnecessary(gset, state, group, core, tainted);
    for &g in &unnecessary {
        let touched = state.mark_removed(store, gset, g, false)?;
        scheduler.notify_removed(g, &touched);
        oracle.delete(g)?;
    }
    state.bump_version();

    if tainted && opts.adaptive_rr {
        opts.use_rr = false;
        for &g in unnecessary.iter().filter(|&&g| g != group) {
            scheduler.fasttrack(g);
        }
    }

    Ok(unnecessary)
}

/// Applies a SAT probe result: runs model rotation from `group` (if enabled)
/// and marks everything it finds necessary, fast-tracking depth-cut
/// suspects. Shared between `deletion` and `insertion`.
pub(crate) fn apply_sat(
    store: &ClauseStore,
    gset: &GroupSet,
    state: &mut MusState,
    scheduler: &mut dyn crate::scheduler::Scheduler,
    group: GroupId,
    model: Option<Vec<bool>>,
    opts: &ExtractionOptions,
) -> Result<Vec<GroupId>> {
    let necessary = if opts.rotation {
        if let Some(mut model) = model {
            let rotated = rotation::rotate(store, gset, state, &mut model, group, opts.rotation_depth);
            for g in rotated.fasttrack {
                scheduler.fasttrack(g);
            }
            rotated.necessary
        } else {
            vec![group]
        }
    } else {
        vec![group]
    };

    for &g in &necessary {
        state.mark_necessary(g, false)?;
        scheduler.notify_necessary(g);
    }

    Ok(necessary)
}

/// Final verdict once a driver's loop exits: exact iff every non-hard group
/// has been classified.
pub(crate) fn final_result(gset: &GroupSet, state: &MusState) -> ExtractionResult {
    if state.num_untested(gset) == 0 {
        ExtractionResult::Exact
    } else {
        ExtractionResult::Approximate
    }
}
