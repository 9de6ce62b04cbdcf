//! Oracle adapter (C4): a uniform group-based SAT interface over either an
//! incremental (selector-variable) or re-initialised backend, grounded in
//! `examples/radrow-satisfaction/solver/src/cadical_solver.rs`'s treatment
//! of `cadical::Solver` as a narrow oracle behind the teacher's `Solver`
//! trait. Only this contract is in scope — the solver's internal search is
//! explicitly a thin collaborator (§1).

mod incremental;
mod reinit;

pub use incremental::IncrementalOracle;
pub use reinit::ReinitOracle;

use rustc_hash::FxHashSet;

use crate::clause::ClauseStore;
use crate::error::Result;
use crate::group_set::GroupSet;
use crate::ids::{GroupId, Literal};

/// Outcome of a single `solve()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Sat,
    Unsat,
    /// Soft resource exhaustion (`§7` `OracleUnknown`).
    Unknown,
}

/// Soft per-call resource budgets. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub struct Budgets {
    pub conflicts: Option<u64>,
    pub cpu_seconds: Option<f64>,
}

/// A query against the oracle for a single candidate group, mirroring
/// `original_source/src/mus-2/check_group_status.hh`'s `CheckGroupStatus`
/// work item.
#[derive(Debug, Clone, Copy)]
pub struct GroupQuery {
    pub group: GroupId,
    /// If the group turns out unnecessary, request the refined core so
    /// additional unnecessary groups can be discovered in the same step.
    pub refine: bool,
    /// If the group turns out necessary, request the satisfying model so
    /// model rotation can run.
    pub need_model: bool,
    /// Use the redundancy-removal trick: inject the negation of `group`'s
    /// clauses as assumptions to test entailment-redundancy in one call, at
    /// the cost of possibly tainting the returned core (§4.5).
    pub use_rr: bool,
}

/// Result of a [`GroupQuery`].
pub struct QueryResult {
    pub outcome: SolveOutcome,
    /// Populated when `outcome == Sat` and `need_model` was requested.
    pub model: Option<Vec<bool>>,
    /// Populated when `outcome == Unsat`: the group ids identified by the
    /// solver as sufficient for the conflict. Always a subset of the
    /// activated (non-final) groups.
    pub core: Option<FxHashSet<GroupId>>,
    /// True if `use_rr` was set and the core therefore cannot be trusted to
    /// certify groups *outside* the core as unnecessary (§4.5).
    pub tainted: bool,
}

/// Capability trait every oracle backend implements. Both backends are
/// constructed once per extraction run and own their own solver instance(s);
/// per §9's "global singletons" note, there is no process-wide solver state.
pub trait GroupOracle {
    /// Registers all currently active clauses of `g`. `is_final` means `g`
    /// can never be deactivated or deleted again (it becomes permanent,
    /// like group 0).
    fn add_group(
        &mut self,
        store: &ClauseStore,
        gset: &GroupSet,
        g: GroupId,
        is_final: bool,
    ) -> Result<()>;

    /// Toggles the inclusion of a non-final group in subsequent solves.
    fn activate(&mut self, g: GroupId) -> Result<()>;
    fn deactivate(&mut self, g: GroupId) -> Result<()>;

    /// Permanently drops a non-final group from the oracle.
    fn delete(&mut self, g: GroupId) -> Result<()>;

    fn set_budgets(&mut self, budgets: Budgets);

    /// Solves `{final clauses} ∪ {active non-final groups} ∪ extra_assumptions`.
    fn solve(&mut self, extra_assumptions: &[Literal]) -> SolveOutcome;

    /// Valid immediately after a `Sat` outcome: `model()[v - 1]` is the
    /// value assigned to variable `v`.
    fn model(&self) -> Option<&[bool]>;

    /// Valid immediately after an `Unsat` outcome.
    fn core(&self) -> Option<&FxHashSet<GroupId>>;

    /// Convenience wrapper used by the extraction algorithms: deactivates
    /// `query.group`, solves, and reactivates it before returning — the
    /// oracle's activation state models "currently still in the candidate
    /// formula" and must be left unchanged by a single necessity probe.
    fn probe(&mut self, query: GroupQuery) -> Result<QueryResult>;
}
