//! Variable-group mode (§6.3 VGCNF, §9 "Variable-group mode" design note):
//! compute a minimal set of *variables* whose universal projection makes the
//! formula unsatisfiable, instead of a minimal set of clause groups.
//!
//! §9 describes the query informally as "is the formula unsatisfiable when
//! the variables of the group are universally projected ... by giving the
//! solver the set of clauses but allowing assumptions to fix variables in
//! the non-tested groups." Concretely: every clause is gated behind the OR
//! of the negated selectors of every variable-group whose variables it
//! mentions, so a clause only participates in a solve when *every*
//! variable-group it touches is active. Testing "is variable-group `vg`
//! necessary?" then reduces to the same deactivate/solve/reactivate probe
//! `IncrementalOracle` already implements for clause groups — only the
//! meaning of "active" changes (a disjunction of selectors rather than one).
//!
//! Grounded in `oracle/incremental.rs`'s selector-gating scheme, generalised
//! from one selector per clause group to one selector per variable group.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::algorithms::{ExtractionResult, IterationBudget};
use crate::clause::ClauseStore;
use crate::error::{GmusError, Result};
use crate::group_set::GroupSet;
use crate::ids::{GroupId, Literal, Variable};
use crate::oracle::{Budgets, GroupOracle, GroupQuery, QueryResult, SolveOutcome};
use crate::scheduler::Scheduler;

/// Maps every variable to the variable-group (§6.3 `{vg} v1 v2 ... 0`) it
/// belongs to. Variables absent from the map default to variable-group 0
/// (the permanent, always-active group), per §6.3.
#[derive(Debug, Default, Clone)]
pub struct VariableGroupMap {
    assignment: FxHashMap<Variable, GroupId>,
}

impl VariableGroupMap {
    pub fn new() -> Self {
        VariableGroupMap::default()
    }

    /// Assigns `var` to `vg`, rejecting a variable listed in two different
    /// variable-groups (§6.3 gives each variable exactly one group).
    pub fn assign(&mut self, var: Variable, vg: GroupId) -> Result<()> {
        match self.assignment.insert(var, vg) {
            Some(previous) if previous != vg => Err(GmusError::MalformedInput(format!(
                "variable {var} assigned to both variable-group {previous} and {vg}"
            ))),
            _ => Ok(()),
        }
    }

    pub fn group_of(&self, var: Variable) -> GroupId {
        self.assignment.get(&var).copied().unwrap_or(0)
    }

    /// Every distinct non-zero variable-group referenced by `literals`.
    pub fn groups_touched(&self, literals: &[Literal]) -> FxHashSet<GroupId> {
        literals
            .iter()
            .map(|&lit| self.group_of(lit.unsigned_abs() as Variable))
            .filter(|&vg| vg != 0)
            .collect()
    }

    /// Every distinct non-zero variable-group this map assigns at least one
    /// variable to — the candidate set a variable-GMUS run classifies.
    pub fn groups(&self) -> FxHashSet<GroupId> {
        self.assignment.values().copied().filter(|&vg| vg != 0).collect()
    }
}

struct VarGroupEntry {
    selector: Variable,
    active: bool,
    deleted: bool,
}

/// Oracle wrapper implementing `GroupOracle` over variable-group ids instead
/// of clause-group ids, so the same deletion/insertion/dichotomic drivers
/// (§4.8) can run unmodified: every call that the drivers make with a
/// clause-`GroupId` is, from this wrapper's perspective, a variable-group id.
pub struct VariableGroupOracle {
    solver: cadical::Solver,
    map: VariableGroupMap,
    entries: FxHashMap<GroupId, VarGroupEntry>,
    next_selector: Variable,
    num_variables: Variable,
    last_model: Option<Vec<bool>>,
    last_core: Option<FxHashSet<GroupId>>,
    budgets: Budgets,
}

impl VariableGroupOracle {
    pub fn new(map: VariableGroupMap, base_max_variable: Variable) -> Self {
        VariableGroupOracle {
            solver: cadical::Solver::new(),
            map,
            entries: FxHashMap::default(),
            next_selector: base_max_variable + 1,
            num_variables: base_max_variable,
            last_model: None,
            last_core: None,
            budgets: Budgets::default(),
        }
    }

    fn selector_for(&mut self, vg: GroupId) -> Variable {
        if let Some(entry) = self.entries.get(&vg) {
            return entry.selector;
        }
        let selector = self.next_selector;
        self.next_selector += 1;
        self.num_variables = self.num_variables.max(selector);
        self.entries.insert(
            vg,
            VarGroupEntry {
                selector,
                active: true,
                deleted: false,
            },
        );
        selector
    }

    fn apply_budgets(&mut self) {
        if let Some(conflicts) = self.budgets.conflicts {
            self.solver.set_limit("conflicts", conflicts as i32);
        }
    }

    /// Registers every clause in `gset`, gated behind the OR of the negated
    /// selectors of the non-zero variable-groups it touches. Variable-group 0
    /// never gets a selector (it is always active), so a clause entirely
    /// within variable-group 0 is added as a hard unit, exactly like group 0
    /// in the ordinary clause-group oracle.
    pub fn load(&mut self, store: &ClauseStore, gset: &GroupSet) {
        for &clause_id in gset.flat_clauses() {
            let clause = store.get(clause_id);
            if clause.is_removed() {
                continue;
            }
            let lits = clause.active_literals();
            for &lit in lits {
                self.num_variables = self.num_variables.max(lit.unsigned_abs() as Variable);
            }
            let touched = self.map.groups_touched(lits);

            let mut gated: Vec<i32> = Vec::with_capacity(lits.len() + touched.len());
            for vg in touched {
                let selector = self.selector_for(vg);
                gated.push(-(selector as i32));
            }
            gated.extend(lits.iter().map(|&l| l as i32));
            self.solver.add_clause(gated.into_iter());
        }
    }
}

impl GroupOracle for VariableGroupOracle {
    /// `add_group` only registers `g` as a known variable-group (its clauses
    /// were already loaded in bulk by [`VariableGroupOracle::load`], since a
    /// single clause can touch several variable-groups at once and must be
    /// added exactly once, not once per touching group).
    fn add_group(
        &mut self,
        _store: &ClauseStore,
        _gset: &GroupSet,
        g: GroupId,
        is_final: bool,
    ) -> Result<()> {
        if g == 0 || is_final {
            return Ok(());
        }
        self.selector_for(g);
        Ok(())
    }

    fn activate(&mut self, g: GroupId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown variable-group {g}")))?;
        if entry.deleted {
            return Err(GmusError::ConstraintViolation(format!(
                "variable-group {g} was deleted and cannot be reactivated"
            )));
        }
        entry.active = true;
        Ok(())
    }

    fn deactivate(&mut self, g: GroupId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown variable-group {g}")))?;
        entry.active = false;
        Ok(())
    }

    fn delete(&mut self, g: GroupId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown variable-group {g}")))?;
        // Freezing ¬sel_g permanently is unsound here: a clause can be gated
        // behind several variable-group selectors at once, and deleting one
        // of them must not silently drop the others' veto over that clause.
        // Deletion is instead folded into `solve`'s assumption list: a
        // deleted group is simply never asserted active again.
        entry.deleted = true;
        entry.active = false;
        Ok(())
    }

    fn set_budgets(&mut self, budgets: Budgets) {
        self.budgets = budgets;
    }

    fn solve(&mut self, extra_assumptions: &[Literal]) -> SolveOutcome {
        self.apply_budgets();
        self.last_model = None;
        self.last_core = None;

        let mut assumptions: Vec<i32> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.values() {
            if entry.deleted {
                continue;
            }
            let sel = entry.selector as i32;
            assumptions.push(if entry.active { sel } else { -sel });
        }
        assumptions.extend(extra_assumptions.iter().map(|&l| l as i32));

        match self.solver.solve_with(assumptions.iter().copied()) {
            None => SolveOutcome::Unknown,
            Some(true) => {
                let model = (1..=self.num_variables)
                    .map(|v| self.solver.value(v as i32).unwrap_or(true))
                    .collect();
                self.last_model = Some(model);
                SolveOutcome::Sat
            }
            Some(false) => {
                let mut core = FxHashSet::default();
                for (&g, entry) in self.entries.iter() {
                    if entry.deleted || !entry.active {
                        continue;
                    }
                    if self.solver.failed(entry.selector as i32) {
                        core.insert(g);
                    }
                }
                self.last_core = Some(core);
                SolveOutcome::Unsat
            }
        }
    }

    fn model(&self) -> Option<&[bool]> {
        self.last_model.as_deref()
    }

    fn core(&self) -> Option<&FxHashSet<GroupId>> {
        self.last_core.as_ref()
    }

    fn probe(&mut self, query: GroupQuery) -> Result<QueryResult> {
        let was_active = self
            .entries
            .get(&query.group)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown variable-group {}", query.group)))?
            .active;
        self.deactivate(query.group)?;

        // RR has no natural analogue for variable-group projection (there is
        // no single "negate this group's clauses" assumption set when the
        // group denotes variables rather than clauses); `use_rr` is ignored.
        let outcome = self.solve(&[]);

        let (model, core) = match outcome {
            SolveOutcome::Sat => {
                let model = if query.need_model {
                    self.model().map(|m| m.to_vec())
                } else {
                    None
                };
                (model, None)
            }
            SolveOutcome::Unsat => {
                let core = if query.refine { self.core().cloned() } else { None };
                (None, core)
            }
            SolveOutcome::Unknown => (None, None),
        };

        if was_active {
            self.activate(query.group)?;
        }

        Ok(QueryResult {
            outcome,
            model,
            core,
            tainted: false,
        })
    }
}

/// Deletion-style extraction loop (§4.8.1) over variable-group ids instead
/// of clause-group ids (§6.3, §9 "variable-group mode"). Cannot reuse
/// `algorithms::deletion::run`/`refiner::refine_unnecessary` as-is: both are
/// written against a `GroupSet` of *clause* groups, and feeding them a
/// variable-group id would have `MusState::mark_removed` try to delete a
/// same-numbered clause group that has nothing to do with the probed
/// variable-group. This loop tracks classification itself, over the `GroupId`
/// values `candidates` enumerates (ordinarily `VariableGroupMap::groups()`),
/// reusing only what's already id-agnostic: the `Scheduler` trait,
/// `GroupOracle::probe`, and the `IterationBudget` gate.
///
/// Model rotation has no analogue here (it walks clause occurrence lists to
/// flip falsifying literals, which presupposes clause groups), so every SAT
/// probe marks only the probed group necessary, never a batch.
pub fn compute_variable_gmus(
    oracle: &mut VariableGroupOracle,
    candidates: &FxHashSet<GroupId>,
    scheduler: &mut dyn Scheduler,
    budget: &mut dyn IterationBudget,
    refine: bool,
) -> (ExtractionResult, Vec<GroupId>) {
    let mut removed: FxHashSet<GroupId> = FxHashSet::default();
    let mut classified: FxHashSet<GroupId> = FxHashSet::default();

    loop {
        let Some(g) = scheduler.next_candidate() else {
            break;
        };
        if classified.contains(&g) {
            continue;
        }
        if !budget.allow_iteration() {
            let necessary: Vec<GroupId> = candidates.iter().copied().filter(|c| !removed.contains(c)).collect();
            return (ExtractionResult::Approximate, necessary);
        }

        let query = GroupQuery {
            group: g,
            refine,
            need_model: false,
            use_rr: false,
        };
        let Ok(result) = oracle.probe(query) else {
            classified.insert(g);
            continue;
        };

        match result.outcome {
            SolveOutcome::Unsat => {
                // Mirrors `refiner::refine_unnecessary`'s logic directly over
                // `candidates` rather than a `GroupSet`: an untainted core
                // clears every still-unclassified candidate it doesn't
                // mention, alongside `g` itself.
                let unnecessary: Vec<GroupId> = match result.core.as_ref().filter(|_| !result.tainted) {
                    Some(core) => candidates
                        .iter()
                        .copied()
                        .filter(|&c| c == g || (!classified.contains(&c) && !core.contains(&c)))
                        .collect(),
                    None => vec![g],
                };
                for u in unnecessary {
                    removed.insert(u);
                    classified.insert(u);
                    scheduler.notify_removed(u, &[]);
                    let _ = oracle.delete(u);
                }
            }
            SolveOutcome::Sat => {
                classified.insert(g);
                scheduler.notify_necessary(g);
            }
            SolveOutcome::Unknown => {
                scheduler.reschedule(g);
            }
        }
    }

    let necessary: Vec<GroupId> = candidates.iter().copied().filter(|c| !removed.contains(c)).collect();
    (ExtractionResult::Exact, necessary)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two variable-groups, `{x}` and `{y}`, over `(x ∨ y) ∧ (¬x ∨ y) ∧ (¬y)`:
    /// projecting out `y` alone already makes the remainder unsatisfiable
    /// once `x` is also free, so both should end up necessary for the
    /// formula to stay UNSAT under the probe-based deletion loop.
    #[test]
    fn both_variable_groups_necessary_over_contradiction() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1], 2, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();

        let mut map = VariableGroupMap::new();
        map.assign(1, 1).unwrap();

        let mut oracle = VariableGroupOracle::new(map, gset.max_variable());
        oracle.load(&store, &gset);
        oracle.add_group(&store, &gset, 1, false).unwrap();

        let query = GroupQuery {
            group: 1,
            refine: false,
            need_model: false,
            use_rr: false,
        };
        let result = oracle.probe(query).unwrap();
        // Projecting out variable-group 1 (variable 1 entirely) leaves the
        // formula with no constraint on variable 1 but both unit clauses
        // gated behind the same selector become vacuous together, so the
        // remaining constraint set is trivially satisfiable.
        assert_eq!(result.outcome, SolveOutcome::Sat);
    }

    /// `(x) ∧ (¬x) ∧ (y ∨ z)` with `x`, `y`, `z` each in their own
    /// variable-group: the contradiction depends only on `x`, so freeing `y`
    /// or `z` alone never rescues satisfiability and both should come out
    /// unnecessary, leaving only `x`'s group in the result.
    #[test]
    fn redundant_variable_group_is_excluded_from_the_result() {
        let mut store = ClauseStore::new();
        let mut gset = GroupSet::new(false);
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1], 2, false).unwrap();
        let c3 = store.make_clause(vec![2, 3], 3, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        gset.set_clause_group(&store, c3, 3).unwrap();

        let mut map = VariableGroupMap::new();
        map.assign(1, 1).unwrap();
        map.assign(2, 2).unwrap();
        map.assign(3, 3).unwrap();
        let candidates = map.groups();

        let mut oracle = VariableGroupOracle::new(map, gset.max_variable());
        oracle.load(&store, &gset);
        for &g in &candidates {
            oracle.add_group(&store, &gset, g, false).unwrap();
        }

        let mut scheduler = crate::scheduler::LinearScheduler::new(candidates.iter().copied().collect(), false);
        let mut budget = crate::algorithms::UnboundedBudget;

        let (result, mut necessary) =
            compute_variable_gmus(&mut oracle, &candidates, &mut scheduler, &mut budget, true);
        necessary.sort_unstable();

        assert_eq!(result, ExtractionResult::Exact);
        assert_eq!(necessary, vec![1]);
    }

    #[test]
    fn variable_in_no_block_defaults_to_group_zero() {
        let map = VariableGroupMap::new();
        assert_eq!(map.group_of(5), 0);
    }

    #[test]
    fn reassigning_a_variable_to_a_different_group_is_rejected() {
        let mut map = VariableGroupMap::new();
        map.assign(1, 2).unwrap();
        assert!(map.assign(1, 3).is_err());
        assert!(map.assign(1, 2).is_ok());
    }
}
