//! Incremental backend: each non-final group is gated by a fresh selector
//! variable. Activation/deactivation is expressed as an assumption on that
//! selector, so the underlying `cadical` instance is never rebuilt — it only
//! ever grows, which is what lets this backend stay incremental across the
//! whole extraction run.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::clause::ClauseStore;
use crate::error::{GmusError, Result};
use crate::group_set::GroupSet;
use crate::ids::{GroupId, Literal, Variable};

use super::{Budgets, GroupOracle, GroupQuery, QueryResult, SolveOutcome};

struct GroupEntry {
    selector: Variable,
    is_final: bool,
    deleted: bool,
    /// Current forced activation state passed as an assumption on every
    /// `solve()` (ignored once `deleted`).
    active: bool,
    /// Active literals of the group's clauses at the time it was added,
    /// kept only to support the redundancy-removal trick (§4.5) without
    /// reaching back into the group set during a probe.
    literals: Vec<Literal>,
}

pub struct IncrementalOracle {
    solver: cadical::Solver,
    next_selector: Variable,
    groups: FxHashMap<GroupId, GroupEntry>,
    last_model: Option<Vec<bool>>,
    last_core: Option<FxHashSet<GroupId>>,
    num_variables: Variable,
    budgets: Budgets,
}

impl IncrementalOracle {
    pub fn new(base_max_variable: Variable) -> Self {
        IncrementalOracle {
            solver: cadical::Solver::new(),
            next_selector: base_max_variable + 1,
            groups: FxHashMap::default(),
            last_model: None,
            last_core: None,
            num_variables: base_max_variable,
            budgets: Budgets::default(),
        }
    }

    fn fresh_selector(&mut self) -> Variable {
        let sel = self.next_selector;
        self.next_selector += 1;
        self.num_variables = self.num_variables.max(sel);
        sel
    }

    fn entry(&self, g: GroupId) -> Result<&GroupEntry> {
        self.groups.get(&g).ok_or_else(|| {
            GmusError::ConstraintViolation(format!("group {g} was never added to the oracle"))
        })
    }

    fn apply_budgets(&mut self) {
        // CaDiCaL's Rust binding only exposes a conflict limit through its
        // `limit` configuration knobs; the CPU budget is enforced one level
        // up by the supervisor degrading `conflicts` over time (§5, §9).
        if let Some(conflicts) = self.budgets.conflicts {
            self.solver.set_limit("conflicts", conflicts as i32);
        }
    }
}

impl GroupOracle for IncrementalOracle {
    fn add_group(
        &mut self,
        store: &ClauseStore,
        gset: &GroupSet,
        g: GroupId,
        is_final: bool,
    ) -> Result<()> {
        if let Some(existing) = self.groups.get(&g) {
            if existing.is_final != is_final {
                return Err(GmusError::ConstraintViolation(format!(
                    "group {g} finality cannot change after it is added"
                )));
            }
            return Ok(());
        }

        let selector = if is_final { 0 } else { self.fresh_selector() };
        let mut all_literals = Vec::new();
        for &clause_id in gset.clauses_of(g) {
            let clause = store.get(clause_id);
            if clause.is_removed() {
                continue;
            }
            let lits: Vec<Literal> = clause.active_literals().to_vec();
            all_literals.extend(lits.iter().copied());
            if is_final {
                self.solver.add_clause(lits.into_iter().map(|l| l as i32));
            } else {
                let mut gated: Vec<i32> = Vec::with_capacity(lits.len() + 1);
                gated.push(-(selector as i32));
                gated.extend(lits.into_iter().map(|l| l as i32));
                self.solver.add_clause(gated.into_iter());
            }
        }

        self.groups.insert(
            g,
            GroupEntry {
                selector,
                is_final,
                deleted: false,
                active: true,
                literals: all_literals,
            },
        );
        Ok(())
    }

    fn activate(&mut self, g: GroupId) -> Result<()> {
        let entry = self
            .groups
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {g}")))?;
        if entry.is_final {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} is final and cannot be (re)activated"
            )));
        }
        if entry.deleted {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} was deleted and cannot be reactivated"
            )));
        }
        entry.active = true;
        Ok(())
    }

    fn deactivate(&mut self, g: GroupId) -> Result<()> {
        let entry = self
            .groups
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {g}")))?;
        if entry.is_final {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} is final and cannot be deactivated"
            )));
        }
        entry.active = false;
        Ok(())
    }

    fn delete(&mut self, g: GroupId) -> Result<()> {
        let entry = self
            .groups
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {g}")))?;
        if entry.is_final {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} is final and cannot be deleted"
            )));
        }
        // Freeze ¬sel_g as a final unit: the gated clauses become
        // permanently vacuous, which is cheaper than re-adding them.
        self.solver.add_clause(std::iter::once(-(entry.selector as i32)));
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

        let mut assumptions: Vec<i32> = Vec::with_capacity(self.groups.len());
        for entry in self.groups.values() {
            if entry.is_final || entry.deleted {
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
                for (&g, entry) in self.groups.iter() {
                    if entry.is_final || entry.deleted || !entry.active {
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
        let was_active = self.entry(query.group)?.active;
        self.deactivate(query.group)?;

        let extra_assumptions: Vec<Literal> = if query.use_rr {
            self.redundancy_removal_assumptions(query.group)?
        } else {
            Vec::new()
        };

        let rr_engaged = !extra_assumptions.is_empty();
        let outcome = self.solve(&extra_assumptions);

        let (model, core, tainted) = match outcome {
            SolveOutcome::Sat => {
                let model = if query.need_model {
                    self.model().map(|m| m.to_vec())
                } else {
                    None
                };
                (model, None, false)
            }
            SolveOutcome::Unsat => {
                let core = if query.refine {
                    self.core().cloned()
                } else {
                    None
                };
                (None, core, rr_engaged)
            }
            SolveOutcome::Unknown => (None, None, false),
        };

        if was_active {
            self.activate(query.group)?;
        }

        Ok(QueryResult {
            outcome,
            model,
            core,
            tainted,
        })
    }
}

impl IncrementalOracle {
    /// Builds the extra unit assumptions for the redundancy-removal trick:
    /// force every active literal of `group`'s clauses to false, so a
    /// resulting UNSAT means the remainder already entails `group`, not
    /// merely that `group` can be dropped without losing unsatisfiability.
    /// Meaningless (and skipped) for multi-clause groups where the clauses
    /// disagree on a variable's polarity, since no single assumption set can
    /// falsify every clause at once — the caller still gets a sound, merely
    /// un-tainted, plain removability test in that case.
    fn redundancy_removal_assumptions(&self, group: GroupId) -> Result<Vec<Literal>> {
        let entry = self.entry(group)?;
        let mut by_var: FxHashMap<Variable, Literal> = FxHashMap::default();
        for &lit in &entry.literals {
            let var = lit.unsigned_abs() as Variable;
            if let Some(&existing) = by_var.get(&var) {
                if (existing > 0) != (lit > 0) {
                    return Ok(Vec::new());
                }
            } else {
                by_var.insert(var, lit);
            }
        }
        Ok(by_var.values().map(|&lit| -lit).collect())
    }
}
