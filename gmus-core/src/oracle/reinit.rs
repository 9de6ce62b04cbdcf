//! Re-initialised backend: no selector variables. Every added clause is kept
//! in an in-memory copy together with a group-state table
//! (`final` / `active` / `inactive`); each `solve()` builds a fresh
//! `cadical::Solver` loaded with only the clauses that currently matter.
//! Heavier per call than the incremental backend, but side-steps selector
//! bookkeeping entirely and gives a trivially sound core (no selectors to
//! misattribute).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::clause::ClauseStore;
use crate::error::{GmusError, Result};
use crate::group_set::GroupSet;
use crate::ids::{GroupId, Literal, Variable};

use super::{Budgets, GroupOracle, GroupQuery, QueryResult, SolveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    Final,
    Active,
    Inactive,
}

struct StoredGroup {
    clauses: Vec<Vec<Literal>>,
    state: GroupState,
}

pub struct ReinitOracle {
    groups: FxHashMap<GroupId, StoredGroup>,
    num_variables: Variable,
    solved_once: bool,
    last_model: Option<Vec<bool>>,
    last_core: Option<FxHashSet<GroupId>>,
    budgets: Budgets,
}

impl ReinitOracle {
    pub fn new(base_max_variable: Variable) -> Self {
        ReinitOracle {
            groups: FxHashMap::default(),
            num_variables: base_max_variable,
            solved_once: false,
            last_model: None,
            last_core: None,
            budgets: Budgets::default(),
        }
    }
}

impl GroupOracle for ReinitOracle {
    fn add_group(
        &mut self,
        store: &ClauseStore,
        gset: &GroupSet,
        g: GroupId,
        is_final: bool,
    ) -> Result<()> {
        if self.solved_once {
            return Err(GmusError::ConstraintViolation(
                "cannot add a clause to the re-initialised oracle after solve() has run"
                    .to_string(),
            ));
        }
        if self.groups.contains_key(&g) {
            return Ok(());
        }
        let clauses: Vec<Vec<Literal>> = gset
            .clauses_of(g)
            .iter()
            .filter(|&&id| !store.get(id).is_removed())
            .map(|&id| store.get(id).active_literals().to_vec())
            .collect();
        for clause in &clauses {
            for &lit in clause {
                self.num_variables = self.num_variables.max(lit.unsigned_abs() as Variable);
            }
        }
        let state = if is_final {
            GroupState::Final
        } else {
            GroupState::Active
        };
        self.groups.insert(g, StoredGroup { clauses, state });
        Ok(())
    }

    fn activate(&mut self, g: GroupId) -> Result<()> {
        let group = self
            .groups
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {g}")))?;
        if group.state == GroupState::Final {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} is final and cannot be (re)activated"
            )));
        }
        group.state = GroupState::Active;
        Ok(())
    }

    fn deactivate(&mut self, g: GroupId) -> Result<()> {
        let group = self
            .groups
            .get_mut(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {g}")))?;
        if group.state == GroupState::Final {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} is final and cannot be deactivated"
            )));
        }
        group.state = GroupState::Inactive;
        Ok(())
    }

    fn delete(&mut self, g: GroupId) -> Result<()> {
        let group = self
            .groups
            .get(&g)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {g}")))?;
        if group.state == GroupState::Final {
            return Err(GmusError::ConstraintViolation(format!(
                "group {g} is final and cannot be deleted"
            )));
        }
        self.groups.remove(&g);
        Ok(())
    }

    fn set_budgets(&mut self, budgets: Budgets) {
        self.budgets = budgets;
    }

    fn solve(&mut self, extra_assumptions: &[Literal]) -> SolveOutcome {
        self.solved_once = true;
        self.last_model = None;
        self.last_core = None;

        let mut solver = cadical::Solver::new();
        if let Some(conflicts) = self.budgets.conflicts {
            solver.set_limit("conflicts", conflicts as i32);
        }

        let mut active_groups: Vec<GroupId> = Vec::new();
        for (&g, group) in self.groups.iter() {
            if group.state == GroupState::Inactive {
                continue;
            }
            active_groups.push(g);
            for clause in &group.clauses {
                solver.add_clause(clause.iter().map(|&l| l as i32));
            }
        }

        let assumptions = extra_assumptions.iter().map(|&l| l as i32);
        match solver.solve_with(assumptions) {
            None => SolveOutcome::Unknown,
            Some(true) => {
                let model = (1..=self.num_variables)
                    .map(|v| solver.value(v as i32).unwrap_or(true))
                    .collect();
                self.last_model = Some(model);
                SolveOutcome::Sat
            }
            Some(false) => {
                // No selectors to consult `failed()` against: every active,
                // non-final group that actually contributed a clause is a
                // sound (if coarse) over-approximation of the true core.
                let core: FxHashSet<GroupId> = active_groups
                    .into_iter()
                    .filter(|g| self.groups[g].state == GroupState::Active)
                    .collect();
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
        let group = self
            .groups
            .get(&query.group)
            .ok_or_else(|| GmusError::ConstraintViolation(format!("unknown group {}", query.group)))?;
        let was_active = group.state == GroupState::Active;
        self.deactivate(query.group)?;

        // The redundancy-removal trick relies on selector assumptions that
        // this backend does not have; requesting it here degrades to a
        // plain (untainted) removability test, which is always sound.
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
                let core = if query.refine {
                    self.core().cloned()
                } else {
                    None
                };
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
