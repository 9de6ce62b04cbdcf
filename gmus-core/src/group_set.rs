//! Group set (C2): bidirectional mapping between groups and clauses, plus
//! ancillary occurrence-list indices used by model rotation, BCP-style
//! propagation and degree-based schedulers.
//!
//! Grounded in `examples/radrow-satisfaction/solver/src/cnf.rs`'s `CNF`
//! aggregate (a flat `Vec<CNFClause>` plus a derived `num_variables`),
//! generalised with the group-indexed sparse vector and occurrence lists
//! `original_source/src/mus-2/basic_group_set.hh` and `occs_list.hh` call for.

use rustc_hash::FxHashMap;

use crate::clause::ClauseStore;
use crate::error::{GmusError, Result};
use crate::ids::{lit_index, var_of, ClauseId, GroupId, Literal, Variable, HARD_GROUP};

/// A non-negative group identifier and the clauses it owns.
#[derive(Debug, Default, Clone)]
pub struct Group {
    clauses: Vec<ClauseId>,
    active_count: usize,
}

impl Group {
    pub fn clauses(&self) -> &[ClauseId] {
        &self.clauses
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Per-literal occurrence index: for each `lit_index(l)`, the clauses that
/// contain `l` and how many of those are currently active.
#[derive(Default)]
struct OccurrenceLists {
    clauses: Vec<Vec<ClauseId>>,
    active_count: Vec<usize>,
}

impl OccurrenceLists {
    fn ensure_len(&mut self, index: usize) {
        if self.clauses.len() <= index {
            self.clauses.resize_with(index + 1, Vec::new);
            self.active_count.resize(index + 1, 0);
        }
    }

    fn register(&mut self, lit: Literal, id: ClauseId) {
        let idx = lit_index(lit);
        self.ensure_len(idx);
        self.clauses[idx].push(id);
        self.active_count[idx] += 1;
    }

    fn decrement(&mut self, lit: Literal) {
        let idx = lit_index(lit);
        if idx < self.active_count.len() && self.active_count[idx] > 0 {
            self.active_count[idx] -= 1;
        }
    }

    /// Clauses (possibly stale — consumers must re-check `removed`)
    /// containing `lit`, and how many are currently active.
    fn occurrences(&self, lit: Literal) -> (&[ClauseId], usize) {
        let idx = lit_index(lit);
        if idx < self.clauses.len() {
            (&self.clauses[idx], self.active_count[idx])
        } else {
            (&[], 0)
        }
    }
}

/// Maps group id -> clauses, and exposes the flat insertion-ordered clause
/// list plus (optionally) occurrence lists.
pub struct GroupSet {
    groups: Vec<Option<Group>>,
    flat: Vec<ClauseId>,
    clause_group: FxHashMap<ClauseId, GroupId>,
    max_variable: Variable,
    max_group: GroupId,
    occurrence: Option<OccurrenceLists>,
}

impl GroupSet {
    pub fn new(with_occurrence_lists: bool) -> Self {
        GroupSet {
            groups: Vec::new(),
            flat: Vec::new(),
            clause_group: FxHashMap::default(),
            max_variable: 0,
            max_group: 0,
            occurrence: with_occurrence_lists.then(OccurrenceLists::default),
        }
    }

    pub fn max_variable(&self) -> Variable {
        self.max_variable
    }

    pub fn max_group(&self) -> GroupId {
        self.max_group
    }

    pub fn max_clause_id(&self) -> Option<ClauseId> {
        self.flat.last().copied()
    }

    pub fn has_group(&self, g: GroupId) -> bool {
        (g as usize) < self.groups.len() && self.groups[g as usize].is_some()
    }

    pub fn has_group0(&self) -> bool {
        self.has_group(HARD_GROUP)
    }

    pub fn group(&self, g: GroupId) -> Option<&Group> {
        self.groups.get(g as usize).and_then(|slot| slot.as_ref())
    }

    fn group_mut_or_create(&mut self, g: GroupId) -> &mut Group {
        if (g as usize) >= self.groups.len() {
            self.groups.resize_with(g as usize + 1, || None);
        }
        self.max_group = self.max_group.max(g);
        self.groups[g as usize].get_or_insert_with(Group::default)
    }

    /// Ascending group ids that are currently materialised (non-empty slots).
    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(g, slot)| slot.as_ref().map(|_| g as GroupId))
    }

    /// All clauses (including removed ones) belonging to `g`.
    pub fn clauses_of(&self, g: GroupId) -> &[ClauseId] {
        self.group(g).map(|grp| grp.clauses()).unwrap_or(&[])
    }

    /// All clauses in insertion order, including removed ones.
    pub fn flat_clauses(&self) -> &[ClauseId] {
        &self.flat
    }

    /// Attaches `id` to group `g`, materialising the group if new and
    /// appending to the flat clause list if not already present. Idempotent
    /// if `id` is already attached to `g`; rejected if attached elsewhere.
    pub fn set_clause_group(&mut self, store: &ClauseStore, id: ClauseId, g: GroupId) -> Result<()> {
        if let Some(&existing) = self.clause_group.get(&id) {
            if existing == g {
                return Ok(());
            }
            return Err(GmusError::ConstraintViolation(format!(
                "clause {id} already belongs to group {existing}, cannot attach to group {g}"
            )));
        }

        self.clause_group.insert(id, g);
        self.flat.push(id);
        self.max_variable = self.max_variable.max(store.max_variable());

        let clause = store.get(id);
        if let Some(occ) = self.occurrence.as_mut() {
            for &lit in clause.active_literals() {
                occ.register(lit, id);
            }
        }

        let active = !clause.is_removed();
        let group = self.group_mut_or_create(g);
        group.clauses.push(id);
        if active {
            group.active_count += 1;
        }
        Ok(())
    }

    pub fn occurrences(&self, lit: Literal) -> (&[ClauseId], usize) {
        self.occurrence
            .as_ref()
            .map(|occ| occ.occurrences(lit))
            .unwrap_or((&[], 0))
    }

    pub fn has_occurrence_lists(&self) -> bool {
        self.occurrence.is_some()
    }

    /// Marks every non-removed clause of `g` as removed. Occurrence-list
    /// active counts are decremented lazily — entries for removed clauses
    /// remain physically present; consumers must re-check the removed flag.
    pub fn remove_group(&mut self, store: &mut ClauseStore, g: GroupId) {
        let clause_ids: Vec<ClauseId> = self.clauses_of(g).to_vec();
        for id in clause_ids {
            let clause = store.get(id);
            if clause.is_removed() {
                continue;
            }
            let active_lits: Vec<Literal> = clause.active_literals().to_vec();
            store.mark_removed(id);
            if let Some(occ) = self.occurrence.as_mut() {
                for lit in active_lits {
                    occ.decrement(lit);
                }
            }
        }
        if let Some(group) = self.groups.get_mut(g as usize).and_then(|s| s.as_mut()) {
            group.active_count = 0;
        }
    }

    #[inline]
    pub fn var_lit_index(&self, var: Variable) -> (usize, usize) {
        (lit_index(var as Literal), lit_index(-(var as Literal)))
    }
}

#[inline]
pub fn variable_of(lit: Literal) -> Variable {
    var_of(lit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (ClauseStore, GroupSet) {
        (ClauseStore::new(), GroupSet::new(true))
    }

    #[test]
    fn attach_and_iterate_groups() {
        let (mut store, mut gset) = fresh();
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        let c2 = store.make_clause(vec![-1], 2, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        assert_eq!(gset.groups().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(gset.clauses_of(1), &[c1]);
    }

    #[test]
    fn reattaching_elsewhere_is_rejected() {
        let (mut store, mut gset) = fresh();
        let c1 = store.make_clause(vec![1], 1, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        assert!(gset.set_clause_group(&store, c1, 2).is_err());
        // idempotent for the same group
        assert!(gset.set_clause_group(&store, c1, 1).is_ok());
    }

    #[test]
    fn remove_group_decrements_occurrence_counts() {
        let (mut store, mut gset) = fresh();
        let c1 = store.make_clause(vec![1, 2], 1, false).unwrap();
        let c2 = store.make_clause(vec![1, -2], 2, false).unwrap();
        gset.set_clause_group(&store, c1, 1).unwrap();
        gset.set_clause_group(&store, c2, 2).unwrap();
        assert_eq!(gset.occurrences(1).1, 2);
        gset.remove_group(&mut store, 1);
        assert_eq!(gset.occurrences(1).1, 1);
        assert!(store.get(c1).is_removed());
    }
}
