//! Optional resolution graph (§3, §9 "Resolution-graph maintenance cost").
//!
//! Vertices are clauses; an edge joins two clauses that resolve on some
//! variable without producing a tautology. Used only by the degree-based
//! schedulers (`scheduler::graph_degree`). Construction is
//! `O(Σ_v |occ(v)| × |occ(-v)|)` with tautology filtering, so it is opt-in
//! (`EngineConfig::with_resolution_graph`).
//!
//! Grounded in `original_source/src/mus-2/res_graph.hh`; brought into the
//! Rust stack via `petgraph`, which the sibling `otter_sat` example already
//! reaches for to represent solver-internal structure as a graph.

use petgraph::graphmap::UnGraphMap;

use crate::clause::ClauseStore;
use crate::group_set::GroupSet;
use crate::ids::{var_of, ClauseId, Literal, Variable};

pub struct ResolutionGraph {
    graph: UnGraphMap<u32, Variable>,
    dynamic: bool,
}

fn resolves_without_tautology(a: &[Literal], b: &[Literal], pivot: Variable) -> bool {
    // `a` and `b` both contain `pivot`'s two polarities (by construction);
    // the resolvent is tautological iff some other variable appears with
    // both polarities across the two clauses.
    for &la in a {
        if var_of(la) == pivot {
            continue;
        }
        for &lb in b {
            if var_of(lb) == pivot {
                continue;
            }
            if var_of(la) == var_of(lb) && (la > 0) != (lb > 0) {
                return false;
            }
        }
    }
    true
}

impl ResolutionGraph {
    pub fn build(store: &ClauseStore, gset: &GroupSet, dynamic: bool) -> Self {
        let mut graph = UnGraphMap::new();
        for &id in gset.flat_clauses() {
            graph.add_node(id.0);
        }

        for var in 1..=gset.max_variable() {
            let pos_lit = var as Literal;
            let neg_lit = -(var as Literal);
            let (pos_clauses, _) = gset.occurrences(pos_lit);
            let (neg_clauses, _) = gset.occurrences(neg_lit);
            for &pc in pos_clauses {
                if store.get(pc).is_removed() {
                    continue;
                }
                for &nc in neg_clauses {
                    if pc == nc || store.get(nc).is_removed() {
                        continue;
                    }
                    if resolves_without_tautology(
                        store.get(pc).active_literals(),
                        store.get(nc).active_literals(),
                        var,
                    ) {
                        graph.add_edge(pc.0, nc.0, var);
                    }
                }
            }
        }

        ResolutionGraph { graph, dynamic }
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn degree(&self, id: ClauseId) -> usize {
        self.graph.neighbors(id.0).count()
    }

    pub fn neighbors(&self, id: ClauseId) -> Vec<ClauseId> {
        self.graph.neighbors(id.0).map(ClauseId).collect()
    }

    /// Removes `id`'s vertex (and incident edges), returning its former
    /// neighbours so callers can update scheduler priorities for them.
    pub fn remove_clause(&mut self, id: ClauseId) -> Vec<ClauseId> {
        let neighbors = self.neighbors(id);
        self.graph.remove_node(id.0);
        neighbors
    }
}
