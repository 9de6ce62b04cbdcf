//! Group-MUS extraction engine.
//!
//! A group minimal unsatisfiable subset (MUS) extractor: given a set of
//! clauses partitioned into groups, with a designated permanent "hard"
//! group, classify every other group as necessary or removable so that what
//! remains is both unsatisfiable and irreducible. See `DESIGN.md` for the
//! grounding of each module.

pub mod algorithms;
pub mod clause;
pub mod engine;
pub mod error;
pub mod formats;
pub mod group_set;
pub mod ids;
pub mod mus_state;
pub mod oracle;
mod refiner;
mod resolution_graph;
mod rotation;
pub mod scheduler;
pub mod variable_group;

pub use clause::{Clause, ClauseStore};
pub use engine::{AlgorithmKind, Engine, EngineConfig, OracleKind};
pub use error::{GmusError, Result};
pub use group_set::{Group, GroupSet};
pub use ids::{ClauseId, GroupId, Literal, Variable, HARD_GROUP, UNDEF_GROUP};
pub use mus_state::{GroupStatus, MusState};
pub use oracle::{Budgets, GroupOracle, GroupQuery, IncrementalOracle, QueryResult, ReinitOracle, SolveOutcome};
pub use resolution_graph::ResolutionGraph;
pub use scheduler::{Scheduler, SchedulerKind};
pub use variable_group::{VariableGroupMap, VariableGroupOracle};
