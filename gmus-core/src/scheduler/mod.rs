//! Scheduler (C7): produces the next candidate group for an extraction
//! algorithm to probe. Polymorphic by capability rather than by an
//! inheritance hierarchy (§9) — a single object-safe trait, concrete
//! variants picked at construction, mirroring how the teacher selects a
//! `BranchingStrategy`/`RestartPolicy` implementation
//! (`examples/radrow-satisfaction/solver/src/cdcl/branching_strategies/`).

mod dynamic;
mod graph_degree;
mod length;
mod linear;
mod random;
mod static_order;

pub use dynamic::DynamicScheduler;
pub use graph_degree::{DegreeBias, GraphDegreeScheduler, ImplicitDegreeScheduler};
pub use length::{LengthBias, LengthScheduler};
pub use linear::LinearScheduler;
pub use random::RandomScheduler;
pub use static_order::StaticOrderScheduler;

use crate::ids::{ClauseId, GroupId};

/// Capability every scheduler variant implements.
pub trait Scheduler {
    /// Returns the next untried candidate, or `None` once exhausted. Each id
    /// is returned at most once per successful pop unless re-added via
    /// `reschedule`/`fasttrack`.
    fn next_candidate(&mut self) -> Option<GroupId>;

    /// Re-adds `g` (e.g. after an `UNKNOWN` oracle answer) for a later pop.
    fn reschedule(&mut self, g: GroupId);

    /// Biases `g` to come out soon. A no-op for scheduler variants where
    /// this isn't meaningful.
    fn fasttrack(&mut self, g: GroupId);

    /// `g` was marked removed; `touched_neighbors` are clauses the
    /// resolution graph (if any) evicted alongside it, for schedulers that
    /// want to refresh degree-based priorities.
    fn notify_removed(&mut self, g: GroupId, touched_neighbors: &[ClauseId]);

    /// `g` was marked necessary.
    fn notify_necessary(&mut self, g: GroupId);

    /// `g`'s priority changed for a reason external to removal/necessity
    /// (e.g. a graph-degree update); only meaningful for dynamic-ordered
    /// schedulers.
    fn notify_priority_changed(&mut self, g: GroupId);
}

/// Selects a scheduler variant, matching §6.1's `set_order(mode)` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    /// mode 0: largest group id first.
    LinearMax,
    /// mode 1: groups with the most active literals first.
    LengthLongest,
    /// mode 2: groups with the fewest active literals first.
    LengthShortest,
    /// mode 3: smallest group id first.
    LinearMin,
    /// mode 4: uniformly shuffled once at construction, seeded.
    Random,
}

impl SchedulerKind {
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode {
            0 => Some(SchedulerKind::LinearMax),
            1 => Some(SchedulerKind::LengthLongest),
            2 => Some(SchedulerKind::LengthShortest),
            3 => Some(SchedulerKind::LinearMin),
            4 => Some(SchedulerKind::Random),
            _ => None,
        }
    }
}
