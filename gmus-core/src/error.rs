//! Error kinds, grounded in §7 of the specification.
//!
//! Internal operations return `Result<T, GmusError>`; only the embedding API
//! (`engine.rs`) collapses these down to the integer codes of §6.1/§6.4.
//! `LogicBug` is reserved for invariant violations and is additionally raised
//! via `debug_assert!`/`unreachable!` at the point of the check — it is a
//! programming error, not something callers are expected to recover from.

use thiserror::Error;

use crate::ids::GroupId;

#[derive(Debug, Error)]
pub enum GmusError {
    /// Zero literal inside a clause, negative variable index, or a
    /// group-header syntax error. In practice this is raised by `formats`,
    /// not the engine itself, but kept here so the whole crate shares one
    /// error type.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Adding a clause after `solve()` in a re-initialised oracle, or
    /// mutating a finalised group.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Soft resource exhaustion inside the oracle for a single call.
    #[error("oracle returned unknown (budget exhausted for this call)")]
    OracleUnknown,

    /// The run-level CPU or iteration budget was exhausted.
    #[error("extraction budget exhausted after {iterations} iterations")]
    BudgetExhausted { iterations: u64 },

    /// Refinement was disabled for a call because the redundancy-removal
    /// trick would have tainted the core; only `group` was removed.
    #[error("core for group {group} is tainted by redundancy removal")]
    TaintedCore { group: GroupId },

    /// An invariant of `MusData` was violated. Not recoverable.
    #[error("internal invariant violated: {0}")]
    LogicBug(String),
}

pub type Result<T> = std::result::Result<T, GmusError>;
