//! Arena indices used throughout the engine.
//!
//! Per the "cyclic ownership" design note, no component holds a pointer back
//! into the clause store or group set. Everything is an index into an arena
//! owned by the `MusRun` for the lifetime of one extraction.

use std::fmt;

/// A signed, non-zero DIMACS-style literal. The absolute value is the
/// variable, the sign the polarity.
pub type Literal = i64;

/// A variable identifier (always `>= 1`).
pub type Variable = u32;

#[inline]
pub fn var_of(lit: Literal) -> Variable {
    lit.unsigned_abs() as Variable
}

#[inline]
pub fn sign_of(lit: Literal) -> bool {
    lit > 0
}

/// Packed literal index used to key occurrence lists: `variable << 1 | sign`.
#[inline]
pub fn lit_index(lit: Literal) -> usize {
    let var = var_of(lit) as usize;
    (var << 1) | (sign_of(lit) as usize)
}

/// Index of a [`crate::clause::Clause`] in the [`crate::clause::ClauseStore`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(pub u32);

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Group identifier. Group 0 is the permanent background group (see §3).
pub type GroupId = u32;

/// Sentinel requesting a fresh group id from `add_clause` (all-ones, per §6.1).
pub const UNDEF_GROUP: GroupId = GroupId::MAX;

/// The permanent background group.
pub const HARD_GROUP: GroupId = 0;
