//! Type variables.
//!
//! # Identity
//! A [`TyVar`] is nothing more than a number. Two type variables are the same
//! variable if and only if their numbers are equal; a type graph may mention
//! the same variable at any number of positions without sharing any memory
//! between them.
//!
//! Ids are handed out by the inference engine, usually through
//! [`TyVar::fresh`], and are therefore sensitive to allocation order. Any
//! output that has to stay stable across unrelated changes (e.g. golden test
//! files) should go through the [`canonical`] module instead of printing raw
//! ids.
//!
//! [`canonical`]: crate::canonical

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A type variable, identified by a process-unique `u64`.
#[derive(
    Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct TyVar(u64);

impl std::fmt::Debug for TyVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "⟨{}⟩", self.0)
    }
}

impl std::fmt::Display for TyVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<TyVar> for u64 {
    fn from(value: TyVar) -> Self {
        value.0
    }
}

impl From<u64> for TyVar {
    fn from(value: u64) -> Self {
        TyVar(value)
    }
}

impl TyVar {
    /// Returns a new [`TyVar`] distinct from every other one allocated by
    /// this function in the current process.
    pub fn fresh() -> TyVar {
        TyVar(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps an id decoded from elsewhere.
    pub const fn new(id: u64) -> TyVar {
        TyVar(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}
