//! Kind constraints, i.e. the ad-hoc bounds on quantified type variables.

use serde::{Deserialize, Serialize};

use crate::tvar::TyVar;

/// An ad-hoc polymorphism predicate.
///
/// The declaration order is significant: it breaks ties when sorting
/// constraints that name the same type variable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum Kind {
    Addable,
    Subtractable,
    Divisible,
    Numeric,
    Comparable,
    Equatable,
    Nullable,
    Record,
    Negatable,
    Timeable,
    Stringable,
}

impl Kind {
    pub const ALL: [Kind; 11] = [
        Kind::Addable,
        Kind::Subtractable,
        Kind::Divisible,
        Kind::Numeric,
        Kind::Comparable,
        Kind::Equatable,
        Kind::Nullable,
        Kind::Record,
        Kind::Negatable,
        Kind::Timeable,
        Kind::Stringable,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Addable => "Addable",
            Self::Subtractable => "Subtractable",
            Self::Divisible => "Divisible",
            Self::Numeric => "Numeric",
            Self::Comparable => "Comparable",
            Self::Equatable => "Equatable",
            Self::Nullable => "Nullable",
            Self::Record => "Record",
            Self::Negatable => "Negatable",
            Self::Timeable => "Timeable",
            Self::Stringable => "Stringable",
        }
    }

    /// The position of `self` in the declaration order.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A kind constraint on a single type variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub tvar: TyVar,
    pub kind: Kind,
}

impl Constraint {
    pub const fn new(tvar: TyVar, kind: Kind) -> Self {
        Self { tvar, kind }
    }
}
