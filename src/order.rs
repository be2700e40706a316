//! Deterministic ordering of quantified variables and constraints.
//!
//! Variables are ordered by id. Constraints are ordered by the id of their
//! type variable and then by [`Kind`](crate::ty::kind::Kind) declaration
//! order. In both cases the id is either the raw one or, when a
//! [`CanonicalMapping`] is supplied, the canonical one.

use crate::{
    canonical::CanonicalMapping,
    error::Result,
    tvar::TyVar,
    ty::kind::Constraint,
};

/// Returns the sort key of `var` under `mapping`.
fn key(var: TyVar, mapping: Option<&CanonicalMapping>) -> Result<u64> {
    match mapping {
        Some(mapping) => mapping.lookup(var),
        None => Ok(var.id()),
    }
}

/// Returns `vars` sorted by id.
///
/// Fails with [`Error::InconsistentMapping`] if `mapping` is given and lacks
/// one of `vars`.
///
/// [`Error::InconsistentMapping`]: crate::error::Error::InconsistentMapping
pub fn sorted_vars(
    vars: &[TyVar],
    mapping: Option<&CanonicalMapping>,
) -> Result<Vec<TyVar>> {
    let mut keyed = vars
        .iter()
        .map(|&var| Ok((key(var, mapping)?, var)))
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by_key(|(key, _)| *key);
    Ok(keyed.into_iter().map(|(_, var)| var).collect())
}

/// Returns `constraints` sorted by type variable id, then by kind.
///
/// The sort is stable, so duplicate constraints keep their relative order.
pub fn sorted_constraints(
    constraints: &[Constraint],
    mapping: Option<&CanonicalMapping>,
) -> Result<Vec<Constraint>> {
    let mut keyed = constraints
        .iter()
        .map(|&cons| Ok((key(cons.tvar, mapping)?, cons)))
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by_key(|(key, cons)| (*key, cons.kind));
    Ok(keyed.into_iter().map(|(_, cons)| cons).collect())
}
