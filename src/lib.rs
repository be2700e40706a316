//! Representation, canonicalization and rendering of inferred type schemes.
//!
//! The inference engine hands over each polymorphic type as a [`Scheme`]: a
//! list of quantified type variables, a set of kind constraints on them, and
//! a [`MonoType`] body. A [`PolyType`] views such a scheme and turns it into
//! deterministic text, either with the raw variable ids or with a canonical
//! numbering that is independent of allocation order.
//!
//! [`Scheme`]: scheme::Scheme
//! [`PolyType`]: scheme::PolyType
//! [`MonoType`]: ty::MonoType

pub mod canonical;
pub mod config;
pub mod error;
pub mod order;
pub mod render;
pub mod scheme;
pub mod tvar;
pub mod ty;
