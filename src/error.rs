//! Structural errors raised while reading type schemes.
//!
//! None of these describe bad user input: a type graph is produced by the
//! inference engine, so every variant here points at a defect in whatever
//! built or decoded the graph.

use thiserror::Error;

use crate::{config::ConfigLoadError, tvar::TyVar};

/// The public result type of this crate.
pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("got a missing type scheme handle")]
    MissingGraph,
    #[error("request for {what} out of bounds: {index} in {len}")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("missing {what}")]
    MissingChild { what: &'static str },
    #[error("could not find a canonical mapping for {0}")]
    InconsistentMapping(TyVar),
    #[error("function type has {count} pipe parameters, expected at most one")]
    MultiplePipeParams { count: usize },
    #[error("type graph is nested deeper than the limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("{0}")]
    ConfigLoad(#[from] ConfigLoadError),
}

impl Error {
    pub(crate) fn out_of_bounds(
        what: &'static str,
        index: usize,
        len: usize,
    ) -> Self {
        Self::OutOfBounds { what, index, len }
    }
}
