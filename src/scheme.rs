//! Type schemes.
//!
//! A [`Scheme`] is the decoded form of a type scheme as handed over by the
//! inference engine (or any decoding layer in between). A [`PolyType`] is a
//! read-only view over a shared [`Scheme`] that offers bounds-checked access,
//! canonicalization, ordering and rendering.
//!
//! # Canonical Strings
//! The raw rendering of a scheme prints the type variable ids chosen by the
//! inference engine, which shift whenever anything allocated before them
//! changes. [`PolyType::canonical_string`] instead numbers the variables from
//! zero by first occurrence in the body, so it is suitable for golden files
//! and for hashing type signatures.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::{
    canonical::{CanonicalMapping, Canonicalizer},
    config::Config,
    error::{Error, Result},
    order,
    render::{self, Naming, ToDoc},
    tvar::TyVar,
    ty::{MonoType, kind::Constraint},
};

/// A decoded type scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    #[serde(default)]
    pub vars: Box<[TyVar]>,
    #[serde(default)]
    pub constraints: Box<[Constraint]>,
    /// The body of the scheme. A well-formed scheme always has one.
    #[serde(default)]
    pub expr: Option<Arc<MonoType>>,
}

impl Scheme {
    pub fn new(
        vars: impl IntoIterator<Item = TyVar>,
        constraints: impl IntoIterator<Item = Constraint>,
        expr: MonoType,
    ) -> Self {
        Self {
            vars: vars.into_iter().collect(),
            constraints: constraints.into_iter().collect(),
            expr: Some(Arc::new(expr)),
        }
    }
}

/// A polytype.
#[derive(Debug, Clone)]
pub struct PolyType {
    handle: Arc<Scheme>,
    config: Config,
}

impl PolyType {
    /// Returns a view over `handle`, failing if there is no handle.
    pub fn new(handle: Option<Arc<Scheme>>) -> Result<Self> {
        let handle = handle.ok_or(Error::MissingGraph)?;

        Ok(Self {
            handle,
            config: Config::default(),
        })
    }

    pub fn from_scheme(scheme: Scheme) -> Self {
        Self {
            handle: Arc::new(scheme),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scheme(&self) -> &Scheme {
        &self.handle
    }

    /// Returns the number of quantified type variables.
    pub fn num_vars(&self) -> usize {
        self.handle.vars.len()
    }

    /// Returns the quantified type variable at ordinal position `index`.
    pub fn var(&self, index: usize) -> Result<TyVar> {
        self.handle.vars.get(index).copied().ok_or_else(|| {
            Error::out_of_bounds("polytype var", index, self.num_vars())
        })
    }

    pub fn vars(&self) -> &[TyVar] {
        &self.handle.vars
    }

    /// Returns the number of kind constraints.
    pub fn num_constraints(&self) -> usize {
        self.handle.constraints.len()
    }

    /// Returns the constraint at ordinal position `index`.
    pub fn constraint(&self, index: usize) -> Result<Constraint> {
        self.handle.constraints.get(index).copied().ok_or_else(|| {
            Error::out_of_bounds("constraint", index, self.num_constraints())
        })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.handle.constraints
    }

    /// Returns the body of the scheme.
    pub fn expr(&self) -> Result<&MonoType> {
        self.handle.expr.as_deref().ok_or(Error::MissingChild {
            what: "polytype expr",
        })
    }

    /// Returns the quantified variables sorted by raw id.
    pub fn sorted_vars(&self) -> Result<Vec<TyVar>> {
        order::sorted_vars(self.vars(), None)
    }

    /// Returns the quantified variables sorted by canonical id.
    pub fn canonical_sorted_vars(&self) -> Result<Vec<TyVar>> {
        let mapping = self.canonical_mapping()?;
        order::sorted_vars(self.vars(), Some(&mapping))
    }

    /// Returns the constraints sorted by raw type variable id and kind.
    pub fn sorted_constraints(&self) -> Result<Vec<Constraint>> {
        order::sorted_constraints(self.constraints(), None)
    }

    /// Returns the constraints sorted by canonical type variable id and kind.
    pub fn canonical_sorted_constraints(&self) -> Result<Vec<Constraint>> {
        let mapping = self.canonical_mapping()?;
        order::sorted_constraints(self.constraints(), Some(&mapping))
    }

    /// Returns the canonical numbering of the type variables in `self`.
    ///
    /// Variables are numbered by first occurrence in the body. Quantified
    /// variables that don't occur in the body are numbered next, in list
    /// order, and constrained variables that are neither quantified nor in
    /// the body come last. Neither should happen for a well-formed scheme,
    /// but numbering them keeps diagnostics working for broken ones.
    pub fn canonical_mapping(&self) -> Result<CanonicalMapping> {
        let _span = debug_span!(
            "canonical_mapping",
            vars = self.num_vars(),
            constraints = self.num_constraints()
        )
        .entered();

        let mut canonicalizer = Canonicalizer::new(&self.config);
        canonicalizer.visit(self.expr()?)?;

        for index in 0..self.num_vars() {
            let var = self.var(index)?;
            if canonicalizer.visit_var(var) {
                debug!(%var, "quantified variable does not occur in the body");
            }
        }

        for index in 0..self.num_constraints() {
            let cons = self.constraint(index)?;
            if canonicalizer.visit_var(cons.tvar) {
                warn!(
                    tvar = %cons.tvar,
                    kind = %cons.kind,
                    "constrained variable is neither quantified nor in the body"
                );
            }
        }

        Ok(canonicalizer.finish())
    }

    /// Returns a copy of the underlying scheme with every type variable
    /// renamed to its canonical id, and with the variables and constraints
    /// in canonical order.
    pub fn canonicalize(&self) -> Result<Scheme> {
        let mapping = self.canonical_mapping()?;

        let vars = order::sorted_vars(self.vars(), Some(&mapping))?
            .into_iter()
            .map(|var| mapping.rename(var))
            .collect::<Result<Box<[_]>>>()?;

        let constraints =
            order::sorted_constraints(self.constraints(), Some(&mapping))?
                .into_iter()
                .map(|cons| {
                    Ok(Constraint::new(mapping.rename(cons.tvar)?, cons.kind))
                })
                .collect::<Result<Box<[_]>>>()?;

        let expr = self.expr()?.rename(&mapping)?;

        Ok(Scheme {
            vars,
            constraints,
            expr: Some(Arc::new(expr)),
        })
    }

    /// Returns `true` if `self` and `other` are equal up to a consistent
    /// renaming of their type variables.
    pub fn canonical_eq(&self, other: &PolyType) -> Result<bool> {
        Ok(self.canonicalize()? == other.canonicalize()?)
    }

    /// Renders `self` with raw type variable ids.
    pub fn try_raw_string(&self) -> Result<String> {
        self.expr()?.check_depth(self.config.max_depth)?;
        let doc = self.to_doc(Naming::Raw)?;
        Ok(render::print(doc, self.config.width))
    }

    /// Renders `self` with canonical type variable ids.
    pub fn try_canonical_string(&self) -> Result<String> {
        let mapping = self.canonical_mapping()?;
        let doc = self.to_doc(Naming::Canonical(&mapping))?;
        Ok(render::print(doc, self.config.width))
    }

    /// Like [`PolyType::try_raw_string`], but renders errors as a
    /// `<message>` placeholder.
    pub fn raw_string(&self) -> String {
        self.try_raw_string().unwrap_or_else(|err| {
            warn!(%err, "failed to render polytype");
            render::placeholder(&err)
        })
    }

    /// Like [`PolyType::try_canonical_string`], but renders errors as a
    /// `<message>` placeholder.
    pub fn canonical_string(&self) -> String {
        self.try_canonical_string().unwrap_or_else(|err| {
            warn!(%err, "failed to render canonical polytype");
            render::placeholder(&err)
        })
    }
}

impl std::fmt::Display for PolyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_string())
    }
}
