//! Canonical renumbering of type variables.
//!
//! Tests that do type inference will see type variable ids that depend on
//! everything the inference engine allocated before them, e.g. the size of
//! the standard library. A [`CanonicalMapping`] renumbers the variables of a
//! type densely from zero, in the order they are first encountered by a fixed
//! pre-order traversal:
//!
//! 1. a variable is assigned the next id if it has not been seen yet;
//! 2. an array visits its element;
//! 3. a dictionary visits its key and then its value;
//! 4. a record visits its fields in declared order, then its tail (if open);
//! 5. a function visits its parameters in declared order, then its return
//!    type;
//! 6. a primitive has no children.
//!
//! Any two types that differ only by a consistent renaming of their variables
//! produce the same numbering, and hence render identically.

use std::{collections::HashMap, sync::Arc};

use recursion::CollapsibleExt;

use crate::{
    config::Config,
    error::{Error, Result},
    tvar::TyVar,
    ty::{Field, FnTy, MonoType, MonoTypeFrame, Param, ParamFrame, Record},
};

/// A table from raw type variables to dense canonical ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalMapping {
    ids: HashMap<TyVar, u64>,
    /// The raw variables, indexed by their canonical id.
    order: Vec<TyVar>,
}

impl CanonicalMapping {
    pub fn get(&self, var: TyVar) -> Option<u64> {
        self.ids.get(&var).copied()
    }

    /// Like [`CanonicalMapping::get`], but a missing entry is an
    /// [`Error::InconsistentMapping`].
    pub fn lookup(&self, var: TyVar) -> Result<u64> {
        self.get(var).ok_or(Error::InconsistentMapping(var))
    }

    /// Returns the canonical counterpart of `var` as a type variable.
    pub fn rename(&self, var: TyVar) -> Result<TyVar> {
        self.lookup(var).map(TyVar::new)
    }

    pub fn contains(&self, var: TyVar) -> bool {
        self.ids.contains_key(&var)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(raw, canonical)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TyVar, u64)> + '_ {
        self.order.iter().zip(0..).map(|(var, id)| (*var, id))
    }

    /// Assigns the next id to `var` if it doesn't already have one. Returns
    /// `true` if a new id was assigned.
    fn insert(&mut self, var: TyVar) -> bool {
        if self.ids.contains_key(&var) {
            return false;
        }

        let next = self.order.len() as u64;
        self.ids.insert(var, next);
        self.order.push(var);
        true
    }
}

/// Builds a [`CanonicalMapping`] over one or more traversals.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    mapping: CanonicalMapping,
    max_depth: usize,
}

enum Visit<'a> {
    Ty(&'a MonoType, usize),
    Var(TyVar),
}

impl Canonicalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            mapping: CanonicalMapping::default(),
            max_depth: config.max_depth,
        }
    }

    /// Assigns the next id to `var` if it hasn't been seen yet, returning
    /// `true` in that case.
    pub fn visit_var(&mut self, var: TyVar) -> bool {
        self.mapping.insert(var)
    }

    /// Visits every variable in `ty` in canonical order.
    ///
    /// The traversal keeps its own stack, so it works for graphs of any depth
    /// up to the configured limit.
    pub fn visit(&mut self, ty: &MonoType) -> Result {
        let mut stack = vec![Visit::Ty(ty, 1)];

        while let Some(visit) = stack.pop() {
            let (ty, depth) = match visit {
                Visit::Var(var) => {
                    self.visit_var(var);
                    continue;
                }
                Visit::Ty(ty, depth) => (ty, depth),
            };

            if depth > self.max_depth {
                return Err(Error::DepthExceeded {
                    limit: self.max_depth,
                });
            }

            // children are pushed in reverse so they pop in declared order
            match ty {
                MonoType::Var(var) => {
                    self.visit_var(*var);
                }
                MonoType::Prim(_) => (),
                MonoType::Array(elem) => stack.push(Visit::Ty(elem, depth + 1)),
                MonoType::Dict { key, value } => {
                    stack.push(Visit::Ty(value, depth + 1));
                    stack.push(Visit::Ty(key, depth + 1));
                }
                MonoType::Record(record) => {
                    if let Some(tail) = record.tail() {
                        stack.push(Visit::Var(tail));
                    }

                    for index in (0..record.num_fields()).rev() {
                        let field = record.field(index)?;
                        stack.push(Visit::Ty(&field.ty, depth + 1));
                    }
                }
                MonoType::Fn(func) => {
                    stack.push(Visit::Ty(func.ret(), depth + 1));

                    for index in (0..func.num_params()).rev() {
                        let param = func.param(index)?;
                        stack.push(Visit::Ty(&param.ty, depth + 1));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn mapping(&self) -> &CanonicalMapping {
        &self.mapping
    }

    pub fn finish(self) -> CanonicalMapping {
        self.mapping
    }
}

impl MonoType {
    /// Returns the canonical mapping of `self` alone.
    pub fn canonical_mapping(
        &self,
        config: &Config,
    ) -> Result<CanonicalMapping> {
        let mut canonicalizer = Canonicalizer::new(config);
        canonicalizer.visit(self)?;
        Ok(canonicalizer.finish())
    }

    /// Returns the distinct variables of `self` in first-occurrence order,
    /// failing like [`MonoType::canonical_mapping`] if `self` is nested
    /// deeper than `config.max_depth`.
    pub fn free_vars(&self, config: &Config) -> Result<Vec<TyVar>> {
        let mapping = self.canonical_mapping(config)?;
        Ok(mapping.order)
    }

    /// Returns a copy of `self` with every variable replaced by its canonical
    /// counterpart in `mapping`.
    pub fn rename(&self, mapping: &CanonicalMapping) -> Result<MonoType> {
        self.try_collapse_frames(|frame| {
            Ok(match frame {
                MonoTypeFrame::Var(var) => MonoType::Var(mapping.rename(var)?),
                MonoTypeFrame::Prim(prim) => MonoType::Prim(prim),
                MonoTypeFrame::Array(elem) => MonoType::array(elem),
                MonoTypeFrame::Dict { key, value } => {
                    MonoType::dict(key, value)
                }
                MonoTypeFrame::Record { fields, tail } => {
                    let fields = fields
                        .into_iter()
                        .map(|(label, ty)| Field::new(label, ty));

                    let record = match tail {
                        Some(tail) => {
                            Record::open(fields, mapping.rename(tail)?)
                        }
                        None => Record::closed(fields),
                    };

                    record.into()
                }
                MonoTypeFrame::Fn { params, ret } => {
                    let params = params.into_iter().map(
                        |ParamFrame {
                             label,
                             ty,
                             required,
                             pipe,
                         }| Param {
                            label: label.into(),
                            ty: Arc::new(ty),
                            required,
                            pipe,
                        },
                    );

                    FnTy::new(params, ret)?.into()
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::PrimTy;

    fn t(id: u64) -> MonoType {
        MonoType::Var(TyVar::new(id))
    }

    fn canonical(ty: &MonoType) -> Vec<(u64, u64)> {
        ty.canonical_mapping(&Config::default())
            .unwrap()
            .iter()
            .map(|(var, id)| (var.id(), id))
            .collect()
    }

    #[test]
    fn first_occurrence_numbering() {
        let func = FnTy::new(
            [Param::required("a", t(7)), Param::required("b", t(3))],
            t(7),
        )
        .unwrap();

        assert_eq!(canonical(&func.into()), [(7, 0), (3, 1)]);
    }

    #[test]
    fn dict_visits_key_before_value() {
        let dict = MonoType::dict(t(9), MonoType::array(t(2)));
        assert_eq!(canonical(&dict), [(9, 0), (2, 1)]);
    }

    #[test]
    fn record_tail_is_visited_last() {
        let record = Record::open(
            [Field::new("b", t(5)), Field::new("a", t(8))],
            TyVar::new(1),
        );

        assert_eq!(canonical(&record.into()), [(5, 0), (8, 1), (1, 2)]);
    }

    #[test]
    fn params_before_return() {
        let inner = FnTy::new([Param::required("x", t(4))], t(6)).unwrap();
        let outer = FnTy::new(
            [
                Param::pipe("tables", MonoType::array(t(6))),
                Param::optional("fn", inner.into()),
            ],
            t(2),
        )
        .unwrap();

        assert_eq!(canonical(&outer.into()), [(6, 0), (4, 1), (2, 2)]);
    }

    #[test]
    fn primitives_do_not_affect_numbering() {
        assert!(canonical(&PrimTy::Int.into()).is_empty());

        let dict = MonoType::dict(PrimTy::String.into(), t(11));
        assert_eq!(canonical(&dict), [(11, 0)]);
    }

    #[test]
    fn mapping_is_idempotent() {
        let func = FnTy::new(
            [Param::required("a", t(3)), Param::required("b", t(1))],
            MonoType::dict(t(1), t(0)),
        )
        .unwrap();
        let ty = MonoType::from(func);

        let first = ty.canonical_mapping(&Config::default()).unwrap();
        let second = ty.canonical_mapping(&Config::default()).unwrap();
        assert_eq!(first, second);

        let mut canonicalizer = Canonicalizer::new(&Config::default());
        canonicalizer.visit(&ty).unwrap();
        canonicalizer.visit(&ty).unwrap();
        assert_eq!(canonicalizer.finish(), first);
    }

    #[test]
    fn lookup_missing_var_is_inconsistent() {
        let mapping = t(3).canonical_mapping(&Config::default()).unwrap();

        assert_eq!(mapping.lookup(TyVar::new(3)).unwrap(), 0);
        assert!(matches!(
            mapping.lookup(TyVar::new(4)),
            Err(Error::InconsistentMapping(var)) if var == TyVar::new(4)
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let ty = MonoType::array(MonoType::array(MonoType::array(t(0))));
        let config = Config::default().with_max_depth(3);

        assert!(matches!(
            ty.canonical_mapping(&config),
            Err(Error::DepthExceeded { limit: 3 })
        ));
        assert!(ty.canonical_mapping(&config.with_max_depth(4)).is_ok());
    }

    #[test]
    fn rename_produces_canonical_graph() {
        let func = FnTy::new(
            [Param::required("a", t(7)), Param::optional("b", t(3))],
            Record::open([Field::new("x", t(7))], TyVar::new(12)).into(),
        )
        .unwrap();
        let ty = MonoType::from(func);
        let mapping = ty.canonical_mapping(&Config::default()).unwrap();

        let expected = FnTy::new(
            [Param::required("a", t(0)), Param::optional("b", t(1))],
            Record::open([Field::new("x", t(0))], TyVar::new(2)).into(),
        )
        .unwrap();

        assert_eq!(ty.rename(&mapping).unwrap(), MonoType::from(expected));
    }

    #[test]
    fn rename_with_incomplete_mapping_fails() {
        let mapping = t(1).canonical_mapping(&Config::default()).unwrap();
        let ty = MonoType::dict(t(1), t(2));

        assert!(matches!(
            ty.rename(&mapping),
            Err(Error::InconsistentMapping(_))
        ));
    }

    #[test]
    fn free_vars_in_first_occurrence_order() {
        let ty = MonoType::dict(t(5), MonoType::dict(t(2), t(5)));
        assert_eq!(
            ty.free_vars(&Config::default()).unwrap(),
            [TyVar::new(5), TyVar::new(2)]
        );
    }

    #[test]
    fn free_vars_respects_depth_limit() {
        let ty = MonoType::array(MonoType::array(t(0)));
        let config = Config::default().with_max_depth(2);

        assert!(matches!(
            ty.free_vars(&config),
            Err(Error::DepthExceeded { limit: 2 })
        ));
        assert_eq!(
            ty.free_vars(&config.with_max_depth(3)).unwrap(),
            [TyVar::new(0)]
        );
    }
}
