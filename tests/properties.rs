//! Property tests for canonical rendering.
//!
//! These tests check that canonical strings are deterministic and that they
//! only depend on the structure of a scheme, not on its variable ids.

use proptest::prelude::*;
use tyscheme::{
    config::Config,
    scheme::{PolyType, Scheme},
    tvar::TyVar,
    ty::{
        Field, FnTy, MonoType, Param, PrimTy, Record,
        kind::{Constraint, Kind},
    },
};

/// An id that never occurs in generated bodies.
const UNREACHABLE: u64 = 99;

fn prim() -> impl Strategy<Value = PrimTy> {
    prop_oneof![
        Just(PrimTy::Bool),
        Just(PrimTy::Int),
        Just(PrimTy::Uint),
        Just(PrimTy::Float),
        Just(PrimTy::String),
        Just(PrimTy::Duration),
        Just(PrimTy::Time),
        Just(PrimTy::Regexp),
        Just(PrimTy::Bytes),
    ]
}

fn kind() -> impl Strategy<Value = Kind> {
    prop::sample::select(Kind::ALL.to_vec())
}

fn monotype() -> impl Strategy<Value = MonoType> {
    let leaf = prop_oneof![
        (0u64..6).prop_map(|id| MonoType::Var(TyVar::new(id))),
        prim().prop_map(MonoType::Prim),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(MonoType::array),
            (inner.clone(), inner.clone())
                .prop_map(|(key, value)| MonoType::dict(key, value)),
            (
                prop::collection::vec(inner.clone(), 0..4),
                prop::option::of(0u64..6)
            )
                .prop_map(|(tys, tail)| {
                    let fields = tys
                        .into_iter()
                        .enumerate()
                        .map(|(i, ty)| Field::new(format!("f{i}"), ty));

                    let record = match tail {
                        Some(tail) => Record::open(fields, TyVar::new(tail)),
                        None => Record::closed(fields),
                    };
                    MonoType::from(record)
                }),
            (
                prop::collection::vec((inner.clone(), any::<bool>()), 0..4),
                inner,
            )
                .prop_map(|(params, ret)| {
                    let params = params.into_iter().enumerate().map(
                        |(i, (ty, required))| match required {
                            true => Param::required(format!("p{i}"), ty),
                            false => Param::optional(format!("p{i}"), ty),
                        },
                    );

                    MonoType::from(FnTy::new(params, ret).unwrap())
                }),
        ]
    })
}

fn scheme() -> impl Strategy<Value = Scheme> {
    (
        monotype(),
        any::<bool>(),
        prop::collection::vec((any::<prop::sample::Index>(), kind()), 0..5),
    )
        .prop_map(|(body, unreachable, picks)| {
            let mut vars = body.free_vars(&Config::default()).unwrap();
            if unreachable {
                vars.push(TyVar::new(UNREACHABLE));
            }

            let constraints: Vec<_> = match vars.is_empty() {
                true => vec![],
                false => picks
                    .into_iter()
                    .map(|(index, kind)| {
                        Constraint::new(vars[index.index(vars.len())], kind)
                    })
                    .collect(),
            };

            Scheme::new(vars, constraints, body)
        })
}

/// A consistent bijection on variable ids.
fn shift(id: u64) -> u64 {
    1000 + id * 7
}

fn relabel_ty(ty: &MonoType) -> MonoType {
    let var = |var: TyVar| TyVar::new(shift(var.id()));

    match ty {
        MonoType::Var(v) => MonoType::Var(var(*v)),
        MonoType::Prim(prim) => MonoType::Prim(*prim),
        MonoType::Array(elem) => MonoType::array(relabel_ty(elem)),
        MonoType::Dict { key, value } => {
            MonoType::dict(relabel_ty(key), relabel_ty(value))
        }
        MonoType::Record(record) => {
            let fields = record
                .fields()
                .iter()
                .map(|field| {
                    Field::new(field.label.clone(), relabel_ty(&field.ty))
                });

            match record.tail() {
                Some(tail) => Record::open(fields, var(tail)).into(),
                None => Record::closed(fields).into(),
            }
        }
        MonoType::Fn(func) => {
            let params = func.params().iter().map(|param| Param {
                ty: relabel_ty(&param.ty).into(),
                ..param.clone()
            });

            FnTy::new(params, relabel_ty(func.ret())).unwrap().into()
        }
    }
}

fn relabel(scheme: &Scheme) -> Scheme {
    let expr = scheme.expr.as_deref().map(relabel_ty).unwrap();

    Scheme::new(
        scheme.vars.iter().map(|var| TyVar::new(shift(var.id()))),
        scheme
            .constraints
            .iter()
            .map(|cons| {
                Constraint::new(TyVar::new(shift(cons.tvar.id())), cons.kind)
            }),
        expr,
    )
}

proptest! {
    #[test]
    fn canonical_string_is_deterministic(scheme in scheme()) {
        let poly = PolyType::from_scheme(scheme.clone());
        let again = PolyType::from_scheme(scheme);

        prop_assert_eq!(poly.canonical_string(), poly.canonical_string());
        prop_assert_eq!(poly.canonical_string(), again.canonical_string());
    }

    #[test]
    fn canonical_string_ignores_renaming(scheme in scheme()) {
        let poly = PolyType::from_scheme(scheme.clone());
        let renamed = PolyType::from_scheme(relabel(&scheme));

        prop_assert_eq!(poly.canonical_string(), renamed.canonical_string());
        prop_assert!(poly.canonical_eq(&renamed).unwrap());
    }

    #[test]
    fn canonical_ids_are_dense(scheme in scheme()) {
        let poly = PolyType::from_scheme(scheme);
        let mapping = poly.canonical_mapping().unwrap();

        prop_assert_eq!(mapping.len(), poly.num_vars());
        for (expected, (_, id)) in mapping.iter().enumerate() {
            prop_assert_eq!(id, expected as u64);
        }
    }

    #[test]
    fn canonicalized_scheme_renders_raw_as_canonical(scheme in scheme()) {
        let poly = PolyType::from_scheme(scheme);
        let canonical = PolyType::from_scheme(poly.canonicalize().unwrap());

        prop_assert_eq!(canonical.raw_string(), poly.canonical_string());
    }

    #[test]
    fn unreachable_var_is_numbered_last(body in monotype()) {
        let mut vars = body.free_vars(&Config::default()).unwrap();
        let reachable = vars.len() as u64;
        vars.push(TyVar::new(UNREACHABLE));

        let poly = PolyType::from_scheme(Scheme::new(vars, [], body));
        let mapping = poly.canonical_mapping().unwrap();

        prop_assert_eq!(mapping.get(TyVar::new(UNREACHABLE)), Some(reachable));
    }
}
