//! Monotypes.
//!
//! A [`MonoType`] is an immutable tree. Recursive children are stored behind
//! [`Arc`] so that subtrees can be cloned cheaply and shared between threads;
//! type variables are the only thing that may "repeat" in a graph, and they
//! do so by value (see [`TyVar`]).
//!
//! # Traversal
//! Arbitrarily deep graphs must not overflow the call stack, so structural
//! folds go through the [`recursion`] crate: `&MonoType` is [`Collapsible`]
//! into a [`MonoTypeFrame`], and folds like [`MonoType::depth`] are written as
//! a single non-recursive function over frames. The canonical traversal is
//! order-sensitive and lives in [`crate::canonical`] instead.

use std::sync::{Arc, LazyLock};

use recursion::{Collapsible, CollapsibleExt, MappableFrame, PartiallyApplied};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    tvar::TyVar,
};

pub mod kind;

/// A monotype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonoType {
    Var(TyVar),
    Prim(PrimTy),
    Array(Arc<Self>),
    Dict { key: Arc<Self>, value: Arc<Self> },
    Record(Record),
    Fn(FnTy),
}

impl MonoType {
    pub fn var(var: TyVar) -> Self {
        Self::Var(var)
    }

    pub fn array(elem: MonoType) -> Self {
        Self::Array(Arc::new(elem))
    }

    pub fn dict(key: MonoType, value: MonoType) -> Self {
        Self::Dict {
            key: Arc::new(key),
            value: Arc::new(value),
        }
    }

    pub fn as_var(&self) -> Option<TyVar> {
        match self {
            Self::Var(var) => Some(*var),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<PrimTy> {
        match self {
            Self::Prim(prim) => Some(*prim),
            _ => None,
        }
    }

    /// Returns the element type if `self` is an array.
    pub fn as_array(&self) -> Option<&MonoType> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Returns the key and value types if `self` is a dictionary.
    pub fn as_dict(&self) -> Option<(&MonoType, &MonoType)> {
        match self {
            Self::Dict { key, value } => Some((key, value)),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_fn(&self) -> Option<&FnTy> {
        match self {
            Self::Fn(func) => Some(func),
            _ => None,
        }
    }

    /// Returns the nesting depth of `self`, where leaves have depth 1.
    pub fn depth(&self) -> usize {
        self.collapse_frames(|frame| {
            let deepest = match frame {
                MonoTypeFrame::Var(_) | MonoTypeFrame::Prim(_) => 0,
                MonoTypeFrame::Array(elem) => elem,
                MonoTypeFrame::Dict { key, value } => key.max(value),
                MonoTypeFrame::Record { fields, .. } => {
                    fields.iter().map(|(_, depth)| *depth).max().unwrap_or(0)
                }
                MonoTypeFrame::Fn { params, ret } => params
                    .iter()
                    .map(|param| param.ty)
                    .max()
                    .unwrap_or(0)
                    .max(ret),
            };

            deepest + 1
        })
    }

    /// Fails with [`Error::DepthExceeded`] if `self` is nested deeper than
    /// `limit`.
    pub fn check_depth(&self, limit: usize) -> Result {
        match self.depth() {
            depth if depth > limit => Err(Error::DepthExceeded { limit }),
            _ => Ok(()),
        }
    }
}

/// The leaf left behind in place of a detached subtree.
static DETACHED: LazyLock<Arc<MonoType>> =
    LazyLock::new(|| Arc::new(MonoType::Prim(PrimTy::Bool)));

impl MonoType {
    /// Moves the children of `self` onto `stack`, leaving [`DETACHED`] in
    /// their place. Labels and flags are kept; only the subtrees are detached.
    fn detach_children(&mut self, stack: &mut Vec<Arc<MonoType>>) {
        let leaf = &*DETACHED;

        match self {
            Self::Var(_) | Self::Prim(_) => (),
            Self::Array(elem) => {
                stack.push(std::mem::replace(elem, leaf.clone()));
            }
            Self::Dict { key, value } => {
                stack.push(std::mem::replace(key, leaf.clone()));
                stack.push(std::mem::replace(value, leaf.clone()));
            }
            Self::Record(record) => {
                for field in record.fields.iter_mut() {
                    stack.push(std::mem::replace(&mut field.ty, leaf.clone()));
                }
            }
            Self::Fn(func) => {
                for param in func.params.iter_mut() {
                    stack.push(std::mem::replace(&mut param.ty, leaf.clone()));
                }

                stack.push(std::mem::replace(&mut func.ret, leaf.clone()));
            }
        }
    }
}

/// Graphs may be nested arbitrarily deep, so they are torn down with an
/// explicit stack instead of the generated recursive drop glue.
impl Drop for MonoType {
    fn drop(&mut self) {
        if matches!(self, Self::Var(_) | Self::Prim(_)) {
            return;
        }

        let mut stack = Vec::new();
        self.detach_children(&mut stack);

        while let Some(child) = stack.pop() {
            // shared subtrees are still owned elsewhere
            if let Ok(mut child) = Arc::try_unwrap(child) {
                child.detach_children(&mut stack);
            }
        }
    }
}

impl From<PrimTy> for MonoType {
    fn from(value: PrimTy) -> Self {
        Self::Prim(value)
    }
}

impl From<TyVar> for MonoType {
    fn from(value: TyVar) -> Self {
        Self::Var(value)
    }
}

impl From<Record> for MonoType {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<FnTy> for MonoType {
    fn from(value: FnTy) -> Self {
        Self::Fn(value)
    }
}

/// A primitive type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum PrimTy {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Duration,
    Time,
    Regexp,
    Bytes,
}

impl PrimTy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Duration => "duration",
            Self::Time => "time",
            Self::Regexp => "regexp",
            Self::Bytes => "bytes",
        }
    }
}

/// A structural record type.
///
/// A record with a `tail` variable is _open_: it may be instantiated with
/// any record that has at least the listed fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    fields: Box<[Field]>,
    #[serde(default)]
    tail: Option<TyVar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub label: Box<str>,
    pub ty: Arc<MonoType>,
}

impl Field {
    pub fn new(label: impl Into<Box<str>>, ty: MonoType) -> Self {
        Self {
            label: label.into(),
            ty: Arc::new(ty),
        }
    }
}

impl Record {
    pub fn closed(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            tail: None,
        }
    }

    pub fn open(fields: impl IntoIterator<Item = Field>, tail: TyVar) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            tail: Some(tail),
        }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Returns the field at ordinal position `index`.
    pub fn field(&self, index: usize) -> Result<&Field> {
        self.fields.get(index).ok_or_else(|| {
            Error::out_of_bounds("record field", index, self.num_fields())
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn tail(&self) -> Option<TyVar> {
        self.tail
    }

    pub fn is_open(&self) -> bool {
        self.tail.is_some()
    }
}

/// A function type with labeled parameters.
///
/// At most one parameter may be the pipe-forward receiver; this is checked
/// by [`FnTy::new`] and when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FnTyRepr")]
pub struct FnTy {
    params: Box<[Param]>,
    ret: Arc<MonoType>,
}

#[derive(Deserialize)]
struct FnTyRepr {
    params: Box<[Param]>,
    ret: Arc<MonoType>,
}

impl TryFrom<FnTyRepr> for FnTy {
    type Error = Error;

    fn try_from(value: FnTyRepr) -> Result<Self> {
        Self::from_parts(value.params, value.ret)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub label: Box<str>,
    pub ty: Arc<MonoType>,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub pipe: bool,
}

fn default_required() -> bool {
    true
}

impl Param {
    pub fn required(label: impl Into<Box<str>>, ty: MonoType) -> Self {
        Self {
            label: label.into(),
            ty: Arc::new(ty),
            required: true,
            pipe: false,
        }
    }

    pub fn optional(label: impl Into<Box<str>>, ty: MonoType) -> Self {
        Self {
            required: false,
            ..Self::required(label, ty)
        }
    }

    /// A required pipe-forward receiver.
    pub fn pipe(label: impl Into<Box<str>>, ty: MonoType) -> Self {
        Self {
            pipe: true,
            ..Self::required(label, ty)
        }
    }
}

impl FnTy {
    pub fn new(
        params: impl IntoIterator<Item = Param>,
        ret: MonoType,
    ) -> Result<Self> {
        Self::from_parts(params.into_iter().collect(), Arc::new(ret))
    }

    fn from_parts(params: Box<[Param]>, ret: Arc<MonoType>) -> Result<Self> {
        let count = params.iter().filter(|param| param.pipe).count();

        match count {
            0 | 1 => Ok(Self { params, ret }),
            count => Err(Error::MultiplePipeParams { count }),
        }
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// Returns the parameter at ordinal position `index`.
    pub fn param(&self, index: usize) -> Result<&Param> {
        self.params.get(index).ok_or_else(|| {
            Error::out_of_bounds("function parameter", index, self.num_params())
        })
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn pipe_param(&self) -> Option<&Param> {
        self.params.iter().find(|param| param.pipe)
    }

    pub fn ret(&self) -> &MonoType {
        &self.ret
    }
}

/// A single layer of a [`MonoType`], with the recursive positions replaced
/// by values of `A`.
#[derive(Debug, Clone)]
pub enum MonoTypeFrame<'a, A> {
    Var(TyVar),
    Prim(PrimTy),
    Array(A),
    Dict {
        key: A,
        value: A,
    },
    Record {
        fields: Box<[(&'a str, A)]>,
        tail: Option<TyVar>,
    },
    Fn {
        params: Box<[ParamFrame<'a, A>]>,
        ret: A,
    },
}

#[derive(Debug, Clone)]
pub struct ParamFrame<'a, A> {
    pub label: &'a str,
    pub ty: A,
    pub required: bool,
    pub pipe: bool,
}

impl<'a> MappableFrame for MonoTypeFrame<'a, PartiallyApplied> {
    type Frame<X> = MonoTypeFrame<'a, X>;

    fn map_frame<A, B>(
        input: Self::Frame<A>,
        mut f: impl FnMut(A) -> B,
    ) -> Self::Frame<B> {
        match input {
            MonoTypeFrame::Var(var) => MonoTypeFrame::Var(var),
            MonoTypeFrame::Prim(prim) => MonoTypeFrame::Prim(prim),
            MonoTypeFrame::Array(elem) => MonoTypeFrame::Array(f(elem)),
            MonoTypeFrame::Dict { key, value } => MonoTypeFrame::Dict {
                key: f(key),
                value: f(value),
            },
            MonoTypeFrame::Record { fields, tail } => MonoTypeFrame::Record {
                fields: fields
                    .into_iter()
                    .map(|(label, ty)| (label, f(ty)))
                    .collect(),
                tail,
            },
            MonoTypeFrame::Fn { params, ret } => MonoTypeFrame::Fn {
                params: params
                    .into_iter()
                    .map(
                        |ParamFrame {
                             label,
                             ty,
                             required,
                             pipe,
                         }| ParamFrame {
                            label,
                            ty: f(ty),
                            required,
                            pipe,
                        },
                    )
                    .collect(),
                ret: f(ret),
            },
        }
    }
}

impl<'a> Collapsible for &'a MonoType {
    type FrameToken = MonoTypeFrame<'a, PartiallyApplied>;

    fn into_frame(self) -> <Self::FrameToken as MappableFrame>::Frame<Self> {
        match self {
            MonoType::Var(var) => MonoTypeFrame::Var(*var),
            MonoType::Prim(prim) => MonoTypeFrame::Prim(*prim),
            MonoType::Array(elem) => MonoTypeFrame::Array(elem.as_ref()),
            MonoType::Dict { key, value } => MonoTypeFrame::Dict {
                key: key.as_ref(),
                value: value.as_ref(),
            },
            MonoType::Record(record) => MonoTypeFrame::Record {
                fields: record
                    .fields
                    .iter()
                    .map(|field| (field.label.as_ref(), field.ty.as_ref()))
                    .collect(),
                tail: record.tail,
            },
            MonoType::Fn(func) => MonoTypeFrame::Fn {
                params: func
                    .params
                    .iter()
                    .map(|param| ParamFrame {
                        label: param.label.as_ref(),
                        ty: param.ty.as_ref(),
                        required: param.required,
                        pipe: param.pipe,
                    })
                    .collect(),
                ret: func.ret.as_ref(),
            },
        }
    }
}
