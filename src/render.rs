//! Textual rendering of monotypes and type schemes.
//!
//! Every renderer takes a [`Naming`], which decides whether type variables
//! are printed with their raw ids or with the ids of a [`CanonicalMapping`].
//! The mode is applied uniformly to every variable in the output, however
//! deeply it is nested.
//!
//! Documents are built with [`pretty`], but only from text fragments: the
//! output is always a single line, whatever the configured width.

use pretty::RcDoc;
use recursion::CollapsibleExt;

use crate::{
    canonical::CanonicalMapping,
    config::{DEFAULT_MAX_DEPTH, DEFAULT_WIDTH},
    error::{Error, Result},
    order,
    scheme::PolyType,
    tvar::TyVar,
    ty::{MonoType, MonoTypeFrame, ParamFrame, kind::Constraint},
};

pub type Doc = RcDoc<'static, ()>;

/// Selects which ids are printed for type variables.
#[derive(Debug, Clone, Copy)]
pub enum Naming<'m> {
    Raw,
    Canonical(&'m CanonicalMapping),
}

impl<'m> Naming<'m> {
    pub fn mapping(self) -> Option<&'m CanonicalMapping> {
        match self {
            Naming::Raw => None,
            Naming::Canonical(mapping) => Some(mapping),
        }
    }

    fn name(self, var: TyVar) -> Result<TyVar> {
        match self {
            Naming::Raw => Ok(var),
            Naming::Canonical(mapping) => mapping.rename(var),
        }
    }
}

pub trait ToDoc {
    fn to_doc(&self, naming: Naming<'_>) -> Result<Doc>;
}

impl ToDoc for TyVar {
    fn to_doc(&self, naming: Naming<'_>) -> Result<Doc> {
        Ok(RcDoc::as_string(naming.name(*self)?))
    }
}

impl ToDoc for Constraint {
    fn to_doc(&self, naming: Naming<'_>) -> Result<Doc> {
        Ok(self
            .tvar
            .to_doc(naming)?
            .append(RcDoc::text(": "))
            .append(RcDoc::text(self.kind.name())))
    }
}

impl ToDoc for MonoType {
    fn to_doc(&self, naming: Naming<'_>) -> Result<Doc> {
        self.try_collapse_frames(|frame| frame.to_doc(naming))
    }
}

impl MonoTypeFrame<'_, Doc> {
    pub fn to_doc(self, naming: Naming<'_>) -> Result<Doc> {
        Ok(match self {
            MonoTypeFrame::Var(var) => var.to_doc(naming)?,
            MonoTypeFrame::Prim(prim) => RcDoc::text(prim.name()),
            MonoTypeFrame::Array(elem) => {
                RcDoc::text("[").append(elem).append(RcDoc::text("]"))
            }
            MonoTypeFrame::Dict { key, value } => RcDoc::text("[")
                .append(key)
                .append(RcDoc::text(": "))
                .append(value)
                .append(RcDoc::text("]")),
            MonoTypeFrame::Record { fields, tail } => {
                let is_empty = fields.is_empty();
                let fields = fields.into_iter().map(|(label, ty)| {
                    RcDoc::as_string(label).append(RcDoc::text(": ")).append(ty)
                });
                let fields = RcDoc::intersperse(fields, RcDoc::text(", "));

                let inner = match tail {
                    None => fields,
                    // an open record without fields is just its tail
                    Some(tail) if is_empty => tail.to_doc(naming)?,
                    Some(tail) => tail
                        .to_doc(naming)?
                        .append(RcDoc::text(" with "))
                        .append(fields),
                };

                RcDoc::text("{").append(inner).append(RcDoc::text("}"))
            }
            MonoTypeFrame::Fn { params, ret } => {
                let params = params.into_iter().map(
                    |ParamFrame {
                         label,
                         ty,
                         required,
                         pipe,
                     }| {
                        let prefix = match (pipe, required) {
                            (true, _) => "<-",
                            (false, false) => "?",
                            (false, true) => "",
                        };

                        RcDoc::text(prefix)
                            .append(RcDoc::as_string(label))
                            .append(RcDoc::text(": "))
                            .append(ty)
                    },
                );

                RcDoc::text("(")
                    .append(RcDoc::intersperse(params, RcDoc::text(", ")))
                    .append(RcDoc::text(") => "))
                    .append(ret)
            }
        })
    }
}

impl ToDoc for PolyType {
    /// Renders `self` as `forall [<vars>] where <constraints> <body>`, with
    /// the `where` clause omitted when there are no constraints.
    fn to_doc(&self, naming: Naming<'_>) -> Result<Doc> {
        let vars = order::sorted_vars(self.vars(), naming.mapping())?
            .iter()
            .map(|var| var.to_doc(naming))
            .collect::<Result<Vec<_>>>()?;

        let mut doc = RcDoc::text("forall [")
            .append(RcDoc::intersperse(vars, RcDoc::text(", ")))
            .append(RcDoc::text("] "));

        let constraints =
            order::sorted_constraints(self.constraints(), naming.mapping())?;

        if !constraints.is_empty() {
            let constraints = constraints
                .iter()
                .map(|cons| cons.to_doc(naming))
                .collect::<Result<Vec<_>>>()?;

            doc = doc
                .append(RcDoc::text("where "))
                .append(RcDoc::intersperse(constraints, RcDoc::text(", ")))
                .append(RcDoc::text(" "));
        }

        Ok(doc.append(self.expr()?.to_doc(naming)?))
    }
}

/// Renders `doc` to a string at the given line width.
pub fn print(doc: Doc, width: usize) -> String {
    format!("{}", doc.pretty(width))
}

/// The text substituted for a rendering that failed with `err`.
pub fn placeholder(err: &Error) -> String {
    format!("<{err}>")
}

/// Renders with raw ids, or a placeholder if `self` is nested deeper than
/// [`DEFAULT_MAX_DEPTH`].
impl std::fmt::Display for MonoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doc = self
            .check_depth(DEFAULT_MAX_DEPTH)
            .and_then(|()| self.to_doc(Naming::Raw));

        match doc {
            Ok(doc) => write!(f, "{}", doc.pretty(DEFAULT_WIDTH)),
            Err(err) => f.write_str(&placeholder(&err)),
        }
    }
}
