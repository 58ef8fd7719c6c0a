//! Object literal / class member properties ("spec.md" §3 Property).

use tsz_common::span::Span;

use crate::expr::Expr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Normal,
    Get,
    Set,
    Spread,
}

/// Invariant (`spec.md` §3): every `Spread` property has `key == None`;
/// every other property has `key == Some(_)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub kind: PropertyKind,
    pub key: Option<Box<Expr>>,
    pub value: Box<Expr>,
    pub initializer: Option<Box<Expr>>,
    pub is_method: bool,
    pub is_static: bool,
    pub is_computed: bool,
    pub decorators: Vec<Expr>,
    pub span: Span,
}

impl Property {
    #[must_use]
    pub const fn is_spread(&self) -> bool {
        matches!(self.kind, PropertyKind::Spread)
    }

    /// A private class member is one whose key is a `PrivateIdent`.
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(self.key.as_deref(), Some(Expr::PrivateIdent(..)))
    }
}
