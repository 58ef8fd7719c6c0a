//! Binding patterns ("spec.md" §3 Binding) and function parameters.

use tsz_common::span::Span;

use crate::expr::Expr;
use crate::symbol::SymbolRef;

/// One property of an object binding pattern.
///
/// Invariant (`spec.md` §3): if a `Rest` entry is present it is the last
/// entry in the enclosing `Binding::Object`'s `props` vector.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectBindingProp {
    Prop {
        key: Box<Expr>,
        computed: bool,
        value: Binding,
        default: Option<Box<Expr>>,
    },
    Rest(Box<Binding>),
}

impl ObjectBindingProp {
    #[must_use]
    pub const fn is_rest(&self) -> bool {
        matches!(self, Self::Rest(_))
    }
}

/// One element of an array binding pattern: `None` represents an elided hole
/// (`[, x]`).
pub type ArrayBindingItem = Option<BindingElement>;

#[derive(Clone, Debug, PartialEq)]
pub struct BindingElement {
    pub binding: Binding,
    pub default: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Missing,
    Ident(SymbolRef),
    Array {
        items: Vec<ArrayBindingItem>,
        rest: Option<Box<Binding>>,
        span: Span,
    },
    Object {
        props: Vec<ObjectBindingProp>,
        span: Span,
    },
}

impl Binding {
    /// The object pattern contains an object-rest (`{...r}`) property, the
    /// trigger condition for §4.9 lowering.
    #[must_use]
    pub fn contains_object_rest(&self) -> bool {
        match self {
            Self::Object { props, .. } => props.iter().any(|p| match p {
                ObjectBindingProp::Rest(_) => true,
                ObjectBindingProp::Prop { value, .. } => value.contains_object_rest(),
            }),
            Self::Array { items, rest, .. } => {
                items.iter().flatten().any(|item| item.binding.contains_object_rest())
                    || rest.as_deref().is_some_and(Self::contains_object_rest)
            }
            Self::Ident(_) | Self::Missing => false,
        }
    }
}

/// A function formal parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub binding: Binding,
    pub initializer: Option<Box<Expr>>,
    pub is_rest: bool,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(r: u32) -> Binding {
        Binding::Ident(SymbolRef::new(0, r))
    }

    #[test]
    fn nested_object_rest_is_detected_through_array_items() {
        let pattern = Binding::Array {
            items: vec![Some(BindingElement {
                binding: Binding::Object {
                    props: vec![ObjectBindingProp::Rest(Box::new(ident(1)))],
                    span: Span::default(),
                },
                default: None,
            })],
            rest: None,
            span: Span::default(),
        };
        assert!(pattern.contains_object_rest());
    }

    #[test]
    fn plain_identifier_binding_has_no_rest() {
        assert!(!ident(0).contains_object_rest());
    }
}
