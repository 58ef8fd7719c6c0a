//! Statement nodes ("spec.md" §3 Statement).

use tsz_common::span::Span;

use crate::binding::Binding;
use crate::expr::{ClassExpr, Expr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

/// One `binding = initializer` pair in a `var`/`let`/`const` declaration list.
#[derive(Clone, Debug, PartialEq)]
pub struct Decl {
    pub binding: Binding,
    pub initializer: Option<Box<Expr>>,
    pub span: Span,
}

/// The left-hand side of a `for-in`/`for-of` head: either a fresh
/// declaration or an assignment target binding.
#[derive(Clone, Debug, PartialEq)]
pub enum ForHead {
    Decl { kind: DeclKind, binding: Binding },
    Assign(Binding),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub param: Option<Binding>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Block(Vec<Stmt>, Span),
    Expr(Box<Expr>, Span),
    Local {
        kind: DeclKind,
        decls: Vec<Decl>,
        is_export: bool,
        span: Span,
    },
    Return(Option<Box<Expr>>, Span),
    If {
        test: Box<Expr>,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
        span: Span,
    },
    For {
        init: Option<Box<Stmt>>,
        test: Option<Box<Expr>>,
        update: Option<Box<Expr>>,
        body: Box<Stmt>,
        span: Span,
    },
    ForInOf {
        is_of: bool,
        is_await: bool,
        left: ForHead,
        right: Box<Expr>,
        body: Box<Stmt>,
        span: Span,
    },
    Try {
        block: Vec<Stmt>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Stmt>>,
        span: Span,
    },
    Throw(Box<Expr>, Span),
    ClassDecl(Box<ClassExpr>, Span),
    ExportDefault(Box<Expr>, Span),
}

impl Stmt {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Block(_, s)
            | Self::Expr(_, s)
            | Self::Local { span: s, .. }
            | Self::Return(_, s)
            | Self::If { span: s, .. }
            | Self::For { span: s, .. }
            | Self::ForInOf { span: s, .. }
            | Self::Try { span: s, .. }
            | Self::Throw(_, s)
            | Self::ClassDecl(_, s)
            | Self::ExportDefault(_, s) => *s,
        }
    }
}
