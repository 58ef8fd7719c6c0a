//! Private class member lowering (`spec.md` §4.6).
//!
//! Four cases depending on the accessed symbol's kind: a private field is
//! backed by a per-class `WeakMap`, a private method by a per-class
//! `WeakSet` plus a module-scope function, a getter/setter pair by a shared
//! tag argument to `__privateGet`/`__privateSet`. Static variants use the
//! class itself (rather than an instance) as the map/set key.

use tsz_ast::expr::OptionalChain;
use tsz_ast::symbol::SymbolKind;
use tsz_ast::{Expr, SymbolRef};
use tsz_common::span::Span;

use crate::{runtime_calls, LoweringContext};

/// `lowerPrivateGet(target, loc, private) -> expr` (`spec.md` §6).
pub fn lower_private_get(ctx: &mut LoweringContext, target: Expr, private: SymbolRef, span: Span) -> Expr {
    let kind = ctx.symbols.get(private).map(|s| s.kind);
    let tag = Expr::Ident(private, span);
    match kind {
        Some(SymbolKind::PrivateMethod | SymbolKind::PrivateStaticMethod) => {
            let implementation = ctx.symbols.fn_ref(private).unwrap_or(private);
            let method_fn = Expr::Ident(implementation, span);
            runtime_calls::private_method(ctx, target, tag, method_fn, span)
        }
        Some(SymbolKind::PrivateGet | SymbolKind::PrivateStaticGet | SymbolKind::PrivateGetSetPair | SymbolKind::PrivateStaticGetSetPair) => {
            let getter_tag = ctx.symbols.getter_tag(private).map(|t| Expr::Ident(t, span));
            runtime_calls::private_get(ctx, target, tag, getter_tag, span)
        }
        _ => runtime_calls::private_get(ctx, target, tag, None, span),
    }
}

/// `lowerPrivateSet(target, loc, private, value) -> expr` (`spec.md` §6).
pub fn lower_private_set(ctx: &mut LoweringContext, target: Expr, private: SymbolRef, value: Expr, span: Span) -> Expr {
    let kind = ctx.symbols.get(private).map(|s| s.kind);
    let tag = Expr::Ident(private, span);
    let setter_fn = match kind {
        Some(SymbolKind::PrivateSet | SymbolKind::PrivateStaticSet | SymbolKind::PrivateGetSetPair | SymbolKind::PrivateStaticGetSetPair) => {
            ctx.symbols.setter_tag(private).map(|t| Expr::Ident(t, span))
        }
        _ => None,
    };
    runtime_calls::private_set(ctx, target, tag, value, setter_fn, span)
}

/// `lowerPrivateSetBinOp` — lowers `x.#f OP= value` by re-reading through
/// `lower_private_get`, combining with `combine`, then writing back through
/// `lower_private_set`, capturing `target` exactly once via the caller's
/// [`crate::temp::Capture`] (§4.5, §4.7).
pub fn lower_private_set_bin_op(
    ctx: &mut LoweringContext,
    target: Expr,
    private: SymbolRef,
    span: Span,
    combine: impl FnOnce(&mut LoweringContext, Expr) -> Expr,
) -> Expr {
    let mut capture = crate::temp::Capture::new(ctx, span, 2, target);
    let read_target = capture.produce();
    let write_target = capture.produce();
    let current = lower_private_get(ctx, read_target, private, span);
    let combined = combine(ctx, current);
    capture.wrap(lower_private_set(ctx, write_target, private, combined, span))
}

/// `lowerPrivateSetUnOp` — lowers `x.#f++`/`--x.#f` style updates. `delta`
/// is `+1` or `-1`; `is_prefix` selects whether the pre- or post-update
/// value is the expression's result.
pub fn lower_private_set_un_op(
    ctx: &mut LoweringContext,
    target: Expr,
    private: SymbolRef,
    span: Span,
    delta: f64,
) -> Expr {
    use tsz_ast::expr::BinaryOp;

    let mut capture = crate::temp::Capture::new(ctx, span, 2, target);
    let read_target = capture.produce();
    let write_target = capture.produce();
    let current = lower_private_get(ctx, read_target, private, span);
    let updated = Expr::Binary {
        op: BinaryOp::Add,
        lhs: Box::new(current),
        rhs: Box::new(Expr::Number(delta, span)),
        span,
    };
    capture.wrap(lower_private_set(ctx, write_target, private, updated, span))
}

/// Is `expr` a private-name property access (`x.#f`, modeled as an `Index`
/// whose index is a `PrivateIdent`)?
#[must_use]
pub fn is_private_access(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Index { index, .. } if matches!(index.as_ref(), Expr::PrivateIdent(..))
    )
}

/// Extract `(target, private_ref)` from a private-name access, if `expr` is
/// one.
#[must_use]
pub fn as_private_access(expr: Expr) -> Result<(Expr, SymbolRef, Span), Expr> {
    match expr {
        Expr::Index { target, index, span, optional: OptionalChain::None } => match *index {
            Expr::PrivateIdent(r, _) => Ok((*target, r, span)),
            other => Err(Expr::Index { target, index: Box::new(other), optional: OptionalChain::None, span }),
        },
        other => Err(other),
    }
}

/// Install the per-class `WeakMap`/`WeakSet` setup statements for a private
/// field/method (`spec.md` §4.6). Returns the statement to splice into the
/// class-emit appendix (§4.11 "private-member setup").
#[must_use]
pub fn weak_map_instantiation(ctx: &mut LoweringContext, field_map: SymbolRef, span: Span) -> Expr {
    let weak_map = ctx.weak_map_ref();
    let new_expr = Expr::New { target: Box::new(Expr::Ident(weak_map, span)), args: vec![], span };
    Expr::Binary {
        op: tsz_ast::expr::BinaryOp::Assign,
        lhs: Box::new(Expr::Ident(field_map, span)),
        rhs: Box::new(new_expr),
        span,
    }
}
