//! Runtime-call builder — emits calls to named helpers the runtime library
//! is expected to supply (`spec.md` §6 "Runtime-helper ABI").

use tsz_ast::expr::{ArrayElement, OptionalChain};
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::LoweringContext;

fn positional_args(args: Vec<Expr>) -> Vec<ArrayElement> {
    args.into_iter().map(|expr| ArrayElement { expr, is_spread: false }).collect()
}

fn helper_call(ctx: &mut LoweringContext, name: &'static str, args: Vec<Expr>, span: Span) -> Expr {
    let r = ctx.helper_ref(name);
    Expr::Call {
        target: Box::new(Expr::Ident(r, span)),
        args: positional_args(args),
        optional: OptionalChain::None,
        is_direct_eval: false,
        can_be_unwrapped_if_unused: false,
        span,
    }
}

/// `__pow(a, b)` — `a ** b` (`spec.md` §4.5).
pub fn pow(ctx: &mut LoweringContext, a: Expr, b: Expr, span: Span) -> Expr {
    helper_call(ctx, "__pow", vec![a, b], span)
}

/// `__assign(dst, src)` — `Object.assign` (`spec.md` §4.8).
pub fn assign(ctx: &mut LoweringContext, dst: Expr, src: Expr, span: Span) -> Expr {
    helper_call(ctx, "__assign", vec![dst, src], span)
}

/// `__rest(src, keys)` — clone `src` omitting `keys` (`spec.md` §4.9).
pub fn rest(ctx: &mut LoweringContext, src: Expr, keys: Expr, span: Span) -> Expr {
    helper_call(ctx, "__rest", vec![src, keys], span)
}

/// `__restKey(k)` — normalize a rest key to a string (`spec.md` §4.9).
pub fn rest_key(ctx: &mut LoweringContext, key: Expr, span: Span) -> Expr {
    helper_call(ctx, "__restKey", vec![key], span)
}

/// `__async(this, args, gen)` — run a generator as an async function
/// (`spec.md` §4.10).
pub fn async_call(ctx: &mut LoweringContext, this_value: Expr, args: Expr, generator: Expr, span: Span) -> Expr {
    helper_call(ctx, "__async", vec![this_value, args, generator], span)
}

/// `__privateGet(obj, tag [, fn])` — field/getter access (`spec.md` §4.6).
pub fn private_get(ctx: &mut LoweringContext, obj: Expr, tag: Expr, accessor_fn: Option<Expr>, span: Span) -> Expr {
    let mut args = vec![obj, tag];
    if let Some(f) = accessor_fn {
        args.push(f);
    }
    helper_call(ctx, "__privateGet", args, span)
}

/// `__privateSet(obj, tag, v [, fn])` — field/setter write (`spec.md` §4.6).
pub fn private_set(
    ctx: &mut LoweringContext,
    obj: Expr,
    tag: Expr,
    value: Expr,
    accessor_fn: Option<Expr>,
    span: Span,
) -> Expr {
    let mut args = vec![obj, tag, value];
    if let Some(f) = accessor_fn {
        args.push(f);
    }
    helper_call(ctx, "__privateSet", args, span)
}

/// `__privateMethod(obj, tag, fn)` — private method read (`spec.md` §4.6).
pub fn private_method(ctx: &mut LoweringContext, obj: Expr, tag: Expr, method_fn: Expr, span: Span) -> Expr {
    helper_call(ctx, "__privateMethod", vec![obj, tag, method_fn], span)
}

/// `__publicField(obj, key, v)` — strict public field init
/// (`spec.md` §4.11, §6).
pub fn public_field(ctx: &mut LoweringContext, obj: Expr, key: Expr, value: Expr, span: Span) -> Expr {
    helper_call(ctx, "__publicField", vec![obj, key, value], span)
}

/// `__decorate(decs, target, key, kind)` — TS decorator (`spec.md` §4.11).
pub fn decorate(ctx: &mut LoweringContext, decorators: Expr, target: Expr, key: Expr, kind: Expr, span: Span) -> Expr {
    helper_call(ctx, "__decorate", vec![decorators, target, key, kind], span)
}

/// `__param(i, dec)` — TS parameter decorator (`spec.md` §4.11).
pub fn param_decorator(ctx: &mut LoweringContext, index: Expr, decorator: Expr, span: Span) -> Expr {
    helper_call(ctx, "__param", vec![index, decorator], span)
}
