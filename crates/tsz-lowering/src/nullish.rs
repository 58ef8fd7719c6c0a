//! Nullish coalescing: `a ?? b` and `a ??= b` (`spec.md` §4.4).

use tsz_ast::expr::BinaryOp;
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::assignment_operator;
use crate::temp::Capture;
use crate::LoweringContext;

fn not_nullish_test(ctx: &LoweringContext, value: Expr, span: Span) -> Expr {
    if ctx.strict_mode {
        let not_null = Expr::Binary { op: BinaryOp::StrictNotEqual, lhs: Box::new(value.clone()), rhs: Box::new(Expr::Null(span)), span };
        let not_undef = Expr::Binary { op: BinaryOp::StrictNotEqual, lhs: Box::new(value), rhs: Box::new(Expr::Undefined(span)), span };
        Expr::Binary { op: BinaryOp::LogicalAnd, lhs: Box::new(not_null), rhs: Box::new(not_undef), span }
    } else {
        Expr::Binary { op: BinaryOp::NotEqual, lhs: Box::new(value), rhs: Box::new(Expr::Null(span)), span }
    }
}

/// `a ?? b` → `a != null ? a : b` (or the strict-mode `!== null && !== void 0`
/// variant), capturing `a` if it may have side effects.
#[must_use]
pub fn lower_coalescing(ctx: &mut LoweringContext, lhs: Expr, rhs: Expr, span: Span) -> Expr {
    let mut cap = Capture::new(ctx, span, 2, lhs);
    let test_value = cap.produce();
    let result_value = cap.produce();
    let test = not_nullish_test(ctx, test_value, span);
    cap.wrap(Expr::Conditional { test: Box::new(test), yes: Box::new(result_value), no: Box::new(rhs), span })
}

/// `a ??= b` → `(T = obj,) GET ?? (SET = b)`, evaluating any object/key in
/// `target` exactly once and wrapping the result in that capture's own
/// assignment so it runs before `GET`/`SET` (`spec.md` §4.4, §4.7).
#[must_use]
pub fn lower_coalescing_assign(ctx: &mut LoweringContext, target: Expr, value: Expr, span: Span) -> Expr {
    let split = assignment_operator::split(ctx, target, span);
    let get = split.get.clone();
    let assigned = split.set(value, span);
    let result = lower_coalescing(ctx, get, assigned, span);
    split.wrap(result, span)
}
