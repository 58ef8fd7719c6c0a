//! Logical and exponent assignment operators: `&&=`, `||=`, `**=`
//! (`spec.md` §4.5).
//!
//! The left-hand side's own test/read (`GET`) is never re-evaluated twice by
//! `&&`/`||`/`**` themselves, but when the target is a member expression its
//! object (and, for computed access, key) still need the single capture
//! [`assignment_operator::split`] provides. Every lowered form here is
//! wrapped via [`crate::assignment_operator::SplitTarget::wrap`] so that
//! capture's assignment runs before `GET`/`SET`, matching `spec.md` §4.7.

use tsz_ast::expr::BinaryOp;
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::assignment_operator;
use crate::runtime_calls;
use crate::LoweringContext;

/// `a &&= b` → `(T = obj,) GET && (SET = b)`.
#[must_use]
pub fn lower_logical_and_assign(ctx: &mut LoweringContext, target: Expr, value: Expr, span: Span) -> Expr {
    let split = assignment_operator::split(ctx, target, span);
    let assigned = split.set(value, span);
    let result = Expr::Binary { op: BinaryOp::LogicalAnd, lhs: Box::new(split.get.clone()), rhs: Box::new(assigned), span };
    split.wrap(result, span)
}

/// `a ||= b` → `(T = obj,) GET || (SET = b)`.
#[must_use]
pub fn lower_logical_or_assign(ctx: &mut LoweringContext, target: Expr, value: Expr, span: Span) -> Expr {
    let split = assignment_operator::split(ctx, target, span);
    let assigned = split.set(value, span);
    let result = Expr::Binary { op: BinaryOp::LogicalOr, lhs: Box::new(split.get.clone()), rhs: Box::new(assigned), span };
    split.wrap(result, span)
}

/// `a **= b` → `(T = obj,) SET(__pow(GET, b))`: the capture's own assignment
/// must run before `SET` is written, since `SET` resolves the same `T` the
/// capture produces (`spec.md` §4.7).
#[must_use]
pub fn lower_exponent_assign(ctx: &mut LoweringContext, target: Expr, value: Expr, span: Span) -> Expr {
    let split = assignment_operator::split(ctx, target, span);
    let powered = runtime_calls::pow(ctx, split.get.clone(), value, span);
    let assigned = split.set(powered, span);
    split.wrap(assigned, span)
}

/// `a ** b` (not an assignment) → `__pow(a, b)` (`spec.md` §4.5, §6).
#[must_use]
pub fn lower_exponent(ctx: &mut LoweringContext, a: Expr, b: Expr, span: Span) -> Expr {
    runtime_calls::pow(ctx, a, b, span)
}
