//! The shared "evaluate the left-hand side exactly once" helper behind
//! `??=`, `&&=`, `||=`, and `**=` (`spec.md` §4.7).
//!
//! A compound-assignment target is either a bare identifier (cheap to read
//! twice) or a member expression (`obj.prop`/`obj[key]`), whose object (and,
//! for computed access, key) must be evaluated only once even though the
//! lowered form both reads and writes through it. `get` and the write target
//! built by [`SplitTarget::set`] both reference the *same* captured
//! temporary bare (`T.x`, never `(T = obj).x`): the capture's own assignment
//! is surfaced separately as a prelude and must run before either is read,
//! via [`SplitTarget::wrap`] — "capture `t` once ... wrap the result in the
//! capture's assignment" (`spec.md` §4.7).

use tsz_ast::expr::OptionalChain;
use tsz_ast::expr::BinaryOp;
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::temp::Capture;
use crate::LoweringContext;

/// A target split into a read expression and a function that builds the
/// matching write expression, sharing any captured object/key. If the
/// object (or, for computed access, key) needed a temporary, `wrap` must be
/// called on the final result so that temporary is assigned before `get` or
/// the write target is evaluated.
pub struct SplitTarget {
    pub get: Expr,
    write_target: Expr,
    prelude: Vec<Expr>,
}

impl SplitTarget {
    /// Build `write_target = value`.
    #[must_use]
    pub fn set(&self, value: Expr, span: Span) -> Expr {
        Expr::Binary { op: BinaryOp::Assign, lhs: Box::new(self.write_target.clone()), rhs: Box::new(value), span }
    }

    /// Wrap `expr` so this target's captured object/key (if any) are
    /// assigned before `expr` runs: `(T = obj, expr)`. Identity when no
    /// temporary was allocated.
    #[must_use]
    pub fn wrap(&self, expr: Expr, span: Span) -> Expr {
        self.prelude.iter().rev().fold(expr, |acc, assign| Expr::Binary {
            op: BinaryOp::Comma,
            lhs: Box::new(assign.clone()),
            rhs: Box::new(acc),
            span,
        })
    }
}

/// Split an assignment target so its object/key subexpressions are
/// evaluated exactly once across one read and one write.
#[must_use]
pub fn split(ctx: &mut LoweringContext, target: Expr, span: Span) -> SplitTarget {
    match target {
        Expr::Ident(r, s) => SplitTarget { get: Expr::Ident(r, s), write_target: Expr::Ident(r, s), prelude: Vec::new() },
        Expr::Dot { target, name, name_span, span: dot_span, .. } => {
            let mut cap = Capture::new(ctx, target.span(), 3, *target);
            let mut prelude = Vec::new();
            if cap.allocated_temp() {
                prelude.push(cap.produce());
            }
            let get_target = cap.produce();
            let set_target = cap.produce();
            SplitTarget {
                get: Expr::Dot { target: Box::new(get_target), name: name.clone(), name_span, optional: OptionalChain::None, span: dot_span },
                write_target: Expr::Dot { target: Box::new(set_target), name, name_span, optional: OptionalChain::None, span: dot_span },
                prelude,
            }
        }
        Expr::Index { target, index, span: idx_span, .. } => {
            let mut obj_cap = Capture::new(ctx, target.span(), 3, *target);
            let mut idx_cap = Capture::new(ctx, index.span(), 3, *index);
            let mut prelude = Vec::new();
            if obj_cap.allocated_temp() {
                prelude.push(obj_cap.produce());
            }
            if idx_cap.allocated_temp() {
                prelude.push(idx_cap.produce());
            }
            let get_obj = obj_cap.produce();
            let get_idx = idx_cap.produce();
            let set_obj = obj_cap.produce();
            let set_idx = idx_cap.produce();
            SplitTarget {
                get: Expr::Index { target: Box::new(get_obj), index: Box::new(get_idx), optional: OptionalChain::None, span: idx_span },
                write_target: Expr::Index { target: Box::new(set_obj), index: Box::new(set_idx), optional: OptionalChain::None, span: idx_span },
                prelude,
            }
        }
        other => {
            let clone = other.clone();
            SplitTarget { get: clone, write_target: other, prelude: Vec::new() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsz_ast::FeatureGate;

    fn ctx() -> LoweringContext {
        LoweringContext::new(FeatureGate::all_supported())
    }

    #[test]
    fn bare_identifier_target_needs_no_capture() {
        let mut c = ctx();
        let r = c.symbols.new_symbol(c.module_scope(), tsz_ast::SymbolKind::Other, "a");
        let target = split(&mut c, Expr::Ident(r, Span::default()), Span::default());
        assert!(matches!(target.get, Expr::Ident(..)));
    }

    #[test]
    fn member_target_shares_one_capture_of_the_object() {
        let mut c = ctx();
        let call = Expr::Call {
            target: Box::new(Expr::Ident(c.symbols.new_symbol(c.module_scope(), tsz_ast::SymbolKind::Other, "f"), Span::default())),
            args: vec![],
            optional: OptionalChain::None,
            is_direct_eval: false,
            can_be_unwrapped_if_unused: false,
            span: Span::default(),
        };
        let dot = Expr::Dot { target: Box::new(call), name: "x".to_string(), name_span: Span::default(), optional: OptionalChain::None, span: Span::default() };
        let target = split(&mut c, dot, Span::default());
        let set_expr = target.set(Expr::Number(1.0, Span::default()), Span::default());

        // Both the read and the write dereference the same bare captured
        // temporary; neither embeds the capture's own assignment.
        let Expr::Dot { target: get_target, .. } = &target.get else { panic!("expected a Dot read") };
        assert!(matches!(get_target.as_ref(), Expr::Ident(..)), "get should read the bare temporary, not embed its assignment");
        let Expr::Binary { lhs, .. } = &set_expr else { panic!("expected an assignment") };
        let Expr::Dot { target: set_target, .. } = lhs.as_ref() else { panic!("expected a Dot write target") };
        assert_eq!(**get_target, **set_target, "both reads should reference the same captured temporary");

        // The capture's own assignment is only surfaced via `wrap`, as a
        // leading comma, so it runs before either of the above.
        let wrapped = target.wrap(set_expr, Span::default());
        match wrapped {
            Expr::Binary { op: BinaryOp::Comma, lhs, rhs, .. } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Assign, .. }), "capture's assignment must run first");
                assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Assign, .. }), "wrapped expression follows");
            }
            other => panic!("expected a leading comma wrapping the capture's assignment, got {other:?}"),
        }
    }
}
