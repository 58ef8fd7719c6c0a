//! `captureValueWithPossibleSideEffects` (`spec.md` §4.2, §9 "Thunks for
//! deferred capture").
//!
//! Modeled as the small stateful value the Design Notes suggest instead of a
//! literal closure pair: `Capture::produce` alternates first-call vs.
//! subsequent-call behavior, `Capture::wrap` is the identity in both
//! branches (the assignment is already embedded by the first `produce`) but
//! is kept as a distinct step so callers following the §4.3/§4.9 protocols
//! read the same whether or not a temporary was actually allocated.

use tsz_ast::expr::BinaryOp;
use tsz_ast::symbol::{DeclMode, SymbolRef};
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::LoweringContext;

enum CaptureMode {
    /// `expr` is an identifier, literal, or `this` (or is only ever used
    /// once) — no temporary is needed.
    Trivial(Expr),
    /// `expr` has possible side effects and is used more than once: capture
    /// it into `temp_ref` on first use.
    Temp { pending: Option<Expr>, temp_ref: SymbolRef, span: Span },
}

pub struct Capture {
    mode: CaptureMode,
}

impl Capture {
    /// `targetUses` is 1, 2, or 3 per `spec.md` §4.2; when it is 1 the
    /// expression is only ever read once, so inlining it directly is safe
    /// even if it has side effects.
    #[must_use]
    pub fn new(ctx: &mut LoweringContext, span: Span, target_uses: u8, expr: Expr) -> Self {
        if expr.is_side_effect_free() || target_uses <= 1 {
            return Self { mode: CaptureMode::Trivial(expr) };
        }
        let temp_ref = ctx.symbols.generate_temp_ref(ctx.current_scope(), DeclMode::NeedsDeclare, None);
        Self { mode: CaptureMode::Temp { pending: Some(expr), temp_ref, span } }
    }

    /// First call returns `(T = E)`; every later call returns `T`. For a
    /// trivial capture, every call returns a fresh clone of the original
    /// expression.
    pub fn produce(&mut self) -> Expr {
        match &mut self.mode {
            CaptureMode::Trivial(expr) => expr.clone(),
            CaptureMode::Temp { pending, temp_ref, span } => {
                let temp_ref = *temp_ref;
                let span = *span;
                match pending.take() {
                    Some(original) => Expr::Binary {
                        op: BinaryOp::Assign,
                        lhs: Box::new(Expr::Ident(temp_ref, span)),
                        rhs: Box::new(original),
                        span,
                    },
                    None => Expr::Ident(temp_ref, span),
                }
            }
        }
    }

    /// Returns `x` unchanged — the capture's assignment, if any, is already
    /// embedded by the first `produce()` call.
    #[must_use]
    pub fn wrap(self, inner: Expr) -> Expr {
        inner
    }

    /// `true` if this capture allocated a temporary (used by callers that
    /// need to know whether a declaration must be hoisted).
    #[must_use]
    pub const fn allocated_temp(&self) -> bool {
        matches!(self.mode, CaptureMode::Temp { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsz_ast::FeatureGate;

    fn ident(ctx: &mut LoweringContext, name: &str) -> Expr {
        let r = ctx.symbols.new_symbol(ctx.module_scope(), tsz_ast::SymbolKind::Other, name);
        Expr::Ident(r, Span::default())
    }

    #[test]
    fn identifier_capture_never_allocates_a_temp() {
        let mut ctx = LoweringContext::new(FeatureGate::all_supported());
        let a = ident(&mut ctx, "a");
        let capture = Capture::new(&mut ctx, Span::default(), 3, a);
        assert!(!capture.allocated_temp());
    }

    #[test]
    fn side_effecting_expr_used_twice_allocates_a_temp() {
        let mut ctx = LoweringContext::new(FeatureGate::all_supported());
        let call = Expr::Call {
            target: Box::new(ident(&mut ctx, "f")),
            args: vec![],
            optional: tsz_ast::expr::OptionalChain::None,
            is_direct_eval: false,
            can_be_unwrapped_if_unused: false,
            span: Span::default(),
        };
        let mut capture = Capture::new(&mut ctx, Span::default(), 2, call);
        assert!(capture.allocated_temp());
        let first = capture.produce();
        let second = capture.produce();
        assert!(matches!(first, Expr::Binary { op: BinaryOp::Assign, .. }));
        assert!(matches!(second, Expr::Ident(..)));
    }

    #[test]
    fn side_effecting_expr_used_once_is_inlined_without_a_temp() {
        let mut ctx = LoweringContext::new(FeatureGate::all_supported());
        let call = Expr::Call {
            target: Box::new(ident(&mut ctx, "f")),
            args: vec![],
            optional: tsz_ast::expr::OptionalChain::None,
            is_direct_eval: false,
            can_be_unwrapped_if_unused: false,
            span: Span::default(),
        };
        let capture = Capture::new(&mut ctx, Span::default(), 1, call);
        assert!(!capture.allocated_temp());
    }
}
