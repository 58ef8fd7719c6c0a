//! Optional-chain lowering (`spec.md` §4.3): `a?.b.c?.()` and friends
//! rewritten to plain property/index/call expressions guarded by an
//! explicit nullish check.
//!
//! The protocol, in the order applied below: flatten the chain from the
//! outside in until a segment tagged `Start` is consumed; eliminate the
//! whole chain at compile time if its head is a `null`/`undefined`
//! literal; bail out untouched if the target already supports optional
//! chains and no private name needs lowering; capture the receiver of a
//! leading call-off-a-property-access so method `this` binding survives
//! the rewrite; capture the (possibly side-effecting) head expression;
//! rebuild each segment inside-out onto the captured head, substituting
//! `__privateGet`/`__privateMethod` helper calls for private-name
//! segments; and wrap the result in a nullish-guarded conditional.

use tsz_ast::expr::{ArrayElement, BinaryOp, OptionalChain, UnaryOp};
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::temp::Capture;
use crate::{private_members, Feature, LoweringContext};

enum Segment {
    Dot { name: String, name_span: Span },
    Index { index: Box<Expr> },
    Call { args: Vec<ArrayElement> },
}

impl Segment {
    fn is_private_index(&self) -> bool {
        matches!(self, Self::Index { index } if matches!(index.as_ref(), Expr::PrivateIdent(..)))
    }
}

/// Collect every chain segment from `expr` down to (and including) the
/// first segment tagged `Start`, outside-in. Returns `None` if `expr` is
/// not itself part of an optional chain (no `Start` segment was found).
fn flatten(expr: Expr) -> Option<(Expr, Vec<Segment>)> {
    let mut segments_outside_in = Vec::new();
    let mut current = expr;
    loop {
        match current {
            Expr::Dot { target, name, name_span, optional, .. } if optional.is_chain() => {
                let is_start = optional == OptionalChain::Start;
                segments_outside_in.push(Segment::Dot { name, name_span });
                current = *target;
                if is_start {
                    break;
                }
            }
            Expr::Index { target, index, optional, .. } if optional.is_chain() => {
                let is_start = optional == OptionalChain::Start;
                segments_outside_in.push(Segment::Index { index });
                current = *target;
                if is_start {
                    break;
                }
            }
            Expr::Call { target, args, optional, .. } if optional.is_chain() => {
                let is_start = optional == OptionalChain::Start;
                segments_outside_in.push(Segment::Call { args });
                current = *target;
                if is_start {
                    break;
                }
            }
            other => {
                current = other;
                return if segments_outside_in.is_empty() {
                    None
                } else {
                    // A non-chain-tagged node was reached before any `Start`
                    // segment; the chain this call was asked to lower does
                    // not actually terminate here, so nothing to do.
                    None
                };
            }
        }
    }
    segments_outside_in.reverse(); // now head-to-outer ("inside out") order
    Some((current, segments_outside_in))
}

fn chain_contains_private_name(segments: &[Segment]) -> bool {
    segments.iter().any(Segment::is_private_index)
}

/// Lower one optional-chain expression. `expr` must be the outermost node
/// of the chain (possibly wrapped in `delete`).
#[must_use]
pub fn lower(ctx: &mut LoweringContext, expr: Expr) -> Expr {
    let (is_delete, inner) = match expr {
        Expr::Unary { op: UnaryOp::Delete, operand, .. } => (true, *operand),
        other => (false, other),
    };

    let starts_with_call = matches!(inner, Expr::Call { optional, .. } if optional.is_chain());
    let span = inner.span();

    let Some((head, segments)) = flatten(inner.clone()) else {
        return rewrap_delete(is_delete, inner, span);
    };

    let contains_private = chain_contains_private_name(&segments);
    if !ctx.gate.has(Feature::OPTIONAL_CHAIN) && !contains_private {
        return rewrap_delete(is_delete, inner, span);
    }

    // Dead-code elimination: the head is known nullish at compile time.
    if head.is_nullish_literal() {
        return if is_delete { Expr::bool_at(true, span) } else { Expr::undefined_at(span) };
    }

    // Receiver capture: a leading call off a property access needs its
    // `this` binding preserved separately from the chain head.
    let mut receiver_this: Option<Expr> = None;
    let head = if starts_with_call {
        match head {
            Expr::Dot { target, name, name_span, span: dot_span, .. } => {
                let (this_expr, new_target) = if matches!(*target, Expr::Super(_)) {
                    (Expr::This(target.span()), *target)
                } else {
                    let mut cap = Capture::new(ctx, target.span(), 2, *target);
                    let assigned = cap.produce();
                    let plain = cap.produce();
                    (plain, assigned)
                };
                receiver_this = Some(this_expr);
                Expr::Dot { target: Box::new(new_target), name, name_span, optional: OptionalChain::None, span: dot_span }
            }
            Expr::Index { target, index, span: idx_span, .. } => {
                let (this_expr, new_target) = if matches!(*target, Expr::Super(_)) {
                    (Expr::This(target.span()), *target)
                } else {
                    let mut cap = Capture::new(ctx, target.span(), 2, *target);
                    let assigned = cap.produce();
                    let plain = cap.produce();
                    (plain, assigned)
                };
                receiver_this = Some(this_expr);
                Expr::Index { target: Box::new(new_target), index, optional: OptionalChain::None, span: idx_span }
            }
            other => other,
        }
    } else {
        head
    };

    // Head capture. First `produce()` feeds the null-check test (and so
    // must embed the assignment, if any); the second feeds the rebuilt
    // tail.
    let mut head_capture = Capture::new(ctx, span, 2, head);
    let test_value = head_capture.produce();
    let tail_head = head_capture.produce();

    // Rebuild, inside out, substituting private-name reads as we go.
    let mut built = tail_head;
    for (i, seg) in segments.into_iter().enumerate() {
        built = match seg {
            Segment::Dot { name, name_span } => {
                Expr::Dot { target: Box::new(built), name, name_span, optional: OptionalChain::None, span }
            }
            Segment::Index { index } => match *index {
                Expr::PrivateIdent(private_ref, _) => private_members::lower_private_get(ctx, built, private_ref, span),
                other => Expr::Index { target: Box::new(built), index: Box::new(other), optional: OptionalChain::None, span },
            },
            Segment::Call { args } => {
                if i == 0 {
                    if let Some(this_arg) = receiver_this.take() {
                        let call_member =
                            Expr::Dot { target: Box::new(built), name: "call".to_string(), name_span: span, optional: OptionalChain::None, span };
                        let mut call_args = Vec::with_capacity(args.len() + 1);
                        call_args.push(ArrayElement { expr: this_arg, is_spread: false });
                        call_args.extend(args);
                        Expr::Call {
                            target: Box::new(call_member),
                            args: call_args,
                            optional: OptionalChain::None,
                            is_direct_eval: false,
                            can_be_unwrapped_if_unused: false,
                            span,
                        }
                    } else {
                        Expr::Call { target: Box::new(built), args, optional: OptionalChain::None, is_direct_eval: false, can_be_unwrapped_if_unused: false, span }
                    }
                } else {
                    Expr::Call { target: Box::new(built), args, optional: OptionalChain::None, is_direct_eval: false, can_be_unwrapped_if_unused: false, span }
                }
            }
        };
    }

    let test = null_check(ctx, test_value, span);
    let default_value = if is_delete { Expr::bool_at(true, span) } else { Expr::undefined_at(span) };

    head_capture.wrap(Expr::Conditional { test: Box::new(test), yes: Box::new(default_value), no: Box::new(built), span })
}

fn rewrap_delete(is_delete: bool, inner: Expr, span: Span) -> Expr {
    if is_delete {
        Expr::Unary { op: UnaryOp::Delete, operand: Box::new(inner), span }
    } else {
        inner
    }
}

fn null_check(ctx: &LoweringContext, value: Expr, span: Span) -> Expr {
    if ctx.strict_mode {
        let null_cmp = Expr::Binary { op: BinaryOp::StrictEqual, lhs: Box::new(value.clone()), rhs: Box::new(Expr::Null(span)), span };
        let undef_cmp = Expr::Binary { op: BinaryOp::StrictEqual, lhs: Box::new(value), rhs: Box::new(Expr::Undefined(span)), span };
        Expr::Binary { op: BinaryOp::LogicalOr, lhs: Box::new(null_cmp), rhs: Box::new(undef_cmp), span }
    } else {
        Expr::Binary { op: BinaryOp::Equal, lhs: Box::new(value), rhs: Box::new(Expr::Null(span)), span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsz_ast::FeatureGate;

    fn ctx() -> LoweringContext {
        LoweringContext::new(FeatureGate::new(Feature::OPTIONAL_CHAIN))
    }

    fn ident(ctx: &mut LoweringContext, name: &str) -> Expr {
        let r = ctx.symbols.new_symbol(ctx.module_scope(), tsz_ast::SymbolKind::Other, name);
        Expr::Ident(r, Span::default())
    }

    fn dot(target: Expr, name: &str, optional: OptionalChain) -> Expr {
        Expr::Dot { target: Box::new(target), name: name.to_string(), name_span: Span::default(), optional, span: Span::default() }
    }

    #[test]
    fn simple_member_access_becomes_a_loose_null_guard() {
        let mut c = ctx();
        let a = ident(&mut c, "a");
        let chain = dot(a, "b", OptionalChain::Start);
        let lowered = lower(&mut c, chain);
        match lowered {
            Expr::Conditional { test, no, .. } => {
                assert!(matches!(*test, Expr::Binary { op: BinaryOp::Equal, .. }));
                assert!(matches!(*no, Expr::Dot { ref name, .. } if name == "b"));
            }
            other => panic!("expected a conditional, got {other:?}"),
        }
    }

    #[test]
    fn bails_out_untouched_when_the_gate_supports_optional_chains() {
        let mut c = LoweringContext::new(FeatureGate::all_supported());
        let a = ident(&mut c, "a");
        let chain = dot(a, "b", OptionalChain::Start);
        let lowered = lower(&mut c, chain.clone());
        assert_eq!(lowered, chain);
    }

    #[test]
    fn dead_head_short_circuits_to_undefined_at_compile_time() {
        let mut c = ctx();
        let chain = dot(Expr::Undefined(Span::default()), "b", OptionalChain::Start);
        let lowered = lower(&mut c, chain);
        assert!(matches!(lowered, Expr::Undefined(_)));
    }

    #[test]
    fn chained_accesses_rebuild_inside_out() {
        let mut c = ctx();
        let a = ident(&mut c, "a");
        let first = dot(a, "b", OptionalChain::Start);
        let second = dot(first, "c", OptionalChain::Continue);
        let lowered = lower(&mut c, second);
        match lowered {
            Expr::Conditional { no, .. } => match *no {
                Expr::Dot { name, target, .. } => {
                    assert_eq!(name, "c");
                    assert!(matches!(*target, Expr::Dot { .. }));
                }
                other => panic!("expected outer dot, got {other:?}"),
            },
            other => panic!("expected a conditional, got {other:?}"),
        }
    }

    #[test]
    fn delete_of_an_optional_chain_defaults_to_true() {
        let mut c = ctx();
        let chain = dot(Expr::Undefined(Span::default()), "b", OptionalChain::Start);
        let lowered = lower(&mut c, Expr::Unary { op: UnaryOp::Delete, operand: Box::new(chain), span: Span::default() });
        assert!(matches!(lowered, Expr::Bool(true, _)));
    }

    #[test]
    fn call_off_a_non_optional_property_access_captures_a_receiver() {
        let mut c = ctx();
        let a = ident(&mut c, "a");
        let member = dot(a, "b", OptionalChain::None);
        let chain = Expr::Call {
            target: Box::new(member),
            args: vec![],
            optional: OptionalChain::Start,
            is_direct_eval: false,
            can_be_unwrapped_if_unused: false,
            span: Span::default(),
        };
        let lowered = lower(&mut c, chain);
        match lowered {
            Expr::Conditional { no, .. } => match *no {
                Expr::Call { target, args, .. } => {
                    assert!(matches!(*target, Expr::Dot { ref name, .. } if name == "call"));
                    assert_eq!(args.len(), 1, "thisArg should be the sole forwarded argument");
                }
                other => panic!("expected the receiver-preserving call, got {other:?}"),
            },
            other => panic!("expected a conditional, got {other:?}"),
        }
    }
}
