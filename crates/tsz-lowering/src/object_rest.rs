//! Object rest in binding patterns: `{a, ...rest} = source` in
//! declarations, assignments, `for`-`in`/`of`, `catch`, and parameters
//! (`spec.md` §4.9).
//!
//! A single `Decl` whose binding contains an object rest is split into one
//! plain `Decl` per named property (recursing into any nested pattern that
//! itself contains a rest) plus one final `Decl` computing the rest via
//! `__rest`/`__restKey`. The assignment form (`{a, ...r} = o`) is handled
//! separately by [`lower_object_assign`], since an assignment target is an
//! arbitrary pre-existing lvalue rather than a fresh declaration.

use tsz_ast::binding::{Binding, ObjectBindingProp};
use tsz_ast::expr::{ArrayElement, BinaryOp};
use tsz_ast::property::{Property, PropertyKind};
use tsz_ast::stmt::Decl;
use tsz_ast::symbol::DeclMode;
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::temp::Capture;
use crate::{runtime_calls, LoweringContext};

/// Split a `Binding::Object` containing a rest property against an already
/// side-effect-capturable `source` expression, into flat `Decl`s.
#[must_use]
pub fn lower_object_binding(ctx: &mut LoweringContext, props: Vec<ObjectBindingProp>, source: Expr, span: Span) -> Vec<Decl> {
    let target_uses = props.len().clamp(1, 3) as u8;
    let mut cap = Capture::new(ctx, span, target_uses, source);

    let mut decls = Vec::new();
    let mut excluded_keys = Vec::new();
    let mut rest_binding = None;

    for prop in props {
        match prop {
            ObjectBindingProp::Rest(inner) => rest_binding = Some(inner),
            ObjectBindingProp::Prop { key, computed, value, default } => {
                let src = cap.produce();
                let accessed = property_read(src, &key, computed, span);
                let initializer = apply_default(ctx, accessed, default, span);
                decls.extend(bind_value(ctx, value, initializer, span));
                excluded_keys.push(excluded_key(ctx, *key, computed, span));
            }
        }
    }

    if let Some(rest) = rest_binding {
        let src = cap.produce();
        let keys = Expr::Array {
            elements: excluded_keys.into_iter().map(|expr| ArrayElement { expr, is_spread: false }).collect(),
            span,
        };
        let rest_value = runtime_calls::rest(ctx, src, keys, span);
        decls.extend(bind_value(ctx, *rest, rest_value, span));
    }

    decls
}

/// Emit the `Decl`(s) for binding `value` to `source_value`, recursing
/// through [`lower_object_binding`] if `value` itself contains a nested
/// object rest (`spec.md` §4.9 "nested patterns").
fn bind_value(ctx: &mut LoweringContext, value: Binding, source_value: Expr, span: Span) -> Vec<Decl> {
    match value {
        Binding::Object { props, .. } if props.iter().any(is_rest_or_contains_rest) => {
            lower_object_binding(ctx, props, source_value, span)
        }
        other => vec![Decl { binding: other, initializer: Some(Box::new(source_value)), span }],
    }
}

fn is_rest_or_contains_rest(prop: &ObjectBindingProp) -> bool {
    match prop {
        ObjectBindingProp::Rest(_) => true,
        ObjectBindingProp::Prop { value, .. } => value.contains_object_rest(),
    }
}

/// Capture a rest-excluded key for the `__rest` keys array: `__restKey(...)`
/// normalizes a computed key (whose value isn't known until evaluated), but
/// a non-computed key is already the literal name/number it will be at
/// runtime and is emitted bare (`spec.md` §4.9).
fn excluded_key(ctx: &mut LoweringContext, key: Expr, computed: bool, span: Span) -> Expr {
    if computed {
        runtime_calls::rest_key(ctx, key, span)
    } else {
        key
    }
}

fn property_read(target: Expr, key: &Expr, computed: bool, span: Span) -> Expr {
    if computed {
        Expr::Index { target: Box::new(target), index: Box::new(key.clone()), optional: tsz_ast::expr::OptionalChain::None, span }
    } else {
        let name = match key {
            Expr::Str(s, _) => s.clone(),
            _ => String::new(),
        };
        Expr::Dot { target: Box::new(target), name, name_span: span, optional: tsz_ast::expr::OptionalChain::None, span }
    }
}

/// `value === void 0 ? default : value`, capturing `value` once so a
/// getter it reads through is not invoked twice.
fn apply_default(ctx: &mut LoweringContext, value: Expr, default: Option<Box<Expr>>, span: Span) -> Expr {
    let Some(default) = default else { return value };
    let mut cap = Capture::new(ctx, span, 2, value);
    let test_value = cap.produce();
    let else_value = cap.produce();
    let test = Expr::Binary { op: BinaryOp::StrictEqual, lhs: Box::new(test_value), rhs: Box::new(Expr::Undefined(span)), span };
    cap.wrap(Expr::Conditional { test: Box::new(test), yes: default, no: Box::new(else_value), span })
}

/// Lower an object-rest function parameter (`spec.md` §4.9 "function
/// parameters"). The original pattern is replaced by a synthetic
/// identifier parameter; the destructuring becomes the first statements of
/// the function body.
///
/// Open question resolved: default-value expressions in the original
/// pattern keep the function's own scope (evaluated as body prelude
/// statements) rather than being inlined back into the parameter list,
/// trading evaluation-order fidelity for scope fidelity (`spec.md` §9).
#[must_use]
pub fn lower_parameter(ctx: &mut LoweringContext, original_binding: Binding, span: Span) -> (tsz_ast::SymbolRef, Vec<Decl>) {
    let scope = ctx.current_scope();
    let synthetic = ctx.symbols.generate_temp_ref(scope, DeclMode::NoDeclare, Some("param"));
    let decls = match original_binding {
        Binding::Object { props, .. } => lower_object_binding(ctx, props, Expr::Ident(synthetic, span), span),
        other => vec![Decl { binding: other, initializer: Some(Box::new(Expr::Ident(synthetic, span))), span }],
    };
    (synthetic, decls)
}

/// Lower `({a, ...r} = o)` (`spec.md` §4.9 "Assign"). Unlike the declaration
/// forms, an assignment pattern's properties target arbitrary pre-existing
/// lvalues (`obj.x`, `arr[i]`, a bare identifier, ...) rather than fresh
/// bindings, so this reuses the object-literal `Property` shape (with
/// `PropertyKind::Spread` marking the rest target) and returns a single
/// comma-sequenced assignment expression instead of `Decl`s.
#[must_use]
pub fn lower_object_assign(ctx: &mut LoweringContext, props: Vec<Property>, source: Expr, span: Span) -> Expr {
    let target_uses = props.len().clamp(1, 3) as u8;
    let mut cap = Capture::new(ctx, span, target_uses, source);

    let mut assignments = Vec::new();
    let mut excluded_keys = Vec::new();
    let mut rest_target = None;

    for prop in props {
        if matches!(prop.kind, PropertyKind::Spread) {
            rest_target = Some(prop.value);
            continue;
        }
        let key = prop.key.expect("a non-spread assignment-pattern property always carries a key");
        let src = cap.produce();
        let accessed = property_read(src, &key, prop.is_computed, span);
        let value = apply_default(ctx, accessed, prop.initializer, span);
        assignments.push(Expr::Binary { op: BinaryOp::Assign, lhs: prop.value, rhs: Box::new(value), span });
        excluded_keys.push(excluded_key(ctx, *key, prop.is_computed, span));
    }

    if let Some(rest) = rest_target {
        let src = cap.produce();
        let keys = Expr::Array {
            elements: excluded_keys.into_iter().map(|expr| ArrayElement { expr, is_spread: false }).collect(),
            span,
        };
        let rest_value = runtime_calls::rest(ctx, src, keys, span);
        assignments.push(Expr::Binary { op: BinaryOp::Assign, lhs: rest, rhs: Box::new(rest_value), span });
    }

    let mut assignments = assignments.into_iter();
    let first = assignments.next().unwrap_or(Expr::Undefined(span));
    assignments.fold(first, |acc, next| Expr::Binary { op: BinaryOp::Comma, lhs: Box::new(acc), rhs: Box::new(next), span })
}
