//! Black-box coverage for `spec.md` §8's object-rest key-exclusion property:
//! lowering `const {a, ...r} = o` must produce a rest computation that
//! excludes exactly the named properties, so `r` ends up holding the rest
//! of `o`'s own keys.

use tsz_ast::binding::{Binding, ObjectBindingProp};
use tsz_ast::expr::BinaryOp;
use tsz_ast::property::{Property, PropertyKind};
use tsz_ast::{Expr, FeatureGate, SymbolKind};
use tsz_common::span::Span;
use tsz_lowering::{object_rest, LoweringContext};

fn ctx() -> LoweringContext {
    LoweringContext::new(FeatureGate::all_supported())
}

#[test]
fn rest_excludes_exactly_the_named_properties() {
    let mut c = ctx();
    let o = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "o");
    let a = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "a");
    let r = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "r");

    let props = vec![
        ObjectBindingProp::Prop {
            key: Box::new(Expr::Str("a".to_string(), Span::default())),
            computed: false,
            value: Binding::Ident(a),
            default: None,
        },
        ObjectBindingProp::Rest(Box::new(Binding::Ident(r))),
    ];

    let decls = object_rest::lower_object_binding(&mut c, props, Expr::Ident(o, Span::default()), Span::default());

    assert_eq!(decls.len(), 2);
    assert!(matches!(decls[0].binding, Binding::Ident(sym) if sym == a));
    assert!(matches!(decls[1].binding, Binding::Ident(sym) if sym == r));

    match decls[1].initializer.as_deref() {
        Some(Expr::Call { args, .. }) => {
            assert_eq!(args.len(), 2, "__rest(source, excludedKeys)");
            match &args[1].expr {
                Expr::Array { elements, .. } => {
                    assert_eq!(elements.len(), 1, "only `a` is excluded from the rest");
                    // A non-computed key is already the literal name it will
                    // be at runtime, so it's emitted bare rather than
                    // wrapped in `__restKey(...)`.
                    assert!(matches!(&elements[0].expr, Expr::Str(key, _) if key == "a"), "expected the bare literal key \"a\"");
                }
                other => panic!("expected the excluded-keys array, got {other:?}"),
            }
        }
        other => panic!("expected the __rest(...) call, got {other:?}"),
    }
}

#[test]
fn computed_key_is_normalized_through_rest_key_but_literal_key_is_not() {
    let mut c = ctx();
    let o = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "o");
    let a = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "a");
    let r = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "r");
    let k = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "k");

    let props = vec![
        ObjectBindingProp::Prop {
            key: Box::new(Expr::Ident(k, Span::default())),
            computed: true,
            value: Binding::Ident(a),
            default: None,
        },
        ObjectBindingProp::Rest(Box::new(Binding::Ident(r))),
    ];

    let decls = object_rest::lower_object_binding(&mut c, props, Expr::Ident(o, Span::default()), Span::default());
    match decls[1].initializer.as_deref() {
        Some(Expr::Call { args, .. }) => match &args[1].expr {
            Expr::Array { elements, .. } => match &elements[0].expr {
                Expr::Call { .. } => {}
                other => panic!("expected the computed key wrapped in __restKey(...), got {other:?}"),
            },
            other => panic!("expected the excluded-keys array, got {other:?}"),
        },
        other => panic!("expected the __rest(...) call, got {other:?}"),
    }
}

#[test]
fn assign_form_writes_through_the_original_lvalues_not_fresh_declarations() {
    let mut c = ctx();
    let o = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "o");
    let obj = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "obj");
    let rest = c.symbols.new_symbol(c.module_scope(), SymbolKind::Other, "rest");

    // `({a: obj.x, ...rest} = o)`: the `a` target is a member expression,
    // which `Binding` cannot represent at all.
    let member_target = Expr::Dot {
        target: Box::new(Expr::Ident(obj, Span::default())),
        name: "x".to_string(),
        name_span: Span::default(),
        optional: tsz_ast::expr::OptionalChain::None,
        span: Span::default(),
    };
    let props = vec![
        Property {
            kind: PropertyKind::Normal,
            key: Some(Box::new(Expr::Str("a".to_string(), Span::default()))),
            value: Box::new(member_target),
            initializer: None,
            is_method: false,
            is_static: false,
            is_computed: false,
            decorators: vec![],
            span: Span::default(),
        },
        Property {
            kind: PropertyKind::Spread,
            key: None,
            value: Box::new(Expr::Ident(rest, Span::default())),
            initializer: None,
            is_method: false,
            is_static: false,
            is_computed: false,
            decorators: vec![],
            span: Span::default(),
        },
    ];

    let lowered = object_rest::lower_object_assign(&mut c, props, Expr::Ident(o, Span::default()), Span::default());

    // Two assignments joined by a comma: `obj.x = o.a, rest = __rest(o, ["a"])`.
    match lowered {
        Expr::Binary { op: BinaryOp::Comma, lhs, rhs, .. } => {
            match lhs.as_ref() {
                Expr::Binary { op: BinaryOp::Assign, lhs: target, .. } => {
                    assert!(matches!(target.as_ref(), Expr::Dot { .. }), "first assignment writes through the member lvalue");
                }
                other => panic!("expected the `a` assignment, got {other:?}"),
            }
            match rhs.as_ref() {
                Expr::Binary { op: BinaryOp::Assign, lhs: target, rhs: value, .. } => {
                    assert!(matches!(target.as_ref(), Expr::Ident(sym, _) if *sym == rest));
                    assert!(matches!(value.as_ref(), Expr::Call { .. }), "rest assignment comes from __rest(...)");
                }
                other => panic!("expected the rest assignment, got {other:?}"),
            }
        }
        other => panic!("expected a comma-sequenced pair of assignments, got {other:?}"),
    }
}
