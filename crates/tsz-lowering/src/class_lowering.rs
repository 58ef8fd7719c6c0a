//! Class lowering (`spec.md` §4.11): instance/static field splicing,
//! private-member `WeakMap`/`WeakSet` setup, and TS decorators.
//!
//! Constructor ordering follows the source order of field declarations:
//! every instance field (public or private) becomes one statement spliced
//! into the constructor immediately after its `super(...)` call, in
//! declaration order; static fields and decorator calls run once, right
//! after the class declaration.

use tsz_ast::expr::{ClassExpr, OptionalChain};
use tsz_ast::property::Property;
use tsz_ast::stmt::Stmt;
use tsz_ast::{Expr, SymbolRef};
use tsz_common::span::Span;

use crate::{private_members, runtime_calls, LoweringContext};

/// `__decorate`'s `kind` argument (`spec.md` §4.11, §6): `1` for a decorated
/// method/accessor, `2` for a decorated field.
const DECORATOR_KIND_METHOD: f64 = 1.0;
const DECORATOR_KIND_FIELD: f64 = 2.0;

/// Everything a class declaration expands into once fields, private
/// members, and decorators are pulled out of the class body proper.
pub struct LoweredClass {
    /// The trimmed class: only the constructor and plain methods/accessors
    /// remain in `members`.
    pub class: ClassExpr,
    /// Statements to splice into the constructor, right after its
    /// `super(...)` call (or at the top, for a class with no superclass).
    pub constructor_prelude: Vec<Stmt>,
    /// Statements to emit immediately after the class declaration: static
    /// field assignments, private-member `WeakMap`/`WeakSet` instantiation,
    /// and `__decorate` calls.
    pub after_class: Vec<Stmt>,
}

pub fn lower_class(ctx: &mut LoweringContext, mut class: ClassExpr) -> LoweredClass {
    let span = class.span;
    let class_ref = class.name;
    let members = std::mem::take(&mut class.members);

    let mut kept_members = Vec::new();
    let mut constructor_prelude = Vec::new();
    let mut after_class = Vec::new();

    for member in members {
        if member.is_method {
            if !member.decorators.is_empty() {
                after_class.push(lower_member_decorators(ctx, &member, class_ref, span, DECORATOR_KIND_METHOD));
            }
            let mut method = member;
            method.decorators = Vec::new();
            kept_members.push(method);
            continue;
        }
        lower_field(ctx, member, class_ref, span, &mut constructor_prelude, &mut after_class);
    }

    class.members = kept_members;
    LoweredClass { class, constructor_prelude, after_class }
}

fn lower_field(
    ctx: &mut LoweringContext,
    member: Property,
    class_ref: Option<SymbolRef>,
    span: Span,
    constructor_prelude: &mut Vec<Stmt>,
    after_class: &mut Vec<Stmt>,
) {
    let is_private = member.is_private();
    let init = member.initializer.as_deref().cloned().unwrap_or(Expr::Undefined(span));
    let is_static = member.is_static;
    let has_decorators = !member.decorators.is_empty();

    if is_private {
        let Some(Expr::PrivateIdent(private_ref, _)) = member.key.as_deref() else {
            unreachable!("private field key must be a PrivateIdent")
        };
        let private_ref = *private_ref;
        after_class.insert(0, private_members::weak_map_instantiation(ctx, private_ref, span));
        let target = if is_static {
            class_ref.map_or(Expr::This(span), |r| Expr::Ident(r, span))
        } else {
            Expr::This(span)
        };
        let set_call = private_members::lower_private_set(ctx, target, private_ref, init, span);
        let stmt = Stmt::Expr(Box::new(set_call), span);
        if is_static {
            after_class.push(stmt);
        } else {
            constructor_prelude.push(stmt);
        }
        if has_decorators {
            after_class.push(lower_member_decorators(ctx, &member, class_ref, span, DECORATOR_KIND_FIELD));
        }
        return;
    }

    let Some(key) = member.key.clone() else { unreachable!("public field key is always present") };
    let target = if is_static {
        class_ref.map_or(Expr::This(span), |r| Expr::Ident(r, span))
    } else {
        Expr::This(span)
    };
    let call = runtime_calls::public_field(ctx, target, *key, init, span);
    let stmt = Stmt::Expr(Box::new(call), span);
    if is_static {
        after_class.push(stmt);
    } else {
        constructor_prelude.push(stmt);
    }
    if has_decorators {
        after_class.push(lower_member_decorators(ctx, &member, class_ref, span, DECORATOR_KIND_FIELD));
    }
}

/// `spec.md` §4.11 decorators: `__decorate([dec1, dec2], Target.prototype,
/// "methodName", kind)` for a decorated method/accessor or field, with any
/// parameter decorators folded in via `__param`. `kind` is `1` for a
/// method/accessor, `2` for a field (`spec.md` §6).
fn lower_member_decorators(ctx: &mut LoweringContext, member: &Property, class_ref: Option<SymbolRef>, span: Span, kind: f64) -> Stmt {
    let target = class_ref.map_or(Expr::This(span), |r| {
        if member.is_static {
            Expr::Ident(r, span)
        } else {
            Expr::Dot { target: Box::new(Expr::Ident(r, span)), name: "prototype".to_string(), name_span: span, optional: OptionalChain::None, span }
        }
    });
    let key = member.key.as_deref().cloned().unwrap_or(Expr::Undefined(span));
    let decorators_array = Expr::Array {
        elements: member
            .decorators
            .iter()
            .cloned()
            .map(|expr| tsz_ast::expr::ArrayElement { expr, is_spread: false })
            .collect(),
        span,
    };
    let call = runtime_calls::decorate(ctx, decorators_array, target, key, Expr::Number(kind, span), span);
    Stmt::Expr(Box::new(call), span)
}

/// A parameter decorator folds into the decorators array as `__param(i,
/// dec)` rather than a bare decorator expression (`spec.md` §4.11).
#[must_use]
pub fn lower_parameter_decorator(ctx: &mut LoweringContext, index: usize, decorator: Expr, span: Span) -> Expr {
    let index_expr = Expr::Number(index as f64, span);
    runtime_calls::param_decorator(ctx, index_expr, decorator, span)
}
