//! Async function lowering (`spec.md` §4.10): an async function/arrow
//! becomes a plain function returning `__async(this, args, generator)`,
//! where `generator` is the original body with every `await` rewritten to
//! `yield` and every nested function/class left untouched (their own
//! `await`s, if any, belong to them and are lowered independently).
//!
//! Two genuinely different cases:
//!
//! - **Simple** formals (plain identifiers, no defaults, no rest/patterns):
//!   nothing about evaluating them can throw, so they stay on the *outer*
//!   function, preserving its `.length`/parameter names; the generator
//!   takes none of its own and closes over them. `arguments` is forwarded
//!   only if the body actually reads it.
//! - **Complex** formals (a default value, rest element, or destructuring
//!   pattern): evaluating one of these *can* throw (`async function f(x =
//!   g())` where `g` throws). If they stayed on the outer function that
//!   throw would be synchronous instead of rejecting the returned promise.
//!   So the outer function takes no parameters of its own and forwards
//!   `arguments` verbatim; the original formals move onto the generator,
//!   which receives them (and evaluates their defaults/destructuring) only
//!   once the `__async` helper invokes it, inside the promise machinery.

use tsz_ast::binding::Binding;
use tsz_ast::expr::{ArrayElement, FunctionExpr};
use tsz_ast::stmt::{CatchClause, ForHead};
use tsz_ast::Expr;
use tsz_ast::Stmt;
use tsz_common::span::Span;

use crate::{runtime_calls, LoweringContext};

fn is_complex_param(p: &tsz_ast::binding::Param) -> bool {
    p.initializer.is_some() || p.is_rest || !matches!(p.binding, Binding::Ident(_))
}

/// Lower one async `FunctionExpr` (function, method, or arrow) to its ES5
/// generator-delegation form. `f.is_async` is expected to be `true`;
/// returns a function with `is_async: false`.
#[must_use]
pub fn lower_async_function(ctx: &mut LoweringContext, mut f: FunctionExpr) -> FunctionExpr {
    let span = f.span;
    let body = std::mem::take(&mut f.body);
    let expr_body = f.expr_body.take();
    let params = std::mem::take(&mut f.params);

    let rewritten_body = body.into_iter().map(rewrite_stmt).collect();
    let rewritten_expr_body = expr_body.map(|e| Box::new(rewrite_expr(*e)));

    let is_complex = params.iter().any(is_complex_param);

    let (outer_params, generator_params, args_expr) = if is_complex {
        (Vec::new(), params, Expr::Ident(ctx.arguments_ref(), span))
    } else {
        let args_expr = if f.uses_arguments { Expr::Ident(ctx.arguments_ref(), span) } else { Expr::Undefined(span) };
        (params, Vec::new(), args_expr)
    };

    let generator = FunctionExpr {
        name: None,
        params: generator_params,
        body: rewritten_body,
        expr_body: rewritten_expr_body,
        is_async: false,
        is_generator: true,
        is_arrow: false,
        uses_arguments: is_complex,
        span,
    };

    let call = runtime_calls::async_call(ctx, Expr::This(span), args_expr, Expr::Function(Box::new(generator), span), span);

    FunctionExpr {
        name: f.name,
        params: outer_params,
        body: vec![Stmt::Return(Some(Box::new(call)), span)],
        expr_body: None,
        is_async: false,
        is_generator: false,
        is_arrow: f.is_arrow,
        uses_arguments: f.uses_arguments || is_complex,
        span,
    }
}

fn rewrite_stmt(stmt: Stmt) -> Stmt {
    match stmt {
        Stmt::Block(stmts, span) => Stmt::Block(stmts.into_iter().map(rewrite_stmt).collect(), span),
        Stmt::Expr(e, span) => Stmt::Expr(Box::new(rewrite_expr(*e)), span),
        Stmt::Local { kind, decls, is_export, span } => {
            let decls = decls
                .into_iter()
                .map(|d| tsz_ast::stmt::Decl { binding: d.binding, initializer: d.initializer.map(|i| Box::new(rewrite_expr(*i))), span: d.span })
                .collect();
            Stmt::Local { kind, decls, is_export, span }
        }
        Stmt::Return(e, span) => Stmt::Return(e.map(|e| Box::new(rewrite_expr(*e))), span),
        Stmt::If { test, consequent, alternate, span } => Stmt::If {
            test: Box::new(rewrite_expr(*test)),
            consequent: Box::new(rewrite_stmt(*consequent)),
            alternate: alternate.map(|s| Box::new(rewrite_stmt(*s))),
            span,
        },
        Stmt::For { init, test, update, body, span } => Stmt::For {
            init: init.map(|s| Box::new(rewrite_stmt(*s))),
            test: test.map(|e| Box::new(rewrite_expr(*e))),
            update: update.map(|e| Box::new(rewrite_expr(*e))),
            body: Box::new(rewrite_stmt(*body)),
            span,
        },
        Stmt::ForInOf { is_of, is_await, left, right, body, span } => {
            Stmt::ForInOf { is_of, is_await, left: rewrite_for_head(left), right: Box::new(rewrite_expr(*right)), body: Box::new(rewrite_stmt(*body)), span }
        }
        Stmt::Try { block, catch, finally, span } => Stmt::Try {
            block: block.into_iter().map(rewrite_stmt).collect(),
            catch: catch.map(|c| CatchClause { param: c.param, body: c.body.into_iter().map(rewrite_stmt).collect(), span: c.span }),
            finally: finally.map(|stmts| stmts.into_iter().map(rewrite_stmt).collect()),
            span,
        },
        Stmt::Throw(e, span) => Stmt::Throw(Box::new(rewrite_expr(*e)), span),
        // Nested function/class declarations have their own `await`s (if
        // any), lowered independently.
        other @ (Stmt::ClassDecl(..) | Stmt::ExportDefault(..)) => other,
    }
}

fn rewrite_for_head(head: ForHead) -> ForHead {
    head
}

/// Rewrite every `await` in `e` to a `yield`, without descending into
/// nested function or class bodies.
fn rewrite_expr(e: Expr) -> Expr {
    match e {
        Expr::Await(inner, span) => Expr::Yield { argument: Some(Box::new(rewrite_expr(*inner))), delegate: false, span },
        // Nested functions/classes are lowered on their own.
        other @ (Expr::Function(..) | Expr::Class(..)) => other,
        Expr::Array { elements, span } => Expr::Array {
            elements: elements.into_iter().map(|el| ArrayElement { expr: rewrite_expr(el.expr), is_spread: el.is_spread }).collect(),
            span,
        },
        Expr::Object { props, is_single_line, span } => Expr::Object { props: props.into_iter().map(rewrite_property).collect(), is_single_line, span },
        Expr::Dot { target, name, name_span, optional, span } => Expr::Dot { target: Box::new(rewrite_expr(*target)), name, name_span, optional, span },
        Expr::Index { target, index, optional, span } => {
            Expr::Index { target: Box::new(rewrite_expr(*target)), index: Box::new(rewrite_expr(*index)), optional, span }
        }
        Expr::Call { target, args, optional, is_direct_eval, can_be_unwrapped_if_unused, span } => Expr::Call {
            target: Box::new(rewrite_expr(*target)),
            args: args.into_iter().map(|a| ArrayElement { expr: rewrite_expr(a.expr), is_spread: a.is_spread }).collect(),
            optional,
            is_direct_eval,
            can_be_unwrapped_if_unused,
            span,
        },
        Expr::New { target, args, span } => Expr::New {
            target: Box::new(rewrite_expr(*target)),
            args: args.into_iter().map(|a| ArrayElement { expr: rewrite_expr(a.expr), is_spread: a.is_spread }).collect(),
            span,
        },
        Expr::Unary { op, operand, span } => Expr::Unary { op, operand: Box::new(rewrite_expr(*operand)), span },
        Expr::Binary { op, lhs, rhs, span } => Expr::Binary { op, lhs: Box::new(rewrite_expr(*lhs)), rhs: Box::new(rewrite_expr(*rhs)), span },
        Expr::Conditional { test, yes, no, span } => {
            Expr::Conditional { test: Box::new(rewrite_expr(*test)), yes: Box::new(rewrite_expr(*yes)), no: Box::new(rewrite_expr(*no)), span }
        }
        Expr::Spread(inner, span) => Expr::Spread(Box::new(rewrite_expr(*inner)), span),
        Expr::Yield { argument, delegate, span } => Expr::Yield { argument: argument.map(|a| Box::new(rewrite_expr(*a))), delegate, span },
        Expr::Template { quasis, exprs, span } => Expr::Template { quasis, exprs: exprs.into_iter().map(rewrite_expr).collect(), span },
        leaf @ (Expr::Bool(..)
        | Expr::Number(..)
        | Expr::Str(..)
        | Expr::Null(_)
        | Expr::Undefined(_)
        | Expr::This(_)
        | Expr::Super(_)
        | Expr::Ident(..)
        | Expr::PrivateIdent(..)) => leaf,
    }
}

fn rewrite_property(p: tsz_ast::property::Property) -> tsz_ast::property::Property {
    tsz_ast::property::Property {
        kind: p.kind,
        key: p.key.map(|k| Box::new(rewrite_expr(*k))),
        value: Box::new(rewrite_expr(*p.value)),
        initializer: p.initializer.map(|i| Box::new(rewrite_expr(*i))),
        is_method: p.is_method,
        is_static: p.is_static,
        is_computed: p.is_computed,
        decorators: p.decorators.into_iter().map(rewrite_expr).collect(),
        span: p.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsz_ast::FeatureGate;

    fn ctx() -> LoweringContext {
        LoweringContext::new(FeatureGate::all_supported())
    }

    fn base_fn(uses_arguments: bool, body: Vec<Stmt>) -> FunctionExpr {
        FunctionExpr {
            name: None,
            params: vec![],
            body,
            expr_body: None,
            is_async: true,
            is_generator: false,
            is_arrow: false,
            uses_arguments,
            span: Span::default(),
        }
    }

    #[test]
    fn lowered_function_returns_an_async_helper_call() {
        let mut c = ctx();
        let f = base_fn(false, vec![]);
        let lowered = lower_async_function(&mut c, f);
        assert!(!lowered.is_async);
        assert_eq!(lowered.body.len(), 1);
        match &lowered.body[0] {
            Stmt::Return(Some(e), _) => assert!(matches!(e.as_ref(), Expr::Call { .. })),
            other => panic!("expected a single return statement, got {other:?}"),
        }
    }

    #[test]
    fn functions_that_do_not_read_arguments_pass_void_zero() {
        let mut c = ctx();
        let f = base_fn(false, vec![]);
        let lowered = lower_async_function(&mut c, f);
        match &lowered.body[0] {
            Stmt::Return(Some(e), _) => match e.as_ref() {
                Expr::Call { args, .. } => assert!(matches!(args[1].expr, Expr::Undefined(_))),
                other => panic!("{other:?}"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn functions_that_read_arguments_forward_the_real_object() {
        let mut c = ctx();
        let f = base_fn(true, vec![]);
        let lowered = lower_async_function(&mut c, f);
        match &lowered.body[0] {
            Stmt::Return(Some(e), _) => match e.as_ref() {
                Expr::Call { args, .. } => assert!(matches!(args[1].expr, Expr::Ident(..))),
                other => panic!("{other:?}"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn await_inside_the_body_becomes_yield() {
        let mut c = ctx();
        let awaited = Expr::Await(Box::new(Expr::Number(1.0, Span::default())), Span::default());
        let f = base_fn(false, vec![Stmt::Expr(Box::new(awaited), Span::default())]);
        let lowered = lower_async_function(&mut c, f);
        match &lowered.body[0] {
            Stmt::Return(Some(e), _) => match e.as_ref() {
                Expr::Call { args, .. } => match &args[2].expr {
                    Expr::Function(inner, _) => match &inner.body[0] {
                        Stmt::Expr(e, _) => assert!(matches!(e.as_ref(), Expr::Yield { .. })),
                        other => panic!("{other:?}"),
                    },
                    other => panic!("{other:?}"),
                },
                other => panic!("{other:?}"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn await_inside_a_nested_function_is_left_alone() {
        let nested = Expr::Function(
            Box::new(FunctionExpr {
                name: None,
                params: vec![],
                body: vec![Stmt::Expr(Box::new(Expr::Await(Box::new(Expr::Number(1.0, Span::default())), Span::default())), Span::default())],
                expr_body: None,
                is_async: true,
                is_generator: false,
                is_arrow: false,
                uses_arguments: false,
                span: Span::default(),
            }),
            Span::default(),
        );
        let rewritten = rewrite_expr(nested.clone());
        assert_eq!(rewritten, nested, "a nested function's own await must be untouched here");
    }

    /// `async function f(x = g()) {...}`: a throwing default must reject the
    /// returned promise, not throw synchronously, so the defaulted
    /// parameter has to move onto the generator.
    #[test]
    fn a_defaulted_parameter_moves_onto_the_generator_not_the_outer_function() {
        let mut c = ctx();
        let x = c.symbols.new_symbol(c.module_scope(), tsz_ast::SymbolKind::Other, "x");
        let param = tsz_ast::binding::Param {
            binding: Binding::Ident(x),
            initializer: Some(Box::new(Expr::Number(2.0, Span::default()))),
            is_rest: false,
            span: Span::default(),
        };
        let mut f = base_fn(false, vec![]);
        f.params = vec![param];
        let lowered = lower_async_function(&mut c, f);

        assert!(lowered.params.is_empty(), "the outer function takes no parameters of its own");
        match &lowered.body[0] {
            Stmt::Return(Some(e), _) => match e.as_ref() {
                Expr::Call { args, .. } => {
                    assert!(matches!(args[1].expr, Expr::Ident(..)), "arguments must be forwarded so the generator can bind its own params");
                    match &args[2].expr {
                        Expr::Function(generator, _) => {
                            assert_eq!(generator.params.len(), 1, "the defaulted parameter moved onto the generator");
                            assert!(generator.params[0].initializer.is_some());
                        }
                        other => panic!("expected the nested generator function expression, got {other:?}"),
                    }
                }
                other => panic!("{other:?}"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn simple_parameters_stay_on_the_outer_function() {
        let mut c = ctx();
        let x = c.symbols.new_symbol(c.module_scope(), tsz_ast::SymbolKind::Other, "x");
        let param = tsz_ast::binding::Param { binding: Binding::Ident(x), initializer: None, is_rest: false, span: Span::default() };
        let mut f = base_fn(false, vec![]);
        f.params = vec![param];
        let lowered = lower_async_function(&mut c, f);
        assert_eq!(lowered.params.len(), 1, "a plain identifier parameter can't throw, so it stays put");
    }
}
