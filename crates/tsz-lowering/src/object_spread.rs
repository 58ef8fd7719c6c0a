//! Object spread in object literals: `{...a, b: 1, ...c}` (`spec.md` §4.8).
//!
//! Consecutive non-spread properties are batched into a single object
//! literal and merged via `__assign`; a spread with no preceding batch
//! seeds the merge with a fresh `{}` so the original source object is never
//! mutated in place.

use tsz_ast::property::Property;
use tsz_ast::Expr;
use tsz_common::span::Span;

use crate::{runtime_calls, LoweringContext};

/// Lower one object literal's `props`, leaving it untouched if it contains
/// no spreads.
#[must_use]
pub fn lower_object_literal(ctx: &mut LoweringContext, props: Vec<Property>, is_single_line: bool, span: Span) -> Expr {
    if !props.iter().any(Property::is_spread) {
        return Expr::Object { props, is_single_line, span };
    }

    let mut acc: Option<Expr> = None;
    let mut batch: Vec<Property> = Vec::new();

    for prop in props {
        if prop.is_spread() {
            flush_batch(ctx, &mut acc, &mut batch, span);
            let src = *prop.value;
            let base = acc.take().unwrap_or_else(|| Expr::Object { props: vec![], is_single_line: true, span });
            acc = Some(runtime_calls::assign(ctx, base, src, span));
        } else {
            batch.push(prop);
        }
    }
    flush_batch(ctx, &mut acc, &mut batch, span);
    acc.unwrap_or_else(|| Expr::Object { props: vec![], is_single_line, span })
}

fn flush_batch(ctx: &mut LoweringContext, acc: &mut Option<Expr>, batch: &mut Vec<Property>, span: Span) {
    if batch.is_empty() {
        return;
    }
    let obj = Expr::Object { props: std::mem::take(batch), is_single_line: true, span };
    *acc = Some(match acc.take() {
        None => obj,
        Some(prev) => runtime_calls::assign(ctx, prev, obj, span),
    });
}
