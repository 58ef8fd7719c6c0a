//! JSON recursive-descent parser (`spec.md` §4.12): tokens from
//! [`crate::lexer::Lexer`] feed directly into `tsz_ast::Expr` values — there
//! is no separate JSON value type, since the whole point of this parser is
//! to exercise the AST shape the lowerer also builds.

use std::panic::AssertUnwindSafe;

use rustc_hash::FxHashSet;
use tsz_ast::expr::ArrayElement;
use tsz_ast::property::{Property, PropertyKind};
use tsz_ast::Expr;
use tsz_common::diagnostics::{codes, DiagnosticBag};
use tsz_common::span::Span;

use crate::lexer::{Lexer, Token};

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    diagnostics: &'a mut DiagnosticBag,
    ok: bool,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, diagnostics: &'a mut DiagnosticBag) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self { lexer, current, diagnostics, ok: true }
    }

    fn bump(&mut self) -> Token {
        std::mem::replace(&mut self.current, self.lexer.next_token())
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.ok = false;
        self.diagnostics.push_error(codes::JSON_PARSE_ERROR, span, message);
    }

    fn parse(&mut self) -> Expr {
        let value = self.parse_value();
        if !matches!(self.current, Token::Eof(_)) {
            let span = self.current.span();
            self.error(span, "trailing content after the JSON value");
        }
        value
    }

    fn parse_value(&mut self) -> Expr {
        match self.bump() {
            Token::LBrace(start) => self.parse_object(start),
            Token::LBracket(start) => self.parse_array(start),
            Token::Str(s, span) => Expr::Str(s, span),
            Token::Number(n, span) => Expr::Number(n, span),
            Token::True(span) => Expr::Bool(true, span),
            Token::False(span) => Expr::Bool(false, span),
            Token::Null(span) => Expr::Null(span),
            other => {
                let span = other.span();
                self.error(span, "expected a JSON value");
                Expr::Null(span)
            }
        }
    }

    fn parse_array(&mut self, start: Span) -> Expr {
        if let Token::RBracket(end) = self.current {
            self.bump();
            return Expr::Array { elements: Vec::new(), span: start.merge(end) };
        }

        let mut elements = Vec::new();
        loop {
            let expr = self.parse_value();
            elements.push(ArrayElement { expr, is_spread: false });
            match self.current {
                Token::Comma(comma_span) => {
                    self.bump();
                    if matches!(self.current, Token::RBracket(_)) {
                        self.error(comma_span, "trailing comma before ']'");
                        break;
                    }
                }
                Token::RBracket(_) => break,
                ref other => {
                    self.error(other.span(), "expected ',' or ']'");
                    break;
                }
            }
        }
        let end = self.current.span();
        if matches!(self.current, Token::RBracket(_)) {
            self.bump();
        } else {
            self.error(end, "unterminated array");
        }
        Expr::Array { elements, span: start.merge(end) }
    }

    fn parse_object(&mut self, start: Span) -> Expr {
        if let Token::RBrace(end) = self.current {
            self.bump();
            return Expr::Object { props: Vec::new(), is_single_line: true, span: start.merge(end) };
        }

        let mut props = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        loop {
            let (key, key_span) = match self.bump() {
                Token::Str(s, span) => (s, span),
                other => {
                    self.error(other.span(), "expected a string object key");
                    break;
                }
            };
            match self.bump() {
                Token::Colon(_) => {}
                other => self.error(other.span(), "expected ':' after object key"),
            }
            let value = self.parse_value();
            if !seen.insert(key.clone()) {
                self.diagnostics.push_warning(codes::JSON_DUPLICATE_KEY, key_span, format!("duplicate object key {key:?}"));
            }
            props.push(Property {
                kind: PropertyKind::Normal,
                key: Some(Box::new(Expr::Str(key, key_span))),
                value: Box::new(value),
                initializer: None,
                is_method: false,
                is_static: false,
                is_computed: false,
                decorators: Vec::new(),
                span: key_span,
            });

            match self.current {
                Token::Comma(comma_span) => {
                    self.bump();
                    if matches!(self.current, Token::RBrace(_)) {
                        self.error(comma_span, "trailing comma before '}'");
                        break;
                    }
                }
                Token::RBrace(_) => break,
                ref other => {
                    self.error(other.span(), "expected ',' or '}'");
                    break;
                }
            }
        }
        let end = self.current.span();
        if matches!(self.current, Token::RBrace(_)) {
            self.bump();
        } else {
            self.error(end, "unterminated object");
        }
        Expr::Object { props, is_single_line: false, span: start.merge(end) }
    }
}

/// Parse `source` as JSON, reusing `Expr::{Null, Bool, Number, Str, Array,
/// Object}` (`spec.md` §4.12). A lexer panic (malformed escape, stray byte,
/// bad number) unwinds to here and is converted to a plain `(empty,
/// false)` result, never propagating past this entry point (`spec.md` §5
/// "Failure containment").
pub fn parse_json(diagnostics: &mut DiagnosticBag, source: &str) -> (Expr, bool) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let mut parser = Parser::new(source, diagnostics);
        (parser.parse(), parser.ok)
    }));
    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!("JSON lexer panicked; reporting a parse failure");
            diagnostics.push_error(codes::JSON_PARSE_ERROR, Span::dummy(), "the JSON lexer panicked on malformed input");
            (Expr::Null(Span::dummy()), false)
        }
    }
}
