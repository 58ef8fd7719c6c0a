//! The JSON expression parser (`spec.md` §4.12): a standalone producer of
//! value expressions over the same `tsz_ast::Expr` tree the lowering engine
//! rewrites, included because it exercises the same AST shape.

pub mod lexer;
pub mod parser;

pub use parser::parse_json;
