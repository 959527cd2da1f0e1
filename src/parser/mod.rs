//! Lexer and parser for the SQuery mini-language
//!
//! This module provides:
//! - **logos** for fast lexing
//! - a non-backtracking recursive-descent parser producing the plain AST
//!
//! ```text
//! Decoded SQuery text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → Query AST (joins, top, select, where tree, order by)
//! ```
//!
//! The lexer never fails: unknown characters are skipped with a warning.
//! The parser fails only on malformed clauses; unknown clause keywords are
//! skipped with a warning so the rest of the query still translates.

pub mod ast;
pub mod keywords;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use ast::{
    CompareOp, FieldRef, Join, JoinPath, LogicalOp, Query, Sort, SortDirection, Value, WhereExpr,
};
pub use keywords::Keyword;
pub use lexer::{lex, tokenize, Lexer, Op, Token, TokenKind};
pub use parser::{parse_squery, ParseOutcome};
