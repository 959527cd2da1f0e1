//! # squery-sql
//!
//! Translator for SQuery, an SQL-like mini-language carried in a URL query
//! parameter, into SQL Server SELECT statements.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! translate → URL contract, Translation pipeline driver
//!   ↓
//! sql       → Transformer + SqlBuilder (joins, column rewriting, literals)
//!   ↓
//! semantic  → Validator: alias scope + reference checks, resolution rules
//!   ↓
//! parser    → Logos lexer, keywords, AST, recursive-descent parser
//!   ↓
//! registry  → Schema registry (read-only maps, resource entity types)
//!   ↓
//! diagnostics → Severity, DiagnosticCode, Diagnostic, TranslateError
//!   ↓
//! base      → Span primitives (byte offsets)
//! ```
//!
//! ## Example
//!
//! ```
//! use squery::{translate, Registry};
//!
//! let registry = Registry::builder()
//!     .entity("Category", "UP_Categories")
//!     .alias("Category", "cat")
//!     .build();
//!
//! let result = translate(
//!     "https://host/api/Category?squery=select+Id+where+ParentId=null",
//!     &registry,
//! )
//! .unwrap();
//! assert_eq!(
//!     result.sql,
//!     "SELECT cat.Id FROM [dbo].[UP_Categories] cat WHERE cat.ParentId IS NULL"
//! );
//! ```

// ============================================================================
// MODULES (dependency order: base → diagnostics → registry → parser →
// semantic → sql → translate)
// ============================================================================

/// Foundation types: byte-offset spans
pub mod base;

/// Diagnostics: severity, codes, the fatal error taxonomy
pub mod diagnostics;

/// Schema registry: read-only metadata consumed by validation and transform
pub mod registry;

/// Parser: logos lexer, keywords, AST, recursive-descent parser
pub mod parser;

/// Semantic analysis: alias scope, validation, resolution rules
pub mod semantic;

/// SQL generation: transformer and statement builder
pub mod sql;

/// Entry points: URL contract and the Translation pipeline
pub mod translate;

// Re-export commonly needed items
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity, TranslateError};
pub use parser::{parse_squery, Query, Value};
pub use registry::{Registry, RegistryBuilder};
pub use translate::{translate, translate_squery, TranslateResult, Translation};
