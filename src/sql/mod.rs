//! SQL generation: the transformer walks the validated AST and feeds the
//! statement builder.
//!
//! Emitted dialect is SQL Server 2012+ (`TOP N`, `OFFSET … ROWS FETCH NEXT
//! … ROWS ONLY`). Identifiers from the registry arrive already
//! bracket-qualified; string literals use `'…'` with `'` doubled.

mod builder;
mod transform;

pub use builder::{format_literal, BuiltSql, SqlBuilder};
pub use transform::{transform, TransformOutcome};
