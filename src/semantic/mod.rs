//! Semantic analysis: alias scoping, reference checking, and the resolution
//! rules shared with the SQL transformer.
//!
//! The scope is a pure data structure ([`AliasScope`]); all resolution logic
//! lives in [`resolve`] so the validator's verdicts and the emitted SQL
//! always agree.

pub mod resolve;
pub mod scope;
pub mod validator;

pub use resolve::{resolve_nav_prop, rewrite_column, ResolvedNav};
pub use scope::AliasScope;
pub use validator::{check_top, validate, Validation};
