//! Diagnostics and error reporting for the translation pipeline.
//!
//! Two tiers:
//! - [`TranslateError`] — fatal; the translation aborts and the caller gets
//!   a single error.
//! - [`Diagnostic`] — non-fatal; warnings and informational notices attached
//!   to the translation result.

mod codes;
mod diagnostic;
mod error;

pub use codes::DiagnosticCode;
pub use diagnostic::{Diagnostic, Severity};
pub use error::TranslateError;
