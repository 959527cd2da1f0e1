//! Foundation types for the translator.
//!
//! This module provides the source-position primitives used throughout the
//! pipeline:
//! - [`TextRange`], [`TextSize`] - byte-offset positions in the SQuery text
//!
//! This module has NO dependencies on other squery modules.

pub use text_size::{TextRange, TextSize};
