//! Diagnostic types for the translation pipeline
//!
//! Provides severity levels and a diagnostic record carrying:
//! - A user-facing message
//! - An optional source range in the SQuery text
//! - A categorized code
//! - An optional hint suggesting a fix

use crate::base::TextRange;

use super::codes::DiagnosticCode;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A hard error that aborts the translation
    #[default]
    Error,
    /// A warning; the translation continues
    Warning,
    /// Informational notice
    Info,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A translation diagnostic
///
/// Warnings and informational notices accumulate on the translation result;
/// errors are promoted to [`TranslateError`](super::TranslateError) by the
/// stage that produces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// Source location in the SQuery text, when known
    pub span: Option<TextRange>,
    /// Categorized code
    pub code: DiagnosticCode,
    /// Severity
    pub severity: Severity,
    /// Optional suggestion for fixing the problem
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new error-severity diagnostic.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            code,
            severity: Severity::Error,
            hint: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, message).with_severity(Severity::Warning)
    }

    /// Create an informational diagnostic.
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, message).with_severity(Severity::Info)
    }

    /// Attach a source range.
    pub fn with_span(mut self, span: TextRange) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Check if this diagnostic has a hint.
    pub fn has_hint(&self) -> bool {
        self.hint.is_some()
    }

    /// Format the diagnostic for display.
    pub fn format(&self) -> String {
        let mut result = format!("{}: {}", self.code, self.message);
        if let Some(span) = self.span {
            result.push_str(&format!(" (at offset {})", u32::from(span.start())));
        }
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }
}
