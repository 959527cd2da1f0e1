//! The translation entry points.
//!
//! [`translate`] takes a full HTTP URL and a registry; [`translate_squery`]
//! skips the URL preprocessing and takes the decoded SQuery text plus the
//! root entity directly. A [`Translation`] owns all per-call pipeline state:
//! it is single-threaded, performs no I/O, and its cost is bounded by input
//! size. Many translations may share one registry concurrently.

use indexmap::IndexMap;
use url::Url;

use crate::diagnostics::{Diagnostic, TranslateError};
use crate::parser::{parse_squery, Value};
use crate::registry::Registry;
use crate::semantic::{check_top, validate};
use crate::sql::transform;

/// The outcome of a successful translation.
#[derive(Debug, Clone)]
pub struct TranslateResult {
    /// Final SQL with values inlined as literals
    pub sql: String,
    /// `@pN` → value, for caller inspection
    pub parameters: IndexMap<String, Value>,
    /// Formatted non-fatal diagnostics
    pub warnings: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl TranslateResult {
    /// The structured diagnostics behind [`Self::warnings`].
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Translate the `squery` parameter of a full URL into SQL Server SQL.
///
/// The root entity comes from the `QueryRootEntityType` query parameter,
/// falling back to the last non-empty path segment.
pub fn translate(url: &str, registry: &Registry) -> Result<TranslateResult, TranslateError> {
    let (squery, root_entity) = extract_from_url(url)?;
    Translation::new(&squery, &root_entity, registry).run()
}

/// Translate a decoded SQuery string against a root entity.
pub fn translate_squery(
    squery: &str,
    root_entity: &str,
    registry: &Registry,
) -> Result<TranslateResult, TranslateError> {
    Translation::new(squery, root_entity, registry).run()
}

/// One translation: lex → parse → validate → transform → assemble.
pub struct Translation<'a> {
    squery: &'a str,
    root_entity: &'a str,
    registry: &'a Registry,
}

impl<'a> Translation<'a> {
    pub fn new(squery: &'a str, root_entity: &'a str, registry: &'a Registry) -> Self {
        Self {
            squery,
            root_entity,
            registry,
        }
    }

    /// Run the pipeline to completion.
    pub fn run(self) -> Result<TranslateResult, TranslateError> {
        let parsed = parse_squery(self.squery, self.root_entity)?;
        check_top(&parsed.query)?;
        let validation = validate(&parsed.query, self.registry)?;
        let transformed = transform(&parsed.query, self.registry, &validation)?;

        let mut diagnostics = parsed.diagnostics;
        diagnostics.extend(validation.diagnostics);
        diagnostics.extend(transformed.diagnostics);

        let warnings = diagnostics
            .iter()
            .filter(|d| !d.severity.is_error())
            .map(Diagnostic::format)
            .collect();

        Ok(TranslateResult {
            sql: transformed.built.sql,
            parameters: transformed.built.parameters,
            warnings,
            diagnostics,
        })
    }
}

/// Apply the URL contract: decoded `squery` value plus the root entity name.
fn extract_from_url(url: &str) -> Result<(String, String), TranslateError> {
    let parsed = Url::parse(url).map_err(|e| TranslateError::invalid_url(e.to_string()))?;

    let mut squery = None;
    let mut root_entity = None;
    // query_pairs applies application/x-www-form-urlencoded decoding
    // (space ↔ `+`)
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "squery" => squery = Some(value.into_owned()),
            "QueryRootEntityType" => root_entity = Some(value.into_owned()),
            _ => {}
        }
    }

    let root_entity = match root_entity.filter(|r| !r.is_empty()) {
        Some(root) => root,
        None => parsed
            .path_segments()
            .and_then(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .next_back()
                    .map(str::to_string)
            })
            .ok_or_else(|| {
                TranslateError::invalid_url(format!(
                    "no QueryRootEntityType parameter and no path segment names \
                     a root entity in '{url}'"
                ))
            })?,
    };

    Ok((squery.unwrap_or_default(), root_entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_explicit_root() {
        let (squery, root) = extract_from_url(
            "https://host/api/entities?QueryRootEntityType=Category&squery=select+Id",
        )
        .unwrap();
        assert_eq!(root, "Category");
        // `+` decodes to a space
        assert_eq!(squery, "select Id");
    }

    #[test]
    fn test_extract_root_from_path() {
        let (squery, root) =
            extract_from_url("https://host/api/Category?squery=select%20Id%2C%20Name").unwrap();
        assert_eq!(root, "Category");
        assert_eq!(squery, "select Id, Name");
    }

    #[test]
    fn test_extract_ignores_trailing_slash() {
        let (_, root) = extract_from_url("https://host/api/Category/?x=1").unwrap();
        assert_eq!(root, "Category");
    }

    #[test]
    fn test_extract_missing_squery_is_empty() {
        let (squery, _) = extract_from_url("https://host/api/Category").unwrap();
        assert_eq!(squery, "");
    }

    #[test]
    fn test_invalid_url() {
        let err = extract_from_url("not a url").unwrap_err();
        assert!(matches!(err, TranslateError::InvalidUrl(_)));
    }
}
