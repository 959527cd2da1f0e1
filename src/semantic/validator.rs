//! Semantic validation of a parsed query.
//!
//! Two phases: build the alias→entity scope from the joins, then check every
//! field reference in SELECT, WHERE, and ORDER BY against it. Fatal problems
//! abort the translation; everything else accumulates as warnings and the
//! transformer carries on.

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticCode, TranslateError};
use crate::parser::{FieldRef, Query, Value, WhereExpr};
use crate::registry::Registry;

use super::resolve::{resolve_nav_prop, rewrite_column};
use super::scope::AliasScope;

/// Hard cap on `top` before a warning is raised.
const TOP_SANITY_LIMIT: i64 = 10_000;

/// WHERE nesting depth after which checking stops on that branch.
const MAX_WHERE_DEPTH: usize = 10;

/// SQL Server NVARCHAR length limit for inline string values.
const MAX_STRING_LEN: usize = 4000;

/// The validated scope plus accumulated warnings.
#[derive(Debug, Clone)]
pub struct Validation {
    pub scope: AliasScope,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate a query against the registry.
pub fn validate(query: &Query, registry: &Registry) -> Result<Validation, TranslateError> {
    let mut validator = Validator {
        registry,
        scope: build_root_scope(query, registry)?,
        diagnostics: Vec::new(),
    };
    validator.build_scope(query)?;
    validator.check_references(query)?;
    validator.check_limits(query);
    Ok(Validation {
        scope: validator.scope,
        diagnostics: validator.diagnostics,
    })
}

fn build_root_scope(query: &Query, registry: &Registry) -> Result<AliasScope, TranslateError> {
    if registry.table_for_entity(&query.root_entity).is_none() {
        return Err(TranslateError::UnknownEntity(query.root_entity.clone()));
    }
    let root_alias = registry.alias_for_entity(&query.root_entity);
    debug!(root = %query.root_entity, alias = %root_alias, "bound root entity");
    Ok(AliasScope::new(root_alias, query.root_entity.clone()))
}

struct Validator<'a> {
    registry: &'a Registry,
    scope: AliasScope,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    // =========================================================================
    // Phase 1: scope construction
    // =========================================================================

    fn build_scope(&mut self, query: &Query) -> Result<(), TranslateError> {
        for join in &query.joins {
            if join.alias.eq_ignore_ascii_case(self.scope.root_alias()) {
                return Err(TranslateError::validation(format!(
                    "JOIN clause: alias '{}' collides with the root alias '{}'",
                    join.alias,
                    self.scope.root_alias()
                )));
            }
            if self.scope.is_duplicate(&join.alias) {
                return Err(TranslateError::validation(format!(
                    "JOIN clause: alias '{}' is declared more than once",
                    join.alias
                )));
            }

            let parent_alias = join
                .path
                .parent
                .clone()
                .unwrap_or_else(|| self.scope.root_alias().to_string());
            let Some(parent_entity) = self.scope.entity_of(&parent_alias).map(str::to_string)
            else {
                return Err(TranslateError::validation(format!(
                    "JOIN clause: alias '{}' is not declared. Available aliases: {}",
                    parent_alias,
                    self.scope.available()
                )));
            };

            let nav_prop = &join.path.nav_prop;
            match resolve_nav_prop(self.registry, &parent_entity, nav_prop) {
                Some(nav) => {
                    debug!(
                        alias = %join.alias,
                        nav_prop = %nav_prop,
                        target = %nav.target_entity,
                        "bound join alias"
                    );
                    self.scope.bind(&join.alias, &nav.target_entity);
                    if let Some(filter) = join.entity_filter() {
                        if nav.is_polymorphic() || nav.resource_sub_type.is_some() {
                            if self.registry.is_resource_entity(filter) {
                                self.scope.rebind(&join.alias, filter);
                            }
                        } else {
                            self.diagnostics.push(Diagnostic::warning(
                                DiagnosticCode::E0403,
                                format!(
                                    "JOIN clause: type filter '{filter}' has no effect on \
                                     the non-polymorphic join '{}'",
                                    join.alias
                                ),
                            ));
                        }
                    }
                }
                None => {
                    // Bind anyway so later references produce clear "unknown
                    // field" warnings instead of cascading alias errors.
                    self.diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticCode::E0402,
                            format!(
                                "JOIN clause: navigation property '{nav_prop}' could not \
                                 be resolved on entity '{parent_entity}'; \
                                 the LEFT JOIN was skipped"
                            ),
                        )
                        .with_span(join.span)
                        .with_hint(format!(
                            "declare '{nav_prop}' in navigationPropertyOverrides \
                             for entity '{parent_entity}'"
                        )),
                    );
                    self.scope.bind(&join.alias, nav_prop);
                    self.scope.mark_unresolved(&join.alias);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Phase 2: reference checking
    // =========================================================================

    fn check_references(&mut self, query: &Query) -> Result<(), TranslateError> {
        for field in &query.select {
            self.check_field(field, "SELECT")?;
        }
        if let Some(expr) = &query.where_expr {
            self.check_where(expr, 1)?;
        }
        for sort in &query.order_by {
            self.check_field(&sort.field, "ORDER BY")?;
        }
        Ok(())
    }

    fn check_field(&mut self, field: &FieldRef, clause: &str) -> Result<(), TranslateError> {
        let (explicit_alias, column) = field.split();
        let alias = explicit_alias.unwrap_or(self.scope.root_alias());

        let Some(entity) = self.scope.entity_of(alias).map(str::to_string) else {
            return Err(TranslateError::validation(format!(
                "{clause} clause: alias '{alias}' in '{}' is not declared. \
                 Available aliases: {}",
                field.path(),
                self.scope.available()
            )));
        };

        if self.scope.is_unresolved(alias) {
            // The join warning already covers every reference through it.
            return Ok(());
        }

        if let Some(columns) = self.registry.columns_for_entity(&entity) {
            let rewritten = rewrite_column(self.registry, &entity, &column);
            let known =
                columns.iter().any(|c| c == &column) || columns.iter().any(|c| c == &rewritten);
            if !known {
                self.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::E0401,
                        format!(
                            "{clause} clause: column '{column}' was not found on entity \
                             '{entity}'; it may be a typo, a navigation property, or a \
                             computed field"
                        ),
                    )
                    .with_span(field.span),
                );
            }
        }
        Ok(())
    }

    fn check_where(&mut self, expr: &WhereExpr, depth: usize) -> Result<(), TranslateError> {
        if depth > MAX_WHERE_DEPTH {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::E0503,
                format!("WHERE clause: expression nested deeper than {MAX_WHERE_DEPTH} levels; deeper branches were not checked"),
            ));
            return Ok(());
        }
        match expr {
            WhereExpr::Compare { field, value, .. } => {
                self.check_field(field, "WHERE")?;
                if let Value::Str(text) = value {
                    if text.len() > MAX_STRING_LEN {
                        self.diagnostics.push(Diagnostic::warning(
                            DiagnosticCode::E0504,
                            format!(
                                "WHERE clause: string value for '{}' is {} characters long, \
                                 exceeding the {MAX_STRING_LEN}-character limit",
                                field.path(),
                                text.len()
                            ),
                        ));
                    }
                }
                Ok(())
            }
            WhereExpr::Logical { left, right, .. } => {
                self.check_where(left, depth + 1)?;
                self.check_where(right, depth + 1)
            }
            WhereExpr::Not(child) => self.check_where(child, depth + 1),
        }
    }

    // =========================================================================
    // Other checks
    // =========================================================================

    fn check_limits(&mut self, query: &Query) {
        if query.top > TOP_SANITY_LIMIT {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::E0502,
                format!(
                    "top {} exceeds the sanity limit of {TOP_SANITY_LIMIT}",
                    query.top
                ),
            ));
        }
        if query.is_empty() {
            self.diagnostics.push(Diagnostic::info(
                DiagnosticCode::E0505,
                "empty SQuery; the result selects every column of the root table",
            ));
        }
    }
}

/// Negative `top` is fatal; checked before scope work so the message does not
/// depend on the registry.
pub fn check_top(query: &Query) -> Result<(), TranslateError> {
    if query.top < 0 {
        return Err(TranslateError::validation(format!(
            "top must not be negative (got {})",
            query.top
        )));
    }
    Ok(())
}
