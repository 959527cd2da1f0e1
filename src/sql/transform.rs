//! AST → SQL transformation.
//!
//! Walks the validated query, resolves joins and columns against the
//! registry, and feeds the [`SqlBuilder`]. Joins whose navigation property
//! did not resolve are elided; references through them degrade to warnings
//! so the rest of the statement still comes out.

use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticCode, TranslateError};
use crate::parser::{CompareOp, FieldRef, Query, Value, WhereExpr};
use crate::registry::{qualify_table, Registry, ENTITY_TYPES_TABLE};
use crate::semantic::{resolve_nav_prop, rewrite_column, Validation};

use super::builder::{BuiltSql, SqlBuilder};

/// Transformation result: the statement plus any warnings raised while
/// emitting it.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub built: BuiltSql,
    pub diagnostics: Vec<Diagnostic>,
}

/// Transform a validated query into SQL.
pub fn transform(
    query: &Query,
    registry: &Registry,
    validation: &Validation,
) -> Result<TransformOutcome, TranslateError> {
    let mut transformer = Transformer {
        registry,
        validation,
        builder: SqlBuilder::new(),
        diagnostics: Vec::new(),
    };
    transformer.emit_from(query)?;
    transformer.emit_joins(query)?;
    transformer.emit_select(query)?;
    transformer.emit_where(query)?;
    transformer.emit_order_by(query)?;
    transformer.builder.set_top(query.top);

    let built = transformer.builder.build()?;
    Ok(TransformOutcome {
        built,
        diagnostics: transformer.diagnostics,
    })
}

struct Transformer<'a> {
    registry: &'a Registry,
    validation: &'a Validation,
    builder: SqlBuilder,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Transformer<'a> {
    fn root_alias(&self) -> &str {
        self.validation.scope.root_alias()
    }

    // =========================================================================
    // FROM and the root entity-type filter
    // =========================================================================

    fn emit_from(&mut self, query: &Query) -> Result<(), TranslateError> {
        let root_entity = &query.root_entity;
        let table = self
            .registry
            .qualified_table_for_entity(root_entity)
            .ok_or_else(|| {
                TranslateError::internal(format!(
                    "validated root entity '{root_entity}' has no table binding"
                ))
            })?;
        let root_alias = self.root_alias().to_string();
        debug!(entity = %root_entity, table = %table, alias = %root_alias, "FROM");
        self.builder.set_from(&table, &root_alias);
        self.builder.bind_alias(&root_alias, root_entity);

        if let Some(resource) = self.registry.resource_entity(root_entity) {
            if resource.entity_type_id > 0 {
                self.builder.set_where_prefix(format!(
                    "{root_alias}.Type = {}",
                    resource.entity_type_id
                ));
            } else {
                // Unknown id: restrict through the entity-type table instead.
                self.builder.push_join(format!(
                    "INNER JOIN {} {root_alias}_et ON {root_alias}_et.Id = {root_alias}.Type \
                     AND {root_alias}_et.Identifier = '{root_entity}'",
                    qualify_table(ENTITY_TYPES_TABLE)
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // JOIN emission
    // =========================================================================

    fn emit_joins(&mut self, query: &Query) -> Result<(), TranslateError> {
        for join in &query.joins {
            let scope = &self.validation.scope;
            if scope.is_unresolved(&join.alias) {
                // The validator already warned; the join is elided.
                continue;
            }

            let parent_alias = join
                .path
                .parent
                .clone()
                .unwrap_or_else(|| self.root_alias().to_string());
            let parent_entity = scope.entity_of(&parent_alias).ok_or_else(|| {
                TranslateError::internal(format!(
                    "validated parent alias '{parent_alias}' is not in scope"
                ))
            })?;

            let nav = resolve_nav_prop(self.registry, parent_entity, &join.path.nav_prop)
                .ok_or_else(|| {
                    TranslateError::internal(format!(
                        "navigation property '{}' resolved during validation but not \
                         during transformation",
                        join.path.nav_prop
                    ))
                })?;

            let bound_entity = scope
                .entity_of(&join.alias)
                .unwrap_or(nav.target_entity.as_str())
                .to_string();
            self.builder.bind_alias(&join.alias, &bound_entity);

            let alias = &join.alias;
            let join_kw = nav.join_type.as_sql();
            let sub_type = if nav.is_polymorphic() || nav.resource_sub_type.is_some() {
                join.entity_filter()
                    .map(str::to_string)
                    .or_else(|| nav.resource_sub_type.clone())
            } else {
                None
            };

            debug!(
                alias = %alias,
                parent = %parent_alias,
                table = %nav.target_table,
                sub_type = ?sub_type,
                "JOIN"
            );

            match sub_type {
                Some(sub) => {
                    // Two joins so a type-filtered resource lookup stays
                    // polymorphic.
                    self.builder.push_join(format!(
                        "{join_kw} JOIN {} {alias}_et ON {alias}_et.Identifier = '{sub}'",
                        qualify_table(ENTITY_TYPES_TABLE)
                    ));
                    self.builder.push_join(format!(
                        "{join_kw} JOIN {} {alias} ON {parent_alias}.{} = {alias}.{} \
                         AND {alias}.Type = {alias}_et.Id",
                        nav.target_table, nav.local_key, nav.foreign_key
                    ));
                }
                None => {
                    self.builder.push_join(format!(
                        "{join_kw} JOIN {} {alias} ON {parent_alias}.{} = {alias}.{}",
                        nav.target_table, nav.local_key, nav.foreign_key
                    ));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Field resolution
    // =========================================================================

    /// Resolve a reference to `<alias>.<rewritten column>`. Returns `None`
    /// (with a warning) when the reference goes through an elided join.
    fn resolve_field(
        &mut self,
        field: &FieldRef,
        clause: &str,
    ) -> Result<Option<String>, TranslateError> {
        let (explicit_alias, column) = field.split();
        let alias = explicit_alias.unwrap_or(self.root_alias()).to_string();
        let scope = &self.validation.scope;

        if scope.is_unresolved(&alias) {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::E0404,
                format!(
                    "{clause} clause: '{}' was dropped because the JOIN for alias \
                     '{alias}' was skipped",
                    field.path()
                ),
            ));
            return Ok(None);
        }

        let entity = scope.entity_of(&alias).ok_or_else(|| {
            TranslateError::internal(format!("validated alias '{alias}' is not in scope"))
        })?;
        if !self.builder.alias_bound(&alias) {
            return Err(TranslateError::internal(format!(
                "alias '{alias}' referenced before its JOIN was emitted"
            )));
        }
        let rewritten = rewrite_column(self.registry, entity, &column);
        trace!(alias = %alias, field = %column, column = %rewritten, "rewrite");
        Ok(Some(format!("{alias}.{rewritten}")))
    }

    fn emit_select(&mut self, query: &Query) -> Result<(), TranslateError> {
        for field in &query.select {
            if let Some(expr) = self.resolve_field(field, "SELECT")? {
                self.builder.push_select(expr);
            }
        }
        Ok(())
    }

    fn emit_order_by(&mut self, query: &Query) -> Result<(), TranslateError> {
        for sort in &query.order_by {
            if let Some(expr) = self.resolve_field(&sort.field, "ORDER BY")? {
                self.builder
                    .push_order_by(format!("{expr} {}", sort.direction.as_sql()));
            }
        }
        Ok(())
    }

    // =========================================================================
    // WHERE emission
    // =========================================================================

    fn emit_where(&mut self, query: &Query) -> Result<(), TranslateError> {
        if let Some(expr) = &query.where_expr {
            let clause = self.emit_where_expr(expr)?;
            self.builder.set_where(clause);
        }
        Ok(())
    }

    fn emit_where_expr(&mut self, expr: &WhereExpr) -> Result<String, TranslateError> {
        match expr {
            WhereExpr::Compare { field, op, value } => self.emit_compare(field, *op, value),
            WhereExpr::Logical { left, op, right } => {
                let left = self.emit_where_expr(left)?;
                let right = self.emit_where_expr(right)?;
                Ok(format!("({left} {} {right})", op.as_sql()))
            }
            WhereExpr::Not(child) => {
                let child = self.emit_where_expr(child)?;
                Ok(format!("NOT ({child})"))
            }
        }
    }

    fn emit_compare(
        &mut self,
        field: &FieldRef,
        op: CompareOp,
        value: &Value,
    ) -> Result<String, TranslateError> {
        let Some(resolved) = self.resolve_field(field, "WHERE")? else {
            // Keep the surrounding AND/OR tree well-formed.
            return Ok("1 = 1".to_string());
        };

        if value.is_null() {
            return Ok(match op {
                CompareOp::Eq => format!("{resolved} IS NULL"),
                CompareOp::Ne => format!("{resolved} IS NOT NULL"),
                other => {
                    let param = self.builder.next_param(Value::Null);
                    format!("{resolved} {} {param}", other.as_sql())
                }
            });
        }

        if op.is_like() {
            let pattern = format!("%{}%", like_text(value));
            let param = self.builder.next_param(Value::Str(pattern));
            return Ok(format!("{resolved} LIKE {param}"));
        }

        let param_value = match value {
            Value::Bool(true) => Value::Int(1),
            Value::Bool(false) => Value::Int(0),
            other => other.clone(),
        };
        let param = self.builder.next_param(param_value);
        Ok(format!("{resolved} {} {param}", op.as_sql()))
    }
}

/// Raw text of a value inside a LIKE pattern.
fn like_text(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
    }
}
