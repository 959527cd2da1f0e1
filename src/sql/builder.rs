//! Transient SQL statement builder.
//!
//! The transformer pushes resolved fragments in, then [`SqlBuilder::build`]
//! assembles the statement. Values are first parameterized (`@pN`) and then
//! inlined as literals; the parameter table is returned alongside for caller
//! inspection. Keeping the WHERE emitter free of literal-escaping concerns
//! confines all escaping to [`format_literal`].

use indexmap::IndexMap;

use crate::diagnostics::TranslateError;
use crate::parser::Value;

/// Format a value as a SQL Server literal.
///
/// Strings are single-quoted with embedded `'` doubled; booleans become
/// `1`/`0`.
pub fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Str(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// The assembled statement plus its parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSql {
    /// Final SQL with all placeholders inlined as literals
    pub sql: String,
    /// `@pN` → value, in emission order
    pub parameters: IndexMap<String, Value>,
}

/// Per-translation statement state.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    select: Vec<String>,
    from: Option<(String, String)>,
    joins: Vec<String>,
    /// Entity-type filter prepended to the user WHERE
    where_prefix: Option<String>,
    where_clause: Option<String>,
    order_by: Vec<String>,
    top: i64,
    offset: u64,
    limit: u64,
    params: IndexMap<String, Value>,
    param_counter: usize,
    alias_entities: IndexMap<String, String>,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FROM target (qualified table + alias).
    pub fn set_from(&mut self, table: impl Into<String>, alias: impl Into<String>) {
        self.from = Some((table.into(), alias.into()));
    }

    /// Append a pre-built JOIN fragment; order is preserved.
    pub fn push_join(&mut self, join: impl Into<String>) {
        self.joins.push(join.into());
    }

    /// Append a resolved select expression.
    pub fn push_select(&mut self, expr: impl Into<String>) {
        self.select.push(expr.into());
    }

    /// Append a resolved `ORDER BY` item.
    pub fn push_order_by(&mut self, expr: impl Into<String>) {
        self.order_by.push(expr.into());
    }

    /// Set the user WHERE fragment.
    pub fn set_where(&mut self, clause: impl Into<String>) {
        self.where_clause = Some(clause.into());
    }

    /// Prepend an entity-type filter; combined as `<filter> AND (<user>)`
    /// when a user WHERE is present.
    pub fn set_where_prefix(&mut self, filter: impl Into<String>) {
        self.where_prefix = Some(filter.into());
    }

    pub fn set_top(&mut self, top: i64) {
        self.top = top;
    }

    /// Paging; ignored while `top` is set.
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    /// Record which entity an alias refers to.
    pub fn bind_alias(&mut self, alias: impl Into<String>, entity: impl Into<String>) {
        self.alias_entities.insert(alias.into(), entity.into());
    }

    /// Whether an alias has been bound.
    pub fn alias_bound(&self, alias: &str) -> bool {
        self.alias_entities.contains_key(alias)
    }

    /// Alias → entity bindings in emission order.
    pub fn alias_entities(&self) -> &IndexMap<String, String> {
        &self.alias_entities
    }

    /// Allocate the next `@pN` placeholder for a value.
    pub fn next_param(&mut self, value: Value) -> String {
        self.param_counter += 1;
        let name = format!("@p{}", self.param_counter);
        self.params.insert(name.clone(), value);
        name
    }

    fn combined_where(&self) -> Option<String> {
        match (&self.where_prefix, &self.where_clause) {
            (Some(prefix), Some(user)) => Some(format!("{prefix} AND ({user})")),
            (Some(prefix), None) => Some(prefix.clone()),
            (None, Some(user)) => Some(user.clone()),
            (None, None) => None,
        }
    }

    /// Assemble the statement with `@pN` placeholders still in place.
    pub fn assemble(&self) -> Result<String, TranslateError> {
        let Some((table, alias)) = &self.from else {
            return Err(TranslateError::internal(
                "FROM clause was never set on the builder",
            ));
        };

        let mut sql = String::from("SELECT ");
        if self.top > 0 {
            sql.push_str(&format!("TOP {} ", self.top));
        }
        if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(", "));
        }
        sql.push_str(&format!(" FROM {table} {alias}"));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if let Some(clause) = self.combined_where() {
            sql.push_str(&format!(" WHERE {clause}"));
        }

        let paging = self.top == 0 && (self.offset > 0 || self.limit > 0);
        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        } else if paging {
            // SQL Server requires ORDER BY for OFFSET/FETCH
            sql.push_str(" ORDER BY (SELECT NULL)");
        }
        if paging {
            sql.push_str(&format!(" OFFSET {} ROWS", self.offset));
            if self.limit > 0 {
                sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", self.limit));
            }
        }

        Ok(sql)
    }

    /// Assemble and inline every placeholder as a literal.
    ///
    /// Substitution is longest-key-first so `@p10` is never shadowed by
    /// `@p1`.
    pub fn build(self) -> Result<BuiltSql, TranslateError> {
        let mut sql = self.assemble()?;

        let mut names: Vec<&String> = self.params.keys().collect();
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        for name in names {
            let literal = format_literal(&self.params[name.as_str()]);
            sql = sql.replace(name.as_str(), &literal);
        }

        Ok(BuiltSql {
            sql,
            parameters: self.params,
        })
    }
}
