//! The SQuery abstract syntax tree.
//!
//! Plain owned data: the WHERE tree and values are tagged variants, joins and
//! field references carry their source spans for diagnostics.

use serde::{Deserialize, Serialize};

use crate::base::TextRange;

// ============================================================================
// Field references
// ============================================================================

/// A possibly dotted identifier (`Id`, `r.DisplayName`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub parts: Vec<String>,
    pub span: TextRange,
}

impl FieldRef {
    pub fn new(parts: Vec<String>, span: TextRange) -> Self {
        Self { parts, span }
    }

    /// The dotted path as written.
    pub fn path(&self) -> String {
        self.parts.join(".")
    }

    /// Split into `(explicit alias, column)`. A bare identifier has no
    /// explicit alias and resolves against the root alias.
    pub fn split(&self) -> (Option<&str>, String) {
        if self.parts.len() > 1 {
            (Some(self.parts[0].as_str()), self.parts[1..].join("."))
        } else {
            (None, self.parts.first().cloned().unwrap_or_default())
        }
    }
}

// ============================================================================
// Joins
// ============================================================================

/// The entity-path of a join: plain `NavProp`, chained `alias.NavProp`, or
/// colon-qualified `NavProp:TypeName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPath {
    /// Alias of the parent table for chained joins; the root when absent
    pub parent: Option<String>,
    /// Navigation-property name with any `:Suffix` stripped
    pub nav_prop: String,
    /// The stripped `:Suffix` type filter, when present
    pub type_suffix: Option<String>,
}

impl JoinPath {
    /// Build from dotted segments, splitting off a chained parent alias and
    /// the colon type suffix.
    pub fn from_segments(segments: Vec<String>) -> Self {
        let (parent, raw_nav) = if segments.len() > 1 {
            (Some(segments[0].clone()), segments[1..].join("."))
        } else {
            (None, segments.into_iter().next().unwrap_or_default())
        };
        let (nav_prop, type_suffix) = match raw_nav.split_once(':') {
            Some((nav, suffix)) => (nav.to_string(), Some(suffix.to_string())),
            None => (raw_nav, None),
        };
        Self {
            parent,
            nav_prop,
            type_suffix,
        }
    }
}

/// One `join` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub path: JoinPath,
    /// `of type TypeFilter`, when present
    pub type_filter: Option<String>,
    pub alias: String,
    pub span: TextRange,
}

impl Join {
    /// The entity-type filter from either syntax (`of type T` wins over the
    /// colon suffix).
    pub fn entity_filter(&self) -> Option<&str> {
        self.type_filter
            .as_deref()
            .or(self.path.type_suffix.as_deref())
    }
}

// ============================================================================
// WHERE tree
// ============================================================================

/// Comparison operators of the WHERE grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// `%=`
    Like,
    /// `%=%`
    LikeBoth,
}

impl CompareOp {
    /// SQL spelling; both like-operators emit `LIKE`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like | Self::LikeBoth => "LIKE",
        }
    }

    /// Whether this operator emits a LIKE pattern parameter.
    pub fn is_like(&self) -> bool {
        matches!(self, Self::Like | Self::LikeBoth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A literal value in a comparison.
///
/// Numbers keep integer precision when no decimal point is present, so large
/// 64-bit identifiers survive the round trip to SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// The WHERE expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereExpr {
    Compare {
        field: FieldRef,
        op: CompareOp,
        value: Value,
    },
    Logical {
        left: Box<WhereExpr>,
        op: LogicalOp,
        right: Box<WhereExpr>,
    },
    Not(Box<WhereExpr>),
}

// ============================================================================
// Sorting and the query root
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `order by` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: FieldRef,
    pub direction: SortDirection,
}

/// The parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The root entity; becomes the FROM target
    pub root_entity: String,
    pub joins: Vec<Join>,
    /// 0 means absent; negative values are rejected by the validator
    pub top: i64,
    pub select: Vec<FieldRef>,
    pub where_expr: Option<WhereExpr>,
    pub order_by: Vec<Sort>,
}

impl Query {
    /// A query with no clauses at all (produces `SELECT *`).
    pub fn new(root_entity: impl Into<String>) -> Self {
        Self {
            root_entity: root_entity.into(),
            joins: Vec::new(),
            top: 0,
            select: Vec::new(),
            where_expr: None,
            order_by: Vec::new(),
        }
    }

    /// Whether the SQuery contained no clauses.
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
            && self.top == 0
            && self.select.is_empty()
            && self.where_expr.is_none()
            && self.order_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn empty_span() -> TextRange {
        TextRange::empty(TextSize::new(0))
    }

    #[test]
    fn test_field_ref_split() {
        let bare = FieldRef::new(vec!["Id".into()], empty_span());
        assert_eq!(bare.split(), (None, "Id".to_string()));

        let dotted = FieldRef::new(vec!["r".into(), "DisplayName".into()], empty_span());
        assert_eq!(dotted.split(), (Some("r"), "DisplayName".to_string()));
    }

    #[test]
    fn test_join_path_plain() {
        let path = JoinPath::from_segments(vec!["Role".into()]);
        assert_eq!(path.parent, None);
        assert_eq!(path.nav_prop, "Role");
        assert_eq!(path.type_suffix, None);
    }

    #[test]
    fn test_join_path_chained() {
        let path = JoinPath::from_segments(vec!["r".into(), "Policy".into()]);
        assert_eq!(path.parent.as_deref(), Some("r"));
        assert_eq!(path.nav_prop, "Policy");
    }

    #[test]
    fn test_join_path_colon_qualified() {
        let path = JoinPath::from_segments(vec!["Owner:Directory_FR_User".into()]);
        assert_eq!(path.parent, None);
        assert_eq!(path.nav_prop, "Owner");
        assert_eq!(path.type_suffix.as_deref(), Some("Directory_FR_User"));
    }

    #[test]
    fn test_entity_filter_precedence() {
        let join = Join {
            path: JoinPath::from_segments(vec!["Owner:Directory_FR_User".into()]),
            type_filter: Some("Directory_AD_User".into()),
            alias: "o".into(),
            span: empty_span(),
        };
        assert_eq!(join.entity_filter(), Some("Directory_AD_User"));
    }

    #[test]
    fn test_query_is_empty() {
        assert!(Query::new("Category").is_empty());
        let mut query = Query::new("Category");
        query.top = 5;
        assert!(!query.is_empty());
    }
}
