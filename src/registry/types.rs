//! Value types stored in the schema registry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A declared foreign key: local column → referenced table/column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced raw table name
    pub table: String,
    /// Referenced column name
    pub column: String,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// SQL join flavor emitted for a navigation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Left,
    Inner,
}

impl JoinType {
    /// SQL keyword for this join flavor.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Inner => "INNER",
        }
    }
}

/// An explicit navigation-property declaration.
///
/// Overrides take precedence over foreign-key deduction. Any field left
/// `None` falls back to the FK convention defaults (`<nav>_Id` / `Id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavOverride {
    /// Target table; wrapped `[dbo].[…]` on read when no schema prefix is present
    pub target_table: String,
    /// Entity bound to the join alias; defaults to the nav-prop name
    pub target_entity: Option<String>,
    /// Local key column on the parent table
    pub local_key: Option<String>,
    /// Key column on the target table
    pub foreign_key: Option<String>,
    /// Join flavor; defaults to LEFT
    pub join_type: Option<JoinType>,
    /// Concrete subtype identifier for polymorphic resource joins
    pub resource_sub_type: Option<String>,
}

/// Metadata for a concrete subtype of the polymorphic resources table.
///
/// Attribute storage uses base-32-indexed `C…` columns per subtype; the
/// `columns` map translates entity properties to their physical column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceEntityType {
    /// Numeric entity-type id; 0 means unknown at registry-build time
    pub entity_type_id: i64,
    /// Short SQL alias for the entity
    pub alias: String,
    /// Property name → physical `C…` column
    pub columns: FxHashMap<String, String>,
}

/// A navigation property available on every resource entity type.
///
/// The target table is always the polymorphic resources table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceNavProp {
    /// Entity bound to the join alias
    pub target_entity: String,
    /// Local key column; defaults to `<nav>_Id`
    pub local_key: Option<String>,
    /// Key column on the resources table; defaults to `Id`
    pub foreign_key: Option<String>,
}
