//! Schema registry: the read-only metadata the validator and transformer
//! consume.
//!
//! The registry is built once at process start by external loaders (CSV,
//! database introspection, swagger ingestion — not this crate's concern) and
//! is immutable afterwards. Any loader able to produce this shape is
//! acceptable; the types derive serde so a JSON document is one such shape.
//! Many translations may share one registry concurrently without
//! synchronization; live reload is an atomic `Arc` swap owned by the
//! embedder.
//!
//! All entity, alias, and column lookups are case-sensitive.

mod builder;
mod types;

pub use builder::RegistryBuilder;
pub use types::{ForeignKey, JoinType, NavOverride, ResourceEntityType, ResourceNavProp};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The polymorphic resources table shared by all resource entity types.
pub const RESOURCES_TABLE: &str = "UR_Resources";

/// The entity-type lookup table used for polymorphic filters.
pub const ENTITY_TYPES_TABLE: &str = "UM_EntityTypes";

/// Read-only schema metadata.
///
/// Invariant: `entity_to_table` and `table_to_entity` are mutual inverses;
/// [`RegistryBuilder`] maintains this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Registry {
    pub(crate) entity_to_table: FxHashMap<String, String>,
    pub(crate) table_to_entity: FxHashMap<String, String>,
    pub(crate) entity_alias: FxHashMap<String, String>,
    pub(crate) table_columns: FxHashMap<String, Vec<String>>,
    pub(crate) table_fks: FxHashMap<String, FxHashMap<String, ForeignKey>>,
    pub(crate) nav_overrides: FxHashMap<String, FxHashMap<String, NavOverride>>,
    pub(crate) global_column_renames: FxHashMap<String, String>,
    pub(crate) entity_column_overrides: FxHashMap<String, FxHashMap<String, String>>,
    pub(crate) resource_entity_types: FxHashMap<String, ResourceEntityType>,
    pub(crate) resource_nav_props: FxHashMap<String, ResourceNavProp>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Raw table name for an entity.
    pub fn table_for_entity(&self, entity: &str) -> Option<&str> {
        self.entity_to_table.get(entity).map(String::as_str)
    }

    /// Bracket-qualified table name for an entity.
    pub fn qualified_table_for_entity(&self, entity: &str) -> Option<String> {
        self.table_for_entity(entity).map(qualify_table)
    }

    /// Entity bound to a raw table name.
    pub fn entity_for_table(&self, table: &str) -> Option<&str> {
        self.table_to_entity.get(table).map(String::as_str)
    }

    /// Short SQL alias for an entity.
    ///
    /// Falls back to the lowercased initials of the CamelCase/underscore
    /// segments when no alias is declared (`AssignedSingleRole` → `asr`).
    pub fn alias_for_entity(&self, entity: &str) -> String {
        if let Some(alias) = self.entity_alias.get(entity) {
            return alias.clone();
        }
        if let Some(resource) = self.resource_entity_types.get(entity) {
            if !resource.alias.is_empty() {
                return resource.alias.clone();
            }
        }
        derived_alias(entity)
    }

    /// Column set of a raw table, when known.
    pub fn columns_for_table(&self, table: &str) -> Option<&[String]> {
        self.table_columns.get(table).map(Vec::as_slice)
    }

    /// Column set of an entity's table, when known.
    pub fn columns_for_entity(&self, entity: &str) -> Option<&[String]> {
        self.table_for_entity(entity)
            .and_then(|table| self.columns_for_table(table))
    }

    /// Declared foreign key for a column of a raw table.
    pub fn fk_for_column(&self, table: &str, column: &str) -> Option<&ForeignKey> {
        self.table_fks.get(table)?.get(column)
    }

    /// Explicit navigation-property declaration for (entity, nav-prop).
    pub fn nav_override(&self, entity: &str, nav_prop: &str) -> Option<&NavOverride> {
        self.nav_overrides.get(entity)?.get(nav_prop)
    }

    /// Global column rename for a field name.
    pub fn global_rename(&self, field: &str) -> Option<&str> {
        self.global_column_renames.get(field).map(String::as_str)
    }

    /// Per-entity column override for a field name.
    pub fn column_override(&self, entity: &str, field: &str) -> Option<&str> {
        self.entity_column_overrides
            .get(entity)?
            .get(field)
            .map(String::as_str)
    }

    /// Resource entity-type metadata, when the entity is one.
    pub fn resource_entity(&self, entity: &str) -> Option<&ResourceEntityType> {
        self.resource_entity_types.get(entity)
    }

    /// Whether the entity is a concrete subtype of the resources table.
    pub fn is_resource_entity(&self, entity: &str) -> bool {
        self.resource_entity_types.contains_key(entity)
    }

    /// Navigation property shared by all resource entity types.
    pub fn resource_nav_prop(&self, nav_prop: &str) -> Option<&ResourceNavProp> {
        self.resource_nav_props.get(nav_prop)
    }
}

/// Wrap a raw table name as `[dbo].[…]` unless it already carries a schema
/// prefix.
pub fn qualify_table(raw: &str) -> String {
    if raw.starts_with('[') {
        raw.to_string()
    } else {
        format!("[dbo].[{raw}]")
    }
}

/// Physical column name for a base-32 attribute index (`0` → `C0`,
/// `12` → `CC`, `32` → `C10`, `128` → `C40`).
pub fn c_column(index: u32) -> String {
    const DIGITS: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";
    let mut index = index;
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(index % 32) as usize] as char);
        index /= 32;
        if index == 0 {
            break;
        }
    }
    let mut name = String::with_capacity(1 + digits.len());
    name.push('C');
    name.extend(digits.into_iter().rev());
    name
}

/// Lowercased initials of the CamelCase/underscore segments of an entity
/// name.
fn derived_alias(entity: &str) -> String {
    let mut alias = String::new();
    let mut boundary = true;
    for ch in entity.chars() {
        if ch == '_' {
            boundary = true;
        } else if boundary || ch.is_ascii_uppercase() {
            alias.extend(ch.to_lowercase());
            boundary = false;
        }
    }
    if alias.is_empty() {
        alias = entity.to_lowercase();
    }
    alias
}
