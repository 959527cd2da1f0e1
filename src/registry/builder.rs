//! Fluent construction of a [`Registry`].

use rustc_hash::FxHashMap;

use super::types::{ForeignKey, NavOverride, ResourceEntityType, ResourceNavProp};
use super::Registry;

/// Builder for [`Registry`].
///
/// Maintains the `entity_to_table` / `table_to_entity` inverse invariant; a
/// later `entity` call for the same entity replaces the earlier binding in
/// both directions.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Bind an entity to its raw table (both directions).
    pub fn entity(mut self, entity: impl Into<String>, table: impl Into<String>) -> Self {
        let entity = entity.into();
        let table = table.into();
        if let Some(previous) = self
            .registry
            .entity_to_table
            .insert(entity.clone(), table.clone())
        {
            self.registry.table_to_entity.remove(&previous);
        }
        self.registry.table_to_entity.insert(table, entity);
        self
    }

    /// Declare the short SQL alias for an entity.
    pub fn alias(mut self, entity: impl Into<String>, alias: impl Into<String>) -> Self {
        self.registry.entity_alias.insert(entity.into(), alias.into());
        self
    }

    /// Declare the column set of a raw table.
    pub fn columns<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry
            .table_columns
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Declare a foreign key on a raw table.
    pub fn foreign_key(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        self.registry
            .table_fks
            .entry(table.into())
            .or_default()
            .insert(
                column.into(),
                ForeignKey::new(referenced_table, referenced_column),
            );
        self
    }

    /// Declare an explicit navigation property for (entity, nav-prop).
    pub fn nav_override(
        mut self,
        entity: impl Into<String>,
        nav_prop: impl Into<String>,
        nav: NavOverride,
    ) -> Self {
        self.registry
            .nav_overrides
            .entry(entity.into())
            .or_default()
            .insert(nav_prop.into(), nav);
        self
    }

    /// Declare a global field → column rename.
    pub fn global_rename(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.registry
            .global_column_renames
            .insert(field.into(), column.into());
        self
    }

    /// Declare a per-entity field → column override.
    pub fn column_override(
        mut self,
        entity: impl Into<String>,
        field: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.registry
            .entity_column_overrides
            .entry(entity.into())
            .or_default()
            .insert(field.into(), column.into());
        self
    }

    /// Declare a resource entity type with its id, alias, and column map.
    pub fn resource_entity(
        mut self,
        entity: impl Into<String>,
        entity_type_id: i64,
        alias: impl Into<String>,
        columns: impl IntoIterator<Item = (&'static str, &'static str)>,
    ) -> Self {
        let entity = entity.into();
        let columns: FxHashMap<String, String> = columns
            .into_iter()
            .map(|(prop, col)| (prop.to_string(), col.to_string()))
            .collect();
        self.registry.resource_entity_types.insert(
            entity,
            ResourceEntityType {
                entity_type_id,
                alias: alias.into(),
                columns,
            },
        );
        self
    }

    /// Declare a navigation property shared by all resource entity types.
    pub fn resource_nav_prop(
        mut self,
        nav_prop: impl Into<String>,
        target_entity: impl Into<String>,
    ) -> Self {
        self.registry.resource_nav_props.insert(
            nav_prop.into(),
            ResourceNavProp {
                target_entity: target_entity.into(),
                local_key: None,
                foreign_key: None,
            },
        );
        self
    }

    /// Finish building.
    pub fn build(self) -> Registry {
        self.registry
    }
}
