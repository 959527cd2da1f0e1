//! Resolution rules shared by the validator and the transformer.
//!
//! All resolution logic lives here as pure functions of the registry, so the
//! validator's verdicts and the transformer's SQL always agree.

use crate::registry::{qualify_table, JoinType, Registry, RESOURCES_TABLE};

/// A navigation property resolved to a concrete join shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNav {
    /// Bracket-qualified target table
    pub target_table: String,
    /// Entity bound to the join alias
    pub target_entity: String,
    /// Key column on the parent table
    pub local_key: String,
    /// Key column on the target table
    pub foreign_key: String,
    pub join_type: JoinType,
    /// Concrete subtype identifier for polymorphic resource joins
    pub resource_sub_type: Option<String>,
}

impl ResolvedNav {
    /// Whether the join targets the polymorphic resources table.
    pub fn is_polymorphic(&self) -> bool {
        self.target_table == qualify_table(RESOURCES_TABLE)
    }
}

/// Resolve `(parent_entity, nav_prop)` to a join shape.
///
/// Resolution order:
/// 1. an explicit `nav_overrides` declaration,
/// 2. foreign-key deduction from the `<nav_prop>_Id` column of the parent's
///    table,
/// 3. the shared resource navigation properties, when the parent is a
///    resource entity type.
///
/// FK convention defaults apply on any match: `local_key = "<nav_prop>_Id"`,
/// `foreign_key = "Id"`.
pub fn resolve_nav_prop(
    registry: &Registry,
    parent_entity: &str,
    nav_prop: &str,
) -> Option<ResolvedNav> {
    if let Some(nav) = registry.nav_override(parent_entity, nav_prop) {
        return Some(ResolvedNav {
            target_table: qualify_table(&nav.target_table),
            target_entity: nav
                .target_entity
                .clone()
                .unwrap_or_else(|| nav_prop.to_string()),
            local_key: nav
                .local_key
                .clone()
                .unwrap_or_else(|| default_local_key(nav_prop)),
            foreign_key: nav.foreign_key.clone().unwrap_or_else(|| "Id".to_string()),
            join_type: nav.join_type.unwrap_or_default(),
            resource_sub_type: nav.resource_sub_type.clone(),
        });
    }

    if let Some(parent_table) = registry.table_for_entity(parent_entity) {
        let local_key = default_local_key(nav_prop);
        if let Some(fk) = registry.fk_for_column(parent_table, &local_key) {
            let target_entity = registry
                .entity_for_table(&fk.table)
                .unwrap_or(nav_prop)
                .to_string();
            return Some(ResolvedNav {
                target_table: qualify_table(&fk.table),
                target_entity,
                local_key,
                foreign_key: fk.column.clone(),
                join_type: JoinType::Left,
                resource_sub_type: None,
            });
        }
    }

    if registry.is_resource_entity(parent_entity) {
        if let Some(nav) = registry.resource_nav_prop(nav_prop) {
            return Some(ResolvedNav {
                target_table: qualify_table(RESOURCES_TABLE),
                target_entity: nav.target_entity.clone(),
                local_key: nav
                    .local_key
                    .clone()
                    .unwrap_or_else(|| default_local_key(nav_prop)),
                foreign_key: nav.foreign_key.clone().unwrap_or_else(|| "Id".to_string()),
                join_type: JoinType::Left,
                resource_sub_type: None,
            });
        }
    }

    None
}

fn default_local_key(nav_prop: &str) -> String {
    format!("{nav_prop}_Id")
}

/// Rewrite a field reference to its physical column.
///
/// The rules apply in order, returning on the first match:
/// 1. per-entity column overrides,
/// 2. the resource column map (retrying with a trailing `_Id` stripped, so
///    `PresenceState_Id` can reuse the `PresenceState` FK column),
/// 3. global column renames,
/// 4. the `FooId` → `Foo_Id` foreign-key convention,
/// 5. pass through unchanged.
///
/// Pure: identical `(entity, field, registry)` inputs yield identical
/// outputs.
pub fn rewrite_column(registry: &Registry, entity: &str, field: &str) -> String {
    if let Some(column) = registry.column_override(entity, field) {
        return column.to_string();
    }

    if let Some(resource) = registry.resource_entity(entity) {
        if let Some(column) = resource.columns.get(field) {
            return column.clone();
        }
        if field.len() > 3 {
            if let Some(stripped) = field.strip_suffix("_Id") {
                if let Some(column) = resource.columns.get(stripped) {
                    return column.clone();
                }
            }
        }
    }

    if let Some(column) = registry.global_rename(field) {
        return column.to_string();
    }

    if field != "Id" && field.ends_with("Id") && !field.ends_with("_Id") {
        return format!("{}_Id", &field[..field.len() - 2]);
    }

    field.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NavOverride;

    fn registry() -> Registry {
        Registry::builder()
            .entity("AssignedSingleRole", "UP_AssignedSingleRoles")
            .entity("Role", "UP_SingleRoles")
            .entity("Directory_FR_User", "UR_Resources")
            .foreign_key("UP_AssignedSingleRoles", "Role_Id", "UP_SingleRoles", "Id")
            .global_rename("DisplayName", "DisplayName_L1")
            .resource_entity(
                "Directory_FR_User",
                2015,
                "dfru",
                [("DisplayName", "CC"), ("PresenceState", "C40")],
            )
            .nav_override(
                "Directory_FR_User",
                "PresenceState",
                NavOverride {
                    target_table: RESOURCES_TABLE.to_string(),
                    target_entity: Some("PresenceState".to_string()),
                    resource_sub_type: Some("PresenceState".to_string()),
                    ..Default::default()
                },
            )
            .resource_nav_prop("Owner", "Directory_FR_User")
            .build()
    }

    #[test]
    fn test_resolve_via_fk_deduction() {
        let registry = registry();
        let nav = resolve_nav_prop(&registry, "AssignedSingleRole", "Role").unwrap();
        assert_eq!(nav.target_table, "[dbo].[UP_SingleRoles]");
        assert_eq!(nav.target_entity, "Role");
        assert_eq!(nav.local_key, "Role_Id");
        assert_eq!(nav.foreign_key, "Id");
        assert_eq!(nav.join_type, JoinType::Left);
    }

    #[test]
    fn test_resolve_via_override() {
        let registry = registry();
        let nav = resolve_nav_prop(&registry, "Directory_FR_User", "PresenceState").unwrap();
        assert_eq!(nav.target_table, "[dbo].[UR_Resources]");
        assert_eq!(nav.local_key, "PresenceState_Id");
        assert_eq!(nav.resource_sub_type.as_deref(), Some("PresenceState"));
        assert!(nav.is_polymorphic());
    }

    #[test]
    fn test_resolve_via_resource_nav_prop() {
        let registry = registry();
        let nav = resolve_nav_prop(&registry, "Directory_FR_User", "Owner").unwrap();
        assert_eq!(nav.target_entity, "Directory_FR_User");
        assert_eq!(nav.local_key, "Owner_Id");
        // resource nav props only apply to resource entity parents
        assert!(resolve_nav_prop(&registry, "Role", "Owner").is_none());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = registry();
        assert!(resolve_nav_prop(&registry, "AssignedSingleRole", "FakeNavProp").is_none());
    }

    #[test]
    fn test_rewrite_entity_override_wins_over_resource_map() {
        let registry = Registry::builder()
            .entity("Directory_FR_User", RESOURCES_TABLE)
            .resource_entity("Directory_FR_User", 2015, "dfru", [("DisplayName", "CC")])
            .column_override("Directory_FR_User", "DisplayName", "CB")
            .global_rename("DisplayName", "DisplayName_L1")
            .build();

        // the per-entity override beats both the resource map and the
        // global rename
        assert_eq!(
            rewrite_column(&registry, "Directory_FR_User", "DisplayName"),
            "CB"
        );
        // other entities still fall through to the later rules
        assert_eq!(
            rewrite_column(&registry, "Role", "DisplayName"),
            "DisplayName_L1"
        );
    }

    #[test]
    fn test_rewrite_global_rename() {
        let registry = registry();
        assert_eq!(
            rewrite_column(&registry, "Role", "DisplayName"),
            "DisplayName_L1"
        );
    }

    #[test]
    fn test_rewrite_resource_map_wins_over_global() {
        let registry = registry();
        assert_eq!(
            rewrite_column(&registry, "Directory_FR_User", "DisplayName"),
            "CC"
        );
    }

    #[test]
    fn test_rewrite_resource_id_stripping() {
        let registry = registry();
        assert_eq!(
            rewrite_column(&registry, "Directory_FR_User", "PresenceState_Id"),
            "C40"
        );
    }

    #[test]
    fn test_rewrite_fk_convention() {
        let registry = registry();
        assert_eq!(rewrite_column(&registry, "Role", "PolicyId"), "Policy_Id");
        assert_eq!(rewrite_column(&registry, "Role", "Policy_Id"), "Policy_Id");
        assert_eq!(rewrite_column(&registry, "Role", "Id"), "Id");
    }

    #[test]
    fn test_rewrite_pass_through() {
        let registry = registry();
        assert_eq!(rewrite_column(&registry, "Role", "OwnerType"), "OwnerType");
    }
}
