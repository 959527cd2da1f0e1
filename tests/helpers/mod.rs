//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use squery::registry::NavOverride;
use squery::Registry;

/// The identity-management fixture used across the suites.
///
/// Plain tables (categories, roles, policies), one resource entity type with
/// a known id, and one declared resource sub-type navigation property.
pub fn fixture_registry() -> Registry {
    Registry::builder()
        .entity("Category", "UP_Categories")
        .alias("Category", "cat")
        .columns(
            "UP_Categories",
            ["Id", "Identifier", "DisplayName_L1", "Description_L1", "ParentId"],
        )
        .column_override("Category", "Description", "Description_L1")
        .entity("AssignedSingleRole", "UP_AssignedSingleRoles")
        .alias("AssignedSingleRole", "asr")
        .columns(
            "UP_AssignedSingleRoles",
            ["Id", "OwnerType", "IsIndirect", "WorkflowState", "Role_Id"],
        )
        .entity("Role", "UP_SingleRoles")
        .alias("Role", "r")
        .columns("UP_SingleRoles", ["Id", "DisplayName_L1", "Policy_Id"])
        .entity("Policy", "UP_Policies")
        .columns(
            "UP_Policies",
            ["Id", "CommentActivationOnApproveInReview"],
        )
        .foreign_key("UP_AssignedSingleRoles", "Role_Id", "UP_SingleRoles", "Id")
        .foreign_key("UP_SingleRoles", "Policy_Id", "UP_Policies", "Id")
        .global_rename("DisplayName", "DisplayName_L1")
        .entity("Directory_FR_User", "UR_Resources")
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
                target_table: "UR_Resources".to_string(),
                target_entity: Some("PresenceState".to_string()),
                resource_sub_type: Some("PresenceState".to_string()),
                ..Default::default()
            },
        )
        .build()
}

/// The same fixture expressed as a JSON document, proving that any loader
/// able to produce the registry shape can hand one over.
pub fn fixture_registry_from_json() -> Registry {
    let json = r#"{
        "entity_to_table": {
            "Category": "UP_Categories",
            "AssignedSingleRole": "UP_AssignedSingleRoles",
            "Role": "UP_SingleRoles",
            "Policy": "UP_Policies",
            "Directory_FR_User": "UR_Resources"
        },
        "table_to_entity": {
            "UP_Categories": "Category",
            "UP_AssignedSingleRoles": "AssignedSingleRole",
            "UP_SingleRoles": "Role",
            "UP_Policies": "Policy",
            "UR_Resources": "Directory_FR_User"
        },
        "entity_alias": {
            "Category": "cat",
            "AssignedSingleRole": "asr",
            "Role": "r"
        },
        "table_columns": {
            "UP_Categories": ["Id", "Identifier", "DisplayName_L1", "Description_L1", "ParentId"]
        },
        "entity_column_overrides": {
            "Category": { "Description": "Description_L1" }
        },
        "table_fks": {
            "UP_AssignedSingleRoles": {
                "Role_Id": { "table": "UP_SingleRoles", "column": "Id" }
            },
            "UP_SingleRoles": {
                "Policy_Id": { "table": "UP_Policies", "column": "Id" }
            }
        },
        "nav_overrides": {
            "Directory_FR_User": {
                "PresenceState": {
                    "target_table": "UR_Resources",
                    "target_entity": "PresenceState",
                    "resource_sub_type": "PresenceState"
                }
            }
        },
        "global_column_renames": { "DisplayName": "DisplayName_L1" },
        "resource_entity_types": {
            "Directory_FR_User": {
                "entity_type_id": 2015,
                "alias": "dfru",
                "columns": { "DisplayName": "CC", "PresenceState": "C40" }
            }
        }
    }"#;
    serde_json::from_str(json).expect("fixture JSON is valid")
}
