//! End-to-end scenarios over the identity-management fixture.

mod helpers;

use helpers::fixture_registry;
use squery::translate_squery;

#[test]
fn test_simple_select_is_null_order_by() {
    let result = translate_squery(
        "select Id, Identifier, DisplayName, ParentId where ParentId=null order by Id asc",
        "Category",
        &fixture_registry(),
    )
    .unwrap();

    assert_eq!(
        result.sql,
        "SELECT cat.Id, cat.Identifier, cat.DisplayName_L1, cat.ParentId \
         FROM [dbo].[UP_Categories] cat \
         WHERE cat.ParentId IS NULL \
         ORDER BY cat.Id ASC"
    );
    assert!(result.parameters.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_chained_join_or_top() {
    let result = translate_squery(
        "join Role r join r.Policy rp top 5 \
         select Id, r.DisplayName, rp.CommentActivationOnApproveInReview \
         where ((OwnerType=2015 and IsIndirect=false) AND (WorkflowState=8 OR WorkflowState=9)) \
         order by Id desc",
        "AssignedSingleRole",
        &fixture_registry(),
    )
    .unwrap();

    let sql = &result.sql;
    assert!(sql.starts_with("SELECT TOP 5 "), "{sql}");
    assert!(sql.contains("FROM [dbo].[UP_AssignedSingleRoles] asr"), "{sql}");
    assert!(
        sql.contains("LEFT JOIN [dbo].[UP_SingleRoles] r ON asr.Role_Id = r.Id"),
        "{sql}"
    );
    assert!(
        sql.contains("LEFT JOIN [dbo].[UP_Policies] rp ON r.Policy_Id = rp.Id"),
        "{sql}"
    );
    assert!(sql.contains("r.DisplayName_L1"), "{sql}");
    assert!(sql.contains("rp.CommentActivationOnApproveInReview"), "{sql}");
    assert!(
        sql.contains("asr.OwnerType = 2015 AND asr.IsIndirect = 0"),
        "{sql}"
    );
    assert!(
        sql.contains("(asr.WorkflowState = 8 OR asr.WorkflowState = 9)"),
        "{sql}"
    );
    assert!(sql.ends_with("ORDER BY asr.Id DESC"), "{sql}");
}

#[test]
fn test_resource_root_with_known_type_id() {
    let result = translate_squery(
        "select Id where PresenceState_Id = 42",
        "Directory_FR_User",
        &fixture_registry(),
    )
    .unwrap();

    let sql = &result.sql;
    assert!(sql.contains("FROM [dbo].[UR_Resources] dfru"), "{sql}");
    assert!(sql.contains("WHERE dfru.Type = 2015 AND (dfru.C40 = 42)"), "{sql}");
    assert!(!sql.contains("INNER JOIN [dbo].[UM_EntityTypes]"), "{sql}");
}

#[test]
fn test_resource_root_with_unknown_type_id() {
    let registry = squery::Registry::builder()
        .entity("Directory_FR_User", "UR_Resources")
        .resource_entity("Directory_FR_User", 0, "dfru", [("DisplayName", "CC")])
        .build();

    let result = translate_squery("select Id where Id > 7", "Directory_FR_User", &registry).unwrap();

    let sql = &result.sql;
    assert!(
        sql.contains(
            "INNER JOIN [dbo].[UM_EntityTypes] dfru_et \
             ON dfru_et.Id = dfru.Type AND dfru_et.Identifier = 'Directory_FR_User'"
        ),
        "{sql}"
    );
    // the entity-type join and the user WHERE stay independent
    assert!(sql.contains("WHERE dfru.Id > 7"), "{sql}");
    assert!(!sql.contains("Type = 0"), "{sql}");
}

#[test]
fn test_resource_sub_type_join() {
    let result = translate_squery(
        "join PresenceState ps select Id, ps.Id",
        "Directory_FR_User",
        &fixture_registry(),
    )
    .unwrap();

    let sql = &result.sql;
    let entity_type_join = sql
        .find("LEFT JOIN [dbo].[UM_EntityTypes] ps_et ON ps_et.Identifier = 'PresenceState'")
        .unwrap_or_else(|| panic!("entity-type join missing in {sql}"));
    let resource_join = sql
        .find(
            "LEFT JOIN [dbo].[UR_Resources] ps \
             ON dfru.PresenceState_Id = ps.Id AND ps.Type = ps_et.Id",
        )
        .unwrap_or_else(|| panic!("resource join missing in {sql}"));
    assert!(entity_type_join < resource_join, "join order is wrong: {sql}");
}

#[test]
fn test_entity_column_override_applies() {
    let result = translate_squery(
        "select Id, Description order by Description desc",
        "Category",
        &fixture_registry(),
    )
    .unwrap();

    assert_eq!(
        result.sql,
        "SELECT cat.Id, cat.Description_L1 \
         FROM [dbo].[UP_Categories] cat \
         ORDER BY cat.Description_L1 DESC"
    );
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn test_of_type_filter_on_resource_join() {
    let result = translate_squery(
        "join PresenceState of type Directory_FR_User ps select Id, ps.DisplayName",
        "Directory_FR_User",
        &fixture_registry(),
    )
    .unwrap();

    let sql = &result.sql;
    // the filter overrides the declared sub-type in the entity-type join
    let entity_type_join = sql
        .find("LEFT JOIN [dbo].[UM_EntityTypes] ps_et ON ps_et.Identifier = 'Directory_FR_User'")
        .unwrap_or_else(|| panic!("entity-type join missing in {sql}"));
    let resource_join = sql
        .find(
            "LEFT JOIN [dbo].[UR_Resources] ps \
             ON dfru.PresenceState_Id = ps.Id AND ps.Type = ps_et.Id",
        )
        .unwrap_or_else(|| panic!("resource join missing in {sql}"));
    assert!(entity_type_join < resource_join, "join order is wrong: {sql}");
    // the alias is rebound to the filter entity, so its column map applies
    assert!(sql.contains("SELECT dfru.Id, ps.CC"), "{sql}");
}

#[test]
fn test_colon_suffix_filter_matches_of_type_form() {
    let registry = fixture_registry();
    let of_type = translate_squery(
        "join PresenceState of type Directory_FR_User ps select Id, ps.DisplayName",
        "Directory_FR_User",
        &registry,
    )
    .unwrap();
    let colon_suffix = translate_squery(
        "join PresenceState:Directory_FR_User ps select Id, ps.DisplayName",
        "Directory_FR_User",
        &registry,
    )
    .unwrap();

    assert_eq!(of_type.sql, colon_suffix.sql);
}

#[test]
fn test_unresolved_nav_prop_elides_the_join() {
    let result = translate_squery(
        "join FakeNavProp fnp select Id, fnp.Id",
        "Category",
        &fixture_registry(),
    )
    .unwrap();

    assert!(!result.sql.contains("fnp"), "{}", result.sql);
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.contains("the LEFT JOIN was skipped")),
        "{:?}",
        result.warnings
    );
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.contains("navigationPropertyOverrides")),
        "{:?}",
        result.warnings
    );
}

#[test]
fn test_undeclared_alias_is_an_error() {
    let err = translate_squery("select Id, xyz.Name", "Category", &fixture_registry())
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("is not declared"), "{message}");
    assert!(message.contains("Available aliases:"), "{message}");
}
