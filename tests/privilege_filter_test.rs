mod common;

use common::{column_text, create_table, public_rows, setup_engine};
use infoschema::catalog::{
    ColumnInfo, ConstraintInfo, DataAccess, DataType, ObjectKind, QualifiedName, RoutineInfo,
    RoutineKind, RoutineLanguage, TableInfo, TableKind, TriggerEvent, TriggerInfo, TriggerTiming,
};
use infoschema::rights::Privileges;
use infoschema::system::SystemTableInstance;
use infoschema::types::Value;
use pretty_assertions::assert_eq;

fn public_column_names(rows: &[Vec<Value>]) -> Vec<(String, String)> {
    rows.iter()
        .map(|row| (row[2].to_string(), row[3].to_string()))
        .collect()
}

#[test]
fn test_columns_follow_table_grants() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A", "B"]);
    create_table(&t.catalog, "T2", &["C"]);
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "T1"), Privileges::SELECT, false)
        .unwrap();

    let mut session = t.engine.new_session("S").unwrap();
    let before = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    let before_rows = public_rows(&before);
    assert_eq!(
        public_column_names(&before_rows),
        vec![
            ("T1".to_string(), "A".to_string()),
            ("T1".to_string(), "B".to_string()),
        ]
    );

    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "T2"), Privileges::SELECT, false)
        .unwrap();
    let after = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    assert!(!before.shares_rows_with(&after));
    let after_rows = public_rows(&after);
    assert_eq!(
        public_column_names(&after_rows),
        vec![
            ("T1".to_string(), "A".to_string()),
            ("T1".to_string(), "B".to_string()),
            ("T2".to_string(), "C".to_string()),
        ]
    );
    assert_eq!(&after_rows[..2], &before_rows[..]);
}

#[test]
fn test_column_grant_limits_listed_columns() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A", "B", "C"]);
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant_columns("SA", "S", QualifiedName::new("PUBLIC", "T1"), &["B"], Privileges::SELECT, false)
        .unwrap();

    let mut session = t.engine.new_session("S").unwrap();
    let columns = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    assert_eq!(
        public_column_names(&public_rows(&columns)),
        vec![("T1".to_string(), "B".to_string())]
    );

    let privileges = t.engine.fetch(&mut session, "COLUMN_PRIVILEGES").unwrap().unwrap();
    let rows = public_rows(&privileges);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], Value::from("S"));
    assert_eq!(rows[0][5], Value::from("B"));
    assert_eq!(rows[0][6], Value::from("SELECT"));
}

#[test]
fn test_column_grant_matches_names_case_insensitively() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A", "B"]);
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant_columns("SA", "S", QualifiedName::new("PUBLIC", "T1"), &["b"], Privileges::SELECT, false)
        .unwrap();

    let mut session = t.engine.new_session("S").unwrap();
    let columns = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    assert_eq!(
        public_column_names(&public_rows(&columns)),
        vec![("T1".to_string(), "B".to_string())]
    );

    let privileges = t.engine.fetch(&mut session, "COLUMN_PRIVILEGES").unwrap().unwrap();
    let granted: Vec<Value> = public_rows(&privileges).into_iter().map(|row| row[5].clone()).collect();
    assert_eq!(granted, vec![Value::from("B")]);
}

#[test]
fn test_admin_sees_everything() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    create_table(&t.catalog, "T2", &["B"]);

    let mut session = t.engine.new_session("SA").unwrap();
    let tables = t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    let names: Vec<Value> = public_rows(&tables).into_iter().map(|row| row[2].clone()).collect();
    assert_eq!(names, vec![Value::from("T1"), Value::from("T2")]);
}

#[test]
fn test_user_without_grants_sees_only_system_tables() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    t.grants.create_user("NOBODY", None).unwrap();

    let mut session = t.engine.new_session("NOBODY").unwrap();
    let tables = t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    assert!(public_rows(&tables).is_empty());
    let schemas = column_text(&tables, "TABLE_SCHEMA");
    assert!(!schemas.is_empty());
    assert!(schemas.iter().all(|s| s == "INFORMATION_SCHEMA"));
}

#[test]
fn test_view_definition_needs_ownership() {
    let t = setup_engine();
    t.catalog
        .create_table(
            TableInfo::new(QualifiedName::new("PUBLIC", "V1"), "SA", TableKind::View)
                .with_view_definition("SELECT 1"),
        )
        .unwrap();
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "V1"), Privileges::SELECT, false)
        .unwrap();

    let mut admin = t.engine.new_session("SA").unwrap();
    let views = t.engine.fetch(&mut admin, "VIEWS").unwrap().unwrap();
    assert_eq!(public_rows(&views)[0][3], Value::from("SELECT 1"));

    let mut user = t.engine.new_session("S").unwrap();
    let views = t.engine.fetch(&mut user, "VIEWS").unwrap().unwrap();
    let rows = public_rows(&views);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][3], Value::Null);
}

/// Cell of `column` in the row whose `key_column` equals `key`
fn cell(instance: &SystemTableInstance, key_column: &str, key: &str, column: &str) -> Option<Value> {
    let descriptor = instance.descriptor();
    let key_index = descriptor.column_index(key_column).unwrap();
    let index = descriptor.column_index(column).unwrap();
    instance
        .rows()
        .iter()
        .find(|row| row[key_index].as_str() == Some(key))
        .map(|row| row[index].clone())
}

#[test]
fn test_routine_definition_needs_ownership() {
    let t = setup_engine();
    t.catalog
        .create_routine(RoutineInfo {
            name: QualifiedName::new("PUBLIC", "DOUBLE_IT"),
            specific_name: "DOUBLE_IT_10".into(),
            owner: String::new(),
            kind: RoutineKind::Function,
            language: RoutineLanguage::Sql,
            body: Some("RETURN X * 2".into()),
            external_name: None,
            deterministic: true,
            data_access: DataAccess::ContainsSql,
            return_type: Some(DataType::integer()),
            parameter_count: 1,
            null_call: true,
            created: None,
            remarks: None,
        })
        .unwrap();
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant(
            "SA",
            "S",
            ObjectKind::Routine,
            QualifiedName::new("PUBLIC", "DOUBLE_IT_10"),
            Privileges::EXECUTE,
            false,
        )
        .unwrap();

    let mut admin = t.engine.new_session("SA").unwrap();
    let routines = t.engine.fetch(&mut admin, "ROUTINES").unwrap().unwrap();
    assert_eq!(
        cell(&routines, "ROUTINE_NAME", "DOUBLE_IT", "ROUTINE_DEFINITION"),
        Some(Value::from("RETURN X * 2"))
    );

    let mut user = t.engine.new_session("S").unwrap();
    let routines = t.engine.fetch(&mut user, "ROUTINES").unwrap().unwrap();
    assert_eq!(cell(&routines, "ROUTINE_NAME", "DOUBLE_IT", "ROUTINE_BODY"), Some(Value::from("SQL")));
    assert_eq!(cell(&routines, "ROUTINE_NAME", "DOUBLE_IT", "ROUTINE_DEFINITION"), Some(Value::Null));
}

#[test]
fn test_check_clause_needs_ownership() {
    let t = setup_engine();
    t.catalog
        .create_table(
            TableInfo::new(QualifiedName::new("PUBLIC", "T1"), "SA", TableKind::BaseTable)
                .with_column(ColumnInfo::new("A", DataType::integer()))
                .with_constraint(ConstraintInfo::check("CK_T1_A", "A > 0")),
        )
        .unwrap();
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "T1"), Privileges::SELECT, false)
        .unwrap();

    let mut admin = t.engine.new_session("SA").unwrap();
    let checks = t.engine.fetch(&mut admin, "CHECK_CONSTRAINTS").unwrap().unwrap();
    assert_eq!(
        cell(&checks, "CONSTRAINT_NAME", "CK_T1_A", "CHECK_CLAUSE"),
        Some(Value::from("A > 0"))
    );

    let mut user = t.engine.new_session("S").unwrap();
    let checks = t.engine.fetch(&mut user, "CHECK_CONSTRAINTS").unwrap().unwrap();
    assert_eq!(cell(&checks, "CONSTRAINT_NAME", "CK_T1_A", "CHECK_CLAUSE"), Some(Value::Null));
}

#[test]
fn test_trigger_action_needs_ownership() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    t.catalog
        .create_trigger(TriggerInfo {
            name: QualifiedName::new("PUBLIC", "T1_AUDIT"),
            table: QualifiedName::new("PUBLIC", "T1"),
            owner: String::new(),
            timing: TriggerTiming::After,
            event: TriggerEvent::Insert,
            for_each_row: true,
            condition: Some("NEW.A > 0".into()),
            action: Some("INSERT INTO LOG VALUES (NEW.A)".into()),
            action_order: 1,
            created: None,
        })
        .unwrap();
    t.grants.create_user("S", None).unwrap();
    t.grants.create_user("U", None).unwrap();
    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "T1"), Privileges::SELECT, false)
        .unwrap();

    let mut admin = t.engine.new_session("SA").unwrap();
    let triggers = t.engine.fetch(&mut admin, "TRIGGERS").unwrap().unwrap();
    assert_eq!(
        cell(&triggers, "TRIGGER_NAME", "T1_AUDIT", "ACTION_STATEMENT"),
        Some(Value::from("INSERT INTO LOG VALUES (NEW.A)"))
    );

    let mut user = t.engine.new_session("S").unwrap();
    let triggers = t.engine.fetch(&mut user, "TRIGGERS").unwrap().unwrap();
    assert_eq!(cell(&triggers, "TRIGGER_NAME", "T1_AUDIT", "ACTION_STATEMENT"), Some(Value::Null));
    assert_eq!(cell(&triggers, "TRIGGER_NAME", "T1_AUDIT", "ACTION_CONDITION"), Some(Value::Null));

    let mut outsider = t.engine.new_session("U").unwrap();
    let triggers = t.engine.fetch(&mut outsider, "TRIGGERS").unwrap().unwrap();
    assert_eq!(cell(&triggers, "TRIGGER_NAME", "T1_AUDIT", "TRIGGER_NAME"), None);
}

#[test]
fn test_table_privileges_show_own_grants_only() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    t.grants.create_user("S", None).unwrap();
    t.grants.create_user("U", None).unwrap();
    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "T1"), Privileges::SELECT, false)
        .unwrap();
    t.grants
        .grant(
            "SA",
            "U",
            ObjectKind::Table,
            QualifiedName::new("PUBLIC", "T1"),
            Privileges::SELECT | Privileges::UPDATE,
            true,
        )
        .unwrap();

    let mut session = t.engine.new_session("S").unwrap();
    let privileges = t.engine.fetch(&mut session, "TABLE_PRIVILEGES").unwrap().unwrap();
    assert_eq!(
        public_rows(&privileges),
        vec![vec![
            Value::from("SA"),
            Value::from("S"),
            Value::from("PUBLIC"),
            Value::from("PUBLIC"),
            Value::from("T1"),
            Value::from("SELECT"),
            Value::yes_no(false),
            Value::yes_no(false),
        ]]
    );
}

#[test]
fn test_view_table_usage_needs_ownership() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    t.catalog
        .create_table(
            TableInfo::new(QualifiedName::new("PUBLIC", "V1"), "SA", TableKind::View)
                .with_view_definition("SELECT a FROM t1 JOIN public.t1 AS again ON TRUE"),
        )
        .unwrap();
    t.grants.create_user("S", None).unwrap();
    t.grants
        .grant("SA", "S", ObjectKind::Table, QualifiedName::new("PUBLIC", "V1"), Privileges::SELECT, false)
        .unwrap();

    let mut admin = t.engine.new_session("SA").unwrap();
    let usage = t.engine.fetch(&mut admin, "VIEW_TABLE_USAGE").unwrap().unwrap();
    assert_eq!(column_text(&usage, "VIEW_NAME"), vec!["V1"]);
    assert_eq!(column_text(&usage, "TABLE_NAME"), vec!["T1"]);

    let mut user = t.engine.new_session("S").unwrap();
    let usage = t.engine.fetch(&mut user, "VIEW_TABLE_USAGE").unwrap().unwrap();
    assert!(usage.is_empty());
}
