mod common;

use common::{create_table, setup_engine};
use infoschema::InfoSchemaError;
use infoschema::types::Value;
use pretty_assertions::assert_eq;

fn names(values: Option<Vec<&Value>>) -> Vec<String> {
    values.unwrap().into_iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_projection_and_alias() {
    let t = setup_engine();
    create_table(&t.catalog, "ORDERS", &["ID"]);
    let mut session = t.engine.new_session("SA").unwrap();

    let result = t
        .engine
        .query(
            &mut session,
            "SELECT table_name AS name, information_schema.tables.table_type FROM information_schema.tables \
             WHERE table_schema = 'PUBLIC'",
        )
        .unwrap()
        .unwrap();
    assert_eq!(result.columns, vec!["name", "TABLE_TYPE"]);
    assert_eq!(result.rows, vec![vec![Value::from("ORDERS"), Value::from("BASE TABLE")]]);
}

#[test]
fn test_where_order_and_limit() {
    let t = setup_engine();
    for name in ["ALPHA", "BETA", "GAMMA", "DELTA"] {
        create_table(&t.catalog, name, &["ID"]);
    }
    let mut session = t.engine.new_session("SA").unwrap();

    let result = t
        .engine
        .query(
            &mut session,
            "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = 'PUBLIC' AND TABLE_NAME NOT LIKE 'B%' \
             ORDER BY TABLE_NAME DESC LIMIT 2 OFFSET 1",
        )
        .unwrap()
        .unwrap();
    assert_eq!(names(result.column("TABLE_NAME")), vec!["DELTA", "ALPHA"]);

    let result = t
        .engine
        .query(
            &mut session,
            "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_NAME IN ('BETA', 'GAMMA') ORDER BY TABLE_NAME",
        )
        .unwrap()
        .unwrap();
    assert_eq!(names(result.column("TABLE_NAME")), vec!["BETA", "GAMMA"]);
}

#[test]
fn test_session_max_rows_caps_results() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    session.set_max_rows(3);

    let result = t
        .engine
        .query(&mut session, "SELECT * FROM INFORMATION_SCHEMA.TABLES")
        .unwrap()
        .unwrap();
    assert_eq!(result.len(), 3);

    let result = t
        .engine
        .query(&mut session, "SELECT * FROM INFORMATION_SCHEMA.TABLES LIMIT 2")
        .unwrap()
        .unwrap();
    assert_eq!(result.len(), 2);
}

#[test]
fn test_statements_outside_the_information_schema() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["ID"]);
    let mut session = t.engine.new_session("SA").unwrap();

    assert_eq!(t.engine.query(&mut session, "SELECT * FROM PUBLIC.T1").unwrap(), None);
    assert_eq!(t.engine.query(&mut session, "DELETE FROM T1").unwrap(), None);
    assert_eq!(
        t.engine
            .query(&mut session, "SELECT * FROM TABLES t JOIN COLUMNS c ON t.TABLE_NAME = c.TABLE_NAME")
            .unwrap(),
        None
    );
}

#[test]
fn test_reserved_table_is_empty() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    let result = t
        .engine
        .query(&mut session, "SELECT * FROM INFORMATION_SCHEMA.SQL_FEATURES")
        .unwrap()
        .unwrap();
    assert!(result.is_empty());
    assert!(result.columns.is_empty());
}

#[test]
fn test_query_errors() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();

    assert!(matches!(
        t.engine.query(&mut session, "SELECT NO_SUCH_COLUMN FROM INFORMATION_SCHEMA.TABLES"),
        Err(InfoSchemaError::Catalog(_))
    ));
    assert!(matches!(
        t.engine
            .query(&mut session, "SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE length(TABLE_NAME) > 3"),
        Err(InfoSchemaError::NotSupported(_))
    ));
    assert!(matches!(
        t.engine.query(&mut session, "SELEKT * FROM TABLES"),
        Err(InfoSchemaError::SqlParse(_))
    ));
}

#[test]
fn test_session_info_reports_current_statement() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    let sql = "SELECT \"VALUE\" FROM INFORMATION_SCHEMA.SYSTEM_SESSIONINFO WHERE \"KEY\" = 'CURRENT_STATEMENT'";

    let result = t.engine.query(&mut session, sql).unwrap().unwrap();
    assert_eq!(result.rows, vec![vec![Value::from(sql)]]);
    assert_eq!(session.info().current_statement, None);
}

#[test]
fn test_json_output() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    let result = t
        .engine
        .query(&mut session, "SELECT CATALOG_NAME FROM INFORMATION_SCHEMA.INFORMATION_SCHEMA_CATALOG_NAME")
        .unwrap()
        .unwrap();
    assert_eq!(result.to_json(), serde_json::json!([{ "CATALOG_NAME": "PUBLIC" }]));
}

#[test]
fn test_distinct_collapses_projected_rows() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A", "B", "C"]);
    create_table(&t.catalog, "T2", &["A"]);
    let mut session = t.engine.new_session("SA").unwrap();

    let result = t
        .engine
        .query(
            &mut session,
            "SELECT DISTINCT table_name FROM information_schema.columns \
             WHERE table_schema = 'PUBLIC' ORDER BY table_name",
        )
        .unwrap()
        .unwrap();
    assert_eq!(names(result.column("TABLE_NAME")), vec!["T1", "T2"]);

    // OFFSET and LIMIT count distinct rows
    let result = t
        .engine
        .query(
            &mut session,
            "SELECT DISTINCT table_name FROM information_schema.columns \
             WHERE table_schema = 'PUBLIC' ORDER BY table_name LIMIT 1 OFFSET 1",
        )
        .unwrap()
        .unwrap();
    assert_eq!(names(result.column("TABLE_NAME")), vec!["T2"]);
}

#[test]
fn test_grouping_is_not_supported() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();

    for sql in [
        "SELECT TABLE_SCHEMA FROM INFORMATION_SCHEMA.TABLES GROUP BY TABLE_SCHEMA",
        "SELECT TABLE_SCHEMA FROM INFORMATION_SCHEMA.TABLES GROUP BY TABLE_SCHEMA HAVING TABLE_SCHEMA = 'PUBLIC'",
        "SELECT DISTINCT ON (TABLE_SCHEMA) TABLE_NAME FROM INFORMATION_SCHEMA.TABLES",
    ] {
        assert!(
            matches!(t.engine.query(&mut session, sql), Err(InfoSchemaError::NotSupported(_))),
            "{sql}"
        );
    }
}

#[test]
fn test_negated_comparison_with_null_matches_nothing() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    let mut session = t.engine.new_session("SA").unwrap();

    for predicate in ["COLUMN_DEFAULT <> 'x'", "NOT (COLUMN_DEFAULT = 'x')", "COLUMN_DEFAULT NOT IN ('x')"] {
        let sql = format!(
            "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = 'T1' AND {predicate}"
        );
        let result = t.engine.query(&mut session, &sql).unwrap().unwrap();
        assert!(result.is_empty(), "{predicate}");
    }

    let result = t
        .engine
        .query(
            &mut session,
            "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = 'T1' AND COLUMN_DEFAULT IS NULL",
        )
        .unwrap()
        .unwrap();
    assert_eq!(names(result.column("COLUMN_NAME")), vec!["A"]);
}

#[test]
fn test_unknown_where_column_is_an_error() {
    let t = setup_engine();
    t.grants.create_user("U", None).unwrap();
    let mut session = t.engine.new_session("SA").unwrap();

    for sql in [
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE NO_SUCH_COLUMN IS NULL",
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE NO_SUCH_COLUMN = 'x'",
    ] {
        assert!(
            matches!(t.engine.query(&mut session, sql), Err(InfoSchemaError::Catalog(_))),
            "{sql}"
        );
    }

    // Cache statistics are empty for non-administrators; the column is
    // still resolved
    let mut user = t.engine.new_session("U").unwrap();
    let sql = "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.SYSTEM_CACHEINFO";
    assert!(t.engine.query(&mut user, sql).unwrap().unwrap().is_empty());
    let sql = "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.SYSTEM_CACHEINFO WHERE NO_SUCH_COLUMN = 1";
    assert!(matches!(t.engine.query(&mut user, sql), Err(InfoSchemaError::Catalog(_))));
}

#[test]
fn test_type_info_is_the_same_for_every_user() {
    let t = setup_engine();
    t.grants.create_user("U", None).unwrap();
    let sql = "SELECT TYPE_NAME, LITERAL_PREFIX FROM INFORMATION_SCHEMA.SYSTEM_TYPEINFO WHERE DATA_TYPE = 12";

    let mut admin = t.engine.new_session("SA").unwrap();
    let mut user = t.engine.new_session("U").unwrap();
    let expected = vec![vec![Value::from("CHARACTER VARYING"), Value::from("'")]];
    assert_eq!(t.engine.query(&mut admin, sql).unwrap().unwrap().rows, expected);
    assert_eq!(t.engine.query(&mut user, sql).unwrap().unwrap().rows, expected);
}
