use std::path::PathBuf;
use std::sync::Arc;

use infoschema::catalog::{ChangeCounter, SqliteCatalog};
use infoschema::rights::GranteeManager;
use infoschema::types::Value;
use infoschema::{EngineSettings, InformationSchema, QueryResult, Session};
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE parent (id INTEGER PRIMARY KEY AUTOINCREMENT, code VARCHAR(12) UNIQUE);
    CREATE TABLE child (
        id INTEGER PRIMARY KEY,
        parent_id INTEGER REFERENCES parent(id) ON DELETE CASCADE,
        qty INTEGER NOT NULL CHECK (qty > 0)
    );
    CREATE VIEW child_totals AS SELECT parent_id, SUM(qty) AS total FROM child GROUP BY parent_id;
    CREATE TRIGGER child_audit AFTER INSERT ON child BEGIN SELECT 1; END;
";

struct Fixture {
    engine: InformationSchema,
    path: PathBuf,
    _dir: TempDir,
}

fn setup() -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    Connection::open(&path).unwrap().execute_batch(SCHEMA).unwrap();

    let counter = ChangeCounter::new();
    let catalog = SqliteCatalog::open(&path, "SA", counter.clone()).unwrap();
    let grants = GranteeManager::new(counter);
    grants.create_admin("SA").unwrap();
    let engine = InformationSchema::open(Arc::new(catalog), Arc::new(grants), EngineSettings::default()).unwrap();
    Fixture { engine, path, _dir: dir }
}

fn query(engine: &InformationSchema, session: &mut Session, sql: &str) -> QueryResult {
    engine
        .query(session, sql)
        .unwrap_or_else(|e| panic!("{sql}: {e}"))
        .unwrap_or_else(|| panic!("{sql} was not intercepted"))
}

fn texts(result: &QueryResult, column: &str) -> Vec<String> {
    result
        .column(column)
        .unwrap()
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}

#[test]
fn test_tables_and_views_are_listed() {
    let f = setup();
    let mut session = f.engine.new_session("SA").unwrap();
    let result = query(
        &f.engine,
        &mut session,
        "SELECT TABLE_NAME, TABLE_TYPE FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = 'main'",
    );
    assert_eq!(texts(&result, "TABLE_NAME"), vec!["parent", "child", "child_totals"]);
    assert_eq!(texts(&result, "TABLE_TYPE"), vec!["BASE TABLE", "BASE TABLE", "VIEW"]);

    let views = query(
        &f.engine,
        &mut session,
        "SELECT VIEW_DEFINITION FROM INFORMATION_SCHEMA.VIEWS WHERE TABLE_NAME = 'child_totals'",
    );
    assert_eq!(
        texts(&views, "VIEW_DEFINITION"),
        vec!["SELECT parent_id, SUM(qty) AS total FROM child GROUP BY parent_id"]
    );
}

#[test]
fn test_constraints_are_reported() {
    let f = setup();
    let mut session = f.engine.new_session("SA").unwrap();

    let parent = query(
        &f.engine,
        &mut session,
        "SELECT CONSTRAINT_NAME, CONSTRAINT_TYPE FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
         WHERE TABLE_NAME = 'parent'",
    );
    assert_eq!(texts(&parent, "CONSTRAINT_TYPE"), vec!["PRIMARY KEY", "UNIQUE"]);

    let referential = query(
        &f.engine,
        &mut session,
        "SELECT UNIQUE_CONSTRAINT_NAME, DELETE_RULE FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS",
    );
    assert_eq!(
        referential.rows,
        vec![vec![Value::from("SYS_PK_parent"), Value::from("CASCADE")]]
    );

    let keys = query(
        &f.engine,
        &mut session,
        "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
         WHERE TABLE_NAME = 'child' AND POSITION_IN_UNIQUE_CONSTRAINT IS NOT NULL",
    );
    assert_eq!(texts(&keys, "COLUMN_NAME"), vec!["parent_id"]);
}

#[test]
fn test_column_types_from_declarations() {
    let f = setup();
    let mut session = f.engine.new_session("SA").unwrap();
    let result = query(
        &f.engine,
        &mut session,
        "SELECT COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, IS_NULLABLE, IS_IDENTITY \
         FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = 'parent' ORDER BY ORDINAL_POSITION",
    );
    assert_eq!(
        result.rows,
        vec![
            vec![
                Value::from("id"),
                Value::from("INTEGER"),
                Value::Null,
                Value::yes_no(false),
                Value::yes_no(true),
            ],
            vec![
                Value::from("code"),
                Value::from("CHARACTER VARYING"),
                Value::from(12i64),
                Value::yes_no(true),
                Value::yes_no(false),
            ],
        ]
    );
}

#[test]
fn test_triggers_are_listed() {
    let f = setup();
    let mut session = f.engine.new_session("SA").unwrap();
    let result = query(
        &f.engine,
        &mut session,
        "SELECT TRIGGER_NAME, EVENT_MANIPULATION, ACTION_TIMING FROM INFORMATION_SCHEMA.TRIGGERS",
    );
    assert_eq!(
        result.rows,
        vec![vec![Value::from("child_audit"), Value::from("INSERT"), Value::from("AFTER")]]
    );
}

#[test]
fn test_external_ddl_invalidates_cache() {
    let f = setup();
    let mut session = f.engine.new_session("SA").unwrap();
    let before = f.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    let again = f.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    assert!(before.shares_rows_with(&again));

    // A second connection changes the schema behind the catalog's back
    Connection::open(&f.path)
        .unwrap()
        .execute_batch("CREATE TABLE late (x TEXT);")
        .unwrap();

    let after = f.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    assert!(!before.shares_rows_with(&after));
    assert_eq!(after.len(), before.len() + 1);
    assert!(after.stamp() > before.stamp());
}

#[test]
fn test_unreadable_check_clause_leaves_cell_null() {
    let f = setup();
    // SQLite accepts any run of words as a type name; the SQL parser does not
    Connection::open(&f.path)
        .unwrap()
        .execute_batch("CREATE TABLE scores (score PLATED GOLD CHECK (score >= 0));")
        .unwrap();

    let mut session = f.engine.new_session("SA").unwrap();
    let result = query(
        &f.engine,
        &mut session,
        "SELECT CONSTRAINT_NAME, CHECK_CLAUSE FROM INFORMATION_SCHEMA.CHECK_CONSTRAINTS \
         ORDER BY CONSTRAINT_NAME",
    );
    assert_eq!(
        result.rows,
        vec![
            vec![Value::from("SYS_CK_child_1"), Value::from("qty > 0")],
            vec![Value::from("SYS_CK_scores_1"), Value::Null],
        ]
    );
}

#[test]
fn test_jdbc_key_tables() {
    let f = setup();
    let mut session = f.engine.new_session("SA").unwrap();

    let cross = query(
        &f.engine,
        &mut session,
        "SELECT PKTABLE_NAME, PKCOLUMN_NAME, FKCOLUMN_NAME, DELETE_RULE, PK_NAME \
         FROM INFORMATION_SCHEMA.SYSTEM_CROSSREFERENCE WHERE FKTABLE_NAME = 'child'",
    );
    assert_eq!(
        cross.rows,
        vec![vec![
            Value::from("parent"),
            Value::from("id"),
            Value::from("parent_id"),
            Value::Integer(0),
            Value::from("SYS_PK_parent"),
        ]]
    );

    let best = query(
        &f.engine,
        &mut session,
        "SELECT COLUMN_NAME, IN_KEY FROM INFORMATION_SCHEMA.SYSTEM_BESTROWIDENTIFIER \
         WHERE TABLE_NAME = 'parent'",
    );
    assert_eq!(best.rows, vec![vec![Value::from("id"), Value::Boolean(true)]]);

    let views = query(
        &f.engine,
        &mut session,
        "SELECT VIEW_NAME, TABLE_NAME FROM INFORMATION_SCHEMA.VIEW_TABLE_USAGE",
    );
    assert_eq!(
        views.rows,
        vec![vec![Value::from("child_totals"), Value::from("child")]]
    );
}
