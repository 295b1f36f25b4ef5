mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{create_table, public_rows, setup_engine};
use infoschema::catalog::{ChangeCounter, MemoryCatalog, QualifiedName, SequenceInfo};
use infoschema::rights::GranteeManager;
use infoschema::system::{GenerationContext, GeneratorFn, GeneratorRegistry, SystemTableId};
use infoschema::types::Value;
use infoschema::views;
use infoschema::{EngineSettings, InfoSchemaError, InformationSchema};
use pretty_assertions::assert_eq;

fn status(engine: &InformationSchema, id: SystemTableId) -> (u64, u64) {
    let status = engine
        .cache_statuses()
        .into_iter()
        .find(|s| s.table == id)
        .expect("table has stats");
    (status.hits, status.rebuilds)
}

#[test]
fn test_unchanged_schema_reuses_rows() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    let mut session = t.engine.new_session("SA").unwrap();

    let first = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    let second = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    let third = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();

    assert!(first.shares_rows_with(&second));
    assert!(second.shares_rows_with(&third));
    assert_eq!(status(&t.engine, SystemTableId::Columns), (2, 1));
}

#[test]
fn test_ddl_invalidates_every_table() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    let tables = t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    let columns = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    let stamp = tables.stamp().unwrap();

    create_table(&t.catalog, "T1", &["A", "B"]);

    let tables_after = t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    let columns_after = t.engine.fetch(&mut session, "COLUMNS").unwrap().unwrap();
    assert!(tables_after.stamp().unwrap() > stamp);
    assert_eq!(tables_after.stamp(), columns_after.stamp());
    assert_eq!(public_rows(&tables_after).len(), public_rows(&tables).len() + 1);
    assert_eq!(public_rows(&columns_after).len(), public_rows(&columns).len() + 2);
}

#[test]
fn test_drop_removes_rows() {
    let t = setup_engine();
    create_table(&t.catalog, "T1", &["A"]);
    let mut session = t.engine.new_session("SA").unwrap();
    let before = t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    assert_eq!(public_rows(&before).len(), 1);

    t.catalog
        .drop_table(&QualifiedName::new("PUBLIC", "T1"))
        .unwrap();
    let after = t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    assert!(public_rows(&after).is_empty());
    // The earlier snapshot is unaffected by the rebuild
    assert_eq!(public_rows(&before).len(), 1);
}

#[test]
fn test_sessions_keep_separate_stores() {
    let t = setup_engine();
    let mut first = t.engine.new_session("SA").unwrap();
    let mut second = t.engine.new_session("SA").unwrap();

    let a = t.engine.fetch(&mut first, "TABLES").unwrap().unwrap();
    let b = t.engine.fetch(&mut second, "TABLES").unwrap().unwrap();
    assert!(!a.shares_rows_with(&b));
    assert_eq!(a.rows(), b.rows());
    assert_eq!(status(&t.engine, SystemTableId::Tables), (0, 2));
}

#[test]
fn test_grant_changes_invalidate_like_ddl() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    let before = t.engine.fetch(&mut session, "AUTHORIZATIONS").unwrap().unwrap();

    t.grants.create_user("NEW_USER", None).unwrap();
    let after = t.engine.fetch(&mut session, "AUTHORIZATIONS").unwrap().unwrap();
    assert_eq!(after.len(), before.len() + 1);
}

#[test]
fn test_non_cacheable_tables_rebuild_each_time() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    for _ in 0..3 {
        t.engine.fetch(&mut session, "SYSTEM_CACHEINFO").unwrap().unwrap();
    }
    assert_eq!(status(&t.engine, SystemTableId::SystemCacheInfo), (0, 3));
}

#[test]
fn test_sequence_values_bypass_the_cache() {
    let t = setup_engine();
    let name = QualifiedName::new("PUBLIC", "SEQ");
    t.catalog.create_sequence(SequenceInfo::new(name.clone(), "SA")).unwrap();
    let mut session = t.engine.new_session("SA").unwrap();

    let cached = t.engine.fetch(&mut session, "SEQUENCES").unwrap().unwrap();
    t.catalog.set_sequence_value(&name, 42).unwrap();

    let live = t.engine.fetch(&mut session, "SYSTEM_SEQUENCES").unwrap().unwrap();
    assert_eq!(live.rows()[0][15], Value::from("42"));
    let again = t.engine.fetch(&mut session, "SEQUENCES").unwrap().unwrap();
    assert!(cached.shares_rows_with(&again));
    assert_eq!(again.rows()[0][15], Value::Null);
}

fn failing(_ctx: &mut GenerationContext<'_>) -> infoschema::Result<()> {
    Err(InfoSchemaError::Catalog("catalog unavailable".to_string()))
}

#[test]
fn test_failed_generation_is_retried() {
    let counter = ChangeCounter::new();
    let catalog = Arc::new(MemoryCatalog::new("SA", counter.clone()));
    let grants = Arc::new(GranteeManager::new(counter));
    grants.create_admin("SA").unwrap();

    let mut full: HashMap<SystemTableId, GeneratorFn> = views::full();
    full.insert(SystemTableId::Views, failing);
    let engine = InformationSchema::with_generators(
        catalog,
        grants,
        EngineSettings::default(),
        GeneratorRegistry::layered(views::essential(), full),
    )
    .unwrap();

    let mut session = engine.new_session("SA").unwrap();
    assert!(engine.fetch(&mut session, "VIEWS").is_err());
    assert_eq!(session.stamp(SystemTableId::Views), None);
    assert!(engine.fetch(&mut session, "VIEWS").is_err());
    assert_eq!(status(&engine, SystemTableId::Views), (0, 2));

    // Other tables are unaffected
    assert!(engine.fetch(&mut session, "TABLES").unwrap().is_some());
}

#[test]
fn test_cache_info_reports_session_dependence() {
    let t = setup_engine();
    let mut session = t.engine.new_session("SA").unwrap();
    t.engine.fetch(&mut session, "TABLES").unwrap().unwrap();
    t.engine.fetch(&mut session, "SYSTEM_TYPEINFO").unwrap().unwrap();

    let result = t
        .engine
        .query(
            &mut session,
            "SELECT TABLE_NAME, SESSION_DEPENDENT FROM INFORMATION_SCHEMA.SYSTEM_CACHEINFO \
             WHERE TABLE_NAME IN ('TABLES', 'SYSTEM_TYPEINFO') ORDER BY TABLE_NAME",
        )
        .unwrap()
        .unwrap();
    assert_eq!(
        result.rows,
        vec![
            vec![Value::from("SYSTEM_TYPEINFO"), Value::Boolean(false)],
            vec![Value::from("TABLES"), Value::Boolean(true)],
        ]
    );
}
