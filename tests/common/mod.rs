use std::sync::Arc;

use infoschema::catalog::{
    ChangeCounter, ColumnInfo, DataType, MemoryCatalog, QualifiedName, TableInfo, TableKind,
};
use infoschema::rights::GranteeManager;
use infoschema::system::SystemTableInstance;
use infoschema::types::Value;
use infoschema::{EngineSettings, InformationSchema};

/// An engine over an in-memory catalog whose `PUBLIC` schema is owned by
/// the admin `SA`
#[allow(dead_code)]
pub struct TestEngine {
    pub engine: InformationSchema,
    pub catalog: Arc<MemoryCatalog>,
    pub grants: Arc<GranteeManager>,
}

#[allow(dead_code)]
pub fn setup_engine() -> TestEngine {
    let counter = ChangeCounter::new();
    let catalog = Arc::new(MemoryCatalog::new("SA", counter.clone()));
    let grants = Arc::new(GranteeManager::new(counter));
    grants.create_admin("SA").unwrap();
    let engine = InformationSchema::open(catalog.clone(), grants.clone(), EngineSettings::default())
        .expect("Failed to open information schema");
    TestEngine {
        engine,
        catalog,
        grants,
    }
}

/// Creates `PUBLIC.<name>` owned by `SA` with the given integer columns
#[allow(dead_code)]
pub fn create_table(catalog: &MemoryCatalog, name: &str, columns: &[&str]) {
    let mut table = TableInfo::new(QualifiedName::new("PUBLIC", name), "SA", TableKind::BaseTable);
    for column in columns {
        table = table.with_column(ColumnInfo::new(*column, DataType::integer()));
    }
    catalog.create_table(table).expect("Failed to create table");
}

/// Text of the named column in every row, NULLs skipped
#[allow(dead_code)]
pub fn column_text(instance: &SystemTableInstance, column: &str) -> Vec<String> {
    let index = instance
        .descriptor()
        .column_index(column)
        .unwrap_or_else(|| panic!("no column {column}"));
    instance
        .rows()
        .iter()
        .filter_map(|row| row[index].to_text())
        .collect()
}

/// Rows whose `TABLE_SCHEMA` (or `TABLE_SCHEM`) is `PUBLIC`
#[allow(dead_code)]
pub fn public_rows(instance: &SystemTableInstance) -> Vec<Vec<Value>> {
    let descriptor = instance.descriptor();
    let index = descriptor
        .column_index("TABLE_SCHEMA")
        .or_else(|| descriptor.column_index("TABLE_SCHEM"))
        .expect("table has a schema column");
    instance
        .rows()
        .iter()
        .filter(|row| row[index].as_str() == Some("PUBLIC"))
        .map(|row| row.values().to_vec())
        .collect()
}
