use parking_lot::RwLock;
use tracing::debug;

use super::objects::*;
use super::{CatalogSource, ChangeCounter};
use crate::error::{InfoSchemaError, Result};

pub const DEFAULT_CATALOG: &str = "PUBLIC";
pub const DEFAULT_SCHEMA: &str = "PUBLIC";
pub const DEFAULT_CHARACTER_SET: &str = "SQL_TEXT";

#[derive(Debug, Default)]
struct MemoryState {
    schemas: Vec<SchemaInfo>,
    tables: Vec<TableInfo>,
    routines: Vec<RoutineInfo>,
    sequences: Vec<SequenceInfo>,
    triggers: Vec<TriggerInfo>,
    domains: Vec<DomainInfo>,
    character_sets: Vec<CharacterSetInfo>,
    collations: Vec<CollationInfo>,
}

/// Catalog held entirely in memory. Mutators stand in for the schema
/// manager and advance the shared change counter.
pub struct MemoryCatalog {
    catalog_name: String,
    default_schema: String,
    counter: ChangeCounter,
    state: RwLock<MemoryState>,
}

impl MemoryCatalog {
    /// Creates a catalog with `INFORMATION_SCHEMA` and a `PUBLIC` schema
    /// owned by `owner`
    pub fn new(owner: &str, counter: ChangeCounter) -> Self {
        let charset = QualifiedName::new(INFORMATION_SCHEMA, DEFAULT_CHARACTER_SET);
        let state = MemoryState {
            schemas: vec![
                SchemaInfo {
                    name: INFORMATION_SCHEMA.to_string(),
                    owner: SYSTEM_AUTHORIZATION.to_string(),
                    default_character_set: Some(DEFAULT_CHARACTER_SET.to_string()),
                },
                SchemaInfo {
                    name: DEFAULT_SCHEMA.to_string(),
                    owner: owner.to_string(),
                    default_character_set: Some(DEFAULT_CHARACTER_SET.to_string()),
                },
            ],
            character_sets: vec![CharacterSetInfo {
                name: charset.clone(),
                owner: SYSTEM_AUTHORIZATION.to_string(),
                repertoire: "UCS".to_string(),
                form_of_use: "UTF16".to_string(),
                default_collation: Some(charset.clone()),
            }],
            collations: vec![CollationInfo {
                name: charset,
                owner: SYSTEM_AUTHORIZATION.to_string(),
                pad_space: true,
            }],
            ..Default::default()
        };

        Self {
            catalog_name: DEFAULT_CATALOG.to_string(),
            default_schema: DEFAULT_SCHEMA.to_string(),
            counter,
            state: RwLock::new(state),
        }
    }

    pub fn counter(&self) -> &ChangeCounter {
        &self.counter
    }

    pub fn create_schema(&self, name: &str, owner: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.schemas.iter().any(|s| s.name == name) {
            return Err(InfoSchemaError::Catalog(format!("schema {name} already exists")));
        }
        state.schemas.push(SchemaInfo {
            name: name.to_string(),
            owner: owner.to_string(),
            default_character_set: Some(DEFAULT_CHARACTER_SET.to_string()),
        });
        self.changed("CREATE SCHEMA", name);
        Ok(())
    }

    /// Adds a table; its owner is taken from the owning schema
    pub fn create_table(&self, mut table: TableInfo) -> Result<()> {
        let mut state = self.state.write();
        let owner = schema_owner(&state, &table.name.schema)?;
        if state.tables.iter().any(|t| t.name == table.name) {
            return Err(InfoSchemaError::Catalog(format!(
                "table {} already exists",
                table.name
            )));
        }
        table.owner = owner;
        let name = table.name.to_string();
        state.tables.push(table);
        self.changed("CREATE TABLE", &name);
        Ok(())
    }

    pub fn drop_table(&self, name: &QualifiedName) -> Result<()> {
        let mut state = self.state.write();
        let before = state.tables.len();
        state.tables.retain(|t| &t.name != name);
        if state.tables.len() == before {
            return Err(InfoSchemaError::Catalog(format!("table {name} does not exist")));
        }
        state.triggers.retain(|t| &t.table != name);
        self.changed("DROP TABLE", &name.to_string());
        Ok(())
    }

    pub fn add_column(&self, table: &QualifiedName, column: ColumnInfo) -> Result<()> {
        let mut state = self.state.write();
        let target = state
            .tables
            .iter_mut()
            .find(|t| &t.name == table)
            .ok_or_else(|| InfoSchemaError::Catalog(format!("table {table} does not exist")))?;
        target.columns.push(column);
        self.changed("ALTER TABLE", &table.to_string());
        Ok(())
    }

    pub fn create_routine(&self, mut routine: RoutineInfo) -> Result<()> {
        let mut state = self.state.write();
        routine.owner = schema_owner(&state, &routine.name.schema)?;
        let name = routine.specific_qualified_name().to_string();
        state.routines.push(routine);
        self.changed("CREATE ROUTINE", &name);
        Ok(())
    }

    pub fn create_sequence(&self, mut sequence: SequenceInfo) -> Result<()> {
        let mut state = self.state.write();
        sequence.owner = schema_owner(&state, &sequence.name.schema)?;
        let name = sequence.name.to_string();
        state.sequences.push(sequence);
        self.changed("CREATE SEQUENCE", &name);
        Ok(())
    }

    /// Moves a sequence's next value. Not a structural change, so the
    /// counter stays put; views over live sequence values are uncached.
    pub fn set_sequence_value(&self, name: &QualifiedName, next_value: i64) -> Result<()> {
        let mut state = self.state.write();
        let sequence = state
            .sequences
            .iter_mut()
            .find(|s| &s.name == name)
            .ok_or_else(|| InfoSchemaError::Catalog(format!("sequence {name} does not exist")))?;
        sequence.next_value = next_value;
        Ok(())
    }

    pub fn create_trigger(&self, mut trigger: TriggerInfo) -> Result<()> {
        let mut state = self.state.write();
        if !state.tables.iter().any(|t| t.name == trigger.table) {
            return Err(InfoSchemaError::Catalog(format!(
                "table {} does not exist",
                trigger.table
            )));
        }
        trigger.owner = schema_owner(&state, &trigger.name.schema)?;
        let name = trigger.name.to_string();
        state.triggers.push(trigger);
        self.changed("CREATE TRIGGER", &name);
        Ok(())
    }

    pub fn create_domain(&self, mut domain: DomainInfo) -> Result<()> {
        let mut state = self.state.write();
        domain.owner = schema_owner(&state, &domain.name.schema)?;
        let name = domain.name.to_string();
        state.domains.push(domain);
        self.changed("CREATE DOMAIN", &name);
        Ok(())
    }

    pub fn create_collation(&self, mut collation: CollationInfo) -> Result<()> {
        let mut state = self.state.write();
        collation.owner = schema_owner(&state, &collation.name.schema)?;
        let name = collation.name.to_string();
        state.collations.push(collation);
        self.changed("CREATE COLLATION", &name);
        Ok(())
    }

    fn changed(&self, statement: &str, object: &str) {
        let value = self.counter.bump();
        debug!("{} {}: schema change counter now {}", statement, object, value);
    }
}

fn schema_owner(state: &MemoryState, schema: &str) -> Result<String> {
    state
        .schemas
        .iter()
        .find(|s| s.name == schema)
        .map(|s| s.owner.clone())
        .ok_or_else(|| InfoSchemaError::Catalog(format!("schema {schema} does not exist")))
}

impl CatalogSource for MemoryCatalog {
    fn schema_change_counter(&self) -> Result<u64> {
        Ok(self.counter.current())
    }

    fn catalog_name(&self) -> String {
        self.catalog_name.clone()
    }

    fn default_schema(&self) -> String {
        self.default_schema.clone()
    }

    fn schemas(&self) -> Result<Vec<SchemaInfo>> {
        Ok(self.state.read().schemas.clone())
    }

    fn tables(&self) -> Result<Vec<TableInfo>> {
        Ok(self.state.read().tables.clone())
    }

    fn routines(&self) -> Result<Vec<RoutineInfo>> {
        Ok(self.state.read().routines.clone())
    }

    fn sequences(&self) -> Result<Vec<SequenceInfo>> {
        Ok(self.state.read().sequences.clone())
    }

    fn triggers(&self) -> Result<Vec<TriggerInfo>> {
        Ok(self.state.read().triggers.clone())
    }

    fn domains(&self) -> Result<Vec<DomainInfo>> {
        Ok(self.state.read().domains.clone())
    }

    fn character_sets(&self) -> Result<Vec<CharacterSetInfo>> {
        Ok(self.state.read().character_sets.clone())
    }

    fn collations(&self) -> Result<Vec<CollationInfo>> {
        Ok(self.state.read().collations.clone())
    }
}
