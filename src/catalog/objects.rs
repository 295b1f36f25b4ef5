use chrono::NaiveDateTime;
use std::fmt;

/// Authorization that owns built-in objects (system tables, default charset,
/// collations). Everything it owns is readable by PUBLIC.
pub const SYSTEM_AUTHORIZATION: &str = "_SYSTEM";

/// Schema that holds the system tables
pub const INFORMATION_SCHEMA: &str = "INFORMATION_SCHEMA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Schema,
    Table,
    Routine,
    Sequence,
    Trigger,
    Domain,
    CharacterSet,
    Collation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Common surface of every catalog object the rights model reasons about
pub trait SchemaObject {
    fn kind(&self) -> ObjectKind;
    fn qualified_name(&self) -> QualifiedName;
    fn owner(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInfo {
    pub name: String,
    pub owner: String,
    pub default_character_set: Option<String>,
}

impl SchemaObject for SchemaInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Schema
    }

    fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.name.clone(), self.name.clone())
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    BaseTable,
    View,
    GlobalTemporary,
    System,
}

impl TableKind {
    /// `TABLES.TABLE_TYPE`; system tables present themselves as views
    pub fn sql_table_type(&self) -> &'static str {
        match self {
            TableKind::BaseTable => "BASE TABLE",
            TableKind::View | TableKind::System => "VIEW",
            TableKind::GlobalTemporary => "GLOBAL TEMPORARY",
        }
    }

    /// `SYSTEM_TABLES.TABLE_TYPE`, the JDBC vocabulary
    pub fn jdbc_table_type(&self) -> &'static str {
        match self {
            TableKind::BaseTable => "TABLE",
            TableKind::View => "VIEW",
            TableKind::GlobalTemporary => "GLOBAL TEMPORARY",
            TableKind::System => "SYSTEM TABLE",
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, TableKind::View | TableKind::System)
    }
}

/// Declared type of a column, routine result, sequence or domain
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataType {
    pub name: String,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
    pub character_set: Option<String>,
    pub collation: Option<String>,
    /// Schema-qualified domain the column was declared with, if any
    pub domain: Option<QualifiedName>,
}

impl DataType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn varchar(length: i64) -> Self {
        Self {
            name: "CHARACTER VARYING".to_string(),
            character_maximum_length: Some(length),
            ..Default::default()
        }
    }

    pub fn integer() -> Self {
        Self {
            name: "INTEGER".to_string(),
            numeric_precision: Some(32),
            numeric_scale: Some(0),
            ..Default::default()
        }
    }

    pub fn bigint() -> Self {
        Self {
            name: "BIGINT".to_string(),
            numeric_precision: Some(64),
            numeric_scale: Some(0),
            ..Default::default()
        }
    }

    pub fn is_character(&self) -> bool {
        self.character_maximum_length.is_some()
            || self.name.contains("CHAR")
            || self.name.contains("TEXT")
            || self.name.contains("CLOB")
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_precision.is_some()
    }

    /// Radix of `numeric_precision`: 2 for binary integer and float types,
    /// 10 for exact decimals
    pub fn numeric_radix(&self) -> Option<i64> {
        if !self.is_numeric() {
            return None;
        }
        if self.name.contains("DECIMAL") || self.name.contains("NUMERIC") {
            Some(10)
        } else {
            Some(2)
        }
    }

    /// JDBC `java.sql.Types` code reported by the `SYSTEM_*` views
    pub fn jdbc_type_code(&self) -> i64 {
        match self.name.as_str() {
            "BOOLEAN" => 16,
            "SMALLINT" => 5,
            "INTEGER" => 4,
            "BIGINT" => -5,
            "REAL" => 7,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT" => 8,
            "NUMERIC" => 2,
            "DECIMAL" => 3,
            "CHARACTER" => 1,
            "CHARACTER VARYING" | "VARCHAR" => 12,
            "CLOB" | "TEXT" => 2005,
            "BLOB" => 2004,
            "BINARY VARYING" | "VARBINARY" => -3,
            "DATE" => 91,
            "TIME" => 92,
            "TIMESTAMP" => 93,
            _ => 1111,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.character_maximum_length, self.numeric_precision, self.numeric_scale) {
            (Some(len), _, _) => write!(f, "{}({len})", self.name),
            (None, Some(p), Some(s)) if self.numeric_radix() == Some(10) => {
                write!(f, "{}({p},{s})", self.name)
            }
            _ => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityInfo {
    pub always: bool,
    pub start: i64,
    pub increment: i64,
    pub minimum: i64,
    pub maximum: i64,
    pub cycle: bool,
}

impl Default for IdentityInfo {
    fn default() -> Self {
        Self {
            always: false,
            start: 1,
            increment: 1,
            minimum: 1,
            maximum: i64::MAX,
            cycle: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub default_sql: Option<String>,
    pub identity: Option<IdentityInfo>,
    pub remarks: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default_sql: None,
            identity: None,
            remarks: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, sql: impl Into<String>) -> Self {
        self.default_sql = Some(sql.into());
        self
    }

    pub fn with_identity(mut self, identity: IdentityInfo) -> Self {
        self.identity = Some(identity);
        self.nullable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Check => "CHECK",
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(
            self,
            ConstraintKind::PrimaryKey | ConstraintKind::Unique | ConstraintKind::ForeignKey
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }

    /// `java.sql.DatabaseMetaData` rule code
    pub fn jdbc_code(&self) -> i64 {
        match self {
            ReferentialAction::Cascade => 0,
            ReferentialAction::Restrict => 1,
            ReferentialAction::SetNull => 2,
            ReferentialAction::NoAction => 3,
            ReferentialAction::SetDefault => 4,
        }
    }

    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => ReferentialAction::Cascade,
            "RESTRICT" => ReferentialAction::Restrict,
            "SET NULL" => ReferentialAction::SetNull,
            "SET DEFAULT" => ReferentialAction::SetDefault,
            _ => ReferentialAction::NoAction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: QualifiedName,
    /// Name of the referenced PRIMARY KEY / UNIQUE constraint when it can be
    /// resolved
    pub unique_constraint: Option<String>,
    pub columns: Vec<String>,
    pub update_rule: ReferentialAction,
    pub delete_rule: ReferentialAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintInfo {
    pub name: String,
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    pub check_clause: Option<String>,
    pub references: Option<ForeignKeyRef>,
    pub deferrable: bool,
    pub initially_deferred: bool,
}

impl ConstraintInfo {
    pub fn primary_key(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::keyed(name, ConstraintKind::PrimaryKey, columns)
    }

    pub fn unique(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::keyed(name, ConstraintKind::Unique, columns)
    }

    pub fn check(name: impl Into<String>, clause: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Check,
            columns: Vec::new(),
            check_clause: Some(clause.into()),
            references: None,
            deferrable: false,
            initially_deferred: false,
        }
    }

    pub fn foreign_key(name: impl Into<String>, columns: &[&str], references: ForeignKeyRef) -> Self {
        let mut constraint = Self::keyed(name, ConstraintKind::ForeignKey, columns);
        constraint.references = Some(references);
        constraint
    }

    fn keyed(name: impl Into<String>, kind: ConstraintKind, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            check_clause: None,
            references: None,
            deferrable: false,
            initially_deferred: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
    /// Per-column sort direction, parallel to `columns`
    pub descending: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: QualifiedName,
    pub owner: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnInfo>,
    pub constraints: Vec<ConstraintInfo>,
    pub indexes: Vec<IndexInfo>,
    pub view_definition: Option<String>,
    pub writable: bool,
    pub on_commit_preserve: bool,
    pub remarks: Option<String>,
}

impl TableInfo {
    pub fn new(name: QualifiedName, owner: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name,
            owner: owner.into(),
            kind,
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            view_definition: None,
            writable: !kind.is_view(),
            on_commit_preserve: false,
            remarks: None,
        }
    }

    pub fn with_column(mut self, column: ColumnInfo) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintInfo) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_view_definition(mut self, sql: impl Into<String>) -> Self {
        self.view_definition = Some(sql.into());
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key(&self) -> Option<&ConstraintInfo> {
        self.constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::PrimaryKey)
    }

    pub fn is_temp(&self) -> bool {
        self.kind == TableKind::GlobalTemporary
    }
}

impl SchemaObject for TableInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Table
    }

    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Function,
    Procedure,
}

impl RoutineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineKind::Function => "FUNCTION",
            RoutineKind::Procedure => "PROCEDURE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineLanguage {
    Sql,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataAccess {
    NoSql,
    ContainsSql,
    ReadsSqlData,
    ModifiesSqlData,
}

impl DataAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataAccess::NoSql => "NO SQL",
            DataAccess::ContainsSql => "CONTAINS SQL",
            DataAccess::ReadsSqlData => "READS SQL DATA",
            DataAccess::ModifiesSqlData => "MODIFIES SQL DATA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineInfo {
    /// Routine name as invoked
    pub name: QualifiedName,
    /// Unique name across overloads
    pub specific_name: String,
    pub owner: String,
    pub kind: RoutineKind,
    pub language: RoutineLanguage,
    pub body: Option<String>,
    pub external_name: Option<String>,
    pub deterministic: bool,
    pub data_access: DataAccess,
    pub return_type: Option<DataType>,
    pub parameter_count: usize,
    pub null_call: bool,
    pub created: Option<NaiveDateTime>,
    pub remarks: Option<String>,
}

impl RoutineInfo {
    pub fn specific_qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.name.schema.clone(), self.specific_name.clone())
    }
}

impl SchemaObject for RoutineInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Routine
    }

    fn qualified_name(&self) -> QualifiedName {
        self.specific_qualified_name()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    pub name: QualifiedName,
    pub owner: String,
    pub data_type: DataType,
    pub start_with: i64,
    pub increment: i64,
    pub minimum: i64,
    pub maximum: i64,
    pub cycle: bool,
    pub next_value: i64,
}

impl SequenceInfo {
    pub fn new(name: QualifiedName, owner: impl Into<String>) -> Self {
        Self {
            name,
            owner: owner.into(),
            data_type: DataType::bigint(),
            start_with: 1,
            increment: 1,
            minimum: 1,
            maximum: i64::MAX,
            cycle: false,
            next_value: 1,
        }
    }
}

impl SchemaObject for SequenceInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Sequence
    }

    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerTiming::Before => "BEFORE",
            TriggerTiming::After => "AFTER",
            TriggerTiming::InsteadOf => "INSTEAD OF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::Insert => "INSERT",
            TriggerEvent::Update => "UPDATE",
            TriggerEvent::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    pub name: QualifiedName,
    pub table: QualifiedName,
    pub owner: String,
    pub timing: TriggerTiming,
    pub event: TriggerEvent,
    pub for_each_row: bool,
    pub condition: Option<String>,
    pub action: Option<String>,
    pub action_order: i64,
    pub created: Option<NaiveDateTime>,
}

impl SchemaObject for TriggerInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Trigger
    }

    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainInfo {
    pub name: QualifiedName,
    pub owner: String,
    pub data_type: DataType,
    pub default_sql: Option<String>,
    pub check_constraints: Vec<ConstraintInfo>,
}

impl SchemaObject for DomainInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Domain
    }

    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSetInfo {
    pub name: QualifiedName,
    pub owner: String,
    pub repertoire: String,
    pub form_of_use: String,
    pub default_collation: Option<QualifiedName>,
}

impl SchemaObject for CharacterSetInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::CharacterSet
    }

    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationInfo {
    pub name: QualifiedName,
    pub owner: String,
    pub pad_space: bool,
}

impl SchemaObject for CollationInfo {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Collation
    }

    fn qualified_name(&self) -> QualifiedName {
        self.name.clone()
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}
