use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::Connection;
use sqlparser::ast::{ColumnOption, Statement, TableConstraint};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::{debug, trace};

use super::memory::DEFAULT_CATALOG;
use super::objects::*;
use super::{CatalogSource, ChangeCounter};
use crate::error::Result;

static VIEW_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*CREATE\s+(?:TEMP(?:ORARY)?\s+)?VIEW\s+.*?\s+AS\s+(.*?)\s*;?\s*$")
        .expect("valid view regex")
});

static TRIGGER_DDL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*CREATE\s+(?:TEMP(?:ORARY)?\s+)?TRIGGER\s+(?:IF\s+NOT\s+EXISTS\s+)?\S+\s+(BEFORE\s+|AFTER\s+|INSTEAD\s+OF\s+)?(INSERT|DELETE|UPDATE)\b.*?\bON\s+\S+(?:\s+FOR\s+EACH\s+ROW)?(?:\s+WHEN\s+(.*?))?\s+BEGIN\s+(.*?)\s*END\s*;?\s*$",
    )
    .expect("valid trigger regex")
});

static AUTOINCREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bAUTOINCREMENT\b").expect("valid autoincrement regex"));

static CHECK_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:\bCONSTRAINT\s+("[^"]+"|`[^`]+`|\[[^\]]+\]|\S+)\s+)?\bCHECK\s*\("#)
        .expect("valid check regex")
});

/// Catalog read live from an SQLite connection.
///
/// Every object is reported as owned by the configured owner, except the
/// built-in collations and character set, which belong to `_SYSTEM`.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
    owner: String,
    counter: ChangeCounter,
    seen_schema_version: Mutex<Option<i64>>,
}

struct MasterEntry {
    name: String,
    table_name: String,
    sql: Option<String>,
}

impl SqliteCatalog {
    pub fn open(path: &Path, owner: &str, counter: ChangeCounter) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!("Opened SQLite catalog at {}", path.display());
        Ok(Self::from_connection(conn, owner, counter))
    }

    pub fn open_in_memory(owner: &str, counter: ChangeCounter) -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?, owner, counter))
    }

    pub fn from_connection(conn: Connection, owner: &str, counter: ChangeCounter) -> Self {
        Self {
            conn: Mutex::new(conn),
            owner: owner.to_string(),
            counter,
            seen_schema_version: Mutex::new(None),
        }
    }

    pub fn counter(&self) -> &ChangeCounter {
        &self.counter
    }

    /// Runs statements on the underlying connection. DDL issued here is
    /// picked up through `PRAGMA schema_version` on the next counter read.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    fn load_table(&self, conn: &Connection, schema: &str, entry: &MasterEntry, is_view: bool) -> Result<TableInfo> {
        let kind = if is_view {
            TableKind::View
        } else if schema == "temp" {
            TableKind::GlobalTemporary
        } else {
            TableKind::BaseTable
        };
        let mut table = TableInfo::new(QualifiedName::new(schema, &entry.name), &self.owner, kind);
        table.on_commit_preserve = kind == TableKind::GlobalTemporary;
        let sql = entry.sql.clone().unwrap_or_default();
        let charset = database_charset(conn)?;

        let mut pk_columns: Vec<(i64, String)> = Vec::new();
        let pragma = format!("PRAGMA {}.table_info({})", quote(schema), quote(&entry.name));
        let mut stmt = conn.prepare(&pragma)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;
        for row in rows {
            let (name, declared, not_null, default_sql, pk) = row?;
            let mut data_type = declared_type(declared.as_deref().unwrap_or(""));
            if data_type.is_character() {
                data_type.character_set = Some(charset.clone());
            }
            let mut column = ColumnInfo::new(&name, data_type);
            column.nullable = not_null == 0 && pk == 0;
            column.default_sql = default_sql;
            if pk > 0 {
                pk_columns.push((pk, name));
            }
            table.columns.push(column);
        }

        if is_view {
            table.view_definition = Some(
                VIEW_BODY
                    .captures(&sql)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| sql.clone()),
            );
            return Ok(table);
        }

        pk_columns.sort_by_key(|(seq, _)| *seq);
        if !pk_columns.is_empty() {
            let columns: Vec<&str> = pk_columns.iter().map(|(_, c)| c.as_str()).collect();
            if columns.len() == 1 && AUTOINCREMENT.is_match(&sql) {
                if let Some(index) = table.column_index(columns[0]) {
                    table.columns[index].identity = Some(IdentityInfo::default());
                }
            }
            table.constraints.push(ConstraintInfo::primary_key(
                format!("SYS_PK_{}", entry.name),
                &columns,
            ));
        }

        self.load_indexes(conn, schema, &mut table)?;
        load_foreign_keys(conn, schema, &mut table)?;
        table.constraints.extend(check_constraints(&entry.name, &sql));
        Ok(table)
    }

    fn load_indexes(&self, conn: &Connection, schema: &str, table: &mut TableInfo) -> Result<()> {
        let pragma = format!("PRAGMA {}.index_list({})", quote(schema), quote(&table.name.name));
        let mut stmt = conn.prepare(&pragma)?;
        let entries: Vec<(String, bool, String)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? != 0,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut unique_count = 0;
        // index_list reports newest first
        for (index_name, unique, origin) in entries.into_iter().rev() {
            let pragma = format!("PRAGMA {}.index_xinfo({})", quote(schema), quote(&index_name));
            let mut stmt = conn.prepare(&pragma)?;
            let mut columns = Vec::new();
            let mut descending = Vec::new();
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)? != 0,
                    row.get::<_, i64>(5)? != 0,
                ))
            })?;
            for row in rows {
                let (name, desc, key) = row?;
                if let (Some(name), true) = (name, key) {
                    columns.push(name);
                    descending.push(desc);
                }
            }

            if origin == "u" {
                unique_count += 1;
                let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
                table.constraints.push(ConstraintInfo::unique(
                    format!("SYS_CT_{}_{}", table.name.name, unique_count),
                    &refs,
                ));
            }
            table.indexes.push(IndexInfo {
                name: index_name,
                unique,
                columns,
                descending,
            });
        }
        Ok(())
    }

    fn master_entries(&self, conn: &Connection, schema: &str, kind: &str) -> Result<Vec<MasterEntry>> {
        let sql = format!(
            "SELECT name, tbl_name, sql FROM {}.sqlite_master \
             WHERE type = ?1 AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
            quote(schema)
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([kind], |row| {
                Ok(MasterEntry {
                    name: row.get(0)?,
                    table_name: row.get(1)?,
                    sql: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn attached_schemas(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA database_list")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

fn database_charset(conn: &Connection) -> Result<String> {
    let encoding: String = conn.query_row("PRAGMA encoding", [], |row| row.get(0))?;
    Ok(encoding.replace('-', ""))
}

fn load_foreign_keys(conn: &Connection, schema: &str, table: &mut TableInfo) -> Result<()> {
    let pragma = format!("PRAGMA {}.foreign_key_list({})", quote(schema), quote(&table.name.name));
    let mut stmt = conn.prepare(&pragma)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut grouped: Vec<(i64, ConstraintInfo)> = Vec::new();
    for row in rows {
        let (id, target, from, to, on_update, on_delete) = row?;
        let position = match grouped.iter().position(|(gid, _)| *gid == id) {
            Some(position) => position,
            None => {
                let references = ForeignKeyRef {
                    table: QualifiedName::new(schema, target),
                    unique_constraint: None,
                    columns: Vec::new(),
                    update_rule: ReferentialAction::parse(&on_update),
                    delete_rule: ReferentialAction::parse(&on_delete),
                };
                grouped.push((
                    id,
                    ConstraintInfo::foreign_key(format!("SYS_FK_{}_{}", table.name.name, id), &[], references),
                ));
                grouped.len() - 1
            }
        };
        let constraint = &mut grouped[position].1;
        constraint.columns.push(from);
        if let (Some(to), Some(references)) = (to, constraint.references.as_mut()) {
            references.columns.push(to);
        }
    }
    // foreign_key_list reports newest first
    table.constraints.extend(grouped.into_iter().rev().map(|(_, c)| c));
    Ok(())
}

/// Fills in the referenced columns and unique constraint of every foreign
/// key once all tables are known. Unresolvable targets stay `None`.
fn resolve_foreign_keys(tables: &mut [TableInfo]) {
    let keys: HashMap<QualifiedName, Vec<(String, Vec<String>, bool)>> = tables
        .iter()
        .map(|t| {
            let keys = t
                .constraints
                .iter()
                .filter(|c| matches!(c.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique))
                .map(|c| (c.name.clone(), c.columns.clone(), c.kind == ConstraintKind::PrimaryKey))
                .collect();
            (t.name.clone(), keys)
        })
        .collect();

    for table in tables.iter_mut() {
        for constraint in table.constraints.iter_mut() {
            let Some(references) = constraint.references.as_mut() else {
                continue;
            };
            let Some(candidates) = keys.get(&references.table) else {
                trace!("Foreign key {} references unknown table {}", constraint.name, references.table);
                continue;
            };
            if references.columns.is_empty() {
                if let Some((_, columns, _)) = candidates.iter().find(|(_, _, primary)| *primary) {
                    references.columns = columns.clone();
                }
            }
            references.unique_constraint = candidates
                .iter()
                .find(|(_, columns, _)| same_columns(columns, &references.columns))
                .map(|(name, _, _)| name.clone());
        }
    }
}

fn same_columns(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

/// CHECK constraints recovered from the stored CREATE TABLE text. When the
/// parser rejects the statement the constraints are still listed, without
/// their clauses.
fn check_constraints(table: &str, sql: &str) -> Vec<ConstraintInfo> {
    let statements = match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) => statements,
        Err(e) => {
            debug!("Cannot parse CHECK clauses of {}: {}", table, e);
            return unparsed_check_constraints(table, sql);
        }
    };
    let Some(Statement::CreateTable(create)) = statements.into_iter().next() else {
        return Vec::new();
    };

    let mut checks = Vec::new();
    let mut counter = 0;
    let mut synthesized = |declared: Option<String>| {
        counter += 1;
        declared.unwrap_or_else(|| format!("SYS_CK_{table}_{counter}"))
    };

    for column in &create.columns {
        for option in &column.options {
            if let ColumnOption::Check(expr) = &option.option {
                let name = synthesized(option.name.as_ref().map(|n| n.value.clone()));
                let mut check = ConstraintInfo::check(name, expr.to_string());
                check.columns = vec![column.name.value.clone()];
                checks.push(check);
            }
        }
    }
    for constraint in &create.constraints {
        if let TableConstraint::Check { name, expr, .. } = constraint {
            let name = synthesized(name.as_ref().map(|n| n.value.clone()));
            checks.push(ConstraintInfo::check(name, expr.to_string()));
        }
    }
    checks
}

/// Names of the CHECK constraints in DDL the parser cannot read, numbered
/// the same way as parsed ones
fn unparsed_check_constraints(table: &str, sql: &str) -> Vec<ConstraintInfo> {
    CHECK_KEYWORD
        .captures_iter(sql)
        .enumerate()
        .map(|(i, captures)| {
            let name = captures
                .get(1)
                .map(|m| unquote(m.as_str()))
                .unwrap_or_else(|| format!("SYS_CK_{table}_{}", i + 1));
            let mut check = ConstraintInfo::check(name, "");
            check.check_clause = None;
            check
        })
        .collect()
}

fn unquote(identifier: &str) -> String {
    identifier
        .trim_matches(|c| matches!(c, '"' | '`' | '[' | ']' | '\''))
        .to_string()
}

/// Maps an SQLite declared column type onto the SQL type vocabulary,
/// following SQLite's affinity rules for names it does not know.
pub fn declared_type(declared: &str) -> DataType {
    let upper = declared.trim().to_uppercase();
    let (base, args) = match upper.find('(') {
        Some(open) => {
            let args: Vec<i64> = upper[open + 1..]
                .trim_end_matches(')')
                .split(',')
                .filter_map(|a| a.trim().parse().ok())
                .collect();
            (upper[..open].trim().to_string(), args)
        }
        None => (upper.clone(), Vec::new()),
    };

    if base.contains("INT") {
        if base.contains("INT2") || base.contains("SMALLINT") {
            return DataType {
                name: "SMALLINT".into(),
                numeric_precision: Some(16),
                numeric_scale: Some(0),
                ..Default::default()
            };
        }
        if base.contains("INT8") || base.contains("BIGINT") {
            return DataType::bigint();
        }
        return DataType::integer();
    }
    if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        let name = if base.contains("VAR") || base.contains("TEXT") || base.contains("CLOB") {
            "CHARACTER VARYING"
        } else {
            "CHARACTER"
        };
        return DataType {
            name: name.into(),
            character_maximum_length: args.first().copied(),
            ..Default::default()
        };
    }
    if base.is_empty() || base.contains("BLOB") {
        return DataType::named("BLOB");
    }
    if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        return DataType {
            name: "DOUBLE".into(),
            numeric_precision: Some(53),
            ..Default::default()
        };
    }
    if base.contains("BOOL") {
        return DataType::named("BOOLEAN");
    }
    if base.contains("TIMESTAMP") || base.contains("DATETIME") {
        return DataType::named("TIMESTAMP");
    }
    if base == "DATE" || base == "TIME" {
        return DataType::named(base);
    }
    if base.contains("DEC") || base.contains("NUMERIC") {
        return DataType {
            name: if base.contains("DEC") { "DECIMAL" } else { "NUMERIC" }.into(),
            numeric_precision: Some(args.first().copied().unwrap_or(128)),
            numeric_scale: Some(args.get(1).copied().unwrap_or(0)),
            ..Default::default()
        };
    }
    DataType::named(base)
}

fn parse_trigger(schema: &str, entry: &MasterEntry, owner: &str) -> Option<TriggerInfo> {
    let sql = entry.sql.as_deref()?;
    let captures = TRIGGER_DDL.captures(sql);
    let timing = captures
        .as_ref()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_ascii_uppercase());
    let event = captures
        .as_ref()
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_ascii_uppercase());

    let event = match event.as_deref() {
        Some("INSERT") => TriggerEvent::Insert,
        Some("DELETE") => TriggerEvent::Delete,
        Some("UPDATE") => TriggerEvent::Update,
        _ => {
            debug!("Cannot parse trigger {}.{}", schema, entry.name);
            return None;
        }
    };
    let timing = match timing.as_deref() {
        Some("AFTER") => TriggerTiming::After,
        Some(t) if t.starts_with("INSTEAD") => TriggerTiming::InsteadOf,
        _ => TriggerTiming::Before,
    };

    Some(TriggerInfo {
        name: QualifiedName::new(schema, &entry.name),
        table: QualifiedName::new(schema, &entry.table_name),
        owner: owner.to_string(),
        timing,
        event,
        for_each_row: true,
        condition: captures
            .as_ref()
            .and_then(|c| c.get(3))
            .map(|m| m.as_str().trim().to_string()),
        action: captures
            .as_ref()
            .and_then(|c| c.get(4))
            .map(|m| m.as_str().trim().to_string()),
        action_order: 1,
        created: None,
    })
}

impl CatalogSource for SqliteCatalog {
    fn schema_change_counter(&self) -> Result<u64> {
        let version: i64 = self
            .conn
            .lock()
            .query_row("PRAGMA schema_version", [], |row| row.get(0))?;
        let mut seen = self.seen_schema_version.lock();
        match *seen {
            Some(previous) if previous != version => {
                let value = self.counter.bump();
                debug!("SQLite schema_version {} -> {}, counter now {}", previous, version, value);
            }
            _ => {}
        }
        *seen = Some(version);
        Ok(self.counter.current())
    }

    fn catalog_name(&self) -> String {
        DEFAULT_CATALOG.to_string()
    }

    fn default_schema(&self) -> String {
        "main".to_string()
    }

    fn schemas(&self) -> Result<Vec<SchemaInfo>> {
        let conn = self.conn.lock();
        let charset = database_charset(&conn)?;
        let mut schemas = vec![SchemaInfo {
            name: INFORMATION_SCHEMA.to_string(),
            owner: SYSTEM_AUTHORIZATION.to_string(),
            default_character_set: Some(charset.clone()),
        }];
        for name in attached_schemas(&conn)? {
            schemas.push(SchemaInfo {
                name,
                owner: self.owner.clone(),
                default_character_set: Some(charset.clone()),
            });
        }
        Ok(schemas)
    }

    fn tables(&self) -> Result<Vec<TableInfo>> {
        let conn = self.conn.lock();
        let mut tables = Vec::new();
        for schema in attached_schemas(&conn)? {
            for entry in self.master_entries(&conn, &schema, "table")? {
                tables.push(self.load_table(&conn, &schema, &entry, false)?);
            }
            for entry in self.master_entries(&conn, &schema, "view")? {
                tables.push(self.load_table(&conn, &schema, &entry, true)?);
            }
        }
        resolve_foreign_keys(&mut tables);
        Ok(tables)
    }

    fn sequences(&self) -> Result<Vec<SequenceInfo>> {
        let conn = self.conn.lock();
        let mut sequences = Vec::new();
        for schema in attached_schemas(&conn)? {
            let exists: i64 = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM {}.sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
                    quote(&schema)
                ),
                [],
                |row| row.get(0),
            )?;
            if exists == 0 {
                continue;
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT name, seq FROM {}.sqlite_sequence ORDER BY rowid",
                quote(&schema)
            ))?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
            for row in rows {
                let (table, seq) = row?;
                let mut sequence =
                    SequenceInfo::new(QualifiedName::new(&schema, format!("{table}_SEQ")), &self.owner);
                sequence.next_value = seq.saturating_add(1);
                sequences.push(sequence);
            }
        }
        Ok(sequences)
    }

    fn triggers(&self) -> Result<Vec<TriggerInfo>> {
        let conn = self.conn.lock();
        let mut triggers = Vec::new();
        for schema in attached_schemas(&conn)? {
            for entry in self.master_entries(&conn, &schema, "trigger")? {
                if let Some(trigger) = parse_trigger(&schema, &entry, &self.owner) {
                    triggers.push(trigger);
                }
            }
        }
        Ok(triggers)
    }

    fn character_sets(&self) -> Result<Vec<CharacterSetInfo>> {
        let conn = self.conn.lock();
        let encoding: String = conn.query_row("PRAGMA encoding", [], |row| row.get(0))?;
        Ok(vec![CharacterSetInfo {
            name: QualifiedName::new(INFORMATION_SCHEMA, encoding.replace('-', "")),
            owner: SYSTEM_AUTHORIZATION.to_string(),
            repertoire: "UCS".to_string(),
            form_of_use: encoding,
            default_collation: Some(QualifiedName::new(INFORMATION_SCHEMA, "BINARY")),
        }])
    }

    fn collations(&self) -> Result<Vec<CollationInfo>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("PRAGMA collation_list")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names
            .into_iter()
            .rev()
            .map(|name| CollationInfo {
                pad_space: name.eq_ignore_ascii_case("RTRIM"),
                name: QualifiedName::new(INFORMATION_SCHEMA, name),
                owner: SYSTEM_AUTHORIZATION.to_string(),
            })
            .collect())
    }
}
