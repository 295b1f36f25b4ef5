use sqlparser::ast::{Expr, ObjectName, Query, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::catalog::{TableKind, TriggerEvent, TriggerTiming};
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CHARACTER_DATA, ColumnType, SQL_IDENTIFIER, Value, YES_OR_NO};

pub fn system_tables_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CAT", SQL_IDENTIFIER)
        .column("TABLE_SCHEM", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("TABLE_TYPE", CHARACTER_DATA)
        .column("REMARKS", CHARACTER_DATA)
        .column("TYPE_CAT", SQL_IDENTIFIER)
        .column("TYPE_SCHEM", SQL_IDENTIFIER)
        .column("TYPE_NAME", SQL_IDENTIFIER)
        .column("SELF_REFERENCING_COL_NAME", SQL_IDENTIFIER)
        .column("REF_GENERATION", CHARACTER_DATA)
        .column("HSQLDB_TYPE", SQL_IDENTIFIER)
        .column("READ_ONLY", ColumnType::Boolean)
        .column("COMMIT_ACTION", CHARACTER_DATA)
        .order_key(&[3, 1, 2, 0])
}

/// One row per visible table, in the JDBC `getTables` layout
pub fn system_tables(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CAT: usize = 0;
    const TABLE_SCHEM: usize = 1;
    const TABLE_NAME: usize = 2;
    const TABLE_TYPE: usize = 3;
    const REMARKS: usize = 4;
    const HSQLDB_TYPE: usize = 10;
    const READ_ONLY: usize = 11;
    const COMMIT_ACTION: usize = 12;

    let catalog = ctx.catalog_name();
    for table in ctx.all_tables()? {
        if !ctx.is_accessible_table(&table) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(TABLE_CAT, &catalog);
        row.set(TABLE_SCHEM, &table.name.schema);
        row.set(TABLE_NAME, &table.name.name);
        row.set(TABLE_TYPE, table.kind.jdbc_table_type());
        row.set(REMARKS, table.remarks.as_ref());
        row.set(
            HSQLDB_TYPE,
            match table.kind {
                TableKind::BaseTable => Some("MEMORY"),
                TableKind::GlobalTemporary => Some("TEMP"),
                TableKind::View | TableKind::System => None,
            },
        );
        row.set(READ_ONLY, !table.writable);
        row.set(COMMIT_ACTION, commit_action(table.is_temp(), table.on_commit_preserve));
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn tables_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("TABLE_TYPE", CHARACTER_DATA)
        .column("SELF_REFERENCING_COLUMN_NAME", SQL_IDENTIFIER)
        .column("REFERENCE_GENERATION", CHARACTER_DATA)
        .column("USER_DEFINED_TYPE_CATALOG", SQL_IDENTIFIER)
        .column("USER_DEFINED_TYPE_SCHEMA", SQL_IDENTIFIER)
        .column("USER_DEFINED_TYPE_NAME", SQL_IDENTIFIER)
        .column("IS_INSERTABLE_INTO", YES_OR_NO)
        .column("IS_TYPED", YES_OR_NO)
        .column("COMMIT_ACTION", CHARACTER_DATA)
        .order_key(&[0, 1, 2])
}

/// Standard `TABLES` view; system tables list themselves as views
pub fn tables(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CATALOG: usize = 0;
    const TABLE_SCHEMA: usize = 1;
    const TABLE_NAME: usize = 2;
    const TABLE_TYPE: usize = 3;
    const IS_INSERTABLE_INTO: usize = 9;
    const IS_TYPED: usize = 10;
    const COMMIT_ACTION: usize = 11;

    let catalog = ctx.catalog_name();
    for table in ctx.all_tables()? {
        if !ctx.is_accessible_table(&table) {
            continue;
        }
        let insertable = match table.kind {
            TableKind::System | TableKind::View => false,
            TableKind::GlobalTemporary => true,
            TableKind::BaseTable => table.writable,
        };
        let mut row = ctx.new_row();
        row.set(TABLE_CATALOG, &catalog);
        row.set(TABLE_SCHEMA, &table.name.schema);
        row.set(TABLE_NAME, &table.name.name);
        row.set(TABLE_TYPE, table.kind.sql_table_type());
        row.set(IS_INSERTABLE_INTO, Value::yes_no(insertable));
        row.set(IS_TYPED, Value::yes_no(false));
        row.set(COMMIT_ACTION, commit_action(table.is_temp(), table.on_commit_preserve));
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn views_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("VIEW_DEFINITION", CHARACTER_DATA)
        .column("CHECK_OPTION", CHARACTER_DATA)
        .column("IS_UPDATABLE", YES_OR_NO)
        .column("INSERTABLE_INTO", YES_OR_NO)
        .column("IS_TRIGGER_UPDATABLE", YES_OR_NO)
        .column("IS_TRIGGER_DELETABLE", YES_OR_NO)
        .column("IS_TRIGGER_INSERTABLE_INTO", YES_OR_NO)
        .order_key(&[1, 2, 0])
}

/// User views plus the system tables. Definition text needs full access.
pub fn views(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CATALOG: usize = 0;
    const TABLE_SCHEMA: usize = 1;
    const TABLE_NAME: usize = 2;
    const VIEW_DEFINITION: usize = 3;
    const CHECK_OPTION: usize = 4;
    const IS_UPDATABLE: usize = 5;
    const INSERTABLE_INTO: usize = 6;
    const IS_TRIGGER_UPDATABLE: usize = 7;
    const IS_TRIGGER_DELETABLE: usize = 8;
    const IS_TRIGGER_INSERTABLE_INTO: usize = 9;

    let catalog = ctx.catalog_name();
    let triggers = ctx.catalog().triggers()?;
    for table in ctx.all_tables()? {
        if !table.kind.is_view() || !ctx.is_accessible_table(&table) {
            continue;
        }
        let instead_of = |event: TriggerEvent| {
            triggers.iter().any(|t| {
                t.table == table.name && t.event == event && t.timing == TriggerTiming::InsteadOf
            })
        };

        let mut row = ctx.new_row();
        row.set(TABLE_CATALOG, &catalog);
        row.set(TABLE_SCHEMA, &table.name.schema);
        row.set(TABLE_NAME, &table.name.name);
        if table.kind == TableKind::View && ctx.is_fully_accessible(&table) {
            row.set(VIEW_DEFINITION, table.view_definition.as_ref());
        }
        row.set(CHECK_OPTION, "NONE");
        row.set(IS_UPDATABLE, Value::yes_no(table.writable));
        row.set(INSERTABLE_INTO, Value::yes_no(table.writable));
        row.set(IS_TRIGGER_UPDATABLE, Value::yes_no(instead_of(TriggerEvent::Update)));
        row.set(IS_TRIGGER_DELETABLE, Value::yes_no(instead_of(TriggerEvent::Delete)));
        row.set(IS_TRIGGER_INSERTABLE_INTO, Value::yes_no(instead_of(TriggerEvent::Insert)));
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn view_table_usage_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("VIEW_CATALOG", SQL_IDENTIFIER)
        .column("VIEW_SCHEMA", SQL_IDENTIFIER)
        .column("VIEW_NAME", SQL_IDENTIFIER)
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .order_key(&[0, 1, 2, 3, 4, 5])
}

/// Tables named in the text of views the session fully owns. Names that
/// do not resolve to a visible table are skipped; unqualified names
/// resolve in the view's schema.
pub fn view_table_usage(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const VIEW_CATALOG: usize = 0;
    const VIEW_SCHEMA: usize = 1;
    const VIEW_NAME: usize = 2;
    const TABLE_CATALOG: usize = 3;
    const TABLE_SCHEMA: usize = 4;
    const TABLE_NAME: usize = 5;

    let catalog = ctx.catalog_name();
    let tables = ctx.all_tables()?;
    for view in tables.iter().filter(|t| t.kind == TableKind::View) {
        if !ctx.is_fully_accessible(view) {
            continue;
        }
        let Some(definition) = &view.view_definition else {
            continue;
        };
        for name in referenced_tables(definition) {
            let (schema, table_name) = match name.as_slice() {
                [table] => (view.name.schema.as_str(), table.as_str()),
                [.., schema, table] => (schema.as_str(), table.as_str()),
                [] => continue,
            };
            let Some(used) = tables.iter().find(|t| {
                t.name.schema.eq_ignore_ascii_case(schema) && t.name.name.eq_ignore_ascii_case(table_name)
            }) else {
                continue;
            };
            if !ctx.is_accessible_table(used) {
                continue;
            }
            let mut row = ctx.new_row();
            row.set(VIEW_CATALOG, &catalog);
            row.set(VIEW_SCHEMA, &view.name.schema);
            row.set(VIEW_NAME, &view.name.name);
            row.set(TABLE_CATALOG, &catalog);
            row.set(TABLE_SCHEMA, &used.name.schema);
            row.set(TABLE_NAME, &used.name.name);
            ctx.commit(row)?;
        }
    }
    Ok(())
}

/// Relation names, split into their parts, of every table a query text
/// reads. Unparsable text names nothing.
fn referenced_tables(definition: &str) -> Vec<Vec<String>> {
    let Ok(statements) = Parser::parse_sql(&GenericDialect {}, definition) else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for statement in &statements {
        if let Statement::Query(query) = statement {
            query_relations(query, &mut names);
        }
    }
    names
}

fn query_relations(query: &Query, names: &mut Vec<Vec<String>>) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            query_relations(&cte.query, names);
        }
    }
    set_relations(&query.body, names);
}

fn set_relations(body: &SetExpr, names: &mut Vec<Vec<String>>) {
    match body {
        SetExpr::Select(select) => {
            for table in &select.from {
                join_relations(table, names);
            }
            if let Some(selection) = &select.selection {
                expr_relations(selection, names);
            }
        }
        SetExpr::Query(query) => query_relations(query, names),
        SetExpr::SetOperation { left, right, .. } => {
            set_relations(left, names);
            set_relations(right, names);
        }
        _ => {}
    }
}

fn join_relations(table: &TableWithJoins, names: &mut Vec<Vec<String>>) {
    factor_relations(&table.relation, names);
    for join in &table.joins {
        factor_relations(&join.relation, names);
    }
}

fn factor_relations(factor: &TableFactor, names: &mut Vec<Vec<String>>) {
    match factor {
        TableFactor::Table { name, .. } => names.push(name_parts(name)),
        TableFactor::Derived { subquery, .. } => query_relations(subquery, names),
        TableFactor::NestedJoin { table_with_joins, .. } => join_relations(table_with_joins, names),
        _ => {}
    }
}

/// Subqueries reachable through boolean structure of a WHERE clause
fn expr_relations(expr: &Expr, names: &mut Vec<Vec<String>>) {
    match expr {
        Expr::Subquery(query) | Expr::Exists { subquery: query, .. } => query_relations(query, names),
        Expr::InSubquery { subquery, .. } => set_relations(subquery, names),
        Expr::BinaryOp { left, right, .. } => {
            expr_relations(left, names);
            expr_relations(right, names);
        }
        Expr::UnaryOp { expr, .. } | Expr::Nested(expr) => expr_relations(expr, names),
        _ => {}
    }
}

fn name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .filter_map(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .collect()
}

/// `PRESERVE` or `DELETE` for temporary tables, null otherwise
fn commit_action(temp: bool, preserve: bool) -> Option<&'static str> {
    match (temp, preserve) {
        (false, _) => None,
        (true, true) => Some("PRESERVE"),
        (true, false) => Some("DELETE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_tables_walks_subqueries_and_joins() {
        let names = referenced_tables(
            "SELECT a.x FROM a JOIN s.b ON a.id = b.id WHERE a.y IN (SELECT y FROM c)",
        );
        let expected: Vec<Vec<String>> = vec![
            vec!["a".into()],
            vec!["s".into(), "b".into()],
            vec!["c".into()],
        ];
        assert_eq!(names, expected);
        assert!(referenced_tables("SELECT * FROM (").is_empty());
    }

    #[test]
    fn test_commit_action() {
        assert_eq!(commit_action(false, true), None);
        assert_eq!(commit_action(true, true), Some("PRESERVE"));
        assert_eq!(commit_action(true, false), Some("DELETE"));
    }
}
