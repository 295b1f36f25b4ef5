use super::{cardinal, int};
use crate::catalog::{ConstraintInfo, ConstraintKind, TableInfo, TableKind};
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CARDINAL_NUMBER, CHARACTER_DATA, ColumnType, SQL_IDENTIFIER, Value, YES_OR_NO};

/// Visible tables that can carry constraints
fn constrained_tables(ctx: &GenerationContext<'_>) -> Result<Vec<TableInfo>> {
    Ok(ctx
        .catalog()
        .tables()?
        .into_iter()
        .filter(|t| t.kind != TableKind::System && ctx.is_accessible_table(t))
        .collect())
}

pub fn primary_keys_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CAT", SQL_IDENTIFIER)
        .column("TABLE_SCHEM", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("KEY_SEQ", ColumnType::SmallInt)
        .column("PK_NAME", SQL_IDENTIFIER)
        .order_key(&[3, 2, 1, 0])
}

pub fn primary_keys(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CAT: usize = 0;
    const TABLE_SCHEM: usize = 1;
    const TABLE_NAME: usize = 2;
    const COLUMN_NAME: usize = 3;
    const KEY_SEQ: usize = 4;
    const PK_NAME: usize = 5;

    let catalog = ctx.catalog_name();
    for table in constrained_tables(ctx)? {
        let Some(pk) = table.primary_key() else {
            continue;
        };
        for (seq, column) in pk.columns.iter().enumerate() {
            let mut row = ctx.new_row();
            row.set(TABLE_CAT, &catalog);
            row.set(TABLE_SCHEM, &table.name.schema);
            row.set(TABLE_NAME, &table.name.name);
            row.set(COLUMN_NAME, column);
            row.set(KEY_SEQ, seq + 1);
            row.set(PK_NAME, &pk.name);
            ctx.commit(row)?;
        }
    }
    Ok(())
}

pub fn index_info_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CAT", SQL_IDENTIFIER)
        .column("TABLE_SCHEM", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("NON_UNIQUE", ColumnType::Boolean)
        .column("INDEX_QUALIFIER", SQL_IDENTIFIER)
        .column("INDEX_NAME", SQL_IDENTIFIER)
        .column("TYPE", ColumnType::SmallInt)
        .column("ORDINAL_POSITION", ColumnType::SmallInt)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("ASC_OR_DESC", CHARACTER_DATA)
        .column("CARDINALITY", ColumnType::Integer)
        .column("PAGES", ColumnType::Integer)
        .column("FILTER_CONDITION", CHARACTER_DATA)
        .column("ROW_CARDINALITY", ColumnType::Integer)
        .order_key(&[3, 6, 5, 7, 4, 2, 1])
}

/// One row per indexed column, JDBC `getIndexInfo` layout
pub fn index_info(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CAT: usize = 0;
    const TABLE_SCHEM: usize = 1;
    const TABLE_NAME: usize = 2;
    const NON_UNIQUE: usize = 3;
    const INDEX_QUALIFIER: usize = 4;
    const INDEX_NAME: usize = 5;
    const TYPE: usize = 6;
    const ORDINAL_POSITION: usize = 7;
    const COLUMN_NAME: usize = 8;
    const ASC_OR_DESC: usize = 9;

    // DatabaseMetaData.tableIndexOther
    const INDEX_OTHER: i64 = 3;

    let catalog = ctx.catalog_name();
    for table in constrained_tables(ctx)? {
        for index in &table.indexes {
            for (position, column) in index.columns.iter().enumerate() {
                let descending = index.descending.get(position).copied().unwrap_or(false);
                let mut row = ctx.new_row();
                row.set(TABLE_CAT, &catalog);
                row.set(TABLE_SCHEM, &table.name.schema);
                row.set(TABLE_NAME, &table.name.name);
                row.set(NON_UNIQUE, !index.unique);
                row.set(INDEX_QUALIFIER, &catalog);
                row.set(INDEX_NAME, &index.name);
                row.set(TYPE, INDEX_OTHER);
                row.set(ORDINAL_POSITION, position + 1);
                row.set(COLUMN_NAME, column);
                row.set(ASC_OR_DESC, if descending { "D" } else { "A" });
                ctx.commit(row)?;
            }
        }
    }
    Ok(())
}

pub fn cross_reference_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("PKTABLE_CAT", SQL_IDENTIFIER)
        .column("PKTABLE_SCHEM", SQL_IDENTIFIER)
        .column("PKTABLE_NAME", SQL_IDENTIFIER)
        .column("PKCOLUMN_NAME", SQL_IDENTIFIER)
        .column("FKTABLE_CAT", SQL_IDENTIFIER)
        .column("FKTABLE_SCHEM", SQL_IDENTIFIER)
        .column("FKTABLE_NAME", SQL_IDENTIFIER)
        .column("FKCOLUMN_NAME", SQL_IDENTIFIER)
        .column("KEY_SEQ", ColumnType::SmallInt)
        .column("UPDATE_RULE", ColumnType::SmallInt)
        .column("DELETE_RULE", ColumnType::SmallInt)
        .column("FK_NAME", SQL_IDENTIFIER)
        .column("PK_NAME", SQL_IDENTIFIER)
        .column("DEFERRABILITY", ColumnType::SmallInt)
        .order_key(&[4, 5, 6, 8, 11])
}

/// Column pairs of foreign keys between two visible tables, JDBC
/// `getCrossReference` layout
pub fn cross_reference(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const PKTABLE_CAT: usize = 0;
    const PKTABLE_SCHEM: usize = 1;
    const PKTABLE_NAME: usize = 2;
    const PKCOLUMN_NAME: usize = 3;
    const FKTABLE_CAT: usize = 4;
    const FKTABLE_SCHEM: usize = 5;
    const FKTABLE_NAME: usize = 6;
    const FKCOLUMN_NAME: usize = 7;
    const KEY_SEQ: usize = 8;
    const UPDATE_RULE: usize = 9;
    const DELETE_RULE: usize = 10;
    const FK_NAME: usize = 11;
    const PK_NAME: usize = 12;
    const DEFERRABILITY: usize = 13;

    let catalog = ctx.catalog_name();
    let tables = constrained_tables(ctx)?;
    for table in tables.iter().filter(|t| !t.kind.is_view()) {
        for constraint in &table.constraints {
            let Some(references) = &constraint.references else {
                continue;
            };
            if !tables.iter().any(|t| t.name == references.table) {
                continue;
            }
            let pairs = constraint.columns.iter().zip(&references.columns);
            for (seq, (fk_column, pk_column)) in pairs.enumerate() {
                let mut row = ctx.new_row();
                row.set(PKTABLE_CAT, &catalog);
                row.set(PKTABLE_SCHEM, &references.table.schema);
                row.set(PKTABLE_NAME, &references.table.name);
                row.set(PKCOLUMN_NAME, pk_column);
                row.set(FKTABLE_CAT, &catalog);
                row.set(FKTABLE_SCHEM, &table.name.schema);
                row.set(FKTABLE_NAME, &table.name.name);
                row.set(FKCOLUMN_NAME, fk_column);
                row.set(KEY_SEQ, seq + 1);
                row.set(UPDATE_RULE, references.update_rule.jdbc_code());
                row.set(DELETE_RULE, references.delete_rule.jdbc_code());
                row.set(FK_NAME, &constraint.name);
                row.set(PK_NAME, references.unique_constraint.as_ref());
                row.set(DEFERRABILITY, deferrability(constraint));
                ctx.commit(row)?;
            }
        }
    }
    Ok(())
}

/// `DatabaseMetaData.importedKey*` deferrability code
fn deferrability(constraint: &ConstraintInfo) -> i64 {
    match (constraint.deferrable, constraint.initially_deferred) {
        (false, _) => 7,
        (true, true) => 5,
        (true, false) => 6,
    }
}

pub fn best_row_identifier_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("SCOPE", ColumnType::SmallInt)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("DATA_TYPE", ColumnType::SmallInt)
        .column("TYPE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_SIZE", ColumnType::Integer)
        .column("BUFFER_LENGTH", ColumnType::Integer)
        .column("DECIMAL_DIGITS", ColumnType::Integer)
        .column("PSEUDO_COLUMN", ColumnType::SmallInt)
        .column("TABLE_CAT", SQL_IDENTIFIER)
        .column("TABLE_SCHEM", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("NULLABLE", ColumnType::SmallInt)
        .column("IN_KEY", ColumnType::Boolean)
        .order_key(&[0, 8, 9, 10, 1])
}

/// Optimal row-identifying column set of each visible base table, JDBC
/// `getBestRowIdentifier` layout
pub fn best_row_identifier(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const SCOPE: usize = 0;
    const COLUMN_NAME: usize = 1;
    const DATA_TYPE: usize = 2;
    const TYPE_NAME: usize = 3;
    const COLUMN_SIZE: usize = 4;
    const DECIMAL_DIGITS: usize = 6;
    const PSEUDO_COLUMN: usize = 7;
    const TABLE_CAT: usize = 8;
    const TABLE_SCHEM: usize = 9;
    const TABLE_NAME: usize = 10;
    const NULLABLE: usize = 11;
    const IN_KEY: usize = 12;

    // DatabaseMetaData.bestRowTemporary, bestRowSession, bestRowNotPseudo
    const SCOPE_TEMPORARY: i64 = 0;
    const SCOPE_SESSION: i64 = 2;
    const NOT_PSEUDO: i64 = 1;

    let catalog = ctx.catalog_name();
    for table in constrained_tables(ctx)?.iter().filter(|t| !t.kind.is_view()) {
        let Some((columns, in_key)) = best_row_key(table) else {
            continue;
        };
        let access = ctx.capability().column_access(table);
        let scope = if table.writable { SCOPE_TEMPORARY } else { SCOPE_SESSION };
        for name in columns {
            let Some(column) = table.column_index(name).map(|i| &table.columns[i]) else {
                continue;
            };
            if !access.allows(&column.name) {
                continue;
            }
            let data_type = &column.data_type;
            let mut row = ctx.new_row();
            row.set(SCOPE, scope);
            row.set(COLUMN_NAME, &column.name);
            row.set(DATA_TYPE, data_type.jdbc_type_code());
            row.set(TYPE_NAME, &data_type.name);
            row.set(
                COLUMN_SIZE,
                int(data_type.character_maximum_length.or(data_type.numeric_precision)),
            );
            row.set(DECIMAL_DIGITS, int(data_type.numeric_scale));
            row.set(PSEUDO_COLUMN, NOT_PSEUDO);
            row.set(TABLE_CAT, &catalog);
            row.set(TABLE_SCHEM, &table.name.schema);
            row.set(TABLE_NAME, &table.name.name);
            row.set(NULLABLE, i64::from(column.nullable));
            row.set(IN_KEY, in_key);
            ctx.commit(row)?;
        }
    }
    Ok(())
}

/// Columns that best identify a row of `table`, and whether they form a
/// key over NOT NULL columns. The primary key wins, then the narrowest
/// unique key whose columns are all NOT NULL, then the narrowest with at
/// least one NOT NULL column.
fn best_row_key(table: &TableInfo) -> Option<(&[String], bool)> {
    if let Some(pk) = table.primary_key() {
        return Some((&pk.columns, true));
    }

    let not_null = |name: &String| {
        table
            .column_index(name)
            .is_some_and(|i| !table.columns[i].nullable)
    };
    let candidates: Vec<&[String]> = table
        .constraints
        .iter()
        .filter(|c| c.kind == ConstraintKind::Unique)
        .map(|c| c.columns.as_slice())
        .chain(table.indexes.iter().filter(|i| i.unique).map(|i| i.columns.as_slice()))
        .filter(|columns| !columns.is_empty())
        .collect();

    if let Some(columns) = candidates
        .iter()
        .filter(|columns| columns.iter().all(not_null))
        .min_by_key(|columns| columns.len())
    {
        return Some((*columns, true));
    }
    candidates
        .iter()
        .filter(|columns| columns.iter().any(not_null))
        .min_by_key(|columns| columns.len())
        .map(|columns| (*columns, false))
}

pub fn table_constraints_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CONSTRAINT_CATALOG", SQL_IDENTIFIER)
        .column("CONSTRAINT_SCHEMA", SQL_IDENTIFIER)
        .column("CONSTRAINT_NAME", SQL_IDENTIFIER)
        .column("CONSTRAINT_TYPE", CHARACTER_DATA)
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("IS_DEFERRABLE", YES_OR_NO)
        .column("INITIALLY_DEFERRED", YES_OR_NO)
        .order_key(&[0, 1, 2, 4, 5, 6])
}

pub fn table_constraints(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const CONSTRAINT_CATALOG: usize = 0;
    const CONSTRAINT_SCHEMA: usize = 1;
    const CONSTRAINT_NAME: usize = 2;
    const CONSTRAINT_TYPE: usize = 3;
    const TABLE_CATALOG: usize = 4;
    const TABLE_SCHEMA: usize = 5;
    const TABLE_NAME: usize = 6;
    const IS_DEFERRABLE: usize = 7;
    const INITIALLY_DEFERRED: usize = 8;

    let catalog = ctx.catalog_name();
    for table in constrained_tables(ctx)? {
        for constraint in &table.constraints {
            let mut row = ctx.new_row();
            row.set(CONSTRAINT_CATALOG, &catalog);
            row.set(CONSTRAINT_SCHEMA, &table.name.schema);
            row.set(CONSTRAINT_NAME, &constraint.name);
            row.set(CONSTRAINT_TYPE, constraint.kind.as_str());
            row.set(TABLE_CATALOG, &catalog);
            row.set(TABLE_SCHEMA, &table.name.schema);
            row.set(TABLE_NAME, &table.name.name);
            row.set(IS_DEFERRABLE, Value::yes_no(constraint.deferrable));
            row.set(INITIALLY_DEFERRED, Value::yes_no(constraint.initially_deferred));
            ctx.commit(row)?;
        }
    }
    Ok(())
}

pub fn key_column_usage_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CONSTRAINT_CATALOG", SQL_IDENTIFIER)
        .column("CONSTRAINT_SCHEMA", SQL_IDENTIFIER)
        .column("CONSTRAINT_NAME", SQL_IDENTIFIER)
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("ORDINAL_POSITION", CARDINAL_NUMBER)
        .column("POSITION_IN_UNIQUE_CONSTRAINT", CARDINAL_NUMBER)
        .order_key(&[2, 1, 0, 6, 7])
}

/// Columns of key constraints, limited to the columns the session may see
pub fn key_column_usage(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const CONSTRAINT_CATALOG: usize = 0;
    const CONSTRAINT_SCHEMA: usize = 1;
    const CONSTRAINT_NAME: usize = 2;
    const TABLE_CATALOG: usize = 3;
    const TABLE_SCHEMA: usize = 4;
    const TABLE_NAME: usize = 5;
    const COLUMN_NAME: usize = 6;
    const ORDINAL_POSITION: usize = 7;
    const POSITION_IN_UNIQUE_CONSTRAINT: usize = 8;

    let catalog = ctx.catalog_name();
    let tables = constrained_tables(ctx)?;
    let all_tables = ctx.catalog().tables()?;
    for table in &tables {
        let access = ctx.capability().column_access(table);
        for constraint in table.constraints.iter().filter(|c| c.kind.is_key()) {
            for (position, column) in constraint.columns.iter().enumerate() {
                if !access.allows(column) {
                    continue;
                }
                let mut row = ctx.new_row();
                row.set(CONSTRAINT_CATALOG, &catalog);
                row.set(CONSTRAINT_SCHEMA, &table.name.schema);
                row.set(CONSTRAINT_NAME, &constraint.name);
                row.set(TABLE_CATALOG, &catalog);
                row.set(TABLE_SCHEMA, &table.name.schema);
                row.set(TABLE_NAME, &table.name.name);
                row.set(COLUMN_NAME, column);
                row.set(ORDINAL_POSITION, cardinal(Some(position as i64 + 1)));
                row.set(
                    POSITION_IN_UNIQUE_CONSTRAINT,
                    cardinal(referenced_position(&all_tables, constraint, position)),
                );
                ctx.commit(row)?;
            }
        }
    }
    Ok(())
}

/// 1-based position, within the referenced unique constraint, of the
/// column a foreign key column points at
fn referenced_position(tables: &[TableInfo], constraint: &ConstraintInfo, position: usize) -> Option<i64> {
    let references = constraint.references.as_ref()?;
    let target_column = references.columns.get(position)?;
    let unique_name = references.unique_constraint.as_ref()?;
    let target = tables.iter().find(|t| t.name == references.table)?;
    let unique = target.constraints.iter().find(|c| &c.name == unique_name)?;
    unique
        .columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(target_column))
        .map(|p| p as i64 + 1)
}

pub fn referential_constraints_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CONSTRAINT_CATALOG", SQL_IDENTIFIER)
        .column("CONSTRAINT_SCHEMA", SQL_IDENTIFIER)
        .column("CONSTRAINT_NAME", SQL_IDENTIFIER)
        .column("UNIQUE_CONSTRAINT_CATALOG", SQL_IDENTIFIER)
        .column("UNIQUE_CONSTRAINT_SCHEMA", SQL_IDENTIFIER)
        .column("UNIQUE_CONSTRAINT_NAME", SQL_IDENTIFIER)
        .column("MATCH_OPTION", CHARACTER_DATA)
        .column("UPDATE_RULE", CHARACTER_DATA)
        .column("DELETE_RULE", CHARACTER_DATA)
        .order_key(&[0, 1, 2])
}

/// Foreign keys; an unresolved referenced key leaves its cells null
pub fn referential_constraints(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const CONSTRAINT_CATALOG: usize = 0;
    const CONSTRAINT_SCHEMA: usize = 1;
    const CONSTRAINT_NAME: usize = 2;
    const UNIQUE_CONSTRAINT_CATALOG: usize = 3;
    const UNIQUE_CONSTRAINT_SCHEMA: usize = 4;
    const UNIQUE_CONSTRAINT_NAME: usize = 5;
    const MATCH_OPTION: usize = 6;
    const UPDATE_RULE: usize = 7;
    const DELETE_RULE: usize = 8;

    let catalog = ctx.catalog_name();
    for table in constrained_tables(ctx)? {
        for constraint in &table.constraints {
            let Some(references) = &constraint.references else {
                continue;
            };
            let mut row = ctx.new_row();
            row.set(CONSTRAINT_CATALOG, &catalog);
            row.set(CONSTRAINT_SCHEMA, &table.name.schema);
            row.set(CONSTRAINT_NAME, &constraint.name);
            if let Some(unique) = &references.unique_constraint {
                row.set(UNIQUE_CONSTRAINT_CATALOG, &catalog);
                row.set(UNIQUE_CONSTRAINT_SCHEMA, &references.table.schema);
                row.set(UNIQUE_CONSTRAINT_NAME, unique);
            }
            row.set(MATCH_OPTION, "NONE");
            row.set(UPDATE_RULE, references.update_rule.as_str());
            row.set(DELETE_RULE, references.delete_rule.as_str());
            ctx.commit(row)?;
        }
    }
    Ok(())
}

pub fn check_constraints_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CONSTRAINT_CATALOG", SQL_IDENTIFIER)
        .column("CONSTRAINT_SCHEMA", SQL_IDENTIFIER)
        .column("CONSTRAINT_NAME", SQL_IDENTIFIER)
        .column("CHECK_CLAUSE", CHARACTER_DATA)
        .order_key(&[2, 1, 0])
}

/// Table and domain CHECK constraints; the clause needs full access
pub fn check_constraints(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const CONSTRAINT_CATALOG: usize = 0;
    const CONSTRAINT_SCHEMA: usize = 1;
    const CONSTRAINT_NAME: usize = 2;
    const CHECK_CLAUSE: usize = 3;

    let catalog = ctx.catalog_name();
    for table in constrained_tables(ctx)? {
        let full = ctx.is_fully_accessible(&table);
        for constraint in table.constraints.iter().filter(|c| c.kind == ConstraintKind::Check) {
            let mut row = ctx.new_row();
            row.set(CONSTRAINT_CATALOG, &catalog);
            row.set(CONSTRAINT_SCHEMA, &table.name.schema);
            row.set(CONSTRAINT_NAME, &constraint.name);
            if full {
                row.set(CHECK_CLAUSE, constraint.check_clause.as_ref());
            }
            ctx.commit(row)?;
        }
    }

    for domain in ctx.catalog().domains()? {
        if !ctx.is_accessible(&domain) {
            continue;
        }
        let full = ctx.is_fully_accessible(&domain);
        for constraint in &domain.check_constraints {
            let mut row = ctx.new_row();
            row.set(CONSTRAINT_CATALOG, &catalog);
            row.set(CONSTRAINT_SCHEMA, &domain.name.schema);
            row.set(CONSTRAINT_NAME, &constraint.name);
            if full {
                row.set(CHECK_CLAUSE, constraint.check_clause.as_ref());
            }
            ctx.commit(row)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnInfo, DataType, ForeignKeyRef, IndexInfo, QualifiedName, ReferentialAction};

    fn table_with(columns: &[(&str, bool)]) -> TableInfo {
        columns.iter().fold(
            TableInfo::new(QualifiedName::new("PUBLIC", "T"), "SA", TableKind::BaseTable),
            |table, (name, not_null)| {
                let column = ColumnInfo::new(*name, DataType::integer());
                table.with_column(if *not_null { column.not_null() } else { column })
            },
        )
    }

    #[test]
    fn test_best_row_key_prefers_primary_key() {
        let table = table_with(&[("A", true), ("B", true)])
            .with_constraint(ConstraintInfo::unique("UQ_T", &["B"]))
            .with_constraint(ConstraintInfo::primary_key("PK_T", &["A"]));
        assert_eq!(best_row_key(&table), Some((&["A".to_string()][..], true)));
    }

    #[test]
    fn test_best_row_key_picks_narrowest_not_null_key() {
        let table = table_with(&[("A", true), ("B", true), ("C", false)])
            .with_constraint(ConstraintInfo::unique("UQ_AB", &["A", "B"]))
            .with_constraint(ConstraintInfo::unique("UQ_C", &["C"]))
            .with_index(IndexInfo {
                name: "IX_B".into(),
                unique: true,
                columns: vec!["B".into()],
                descending: vec![false],
            });
        assert_eq!(best_row_key(&table), Some((&["B".to_string()][..], true)));
    }

    #[test]
    fn test_best_row_key_falls_back_to_partially_nullable_key() {
        let table = table_with(&[("A", true), ("B", false), ("C", false)])
            .with_constraint(ConstraintInfo::unique("UQ_AB", &["A", "B"]))
            .with_constraint(ConstraintInfo::unique("UQ_C", &["C"]));
        assert_eq!(
            best_row_key(&table),
            Some((&["A".to_string(), "B".to_string()][..], false))
        );

        assert_eq!(best_row_key(&table_with(&[("A", false)])), None);
    }

    #[test]
    fn test_deferrability_codes() {
        let mut constraint = ConstraintInfo::unique("UQ", &["A"]);
        assert_eq!(deferrability(&constraint), 7);
        constraint.deferrable = true;
        assert_eq!(deferrability(&constraint), 6);
        constraint.initially_deferred = true;
        assert_eq!(deferrability(&constraint), 5);
    }

    #[test]
    fn test_referenced_position_follows_unique_key_order() {
        let parent = TableInfo::new(QualifiedName::new("PUBLIC", "P"), "SA", TableKind::BaseTable)
            .with_constraint(ConstraintInfo::unique("UQ_P", &["B", "A"]));
        let fk = ConstraintInfo::foreign_key(
            "FK_C",
            &["X", "Y"],
            ForeignKeyRef {
                table: QualifiedName::new("PUBLIC", "P"),
                unique_constraint: Some("UQ_P".into()),
                columns: vec!["A".into(), "B".into()],
                update_rule: ReferentialAction::NoAction,
                delete_rule: ReferentialAction::Cascade,
            },
        );
        let tables = vec![parent];
        assert_eq!(referenced_position(&tables, &fk, 0), Some(2));
        assert_eq!(referenced_position(&tables, &fk, 1), Some(1));
        assert_eq!(referenced_position(&tables, &fk, 2), None);
    }
}
