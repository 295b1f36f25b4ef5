use crate::catalog::TableKind;
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CHARACTER_DATA, ColumnType, SQL_IDENTIFIER};

pub fn catalog_name_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CATALOG_NAME", SQL_IDENTIFIER)
        .primary_key(&[0])
}

/// The single row naming this database's catalog
pub fn catalog_name(ctx: &mut GenerationContext<'_>) -> Result<()> {
    let mut row = ctx.new_row();
    row.set(0, ctx.catalog_name());
    ctx.commit(row)?;
    Ok(())
}

pub fn system_schemas_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_SCHEM", SQL_IDENTIFIER)
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("IS_DEFAULT", ColumnType::Boolean)
        .primary_key(&[0])
}

/// Visible schemas, flagging the session's current one
pub fn system_schemas(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_SCHEM: usize = 0;
    const TABLE_CATALOG: usize = 1;
    const IS_DEFAULT: usize = 2;

    let catalog = ctx.catalog_name();
    let current = ctx.session().info().current_schema;
    for schema in ctx.catalog().schemas()? {
        if !ctx.is_accessible(&schema) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(TABLE_SCHEM, &schema.name);
        row.set(TABLE_CATALOG, &catalog);
        row.set(IS_DEFAULT, schema.name == current);
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn schemata_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CATALOG_NAME", SQL_IDENTIFIER)
        .column("SCHEMA_NAME", SQL_IDENTIFIER)
        .column("SCHEMA_OWNER", SQL_IDENTIFIER)
        .column("DEFAULT_CHARACTER_SET_CATALOG", SQL_IDENTIFIER)
        .column("DEFAULT_CHARACTER_SET_SCHEMA", SQL_IDENTIFIER)
        .column("DEFAULT_CHARACTER_SET_NAME", SQL_IDENTIFIER)
        .column("SQL_PATH", CHARACTER_DATA)
        .order_key(&[0, 1])
}

pub fn schemata(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const CATALOG_NAME: usize = 0;
    const SCHEMA_NAME: usize = 1;
    const SCHEMA_OWNER: usize = 2;
    const DEFAULT_CHARACTER_SET_CATALOG: usize = 3;
    const DEFAULT_CHARACTER_SET_SCHEMA: usize = 4;
    const DEFAULT_CHARACTER_SET_NAME: usize = 5;

    let catalog = ctx.catalog_name();
    let charsets = ctx.catalog().character_sets()?;
    for schema in ctx.catalog().schemas()? {
        if !ctx.is_accessible(&schema) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(CATALOG_NAME, &catalog);
        row.set(SCHEMA_NAME, &schema.name);
        row.set(SCHEMA_OWNER, &schema.owner);
        if let Some(charset) = &schema.default_character_set {
            let charset_schema = charsets
                .iter()
                .find(|c| &c.name.name == charset)
                .map(|c| c.name.schema.clone());
            row.set(DEFAULT_CHARACTER_SET_CATALOG, &catalog);
            row.set(DEFAULT_CHARACTER_SET_SCHEMA, charset_schema);
            row.set(DEFAULT_CHARACTER_SET_NAME, charset);
        }
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn table_types_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_TYPE", SQL_IDENTIFIER)
        .primary_key(&[0])
}

pub fn table_types(ctx: &mut GenerationContext<'_>) -> Result<()> {
    let mut types: Vec<&str> = [
        TableKind::GlobalTemporary,
        TableKind::System,
        TableKind::BaseTable,
        TableKind::View,
    ]
    .iter()
    .map(|k| k.jdbc_table_type())
    .collect();
    types.sort_unstable();
    for table_type in types {
        let mut row = ctx.new_row();
        row.set(0, table_type);
        ctx.commit(row)?;
    }
    Ok(())
}
