use super::{cardinal, int, octet_length};
use crate::catalog::{ColumnInfo, DataType, TableInfo};
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext, Row};
use crate::types::{CARDINAL_NUMBER, CHARACTER_DATA, ColumnType, SQL_IDENTIFIER, Value, YES_OR_NO};

pub fn system_columns_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CAT", SQL_IDENTIFIER)
        .column("TABLE_SCHEM", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("DATA_TYPE", ColumnType::SmallInt)
        .column("TYPE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_SIZE", ColumnType::Integer)
        .column("BUFFER_LENGTH", ColumnType::Integer)
        .column("DECIMAL_DIGITS", ColumnType::Integer)
        .column("NUM_PREC_RADIX", ColumnType::Integer)
        .column("NULLABLE", ColumnType::Integer)
        .column("REMARKS", CHARACTER_DATA)
        .column("COLUMN_DEF", CHARACTER_DATA)
        .column("SQL_DATA_TYPE", ColumnType::Integer)
        .column("SQL_DATETIME_SUB", ColumnType::Integer)
        .column("CHAR_OCTET_LENGTH", ColumnType::Integer)
        .column("ORDINAL_POSITION", ColumnType::Integer)
        .column("IS_NULLABLE", YES_OR_NO)
        .column("SCOPE_CATLOG", SQL_IDENTIFIER)
        .column("SCOPE_SCHEMA", SQL_IDENTIFIER)
        .column("SCOPE_TABLE", SQL_IDENTIFIER)
        .column("SOURCE_DATA_TYPE", SQL_IDENTIFIER)
        .column("IS_AUTOINCREMENT", ColumnType::Boolean)
        .column("TYPE_SUB", ColumnType::Integer)
        .order_key(&[0, 1, 2, 16])
}

/// Visible columns of visible tables, in the JDBC `getColumns` layout
pub fn system_columns(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CAT: usize = 0;
    const TABLE_SCHEM: usize = 1;
    const TABLE_NAME: usize = 2;
    const COLUMN_NAME: usize = 3;
    const DATA_TYPE: usize = 4;
    const TYPE_NAME: usize = 5;
    const COLUMN_SIZE: usize = 6;
    const DECIMAL_DIGITS: usize = 8;
    const NUM_PREC_RADIX: usize = 9;
    const NULLABLE: usize = 10;
    const REMARKS: usize = 11;
    const COLUMN_DEF: usize = 12;
    const SQL_DATA_TYPE: usize = 13;
    const CHAR_OCTET_LENGTH: usize = 15;
    const ORDINAL_POSITION: usize = 16;
    const IS_NULLABLE: usize = 17;
    const IS_AUTOINCREMENT: usize = 22;
    const TYPE_SUB: usize = 23;

    let catalog = ctx.catalog_name();
    for table in ctx.all_tables()? {
        for (position, column) in visible_columns(ctx, &table) {
            let data_type = &column.data_type;
            let mut row = ctx.new_row();
            row.set(TABLE_CAT, &catalog);
            row.set(TABLE_SCHEM, &table.name.schema);
            row.set(TABLE_NAME, &table.name.name);
            row.set(COLUMN_NAME, &column.name);
            row.set(DATA_TYPE, data_type.jdbc_type_code());
            row.set(TYPE_NAME, &data_type.name);
            row.set(
                COLUMN_SIZE,
                int(data_type.character_maximum_length.or(data_type.numeric_precision)),
            );
            row.set(DECIMAL_DIGITS, int(data_type.numeric_scale));
            row.set(NUM_PREC_RADIX, int(data_type.numeric_radix()));
            row.set(NULLABLE, i64::from(column.nullable));
            row.set(REMARKS, column.remarks.as_ref());
            row.set(COLUMN_DEF, column.default_sql.as_ref());
            row.set(SQL_DATA_TYPE, int(Some(data_type.jdbc_type_code())));
            row.set(CHAR_OCTET_LENGTH, int(octet_length(data_type)));
            row.set(ORDINAL_POSITION, int(Some(position)));
            row.set(IS_NULLABLE, Value::yes_no(column.nullable));
            row.set(IS_AUTOINCREMENT, column.identity.is_some());
            row.set(TYPE_SUB, 1i64);
            ctx.commit(row)?;
        }
    }
    Ok(())
}

pub fn columns_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("ORDINAL_POSITION", CARDINAL_NUMBER)
        .column("COLUMN_DEFAULT", CHARACTER_DATA)
        .column("IS_NULLABLE", YES_OR_NO)
        .column("DATA_TYPE", CHARACTER_DATA)
        .column("CHARACTER_MAXIMUM_LENGTH", CARDINAL_NUMBER)
        .column("CHARACTER_OCTET_LENGTH", CARDINAL_NUMBER)
        .column("NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("NUMERIC_PRECISION_RADIX", CARDINAL_NUMBER)
        .column("NUMERIC_SCALE", CARDINAL_NUMBER)
        .column("DATETIME_PRECISION", CARDINAL_NUMBER)
        .column("INTERVAL_TYPE", CHARACTER_DATA)
        .column("INTERVAL_PRECISION", CARDINAL_NUMBER)
        .column("CHARACTER_SET_CATALOG", CHARACTER_DATA)
        .column("CHARACTER_SET_SCHEMA", SQL_IDENTIFIER)
        .column("CHARACTER_SET_NAME", SQL_IDENTIFIER)
        .column("COLLATION_CATALOG", SQL_IDENTIFIER)
        .column("COLLATION_SCHEMA", SQL_IDENTIFIER)
        .column("COLLATION_NAME", SQL_IDENTIFIER)
        .column("DOMAIN_CATALOG", SQL_IDENTIFIER)
        .column("DOMAIN_SCHEMA", SQL_IDENTIFIER)
        .column("DOMAIN_NAME", SQL_IDENTIFIER)
        .column("UDT_CATALOG", SQL_IDENTIFIER)
        .column("UDT_SCHEMA", SQL_IDENTIFIER)
        .column("UDT_NAME", SQL_IDENTIFIER)
        .column("SCOPE_CATALOG", SQL_IDENTIFIER)
        .column("SCOPE_SCHEMA", SQL_IDENTIFIER)
        .column("SCOPE_NAME", SQL_IDENTIFIER)
        .column("MAXIMUM_CARDINALITY", CARDINAL_NUMBER)
        .column("DTD_IDENTIFIER", SQL_IDENTIFIER)
        .column("IS_SELF_REFERENCING", YES_OR_NO)
        .column("IS_IDENTITY", YES_OR_NO)
        .column("IDENTITY_GENERATION", CHARACTER_DATA)
        .column("IDENTITY_START", CHARACTER_DATA)
        .column("IDENTITY_INCREMENT", CHARACTER_DATA)
        .column("IDENTITY_MAXIMUM", CHARACTER_DATA)
        .column("IDENTITY_MINIMUM", CHARACTER_DATA)
        .column("IDENTITY_CYCLE", YES_OR_NO)
        .column("IS_GENERATED", CHARACTER_DATA)
        .column("GENERATION_EXPRESSION", CHARACTER_DATA)
        .column("IS_UPDATABLE", YES_OR_NO)
        .column("DECLARED_DATA_TYPE", CHARACTER_DATA)
        .column("DECLARED_NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("DECLARED_NUMERIC_SCALE", CARDINAL_NUMBER)
        .order_key(&[3, 2, 1, 4])
}

/// Standard `COLUMNS` view, restricted per column by the session's rights
pub fn columns(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CATALOG: usize = 0;
    const TABLE_SCHEMA: usize = 1;
    const TABLE_NAME: usize = 2;
    const COLUMN_NAME: usize = 3;
    const ORDINAL_POSITION: usize = 4;
    const COLUMN_DEFAULT: usize = 5;
    const IS_NULLABLE: usize = 6;
    const DATA_TYPE: usize = 7;
    const CHARACTER_MAXIMUM_LENGTH: usize = 8;
    const CHARACTER_OCTET_LENGTH: usize = 9;
    const NUMERIC_PRECISION: usize = 10;
    const NUMERIC_PRECISION_RADIX: usize = 11;
    const NUMERIC_SCALE: usize = 12;
    const DATETIME_PRECISION: usize = 13;
    const CHARACTER_SET_CATALOG: usize = 16;
    const CHARACTER_SET_SCHEMA: usize = 17;
    const CHARACTER_SET_NAME: usize = 18;
    const COLLATION_CATALOG: usize = 19;
    const COLLATION_SCHEMA: usize = 20;
    const COLLATION_NAME: usize = 21;
    const DOMAIN_CATALOG: usize = 22;
    const DOMAIN_SCHEMA: usize = 23;
    const DOMAIN_NAME: usize = 24;
    const DTD_IDENTIFIER: usize = 32;
    const IS_SELF_REFERENCING: usize = 33;
    const IS_IDENTITY: usize = 34;
    const IDENTITY_GENERATION: usize = 35;
    const IDENTITY_START: usize = 36;
    const IDENTITY_INCREMENT: usize = 37;
    const IDENTITY_MAXIMUM: usize = 38;
    const IDENTITY_MINIMUM: usize = 39;
    const IDENTITY_CYCLE: usize = 40;
    const IS_GENERATED: usize = 41;
    const IS_UPDATABLE: usize = 43;
    const DECLARED_DATA_TYPE: usize = 44;
    const DECLARED_NUMERIC_PRECISION: usize = 45;
    const DECLARED_NUMERIC_SCALE: usize = 46;

    let catalog = ctx.catalog_name();
    let charsets = ctx.catalog().character_sets()?;
    let collations = ctx.catalog().collations()?;

    for table in ctx.all_tables()? {
        for (position, column) in visible_columns(ctx, &table) {
            let data_type = &column.data_type;
            let mut row = ctx.new_row();
            row.set(TABLE_CATALOG, &catalog);
            row.set(TABLE_SCHEMA, &table.name.schema);
            row.set(TABLE_NAME, &table.name.name);
            row.set(COLUMN_NAME, &column.name);
            row.set(ORDINAL_POSITION, cardinal(Some(position)));
            row.set(COLUMN_DEFAULT, column.default_sql.as_ref());
            row.set(IS_NULLABLE, Value::yes_no(column.nullable));
            row.set(DATA_TYPE, &data_type.name);
            set_type_cells(
                &mut row,
                data_type,
                [
                    CHARACTER_MAXIMUM_LENGTH,
                    CHARACTER_OCTET_LENGTH,
                    NUMERIC_PRECISION,
                    NUMERIC_PRECISION_RADIX,
                    NUMERIC_SCALE,
                ],
            );
            if data_type.name.starts_with("TIMESTAMP") || data_type.name == "TIME" {
                row.set(DATETIME_PRECISION, cardinal(data_type.numeric_scale.or(Some(6))));
            } else if data_type.name == "DATE" {
                row.set(DATETIME_PRECISION, 0i64);
            }
            if let Some(charset) = &data_type.character_set {
                let schema = charsets
                    .iter()
                    .find(|c| &c.name.name == charset)
                    .map(|c| c.name.schema.clone());
                row.set(CHARACTER_SET_CATALOG, &catalog);
                row.set(CHARACTER_SET_SCHEMA, schema);
                row.set(CHARACTER_SET_NAME, charset);
            }
            if let Some(collation) = &data_type.collation {
                let schema = collations
                    .iter()
                    .find(|c| &c.name.name == collation)
                    .map(|c| c.name.schema.clone());
                row.set(COLLATION_CATALOG, &catalog);
                row.set(COLLATION_SCHEMA, schema);
                row.set(COLLATION_NAME, collation);
            }
            if let Some(domain) = &data_type.domain {
                row.set(DOMAIN_CATALOG, &catalog);
                row.set(DOMAIN_SCHEMA, &domain.schema);
                row.set(DOMAIN_NAME, &domain.name);
            }
            row.set(DTD_IDENTIFIER, position.to_string());
            row.set(IS_SELF_REFERENCING, Value::yes_no(false));
            match &column.identity {
                Some(identity) => {
                    row.set(IS_IDENTITY, Value::yes_no(true));
                    row.set(
                        IDENTITY_GENERATION,
                        if identity.always { "ALWAYS" } else { "BY DEFAULT" },
                    );
                    row.set(IDENTITY_START, identity.start.to_string());
                    row.set(IDENTITY_INCREMENT, identity.increment.to_string());
                    row.set(IDENTITY_MAXIMUM, identity.maximum.to_string());
                    row.set(IDENTITY_MINIMUM, identity.minimum.to_string());
                    row.set(IDENTITY_CYCLE, Value::yes_no(identity.cycle));
                }
                None => row.set(IS_IDENTITY, Value::yes_no(false)),
            }
            row.set(IS_GENERATED, "NEVER");
            row.set(IS_UPDATABLE, Value::yes_no(table.writable));
            row.set(DECLARED_DATA_TYPE, &data_type.name);
            row.set(DECLARED_NUMERIC_PRECISION, cardinal(data_type.numeric_precision));
            row.set(DECLARED_NUMERIC_SCALE, cardinal(data_type.numeric_scale));
            ctx.commit(row)?;
        }
    }
    Ok(())
}

/// Columns of `table` the session may see, with 1-based ordinal positions
pub(crate) fn visible_columns<'t>(
    ctx: &GenerationContext<'_>,
    table: &'t TableInfo,
) -> Vec<(i64, &'t ColumnInfo)> {
    if !ctx.is_accessible_table(table) {
        return Vec::new();
    }
    let access = ctx.capability().column_access(table);
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| access.allows(&column.name))
        .map(|(i, column)| (i as i64 + 1, column))
        .collect()
}

/// Length, octet length, precision, radix and scale cells of a declared type
pub(crate) fn set_type_cells(row: &mut Row, data_type: &DataType, cells: [usize; 5]) {
    let [max_length, octets, precision, radix, scale] = cells;
    if data_type.is_character() {
        row.set(max_length, cardinal(data_type.character_maximum_length));
        row.set(octets, cardinal(octet_length(data_type)));
    }
    if data_type.is_numeric() {
        row.set(precision, cardinal(data_type.numeric_precision));
        row.set(radix, cardinal(data_type.numeric_radix()));
        row.set(scale, cardinal(data_type.numeric_scale));
    }
}
