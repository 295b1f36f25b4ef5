use super::int;
use crate::catalog::DataType;
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CHARACTER_DATA, ColumnType, SQL_IDENTIFIER};

/// Static description of one supported SQL type
struct TypeEntry {
    name: &'static str,
    precision: Option<i64>,
    literal: Option<(&'static str, &'static str)>,
    create_params: Option<&'static str>,
    case_sensitive: bool,
    searchable: i64,
    scale: Option<(i64, i64)>,
    radix: Option<i64>,
    auto_increment: bool,
}

// DatabaseMetaData.typePredNone, typePredChar, typeSearchable
const PRED_NONE: i64 = 0;
const PRED_CHAR: i64 = 1;
const SEARCHABLE: i64 = 3;

const MAX_LENGTH: i64 = i32::MAX as i64;

const fn numeric(
    name: &'static str,
    precision: i64,
    radix: i64,
    scale: Option<(i64, i64)>,
    auto_increment: bool,
) -> TypeEntry {
    TypeEntry {
        name,
        precision: Some(precision),
        literal: None,
        create_params: if radix == 10 { Some("PRECISION,SCALE") } else { None },
        case_sensitive: false,
        searchable: SEARCHABLE,
        scale,
        radix: Some(radix),
        auto_increment,
    }
}

const fn string(
    name: &'static str,
    precision: Option<i64>,
    literal: (&'static str, &'static str),
    create_params: Option<&'static str>,
    case_sensitive: bool,
    searchable: i64,
) -> TypeEntry {
    TypeEntry {
        name,
        precision,
        literal: Some(literal),
        create_params,
        case_sensitive,
        searchable,
        scale: None,
        radix: None,
        auto_increment: false,
    }
}

/// One entry per reported JDBC type code
const TYPES: &[TypeEntry] = &[
    numeric("BIGINT", 64, 2, Some((0, 0)), true),
    string("VARBINARY", Some(MAX_LENGTH), ("X'", "'"), Some("LENGTH"), false, SEARCHABLE),
    string("CHARACTER", Some(MAX_LENGTH), ("'", "'"), Some("LENGTH"), true, SEARCHABLE),
    numeric("NUMERIC", 128, 10, Some((0, 32767)), true),
    numeric("DECIMAL", 128, 10, Some((0, 32767)), true),
    numeric("INTEGER", 32, 2, Some((0, 0)), true),
    numeric("SMALLINT", 16, 2, Some((0, 0)), true),
    numeric("REAL", 64, 2, None, false),
    numeric("DOUBLE", 64, 2, None, false),
    string("CHARACTER VARYING", Some(MAX_LENGTH), ("'", "'"), Some("LENGTH"), true, SEARCHABLE),
    TypeEntry {
        name: "BOOLEAN",
        precision: Some(0),
        literal: None,
        create_params: None,
        case_sensitive: false,
        searchable: SEARCHABLE,
        scale: None,
        radix: None,
        auto_increment: false,
    },
    string("DATE", Some(10), ("DATE '", "'"), None, false, SEARCHABLE),
    string("TIME", Some(8), ("TIME '", "'"), Some("PRECISION"), false, SEARCHABLE),
    string("TIMESTAMP", Some(29), ("TIMESTAMP '", "'"), Some("PRECISION"), false, SEARCHABLE),
    TypeEntry {
        name: "OTHER",
        precision: None,
        literal: None,
        create_params: None,
        case_sensitive: false,
        searchable: PRED_NONE,
        scale: None,
        radix: None,
        auto_increment: false,
    },
    string("BLOB", Some(MAX_LENGTH), ("X'", "'"), Some("LENGTH"), false, PRED_NONE),
    string("CLOB", Some(MAX_LENGTH), ("'", "'"), Some("LENGTH"), true, PRED_CHAR),
];

/// `SQL_DATA_TYPE` and `SQL_DATETIME_SUB` of a JDBC type code; datetime
/// types report the SQL DATETIME code with a subcode
fn sql_data_type(jdbc_code: i64) -> (i64, Option<i64>) {
    match jdbc_code {
        91 => (9, Some(1)),
        92 => (9, Some(2)),
        93 => (9, Some(3)),
        code => (code, None),
    }
}

pub fn type_info_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TYPE_NAME", SQL_IDENTIFIER)
        .column("DATA_TYPE", ColumnType::SmallInt)
        .column("PRECISION", ColumnType::Integer)
        .column("LITERAL_PREFIX", CHARACTER_DATA)
        .column("LITERAL_SUFFIX", CHARACTER_DATA)
        .column("CREATE_PARAMS", CHARACTER_DATA)
        .column("NULLABLE", ColumnType::SmallInt)
        .column("CASE_SENSITIVE", ColumnType::Boolean)
        .column("SEARCHABLE", ColumnType::Integer)
        .column("UNSIGNED_ATTRIBUTE", ColumnType::Boolean)
        .column("FIXED_PREC_SCALE", ColumnType::Boolean)
        .column("AUTO_INCREMENT", ColumnType::Boolean)
        .column("LOCAL_TYPE_NAME", CHARACTER_DATA)
        .column("MINIMUM_SCALE", ColumnType::SmallInt)
        .column("MAXIMUM_SCALE", ColumnType::SmallInt)
        .column("SQL_DATA_TYPE", ColumnType::Integer)
        .column("SQL_DATETIME_SUB", ColumnType::Integer)
        .column("NUM_PREC_RADIX", ColumnType::Integer)
        .column("TYPE_SUB", ColumnType::Integer)
        .primary_key(&[1, 18])
}

/// Supported SQL types, JDBC `getTypeInfo` layout
pub fn type_info(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TYPE_NAME: usize = 0;
    const DATA_TYPE: usize = 1;
    const PRECISION: usize = 2;
    const LITERAL_PREFIX: usize = 3;
    const LITERAL_SUFFIX: usize = 4;
    const CREATE_PARAMS: usize = 5;
    const NULLABLE: usize = 6;
    const CASE_SENSITIVE: usize = 7;
    const SEARCHABLE_COLUMN: usize = 8;
    const UNSIGNED_ATTRIBUTE: usize = 9;
    const FIXED_PREC_SCALE: usize = 10;
    const AUTO_INCREMENT: usize = 11;
    const MINIMUM_SCALE: usize = 13;
    const MAXIMUM_SCALE: usize = 14;
    const SQL_DATA_TYPE: usize = 15;
    const SQL_DATETIME_SUB: usize = 16;
    const NUM_PREC_RADIX: usize = 17;
    const TYPE_SUB: usize = 18;

    // DatabaseMetaData.typeNullable
    const TYPE_NULLABLE: i64 = 1;

    for entry in TYPES {
        let code = DataType::named(entry.name).jdbc_type_code();
        let (sql_type, datetime_sub) = sql_data_type(code);
        let is_numeric = entry.radix.is_some();

        let mut row = ctx.new_row();
        row.set(TYPE_NAME, entry.name);
        row.set(DATA_TYPE, code);
        row.set(PRECISION, int(entry.precision));
        if let Some((prefix, suffix)) = entry.literal {
            row.set(LITERAL_PREFIX, prefix);
            row.set(LITERAL_SUFFIX, suffix);
        }
        row.set(CREATE_PARAMS, entry.create_params);
        row.set(NULLABLE, TYPE_NULLABLE);
        row.set(CASE_SENSITIVE, entry.case_sensitive);
        row.set(SEARCHABLE_COLUMN, entry.searchable);
        if is_numeric {
            row.set(UNSIGNED_ATTRIBUTE, false);
            row.set(FIXED_PREC_SCALE, false);
            row.set(AUTO_INCREMENT, entry.auto_increment);
        }
        if let Some((min, max)) = entry.scale {
            row.set(MINIMUM_SCALE, min);
            row.set(MAXIMUM_SCALE, max);
        }
        row.set(SQL_DATA_TYPE, sql_type);
        row.set(SQL_DATETIME_SUB, int(datetime_sub));
        row.set(NUM_PREC_RADIX, int(entry.radix));
        row.set(TYPE_SUB, 1i64);
        ctx.commit(row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_each_type_has_its_own_code() {
        let codes: HashSet<i64> = TYPES
            .iter()
            .map(|t| DataType::named(t.name).jdbc_type_code())
            .collect();
        assert_eq!(codes.len(), TYPES.len());
        assert!(codes.contains(&1111), "OTHER falls through to the generic code");
    }

    #[test]
    fn test_datetime_types_report_subcodes() {
        assert_eq!(sql_data_type(91), (9, Some(1)));
        assert_eq!(sql_data_type(93), (9, Some(3)));
        assert_eq!(sql_data_type(4), (4, None));
    }
}
