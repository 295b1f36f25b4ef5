use super::columns::set_type_cells;
use super::privileges::{emit_grant_rows, object_grants};
use super::cardinal;
use crate::catalog::{ObjectKind, RoutineKind, RoutineLanguage};
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CARDINAL_NUMBER, CHARACTER_DATA, ColumnType, SQL_IDENTIFIER, TIME_STAMP, Value, YES_OR_NO};

pub fn procedures_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("PROCEDURE_CAT", SQL_IDENTIFIER)
        .column("PROCEDURE_SCHEM", SQL_IDENTIFIER)
        .column("PROCEDURE_NAME", SQL_IDENTIFIER)
        .column("NUM_INPUT_PARAMS", ColumnType::Integer)
        .column("NUM_OUTPUT_PARAMS", ColumnType::Integer)
        .column("NUM_RESULT_SETS", ColumnType::Integer)
        .column("REMARKS", CHARACTER_DATA)
        .column("PROCEDURE_TYPE", ColumnType::SmallInt)
        .column("SPECIFIC_NAME", SQL_IDENTIFIER)
        .column("ORIGIN", CHARACTER_DATA)
        .order_key(&[1, 2, 8, 0])
}

/// Routine listing without routine support: the table exists, empty
pub fn no_procedures(_ctx: &mut GenerationContext<'_>) -> Result<()> {
    Ok(())
}

/// Visible routines, JDBC `getProcedures` layout
pub fn procedures(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const PROCEDURE_CAT: usize = 0;
    const PROCEDURE_SCHEM: usize = 1;
    const PROCEDURE_NAME: usize = 2;
    const NUM_INPUT_PARAMS: usize = 3;
    const NUM_OUTPUT_PARAMS: usize = 4;
    const NUM_RESULT_SETS: usize = 5;
    const REMARKS: usize = 6;
    const PROCEDURE_TYPE: usize = 7;
    const SPECIFIC_NAME: usize = 8;
    const ORIGIN: usize = 9;

    // DatabaseMetaData.procedureNoResult / procedureReturnsResult
    const NO_RESULT: i64 = 1;
    const RETURNS_RESULT: i64 = 2;

    let catalog = ctx.catalog_name();
    for routine in ctx.catalog().routines()? {
        if !ctx.is_accessible(&routine) {
            continue;
        }
        let function = routine.kind == RoutineKind::Function;
        let mut row = ctx.new_row();
        row.set(PROCEDURE_CAT, &catalog);
        row.set(PROCEDURE_SCHEM, &routine.name.schema);
        row.set(PROCEDURE_NAME, &routine.name.name);
        row.set(NUM_INPUT_PARAMS, routine.parameter_count);
        row.set(NUM_OUTPUT_PARAMS, i64::from(function));
        row.set(NUM_RESULT_SETS, 0i64);
        row.set(REMARKS, routine.remarks.as_ref());
        row.set(PROCEDURE_TYPE, if function { RETURNS_RESULT } else { NO_RESULT });
        row.set(SPECIFIC_NAME, &routine.specific_name);
        row.set(
            ORIGIN,
            match routine.language {
                RoutineLanguage::Sql => "SQL",
                RoutineLanguage::External => "EXTERNAL",
            },
        );
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn routines_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("SPECIFIC_CATALOG", SQL_IDENTIFIER)
        .column("SPECIFIC_SCHEMA", SQL_IDENTIFIER)
        .column("SPECIFIC_NAME", SQL_IDENTIFIER)
        .column("ROUTINE_CATALOG", SQL_IDENTIFIER)
        .column("ROUTINE_SCHEMA", SQL_IDENTIFIER)
        .column("ROUTINE_NAME", SQL_IDENTIFIER)
        .column("ROUTINE_TYPE", CHARACTER_DATA)
        .column("MODULE_CATALOG", SQL_IDENTIFIER)
        .column("MODULE_SCHEMA", SQL_IDENTIFIER)
        .column("MODULE_NAME", SQL_IDENTIFIER)
        .column("UDT_CATALOG", SQL_IDENTIFIER)
        .column("UDT_SCHEMA", SQL_IDENTIFIER)
        .column("UDT_NAME", SQL_IDENTIFIER)
        .column("DATA_TYPE", CHARACTER_DATA)
        .column("CHARACTER_MAXIMUM_LENGTH", CARDINAL_NUMBER)
        .column("CHARACTER_OCTET_LENGTH", CARDINAL_NUMBER)
        .column("CHARACTER_SET_CATALOG", SQL_IDENTIFIER)
        .column("CHARACTER_SET_SCHEMA", SQL_IDENTIFIER)
        .column("CHARACTER_SET_NAME", SQL_IDENTIFIER)
        .column("COLLATION_CATALOG", SQL_IDENTIFIER)
        .column("COLLATION_SCHEMA", SQL_IDENTIFIER)
        .column("COLLATION_NAME", SQL_IDENTIFIER)
        .column("NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("NUMERIC_PRECISION_RADIX", CARDINAL_NUMBER)
        .column("NUMERIC_SCALE", CARDINAL_NUMBER)
        .column("DATETIME_PRECISION", CARDINAL_NUMBER)
        .column("INTERVAL_TYPE", CHARACTER_DATA)
        .column("INTERVAL_PRECISION", CARDINAL_NUMBER)
        .column("TYPE_UDT_CATALOG", SQL_IDENTIFIER)
        .column("TYPE_UDT_SCHEMA", SQL_IDENTIFIER)
        .column("TYPE_UDT_NAME", SQL_IDENTIFIER)
        .column("SCOPE_CATALOG", SQL_IDENTIFIER)
        .column("SCOPE_SCHEMA", SQL_IDENTIFIER)
        .column("SCOPE_NAME", SQL_IDENTIFIER)
        .column("MAXIMUM_CARDINALITY", CARDINAL_NUMBER)
        .column("DTD_IDENTIFIER", SQL_IDENTIFIER)
        .column("ROUTINE_BODY", CHARACTER_DATA)
        .column("ROUTINE_DEFINITION", CHARACTER_DATA)
        .column("EXTERNAL_NAME", CHARACTER_DATA)
        .column("EXTERNAL_LANGUAGE", CHARACTER_DATA)
        .column("PARAMETER_STYLE", CHARACTER_DATA)
        .column("IS_DETERMINISTIC", YES_OR_NO)
        .column("SQL_DATA_ACCESS", CHARACTER_DATA)
        .column("IS_NULL_CALL", YES_OR_NO)
        .column("SQL_PATH", CHARACTER_DATA)
        .column("SCHEMA_LEVEL_ROUTINE", YES_OR_NO)
        .column("MAX_DYNAMIC_RESULT_SETS", CARDINAL_NUMBER)
        .column("IS_USER_DEFINED_CAST", YES_OR_NO)
        .column("IS_IMPLICITLY_INVOCABLE", YES_OR_NO)
        .column("SECURITY_TYPE", CHARACTER_DATA)
        .column("AS_LOCATOR", YES_OR_NO)
        .column("CREATED", TIME_STAMP)
        .column("LAST_ALTERED", TIME_STAMP)
        .column("NEW_SAVEPOINT_LEVEL", YES_OR_NO)
        .column("IS_UDT_DEPENDENT", YES_OR_NO)
        .column("DECLARED_DATA_TYPE", CHARACTER_DATA)
        .column("DECLARED_NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("DECLARED_NUMERIC_SCALE", CARDINAL_NUMBER)
        .order_key(&[3, 4, 5, 0, 1, 2])
}

/// Standard `ROUTINES` view. Bodies and external names need full access.
pub fn routines(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const SPECIFIC_CATALOG: usize = 0;
    const SPECIFIC_SCHEMA: usize = 1;
    const SPECIFIC_NAME: usize = 2;
    const ROUTINE_CATALOG: usize = 3;
    const ROUTINE_SCHEMA: usize = 4;
    const ROUTINE_NAME: usize = 5;
    const ROUTINE_TYPE: usize = 6;
    const DATA_TYPE: usize = 13;
    const CHARACTER_MAXIMUM_LENGTH: usize = 14;
    const CHARACTER_OCTET_LENGTH: usize = 15;
    const NUMERIC_PRECISION: usize = 22;
    const NUMERIC_PRECISION_RADIX: usize = 23;
    const NUMERIC_SCALE: usize = 24;
    const DTD_IDENTIFIER: usize = 35;
    const ROUTINE_BODY: usize = 36;
    const ROUTINE_DEFINITION: usize = 37;
    const EXTERNAL_NAME: usize = 38;
    const PARAMETER_STYLE: usize = 40;
    const IS_DETERMINISTIC: usize = 41;
    const SQL_DATA_ACCESS: usize = 42;
    const IS_NULL_CALL: usize = 43;
    const SCHEMA_LEVEL_ROUTINE: usize = 45;
    const MAX_DYNAMIC_RESULT_SETS: usize = 46;
    const IS_USER_DEFINED_CAST: usize = 47;
    const IS_IMPLICITLY_INVOCABLE: usize = 48;
    const SECURITY_TYPE: usize = 49;
    const AS_LOCATOR: usize = 50;
    const CREATED: usize = 51;
    const LAST_ALTERED: usize = 52;
    const NEW_SAVEPOINT_LEVEL: usize = 53;
    const IS_UDT_DEPENDENT: usize = 54;
    const DECLARED_DATA_TYPE: usize = 55;
    const DECLARED_NUMERIC_PRECISION: usize = 56;
    const DECLARED_NUMERIC_SCALE: usize = 57;

    let catalog = ctx.catalog_name();
    for routine in ctx.catalog().routines()? {
        if !ctx.is_accessible(&routine) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(SPECIFIC_CATALOG, &catalog);
        row.set(SPECIFIC_SCHEMA, &routine.name.schema);
        row.set(SPECIFIC_NAME, &routine.specific_name);
        row.set(ROUTINE_CATALOG, &catalog);
        row.set(ROUTINE_SCHEMA, &routine.name.schema);
        row.set(ROUTINE_NAME, &routine.name.name);
        row.set(ROUTINE_TYPE, routine.kind.as_str());

        if let Some(return_type) = &routine.return_type {
            row.set(DATA_TYPE, &return_type.name);
            set_type_cells(
                &mut row,
                return_type,
                [
                    CHARACTER_MAXIMUM_LENGTH,
                    CHARACTER_OCTET_LENGTH,
                    NUMERIC_PRECISION,
                    NUMERIC_PRECISION_RADIX,
                    NUMERIC_SCALE,
                ],
            );
            row.set(DTD_IDENTIFIER, &routine.specific_name);
            row.set(DECLARED_DATA_TYPE, &return_type.name);
            row.set(DECLARED_NUMERIC_PRECISION, cardinal(return_type.numeric_precision));
            row.set(DECLARED_NUMERIC_SCALE, cardinal(return_type.numeric_scale));
        }

        let full = ctx.is_fully_accessible(&routine);
        match routine.language {
            RoutineLanguage::Sql => {
                row.set(ROUTINE_BODY, "SQL");
                if full {
                    row.set(ROUTINE_DEFINITION, routine.body.as_ref());
                }
            }
            RoutineLanguage::External => {
                row.set(ROUTINE_BODY, "EXTERNAL");
                row.set(PARAMETER_STYLE, "GENERAL");
                if full {
                    row.set(EXTERNAL_NAME, routine.external_name.as_ref());
                }
            }
        }
        row.set(IS_DETERMINISTIC, Value::yes_no(routine.deterministic));
        row.set(SQL_DATA_ACCESS, routine.data_access.as_str());
        row.set(IS_NULL_CALL, Value::yes_no(routine.null_call));
        row.set(SCHEMA_LEVEL_ROUTINE, Value::yes_no(true));
        row.set(MAX_DYNAMIC_RESULT_SETS, 0i64);
        row.set(IS_USER_DEFINED_CAST, Value::yes_no(false));
        row.set(IS_IMPLICITLY_INVOCABLE, Value::yes_no(false));
        row.set(SECURITY_TYPE, "DEFINER");
        row.set(AS_LOCATOR, Value::yes_no(false));
        row.set(CREATED, routine.created);
        row.set(LAST_ALTERED, routine.created);
        if routine.kind == RoutineKind::Procedure {
            row.set(NEW_SAVEPOINT_LEVEL, Value::yes_no(false));
        }
        row.set(IS_UDT_DEPENDENT, Value::yes_no(false));
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn routine_privileges_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("GRANTOR", SQL_IDENTIFIER)
        .column("GRANTEE", SQL_IDENTIFIER)
        .column("SPECIFIC_CATALOG", SQL_IDENTIFIER)
        .column("SPECIFIC_SCHEMA", SQL_IDENTIFIER)
        .column("SPECIFIC_NAME", SQL_IDENTIFIER)
        .column("ROUTINE_CATALOG", SQL_IDENTIFIER)
        .column("ROUTINE_SCHEMA", SQL_IDENTIFIER)
        .column("ROUTINE_NAME", SQL_IDENTIFIER)
        .column("PRIVILEGE_TYPE", CHARACTER_DATA)
        .column("IS_GRANTABLE", YES_OR_NO)
        .order_key(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9])
}

/// `EXECUTE` grants on routines, owners' implicit grants included
pub fn routine_privileges(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const SPECIFIC_CATALOG: usize = 2;
    const SPECIFIC_SCHEMA: usize = 3;
    const SPECIFIC_NAME: usize = 4;
    const ROUTINE_CATALOG: usize = 5;
    const ROUTINE_SCHEMA: usize = 6;
    const ROUTINE_NAME: usize = 7;
    const PRIVILEGE_TYPE: usize = 8;

    let catalog = ctx.catalog_name();
    let grants = ctx.access().grants();
    for routine in ctx.catalog().routines()? {
        let specific = routine.specific_qualified_name();
        for grant in object_grants(ctx, ObjectKind::Routine, &specific, &routine.owner, &grants) {
            emit_grant_rows(ctx, &grant, PRIVILEGE_TYPE, |row| {
                row.set(SPECIFIC_CATALOG, &catalog);
                row.set(SPECIFIC_SCHEMA, &specific.schema);
                row.set(SPECIFIC_NAME, &specific.name);
                row.set(ROUTINE_CATALOG, &catalog);
                row.set(ROUTINE_SCHEMA, &routine.name.schema);
                row.set(ROUTINE_NAME, &routine.name.name);
            })?;
        }
    }
    Ok(())
}
