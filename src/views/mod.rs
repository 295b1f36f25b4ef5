// Shapes and row generators of the individual system tables
pub mod catalog_info;
pub mod charsets;
pub mod columns;
pub mod constraints;
pub mod diagnostics;
pub mod privileges;
pub mod roles;
pub mod routines;
pub mod sequences;
pub mod tables;
pub mod triggers;
pub mod type_info;

use std::collections::HashMap;

use crate::catalog::DataType;
use crate::system::{DescriptorBuilder, GeneratorFn, SystemTableId};
use crate::types::Value;

macro_rules! generators {
    ($($id:ident => $generator:path),* $(,)?) => {{
        let mut map: HashMap<SystemTableId, GeneratorFn> = HashMap::new();
        $(map.insert($id, $generator);)*
        map
    }};
}

/// Declared shape of a system table, `None` for tables without content
pub fn shape(id: SystemTableId) -> Option<DescriptorBuilder> {
    use SystemTableId::*;

    let builder = match id {
        InformationSchemaCatalogName => catalog_info::catalog_name_shape(),
        SystemSchemas => catalog_info::system_schemas_shape(),
        Schemata => catalog_info::schemata_shape(),
        SystemTableTypes => catalog_info::table_types_shape(),
        SystemTables => tables::system_tables_shape(),
        Tables => tables::tables_shape(),
        Views => tables::views_shape(),
        SystemColumns => columns::system_columns_shape(),
        Columns => columns::columns_shape(),
        SystemPrimaryKeys => constraints::primary_keys_shape(),
        SystemIndexInfo => constraints::index_info_shape(),
        SystemCrossReference => constraints::cross_reference_shape(),
        SystemBestRowIdentifier => constraints::best_row_identifier_shape(),
        SystemTypeInfo => type_info::type_info_shape(),
        ViewTableUsage => tables::view_table_usage_shape(),
        TableConstraints => constraints::table_constraints_shape(),
        KeyColumnUsage => constraints::key_column_usage_shape(),
        ReferentialConstraints => constraints::referential_constraints_shape(),
        CheckConstraints => constraints::check_constraints_shape(),
        SystemProcedures => routines::procedures_shape(),
        Routines => routines::routines_shape(),
        RoutinePrivileges => routines::routine_privileges_shape(),
        SystemSequences | Sequences => sequences::sequences_shape(),
        Domains => sequences::domains_shape(),
        Triggers => triggers::triggers_shape(),
        TablePrivileges => privileges::table_privileges_shape(),
        ColumnPrivileges => privileges::column_privileges_shape(),
        RoleTableGrants => privileges::role_table_grants_shape(),
        RoleColumnGrants => privileges::role_column_grants_shape(),
        RoleRoutineGrants => privileges::role_routine_grants_shape(),
        SystemUsers => roles::users_shape(),
        Authorizations => roles::authorizations_shape(),
        ApplicableRoles => roles::applicable_roles_shape(),
        AdministrableRoleAuthorizations => roles::administrable_roles_shape(),
        EnabledRoles => roles::enabled_roles_shape(),
        CharacterSets => charsets::character_sets_shape(),
        Collations => charsets::collations_shape(),
        SystemCacheInfo => diagnostics::cache_info_shape(),
        SystemSessionInfo => diagnostics::session_info_shape(),
        SystemSessions => diagnostics::sessions_shape(),
        SystemProperties => diagnostics::properties_shape(),
        _ => return None,
    };
    Some(builder)
}

/// Generators for the JDBC metadata tables and the core standard views
pub fn essential() -> HashMap<SystemTableId, GeneratorFn> {
    use SystemTableId::*;

    generators! {
        InformationSchemaCatalogName => catalog_info::catalog_name,
        SystemSchemas => catalog_info::system_schemas,
        SystemTableTypes => catalog_info::table_types,
        SystemTables => tables::system_tables,
        SystemColumns => columns::system_columns,
        SystemPrimaryKeys => constraints::primary_keys,
        SystemIndexInfo => constraints::index_info,
        SystemCrossReference => constraints::cross_reference,
        SystemBestRowIdentifier => constraints::best_row_identifier,
        SystemTypeInfo => type_info::type_info,
        SystemUsers => roles::users,
        SystemSequences => sequences::sequences,
        SystemProcedures => routines::no_procedures,
        Tables => tables::tables,
        TablePrivileges => privileges::table_privileges,
        ColumnPrivileges => privileges::column_privileges,
        Sequences => sequences::sequences,
    }
}

/// Generators for the remaining standard views and the diagnostics
pub fn full() -> HashMap<SystemTableId, GeneratorFn> {
    use SystemTableId::*;

    generators! {
        SystemProcedures => routines::procedures,
        SystemCacheInfo => diagnostics::cache_info,
        SystemSessionInfo => diagnostics::session_info,
        SystemSessions => diagnostics::sessions,
        SystemProperties => diagnostics::properties,
        AdministrableRoleAuthorizations => roles::administrable_roles,
        ApplicableRoles => roles::applicable_roles,
        Authorizations => roles::authorizations,
        CharacterSets => charsets::character_sets,
        CheckConstraints => constraints::check_constraints,
        Collations => charsets::collations,
        Columns => columns::columns,
        Domains => sequences::domains,
        EnabledRoles => roles::enabled_roles,
        KeyColumnUsage => constraints::key_column_usage,
        ReferentialConstraints => constraints::referential_constraints,
        RoleColumnGrants => privileges::role_column_grants,
        RoleRoutineGrants => privileges::role_routine_grants,
        RoleTableGrants => privileges::role_table_grants,
        RoutinePrivileges => routines::routine_privileges,
        Routines => routines::routines,
        Schemata => catalog_info::schemata,
        TableConstraints => constraints::table_constraints,
        Triggers => triggers::triggers,
        Views => tables::views,
        ViewTableUsage => tables::view_table_usage,
    }
}

/// Non-negative count as a `CARDINAL_NUMBER` cell
pub(crate) fn cardinal(value: Option<i64>) -> Value {
    match value {
        Some(v) => Value::Integer(v.clamp(0, i32::MAX as i64)),
        None => Value::Null,
    }
}

/// `INTEGER` cell, saturating at the type's bounds
pub(crate) fn int(value: Option<i64>) -> Value {
    match value {
        Some(v) => Value::Integer(v.clamp(i32::MIN as i64, i32::MAX as i64)),
        None => Value::Null,
    }
}

/// Octet length of a character type, assuming at most four bytes per
/// character
pub(crate) fn octet_length(data_type: &DataType) -> Option<i64> {
    if !data_type.is_character() {
        return None;
    }
    data_type
        .character_maximum_length
        .map(|n| n.saturating_mul(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_cover_distinct_tables() {
        let essential = essential();
        let full = full();
        let overlap: Vec<_> = essential.keys().filter(|id| full.contains_key(id)).collect();
        assert_eq!(overlap, vec![&SystemTableId::SystemProcedures]);
    }

    #[test]
    fn test_cell_helpers_saturate() {
        assert_eq!(cardinal(Some(-3)), Value::Integer(0));
        assert_eq!(cardinal(Some(i64::MAX)), Value::Integer(i32::MAX as i64));
        assert_eq!(int(None), Value::Null);
        assert_eq!(octet_length(&DataType::varchar(10)), Some(40));
        assert_eq!(octet_length(&DataType::integer()), None);
    }
}
