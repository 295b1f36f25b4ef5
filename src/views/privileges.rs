use crate::catalog::{ObjectKind, QualifiedName, SYSTEM_AUTHORIZATION, TableInfo};
use crate::error::Result;
use crate::rights::{GrantRecord, PUBLIC_ROLE, Privileges};
use crate::system::{DescriptorBuilder, GenerationContext, Row, SystemTableId};
use crate::types::{CHARACTER_DATA, SQL_IDENTIFIER, Value, YES_OR_NO};

const GRANTOR: usize = 0;
const GRANTEE: usize = 1;

/// Grants on one object the session may see: the owner's implicit grant
/// followed by explicit grants in grant order.
///
/// Objects owned by `_SYSTEM` are implicitly granted to `PUBLIC` without
/// grant option.
pub(crate) fn object_grants(
    ctx: &GenerationContext<'_>,
    kind: ObjectKind,
    object: &QualifiedName,
    owner: &str,
    grants: &[GrantRecord],
) -> Vec<GrantRecord> {
    let implicit = if owner == SYSTEM_AUTHORIZATION {
        GrantRecord {
            grantor: SYSTEM_AUTHORIZATION.to_string(),
            grantee: PUBLIC_ROLE.to_string(),
            object_kind: kind,
            object: object.clone(),
            columns: None,
            privileges: match kind {
                ObjectKind::Table => Privileges::SELECT,
                _ => Privileges::applicable_to(kind),
            },
            grantable: false,
        }
    } else {
        GrantRecord {
            grantor: SYSTEM_AUTHORIZATION.to_string(),
            grantee: owner.to_string(),
            object_kind: kind,
            object: object.clone(),
            columns: None,
            privileges: Privileges::applicable_to(kind),
            grantable: true,
        }
    };

    std::iter::once(implicit)
        .chain(
            grants
                .iter()
                .filter(|g| g.object_kind == kind && &g.object == object)
                .cloned(),
        )
        .filter(|g| grant_visible(ctx, g))
        .collect()
}

/// A grant is listed to admins and to holders of its grantee or grantor
fn grant_visible(ctx: &GenerationContext<'_>, grant: &GrantRecord) -> bool {
    let capability = ctx.capability();
    capability.is_admin() || capability.holds(&grant.grantee) || capability.holds(&grant.grantor)
}

/// Emits one row per privilege in `grant`. `privilege_cell` is followed by
/// the `IS_GRANTABLE` cell; `fill` sets the object columns.
pub(crate) fn emit_grant_rows(
    ctx: &mut GenerationContext<'_>,
    grant: &GrantRecord,
    privilege_cell: usize,
    fill: impl Fn(&mut Row),
) -> Result<()> {
    for privilege in grant.privileges.names() {
        let mut row = ctx.new_row();
        row.set(GRANTOR, &grant.grantor);
        row.set(GRANTEE, &grant.grantee);
        fill(&mut row);
        row.set(privilege_cell, privilege);
        row.set(privilege_cell + 1, Value::yes_no(grant.grantable));
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn table_privileges_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("GRANTOR", SQL_IDENTIFIER)
        .column("GRANTEE", SQL_IDENTIFIER)
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("PRIVILEGE_TYPE", CHARACTER_DATA)
        .column("IS_GRANTABLE", YES_OR_NO)
        .column("WITH_HIERARCHY", YES_OR_NO)
        .order_key(&[0, 1, 2, 3, 4, 5, 6])
}

/// Table-wide grants, one row per privilege
pub fn table_privileges(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CATALOG: usize = 2;
    const TABLE_SCHEMA: usize = 3;
    const TABLE_NAME: usize = 4;
    const PRIVILEGE_TYPE: usize = 5;
    const WITH_HIERARCHY: usize = 7;

    let catalog = ctx.catalog_name();
    let grants = ctx.access().grants();
    for table in ctx.all_tables()? {
        let table_grants = object_grants(ctx, ObjectKind::Table, &table.name, &table.owner, &grants);
        for grant in table_grants.iter().filter(|g| g.columns.is_none()) {
            emit_grant_rows(ctx, grant, PRIVILEGE_TYPE, |row| {
                row.set(TABLE_CATALOG, &catalog);
                row.set(TABLE_SCHEMA, &table.name.schema);
                row.set(TABLE_NAME, &table.name.name);
                row.set(WITH_HIERARCHY, Value::yes_no(false));
            })?;
        }
    }
    Ok(())
}

pub fn column_privileges_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("GRANTOR", SQL_IDENTIFIER)
        .column("GRANTEE", SQL_IDENTIFIER)
        .column("TABLE_CATALOG", SQL_IDENTIFIER)
        .column("TABLE_SCHEMA", SQL_IDENTIFIER)
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("COLUMN_NAME", SQL_IDENTIFIER)
        .column("PRIVILEGE_TYPE", CHARACTER_DATA)
        .column("IS_GRANTABLE", YES_OR_NO)
        .order_key(&[2, 3, 4, 5, 6, 1, 0])
}

/// Column-level privileges. Table-wide grants apply to every column.
pub fn column_privileges(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_CATALOG: usize = 2;
    const TABLE_SCHEMA: usize = 3;
    const TABLE_NAME: usize = 4;
    const COLUMN_NAME: usize = 5;
    const PRIVILEGE_TYPE: usize = 6;

    let catalog = ctx.catalog_name();
    let grants = ctx.access().grants();
    for table in ctx.all_tables()? {
        for grant in object_grants(ctx, ObjectKind::Table, &table.name, &table.owner, &grants) {
            let grant = GrantRecord {
                privileges: grant.privileges & Privileges::column_level(),
                ..grant
            };
            for column in granted_columns(&table, &grant) {
                emit_grant_rows(ctx, &grant, PRIVILEGE_TYPE, |row| {
                    row.set(TABLE_CATALOG, &catalog);
                    row.set(TABLE_SCHEMA, &table.name.schema);
                    row.set(TABLE_NAME, &table.name.name);
                    row.set(COLUMN_NAME, column);
                })?;
            }
        }
    }
    Ok(())
}

/// Columns a grant covers, in table column order
fn granted_columns<'t>(table: &'t TableInfo, grant: &GrantRecord) -> Vec<&'t str> {
    table
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| match &grant.columns {
            None => true,
            Some(columns) => columns.iter().any(|c| c.eq_ignore_ascii_case(name)),
        })
        .collect()
}

pub fn role_table_grants_shape() -> DescriptorBuilder {
    table_privileges_shape()
        .order_key(&[3, 4, 5, 0, 1])
        .sources(&[SystemTableId::TablePrivileges, SystemTableId::ApplicableRoles])
}

pub fn role_table_grants(ctx: &mut GenerationContext<'_>) -> Result<()> {
    grants_of_applicable_roles(ctx, SystemTableId::TablePrivileges)
}

pub fn role_column_grants_shape() -> DescriptorBuilder {
    column_privileges_shape()
        .order_key(&[5, 6, 1, 0, 4, 3, 2])
        .sources(&[SystemTableId::ColumnPrivileges, SystemTableId::ApplicableRoles])
}

pub fn role_column_grants(ctx: &mut GenerationContext<'_>) -> Result<()> {
    grants_of_applicable_roles(ctx, SystemTableId::ColumnPrivileges)
}

pub fn role_routine_grants_shape() -> DescriptorBuilder {
    super::routines::routine_privileges_shape()
        .sources(&[SystemTableId::RoutinePrivileges, SystemTableId::ApplicableRoles])
}

pub fn role_routine_grants(ctx: &mut GenerationContext<'_>) -> Result<()> {
    grants_of_applicable_roles(ctx, SystemTableId::RoutinePrivileges)
}

/// Rows of a privilege view whose grantor or grantee is one of the
/// session's applicable roles
fn grants_of_applicable_roles(ctx: &mut GenerationContext<'_>, privileges: SystemTableId) -> Result<()> {
    const ROLE_NAME: usize = 1;

    let roles: Vec<&str> = ctx
        .source(SystemTableId::ApplicableRoles)?
        .iter()
        .filter_map(|r| r.text(ROLE_NAME))
        .collect();
    for source in ctx.source(privileges)? {
        let by_role = [GRANTOR, GRANTEE]
            .iter()
            .any(|&cell| source.text(cell).is_some_and(|name| roles.contains(&name)));
        if by_role {
            ctx.commit(Row::from_values(source.values().to_vec()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnInfo, DataType, TableKind};

    #[test]
    fn test_granted_columns() {
        let table = TableInfo::new(QualifiedName::new("PUBLIC", "T"), "SA", TableKind::BaseTable)
            .with_column(ColumnInfo::new("A", DataType::integer()))
            .with_column(ColumnInfo::new("B", DataType::integer()));
        let mut grant = GrantRecord {
            grantor: "SA".into(),
            grantee: "ALICE".into(),
            object_kind: ObjectKind::Table,
            object: table.name.clone(),
            columns: None,
            privileges: Privileges::SELECT,
            grantable: false,
        };
        assert_eq!(granted_columns(&table, &grant), vec!["A", "B"]);
        grant.columns = Some(vec!["b".into()]);
        assert_eq!(granted_columns(&table, &grant), vec!["B"]);
    }
}
