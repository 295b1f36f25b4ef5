use crate::error::Result;
use crate::rights::{AuthorizationKind, PUBLIC_ROLE, RoleGrant};
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{ColumnType, SQL_IDENTIFIER};

pub fn users_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("USER_NAME", SQL_IDENTIFIER)
        .column("ADMIN", ColumnType::Boolean)
        .column("INITIAL_SCHEMA", SQL_IDENTIFIER)
        .primary_key(&[0])
}

/// Users. Administrators see everyone, others only themselves.
pub fn users(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const USER_NAME: usize = 0;
    const ADMIN: usize = 1;
    const INITIAL_SCHEMA: usize = 2;

    let admin = ctx.capability().is_admin();
    let me = ctx.capability().authorization().to_string();
    for user in ctx.access().authorizations() {
        if user.kind != AuthorizationKind::User || (!admin && user.name != me) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(USER_NAME, &user.name);
        row.set(ADMIN, user.admin);
        row.set(INITIAL_SCHEMA, user.initial_schema);
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn authorizations_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("AUTHORIZATION_NAME", SQL_IDENTIFIER)
        .column("AUTHORIZATION_TYPE", SQL_IDENTIFIER)
        .primary_key(&[0])
}

/// Users and roles the session is, holds, or, for administrators, any
pub fn authorizations(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const AUTHORIZATION_NAME: usize = 0;
    const AUTHORIZATION_TYPE: usize = 1;

    for authorization in ctx.access().authorizations() {
        let capability = ctx.capability();
        if !capability.is_admin() && !capability.holds(&authorization.name) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(AUTHORIZATION_NAME, &authorization.name);
        row.set(AUTHORIZATION_TYPE, authorization.kind.as_str());
        ctx.commit(row)?;
    }
    Ok(())
}

/// Shared by `APPLICABLE_ROLES` and `ADMINISTRABLE_ROLE_AUTHORIZATIONS`
fn role_authorization_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("GRANTEE", SQL_IDENTIFIER)
        .column("ROLE_NAME", SQL_IDENTIFIER)
        .column("IS_GRANTABLE", SQL_IDENTIFIER)
        .order_key(&[0, 1, 2])
}

pub fn applicable_roles_shape() -> DescriptorBuilder {
    role_authorization_shape()
}

/// Role grants whose grantee the session is or holds. `PUBLIC` is held
/// implicitly and never listed.
pub fn applicable_roles(ctx: &mut GenerationContext<'_>) -> Result<()> {
    let grants: Vec<RoleGrant> = ctx
        .access()
        .role_grants()
        .into_iter()
        .filter(|g| g.role != PUBLIC_ROLE && ctx.capability().holds(&g.grantee))
        .collect();
    emit_role_grants(ctx, &grants)
}

pub fn administrable_roles_shape() -> DescriptorBuilder {
    role_authorization_shape()
}

/// Applicable roles the session may grant onward
pub fn administrable_roles(ctx: &mut GenerationContext<'_>) -> Result<()> {
    let grants: Vec<RoleGrant> = ctx
        .access()
        .role_grants()
        .into_iter()
        .filter(|g| g.admin_option && ctx.capability().holds(&g.grantee))
        .collect();
    emit_role_grants(ctx, &grants)
}

fn emit_role_grants(ctx: &mut GenerationContext<'_>, grants: &[RoleGrant]) -> Result<()> {
    const GRANTEE: usize = 0;
    const ROLE_NAME: usize = 1;
    const IS_GRANTABLE: usize = 2;

    for grant in grants {
        let mut row = ctx.new_row();
        row.set(GRANTEE, &grant.grantee);
        row.set(ROLE_NAME, &grant.role);
        row.set(IS_GRANTABLE, if grant.admin_option { "YES" } else { "NO" });
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn enabled_roles_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("ROLE_NAME", SQL_IDENTIFIER)
        .primary_key(&[0])
}

/// Roles in effect for the session, transitively expanded
pub fn enabled_roles(ctx: &mut GenerationContext<'_>) -> Result<()> {
    let roles = ctx.capability().enabled_roles().to_vec();
    for role in roles {
        let mut row = ctx.new_row();
        row.set(0, role);
        ctx.commit(row)?;
    }
    Ok(())
}
