use super::cardinal;
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CARDINAL_NUMBER, CHARACTER_DATA, ColumnType, SQL_IDENTIFIER, TIME_STAMP};

pub fn cache_info_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TABLE_NAME", SQL_IDENTIFIER)
        .column("CACHEABLE", ColumnType::Boolean)
        .column("SESSION_DEPENDENT", ColumnType::Boolean)
        .column("HITS", ColumnType::BigInt)
        .column("REBUILDS", ColumnType::BigInt)
        .column("ROWS_COMMITTED", ColumnType::BigInt)
        .column("ROWS_DISCARDED", ColumnType::BigInt)
        .primary_key(&[0])
}

/// Materialization counters of every system table; administrators only
pub fn cache_info(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TABLE_NAME: usize = 0;
    const CACHEABLE: usize = 1;
    const SESSION_DEPENDENT: usize = 2;
    const HITS: usize = 3;
    const REBUILDS: usize = 4;
    const ROWS_COMMITTED: usize = 5;
    const ROWS_DISCARDED: usize = 6;

    if !ctx.capability().is_admin() {
        return Ok(());
    }
    for status in ctx.engine().cache_statuses() {
        let mut row = ctx.new_row();
        row.set(TABLE_NAME, status.table.name());
        row.set(CACHEABLE, status.cacheable);
        row.set(
            SESSION_DEPENDENT,
            ctx.engine().descriptor(status.table).map(|d| d.session_dependent),
        );
        row.set(HITS, status.hits);
        row.set(REBUILDS, status.rebuilds);
        row.set(ROWS_COMMITTED, status.rows_committed);
        row.set(ROWS_DISCARDED, status.rows_discarded);
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn session_info_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("KEY", SQL_IDENTIFIER)
        .column("VALUE", CHARACTER_DATA)
        .primary_key(&[0])
}

/// Attributes of the calling session as key/value pairs
pub fn session_info(ctx: &mut GenerationContext<'_>) -> Result<()> {
    let info = ctx.session().info();
    let settings = ctx.engine().settings();
    let database_read_only = settings
        .properties
        .get("readonly")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let pairs: [(&str, Option<String>); 10] = [
        ("SESSION_ID", Some(info.id.to_string())),
        ("AUTOCOMMIT", Some(info.autocommit.to_string())),
        ("USER", Some(info.user.clone())),
        ("SESSION_READONLY", Some(info.read_only.to_string())),
        ("DATABASE_READONLY", Some(database_read_only.to_string())),
        ("MAXROWS", Some(info.max_rows.to_string())),
        ("DATABASE", Some(settings.database.clone())),
        ("IDENTITY", None),
        ("SCHEMA", Some(info.current_schema.clone())),
        ("CURRENT_STATEMENT", info.current_statement.clone()),
    ];
    for (key, value) in pairs {
        let mut row = ctx.new_row();
        row.set(0, key);
        row.set(1, value);
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn sessions_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("SESSION_ID", CARDINAL_NUMBER)
        .column("CONNECTED", TIME_STAMP)
        .column("USER_NAME", SQL_IDENTIFIER)
        .column("IS_ADMIN", ColumnType::Boolean)
        .column("AUTOCOMMIT", ColumnType::Boolean)
        .column("READONLY", ColumnType::Boolean)
        .column("MAXROWS", CARDINAL_NUMBER)
        .column("LAST_IDENTITY", CARDINAL_NUMBER)
        .column("TRANSACTION_SIZE", CARDINAL_NUMBER)
        .column("SCHEMA", SQL_IDENTIFIER)
        .column("CURRENT_STATEMENT", CHARACTER_DATA)
        .primary_key(&[0])
}

/// Live sessions. Administrators see all of them, others their own.
pub fn sessions(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const SESSION_ID: usize = 0;
    const CONNECTED: usize = 1;
    const USER_NAME: usize = 2;
    const IS_ADMIN: usize = 3;
    const AUTOCOMMIT: usize = 4;
    const READONLY: usize = 5;
    const MAXROWS: usize = 6;
    const TRANSACTION_SIZE: usize = 8;
    const SCHEMA: usize = 9;
    const CURRENT_STATEMENT: usize = 10;

    let own_id = ctx.session().id();
    let admin = ctx.capability().is_admin();
    for info in ctx.engine().sessions().snapshot() {
        if !admin && info.id != own_id {
            continue;
        }
        let is_admin = ctx
            .access()
            .capability(&info.user)
            .map(|c| c.is_admin())
            .unwrap_or(false);
        let mut row = ctx.new_row();
        row.set(SESSION_ID, cardinal(i64::try_from(info.id).ok()));
        row.set(CONNECTED, info.connected);
        row.set(USER_NAME, &info.user);
        row.set(IS_ADMIN, is_admin);
        row.set(AUTOCOMMIT, info.autocommit);
        row.set(READONLY, info.read_only);
        row.set(MAXROWS, cardinal(i64::try_from(info.max_rows).ok()));
        row.set(TRANSACTION_SIZE, cardinal(Some(0)));
        row.set(SCHEMA, &info.current_schema);
        row.set(CURRENT_STATEMENT, info.current_statement);
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn properties_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("PROPERTY_SCOPE", SQL_IDENTIFIER)
        .column("PROPERTY_NAMESPACE", SQL_IDENTIFIER)
        .column("PROPERTY_NAME", SQL_IDENTIFIER)
        .column("PROPERTY_VALUE", CHARACTER_DATA)
        .column("PROPERTY_CLASS", CHARACTER_DATA)
        .primary_key(&[0, 1, 2])
}

/// Engine settings and live counters
pub fn properties(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const NAMESPACE: &str = "infoschema";
    const TEXT: &str = "CHARACTER VARYING";
    const NUMBER: &str = "BIGINT";

    let engine = ctx.engine();
    let settings = engine.settings();
    let mut entries: Vec<(&str, String, String, &str)> = vec![
        ("DATABASE", "database".to_string(), settings.database.clone(), TEXT),
        ("DATABASE", "owner".to_string(), settings.owner.clone(), TEXT),
        (
            "DATABASE",
            "schema_change_counter".to_string(),
            engine.schema_change_counter()?.to_string(),
            NUMBER,
        ),
        ("SYSTEM", "session_count".to_string(), engine.sessions().count().to_string(), NUMBER),
        ("SYSTEM", "version".to_string(), env!("CARGO_PKG_VERSION").to_string(), TEXT),
    ];
    entries.extend(
        settings
            .properties
            .iter()
            .map(|(name, value)| ("DATABASE", name.clone(), value.clone(), TEXT)),
    );

    for (scope, name, value, class) in entries {
        let mut row = ctx.new_row();
        row.set(0, scope);
        row.set(1, NAMESPACE);
        row.set(2, name);
        row.set(3, value);
        row.set(4, class);
        ctx.commit(row)?;
    }
    Ok(())
}
