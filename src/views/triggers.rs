use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CARDINAL_NUMBER, CHARACTER_DATA, SQL_IDENTIFIER, TIME_STAMP};

pub fn triggers_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("TRIGGER_CATALOG", SQL_IDENTIFIER)
        .column("TRIGGER_SCHEMA", SQL_IDENTIFIER)
        .column("TRIGGER_NAME", SQL_IDENTIFIER)
        .column("EVENT_MANIPULATION", CHARACTER_DATA)
        .column("EVENT_OBJECT_CATALOG", SQL_IDENTIFIER)
        .column("EVENT_OBJECT_SCHEMA", SQL_IDENTIFIER)
        .column("EVENT_OBJECT_TABLE", SQL_IDENTIFIER)
        .column("ACTION_ORDER", CARDINAL_NUMBER)
        .column("ACTION_CONDITION", CHARACTER_DATA)
        .column("ACTION_STATEMENT", CHARACTER_DATA)
        .column("ACTION_ORIENTATION", CHARACTER_DATA)
        .column("ACTION_TIMING", CHARACTER_DATA)
        .column("ACTION_REFERENCE_OLD_TABLE", SQL_IDENTIFIER)
        .column("ACTION_REFERENCE_NEW_TABLE", SQL_IDENTIFIER)
        .column("ACTION_REFERENCE_OLD_ROW", SQL_IDENTIFIER)
        .column("ACTION_REFERENCE_NEW_ROW", SQL_IDENTIFIER)
        .column("CREATED", TIME_STAMP)
        .order_key(&[0, 1, 2])
}

/// Triggers on accessible tables. Condition and body need full access to
/// the trigger.
pub fn triggers(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const TRIGGER_CATALOG: usize = 0;
    const TRIGGER_SCHEMA: usize = 1;
    const TRIGGER_NAME: usize = 2;
    const EVENT_MANIPULATION: usize = 3;
    const EVENT_OBJECT_CATALOG: usize = 4;
    const EVENT_OBJECT_SCHEMA: usize = 5;
    const EVENT_OBJECT_TABLE: usize = 6;
    const ACTION_ORDER: usize = 7;
    const ACTION_CONDITION: usize = 8;
    const ACTION_STATEMENT: usize = 9;
    const ACTION_ORIENTATION: usize = 10;
    const ACTION_TIMING: usize = 11;
    const CREATED: usize = 16;

    let catalog = ctx.catalog_name();
    let tables = ctx.catalog().tables()?;
    for trigger in ctx.catalog().triggers()? {
        let table_visible = tables
            .iter()
            .find(|t| t.name == trigger.table)
            .is_some_and(|t| ctx.is_accessible_table(t));
        if !table_visible && !ctx.is_accessible(&trigger) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(TRIGGER_CATALOG, &catalog);
        row.set(TRIGGER_SCHEMA, &trigger.name.schema);
        row.set(TRIGGER_NAME, &trigger.name.name);
        row.set(EVENT_MANIPULATION, trigger.event.as_str());
        row.set(EVENT_OBJECT_CATALOG, &catalog);
        row.set(EVENT_OBJECT_SCHEMA, &trigger.table.schema);
        row.set(EVENT_OBJECT_TABLE, &trigger.table.name);
        row.set(ACTION_ORDER, super::cardinal(Some(trigger.action_order)));
        if ctx.is_fully_accessible(&trigger) {
            row.set(ACTION_CONDITION, trigger.condition.as_ref());
            row.set(ACTION_STATEMENT, trigger.action.as_ref());
        }
        row.set(ACTION_ORIENTATION, if trigger.for_each_row { "ROW" } else { "STATEMENT" });
        row.set(ACTION_TIMING, trigger.timing.as_str());
        row.set(CREATED, trigger.created);
        ctx.commit(row)?;
    }
    Ok(())
}
