use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CHARACTER_DATA, SQL_IDENTIFIER};

pub fn character_sets_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("CHARACTER_SET_CATALOG", SQL_IDENTIFIER)
        .column("CHARACTER_SET_SCHEMA", SQL_IDENTIFIER)
        .column("CHARACTER_SET_NAME", SQL_IDENTIFIER)
        .column("CHARACTER_REPERTOIRE", SQL_IDENTIFIER)
        .column("FORM_OF_USE", SQL_IDENTIFIER)
        .column("DEFAULT_COLLATE_CATALOG", SQL_IDENTIFIER)
        .column("DEFAULT_COLLATE_SCHEMA", SQL_IDENTIFIER)
        .column("DEFAULT_COLLATE_NAME", SQL_IDENTIFIER)
        .order_key(&[0, 1, 2])
}

pub fn character_sets(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const CHARACTER_SET_CATALOG: usize = 0;
    const CHARACTER_SET_SCHEMA: usize = 1;
    const CHARACTER_SET_NAME: usize = 2;
    const CHARACTER_REPERTOIRE: usize = 3;
    const FORM_OF_USE: usize = 4;
    const DEFAULT_COLLATE_CATALOG: usize = 5;
    const DEFAULT_COLLATE_SCHEMA: usize = 6;
    const DEFAULT_COLLATE_NAME: usize = 7;

    let catalog = ctx.catalog_name();
    for charset in ctx.catalog().character_sets()? {
        if !ctx.is_accessible(&charset) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(CHARACTER_SET_CATALOG, &catalog);
        row.set(CHARACTER_SET_SCHEMA, &charset.name.schema);
        row.set(CHARACTER_SET_NAME, &charset.name.name);
        row.set(CHARACTER_REPERTOIRE, &charset.repertoire);
        row.set(FORM_OF_USE, &charset.form_of_use);
        if let Some(collation) = &charset.default_collation {
            row.set(DEFAULT_COLLATE_CATALOG, &catalog);
            row.set(DEFAULT_COLLATE_SCHEMA, &collation.schema);
            row.set(DEFAULT_COLLATE_NAME, &collation.name);
        }
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn collations_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("COLLATION_CATALOG", SQL_IDENTIFIER)
        .column("COLLATION_SCHEMA", SQL_IDENTIFIER)
        .column("COLLATION_NAME", SQL_IDENTIFIER)
        .column("PAD_ATTRIBUTE", CHARACTER_DATA)
        .order_key(&[0, 1, 2])
}

pub fn collations(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const COLLATION_CATALOG: usize = 0;
    const COLLATION_SCHEMA: usize = 1;
    const COLLATION_NAME: usize = 2;
    const PAD_ATTRIBUTE: usize = 3;

    let catalog = ctx.catalog_name();
    for collation in ctx.catalog().collations()? {
        if !ctx.is_accessible(&collation) {
            continue;
        }
        let mut row = ctx.new_row();
        row.set(COLLATION_CATALOG, &catalog);
        row.set(COLLATION_SCHEMA, &collation.name.schema);
        row.set(COLLATION_NAME, &collation.name.name);
        row.set(PAD_ATTRIBUTE, if collation.pad_space { "PAD SPACE" } else { "NO PAD" });
        ctx.commit(row)?;
    }
    Ok(())
}
