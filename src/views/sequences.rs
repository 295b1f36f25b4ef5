use super::cardinal;
use super::columns::set_type_cells;
use crate::error::Result;
use crate::system::{DescriptorBuilder, GenerationContext};
use crate::types::{CARDINAL_NUMBER, CHARACTER_DATA, SQL_IDENTIFIER, Value, YES_OR_NO};

pub fn sequences_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("SEQUENCE_CATALOG", SQL_IDENTIFIER)
        .column("SEQUENCE_SCHEMA", SQL_IDENTIFIER)
        .column("SEQUENCE_NAME", SQL_IDENTIFIER)
        .column("DATA_TYPE", CHARACTER_DATA)
        .column("NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("NUMERIC_PRECISION_RADIX", CARDINAL_NUMBER)
        .column("NUMERIC_SCALE", CARDINAL_NUMBER)
        .column("MAXIMUM_VALUE", CHARACTER_DATA)
        .column("MINIMUM_VALUE", CHARACTER_DATA)
        .column("INCREMENT", CHARACTER_DATA)
        .column("CYCLE_OPTION", YES_OR_NO)
        .column("DECLARED_DATA_TYPE", CHARACTER_DATA)
        .column("DECLARED_NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("DECLARED_NUMERIC_SCALE", CARDINAL_NUMBER)
        .column("START_WITH", CHARACTER_DATA)
        .column("NEXT_VALUE", CHARACTER_DATA)
        .order_key(&[0, 1, 2])
}

/// Visible sequences; bounds are rendered as text to cover every integer
/// type. `NEXT_VALUE` is filled only for the uncached `SYSTEM_SEQUENCES`.
pub fn sequences(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const SEQUENCE_CATALOG: usize = 0;
    const SEQUENCE_SCHEMA: usize = 1;
    const SEQUENCE_NAME: usize = 2;
    const DATA_TYPE: usize = 3;
    const NUMERIC_PRECISION: usize = 4;
    const NUMERIC_PRECISION_RADIX: usize = 5;
    const NUMERIC_SCALE: usize = 6;
    const MAXIMUM_VALUE: usize = 7;
    const MINIMUM_VALUE: usize = 8;
    const INCREMENT: usize = 9;
    const CYCLE_OPTION: usize = 10;
    const DECLARED_DATA_TYPE: usize = 11;
    const DECLARED_NUMERIC_PRECISION: usize = 12;
    const DECLARED_NUMERIC_SCALE: usize = 13;
    const START_WITH: usize = 14;
    const NEXT_VALUE: usize = 15;

    let catalog = ctx.catalog_name();
    for sequence in ctx.catalog().sequences()? {
        if !ctx.is_accessible(&sequence) {
            continue;
        }
        let data_type = &sequence.data_type;
        let mut row = ctx.new_row();
        row.set(SEQUENCE_CATALOG, &catalog);
        row.set(SEQUENCE_SCHEMA, &sequence.name.schema);
        row.set(SEQUENCE_NAME, &sequence.name.name);
        row.set(DATA_TYPE, &data_type.name);
        row.set(NUMERIC_PRECISION, cardinal(data_type.numeric_precision));
        row.set(NUMERIC_PRECISION_RADIX, cardinal(Some(2)));
        row.set(NUMERIC_SCALE, cardinal(Some(0)));
        row.set(MAXIMUM_VALUE, sequence.maximum.to_string());
        row.set(MINIMUM_VALUE, sequence.minimum.to_string());
        row.set(INCREMENT, sequence.increment.to_string());
        row.set(CYCLE_OPTION, Value::yes_no(sequence.cycle));
        row.set(DECLARED_DATA_TYPE, &data_type.name);
        row.set(DECLARED_NUMERIC_PRECISION, cardinal(data_type.numeric_precision));
        row.set(DECLARED_NUMERIC_SCALE, cardinal(Some(0)));
        row.set(START_WITH, sequence.start_with.to_string());
        // next values move without a schema change
        if !ctx.descriptor().cacheable {
            row.set(NEXT_VALUE, sequence.next_value.to_string());
        }
        ctx.commit(row)?;
    }
    Ok(())
}

pub fn domains_shape() -> DescriptorBuilder {
    DescriptorBuilder::new()
        .column("DOMAIN_CATALOG", SQL_IDENTIFIER)
        .column("DOMAIN_SCHEMA", SQL_IDENTIFIER)
        .column("DOMAIN_NAME", SQL_IDENTIFIER)
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
        .column("DOMAIN_DEFAULT", CHARACTER_DATA)
        .column("MAXIMUM_CARDINALITY", CARDINAL_NUMBER)
        .column("DTD_IDENTIFIER", SQL_IDENTIFIER)
        .column("DECLARED_DATA_TYPE", CHARACTER_DATA)
        .column("DECLARED_NUMERIC_PRECISION", CARDINAL_NUMBER)
        .column("DECLARED_NUMERIC_SCALE", CARDINAL_NUMBER)
        .order_key(&[0, 1, 2, 4, 5, 6])
}

/// Visible domains with their underlying type
pub fn domains(ctx: &mut GenerationContext<'_>) -> Result<()> {
    const DOMAIN_CATALOG: usize = 0;
    const DOMAIN_SCHEMA: usize = 1;
    const DOMAIN_NAME: usize = 2;
    const DATA_TYPE: usize = 3;
    const CHARACTER_MAXIMUM_LENGTH: usize = 4;
    const CHARACTER_OCTET_LENGTH: usize = 5;
    const CHARACTER_SET_CATALOG: usize = 6;
    const CHARACTER_SET_NAME: usize = 8;
    const COLLATION_CATALOG: usize = 9;
    const COLLATION_NAME: usize = 11;
    const NUMERIC_PRECISION: usize = 12;
    const NUMERIC_PRECISION_RADIX: usize = 13;
    const NUMERIC_SCALE: usize = 14;
    const DOMAIN_DEFAULT: usize = 18;
    const DTD_IDENTIFIER: usize = 20;
    const DECLARED_DATA_TYPE: usize = 21;
    const DECLARED_NUMERIC_PRECISION: usize = 22;
    const DECLARED_NUMERIC_SCALE: usize = 23;

    let catalog = ctx.catalog_name();
    for domain in ctx.catalog().domains()? {
        if !ctx.is_accessible(&domain) {
            continue;
        }
        let data_type = &domain.data_type;
        let mut row = ctx.new_row();
        row.set(DOMAIN_CATALOG, &catalog);
        row.set(DOMAIN_SCHEMA, &domain.name.schema);
        row.set(DOMAIN_NAME, &domain.name.name);
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
        if let Some(charset) = &data_type.character_set {
            row.set(CHARACTER_SET_CATALOG, &catalog);
            row.set(CHARACTER_SET_NAME, charset);
        }
        if let Some(collation) = &data_type.collation {
            row.set(COLLATION_CATALOG, &catalog);
            row.set(COLLATION_NAME, collation);
        }
        row.set(DOMAIN_DEFAULT, domain.default_sql.as_ref());
        row.set(DTD_IDENTIFIER, &domain.name.name);
        row.set(DECLARED_DATA_TYPE, &data_type.name);
        row.set(DECLARED_NUMERIC_PRECISION, cardinal(data_type.numeric_precision));
        row.set(DECLARED_NUMERIC_SCALE, cardinal(data_type.numeric_scale));
        ctx.commit(row)?;
    }
    Ok(())
}
