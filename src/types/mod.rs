// Column vocabulary shared by every system table declaration
pub mod column_type;
pub mod value;

pub use column_type::{
    CARDINAL_NUMBER, CHARACTER_DATA, ColumnType, SQL_IDENTIFIER, TIME_STAMP, YES_OR_NO,
};
pub use value::Value;
