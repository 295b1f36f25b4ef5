use super::Value;

/// Column types available to system table declarations.
///
/// The first five are the SQL-standard INFORMATION_SCHEMA domains; the rest
/// are native scalars used by the product-specific `SYSTEM_*` tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    SqlIdentifier,
    CharacterData,
    CardinalNumber,
    YesOrNo,
    TimeStamp,
    Integer,
    SmallInt,
    BigInt,
    Boolean,
}

pub const SQL_IDENTIFIER: ColumnType = ColumnType::SqlIdentifier;
pub const CHARACTER_DATA: ColumnType = ColumnType::CharacterData;
pub const CARDINAL_NUMBER: ColumnType = ColumnType::CardinalNumber;
pub const YES_OR_NO: ColumnType = ColumnType::YesOrNo;
pub const TIME_STAMP: ColumnType = ColumnType::TimeStamp;

impl ColumnType {
    /// Name as reported by `COLUMNS.DATA_TYPE` for the system tables themselves
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::SqlIdentifier => "SQL_IDENTIFIER",
            ColumnType::CharacterData => "CHARACTER_DATA",
            ColumnType::CardinalNumber => "CARDINAL_NUMBER",
            ColumnType::YesOrNo => "YES_OR_NO",
            ColumnType::TimeStamp => "TIME_STAMP",
            ColumnType::Integer => "INTEGER",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    /// Underlying SQL type of the domain
    pub fn base_type_name(&self) -> &'static str {
        match self {
            ColumnType::SqlIdentifier | ColumnType::CharacterData | ColumnType::YesOrNo => {
                "CHARACTER VARYING"
            }
            ColumnType::CardinalNumber | ColumnType::Integer => "INTEGER",
            ColumnType::TimeStamp => "TIMESTAMP",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ColumnType::SqlIdentifier
                | ColumnType::CharacterData
                | ColumnType::CardinalNumber
                | ColumnType::YesOrNo
                | ColumnType::TimeStamp
        )
    }

    pub fn max_length(&self) -> Option<u32> {
        match self {
            ColumnType::SqlIdentifier => Some(128),
            ColumnType::CharacterData => Some(65536),
            ColumnType::YesOrNo => Some(3),
            _ => None,
        }
    }

    /// Whether `value` is a legal cell for a column of this type. NULL is
    /// always accepted; nullability of system table columns is not enforced.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::SqlIdentifier | ColumnType::CharacterData, Value::Text(_)) => true,
            (ColumnType::YesOrNo, Value::Text(s)) => s == "YES" || s == "NO",
            (ColumnType::CardinalNumber, Value::Integer(i)) => *i >= 0 && *i <= i32::MAX as i64,
            (ColumnType::Integer, Value::Integer(i)) => i32::try_from(*i).is_ok(),
            (ColumnType::SmallInt, Value::Integer(i)) => i16::try_from(*i).is_ok(),
            (ColumnType::BigInt, Value::Integer(_)) => true,
            (ColumnType::Boolean, Value::Boolean(_)) => true,
            (ColumnType::TimeStamp, Value::Timestamp(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_or_no_domain() {
        assert!(YES_OR_NO.accepts(&Value::yes_no(true)));
        assert!(!YES_OR_NO.accepts(&Value::from("MAYBE")));
        assert!(YES_OR_NO.accepts(&Value::Null));
    }

    #[test]
    fn test_numeric_ranges() {
        assert!(CARDINAL_NUMBER.accepts(&Value::Integer(0)));
        assert!(!CARDINAL_NUMBER.accepts(&Value::Integer(-1)));
        assert!(ColumnType::SmallInt.accepts(&Value::Integer(32767)));
        assert!(!ColumnType::SmallInt.accepts(&Value::Integer(32768)));
        assert!(!ColumnType::Integer.accepts(&Value::from("1")));
    }
}
