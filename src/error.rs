use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfoSchemaError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("SQL parse error: {0}")]
    SqlParse(#[from] sqlparser::parser::ParserError),

    #[error("Malformed system table {table}: {reason}")]
    Bootstrap { table: String, reason: String },

    #[error("Column {column} of {table} cannot hold {value}")]
    TypeMismatch {
        table: String,
        column: String,
        value: String,
    },

    #[error("Row width {actual} does not match {table} ({expected} columns)")]
    RowWidth {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown authorization: {0}")]
    UnknownAuthorization(String),

    #[error("Authorization already exists: {0}")]
    DuplicateAuthorization(String),

    #[error("Feature not supported: {0}")]
    NotSupported(String),

    #[error("Invalid grant definition: {0}")]
    InvalidGrant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InfoSchemaError>;

impl InfoSchemaError {
    /// SQLSTATE reported to clients for this error
    pub fn sqlstate(&self) -> &str {
        match self {
            InfoSchemaError::Catalog(_) => "XX000",                    // internal_error
            InfoSchemaError::Sqlite(_) => "58000",                     // system_error
            InfoSchemaError::SqlParse(_) => "42601",                   // syntax_error
            InfoSchemaError::Bootstrap { .. } => "XX000",              // internal_error
            InfoSchemaError::TypeMismatch { .. } => "XX000",           // internal_error
            InfoSchemaError::RowWidth { .. } => "XX000",               // internal_error
            InfoSchemaError::UnknownAuthorization(_) => "28000",       // invalid_authorization_specification
            InfoSchemaError::DuplicateAuthorization(_) => "42710",     // duplicate_object
            InfoSchemaError::NotSupported(_) => "0A000",               // feature_not_supported
            InfoSchemaError::InvalidGrant(_) => "0LP01",               // invalid_grant_operation
            InfoSchemaError::Io(_) => "58030",                         // io_error
            InfoSchemaError::Json(_) => "22P02",                       // invalid_text_representation
        }
    }

    pub(crate) fn bootstrap(table: &str, reason: impl Into<String>) -> Self {
        InfoSchemaError::Bootstrap {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_codes() {
        assert_eq!(InfoSchemaError::NotSupported("x".into()).sqlstate(), "0A000");
        assert_eq!(InfoSchemaError::UnknownAuthorization("bob".into()).sqlstate(), "28000");
        assert_eq!(InfoSchemaError::bootstrap("TABLES", "no columns").sqlstate(), "XX000");
    }

    #[test]
    fn test_bootstrap_message() {
        let err = InfoSchemaError::bootstrap("TABLES", "key column 12 out of range");
        assert_eq!(err.to_string(), "Malformed system table TABLES: key column 12 out of range");
    }
}
