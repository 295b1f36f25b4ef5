pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod rights;
pub mod session;
pub mod system;
pub mod types;
pub mod views;

pub use error::{InfoSchemaError, Result};
pub use query::QueryResult;
pub use session::Session;
pub use system::{EngineSettings, InformationSchema, InsertOutcome, SystemTableId, SystemTableInstance};
