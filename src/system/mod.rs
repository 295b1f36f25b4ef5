// System table materialization: identities, shapes, per-session stores
// and the engine that keeps them current
pub mod bootstrap;
pub mod context;
pub mod descriptor;
pub mod engine;
pub mod generator;
pub mod registry;
pub mod row;
pub mod stats;
pub mod store;

pub use context::GenerationContext;
pub use descriptor::{ColumnDef, DescriptorBuilder, KeyKind, SystemTableDescriptor, TableKey};
pub use engine::{EngineSettings, InformationSchema, SystemTableInstance};
pub use generator::{GeneratorFn, GeneratorRegistry, RESERVED_WITHOUT_CONTENT};
pub use registry::{SystemTableId, TableRegistry};
pub use row::{InsertOutcome, Row};
pub use stats::{CacheStatus, TableStats};
pub use store::SessionStore;
