use std::collections::HashMap;

use super::context::GenerationContext;
use super::registry::SystemTableId;
use crate::error::Result;
use crate::views;

/// Fills a cleared store with the rows of one system table
pub type GeneratorFn = fn(&mut GenerationContext<'_>) -> Result<()>;

/// Tables that are known by name but deliberately produce no content.
/// Fetching them is not an error; they have no descriptor.
pub const RESERVED_WITHOUT_CONTENT: &[SystemTableId] = &[
    SystemTableId::SystemUdts,
    SystemTableId::SystemVersionColumns,
    SystemTableId::Assertions,
    SystemTableId::Jars,
    SystemTableId::JarJarUsage,
    SystemTableId::RoutineJarUsage,
    SystemTableId::MethodSpecifications,
    SystemTableId::Modules,
    SystemTableId::Parameters,
    SystemTableId::SqlFeatures,
    SystemTableId::Translations,
    SystemTableId::UserDefinedTypes,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Essential,
    Full,
}

/// Two-layer dispatch from table id to generator; the full layer wins
pub struct GeneratorRegistry {
    full: HashMap<SystemTableId, GeneratorFn>,
    essential: HashMap<SystemTableId, GeneratorFn>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::layered(views::essential(), views::full())
    }

    pub fn layered(
        essential: HashMap<SystemTableId, GeneratorFn>,
        full: HashMap<SystemTableId, GeneratorFn>,
    ) -> Self {
        Self { full, essential }
    }

    /// Essential layer only
    pub fn essential_only() -> Self {
        Self::layered(views::essential(), HashMap::new())
    }

    pub fn resolve(&self, id: SystemTableId) -> Option<GeneratorFn> {
        self.full
            .get(&id)
            .or_else(|| self.essential.get(&id))
            .copied()
    }

    pub fn layer_of(&self, id: SystemTableId) -> Option<Layer> {
        if self.full.contains_key(&id) {
            Some(Layer::Full)
        } else if self.essential.contains_key(&id) {
            Some(Layer::Essential)
        } else {
            None
        }
    }
}
