use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use super::descriptor::{SystemTableDescriptor, TableKey};
use super::registry::{SystemTableId, TableRegistry};
use crate::error::{InfoSchemaError, Result};
use crate::views;

/// Builds the descriptor of one system table. Reserved tables without a
/// declared shape yield `None`.
pub fn bootstrap(registry: &TableRegistry, id: SystemTableId) -> Result<Option<SystemTableDescriptor>> {
    let Some(builder) = views::shape(id) else {
        trace!("No shape declared for {}", id);
        return Ok(None);
    };
    let table = id.name();

    if builder.columns.is_empty() {
        return Err(InfoSchemaError::bootstrap(table, "no columns declared"));
    }
    let mut seen = HashSet::new();
    for column in &builder.columns {
        if !seen.insert(column.name) {
            return Err(InfoSchemaError::bootstrap(
                table,
                format!("duplicate column {}", column.name),
            ));
        }
    }

    let key: TableKey = builder
        .key
        .ok_or_else(|| InfoSchemaError::bootstrap(table, "no key declared"))?;
    if key.columns.is_empty() {
        return Err(InfoSchemaError::bootstrap(table, "empty key"));
    }
    if let Some(bad) = key.columns.iter().find(|&&c| c >= builder.columns.len()) {
        return Err(InfoSchemaError::bootstrap(
            table,
            format!("key column {bad} out of range"),
        ));
    }

    for source in &builder.sources {
        if *source == id {
            return Err(InfoSchemaError::bootstrap(table, "table is its own source"));
        }
        if views::shape(*source).is_none() {
            return Err(InfoSchemaError::bootstrap(
                table,
                format!("source {source} has no content"),
            ));
        }
    }

    debug!(
        "Bootstrapped {} ({} columns, {:?} key over {:?})",
        table,
        builder.columns.len(),
        key.kind,
        key.columns
    );

    Ok(Some(SystemTableDescriptor {
        id,
        name: registry.qualified_name(id),
        columns: builder.columns,
        key,
        cacheable: registry.is_cacheable(id),
        session_dependent: registry.is_session_dependent(id),
        sources: builder.sources,
    }))
}

/// Bootstraps every registered table and checks that composition sources
/// form no cycle
pub fn bootstrap_all(registry: &TableRegistry) -> Result<HashMap<SystemTableId, Arc<SystemTableDescriptor>>> {
    let mut descriptors = HashMap::new();
    for id in registry.ids() {
        if let Some(descriptor) = bootstrap(registry, id)? {
            descriptors.insert(id, Arc::new(descriptor));
        }
    }
    check_acyclic(&descriptors)?;
    Ok(descriptors)
}

fn check_acyclic(descriptors: &HashMap<SystemTableId, Arc<SystemTableDescriptor>>) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(
        id: SystemTableId,
        descriptors: &HashMap<SystemTableId, Arc<SystemTableDescriptor>>,
        marks: &mut HashMap<SystemTableId, Mark>,
    ) -> Result<()> {
        match marks.get(&id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(InfoSchemaError::bootstrap(id.name(), "cyclic source declaration"));
            }
            None => {}
        }
        marks.insert(id, Mark::Visiting);
        if let Some(descriptor) = descriptors.get(&id) {
            for source in &descriptor.sources {
                visit(*source, descriptors, marks)?;
            }
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut ids: Vec<_> = descriptors.keys().copied().collect();
    ids.sort();
    for id in ids {
        visit(id, descriptors, &mut marks)?;
    }
    Ok(())
}
