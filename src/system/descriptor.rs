use super::registry::SystemTableId;
use crate::catalog::{
    ColumnInfo, DataType, INFORMATION_SCHEMA, QualifiedName, SYSTEM_AUTHORIZATION, TableInfo,
    TableKind,
};
use crate::types::ColumnType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// True unique key; NULL compares equal to NULL
    Primary,
    /// Ordering index; rows only collide when every key cell is non-null
    OrderOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableKey {
    pub kind: KeyKind,
    pub columns: Vec<usize>,
}

/// Immutable shape of one system table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTableDescriptor {
    pub id: SystemTableId,
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub key: TableKey,
    pub cacheable: bool,
    pub session_dependent: bool,
    /// System tables this one is composed from
    pub sources: Vec<SystemTableId>,
}

impl SystemTableDescriptor {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Catalog entry under which the table lists itself in `TABLES` and
    /// `COLUMNS`
    pub fn table_info(&self) -> TableInfo {
        let mut table = TableInfo::new(
            QualifiedName::new(INFORMATION_SCHEMA, self.id.name()),
            SYSTEM_AUTHORIZATION,
            TableKind::System,
        );
        table.writable = false;
        table.columns = self
            .columns
            .iter()
            .map(|c| {
                let ty = c.column_type;
                let data_type = DataType {
                    name: ty.base_type_name().to_string(),
                    character_maximum_length: ty.max_length().map(i64::from),
                    numeric_precision: match ty {
                        ColumnType::SmallInt => Some(16),
                        ColumnType::Integer | ColumnType::CardinalNumber => Some(32),
                        ColumnType::BigInt => Some(64),
                        _ => None,
                    },
                    numeric_scale: None,
                    character_set: None,
                    collation: None,
                    domain: ty
                        .is_domain()
                        .then(|| QualifiedName::new(INFORMATION_SCHEMA, ty.type_name())),
                };
                ColumnInfo::new(c.name, data_type)
            })
            .collect();
        table
    }
}

/// Declaration of a system table's columns, key and sources, turned into
/// a descriptor by bootstrap
#[derive(Debug, Clone, Default)]
pub struct DescriptorBuilder {
    pub(crate) columns: Vec<ColumnDef>,
    pub(crate) key: Option<TableKey>,
    pub(crate) sources: Vec<SystemTableId>,
}

impl DescriptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &'static str, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef { name, column_type });
        self
    }

    pub fn primary_key(mut self, columns: &[usize]) -> Self {
        self.key = Some(TableKey {
            kind: KeyKind::Primary,
            columns: columns.to_vec(),
        });
        self
    }

    pub fn order_key(mut self, columns: &[usize]) -> Self {
        self.key = Some(TableKey {
            kind: KeyKind::OrderOnly,
            columns: columns.to_vec(),
        });
        self
    }

    pub fn sources(mut self, sources: &[SystemTableId]) -> Self {
        self.sources = sources.to_vec();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SQL_IDENTIFIER, YES_OR_NO};

    #[test]
    fn test_table_info_reports_domains() {
        let descriptor = SystemTableDescriptor {
            id: SystemTableId::EnabledRoles,
            name: "INFORMATION_SCHEMA.ENABLED_ROLES".into(),
            columns: vec![
                ColumnDef { name: "ROLE_NAME", column_type: SQL_IDENTIFIER },
                ColumnDef { name: "IS_X", column_type: YES_OR_NO },
            ],
            key: TableKey { kind: KeyKind::Primary, columns: vec![0] },
            cacheable: true,
            session_dependent: true,
            sources: vec![],
        };
        let table = descriptor.table_info();
        assert_eq!(table.kind, TableKind::System);
        assert_eq!(table.owner, SYSTEM_AUTHORIZATION);
        assert_eq!(table.columns[0].data_type.name, "CHARACTER VARYING");
        assert_eq!(
            table.columns[0].data_type.domain,
            Some(QualifiedName::new(INFORMATION_SCHEMA, "SQL_IDENTIFIER"))
        );
        assert_eq!(descriptor.column_index("is_x"), Some(1));
    }
}
