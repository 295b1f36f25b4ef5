use std::collections::HashMap;
use std::fmt;

use crate::catalog::INFORMATION_SCHEMA;

macro_rules! system_tables {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Identity of every table the information schema knows about
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SystemTableId {
            $($variant),*
        }

        impl SystemTableId {
            pub const ALL: &'static [SystemTableId] = &[$(SystemTableId::$variant),*];

            /// Unqualified table name
            pub fn name(&self) -> &'static str {
                match self {
                    $(SystemTableId::$variant => $name),*
                }
            }
        }
    };
}

system_tables! {
    SystemBestRowIdentifier => "SYSTEM_BESTROWIDENTIFIER",
    SystemColumns => "SYSTEM_COLUMNS",
    SystemCrossReference => "SYSTEM_CROSSREFERENCE",
    SystemIndexInfo => "SYSTEM_INDEXINFO",
    SystemPrimaryKeys => "SYSTEM_PRIMARYKEYS",
    SystemProcedures => "SYSTEM_PROCEDURES",
    SystemSchemas => "SYSTEM_SCHEMAS",
    SystemTables => "SYSTEM_TABLES",
    SystemTableTypes => "SYSTEM_TABLETYPES",
    SystemTypeInfo => "SYSTEM_TYPEINFO",
    SystemUdts => "SYSTEM_UDTS",
    SystemUsers => "SYSTEM_USERS",
    SystemVersionColumns => "SYSTEM_VERSIONCOLUMNS",
    SystemSequences => "SYSTEM_SEQUENCES",
    SystemCacheInfo => "SYSTEM_CACHEINFO",
    SystemSessionInfo => "SYSTEM_SESSIONINFO",
    SystemSessions => "SYSTEM_SESSIONS",
    SystemProperties => "SYSTEM_PROPERTIES",
    AdministrableRoleAuthorizations => "ADMINISTRABLE_ROLE_AUTHORIZATIONS",
    ApplicableRoles => "APPLICABLE_ROLES",
    Assertions => "ASSERTIONS",
    Authorizations => "AUTHORIZATIONS",
    CharacterSets => "CHARACTER_SETS",
    CheckConstraints => "CHECK_CONSTRAINTS",
    Collations => "COLLATIONS",
    ColumnPrivileges => "COLUMN_PRIVILEGES",
    Columns => "COLUMNS",
    Domains => "DOMAINS",
    EnabledRoles => "ENABLED_ROLES",
    InformationSchemaCatalogName => "INFORMATION_SCHEMA_CATALOG_NAME",
    JarJarUsage => "JAR_JAR_USAGE",
    Jars => "JARS",
    KeyColumnUsage => "KEY_COLUMN_USAGE",
    MethodSpecifications => "METHOD_SPECIFICATIONS",
    Modules => "MODULES",
    Parameters => "PARAMETERS",
    ReferentialConstraints => "REFERENTIAL_CONSTRAINTS",
    RoleColumnGrants => "ROLE_COLUMN_GRANTS",
    RoleRoutineGrants => "ROLE_ROUTINE_GRANTS",
    RoleTableGrants => "ROLE_TABLE_GRANTS",
    RoutineJarUsage => "ROUTINE_JAR_USAGE",
    RoutinePrivileges => "ROUTINE_PRIVILEGES",
    Routines => "ROUTINES",
    Schemata => "SCHEMATA",
    Sequences => "SEQUENCES",
    SqlFeatures => "SQL_FEATURES",
    TableConstraints => "TABLE_CONSTRAINTS",
    TablePrivileges => "TABLE_PRIVILEGES",
    Tables => "TABLES",
    Translations => "TRANSLATIONS",
    Triggers => "TRIGGERS",
    UserDefinedTypes => "USER_DEFINED_TYPES",
    ViewTableUsage => "VIEW_TABLE_USAGE",
    Views => "VIEWS",
}

impl fmt::Display for SystemTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tables whose content moves without a schema change and so are rebuilt
/// on every access
const NON_CACHEABLE: &[SystemTableId] = &[
    SystemTableId::SystemCacheInfo,
    SystemTableId::SystemSessionInfo,
    SystemTableId::SystemSessions,
    SystemTableId::SystemProperties,
    SystemTableId::SystemSequences,
];

/// Tables whose content is the same for every session
const SESSION_INDEPENDENT: &[SystemTableId] = &[
    SystemTableId::InformationSchemaCatalogName,
    SystemTableId::SystemTableTypes,
    SystemTableId::SystemProperties,
    SystemTableId::SystemTypeInfo,
];

/// Name lookup and classification of system tables
#[derive(Debug, Clone)]
pub struct TableRegistry {
    by_name: HashMap<&'static str, SystemTableId>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRegistry {
    pub fn new() -> Self {
        let by_name = SystemTableId::ALL.iter().map(|id| (id.name(), *id)).collect();
        Self { by_name }
    }

    /// Resolves `NAME` or `INFORMATION_SCHEMA.NAME`, case-insensitively
    pub fn id_of(&self, name: &str) -> Option<SystemTableId> {
        let upper = name.trim().to_ascii_uppercase();
        let bare = match upper.split_once('.') {
            Some((schema, table)) if schema == INFORMATION_SCHEMA => table,
            Some(_) => return None,
            None => upper.as_str(),
        };
        self.by_name.get(bare).copied()
    }

    pub fn is_system_table(&self, name: &str) -> bool {
        self.id_of(name).is_some()
    }

    pub fn is_cacheable(&self, id: SystemTableId) -> bool {
        !NON_CACHEABLE.contains(&id)
    }

    pub fn is_session_dependent(&self, id: SystemTableId) -> bool {
        !SESSION_INDEPENDENT.contains(&id)
    }

    pub fn name_of(&self, id: SystemTableId) -> &'static str {
        id.name()
    }

    pub fn qualified_name(&self, id: SystemTableId) -> String {
        format!("{}.{}", INFORMATION_SCHEMA, id.name())
    }

    pub fn ids(&self) -> impl Iterator<Item = SystemTableId> {
        SystemTableId::ALL.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_variants() {
        let registry = TableRegistry::new();
        assert_eq!(registry.id_of("TABLES"), Some(SystemTableId::Tables));
        assert_eq!(registry.id_of("information_schema.columns"), Some(SystemTableId::Columns));
        assert_eq!(registry.id_of("PUBLIC.TABLES"), None);
        assert_eq!(registry.id_of("NOT_A_TABLE"), None);
        assert!(registry.is_system_table("system_tables"));
    }

    #[test]
    fn test_classification() {
        let registry = TableRegistry::new();
        assert!(!registry.is_cacheable(SystemTableId::SystemSessions));
        assert!(!registry.is_cacheable(SystemTableId::SystemSequences));
        assert!(registry.is_cacheable(SystemTableId::Tables));
        assert!(!registry.is_session_dependent(SystemTableId::InformationSchemaCatalogName));
        assert!(!registry.is_session_dependent(SystemTableId::SystemTypeInfo));
        assert!(registry.is_session_dependent(SystemTableId::Columns));
    }

    #[test]
    fn test_names_are_unique() {
        let registry = TableRegistry::new();
        assert_eq!(registry.by_name.len(), SystemTableId::ALL.len());
        assert_eq!(SystemTableId::ALL.len(), 54);
        assert_eq!(
            registry.qualified_name(SystemTableId::Views),
            "INFORMATION_SCHEMA.VIEWS"
        );
    }
}
