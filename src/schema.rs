//! Schema model produced by the dump parser.
//!
//! Tables and columns keep the order in which the dump declared them, which is
//! the order generators emit them in.

use crate::config::ParseOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Migration bookkeeping and extension tables never handed to generators.
pub const SYSTEM_TABLES: &[&str] = &[
    "schema_migrations",
    "ar_internal_metadata",
    "goose_db_version",
    "gorp_migrations",
    "flyway_schema_history",
    "knex_migrations",
    "knex_migrations_lock",
    "__diesel_schema_migrations",
    "_sqlx_migrations",
    "spatial_ref_sys",
];

/// All tables recognised in a dump, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpSchema {
    pub tables: Vec<DumpTable>,
}

/// Column definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpColumn {
    /// Column name
    pub name: String,
    /// Lower-case base type without schema qualifier, e.g. `varchar`, `timestamp`, `integer[]`
    pub data_type: String,
    /// Free-form qualifier text, e.g. `(10)`, `varying(32)`, `with time zone`
    pub type_options: String,
    pub is_not_null: bool,
    pub is_primary_key: bool,
    pub has_default: bool,
}

/// Table definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpTable {
    /// Name as written in the dump (lower-cased), e.g. `public.users`
    pub raw_identifier: String,
    /// Table name without schema or quotes
    pub name: String,
    /// Schema name (if specified)
    pub schema: Option<String>,
    pub columns: Vec<DumpColumn>,
}

impl DumpColumn {
    pub fn new(name: &str) -> Self {
        Self {
            name: unquote(name),
            ..Self::default()
        }
    }

    /// Flag the column as part of the primary key. Primary keys are never null.
    pub fn set_primary_key(&mut self) {
        self.is_primary_key = true;
        self.is_not_null = true;
    }

    /// Whether the column type carries a `[]` suffix.
    pub fn is_array(&self) -> bool {
        self.data_type.ends_with("[]") || self.type_options.ends_with("[]")
    }
}

impl DumpTable {
    /// Create an empty table from a possibly schema-qualified identifier.
    pub fn new(raw_identifier: &str) -> Self {
        let (schema, name) = match raw_identifier.split_once('.') {
            Some((schema, name)) => (Some(unquote(schema)), unquote(name)),
            None => (None, unquote(raw_identifier)),
        };
        Self {
            raw_identifier: raw_identifier.to_string(),
            name,
            schema,
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&DumpColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut DumpColumn> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Columns flagged as primary key, in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = &DumpColumn> {
        self.columns.iter().filter(|column| column.is_primary_key)
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|column| column.is_primary_key)
    }
}

impl DumpSchema {
    /// Get a table by name or by its raw identifier
    pub fn table(&self, name: &str) -> Option<&DumpTable> {
        self.tables
            .iter()
            .find(|table| table.name == name || table.raw_identifier == name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &DumpTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check if a column is part of the primary key
    pub fn is_primary_key_column(&self, table_name: &str, column_name: &str) -> bool {
        self.table(table_name)
            .and_then(|table| table.column(column_name))
            .is_some_and(|column| column.is_primary_key)
    }

    /// Drop system tables, duplicate names and tables without a primary key.
    /// Survivors keep their relative order.
    pub fn finalize(self, options: &ParseOptions) -> DumpSchema {
        let mut seen = HashSet::new();
        let tables = self
            .tables
            .into_iter()
            .filter(|table| {
                if SYSTEM_TABLES.contains(&table.name.as_str())
                    || options.is_ignored_table(&table.name)
                {
                    tracing::warn!(table = %table.raw_identifier, "skipping system table");
                    return false;
                }
                if !table.has_primary_key() {
                    tracing::warn!(table = %table.raw_identifier, "skipping table without primary key");
                    return false;
                }
                if !seen.insert(table.name.clone()) {
                    tracing::warn!(table = %table.raw_identifier, "skipping duplicate table name");
                    return false;
                }
                true
            })
            .collect();
        DumpSchema { tables }
    }
}

fn unquote(identifier: &str) -> String {
    identifier.replace('"', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(raw: &str, columns: &[(&str, bool)]) -> DumpTable {
        let mut table = DumpTable::new(raw);
        for (name, primary) in columns {
            let mut column = DumpColumn::new(name);
            column.data_type = "integer".to_string();
            if *primary {
                column.set_primary_key();
            }
            table.columns.push(column);
        }
        table
    }

    #[test]
    fn test_table_name_splits_schema() {
        let table = DumpTable::new("\"public\".\"users\"");
        assert_eq!(table.name, "users");
        assert_eq!(table.schema.as_deref(), Some("public"));
        assert_eq!(table.raw_identifier, "\"public\".\"users\"");

        let table = DumpTable::new("users");
        assert_eq!(table.name, "users");
        assert_eq!(table.schema, None);
    }

    #[test]
    fn test_primary_key_implies_not_null() {
        let mut column = DumpColumn::new("id");
        assert!(!column.is_not_null);
        column.set_primary_key();
        assert!(column.is_primary_key);
        assert!(column.is_not_null);
    }

    #[test]
    fn test_finalize_drops_system_and_keyless_tables() {
        let schema = DumpSchema {
            tables: vec![
                table("public.users", &[("id", true)]),
                table("public.schema_migrations", &[("version", true)]),
                table("public.events", &[("payload", false)]),
                table("public.posts", &[("id", true), ("user_id", false)]),
                table("audit.users", &[("id", true)]),
            ],
        };

        let finalized = schema.finalize(&ParseOptions::default());
        let names: Vec<_> = finalized
            .tables()
            .map(|table| table.raw_identifier.as_str())
            .collect();
        assert_eq!(names, vec!["public.users", "public.posts"]);
    }

    #[test]
    fn test_finalize_honours_ignored_tables() {
        let schema = DumpSchema {
            tables: vec![
                table("users", &[("id", true)]),
                table("sessions", &[("id", true)]),
            ],
        };

        let finalized = schema.finalize(&ParseOptions::new().with_ignored_table("sessions"));
        assert_eq!(finalized.len(), 1);
        assert!(finalized.table("sessions").is_none());
    }

    #[test]
    fn test_lookup_helpers() {
        let schema = DumpSchema {
            tables: vec![table("public.posts", &[("id", true), ("user_id", false)])],
        };

        assert!(schema.table("posts").is_some());
        assert!(schema.table("public.posts").is_some());
        assert!(schema.is_primary_key_column("posts", "id"));
        assert!(!schema.is_primary_key_column("posts", "user_id"));
        assert!(!schema.is_primary_key_column("comments", "id"));

        let key: Vec<_> = schema.tables[0]
            .primary_key()
            .map(|column| column.name.as_str())
            .collect();
        assert_eq!(key, vec!["id"]);
    }
}
