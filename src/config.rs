//! Parser and dump-source configuration.

use serde::Deserialize;
use std::collections::BTreeSet;

/// Options controlling what the dump parser accepts and keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Extra column types accepted as scalars (e.g. extension types like `citext`).
    pub custom_types: BTreeSet<String>,
    /// Table names dropped in addition to the built-in system table list.
    pub ignored_tables: BTreeSet<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `name` as a column type. Schema qualifiers and quotes are stripped.
    pub fn with_custom_type(mut self, name: &str) -> Self {
        self.custom_types.insert(normalize_name(name));
        self
    }

    /// Drop tables called `name` from the parsed schema.
    pub fn with_ignored_table(mut self, name: &str) -> Self {
        self.ignored_tables.insert(normalize_name(name));
        self
    }

    pub(crate) fn is_custom_type(&self, name: &str) -> bool {
        self.custom_types.contains(name)
            || self
                .custom_types
                .iter()
                .any(|custom| normalize_name(custom) == name)
    }

    pub(crate) fn is_ignored_table(&self, name: &str) -> bool {
        self.ignored_tables.contains(name)
            || self
                .ignored_tables
                .iter()
                .any(|ignored| normalize_name(ignored) == name)
    }
}

/// Connection parameters for invoking `pg_dump`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PgDumpOptions {
    pub binary: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub database: Option<String>,
    /// Passed to the child through `PGPASSWORD`, never on the command line.
    pub password: Option<String>,
}

impl Default for PgDumpOptions {
    fn default() -> Self {
        Self {
            binary: "pg_dump".to_string(),
            host: None,
            port: None,
            user: None,
            database: None,
            password: None,
        }
    }
}

impl PgDumpOptions {
    /// Read connection parameters from the standard libpq environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`PgDumpOptions::from_env`], reading variables through `lookup`.
    /// Empty values count as unset and an unparsable `PGPORT` is ignored.
    pub fn from_lookup<TFunc>(lookup: TFunc) -> Self
    where
        TFunc: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            host: var("PGHOST"),
            port: var("PGPORT").and_then(|port| port.parse().ok()),
            user: var("PGUSER"),
            database: var("PGDATABASE"),
            password: var("PGPASSWORD"),
            ..Self::default()
        }
    }

    /// Command-line arguments for a schema-only dump.
    pub(crate) fn args(&self) -> Vec<String> {
        let mut args = vec!["--schema-only".to_string(), "--no-owner".to_string()];
        if let Some(host) = &self.host {
            args.push(format!("--host={host}"));
        }
        if let Some(port) = self.port {
            args.push(format!("--port={port}"));
        }
        if let Some(user) = &self.user {
            args.push(format!("--username={user}"));
        }
        if let Some(database) = &self.database {
            args.push(database.clone());
        }
        args
    }
}

/// Lower-case `name`, strip double quotes and drop any schema qualifier.
pub(crate) fn normalize_name(name: &str) -> String {
    let unqualified = name.rsplit('.').next().unwrap_or(name);
    unqualified.replace('"', "").to_ascii_lowercase()
}
