//! PostgreSQL schema-dump core for code generators.
//!
//! Provides:
//! - `parser`: turns `pg_dump --schema-only` output into a `DumpSchema`
//! - `schema`: the table/column model handed to generators
//! - `mapping`: static column type to field type lookup
//! - `source` / `runtime`: helpers for loading dumps and running generators

pub mod config;
pub mod error;
pub mod mapping;
pub mod parser;
pub mod runtime;
pub mod sanitize;
pub mod schema;
pub mod source;
pub mod state;
pub mod tokenizer;
pub mod types;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::config::{ParseOptions, PgDumpOptions};
    pub use crate::error::{Error, Result};
    pub use crate::mapping::field_type;
    pub use crate::parser::{parse_dump, DumpParser};
    pub use crate::runtime::*;
    pub use crate::schema::{DumpColumn, DumpSchema, DumpTable};
    pub use crate::source::DumpSource;
}
