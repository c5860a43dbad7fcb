//! Schema dump parser.
//!
//! Runs sanitize, tokenize, the [`State`] machine and the finalizer over a dump
//! that is already in memory. The parser performs no I/O.

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::sanitize::sanitize;
use crate::schema::{DumpColumn, DumpSchema, DumpTable};
use crate::state::{KeyScope, State};
use crate::tokenizer::tokenize;

/// Parse a dump with default options.
pub fn parse_dump(input: &[u8]) -> Result<DumpSchema> {
    DumpParser::default().parse(input)
}

/// Parser for `pg_dump --schema-only` output and hand-written `.sql` schemas.
#[derive(Debug, Clone, Default)]
pub struct DumpParser {
    options: ParseOptions,
}

impl DumpParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `input` into a finalized schema. Any rejected token aborts the
    /// whole parse.
    pub fn parse(&self, input: &[u8]) -> Result<DumpSchema> {
        let sanitized = sanitize(input);
        let tokens = tokenize(&sanitized);

        let mut builder = SchemaBuilder::new(&self.options);
        let mut state = State::Idle;
        for token in &tokens {
            let next = state.next(token, &mut builder)?;
            tracing::trace!(?state, ?next, token = %token, "transition");
            state = next;
        }
        if state != State::Idle {
            return Err(Error::UnterminatedStatement {
                state: format!("{state:?}"),
            });
        }

        let parsed = builder.finish();
        let declared = parsed.len();
        let schema = parsed.finalize(&self.options);
        tracing::debug!(
            tokens = tokens.len(),
            declared,
            kept = schema.len(),
            "parsed schema dump"
        );
        Ok(schema)
    }
}

/// Tables accumulated while the state machine runs.
///
/// The table whose column block is open and the column being typed are tracked
/// as indices into `tables`. A table named by `ALTER TABLE` or by `CREATE TABLE`
/// before its `(` waits in the single pending slot.
#[derive(Debug)]
pub struct SchemaBuilder<'a> {
    options: &'a ParseOptions,
    tables: Vec<DumpTable>,
    open_table: Option<usize>,
    open_column: Option<usize>,
    pending_table: Option<String>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            tables: Vec::new(),
            open_table: None,
            open_column: None,
            pending_table: None,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        self.options
    }

    pub(crate) fn stash_table(&mut self, raw_identifier: &str) {
        self.pending_table = Some(raw_identifier.to_string());
    }

    pub(crate) fn discard_pending(&mut self) {
        self.pending_table = None;
    }

    /// Materialize the pending table and open its column block.
    pub(crate) fn open_table(&mut self) -> Option<()> {
        let raw_identifier = self.pending_table.take()?;
        tracing::debug!(table = %raw_identifier, "create table");
        self.tables.push(DumpTable::new(&raw_identifier));
        self.open_table = Some(self.tables.len() - 1);
        self.open_column = None;
        Some(())
    }

    pub(crate) fn close_table(&mut self) {
        self.open_table = None;
        self.open_column = None;
    }

    pub(crate) fn push_column(&mut self, name: &str) -> Option<()> {
        let table = self.tables.get_mut(self.open_table?)?;
        table.columns.push(DumpColumn::new(name));
        self.open_column = Some(table.columns.len() - 1);
        Some(())
    }

    /// The column currently being typed.
    pub(crate) fn column_mut(&mut self) -> Option<&mut DumpColumn> {
        let table = self.tables.get_mut(self.open_table?)?;
        table.columns.get_mut(self.open_column?)
    }

    /// Flag `column` as primary key, either on the table whose block is open or
    /// on the previously declared table named by the pending `ALTER TABLE`.
    pub(crate) fn mark_primary_key(&mut self, scope: KeyScope, column: &str) -> Result<()> {
        let column = column.replace('"', "");
        let table = match scope {
            KeyScope::Block => self
                .open_table
                .and_then(|index| self.tables.get_mut(index))
                .ok_or_else(|| Error::unexpected(&column))?,
            KeyScope::Statement => {
                let raw_identifier = self
                    .pending_table
                    .as_deref()
                    .ok_or_else(|| Error::unexpected(&column))?;
                self.tables
                    .iter_mut()
                    .find(|table| table.raw_identifier == raw_identifier)
                    .ok_or_else(|| Error::UnknownTable {
                        table: raw_identifier.to_string(),
                    })?
            }
        };

        let raw_identifier = table.raw_identifier.clone();
        let target = table
            .column_mut(&column)
            .ok_or_else(|| Error::UnknownColumn {
                table: raw_identifier.clone(),
                column: column.clone(),
            })?;
        target.set_primary_key();
        tracing::debug!(table = %raw_identifier, column = %column, "primary key");
        Ok(())
    }

    pub(crate) fn finish(self) -> DumpSchema {
        DumpSchema {
            tables: self.tables,
        }
    }
}
