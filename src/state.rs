//! The dump state machine.
//!
//! Each [`State`] answers one question: what kind of SQL fragment may come next.
//! Statements the parser does not care about are skipped by the tolerant states
//! (`Idle`, `Create`, `Alter`, `Add`, `Constraint`, and `TableName` inside an
//! `ALTER TABLE`); every other state rejects unexpected input so that a malformed
//! table body fails loudly instead of producing a wrong model.

use crate::error::{Error, Result};
use crate::parser::SchemaBuilder;
use crate::types::{classify, TypeFamily};
use regex::Regex;
use std::sync::LazyLock;

static TABLE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?[a-z_][a-z0-9_$]*"?(\."?[a-z_][a-z0-9_$]*"?)?$"#).expect("valid regex")
});

static COLUMN_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?[a-z_][a-z0-9_$]*"?$"#).expect("valid regex"));

static PRIMARY_KEY_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?[a-z_][a-z0-9_$]*_pkey"?$"#).expect("valid regex"));

static KEY_COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\(("?[a-z_][a-z0-9_$]*"?)\)$"#).expect("valid regex")
});

/// Statement a table reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Create,
    Alter,
}

/// Where a primary-key constraint was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// `ALTER TABLE [ONLY] t ADD CONSTRAINT t_pkey PRIMARY KEY (...);`
    Statement,
    /// Inside the column block of `CREATE TABLE`.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Create,
    Alter,
    Table(Statement),
    TableIf,
    TableIfNot,
    Only,
    TableName(Statement),
    Add,
    Constraint(KeyScope),
    PrimaryKeyConstraintName(KeyScope),
    Primary(KeyScope),
    Key(KeyScope),
    KeyColumns(KeyScope),
    PrimaryKeyName(KeyScope),
    OpenBracket,
    ColumnName,
    ColumnTyp,
    TypeModifierColumnTyp,
    CharacterColumnTyp,
    DoubleColumnTyp,
    TimeOrTimestampColumnTyp,
    TimeZoneColumnTyp,
    TimeZoneNameColumnTyp,
    CollateColumnTypOption,
    PrimaryColumnTypOption,
    NotColumnTypOption,
    NullColumnTypOption,
    /// Arbitrary default expression; `depth` counts open brackets inside it.
    DefaultColumnTypOption { depth: usize },
    /// `exclude` at the start of a block entry: a column of that name when a
    /// type follows, otherwise an `EXCLUDE` table constraint.
    ExcludeOrColumn,
    /// Skipped table-level clause such as `UNIQUE (...)` or `CHECK (...)`.
    TableConstraint { depth: usize },
    CloseBracket,
}

impl State {
    /// Consume one token and return the state that handles the next one.
    pub fn next(self, token: &str, builder: &mut SchemaBuilder<'_>) -> Result<State> {
        let unexpected = || Error::unexpected(token);

        let state = match self {
            State::Idle => match token {
                "create" => State::Create,
                "alter" => State::Alter,
                _ => State::Idle,
            },
            State::Create => match token {
                "table" => State::Table(Statement::Create),
                "unlogged" => State::Create,
                _ => State::Idle,
            },
            State::Alter => match token {
                "table" => State::Table(Statement::Alter),
                _ => State::Idle,
            },
            State::Table(statement) => match (statement, token) {
                (Statement::Alter, "only") => State::Only,
                (Statement::Create, "if") => State::TableIf,
                (Statement::Alter, "if") => State::Idle,
                (Statement::Create, "only") => return Err(unexpected()),
                (_, name) if TABLE_NAME_REGEX.is_match(name) => {
                    builder.stash_table(name);
                    State::TableName(statement)
                }
                _ => return Err(unexpected()),
            },
            State::TableIf => match token {
                "not" => State::TableIfNot,
                _ => return Err(unexpected()),
            },
            State::TableIfNot => match token {
                "exists" => State::Table(Statement::Create),
                _ => return Err(unexpected()),
            },
            State::Only => {
                if !TABLE_NAME_REGEX.is_match(token) {
                    return Err(unexpected());
                }
                builder.stash_table(token);
                State::TableName(Statement::Alter)
            }
            State::TableName(Statement::Create) => match token {
                "(" => {
                    builder.open_table().ok_or_else(unexpected)?;
                    State::OpenBracket
                }
                _ => return Err(unexpected()),
            },
            State::TableName(Statement::Alter) => match token {
                "add" => State::Add,
                "(" => return Err(unexpected()),
                _ => {
                    builder.discard_pending();
                    State::Idle
                }
            },
            State::Add => match token {
                "constraint" => State::Constraint(KeyScope::Statement),
                _ => {
                    builder.discard_pending();
                    State::Idle
                }
            },
            State::Constraint(scope) => {
                if PRIMARY_KEY_NAME_REGEX.is_match(token) {
                    State::PrimaryKeyConstraintName(scope)
                } else {
                    match scope {
                        KeyScope::Statement => {
                            builder.discard_pending();
                            State::Idle
                        }
                        KeyScope::Block => State::TableConstraint { depth: 0 },
                    }
                }
            }
            State::PrimaryKeyConstraintName(scope) => match token {
                "primary" => State::Primary(scope),
                _ => return Err(unexpected()),
            },
            State::Primary(scope) => match token {
                "key" => State::Key(scope),
                _ => return Err(unexpected()),
            },
            State::Key(scope) => match token {
                "(" => State::KeyColumns(scope),
                _ => {
                    let column = KEY_COLUMN_REGEX
                        .captures(token)
                        .and_then(|caps| caps.get(1))
                        .ok_or_else(unexpected)?;
                    builder.mark_primary_key(scope, column.as_str())?;
                    State::PrimaryKeyName(scope)
                }
            },
            State::KeyColumns(scope) => match token {
                "," => State::KeyColumns(scope),
                ")" => State::PrimaryKeyName(scope),
                column if COLUMN_NAME_REGEX.is_match(column) => {
                    builder.mark_primary_key(scope, column)?;
                    State::KeyColumns(scope)
                }
                _ => return Err(unexpected()),
            },
            State::PrimaryKeyName(KeyScope::Statement) => match token {
                ";" => {
                    builder.discard_pending();
                    State::Idle
                }
                _ => return Err(unexpected()),
            },
            State::PrimaryKeyName(KeyScope::Block) => match token {
                "," => State::OpenBracket,
                ")" => State::CloseBracket,
                _ => return Err(unexpected()),
            },
            State::OpenBracket => match token {
                ")" => State::CloseBracket,
                "constraint" => State::Constraint(KeyScope::Block),
                "primary" => State::Primary(KeyScope::Block),
                "unique" | "check" | "foreign" => State::TableConstraint { depth: 0 },
                "exclude" => State::ExcludeOrColumn,
                name if COLUMN_NAME_REGEX.is_match(name) => {
                    builder.push_column(name).ok_or_else(unexpected)?;
                    State::ColumnName
                }
                _ => return Err(unexpected()),
            },
            State::ColumnName => {
                let column_type = classify(token, builder.options()).ok_or_else(unexpected)?;
                let column = builder.column_mut().ok_or_else(unexpected)?;
                column.data_type = column_type.name;
                column.type_options = column_type.options;
                match column_type.family {
                    TypeFamily::Scalar => State::ColumnTyp,
                    TypeFamily::Character => State::CharacterColumnTyp,
                    TypeFamily::TimeOrTimestamp => State::TimeOrTimestampColumnTyp,
                    TypeFamily::Double => State::DoubleColumnTyp,
                }
            }
            State::ColumnTyp => column_typ_tail(token, builder)?,
            State::TypeModifierColumnTyp => {
                if token == ";" {
                    return Err(unexpected());
                }
                let column = builder.column_mut().ok_or_else(unexpected)?;
                column.type_options.push_str(token);
                match token {
                    ")" => State::ColumnTyp,
                    _ => State::TypeModifierColumnTyp,
                }
            }
            State::CharacterColumnTyp => {
                if !(token.starts_with("varying") || token.starts_with('(')) {
                    return Err(unexpected());
                }
                append_type_option(builder, token).ok_or_else(unexpected)?;
                State::ColumnTyp
            }
            State::DoubleColumnTyp => match token {
                "precision" => {
                    append_type_option(builder, token).ok_or_else(unexpected)?;
                    State::ColumnTyp
                }
                _ => return Err(unexpected()),
            },
            State::TimeOrTimestampColumnTyp => match token {
                "with" | "without" => {
                    append_type_option(builder, token).ok_or_else(unexpected)?;
                    State::TimeZoneColumnTyp
                }
                _ => column_typ_tail(token, builder)?,
            },
            State::TimeZoneColumnTyp => match token {
                "time" => {
                    append_type_option(builder, token).ok_or_else(unexpected)?;
                    State::TimeZoneNameColumnTyp
                }
                _ => return Err(unexpected()),
            },
            State::TimeZoneNameColumnTyp => match token {
                "zone" => {
                    append_type_option(builder, token).ok_or_else(unexpected)?;
                    State::ColumnTyp
                }
                _ => return Err(unexpected()),
            },
            State::CollateColumnTypOption => match token {
                "," | ")" | ";" => return Err(unexpected()),
                _ => State::ColumnTyp,
            },
            State::PrimaryColumnTypOption => match token {
                "key" => {
                    builder.column_mut().ok_or_else(unexpected)?.set_primary_key();
                    State::NullColumnTypOption
                }
                _ => return Err(unexpected()),
            },
            State::NotColumnTypOption => match token {
                "null" => {
                    builder.column_mut().ok_or_else(unexpected)?.is_not_null = true;
                    State::NullColumnTypOption
                }
                _ => return Err(unexpected()),
            },
            State::NullColumnTypOption => match token {
                "," => State::OpenBracket,
                ")" => State::CloseBracket,
                "default" => start_default(builder).ok_or_else(unexpected)?,
                "primary" => State::PrimaryColumnTypOption,
                _ => return Err(unexpected()),
            },
            State::DefaultColumnTypOption { depth } => match (token, depth) {
                (",", 0) => State::OpenBracket,
                (")", 0) => State::CloseBracket,
                ("not", 0) => State::NotColumnTypOption,
                (";", _) => return Err(unexpected()),
                ("(", _) => State::DefaultColumnTypOption { depth: depth + 1 },
                (")", _) => State::DefaultColumnTypOption { depth: depth - 1 },
                _ => State::DefaultColumnTypOption { depth },
            },
            State::ExcludeOrColumn => {
                if classify(token, builder.options()).is_some() {
                    builder.push_column("exclude").ok_or_else(unexpected)?;
                    State::ColumnName.next(token, builder)?
                } else {
                    State::TableConstraint { depth: 0 }.next(token, builder)?
                }
            }
            State::TableConstraint { depth } => match (token, depth) {
                (",", 0) => State::OpenBracket,
                (")", 0) => State::CloseBracket,
                (";", _) => return Err(unexpected()),
                ("(", _) => State::TableConstraint { depth: depth + 1 },
                (")", _) => State::TableConstraint { depth: depth - 1 },
                _ => State::TableConstraint { depth },
            },
            State::CloseBracket => match token {
                ";" => {
                    builder.close_table();
                    State::Idle
                }
                _ => return Err(unexpected()),
            },
        };

        Ok(state)
    }
}

/// Tail shared by every column once its type is complete.
fn column_typ_tail(token: &str, builder: &mut SchemaBuilder<'_>) -> Result<State> {
    let unexpected = || Error::unexpected(token);

    let state = match token {
        "," => State::OpenBracket,
        ")" => State::CloseBracket,
        "not" => State::NotColumnTypOption,
        "null" => State::NullColumnTypOption,
        "default" => start_default(builder).ok_or_else(unexpected)?,
        "primary" => State::PrimaryColumnTypOption,
        "collate" => State::CollateColumnTypOption,
        "(" => {
            builder.column_mut().ok_or_else(unexpected)?.type_options.push('(');
            State::TypeModifierColumnTyp
        }
        modifier if modifier.starts_with('[') || modifier.starts_with('(') => {
            builder
                .column_mut()
                .ok_or_else(unexpected)?
                .type_options
                .push_str(modifier);
            State::ColumnTyp
        }
        _ => return Err(unexpected()),
    };

    Ok(state)
}

fn start_default(builder: &mut SchemaBuilder<'_>) -> Option<State> {
    builder.column_mut()?.has_default = true;
    Some(State::DefaultColumnTypOption { depth: 0 })
}

/// Append a word of free text such as `varying(32)` or `zone` to the type options.
fn append_type_option(builder: &mut SchemaBuilder<'_>, token: &str) -> Option<()> {
    let options = &mut builder.column_mut()?.type_options;
    if !options.is_empty() {
        options.push(' ');
    }
    options.push_str(token);
    Some(())
}
