//! Column type classification.

use crate::config::{normalize_name, ParseOptions};

/// Single-token types accepted as-is, with or without a `[]` suffix.
pub const SCALAR_TYPES: &[&str] = &[
    // integer
    "smallint",
    "integer",
    "int",
    "int2",
    "int4",
    "int8",
    "bigint",
    "smallserial",
    "serial",
    "bigserial",
    "serial2",
    "serial4",
    "serial8",
    // bit
    "bit",
    "varbit",
    // boolean
    "boolean",
    "bool",
    // numeric
    "numeric",
    "decimal",
    // real
    "real",
    "float",
    "float4",
    "float8",
    "money",
    "bytea",
    "json",
    "jsonb",
    // text
    "text",
    "varchar",
    "char",
    "bpchar",
    "uuid",
    // date
    "date",
    "timestamptz",
    "timetz",
];

/// How many more tokens a column type needs before the column tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeFamily {
    /// Complete after one token.
    Scalar,
    /// `character` followed by `varying` or a length.
    Character,
    /// `time` / `timestamp`, optionally followed by `with[out] time zone`.
    TimeOrTimestamp,
    /// `double precision`.
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnType {
    pub name: String,
    pub options: String,
    pub family: TypeFamily,
}

/// Classify a type token such as `integer`, `varchar(10)`, `public.citext` or
/// `text[]`. Returns `None` for unsupported types.
pub(crate) fn classify(token: &str, options: &ParseOptions) -> Option<ColumnType> {
    let (base, modifier) = match token.find('(') {
        Some(index) => token.split_at(index),
        None => (token, ""),
    };
    let name = normalize_name(base);
    let element = name.trim_end_matches("[]");

    let family = match element {
        "character" if modifier.is_empty() => TypeFamily::Character,
        "character" => TypeFamily::Scalar,
        "timestamp" | "time" => TypeFamily::TimeOrTimestamp,
        "double" if modifier.is_empty() => TypeFamily::Double,
        element if SCALAR_TYPES.contains(&element) || options.is_custom_type(element) => {
            TypeFamily::Scalar
        }
        _ => return None,
    };

    Some(ColumnType {
        name,
        options: modifier.to_string(),
        family,
    })
}
