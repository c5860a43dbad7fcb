//! Column type to generated field type lookup.

use crate::schema::DumpColumn;

/// PostgreSQL type, field type, field type when the column is nullable.
pub const FIELD_TYPES: &[(&str, &str, &str)] = &[
    ("smallint", "i16", "Option<i16>"),
    ("int2", "i16", "Option<i16>"),
    ("smallserial", "i16", "Option<i16>"),
    ("serial2", "i16", "Option<i16>"),
    ("integer", "i32", "Option<i32>"),
    ("int", "i32", "Option<i32>"),
    ("int4", "i32", "Option<i32>"),
    ("serial", "i32", "Option<i32>"),
    ("serial4", "i32", "Option<i32>"),
    ("bigint", "i64", "Option<i64>"),
    ("int8", "i64", "Option<i64>"),
    ("bigserial", "i64", "Option<i64>"),
    ("serial8", "i64", "Option<i64>"),
    ("bit", "Vec<u8>", "Option<Vec<u8>>"),
    ("varbit", "Vec<u8>", "Option<Vec<u8>>"),
    ("boolean", "bool", "Option<bool>"),
    ("bool", "bool", "Option<bool>"),
    ("numeric", "String", "Option<String>"),
    ("decimal", "String", "Option<String>"),
    ("money", "String", "Option<String>"),
    ("real", "f32", "Option<f32>"),
    ("float4", "f32", "Option<f32>"),
    ("float", "f64", "Option<f64>"),
    ("float8", "f64", "Option<f64>"),
    ("double", "f64", "Option<f64>"),
    ("bytea", "Vec<u8>", "Option<Vec<u8>>"),
    ("json", "Vec<u8>", "Option<Vec<u8>>"),
    ("jsonb", "Vec<u8>", "Option<Vec<u8>>"),
    ("text", "String", "Option<String>"),
    ("varchar", "String", "Option<String>"),
    ("char", "String", "Option<String>"),
    ("bpchar", "String", "Option<String>"),
    ("character", "String", "Option<String>"),
    ("uuid", "uuid::Uuid", "Option<uuid::Uuid>"),
    ("date", "chrono::NaiveDate", "Option<chrono::NaiveDate>"),
    ("time", "chrono::NaiveTime", "Option<chrono::NaiveTime>"),
    ("timetz", "chrono::NaiveTime", "Option<chrono::NaiveTime>"),
    ("timestamp", "chrono::NaiveDateTime", "Option<chrono::NaiveDateTime>"),
    (
        "timestamptz",
        "chrono::DateTime<chrono::Utc>",
        "Option<chrono::DateTime<chrono::Utc>>",
    ),
];

/// Field type for `column`, or `None` when the type has no mapping (custom types).
pub fn field_type(column: &DumpColumn) -> Option<String> {
    let element = column.data_type.trim_end_matches("[]");
    let element = match element {
        "timestamp" if column.type_options.contains("with time zone") => "timestamptz",
        element => element,
    };
    let (_, field, nullable) = FIELD_TYPES.iter().find(|(name, _, _)| *name == element)?;

    let field = match (column.is_array(), column.is_not_null) {
        (false, true) => field.to_string(),
        (false, false) => nullable.to_string(),
        (true, true) => format!("Vec<{field}>"),
        (true, false) => format!("Option<Vec<{field}>>"),
    };
    Some(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(data_type: &str, type_options: &str, is_not_null: bool) -> DumpColumn {
        DumpColumn {
            name: "c".to_string(),
            data_type: data_type.to_string(),
            type_options: type_options.to_string(),
            is_not_null,
            ..DumpColumn::default()
        }
    }

    #[test]
    fn test_not_null_columns() {
        assert_eq!(field_type(&column("integer", "", true)).as_deref(), Some("i32"));
        assert_eq!(field_type(&column("bigint", "", true)).as_deref(), Some("i64"));
        assert_eq!(field_type(&column("character", "varying(32)", true)).as_deref(), Some("String"));
        assert_eq!(field_type(&column("jsonb", "", true)).as_deref(), Some("Vec<u8>"));
    }

    #[test]
    fn test_nullable_columns() {
        assert_eq!(field_type(&column("boolean", "", false)).as_deref(), Some("Option<bool>"));
        assert_eq!(
            field_type(&column("timestamp", "", false)).as_deref(),
            Some("Option<chrono::NaiveDateTime>")
        );
        assert_eq!(
            field_type(&column("timestamp", "(6) with time zone", false)).as_deref(),
            Some("Option<chrono::DateTime<chrono::Utc>>")
        );
    }

    #[test]
    fn test_array_columns() {
        assert_eq!(field_type(&column("text[]", "", true)).as_deref(), Some("Vec<String>"));
        assert_eq!(
            field_type(&column("numeric", "(10,2)[]", false)).as_deref(),
            Some("Option<Vec<String>>")
        );
    }

    #[test]
    fn test_unmapped_type() {
        assert_eq!(field_type(&column("citext", "", true)), None);
    }

    #[test]
    fn test_every_scalar_type_is_mapped() {
        for name in crate::types::SCALAR_TYPES {
            assert!(
                FIELD_TYPES.iter().any(|(mapped, _, _)| mapped == name),
                "{name} has no field type"
            );
        }
    }
}
