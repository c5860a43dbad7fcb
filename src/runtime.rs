use crate::config::ParseOptions;
use crate::parser::DumpParser;
use crate::schema::DumpSchema;
use crate::source::{read_dump, DumpSource};
use std::error::Error;
use std::io::{Read, Write};

/// Load `source`, parse it and write whatever `generate` produces to stdout.
pub fn run<TFunc>(
    source: &DumpSource,
    options: ParseOptions,
    generate: TFunc,
) -> Result<(), Box<dyn Error>>
where
    TFunc: FnOnce(DumpSchema) -> Result<Vec<u8>, Box<dyn Error>>,
{
    let input = source.load()?;
    let stdout = std::io::stdout();
    run_with_io(&input[..], stdout.lock(), options, generate)
}

pub fn run_with_io<TReader, TWriter, TFunc>(
    reader: TReader,
    mut writer: TWriter,
    options: ParseOptions,
    generate: TFunc,
) -> Result<(), Box<dyn Error>>
where
    TReader: Read,
    TWriter: Write,
    TFunc: FnOnce(DumpSchema) -> Result<Vec<u8>, Box<dyn Error>>,
{
    let input = read_dump(reader)?;
    let schema = DumpParser::new(options).parse(&input)?;
    let output = generate(schema)?;

    writer.write_all(&output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &[u8] = b"CREATE TABLE users (id integer, email text);\n\
        ALTER TABLE ONLY users ADD CONSTRAINT users_pkey PRIMARY KEY (id);\n\
        CREATE TABLE posts (id bigint PRIMARY KEY, title text NOT NULL);\n";

    fn table_names(schema: DumpSchema) -> Result<Vec<u8>, Box<dyn Error>> {
        let names: Vec<_> = schema.tables().map(|table| table.name.clone()).collect();
        Ok(names.join("\n").into_bytes())
    }

    #[test]
    fn test_run_with_io_success() {
        let mut output = Vec::new();

        let result = run_with_io(DUMP, &mut output, ParseOptions::default(), table_names);
        assert!(result.is_ok(), "run_with_io should succeed");
        assert_eq!(output, b"users\nposts");
    }

    #[test]
    fn test_run_with_io_passes_columns() {
        let mut output = Vec::new();

        let result = run_with_io(DUMP, &mut output, ParseOptions::default(), |schema| {
            let users = schema.table("users").ok_or("users missing")?;
            assert_eq!(users.columns.len(), 2);
            assert!(users.columns[0].is_primary_key);
            assert!(!users.columns[1].is_not_null);
            Ok(b"ok".to_vec())
        });
        assert!(result.is_ok());
        assert_eq!(output, b"ok");
    }

    #[test]
    fn test_run_with_io_generator_error() {
        let mut output = Vec::new();

        let result = run_with_io(DUMP, &mut output, ParseOptions::default(), |_schema| {
            Err("Generation failed".into())
        });
        assert!(
            result.is_err(),
            "run_with_io should fail when the generator fails"
        );
        assert_eq!(result.unwrap_err().to_string(), "Generation failed");
        assert!(output.is_empty());
    }

    #[test]
    fn test_run_with_io_invalid_input() {
        let input = b"CREATE TABLE t (id bogus_type);";
        let mut output = Vec::new();

        let result = run_with_io(&input[..], &mut output, ParseOptions::default(), table_names);
        assert!(result.is_err(), "run_with_io should fail with invalid input");
        assert_eq!(result.unwrap_err().to_string(), "unexpected token: `bogus_type`");
    }

    #[test]
    fn test_run_with_io_empty_input() {
        let input: &[u8] = &[];
        let mut output = Vec::new();

        let result = run_with_io(input, &mut output, ParseOptions::default(), |schema| {
            assert!(schema.is_empty());
            Ok(b"empty".to_vec())
        });
        assert!(result.is_ok(), "run_with_io should succeed with empty input");
        assert_eq!(output, b"empty");
    }

    #[test]
    fn test_run_with_io_honours_options() {
        let mut output = Vec::new();
        let options = ParseOptions::new().with_ignored_table("posts");

        let result = run_with_io(DUMP, &mut output, options, table_names);
        assert!(result.is_ok());
        assert_eq!(output, b"users");
    }

    #[test]
    fn test_run_with_io_large_content() {
        let mut input = Vec::new();
        for index in 0..1000 {
            input.extend_from_slice(
                format!("CREATE TABLE t{index} (id integer PRIMARY KEY, body text);\n").as_bytes(),
            );
        }
        let mut output = Vec::new();

        let result = run_with_io(&input[..], &mut output, ParseOptions::default(), |schema| {
            Ok(schema.len().to_string().into_bytes())
        });
        assert!(result.is_ok(), "run_with_io should handle large dumps");
        assert_eq!(output, b"1000");
    }

    #[test]
    fn test_run_missing_source() {
        let source = DumpSource::File("/nonexistent/schema.sql".into());
        assert!(run(&source, ParseOptions::default(), table_names).is_err());
    }
}
