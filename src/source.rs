//! Where dump bytes come from: a `.sql` file or a `pg_dump` subprocess.

use crate::config::PgDumpOptions;
use crate::error::{Error, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpSource {
    /// A schema file read verbatim.
    File(PathBuf),
    /// `pg_dump --schema-only --no-owner` against a live database.
    PgDump(PgDumpOptions),
}

impl DumpSource {
    /// Source for a schema file. Only `.sql` files are accepted.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_sql = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("sql"));
        if !is_sql {
            return Err(Error::UnsupportedSource {
                path: path.display().to_string(),
            });
        }
        Ok(DumpSource::File(path.to_path_buf()))
    }

    /// Fetch the raw dump bytes.
    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            DumpSource::File(path) => {
                tracing::debug!(path = %path.display(), "reading schema file");
                Ok(std::fs::read(path)?)
            }
            DumpSource::PgDump(options) => run_pg_dump(options),
        }
    }
}

/// Read a whole dump from `reader`.
pub fn read_dump<TReader: Read>(mut reader: TReader) -> Result<Vec<u8>> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    Ok(input)
}

fn run_pg_dump(options: &PgDumpOptions) -> Result<Vec<u8>> {
    let mut command = Command::new(&options.binary);
    command.args(options.args());
    if let Some(password) = &options.password {
        command.env("PGPASSWORD", password);
    }

    tracing::debug!(
        binary = %options.binary,
        host = ?options.host,
        database = ?options.database,
        "running pg_dump"
    );
    let output = command.output()?;
    if !output.status.success() {
        return Err(Error::PgDump {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}
