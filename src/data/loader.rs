use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::data::record::{MeasurementRecord, RunLog, Schema, SourceId};
use crate::error::{Error, Result};

pub const DEFAULT_DELIMITER: u8 = b' ';

/// Load one headerless, delimited run log into a [`RunLog`].
///
/// The first record fixes the observed width, which must equal
/// `schema.width`. Any later line with a different field count, or any field
/// that does not parse, aborts the whole load.
pub fn load_run_log(
    path: &Path,
    delimiter: u8,
    schema: &Schema,
    source: SourceId,
) -> Result<RunLog> {
    schema.validate()?;

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound { path: path.to_path_buf() },
        _ => Error::Io(e),
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| csv_error(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(index as u64 + 1);
        if row.len() != schema.width {
            if records.is_empty() {
                return Err(Error::SchemaMismatch {
                    path: path.to_path_buf(),
                    expected: schema.width,
                    found: row.len(),
                });
            }
            return Err(Error::malformed(
                path,
                line,
                format!("expected {} fields, found {}", schema.width, row.len()),
            ));
        }
        records.push(parse_record(&row, schema).map_err(|reason| Error::malformed(path, line, reason))?);
    }

    debug!(path = %path.display(), records = records.len(), "parsed run log");
    let log = RunLog::new(source, path, schema.clone(), records)?;
    info!(source = %log.source(), path = %path.display(), "loaded run log");
    Ok(log)
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::Io(e),
        csv::ErrorKind::Utf8 { err, .. } => Error::malformed(path, line, err.to_string()),
        other => Error::malformed(path, line, format!("{other:?}")),
    }
}

fn parse_record(row: &StringRecord, schema: &Schema) -> std::result::Result<MeasurementRecord, String> {
    // Every field must be numeric, including the ones the schema leaves unmapped.
    let values = row
        .iter()
        .enumerate()
        .map(|(column, field)| parse_value(field).map_err(|e| format!("column {column}: {e}")))
        .collect::<std::result::Result<Vec<f64>, String>>()?;

    let sample_size = match schema.sample_size {
        Some(column) => Some(parse_sample_size(&row[column]).map_err(|e| format!("column {column}: {e}"))?),
        None => None,
    };

    Ok(MeasurementRecord {
        sample_size,
        throughput: schema.throughput.map(|c| values[c]),
        latency: schema.latency.map(|c| values[c]),
        bytes: schema.bytes.map(|c| values[c]),
    })
}

fn parse_value(field: &str) -> std::result::Result<f64, String> {
    let value: f64 = field.parse().map_err(|_| format!("`{field}` is not a number"))?;
    if !value.is_finite() {
        return Err(format!("`{field}` is not a finite number"));
    }
    Ok(value)
}

fn parse_sample_size(field: &str) -> std::result::Result<u64, String> {
    field.parse().map_err(|_| format!("sample size `{field}` is not a non-negative integer"))
}
