//! Reading the plaintext records from CSV.
//!
//! A source holds one `key,value` record per line, without a header. Fields
//! are not trimmed, and columns after the value are ignored.

use std::{io, path::Path};

use csv::{ReaderBuilder, StringRecord};

use crate::{Error, Result, database::Record};

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

fn to_record(row: &StringRecord) -> Result<Record> {
    match (row.get(0), row.get(1)) {
        (Some(key), Some(value)) => Ok(Record::new(key, value)),
        _ => Err(Error::MalformedRecord(
            row.position().map_or(0, |p| p.line()),
        )),
    }
}

/// Reads the records from a CSV reader.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<Record>> {
    builder()
        .from_reader(reader)
        .records()
        .map(|row| to_record(&row?))
        .collect()
}

/// Reads the records from a CSV file.
pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let records = builder()
        .from_path(path.as_ref())?
        .records()
        .map(|row| to_record(&row?))
        .collect::<Result<Vec<_>>>()?;
    log::debug!(
        "Read {} records from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}
