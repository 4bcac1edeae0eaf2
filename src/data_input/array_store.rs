// src/data_input/array_store.rs

use csv::ReaderBuilder;
use ndarray::Array2;
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

use crate::constants::CSV_EXTENSION;
use crate::error::{FlightDataError, Result};
use crate::types::Table;

/// Reads a 2-D table from `path`, choosing the parser by extension.
///
/// `.csv` files are delimited text with one header row; anything else is treated as `.npy`.
pub fn read_table_file(path: &Path) -> Result<Table> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION));
    if is_csv {
        read_delimited_file(path, true)
    } else {
        read_npy(path)
    }
}

/// Reads a 2-D `.npy` array from disk.
pub fn read_npy(path: &Path) -> Result<Table> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|e| FlightDataError::io(path, e))?;
    read_npy_bytes(&bytes, &path.display().to_string())
}

/// Reads a 2-D `.npy` array from any reader (e.g. an archive member).
pub fn read_npy_from<R: Read>(mut reader: R, source_name: &str) -> Result<Table> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| FlightDataError::format(source_name, e))?;
    read_npy_bytes(&bytes, source_name)
}

/// Decodes `.npy` bytes, widening any numeric element type to `f64`.
///
/// Decoded logs often store counters and flags as integers, so the float read is only the
/// first attempt.
pub fn read_npy_bytes(bytes: &[u8], source_name: &str) -> Result<Table> {
    macro_rules! try_element {
        ($ty:ty) => {
            match Array2::<$ty>::read_npy(Cursor::new(bytes)) {
                Ok(array) => {
                    debug!(source = source_name, dtype = stringify!($ty), shape = ?array.dim(), "Decoded npy array");
                    return Ok(array.mapv(|v| v as f64));
                }
                Err(ReadNpyError::WrongDescriptor(_)) => {}
                Err(e) => return Err(FlightDataError::format(source_name, e)),
            }
        };
    }

    try_element!(f64);
    try_element!(f32);
    try_element!(i64);
    try_element!(i32);
    try_element!(i16);
    try_element!(i8);
    try_element!(u64);
    try_element!(u32);
    try_element!(u16);
    try_element!(u8);

    Err(FlightDataError::format(
        source_name,
        "unsupported element type (expected a numeric dtype)",
    ))
}

/// Reads a delimited text table from disk.
pub fn read_delimited_file(path: &Path, has_header_row: bool) -> Result<Table> {
    let file = File::open(path).map_err(|e| FlightDataError::io(path, e))?;
    read_delimited_table(file, has_header_row, &path.display().to_string())
}

/// Parses comma-separated numeric rows into a table.
///
/// With `has_header_row` the first record is dropped unread, whatever its width. Every
/// data row must have the same number of fields and every field must parse as a number.
pub fn read_delimited_table<R: Read>(reader: R, has_header_row: bool, source_name: &str) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values: Vec<f64> = Vec::new();
    let mut width: Option<usize> = None;
    let mut rows = 0usize;

    let skip = usize::from(has_header_row);
    for (row_index, result) in rdr.records().enumerate().skip(skip) {
        let record = result.map_err(|e| FlightDataError::format(source_name, e))?;
        // Skip blank lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        match width {
            None => width = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(FlightDataError::format(
                    source_name,
                    format!("row {} has {} fields, expected {}", row_index + 1, record.len(), w),
                ));
            }
            Some(_) => {}
        }
        for (col, field) in record.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|_| {
                FlightDataError::format(
                    source_name,
                    format!("row {} column {}: '{}' is not a number", row_index + 1, col, field),
                )
            })?;
            values.push(value);
        }
        rows += 1;
    }

    let width = width.unwrap_or(0);
    debug!(source = source_name, rows, columns = width, "Parsed delimited table");
    Array2::from_shape_vec((rows, width), values).map_err(|e| FlightDataError::format(source_name, e))
}


// src/data_input/array_store.rs
