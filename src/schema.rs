//! Tidy schema and conversions between records and Polars frames.
//!
//! Tidy files and the merged dataset share one fixed five column schema.
//! Raw tables are read with every column as a string so that no cell is
//! coerced before the amount and period parsers see it.

use crate::constants::{CATEGORY_COLUMN, columns};
use crate::error::{LedgerError, Result};
use crate::models::{RawTable, TidyRecord};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Schema shared by tidy CSV files and the merged Parquet file
pub fn tidy_schema() -> SchemaRef {
    Arc::new(Schema::from_iter([
        Field::new(columns::YEAR.into(), DataType::Int32),
        Field::new(columns::MONTH.into(), DataType::Int32),
        Field::new(columns::TYPE.into(), DataType::String),
        Field::new(columns::SOURCE.into(), DataType::String),
        Field::new(columns::AMOUNT.into(), DataType::Float64),
    ]))
}

/// Build a frame in the fixed tidy column order
pub fn records_to_frame(records: &[TidyRecord]) -> Result<DataFrame> {
    let years: Vec<Option<i32>> = records.iter().map(|r| r.year).collect();
    let months: Vec<i32> = records.iter().map(|r| r.month as i32).collect();
    let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
    let sources: Vec<Option<&str>> = records.iter().map(|r| r.source.as_deref()).collect();
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();

    let df = df!(
        columns::YEAR => years,
        columns::MONTH => months,
        columns::TYPE => kinds,
        columns::SOURCE => sources,
        columns::AMOUNT => amounts
    )?;
    Ok(df)
}

/// Read a frame with the tidy schema back into records.
///
/// Rows with a missing month or amount cannot come from the tidier and
/// are reported as invalid data.
pub fn frame_to_records(df: &DataFrame) -> Result<Vec<TidyRecord>> {
    let years = df.column(columns::YEAR)?.as_materialized_series().i32()?;
    let months = df.column(columns::MONTH)?.as_materialized_series().i32()?;
    let kinds = df.column(columns::TYPE)?.as_materialized_series().str()?;
    let sources = df.column(columns::SOURCE)?.as_materialized_series().str()?;
    let amounts = df.column(columns::AMOUNT)?.as_materialized_series().f64()?;

    let mut records = Vec::with_capacity(df.height());
    for ((((year, month), kind), source), amount) in years
        .into_iter()
        .zip(months.into_iter())
        .zip(kinds.into_iter())
        .zip(sources.into_iter())
        .zip(amounts.into_iter())
    {
        let (Some(month), Some(amount)) = (month, amount) else {
            return Err(LedgerError::Polars(PolarsError::ComputeError(
                "tidy row is missing its month or amount".into(),
            )));
        };
        records.push(TidyRecord {
            year,
            month: month as u32,
            kind: kind.unwrap_or_default().to_string(),
            source: source.map(str::to_string),
            amount,
        });
    }
    Ok(records)
}

/// Read a tidy CSV file using the fixed schema
pub fn read_tidy_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema(Some(tidy_schema()))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write records as a tidy CSV file, creating the parent directory
pub fn write_tidy_csv(records: &[TidyRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut df = records_to_frame(records)?;
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Parse raw CSV bytes into a wide table with every cell kept as text.
///
/// The header line is read as an ordinary row so repeated headers keep
/// their written text. A leading byte-order mark is ignored. Returns
/// `None` when the input has no header line at all.
pub fn parse_raw_table(bytes: &[u8]) -> Result<Option<RawTable>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_truncate_ragged_lines(true))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;

    raw_table_from_frame(&df).map(Some)
}

/// Convert a headerless string frame into a raw table.
///
/// The frame's first row holds the headers, which are trimmed; the first
/// header is always renamed to the category column.
pub fn raw_table_from_frame(df: &DataFrame) -> Result<RawTable> {
    let mut cells: Vec<Vec<Option<String>>> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = column.as_materialized_series().cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        cells.push(values);
    }

    let mut headers: Vec<String> = cells
        .iter()
        .map(|column| {
            column
                .first()
                .and_then(|v| v.as_deref())
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .collect();
    if let Some(first) = headers.first_mut() {
        *first = CATEGORY_COLUMN.to_string();
    }

    let rows = (1..df.height())
        .map(|row| cells.iter().map(|column| column[row].clone()).collect())
        .collect();

    Ok(RawTable { headers, rows })
}
