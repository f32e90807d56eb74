use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use arrow::array::{Array, AsArray, BooleanArray, Float64Array};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto_from_rs};
use chrono::NaiveTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, Column, Dataset, is_na_token};
use crate::error::{Result, WrangleError};

// ---------------------------------------------------------------------------
// Source formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
    Json,
    Parquet,
}

impl SourceFormat {
    /// Extensions offered in the open dialog.
    pub const EXTENSIONS: &'static [&'static str] =
        &["csv", "xlsx", "xls", "xlsm", "ods", "json", "parquet", "pq"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(SourceFormat::Spreadsheet),
            "json" => Some(SourceFormat::Json),
            "parquet" | "pq" => Some(SourceFormat::Parquet),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Json => "JSON",
            SourceFormat::Parquet => "Parquet",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let format = SourceFormat::from_extension(ext).ok_or_else(|| WrangleError::Parse {
        format: format!(".{ext}"),
        message: "unsupported file extension".to_string(),
    })?;

    let bytes = std::fs::read(path).map_err(|e| WrangleError::Parse {
        format: format.to_string(),
        message: format!("reading {}: {e}", path.display()),
    })?;

    load_bytes(&bytes, format)
}

/// Parse an in-memory upload.
pub fn load_bytes(bytes: &[u8], format: SourceFormat) -> Result<Dataset> {
    let parsed = match format {
        SourceFormat::Csv => load_csv(bytes),
        SourceFormat::Spreadsheet => load_spreadsheet(bytes),
        SourceFormat::Json => load_json(bytes),
        SourceFormat::Parquet => load_parquet(bytes),
    };
    parsed.map_err(|e| WrangleError::Parse {
        format: format.to_string(),
        message: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Comma-delimited with a header row. Each column gets one inferred kind.
fn load_csv(bytes: &[u8]) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("no columns to parse");
    }

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        for (col, value) in fields.iter_mut().zip(record.iter()) {
            col.push(value.to_string());
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(fields)
        .map(|(name, raw)| {
            let raw: Vec<&str> = raw.iter().map(String::as_str).collect();
            Column::from_raw(name, &raw)
        })
        .collect();

    Ok(Dataset::new(columns)?)
}

/// Blank headers become `Unnamed: i`, repeats get `.1`, `.2`, … suffixes.
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{n}");
                n += 1;
            }
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet only; its first row is the header.
fn load_spreadsheet(bytes: &[u8]) -> anyhow::Result<Dataset> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let header_row = rows.next().context("worksheet is empty")?;
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col, value) in columns.iter_mut().zip(row.iter()) {
            col.push(spreadsheet_cell(value));
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();

    Ok(Dataset::new(columns)?)
}

fn spreadsheet_cell(value: &Data) -> Cell {
    match value {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) if f.is_finite() => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if is_na_token(s) => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Empty | Data::Error(_) | Data::Float(_) => Cell::Missing,
        Data::DateTime(dt) => Cell::Text(excel_datetime_text(dt)),
        // DateTimeIso / DurationIso already hold ISO text
        other => Cell::Text(other.to_string()),
    }
}

/// ISO 8601 text for a serial date: `2024-01-31` at midnight,
/// `2024-01-31T08:30:00` otherwise, `PT..S` for durations.
fn excel_datetime_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(d) = dt.as_duration() {
            return d.to_string();
        }
    } else if let Some(d) = dt.as_datetime() {
        return if d.time() == NaiveTime::MIN {
            d.date().to_string()
        } else {
            d.format("%Y-%m-%dT%H:%M:%S").to_string()
        };
    }
    dt.to_string()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records orientation (`[{ "city": "Jakarta", "amount": 3 }, ...]`).
/// Column order follows first appearance of each key.
fn load_json(bytes: &[u8]) -> anyhow::Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).map_or(Cell::Missing, json_to_cell))
                .collect();
            Column::new(name, cells)
        })
        .collect();

    Ok(Dataset::new(columns)?)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n.as_f64().map_or(Cell::Missing, Cell::Number),
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Every column is read; numeric Arrow types become numbers, strings text,
/// booleans booleans, and anything else its Arrow display string.
fn load_parquet(bytes: &[u8]) -> anyhow::Result<Dataset> {
    let data = bytes::Bytes::copy_from_slice(bytes);
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, cells) in columns.iter_mut().enumerate() {
            let array = batch.column(idx);
            extend_from_arrow(cells, array)
                .with_context(|| format!("column '{}'", names[idx]))?;
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();

    Ok(Dataset::new(columns)?)
}

/// Append every value of an Arrow column as cells.
fn extend_from_arrow(cells: &mut Vec<Cell>, array: &Arc<dyn Array>) -> anyhow::Result<()> {
    let dtype = array.data_type();
    if dtype.is_numeric() {
        let cast = arrow::compute::cast(array, &DataType::Float64)?;
        let values = cast
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array after cast")?;
        cells.extend(
            values
                .iter()
                .map(|v| v.filter(|f| f.is_finite()).map_or(Cell::Missing, Cell::Number)),
        );
        return Ok(());
    }

    match dtype {
        DataType::Boolean => {
            let values = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            cells.extend(values.iter().map(|v| v.map_or(Cell::Missing, Cell::Bool)));
        }
        DataType::Utf8 => {
            let values = array.as_string::<i32>();
            cells.extend(values.iter().map(|v| v.map_or(Cell::Missing, |s| Cell::Text(s.to_string()))));
        }
        DataType::LargeUtf8 => {
            let values = array.as_string::<i64>();
            cells.extend(values.iter().map(|v| v.map_or(Cell::Missing, |s| Cell::Text(s.to_string()))));
        }
        _ => {
            for row in 0..array.len() {
                if array.is_null(row) {
                    cells.push(Cell::Missing);
                } else {
                    cells.push(Cell::Text(array_value_to_string(array, row)?));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::ColumnKind;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_csv_infers_column_kinds() {
        let csv = "city,amount,score,active\nJakarta,\"1,200\",3.5,true\nBandung,950,,False\n";
        let ds = load_bytes(csv.as_bytes(), SourceFormat::Csv).unwrap();

        assert_eq!(ds.column_names(), vec!["city", "amount", "score", "active"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("city").unwrap().kind(), ColumnKind::Text);
        assert_eq!(ds.column("amount").unwrap().cells[0], text("1,200"));
        assert_eq!(ds.column("score").unwrap().cells, vec![Cell::Number(3.5), Cell::Missing]);
        assert_eq!(ds.column("active").unwrap().cells, vec![Cell::Bool(true), Cell::Bool(false)]);
    }

    #[test]
    fn test_csv_keeps_whitespace_in_text() {
        let ds = load_bytes(b"name\n  Ana \nNA\n", SourceFormat::Csv).unwrap();
        assert_eq!(ds.column("name").unwrap().cells, vec![text("  Ana "), Cell::Missing]);
    }

    #[test]
    fn test_csv_header_normalization() {
        let ds = load_bytes(b"a,,a,a\n1,2,3,4\n", SourceFormat::Csv).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }

    #[test]
    fn test_csv_ragged_rows_fail() {
        let err = load_bytes(b"a,b\n1,2\n3\n", SourceFormat::Csv).unwrap_err();
        assert!(matches!(err, WrangleError::Parse { .. }));
    }

    #[test]
    fn test_csv_empty_input_fails() {
        let err = load_bytes(b"", SourceFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("no columns"));
    }

    #[test]
    fn test_json_records() {
        let json = r#"[{"b": 1, "a": "x"}, {"a": null, "c": true}]"#;
        let ds = load_bytes(json.as_bytes(), SourceFormat::Json).unwrap();
        assert_eq!(ds.column_names(), vec!["b", "a", "c"]);
        assert_eq!(ds.column("b").unwrap().cells, vec![Cell::Number(1.0), Cell::Missing]);
        assert_eq!(ds.column("a").unwrap().cells, vec![text("x"), Cell::Missing]);
        assert_eq!(ds.column("c").unwrap().cells, vec![Cell::Missing, Cell::Bool(true)]);
    }

    #[test]
    fn test_json_not_array_fails() {
        let err = load_bytes(br#"{"a": 1}"#, SourceFormat::Json).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_garbage_spreadsheet_fails() {
        let err = load_bytes(b"definitely not a workbook", SourceFormat::Spreadsheet).unwrap_err();
        assert!(matches!(err, WrangleError::Parse { .. }));
    }

    /// Two-sheet workbook: the first has mixed cell types, a blank and a
    /// repeated header; the second must be ignored.
    fn workbook_bytes() -> Vec<u8> {
        use rust_xlsxwriter::{ExcelDateTime as XlsxDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let stamp_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        {
            let sheet = workbook.add_worksheet();
            for (col, name) in [(0, "city"), (2, "amount"), (3, "amount"), (4, "paid"), (5, "when")] {
                sheet.write_string(0, col, name).unwrap();
            }
            sheet.write_string(1, 0, "Jakarta").unwrap();
            sheet.write_number(1, 1, 1.0).unwrap();
            sheet.write_number(1, 2, 1200.0).unwrap();
            sheet.write_number(1, 3, 2.5).unwrap();
            sheet.write_boolean(1, 4, true).unwrap();
            let date = XlsxDateTime::from_ymd(2024, 1, 31).unwrap();
            sheet.write_datetime_with_format(1, 5, &date, &date_format).unwrap();

            sheet.write_string(2, 0, "NA").unwrap();
            sheet.write_number(2, 2, 3.0).unwrap();
            sheet.write_boolean(2, 4, false).unwrap();
            let stamp = XlsxDateTime::from_ymd(2024, 2, 1)
                .unwrap()
                .and_hms(8, 30, 0)
                .unwrap();
            sheet.write_datetime_with_format(2, 5, &stamp, &stamp_format).unwrap();

            sheet.write_string(3, 0, "Medan").unwrap();
        }
        {
            let other = workbook.add_worksheet();
            other.set_name("Other").unwrap();
            other.write_string(0, 0, "ignored").unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_spreadsheet_first_sheet_with_native_types() {
        let ds = load_bytes(&workbook_bytes(), SourceFormat::Spreadsheet).unwrap();

        assert_eq!(
            ds.column_names(),
            vec!["city", "Unnamed: 1", "amount", "amount.1", "paid", "when"]
        );
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column("city").unwrap().cells,
            vec![text("Jakarta"), Cell::Missing, text("Medan")]
        );
        assert_eq!(
            ds.column("Unnamed: 1").unwrap().cells,
            vec![Cell::Number(1.0), Cell::Missing, Cell::Missing]
        );
        assert_eq!(
            ds.column("amount").unwrap().cells,
            vec![Cell::Number(1200.0), Cell::Number(3.0), Cell::Missing]
        );
        assert_eq!(
            ds.column("amount.1").unwrap().cells,
            vec![Cell::Number(2.5), Cell::Missing, Cell::Missing]
        );
        assert_eq!(
            ds.column("paid").unwrap().cells,
            vec![Cell::Bool(true), Cell::Bool(false), Cell::Missing]
        );
    }

    #[test]
    fn test_spreadsheet_dates_load_as_iso_text() {
        let ds = load_bytes(&workbook_bytes(), SourceFormat::Spreadsheet).unwrap();
        assert_eq!(
            ds.column("when").unwrap().cells,
            vec![text("2024-01-31"), text("2024-02-01T08:30:00"), Cell::Missing]
        );
    }

    #[test]
    fn test_spreadsheet_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(&workbook_bytes()).unwrap();
        assert_eq!(load_file(file.path()).unwrap().width(), 6);
    }

    #[test]
    fn test_garbage_parquet_fails() {
        let err = load_bytes(b"PAR1 nope", SourceFormat::Parquet).unwrap_err();
        assert!(matches!(err, WrangleError::Parse { .. }));
    }

    #[test]
    fn test_load_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "x,y\n1,2\n").unwrap();
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.column("y").unwrap().cells, vec![Cell::Number(2.0)]);
    }

    #[test]
    fn test_load_file_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }
}
