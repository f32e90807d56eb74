use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use super::model::{Cell, Column, ColumnKind, Dataset};
use crate::error::{Result, WrangleError};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "exported_data.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Parquet,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Parquet];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Parquet => "parquet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Parquet => "Parquet",
        }
    }
}

/// Serialize the whole dataset. Columns keep their current order and no
/// row filtering is applied.
pub fn export_bytes(dataset: &Dataset, format: ExportFormat) -> Result<Vec<u8>> {
    let encoded = match format {
        ExportFormat::Csv => to_csv(dataset),
        ExportFormat::Json => to_json(dataset),
        ExportFormat::Parquet => to_parquet(dataset),
    };
    encoded.map_err(|e| WrangleError::Export(format!("{e:#}")))
}

pub fn export_file(dataset: &Dataset, format: ExportFormat, path: &Path) -> Result<()> {
    let bytes = export_bytes(dataset, format)?;
    std::fs::write(path, bytes)
        .map_err(|e| WrangleError::Export(format!("writing {}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// UTF-8, comma-delimited, header row, no index column. Missing is an empty field.
fn to_csv(dataset: &Dataset) -> anyhow::Result<Vec<u8>> {
    if dataset.width() == 0 {
        return Ok(Vec::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(dataset.columns().iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;
    for row in 0..dataset.len() {
        let fields = dataset.row(row).into_iter().map(|c| c.search_text().into_owned());
        writer
            .write_record(fields)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.into_inner().context("flushing CSV writer")
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

fn to_json(dataset: &Dataset) -> anyhow::Result<Vec<u8>> {
    let records: Vec<JsonValue> = (0..dataset.len())
        .map(|row| {
            let obj: Map<String, JsonValue> = dataset
                .columns()
                .iter()
                .map(|c| (c.name.clone(), cell_to_json(&c.cells[row])))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();
    serde_json::to_vec_pretty(&records).context("encoding JSON")
}

fn cell_to_json(cell: &Cell) -> JsonValue {
    match cell {
        Cell::Text(s) => JsonValue::String(s.clone()),
        Cell::Number(v) => serde_json::Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
        Cell::Bool(b) => JsonValue::Bool(*b),
        Cell::Missing => JsonValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Number and boolean columns keep their Arrow type; everything else is
/// written as nullable UTF-8 text.
fn to_parquet(dataset: &Dataset) -> anyhow::Result<Vec<u8>> {
    if dataset.width() == 0 {
        bail!("dataset has no columns");
    }

    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = dataset
        .columns()
        .iter()
        .map(column_to_arrow)
        .unzip();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let mut buffer = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buffer, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(buffer)
}

fn column_to_arrow(column: &Column) -> (Field, ArrayRef) {
    match column.kind() {
        ColumnKind::Number => {
            let values: Float64Array = column.cells.iter().map(Cell::to_number).collect();
            (Field::new(&column.name, DataType::Float64, true), Arc::new(values) as ArrayRef)
        }
        ColumnKind::Boolean => {
            let values: BooleanArray = column
                .cells
                .iter()
                .map(|c| match c {
                    Cell::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            (Field::new(&column.name, DataType::Boolean, true), Arc::new(values) as ArrayRef)
        }
        ColumnKind::Text | ColumnKind::Missing => {
            let values: StringArray = column
                .cells
                .iter()
                .map(|c| (!c.is_missing()).then(|| c.search_text().into_owned()))
                .collect();
            (Field::new(&column.name, DataType::Utf8, true), Arc::new(values) as ArrayRef)
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::loader::{SourceFormat, load_bytes, load_file};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample() -> Dataset {
        Dataset::from_rows(
            &["city", "amount", "paid"],
            vec![
                vec![text("Jakarta"), Cell::Number(1200.0), Cell::Bool(true)],
                vec![text("Bandung, West Java"), Cell::Missing, Cell::Bool(false)],
                vec![Cell::Missing, Cell::Number(2.5), Cell::Missing],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let bytes = export_bytes(&sample(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "city,amount,paid\nJakarta,1200,true\n\"Bandung, West Java\",,false\n,2.5,\n"
        );
    }

    #[test]
    fn test_csv_round_trip() {
        let ds = sample();
        let bytes = export_bytes(&ds, ExportFormat::Csv).unwrap();
        assert_eq!(load_bytes(&bytes, SourceFormat::Csv).unwrap(), ds);
    }

    #[test]
    fn test_json_round_trip() {
        let ds = sample();
        let bytes = export_bytes(&ds, ExportFormat::Json).unwrap();
        assert_eq!(load_bytes(&bytes, SourceFormat::Json).unwrap(), ds);
    }

    #[test]
    fn test_parquet_round_trip() {
        let ds = sample();
        let bytes = export_bytes(&ds, ExportFormat::Parquet).unwrap();
        assert_eq!(load_bytes(&bytes, SourceFormat::Parquet).unwrap(), ds);
    }

    #[test]
    fn test_parquet_without_columns_fails() {
        let err = export_bytes(&Dataset::default(), ExportFormat::Parquet).unwrap_err();
        assert!(matches!(err, WrangleError::Export(_)));
    }

    #[test]
    fn test_export_file_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);
        export_file(&sample(), ExportFormat::Csv, &path).unwrap();
        assert_eq!(load_file(&path).unwrap(), sample());
    }

    proptest! {
        /// Text that does not look like a number, boolean or NA token reloads unchanged.
        #[test]
        fn prop_csv_round_trip_text(
            rows in prop::collection::vec(("[a-z ,\"]{1,8}x", -1000i32..1000), 1..20)
        ) {
            let ds = Dataset::from_rows(
                &["label", "value"],
                rows.iter()
                    .map(|(s, n)| vec![Cell::Text(s.clone()), Cell::Number(f64::from(*n))])
                    .collect(),
            ).unwrap();
            let bytes = export_bytes(&ds, ExportFormat::Csv).unwrap();
            prop_assert_eq!(load_bytes(&bytes, SourceFormat::Csv).unwrap(), ds);
        }
    }
}
