use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, WrangleError};

/// Literals read as missing when they make up a whole field.
pub const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Cell – a single value in a column
// ---------------------------------------------------------------------------

/// A tagged cell value. Columns may mix kinds after some transforms, so
/// every cell carries its own tag.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Missing,
}

// -- Manual Eq/Ord so cells can key a BTreeMap and sort stably --

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    /// Booleans < numbers < text < missing. `-0.0` equals `0.0`.
    fn cmp(&self, other: &Self) -> Ordering {
        use Cell::*;
        fn rank(c: &Cell) -> u8 {
            match c {
                Bool(_) => 0,
                Number(_) => 1,
                Text(_) => 2,
                Missing => 3,
            }
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Number(a), Number(b)) if a == b => Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(s) => s.hash(state),
            // fold -0.0 onto 0.0
            Cell::Number(v) => (v + 0.0).to_bits().hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::Missing => {}
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "<missing>"),
            other => write!(f, "{}", other.search_text()),
        }
    }
}

impl Cell {
    /// Interpret a single user- or file-supplied literal.
    pub fn infer(raw: &str) -> Cell {
        if is_na_token(raw) {
            return Cell::Missing;
        }
        if let Some(b) = parse_bool(raw) {
            return Cell::Bool(b);
        }
        if let Some(v) = parse_number(raw) {
            return Cell::Number(v);
        }
        Cell::Text(raw.to_string())
    }

    /// Numeric coercion: thousands separators are stripped from text,
    /// booleans count as 1/0, anything unparseable gives `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => parse_number(&s.replace(',', "")),
            Cell::Missing => None,
        }
    }

    /// Text representation used for searching and export. Missing is empty.
    pub fn search_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::Number(v) => Cow::Owned(format_number(*v)),
            Cell::Bool(b) => Cow::Owned(b.to_string()),
            Cell::Missing => Cow::Borrowed(""),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Cell::Text(_) => ColumnKind::Text,
            Cell::Number(_) => ColumnKind::Number,
            Cell::Bool(_) => ColumnKind::Boolean,
            Cell::Missing => ColumnKind::Missing,
        }
    }
}

pub fn is_na_token(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Finite numbers only; "inf" and "NaN" are not data.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integral values print without a fractional part.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        // avoid "-0"
        "0".to_string()
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Semantic type of a column, derived from its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Boolean,
    Missing,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Missing => "missing",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Build a column from raw text fields, inferring one kind for the
    /// whole column: numbers if every present value parses, else booleans,
    /// else text with the original strings kept.
    pub fn from_raw(name: impl Into<String>, raw: &[&str]) -> Self {
        let present = || raw.iter().filter(|r| !is_na_token(r));
        let cells = if present().all(|r| parse_number(r).is_some()) {
            raw.iter()
                .map(|r| parse_number(r).map_or(Cell::Missing, Cell::Number))
                .collect()
        } else if present().all(|r| parse_bool(r).is_some()) {
            raw.iter()
                .map(|r| parse_bool(r).map_or(Cell::Missing, Cell::Bool))
                .collect()
        } else {
            raw.iter()
                .map(|r| {
                    if is_na_token(r) {
                        Cell::Missing
                    } else {
                        Cell::Text(r.to_string())
                    }
                })
                .collect()
        };
        Self::new(name, cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn kind(&self) -> ColumnKind {
        let mut kinds = self.cells.iter().filter(|c| !c.is_missing()).map(Cell::kind);
        match kinds.next() {
            None => ColumnKind::Missing,
            Some(first) if kinds.all(|k| k == first) => first,
            Some(_) => ColumnKind::Text,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the working table
// ---------------------------------------------------------------------------

/// An ordered set of equally long, uniquely named columns.
///
/// Fields are private so the shape invariants hold for every value; all
/// transforms build a new `Dataset` instead of editing one in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Validate shape and build the dataset.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(WrangleError::invalid(format!(
                    "Duplicate column name '{}'",
                    col.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(WrangleError::invalid(format!(
                    "Column '{}' has {} rows but '{}' has {}",
                    bad.name,
                    bad.len(),
                    first.name,
                    first.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Row-major constructor for literals.
    #[cfg(test)]
    pub fn from_rows(names: &[&str], rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut columns: Vec<Column> = names
            .iter()
            .map(|n| Column::new(*n, Vec::with_capacity(rows.len())))
            .collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(WrangleError::invalid(format!(
                    "Row {i} has {} values, expected {}",
                    row.len(),
                    names.len()
                )));
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.cells.push(cell);
            }
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| WrangleError::column_not_found(name))
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one row, in column order.
    pub fn row(&self, row: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[row]).collect()
    }

    /// New dataset holding the given rows in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), indices.iter().map(|&i| c.cells[i].clone()).collect()))
            .collect();
        Dataset { columns }
    }

    /// New dataset of the same shape with `f` applied to every cell.
    pub fn map_cells(&self, f: impl Fn(&Cell) -> Cell) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.cells.iter().map(&f).collect()))
            .collect();
        Dataset { columns }
    }

    /// New dataset with column `idx` swapped for `cells`; the row count must match.
    pub fn with_cells(&self, idx: usize, cells: Vec<Cell>) -> Result<Dataset> {
        let mut columns = self.columns.clone();
        columns[idx].cells = cells;
        Dataset::new(columns)
    }
}
