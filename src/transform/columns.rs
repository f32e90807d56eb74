//! Column-level operations: dropping, selecting, renaming, and splitting.

use std::collections::HashSet;

use crate::data::model::{Cell, Column, Dataset};
use crate::error::{Result, WrangleError};

pub fn drop_column(dataset: &Dataset, column: &str) -> Result<Dataset> {
    let idx = dataset.column_index(column)?;
    let mut columns = dataset.columns().to_vec();
    columns.remove(idx);
    Dataset::new(columns)
}

/// Keep only `names`, in the order given.
pub fn select_columns(dataset: &Dataset, names: &[String]) -> Result<Dataset> {
    if names.is_empty() {
        return Err(WrangleError::invalid("Please select at least one column to keep."));
    }
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(WrangleError::invalid(format!("Column '{name}' is selected twice.")));
        }
        columns.push(dataset.column(name)?.clone());
    }
    Dataset::new(columns)
}

pub fn rename_column(dataset: &Dataset, old: &str, new: &str) -> Result<Dataset> {
    let idx = dataset.column_index(old)?;
    if new.trim().is_empty() {
        return Err(WrangleError::invalid("Please enter a new column name."));
    }
    if new != old && dataset.has_column(new) {
        return Err(WrangleError::invalid(format!("A column named '{new}' already exists.")));
    }
    let mut columns = dataset.columns().to_vec();
    columns[idx].name = new.to_string();
    Dataset::new(columns)
}

/// Split the text cells of `column` on a literal separator into new columns
/// appended after the existing ones.
///
/// The number of new columns is the largest number of parts any row
/// produces. Shorter rows are padded with missing values, and cells that are
/// not text are missing in every part. `max_splits` caps the number of
/// splits per value (so at most `max_splits + 1` parts); zero means no limit.
pub fn split_text(
    dataset: &Dataset,
    column: &str,
    separator: &str,
    max_splits: Option<usize>,
    new_names: &[String],
) -> Result<Dataset> {
    let col = dataset.column(column)?;
    if separator.is_empty() {
        return Err(WrangleError::invalid("Please enter a separator."));
    }

    let parts: Vec<Option<Vec<&str>>> = col
        .cells
        .iter()
        .map(|cell| match cell {
            Cell::Text(s) => Some(match max_splits {
                Some(n) if n > 0 => s.splitn(n + 1, separator).collect(),
                _ => s.split(separator).collect(),
            }),
            _ => None,
        })
        .collect();

    let width = parts.iter().flatten().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Err(WrangleError::EmptyResult(format!(
            "Column '{column}' has no text values to split."
        )));
    }

    let names = split_column_names(column, width, new_names);
    let mut taken: HashSet<&str> = HashSet::new();
    for name in &names {
        if dataset.has_column(name) || !taken.insert(name.as_str()) {
            return Err(WrangleError::invalid(format!(
                "Split column name '{name}' is already in use."
            )));
        }
    }

    let mut columns = dataset.columns().to_vec();
    for (i, name) in names.into_iter().enumerate() {
        let cells = parts
            .iter()
            .map(|p| {
                p.as_ref()
                    .and_then(|p| p.get(i))
                    .map_or(Cell::Missing, |s| Cell::Text(s.to_string()))
            })
            .collect();
        columns.push(Column::new(name, cells));
    }
    Dataset::new(columns)
}

/// User names first (trimmed, blanks defaulted), extra names dropped,
/// remaining slots named `{column}_split_{i}` counting from 1.
fn split_column_names(column: &str, width: usize, user: &[String]) -> Vec<String> {
    (0..width)
        .map(|i| {
            user.get(i)
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map_or_else(|| format!("{column}_split_{}", i + 1), str::to_string)
        })
        .collect()
}
