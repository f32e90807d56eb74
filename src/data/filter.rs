use super::model::{Cell, Dataset};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Substring search: read-only row projections of a dataset
// ---------------------------------------------------------------------------

/// Lower-cased needle; `None` when the term is absent or empty, meaning
/// "no constraint".
fn needle(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.is_empty()).map(str::to_lowercase)
}

fn cell_matches(cell: &Cell, needle: &str) -> bool {
    cell.search_text().to_lowercase().contains(needle)
}

/// Return indices of rows where ANY column contains `term`, ignoring case.
/// An absent or empty term keeps every row.
pub fn search_rows(dataset: &Dataset, term: Option<&str>) -> Vec<usize> {
    let Some(needle) = needle(term) else {
        return (0..dataset.len()).collect();
    };
    (0..dataset.len())
        .filter(|&row| {
            dataset
                .columns()
                .iter()
                .any(|col| cell_matches(&col.cells[row], &needle))
        })
        .collect()
}

/// Return indices of rows whose `column` value contains `term`, ignoring case.
pub fn column_match_rows(dataset: &Dataset, column: &str, term: Option<&str>) -> Result<Vec<usize>> {
    let col = dataset.column(column)?;
    let Some(needle) = needle(term) else {
        return Ok((0..dataset.len()).collect());
    };
    Ok(col
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell_matches(cell, &needle))
        .map(|(i, _)| i)
        .collect())
}
