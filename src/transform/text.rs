//! Cell-value edits: case folding, filling, find/replace, and trimming.

use crate::data::model::{Cell, ColumnKind, Dataset, parse_number};
use crate::error::{Result, WrangleError};

/// Rebuild one column with `f` applied to every cell.
fn map_column(dataset: &Dataset, column: &str, f: impl Fn(&Cell) -> Cell) -> Result<Dataset> {
    let idx = dataset.column_index(column)?;
    let cells = dataset.columns()[idx].cells.iter().map(f).collect();
    dataset.with_cells(idx, cells)
}

pub fn lowercase(dataset: &Dataset, column: &str) -> Result<Dataset> {
    map_column(dataset, column, |cell| match cell {
        Cell::Text(s) => Cell::Text(s.to_lowercase()),
        other => other.clone(),
    })
}

pub fn uppercase(dataset: &Dataset, column: &str) -> Result<Dataset> {
    map_column(dataset, column, |cell| match cell {
        Cell::Text(s) => Cell::Text(s.to_uppercase()),
        other => other.clone(),
    })
}

/// Replace missing cells with `value`: a number for numeric or all-missing
/// columns when it parses as one, text otherwise.
pub fn fill_missing(dataset: &Dataset, column: &str, value: &str) -> Result<Dataset> {
    let kind = dataset.column(column)?.kind();
    let fill = match (kind, parse_number(value)) {
        (ColumnKind::Number | ColumnKind::Missing, Some(v)) => Cell::Number(v),
        _ => Cell::Text(value.to_string()),
    };
    map_column(dataset, column, |cell| match cell {
        Cell::Missing => fill.clone(),
        other => other.clone(),
    })
}

/// Literal, case-sensitive replacement. Text cells get substring
/// replacement, or only a whole-cell match when `whole_cell` is set;
/// numbers and booleans always match as a whole value.
pub fn find_replace(
    dataset: &Dataset,
    column: &str,
    find: &str,
    replace: &str,
    whole_cell: bool,
) -> Result<Dataset> {
    dataset.column(column)?;
    if find.is_empty() {
        return Err(WrangleError::invalid("Please enter a value to find."));
    }
    map_column(dataset, column, |cell| match cell {
        Cell::Text(s) if whole_cell => {
            if s == find {
                Cell::Text(replace.to_string())
            } else {
                cell.clone()
            }
        }
        Cell::Text(s) => Cell::Text(s.replace(find, replace)),
        Cell::Missing => Cell::Missing,
        other if other.search_text() == find => Cell::infer(replace),
        other => other.clone(),
    })
}

/// Trim text cells in every column.
pub fn strip_whitespace(dataset: &Dataset) -> Dataset {
    dataset.map_cells(|cell| match cell {
        Cell::Text(s) => Cell::Text(s.trim().to_string()),
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn mixed() -> Dataset {
        Dataset::from_rows(
            &["label", "qty"],
            vec![
                vec![text(" Red Apple "), Cell::Number(3.0)],
                vec![Cell::Number(7.0), Cell::Missing],
                vec![Cell::Missing, Cell::Number(3.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_case_folding_skips_non_text() {
        let lower = lowercase(&mixed(), "label").unwrap();
        assert_eq!(
            lower.column("label").unwrap().cells,
            vec![text(" red apple "), Cell::Number(7.0), Cell::Missing]
        );
        let upper = uppercase(&mixed(), "label").unwrap();
        assert_eq!(upper.column("label").unwrap().cells[0], text(" RED APPLE "));
        assert!(uppercase(&mixed(), "nope").is_err());
    }

    #[test]
    fn test_fill_numeric_column_coerces() {
        let filled = fill_missing(&mixed(), "qty", "0").unwrap();
        assert_eq!(
            filled.column("qty").unwrap().cells,
            vec![Cell::Number(3.0), Cell::Number(0.0), Cell::Number(3.0)]
        );

        let filled = fill_missing(&mixed(), "qty", "unknown").unwrap();
        assert_eq!(filled.column("qty").unwrap().cells[1], text("unknown"));
    }

    #[test]
    fn test_fill_all_missing_column_with_number() {
        let ds = Dataset::from_rows(&["score"], vec![vec![Cell::Missing]; 2]).unwrap();
        let filled = fill_missing(&ds, "score", "0").unwrap();
        let column = filled.column("score").unwrap();
        assert_eq!(column.cells, vec![Cell::Number(0.0); 2]);
        assert_eq!(column.kind(), ColumnKind::Number);
    }

    #[test]
    fn test_fill_text_column_stores_text() {
        let filled = fill_missing(&mixed(), "label", "5").unwrap();
        assert_eq!(filled.column("label").unwrap().cells[2], text("5"));
    }

    #[test]
    fn test_find_replace() {
        let replaced = find_replace(&mixed(), "label", "Apple", "Pear", false).unwrap();
        assert_eq!(replaced.column("label").unwrap().cells[0], text(" Red Pear "));

        let replaced = find_replace(&mixed(), "qty", "3", "4", false).unwrap();
        assert_eq!(
            replaced.column("qty").unwrap().cells,
            vec![Cell::Number(4.0), Cell::Missing, Cell::Number(4.0)]
        );

        // case-sensitive
        let untouched = find_replace(&mixed(), "label", "apple", "x", false).unwrap();
        assert_eq!(untouched, mixed());
    }

    #[test]
    fn test_find_replace_whole_cell() {
        let ds = Dataset::from_rows(
            &["fruit"],
            vec![vec![text("Apple")], vec![text("Apple pie")], vec![Cell::Missing]],
        )
        .unwrap();
        let replaced = find_replace(&ds, "fruit", "Apple", "Pear", true).unwrap();
        assert_eq!(
            replaced.column("fruit").unwrap().cells,
            vec![text("Pear"), text("Apple pie"), Cell::Missing]
        );
    }

    #[test]
    fn test_find_replace_blank_find() {
        assert!(matches!(
            find_replace(&mixed(), "label", "", "x", true),
            Err(WrangleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_strip_whitespace_all_columns() {
        let ds = Dataset::from_rows(
            &["a", "b"],
            vec![vec![text("  x "), text("\ty\n")], vec![Cell::Number(1.0), Cell::Missing]],
        )
        .unwrap();
        let stripped = strip_whitespace(&ds);
        assert_eq!(stripped.row(0), vec![&text("x"), &text("y")]);
        assert_eq!(stripped.row(1), vec![&Cell::Number(1.0), &Cell::Missing]);
    }
}
