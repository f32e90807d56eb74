//! Row-level operations: sorting, filtering, and dropping rows.

use std::collections::HashSet;

use crate::data::filter::column_match_rows;
use crate::data::model::{Cell, Dataset};
use crate::error::Result;

/// Stable sort by one column. Missing values go last in both directions.
pub fn sort(dataset: &Dataset, column: &str, ascending: bool) -> Result<Dataset> {
    let col = dataset.column(column)?;
    let mut order: Vec<usize> = (0..dataset.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (&col.cells[a], &col.cells[b]);
        match (x.is_missing(), y.is_missing(), ascending) {
            (false, false, true) => x.cmp(y),
            (false, false, false) => y.cmp(x),
            _ => x.is_missing().cmp(&y.is_missing()),
        }
    });
    Ok(dataset.take_rows(&order))
}

/// Keep rows whose `column` contains `substring`, ignoring case.
/// An empty substring keeps every row.
pub fn filter(dataset: &Dataset, column: &str, substring: &str) -> Result<Dataset> {
    let rows = column_match_rows(dataset, column, Some(substring))?;
    Ok(dataset.take_rows(&rows))
}

pub fn drop_missing(dataset: &Dataset) -> Dataset {
    let keep: Vec<usize> = (0..dataset.len())
        .filter(|&row| !dataset.row(row).iter().any(|c| c.is_missing()))
        .collect();
    dataset.take_rows(&keep)
}

/// First occurrence of each distinct row wins.
pub fn drop_duplicates(dataset: &Dataset) -> Dataset {
    let mut seen: HashSet<Vec<&Cell>> = HashSet::new();
    let keep: Vec<usize> = (0..dataset.len())
        .filter(|&row| seen.insert(dataset.row(row)))
        .collect();
    dataset.take_rows(&keep)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::WrangleError;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn scores() -> Dataset {
        Dataset::from_rows(
            &["name", "score"],
            vec![
                vec![text("a"), Cell::Number(2.0)],
                vec![text("b"), Cell::Missing],
                vec![text("c"), Cell::Number(1.0)],
                vec![text("d"), Cell::Number(2.0)],
            ],
        )
        .unwrap()
    }

    fn names(ds: &Dataset) -> Vec<String> {
        ds.column("name")
            .unwrap()
            .cells
            .iter()
            .map(|c| c.search_text().into_owned())
            .collect()
    }

    #[test]
    fn test_sort_ascending_stable_missing_last() {
        let sorted = sort(&scores(), "score", true).unwrap();
        assert_eq!(names(&sorted), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_sort_descending_keeps_tie_order() {
        let sorted = sort(&scores(), "score", false).unwrap();
        assert_eq!(names(&sorted), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_sort_unknown_column() {
        assert!(matches!(
            sort(&scores(), "nope", true),
            Err(WrangleError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_filter_case_insensitive() {
        let ds = Dataset::from_rows(
            &["city"],
            vec![vec![text("Jakarta")], vec![text("Bandung")], vec![Cell::Missing]],
        )
        .unwrap();
        assert_eq!(filter(&ds, "city", "JAK").unwrap().len(), 1);
        assert_eq!(filter(&ds, "city", "").unwrap(), ds);
        assert!(filter(&ds, "city", "xyz").unwrap().is_empty());
    }

    #[test]
    fn test_drop_missing() {
        let dropped = drop_missing(&scores());
        assert_eq!(names(&dropped), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_drop_duplicates_first_wins() {
        let ds = Dataset::from_rows(
            &["k", "v"],
            vec![
                vec![text("x"), Cell::Number(1.0)],
                vec![text("y"), Cell::Number(1.0)],
                vec![text("x"), Cell::Number(1.0)],
                vec![text("x"), Cell::Missing],
                vec![text("x"), Cell::Missing],
            ],
        )
        .unwrap();
        let deduped = drop_duplicates(&ds);
        assert_eq!(deduped, ds.take_rows(&[0, 1, 3]));
    }

    #[test]
    fn test_drop_duplicates_ignores_sign_of_zero() {
        let ds = Dataset::from_rows(
            &["n", "s"],
            vec![
                vec![Cell::Number(0.0), text("x")],
                vec![Cell::Number(-0.0), text("x")],
            ],
        )
        .unwrap();
        assert_eq!(drop_duplicates(&ds).len(), 1);
    }

    fn small_dataset() -> impl Strategy<Value = Dataset> {
        let cell = prop_oneof![
            (0i32..4).prop_map(|n| Cell::Number(f64::from(n))),
            prop::sample::select(vec!["a", "B", "b", ""]).prop_map(|s| Cell::Text(s.to_string())),
            Just(Cell::Missing),
        ];
        prop::collection::vec((cell, 0usize..1000), 0..25).prop_map(|rows| {
            Dataset::from_rows(
                &["key", "id"],
                rows.into_iter()
                    .map(|(k, id)| vec![k, Cell::Number(id as f64)])
                    .collect(),
            )
            .unwrap()
        })
    }

    fn sorted_rows(ds: &Dataset) -> Vec<Vec<Cell>> {
        let mut rows: Vec<Vec<Cell>> = (0..ds.len())
            .map(|r| ds.row(r).into_iter().cloned().collect())
            .collect();
        rows.sort();
        rows
    }

    proptest! {
        #[test]
        fn prop_sort_is_stable_permutation(ds in small_dataset(), ascending in any::<bool>()) {
            // tag each row with its original position
            let tagged = Dataset::new(
                ds.columns()
                    .iter()
                    .cloned()
                    .chain(std::iter::once(crate::data::model::Column::new(
                        "pos",
                        (0..ds.len()).map(|i| Cell::Number(i as f64)).collect(),
                    )))
                    .collect(),
            ).unwrap();
            let sorted = sort(&tagged, "key", ascending).unwrap();
            prop_assert_eq!(sorted_rows(&sorted), sorted_rows(&tagged));

            let keys = &sorted.column("key").unwrap().cells;
            let pos = &sorted.column("pos").unwrap().cells;
            for i in 1..sorted.len() {
                if keys[i - 1] == keys[i] {
                    prop_assert!(pos[i - 1] < pos[i]);
                }
            }
        }

        #[test]
        fn prop_filter_is_idempotent(ds in small_dataset(), term in "[abB]{0,1}") {
            let once = filter(&ds, "key", &term).unwrap();
            let twice = filter(&once, "key", &term).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_drop_duplicates_is_idempotent(ds in small_dataset()) {
            let key_only = crate::transform::columns::select_columns(&ds, &["key".to_string()]).unwrap();
            let once = drop_duplicates(&key_only);
            prop_assert_eq!(drop_duplicates(&once), once);
        }
    }
}
