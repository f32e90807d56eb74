//! Transform catalog: stateless operations `Dataset × params -> Dataset`.
//!
//! ```text
//!   ParamForm ──▶ dispatch::build ──▶ Transform ──▶ apply(&Dataset) ──▶ Dataset
//!                                                   │
//!                         rows / columns / text / aggregate
//! ```
//!
//! Every operation validates its column references first and returns a
//! fresh dataset; the input is never modified, so a failed step leaves the
//! session exactly where it was.

pub mod aggregate;
pub mod columns;
pub mod dispatch;
pub mod rows;
pub mod text;

use serde::{Deserialize, Serialize};

pub use aggregate::AggFunction;

use crate::data::model::Dataset;
use crate::error::Result;

fn default_true() -> bool {
    true
}

/// One configured transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    /// Stable sort of all rows by one column
    Sort {
        column: String,
        #[serde(default = "default_true")]
        ascending: bool,
    },

    /// Keep rows whose column contains a substring (case-insensitive)
    Filter { column: String, substring: String },

    DropColumn { column: String },

    /// Keep only these columns, in this order
    SelectColumns { columns: Vec<String> },

    RenameColumn { old: String, new: String },

    /// Remove rows with a missing value in any column
    DropMissing,

    /// Remove repeats of earlier rows
    DropDuplicates,

    Lowercase { column: String },

    Uppercase { column: String },

    FillMissing { column: String, value: String },

    FindReplace {
        column: String,
        find: String,
        #[serde(default)]
        replace: String,
        /// Only replace text cells equal to `find`
        #[serde(default)]
        whole_cell: bool,
    },

    /// Trim every text cell in every column
    StripWhitespace,

    GroupAggregate {
        group_column: String,
        agg_column: String,
        function: AggFunction,
    },

    SplitText {
        column: String,
        separator: String,
        /// Maximum number of splits per value; `None` means no limit.
        #[serde(default)]
        max_splits: Option<usize>,
        /// Target column names; blanks and missing slots get defaults.
        #[serde(default)]
        new_names: Vec<String>,
    },
}

impl Transform {
    /// Apply to `dataset`, producing a new dataset.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        match self {
            Transform::Sort { column, ascending } => rows::sort(dataset, column, *ascending),
            Transform::Filter { column, substring } => rows::filter(dataset, column, substring),
            Transform::DropColumn { column } => columns::drop_column(dataset, column),
            Transform::SelectColumns { columns } => columns::select_columns(dataset, columns),
            Transform::RenameColumn { old, new } => columns::rename_column(dataset, old, new),
            Transform::DropMissing => Ok(rows::drop_missing(dataset)),
            Transform::DropDuplicates => Ok(rows::drop_duplicates(dataset)),
            Transform::Lowercase { column } => text::lowercase(dataset, column),
            Transform::Uppercase { column } => text::uppercase(dataset, column),
            Transform::FillMissing { column, value } => text::fill_missing(dataset, column, value),
            Transform::FindReplace {
                column,
                find,
                replace,
                whole_cell,
            } => text::find_replace(dataset, column, find, replace, *whole_cell),
            Transform::StripWhitespace => Ok(text::strip_whitespace(dataset)),
            Transform::GroupAggregate {
                group_column,
                agg_column,
                function,
            } => aggregate::group_aggregate(dataset, group_column, agg_column, *function),
            Transform::SplitText {
                column,
                separator,
                max_splits,
                new_names,
            } => columns::split_text(dataset, column, separator, *max_splits, new_names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    #[test]
    fn test_deserialize_step() {
        let step: Transform = serde_json::from_str(
            r#"{"op": "group_aggregate", "group_column": "city", "agg_column": "amount", "function": "sum"}"#,
        )
        .unwrap();
        assert_eq!(
            step,
            Transform::GroupAggregate {
                group_column: "city".into(),
                agg_column: "amount".into(),
                function: AggFunction::Sum,
            }
        );

        let step: Transform = serde_json::from_str(r#"{"op": "sort", "column": "a"}"#).unwrap();
        assert_eq!(
            step,
            Transform::Sort {
                column: "a".into(),
                ascending: true
            }
        );
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let ds = Dataset::from_rows(
            &["a"],
            vec![vec![Cell::Number(2.0)], vec![Cell::Number(1.0)]],
        )
        .unwrap();
        let before = ds.clone();
        let sorted = Transform::Sort {
            column: "a".into(),
            ascending: true,
        }
        .apply(&ds)
        .unwrap();
        assert_eq!(ds, before);
        assert_eq!(sorted.column("a").unwrap().cells, vec![Cell::Number(1.0), Cell::Number(2.0)]);
    }
}
