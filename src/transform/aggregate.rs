//! Group-by with a single numeric aggregation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::model::{Cell, Column, Dataset};
use crate::error::{Result, WrangleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunction {
    #[default]
    Mean,
    Sum,
    Count,
    Min,
    Max,
}

impl AggFunction {
    pub const ALL: [AggFunction; 5] = [
        AggFunction::Mean,
        AggFunction::Sum,
        AggFunction::Count,
        AggFunction::Min,
        AggFunction::Max,
    ];

    /// Reduce a non-empty group.
    fn reduce(self, values: &[f64]) -> f64 {
        match self {
            AggFunction::Mean => values.iter().sum::<f64>() / values.len() as f64,
            AggFunction::Sum => values.iter().sum(),
            AggFunction::Count => values.len() as f64,
            AggFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl fmt::Display for AggFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggFunction::Mean => "mean",
            AggFunction::Sum => "sum",
            AggFunction::Count => "count",
            AggFunction::Min => "min",
            AggFunction::Max => "max",
        };
        write!(f, "{name}")
    }
}

/// Coerce `agg_column` to numbers, drop rows that fail, group by
/// `group_column` and reduce each group.
///
/// Returns one row per distinct group value, in ascending value order, with
/// the two columns `{group_column, agg_column}`. Rows whose group value is
/// missing do not form a group.
///
/// Both "nothing numeric to aggregate" and "no group left" are reported as
/// [`WrangleError::EmptyResult`] with their own message; the caller keeps
/// the dataset it already had.
pub fn group_aggregate(
    dataset: &Dataset,
    group_column: &str,
    agg_column: &str,
    function: AggFunction,
) -> Result<Dataset> {
    let group = dataset.column(group_column)?;
    let agg = dataset.column(agg_column)?;
    if group_column == agg_column {
        return Err(WrangleError::invalid(
            "Group and aggregation columns must be different.",
        ));
    }

    let numeric: Vec<(usize, f64)> = agg
        .cells
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| cell.to_number().map(|v| (row, v)))
        .collect();
    if numeric.is_empty() {
        return Err(WrangleError::EmptyResult(format!(
            "No numeric data in '{agg_column}' after conversion. Please choose another column."
        )));
    }

    let mut groups: BTreeMap<&Cell, Vec<f64>> = BTreeMap::new();
    for (row, value) in numeric {
        let key = &group.cells[row];
        if !key.is_missing() {
            groups.entry(key).or_default().push(value);
        }
    }
    if groups.is_empty() {
        return Err(WrangleError::EmptyResult(
            "Grouping resulted in an empty dataset. Please check your data and selections."
                .to_string(),
        ));
    }

    let (keys, values): (Vec<Cell>, Vec<Cell>) = groups
        .into_iter()
        .map(|(key, vals)| (key.clone(), Cell::Number(function.reduce(&vals))))
        .unzip();

    Dataset::new(vec![
        Column::new(group_column, keys),
        Column::new(agg_column, values),
    ])
}
