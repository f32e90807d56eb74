use std::collections::BTreeMap;

use super::model::{Cell, ColumnKind, Dataset};
use crate::error::Result;

/// Summary of one column for the "Explore column data" panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    /// Distinct present values, most frequent first; ties in value order.
    pub value_counts: Vec<(Cell, usize)>,
}

pub fn profile_column(dataset: &Dataset, column: &str) -> Result<ColumnProfile> {
    let col = dataset.column(column)?;

    let mut counts: BTreeMap<&Cell, usize> = BTreeMap::new();
    for cell in col.cells.iter().filter(|c| !c.is_missing()) {
        *counts.entry(cell).or_default() += 1;
    }
    let mut value_counts: Vec<(Cell, usize)> =
        counts.into_iter().map(|(c, n)| (c.clone(), n)).collect();
    // stable: equal counts stay in value order
    value_counts.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(ColumnProfile {
        name: col.name.clone(),
        kind: col.kind(),
        missing: col.missing_count(),
        value_counts,
    })
}
