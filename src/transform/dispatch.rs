//! Turn the side panel's raw selections into exactly one [`Transform`].

use std::fmt;

use super::{AggFunction, Transform};
use crate::data::model::Dataset;
use crate::error::{Result, WrangleError};

/// Operations offered in the selector, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Sort,
    Filter,
    DropColumn,
    SelectColumns,
    RenameColumn,
    DropMissing,
    DropDuplicates,
    Lowercase,
    Uppercase,
    FillMissing,
    FindReplace,
    StripWhitespace,
    GroupAggregate,
    SplitText,
}

impl OperationKind {
    pub const ALL: [OperationKind; 14] = [
        OperationKind::Sort,
        OperationKind::Filter,
        OperationKind::DropColumn,
        OperationKind::SelectColumns,
        OperationKind::RenameColumn,
        OperationKind::DropMissing,
        OperationKind::DropDuplicates,
        OperationKind::Lowercase,
        OperationKind::Uppercase,
        OperationKind::FillMissing,
        OperationKind::FindReplace,
        OperationKind::StripWhitespace,
        OperationKind::GroupAggregate,
        OperationKind::SplitText,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Sort => "Sort",
            OperationKind::Filter => "Filter",
            OperationKind::DropColumn => "Drop column",
            OperationKind::SelectColumns => "Select columns",
            OperationKind::RenameColumn => "Rename column",
            OperationKind::DropMissing => "Drop missing values",
            OperationKind::DropDuplicates => "Drop duplicate rows",
            OperationKind::Lowercase => "Convert text to lowercase",
            OperationKind::Uppercase => "Convert text to uppercase",
            OperationKind::FillMissing => "Fill missing values",
            OperationKind::FindReplace => "Find and replace",
            OperationKind::StripWhitespace => "Strip whitespace",
            OperationKind::GroupAggregate => "Group by column and aggregate",
            OperationKind::SplitText => "Split text",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Raw widget values. Each operation reads only the fields it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamForm {
    pub column: Option<String>,
    /// Multi-select for "Select columns", in click order.
    pub columns: Vec<String>,
    pub ascending: bool,
    pub filter_value: String,
    pub new_name: String,
    pub fill_value: String,
    pub find: String,
    pub replace: String,
    pub whole_cell: bool,
    pub group_column: Option<String>,
    pub agg_column: Option<String>,
    pub agg_function: AggFunction,
    pub separator: String,
    /// Zero or negative means no limit.
    pub max_splits: i64,
    /// Comma-separated target names; blank for defaults.
    pub split_names: String,
}

impl Default for ParamForm {
    fn default() -> Self {
        Self {
            column: None,
            columns: Vec::new(),
            ascending: true,
            filter_value: String::new(),
            new_name: String::new(),
            fill_value: String::new(),
            find: String::new(),
            replace: String::new(),
            whole_cell: false,
            group_column: None,
            agg_column: None,
            agg_function: AggFunction::default(),
            separator: String::new(),
            max_splits: -1,
            split_names: String::new(),
        }
    }
}

fn required_column(value: &Option<String>, what: &str) -> Result<String> {
    value
        .clone()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| WrangleError::invalid(format!("Please select a column {what}.")))
}

fn required_text(value: &str, what: &str) -> Result<String> {
    if value.is_empty() {
        Err(WrangleError::invalid(format!("Please enter {what}.")))
    } else {
        Ok(value.to_string())
    }
}

/// Validate the form for `kind` and build the transform.
pub fn build(kind: OperationKind, form: &ParamForm) -> Result<Transform> {
    let transform = match kind {
        OperationKind::Sort => Transform::Sort {
            column: required_column(&form.column, "to sort by")?,
            ascending: form.ascending,
        },
        OperationKind::Filter => Transform::Filter {
            column: required_column(&form.column, "to filter")?,
            substring: form.filter_value.clone(),
        },
        OperationKind::DropColumn => Transform::DropColumn {
            column: required_column(&form.column, "to drop")?,
        },
        OperationKind::SelectColumns => {
            if form.columns.is_empty() {
                return Err(WrangleError::invalid("Please select at least one column to keep."));
            }
            Transform::SelectColumns {
                columns: form.columns.clone(),
            }
        }
        OperationKind::RenameColumn => Transform::RenameColumn {
            old: required_column(&form.column, "to rename")?,
            new: required_text(form.new_name.trim(), "a new column name")?,
        },
        OperationKind::DropMissing => Transform::DropMissing,
        OperationKind::DropDuplicates => Transform::DropDuplicates,
        OperationKind::Lowercase => Transform::Lowercase {
            column: required_column(&form.column, "to convert to lowercase")?,
        },
        OperationKind::Uppercase => Transform::Uppercase {
            column: required_column(&form.column, "to convert to uppercase")?,
        },
        OperationKind::FillMissing => Transform::FillMissing {
            column: required_column(&form.column, "to fill")?,
            value: required_text(&form.fill_value, "a value to fill missing data")?,
        },
        OperationKind::FindReplace => Transform::FindReplace {
            column: required_column(&form.column, "for find and replace")?,
            find: required_text(&form.find, "a value to find")?,
            replace: form.replace.clone(),
            whole_cell: form.whole_cell,
        },
        OperationKind::StripWhitespace => Transform::StripWhitespace,
        OperationKind::GroupAggregate => Transform::GroupAggregate {
            group_column: required_column(&form.group_column, "to group by")?,
            agg_column: required_column(&form.agg_column, "to aggregate")?,
            function: form.agg_function,
        },
        OperationKind::SplitText => Transform::SplitText {
            column: required_column(&form.column, "to split")?,
            separator: required_text(&form.separator, "a separator")?,
            max_splits: usize::try_from(form.max_splits).ok().filter(|&n| n > 0),
            new_names: parse_split_names(&form.split_names),
        },
    };
    Ok(transform)
}

fn parse_split_names(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|n| n.trim().to_string()).collect()
}

/// Apply the selected operation. No selection means no transform (`Ok(None)`).
pub fn dispatch(
    kind: Option<OperationKind>,
    form: &ParamForm,
    dataset: &Dataset,
) -> Result<Option<(Transform, Dataset)>> {
    let Some(kind) = kind else {
        return Ok(None);
    };
    let transform = build(kind, form)?;
    let result = transform.apply(dataset)?;
    Ok(Some((transform, result)))
}
