use thiserror::Error;

/// Result alias used across the data and transform layers.
pub type Result<T> = std::result::Result<T, WrangleError>;

/// Every failure the wrangling pipeline can report to the user.
///
/// None of these are fatal: the session catches them at the transform
/// boundary, keeps the last valid dataset and shows the message.
#[derive(Debug, Error)]
pub enum WrangleError {
    /// Malformed or unsupported input file.
    #[error("Could not read {format} data: {message}")]
    Parse { format: String, message: String },

    /// A parameter references a column the dataset does not have.
    #[error("Column '{name}' not found")]
    ColumnNotFound { name: String },

    /// The operation would leave nothing to show.
    #[error("{0}")]
    EmptyResult(String),

    /// Missing, blank or conflicting parameter.
    #[error("{0}")]
    InvalidParameter(String),

    /// Chart selections are incomplete.
    #[error("Chart configuration error: {0}")]
    ChartConfig(String),

    /// Serializing or writing the dataset failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl WrangleError {
    pub fn column_not_found(name: &str) -> Self {
        WrangleError::ColumnNotFound {
            name: name.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        WrangleError::InvalidParameter(message.into())
    }

    /// Parameter problems are the user's to fix and are shown as warnings.
    pub fn is_warning(&self) -> bool {
        matches!(self, WrangleError::InvalidParameter(_))
    }
}
