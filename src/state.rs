use std::path::Path;

use crate::config::AppConfig;
use crate::data::chart::{ChartRequest, ChartSpec, build_chart};
use crate::data::explore::{ColumnProfile, profile_column};
use crate::data::export::{ExportFormat, export_file};
use crate::data::filter::search_rows;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::error::{Result, WrangleError};
use crate::transform::dispatch::{OperationKind, ParamForm, dispatch};

// ---------------------------------------------------------------------------
// Diagnostics shown to the user
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn from_error(err: &WrangleError) -> Self {
        Self {
            severity: if err.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            },
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The whole session, independent of rendering. Passed by `&mut` into every
/// panel; nothing lives in globals.
#[derive(Default)]
pub struct AppState {
    pub config: AppConfig,

    /// File name of the loaded source, for the top bar.
    pub source_name: Option<String>,

    /// Dataset as loaded (None until user loads a file).
    pub original: Option<Dataset>,

    /// Working dataset; replaced by each successful transform.
    pub working: Option<Dataset>,

    /// Selected operation and its widget values.
    pub operation: Option<OperationKind>,
    pub params: ParamForm,

    /// Search boxes above the two tables.
    pub original_search: String,
    pub working_search: String,

    /// "Explore column data" panel.
    pub explore: bool,
    pub explore_column: Option<String>,

    /// Visualization panel.
    pub visualize: bool,
    pub chart: ChartRequest,

    /// Status / error message shown in the UI.
    pub diagnostic: Option<Diagnostic>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Ingest a newly loaded dataset and reset every selection.
    pub fn set_dataset(&mut self, name: Option<String>, dataset: Dataset) {
        log::info!(
            "Loaded {} rows with columns {:?}",
            dataset.len(),
            dataset.column_names()
        );
        self.source_name = name;
        self.original = Some(dataset.clone());
        self.working = Some(dataset);
        self.params = ParamForm::default();
        self.original_search.clear();
        self.working_search.clear();
        self.explore_column = None;
        self.chart = ChartRequest::default();
        self.diagnostic = None;
    }

    /// Load a file from disk; on failure the current session stays as it was.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                self.set_dataset(name, dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.diagnostic = Some(Diagnostic::from_error(&e));
            }
        }
    }

    /// Run the selected operation once against the working dataset.
    ///
    /// Success replaces the working dataset; any failure leaves it untouched
    /// and becomes the diagnostic.
    pub fn apply_operation(&mut self) {
        let Some(working) = &self.working else {
            return;
        };
        match dispatch(self.operation, &self.params, working) {
            Ok(Some((transform, result))) => {
                if let Ok(json) = serde_json::to_string(&transform) {
                    log::debug!("applied {json}");
                }
                let label = self.operation.map_or("Operation", OperationKind::label);
                log::info!("{label}: {} rows x {} columns", result.len(), result.width());
                self.diagnostic = Some(Diagnostic::info(applied_message(
                    self.operation,
                    working,
                    &result,
                )));
                self.working = Some(result);
                self.forget_stale_columns();
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Operation rejected: {e}");
                self.diagnostic = Some(Diagnostic::from_error(&e));
            }
        }
    }

    /// Go back to the dataset as loaded.
    pub fn reset(&mut self) {
        if let Some(original) = &self.original {
            self.working = Some(original.clone());
            self.forget_stale_columns();
            self.diagnostic = Some(Diagnostic::info("Reverted to the loaded data."));
        }
    }

    /// Drop selections that name columns the working dataset no longer has.
    fn forget_stale_columns(&mut self) {
        let Some(ds) = &self.working else {
            return;
        };
        let keep = |c: &mut Option<String>| {
            if c.as_deref().is_some_and(|name| !ds.has_column(name)) {
                *c = None;
            }
        };
        keep(&mut self.params.column);
        keep(&mut self.params.group_column);
        keep(&mut self.params.agg_column);
        keep(&mut self.explore_column);
        keep(&mut self.chart.x);
        keep(&mut self.chart.y);
        keep(&mut self.chart.filter_column);
        self.params.columns.retain(|c| ds.has_column(c));
    }

    /// Write the full working dataset; search views are ignored.
    pub fn export_to(&mut self, path: &Path, format: ExportFormat) -> Result<()> {
        let Some(ds) = &self.working else {
            return Err(WrangleError::Export("no data loaded".to_string()));
        };
        match export_file(ds, format, path) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", ds.len(), path.display());
                self.diagnostic = Some(Diagnostic::info(format!("Saved {}", path.display())));
                Ok(())
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.diagnostic = Some(Diagnostic::from_error(&e));
                Err(e)
            }
        }
    }

    pub fn original_rows(&self) -> Vec<usize> {
        self.original
            .as_ref()
            .map_or_else(Vec::new, |ds| search_rows(ds, Some(self.original_search.as_str())))
    }

    pub fn working_rows(&self) -> Vec<usize> {
        self.working
            .as_ref()
            .map_or_else(Vec::new, |ds| search_rows(ds, Some(self.working_search.as_str())))
    }

    pub fn column_profile(&self) -> Option<Result<ColumnProfile>> {
        let ds = self.working.as_ref()?;
        let column = self.explore_column.as_deref()?;
        Some(profile_column(ds, column))
    }

    pub fn chart_spec(&self) -> Option<Result<ChartSpec>> {
        let ds = self.working.as_ref()?;
        Some(build_chart(ds, &self.chart, self.config.max_histogram_bins))
    }
}

fn applied_message(operation: Option<OperationKind>, before: &Dataset, after: &Dataset) -> String {
    let label = operation.map_or("Operation", OperationKind::label);
    match operation {
        Some(OperationKind::SplitText) => format!(
            "Text split into {} columns.",
            after.width().saturating_sub(before.width())
        ),
        _ if after.is_empty() => format!("{label} applied: no rows left."),
        _ => format!(
            "{label} applied: {} rows, {} columns.",
            after.len(),
            after.width()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;
    use crate::transform::AggFunction;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        let ds = Dataset::from_rows(
            &["city", "amount"],
            vec![
                vec![text("Jakarta"), text("1,200")],
                vec![text("Bandung"), text("950")],
                vec![text("Jakarta"), text("100")],
            ],
        )
        .unwrap();
        state.set_dataset(Some("sales.csv".into()), ds);
        state
    }

    #[test]
    fn test_group_aggregate_replaces_working_dataset() {
        let mut state = loaded();
        state.operation = Some(OperationKind::GroupAggregate);
        state.params.group_column = Some("city".into());
        state.params.agg_column = Some("amount".into());
        state.params.agg_function = AggFunction::Sum;
        state.apply_operation();

        let working = state.working.as_ref().unwrap();
        assert_eq!(
            working.column("amount").unwrap().cells,
            vec![Cell::Number(950.0), Cell::Number(1300.0)]
        );
        assert_eq!(state.diagnostic.as_ref().unwrap().severity, Severity::Info);
        assert_eq!(state.original.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_aggregate_keeps_dataset_and_reports() {
        let mut state = loaded();
        let before = state.working.clone();
        state.operation = Some(OperationKind::GroupAggregate);
        state.params.group_column = Some("amount".into());
        state.params.agg_column = Some("city".into());
        state.apply_operation();

        assert_eq!(state.working, before);
        let diag = state.diagnostic.unwrap();
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.message.contains("No numeric data in 'city'"));
    }

    #[test]
    fn test_split_reports_new_column_count() {
        let mut state = loaded();
        state.operation = Some(OperationKind::SplitText);
        state.params.column = Some("amount".into());
        state.params.separator = ",".into();
        state.apply_operation();

        assert_eq!(state.working.as_ref().unwrap().width(), 4);
        let diag = state.diagnostic.unwrap();
        assert_eq!(diag.severity, Severity::Info);
        assert_eq!(diag.message, "Text split into 2 columns.");
    }

    #[test]
    fn test_filter_to_nothing_reports_no_rows() {
        let mut state = loaded();
        state.operation = Some(OperationKind::Filter);
        state.params.column = Some("city".into());
        state.params.filter_value = "surabaya".into();
        state.apply_operation();

        assert_eq!(state.working.as_ref().unwrap().len(), 0);
        assert_eq!(state.diagnostic.unwrap().message, "Filter applied: no rows left.");
    }

    #[test]
    fn test_invalid_parameters_warn() {
        let mut state = loaded();
        state.operation = Some(OperationKind::RenameColumn);
        state.params.column = Some("city".into());
        state.params.new_name = "amount".into();
        state.apply_operation();
        assert_eq!(state.diagnostic.unwrap().severity, Severity::Warning);
    }

    #[test]
    fn test_stale_selections_cleared_and_reset() {
        let mut state = loaded();
        state.operation = Some(OperationKind::DropColumn);
        state.params.column = Some("amount".into());
        state.chart.y = Some("amount".into());
        state.apply_operation();

        assert_eq!(state.working.as_ref().unwrap().column_names(), vec!["city"]);
        assert_eq!(state.params.column, None);
        assert_eq!(state.chart.y, None);

        state.reset();
        assert_eq!(state.working, state.original);
    }

    #[test]
    fn test_search_views_do_not_touch_data() {
        let mut state = loaded();
        state.working_search = "jak".into();
        assert_eq!(state.working_rows(), vec![0, 2]);
        assert_eq!(state.original_rows(), vec![0, 1, 2]);
        assert_eq!(state.working.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_export_ignores_search() {
        let mut state = loaded();
        state.working_search = "bandung".into();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        state.export_to(&path, ExportFormat::Csv).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 4);
    }

    #[test]
    fn test_failed_load_keeps_session() {
        let mut state = loaded();
        state.load_path(Path::new("/definitely/not/here.csv"));
        assert!(state.working.is_some());
        assert_eq!(state.diagnostic.unwrap().severity, Severity::Error);
    }
}
