/// Viewer settings. Everything has a sensible default; nothing is read from
/// the environment or persisted.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Height of each table view in the central panel.
    pub table_height: f32,
    /// Rows rendered per table; the underlying dataset is never truncated.
    pub max_table_rows: usize,
    pub export_file_name: String,
    /// Upper bound on histogram bins for numeric columns.
    pub max_histogram_bins: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: [1280.0, 860.0],
            min_window_size: [640.0, 420.0],
            table_height: 300.0,
            max_table_rows: 10_000,
            export_file_name: crate::data::export::DEFAULT_EXPORT_FILE_NAME.to_string(),
            max_histogram_bins: 50,
        }
    }
}
