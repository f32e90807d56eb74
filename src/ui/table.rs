use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::config::AppConfig;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Tabular view with its own search box
// ---------------------------------------------------------------------------

/// Render `title`, a search box bound to `search`, and the rows of `dataset`
/// listed in `rows`. Only the view is narrowed; the dataset is untouched.
pub fn dataset_view(
    ui: &mut Ui,
    id: &str,
    title: &str,
    dataset: &Dataset,
    rows: &[usize],
    search: &mut String,
    config: &AppConfig,
) {
    ui.heading(title);
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Search {id} data:"));
        ui.text_edit_singleline(search);
        ui.weak(format!("{} of {} rows", rows.len(), dataset.len()));
    });

    let shown = &rows[..rows.len().min(config.max_table_rows)];

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(TableColumn::auto().at_least(60.0), dataset.width())
                .min_scrolled_height(0.0)
                .max_scroll_height(config.table_height)
                .header(20.0, |mut header| {
                    for col in dataset.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col.name.as_str())
                                .on_hover_text(col.kind().to_string());
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, shown.len(), |mut row| {
                        let r = shown[row.index()];
                        for col in dataset.columns() {
                            let cell = &col.cells[r];
                            row.col(|ui: &mut Ui| {
                                if cell.is_missing() {
                                    ui.weak(cell.to_string());
                                } else {
                                    ui.label(cell.to_string());
                                }
                            });
                        }
                    });
                });
        });
    });

    if shown.len() < rows.len() {
        ui.weak(format!("Showing the first {} rows.", shown.len()));
    }
}
