use std::path::Path;

use eframe::egui::{self, Color32, Grid, RichText, ScrollArea, Ui};

use crate::data::chart::ChartKind;
use crate::data::export::ExportFormat;
use crate::data::loader::SourceFormat;
use crate::data::model::{ColumnKind, Dataset};
use crate::state::{AppState, Severity};
use crate::transform::AggFunction;
use crate::transform::dispatch::{OperationKind, ParamForm};

// ---------------------------------------------------------------------------
// Left side panel – operation selector and parameter widgets
// ---------------------------------------------------------------------------

/// Render the left operations panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Wrangling Operations");
    ui.separator();

    let Some(dataset) = &state.working else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the panel.
    let columns = dataset.column_names();
    let text_columns = text_columns(dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select an operation");
            egui::ComboBox::from_id_salt("operation_select")
                .selected_text(state.operation.map_or("(none)", OperationKind::label))
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in OperationKind::ALL {
                        ui.selectable_value(&mut state.operation, Some(kind), kind.label());
                    }
                });
            ui.add_space(4.0);

            if let Some(kind) = state.operation {
                operation_params(ui, kind, &mut state.params, &columns, &text_columns);
                ui.add_space(4.0);
            }

            ui.horizontal(|ui: &mut Ui| {
                let can_apply = state.operation.is_some();
                if ui.add_enabled(can_apply, egui::Button::new("Apply")).clicked() {
                    state.apply_operation();
                }
                if ui.button("Reset").clicked() {
                    state.reset();
                }
            });

            ui.separator();
            explore_section(ui, state, &columns);
            ui.separator();
            visualize_section(ui, state, &columns);
        });
}

fn text_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .columns()
        .iter()
        .filter(|c| matches!(c.kind(), ColumnKind::Text))
        .map(|c| c.name.clone())
        .collect()
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, columns: &[String], selected: &mut Option<String>) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.as_deref().unwrap_or("(none)"))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                ui.selectable_value(selected, Some(col.clone()), col.as_str());
            }
        });
}

fn text_field(ui: &mut Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.text_edit_singleline(value);
}

fn operation_params(
    ui: &mut Ui,
    kind: OperationKind,
    p: &mut ParamForm,
    columns: &[String],
    text_columns: &[String],
) {
    match kind {
        OperationKind::Sort => {
            column_combo(ui, "sort_column", "Select column to sort by:", columns, &mut p.column);
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut p.ascending, true, "Ascending");
                ui.radio_value(&mut p.ascending, false, "Descending");
            });
        }
        OperationKind::Filter => {
            column_combo(ui, "filter_column", "Select column to filter:", columns, &mut p.column);
            text_field(ui, "Enter filter value:", &mut p.filter_value);
        }
        OperationKind::DropColumn => {
            column_combo(ui, "drop_column", "Select column to drop:", columns, &mut p.column);
        }
        OperationKind::SelectColumns => {
            ui.label("Select columns to keep:");
            for col in columns {
                let mut checked = p.columns.contains(col);
                if ui.checkbox(&mut checked, col.as_str()).changed() {
                    if checked {
                        p.columns.push(col.clone());
                    } else {
                        p.columns.retain(|c| c != col);
                    }
                }
            }
        }
        OperationKind::RenameColumn => {
            column_combo(ui, "rename_column", "Select column to rename:", columns, &mut p.column);
            text_field(ui, "Enter new column name:", &mut p.new_name);
        }
        OperationKind::DropMissing | OperationKind::DropDuplicates | OperationKind::StripWhitespace => {
            ui.weak("No parameters.");
        }
        OperationKind::Lowercase => {
            column_combo(ui, "lowercase_column", "Select column to convert to lowercase:", text_columns, &mut p.column);
        }
        OperationKind::Uppercase => {
            column_combo(ui, "uppercase_column", "Select column to convert to uppercase:", text_columns, &mut p.column);
        }
        OperationKind::FillMissing => {
            column_combo(ui, "fill_missing_column", "Select column to fill missing values:", columns, &mut p.column);
            text_field(ui, "Enter value to fill missing data:", &mut p.fill_value);
        }
        OperationKind::FindReplace => {
            column_combo(ui, "find_replace_column", "Select column for find and replace:", columns, &mut p.column);
            text_field(ui, "Enter value to find:", &mut p.find);
            text_field(ui, "Enter value to replace with:", &mut p.replace);
            ui.checkbox(&mut p.whole_cell, "Match entire cell");
        }
        OperationKind::GroupAggregate => {
            column_combo(ui, "group_column", "Select column to group by:", columns, &mut p.group_column);
            column_combo(ui, "agg_column", "Select column to aggregate:", columns, &mut p.agg_column);
            ui.label("Select aggregation function:");
            egui::ComboBox::from_id_salt("agg_function")
                .selected_text(p.agg_function.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for f in AggFunction::ALL {
                        ui.selectable_value(&mut p.agg_function, f, f.to_string());
                    }
                });
        }
        OperationKind::SplitText => {
            column_combo(ui, "split_column", "Select column to split:", text_columns, &mut p.column);
            text_field(ui, "Enter separator:", &mut p.separator);
            ui.label("Maximum number of splits (-1 for no limit):");
            ui.add(egui::DragValue::new(&mut p.max_splits).range(-1..=1000));
            text_field(
                ui,
                "New column names (comma-separated, blank for defaults):",
                &mut p.split_names,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Explore / visualize toggles
// ---------------------------------------------------------------------------

fn explore_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    ui.checkbox(&mut state.explore, "Explore column data");
    if !state.explore {
        return;
    }
    column_combo(ui, "explore_column", "Select column to explore:", columns, &mut state.explore_column);

    match state.column_profile() {
        Some(Ok(profile)) => {
            ui.label(format!("Data type: {}", profile.kind));
            ui.label(format!("Missing values: {}", profile.missing));
            ui.label("Value counts:");
            ScrollArea::vertical()
                .id_salt("value_counts")
                .max_height(200.0)
                .show(ui, |ui: &mut Ui| {
                    Grid::new("value_counts_grid").striped(true).show(ui, |ui: &mut Ui| {
                        for (value, count) in &profile.value_counts {
                            ui.label(value.to_string());
                            ui.label(count.to_string());
                            ui.end_row();
                        }
                    });
                });
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
        None => {}
    }
}

fn visualize_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    ui.checkbox(&mut state.visualize, "Visualize data");
    if !state.visualize {
        return;
    }
    let chart = &mut state.chart;

    ui.label("Select chart type:");
    egui::ComboBox::from_id_salt("viz_chart_type")
        .selected_text(chart.kind.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut chart.kind, kind, kind.to_string());
            }
        });

    if chart.kind.needs_y() {
        column_combo(ui, "viz_x_column", "Select X-axis column:", columns, &mut chart.x);
        column_combo(ui, "viz_y_column", "Select Y-axis column:", columns, &mut chart.y);
    } else {
        column_combo(ui, "viz_hist_column", "Select column for histogram:", columns, &mut chart.x);
    }

    column_combo(
        ui,
        "viz_filter_column",
        "Select column to filter:",
        columns,
        &mut chart.filter_column,
    );
    if chart.filter_column.is_some() {
        text_field(ui, "Enter filter value:", &mut chart.filter_value);
        if ui.small_button("Clear filter").clicked() {
            chart.filter_column = None;
            chart.filter_value.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.add_enabled_ui(state.working.is_some(), |ui: &mut Ui| {
                ui.menu_button("Export", |ui: &mut Ui| {
                    for format in ExportFormat::ALL {
                        if ui.button(format.label()).clicked() {
                            export_file_dialog(state, format);
                            ui.close_menu();
                        }
                    }
                });
            });
        });

        ui.separator();

        if let Some(ds) = &state.working {
            let name = state.source_name.as_deref().unwrap_or("data");
            ui.label(format!("{name}: {} rows × {} columns", ds.len(), ds.width()));
            ui.separator();
        }

        if let Some(diag) = &state.diagnostic {
            let color = match diag.severity {
                Severity::Info => Color32::LIGHT_GREEN,
                Severity::Warning => Color32::from_rgb(230, 150, 30),
                Severity::Error => Color32::RED,
            };
            ui.label(RichText::new(&diag.message).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", SourceFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "xlsm", "ods"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState, format: ExportFormat) {
    let default_name = Path::new(&state.config.export_file_name)
        .with_extension(format.extension())
        .to_string_lossy()
        .into_owned();

    let file = rfd::FileDialog::new()
        .set_title("Export data")
        .set_file_name(default_name)
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        // failures are already recorded as the status message
        let _ = state.export_to(&path, format);
    }
}
