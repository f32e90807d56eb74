use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::chart::{ChartKind, ChartSpec};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart (central panel, below the tables)
// ---------------------------------------------------------------------------

/// Render the visualization section for the working dataset.
pub fn chart_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Visualization");
    match state.chart_spec() {
        Some(Ok(spec)) => {
            if spec.skipped_rows > 0 {
                ui.weak(format!(
                    "{} rows without a usable value were left out.",
                    spec.skipped_rows
                ));
            }
            chart(ui, &spec);
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::from_rgb(230, 150, 30)));
        }
        None => {}
    }
}

/// Render a chart description with egui_plot.
pub fn chart(ui: &mut Ui, spec: &ChartSpec) {
    let colors = spec
        .categories
        .as_deref()
        .map_or_else(ColorMap::uniform, ColorMap::new);

    let mut plot = Plot::new("wrangler_chart")
        .legend(Legend::default())
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .height(360.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    // Categorical axis: label integer ticks only.
    if let Some(labels) = spec.categories.clone() {
        plot = plot.x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        });
    }

    plot.show(ui, |plot_ui| match spec.kind {
        ChartKind::Bar | ChartKind::Histogram => {
            let bars: Vec<Bar> = spec
                .points
                .iter()
                .map(|&[x, y]| {
                    let label = spec
                        .categories
                        .as_ref()
                        .and_then(|c| c.get(x as usize))
                        .map_or("", String::as_str);
                    Bar::new(x, y)
                        .width(spec.bar_width)
                        .fill(colors.color_for(label))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&spec.y_label));
        }
        ChartKind::Line => {
            let line = Line::new(PlotPoints::from(spec.points.clone()))
                .name(&spec.y_label)
                .color(Color32::LIGHT_BLUE)
                .width(1.5);
            plot_ui.line(line);
        }
        ChartKind::Scatter => {
            let points = Points::new(PlotPoints::from(spec.points.clone()))
                .name(&spec.y_label)
                .color(Color32::LIGHT_BLUE)
                .radius(3.0);
            plot_ui.points(points);
        }
    });
}
