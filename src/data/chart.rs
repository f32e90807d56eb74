use std::collections::HashMap;
use std::fmt;

use super::filter::column_match_rows;
use super::model::{Cell, Dataset};
use crate::error::{Result, WrangleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Histogram,
    ];

    pub fn needs_y(self) -> bool {
        !matches!(self, ChartKind::Histogram)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
            ChartKind::Histogram => "Histogram",
        };
        write!(f, "{name}")
    }
}

/// User selections from the visualization panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    /// Optional single-column substring pre-filter.
    pub filter_column: Option<String>,
    pub filter_value: String,
}

/// Renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// Axis labels when x is categorical; point `i` sits at x = i.
    pub categories: Option<Vec<String>>,
    pub points: Vec<[f64; 2]>,
    /// Bar width for bar charts and histograms.
    pub bar_width: f64,
    /// Rows left out because x was missing or y was not numeric.
    pub skipped_rows: usize,
}

/// Map the dataset and selections to a chart description.
pub fn build_chart(dataset: &Dataset, request: &ChartRequest, max_bins: usize) -> Result<ChartSpec> {
    let x_name = request
        .x
        .as_deref()
        .ok_or_else(|| WrangleError::ChartConfig("select an X-axis column".to_string()))?;
    let y_name = match (request.kind.needs_y(), request.y.as_deref()) {
        (true, None) => {
            return Err(WrangleError::ChartConfig("select a Y-axis column".to_string()));
        }
        (true, Some(y)) => Some(y),
        (false, _) => None,
    };

    let rows = match &request.filter_column {
        Some(col) => column_match_rows(dataset, col, Some(request.filter_value.as_str()))?,
        None => (0..dataset.len()).collect(),
    };

    let x_cells: Vec<&Cell> = {
        let col = dataset.column(x_name)?;
        rows.iter().map(|&r| &col.cells[r]).collect()
    };

    match y_name {
        Some(y_name) => {
            let col = dataset.column(y_name)?;
            let y_cells: Vec<&Cell> = rows.iter().map(|&r| &col.cells[r]).collect();
            Ok(xy_chart(request.kind, x_name, y_name, &x_cells, &y_cells))
        }
        None => Ok(histogram(x_name, &x_cells, max_bins)),
    }
}

/// Categorical axis: labels in order of first appearance.
struct CategoryAxis {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryAxis {
    fn new() -> Self {
        Self {
            labels: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn position(&mut self, label: String) -> usize {
        if let Some(&i) = self.index.get(&label) {
            return i;
        }
        let i = self.labels.len();
        self.index.insert(label.clone(), i);
        self.labels.push(label);
        i
    }
}

fn is_numeric_axis(cells: &[&Cell]) -> bool {
    cells
        .iter()
        .filter(|c| !c.is_missing())
        .all(|c| matches!(c, Cell::Number(_)))
}

fn xy_chart(kind: ChartKind, x_name: &str, y_name: &str, xs: &[&Cell], ys: &[&Cell]) -> ChartSpec {
    let numeric_x = is_numeric_axis(xs);
    let mut axis = CategoryAxis::new();
    let mut points: Vec<[f64; 2]> = Vec::new();
    let mut skipped_rows = 0;

    for (x, y) in xs.iter().zip(ys) {
        let (Some(y), false) = (y.to_number(), x.is_missing()) else {
            skipped_rows += 1;
            continue;
        };
        let x = match x {
            Cell::Number(v) if numeric_x => *v,
            other => axis.position(other.search_text().into_owned()) as f64,
        };
        points.push([x, y]);
    }

    if kind == ChartKind::Bar {
        points = sum_by_position(points);
    }

    ChartSpec {
        kind,
        x_label: x_name.to_string(),
        y_label: y_name.to_string(),
        categories: (!numeric_x).then_some(axis.labels),
        points,
        bar_width: 0.8,
        skipped_rows,
    }
}

/// Bars sharing an x position are drawn as one stacked bar.
fn sum_by_position(points: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    let mut summed: Vec<[f64; 2]> = Vec::new();
    let mut slot: HashMap<u64, usize> = HashMap::new();
    for [x, y] in points {
        match slot.get(&x.to_bits()) {
            Some(&i) => summed[i][1] += y,
            None => {
                slot.insert(x.to_bits(), summed.len());
                summed.push([x, y]);
            }
        }
    }
    summed
}

fn histogram(x_name: &str, xs: &[&Cell], max_bins: usize) -> ChartSpec {
    let present: Vec<&Cell> = xs.iter().copied().filter(|c| !c.is_missing()).collect();
    let skipped_rows = xs.len() - present.len();

    let base = ChartSpec {
        kind: ChartKind::Histogram,
        x_label: x_name.to_string(),
        y_label: "count".to_string(),
        categories: None,
        points: Vec::new(),
        bar_width: 0.8,
        skipped_rows,
    };

    if !is_numeric_axis(&present) {
        let mut axis = CategoryAxis::new();
        let mut counts: Vec<f64> = Vec::new();
        for cell in present {
            let i = axis.position(cell.search_text().into_owned());
            if i == counts.len() {
                counts.push(0.0);
            }
            counts[i] += 1.0;
        }
        let points = counts.iter().enumerate().map(|(i, &n)| [i as f64, n]).collect();
        return ChartSpec {
            categories: Some(axis.labels),
            points,
            ..base
        };
    }

    let values: Vec<f64> = present.iter().filter_map(|c| c.to_number()).collect();
    if values.is_empty() {
        return base;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return ChartSpec {
            points: vec![[min, values.len() as f64]],
            bar_width: 1.0,
            ..base
        };
    }

    let bins = ((values.len() as f64).sqrt().ceil() as usize).clamp(1, max_bins.max(1));
    let width = range / bins as f64;
    let mut counts = vec![0.0; bins];
    for v in &values {
        // the maximum lands in the last bin
        let i = (((v - min) / width) as usize).min(bins - 1);
        counts[i] += 1.0;
    }
    let points = counts
        .iter()
        .enumerate()
        .map(|(i, &n)| [min + width * (i as f64 + 0.5), n])
        .collect();

    ChartSpec {
        points,
        bar_width: width,
        ..base
    }
}
