use std::collections::BTreeMap;
use std::fmt;

use super::stats::{self, Bin, BoxSummary};
use crate::data::model::{CategoricalField, NumericField, RecordTable};
use crate::error::{DashboardError, Result};

/// Bucket count used by every histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// Box plots always show this value column...
pub const BOX_VALUE: NumericField = NumericField::Value;
/// ...grouped by this category.
pub const BOX_CATEGORY: CategoricalField = CategoricalField::ShippingMethod;

// ---------------------------------------------------------------------------
// Chart kinds and field selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
    Scatter,
    Box,
    Heatmap,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Box,
        ChartKind::Heatmap,
        ChartKind::Histogram,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Pie => "Pie",
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
            ChartKind::Box => "Box",
            ChartKind::Heatmap => "Heatmap",
            ChartKind::Histogram => "Histogram",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The user's field bindings, shaped by what each chart kind accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// One pie per field.
    Pie(Vec<CategoricalField>),
    /// One bar chart per field.
    Bar(Vec<CategoricalField>),
    /// Yearly sums of one field.
    Line(NumericField),
    Scatter { x: NumericField, y: NumericField },
    /// Fixed to [`BOX_VALUE`] by [`BOX_CATEGORY`].
    Box,
    Heatmap(Vec<NumericField>),
    Histogram(NumericField),
}

impl FieldSelection {
    pub fn kind(&self) -> ChartKind {
        match self {
            FieldSelection::Pie(_) => ChartKind::Pie,
            FieldSelection::Bar(_) => ChartKind::Bar,
            FieldSelection::Line(_) => ChartKind::Line,
            FieldSelection::Scatter { .. } => ChartKind::Scatter,
            FieldSelection::Box => ChartKind::Box,
            FieldSelection::Heatmap(_) => ChartKind::Heatmap,
            FieldSelection::Histogram(_) => ChartKind::Histogram,
        }
    }
}

// ---------------------------------------------------------------------------
// Chart requests
// ---------------------------------------------------------------------------

/// Everything the renderer needs to draw one interaction's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    /// Section heading shown above the chart(s).
    pub heading: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Pie(Vec<Breakdown>),
    Bar(Vec<Breakdown>),
    Line(LineChart),
    Scatter(ScatterChart),
    Box(BoxChart),
    Heatmap(HeatmapChart),
    Histogram(HistogramChart),
}

/// Row frequency of each value of one categorical field.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub field: CategoricalField,
    pub title: String,
    pub counts: Vec<(String, usize)>,
}

impl Breakdown {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub field: NumericField,
    pub title: String,
    /// (calendar year, sum), ascending by year.
    pub points: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub x: NumericField,
    pub y: NumericField,
    pub title: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxChart {
    pub category: CategoricalField,
    pub value: NumericField,
    pub title: String,
    /// One summary per category value, in first-appearance order.
    pub groups: Vec<(String, BoxSummary)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapChart {
    pub fields: Vec<NumericField>,
    pub title: String,
    /// Row-major correlation matrix in `fields` order.
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub field: NumericField,
    pub title: String,
    pub bins: Vec<Bin>,
    /// Box summary drawn above the bars; `None` for an empty column.
    pub marginal: Option<BoxSummary>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Turn a field selection into a fully specified [`ChartRequest`] over `table`.
///
/// Pie, Bar and Heatmap need at least one field; an empty selection yields
/// [`DashboardError::IncompleteSelection`] and nothing should be drawn.
pub fn build_request(table: &RecordTable, selection: &FieldSelection) -> Result<ChartRequest> {
    let incomplete = || DashboardError::IncompleteSelection {
        kind: selection.kind(),
    };

    let (heading, body) = match selection {
        FieldSelection::Pie(fields) => {
            if fields.is_empty() {
                return Err(incomplete());
            }
            let pies = fields
                .iter()
                .map(|&field| {
                    let mut counts = stats::value_counts(table, field);
                    counts.sort_by(|a, b| b.1.cmp(&a.1));
                    Breakdown {
                        field,
                        title: format!("Pie Chart of {field}"),
                        counts,
                    }
                })
                .collect();
            ("Categorical Variables - Pie Charts".to_string(), ChartBody::Pie(pies))
        }
        FieldSelection::Bar(fields) => {
            if fields.is_empty() {
                return Err(incomplete());
            }
            let bars = fields
                .iter()
                .map(|&field| Breakdown {
                    field,
                    title: format!("Bar Plot of {field}"),
                    counts: stats::value_counts(table, field),
                })
                .collect();
            ("Categorical Variables - Bar Plots".to_string(), ChartBody::Bar(bars))
        }
        FieldSelection::Line(field) => (
            format!("Line Chart - {field} over Time"),
            ChartBody::Line(LineChart {
                field: *field,
                title: format!("Line Chart of {field} over Time"),
                points: stats::yearly_sums(table, *field),
            }),
        ),
        FieldSelection::Scatter { x, y } => {
            let points = table
                .rows
                .iter()
                .map(|r| [r.numeric(*x), r.numeric(*y)])
                .filter(|p| !p[0].is_nan() && !p[1].is_nan())
                .collect();
            (
                format!("Scatter Plot - {x} vs {y}"),
                ChartBody::Scatter(ScatterChart {
                    x: *x,
                    y: *y,
                    title: format!("Scatter Plot of {x} vs {y}"),
                    points,
                }),
            )
        }
        FieldSelection::Box => (
            "Box Plot - Value Distribution per Shipping Method".to_string(),
            ChartBody::Box(BoxChart {
                category: BOX_CATEGORY,
                value: BOX_VALUE,
                title: "Box Plot of Value Distribution by Shipping Method".to_string(),
                groups: box_groups(table, BOX_CATEGORY, BOX_VALUE),
            }),
        ),
        FieldSelection::Heatmap(fields) => {
            if fields.is_empty() {
                return Err(incomplete());
            }
            (
                "Heatmap of Numeric Variables".to_string(),
                ChartBody::Heatmap(HeatmapChart {
                    fields: fields.clone(),
                    title: "Heatmap of Selected Variables".to_string(),
                    matrix: stats::correlation_matrix(table, fields),
                }),
            )
        }
        FieldSelection::Histogram(field) => {
            let values: Vec<f64> = table.numeric(*field).collect();
            (
                format!("Histogram - {field}"),
                ChartBody::Histogram(HistogramChart {
                    field: *field,
                    title: format!("Histogram of {field}"),
                    bins: stats::histogram(&values, HISTOGRAM_BINS),
                    marginal: BoxSummary::from_values(&values),
                }),
            )
        }
    };

    Ok(ChartRequest { heading, body })
}

fn box_groups(
    table: &RecordTable,
    category: CategoricalField,
    value: NumericField,
) -> Vec<(String, BoxSummary)> {
    let mut order: Vec<&str> = Vec::new();
    let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        let key = row.categorical(category);
        values
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(row.numeric(value));
    }
    order
        .into_iter()
        .filter_map(|key| {
            let summary = BoxSummary::from_values(&values[key])?;
            Some((key.to_string(), summary))
        })
        .collect()
}
