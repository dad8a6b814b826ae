use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{
    self, Align2, Color32, FontId, Mesh, Pos2, Rect, RichText, ScrollArea, Sense, Shape, Stroke,
    Ui, Vec2,
};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::chart::request::{
    BoxChart, Breakdown, ChartBody, HeatmapChart, HistogramChart, LineChart, ScatterChart,
};
use crate::color::{ColorScale, generate_palette};
use crate::error::DashboardError;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;
const PIE_HEIGHT: f32 = 240.0;
const SERIES_COLOR: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the chart for the current request in the central panel.
pub fn chart_panel(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = match &state.status_message {
                Some(msg) => format!("{msg}\n\nOpen a file to continue  (File → Open…)"),
                None => "Open a file to view trade records  (File → Open…)".to_string(),
            };
            ui.heading(hint);
        });
        return;
    }

    let chart = match &state.chart {
        Some(Ok(chart)) => chart,
        Some(Err(e @ DashboardError::IncompleteSelection { .. })) => {
            ui.label(RichText::new(e.to_string()).color(Color32::YELLOW));
            return;
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
        None => return,
    };

    let (saturation, lightness) = state.preset.palette_tone();
    let scale = state.preset.heatmap_scale();

    ui.heading(&chart.heading);
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match &chart.body {
            ChartBody::Pie(pies) => {
                ui.columns(2, |cols: &mut [Ui]| {
                    for (i, breakdown) in pies.iter().enumerate() {
                        let colors = generate_palette(breakdown.counts.len(), saturation, lightness);
                        pie(&mut cols[i % 2], breakdown, &colors);
                    }
                });
            }
            ChartBody::Bar(bars) => {
                let colors = generate_palette(bars.len(), saturation, lightness);
                for (breakdown, color) in bars.iter().zip(colors) {
                    ui.strong(format!("Bar Plot - {}", breakdown.field));
                    bar_chart(ui, breakdown, color);
                    ui.add_space(8.0);
                }
            }
            ChartBody::Line(line) => line_chart(ui, line),
            ChartBody::Scatter(scatter) => scatter_chart(ui, scatter),
            ChartBody::Box(chart) => {
                let colors = generate_palette(chart.groups.len(), saturation, lightness);
                box_chart(ui, chart, &colors);
            }
            ChartBody::Heatmap(heatmap) => heatmap_chart(ui, heatmap, scale),
            ChartBody::Histogram(hist) => histogram_chart(ui, hist),
        });
}

// ---------------------------------------------------------------------------
// Categorical charts
// ---------------------------------------------------------------------------

/// Pie drawn as a triangle-fan mesh with a text legend underneath.
fn pie(ui: &mut Ui, breakdown: &Breakdown, colors: &[Color32]) {
    ui.strong(&breakdown.title);
    let total = breakdown.total();
    if total == 0 {
        ui.label("No rows in range.");
        return;
    }

    let (response, painter) =
        ui.allocate_painter(Vec2::new(ui.available_width(), PIE_HEIGHT), Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = (rect.width().min(rect.height()) / 2.0 - 8.0).max(4.0);

    let mut mesh = Mesh::default();
    let mut angle = -FRAC_PI_2;
    for ((_, count), &color) in breakdown.counts.iter().zip(colors) {
        let sweep = *count as f32 / total as f32 * TAU;
        let steps = ((sweep / 0.05).ceil() as usize).max(1);
        let hub = mesh.vertices.len() as u32;
        mesh.colored_vertex(center, color);
        for s in 0..=steps {
            let a = angle + sweep * s as f32 / steps as f32;
            mesh.colored_vertex(center + radius * Vec2::angled(a), color);
        }
        for s in 0..steps as u32 {
            mesh.add_triangle(hub, hub + 1 + s, hub + 2 + s);
        }
        angle += sweep;
    }
    painter.add(Shape::mesh(mesh));

    for ((label, count), &color) in breakdown.counts.iter().zip(colors) {
        ui.horizontal(|ui: &mut Ui| {
            ui.colored_label(color, "■");
            let pct = *count as f64 / total as f64 * 100.0;
            ui.label(format!("{label}: {count} ({pct:.1}%)"));
        });
    }
}

fn bar_chart(ui: &mut Ui, breakdown: &Breakdown, color: Color32) {
    let bars: Vec<Bar> = breakdown
        .counts
        .iter()
        .enumerate()
        .map(|(i, (label, count))| Bar::new(i as f64, *count as f64).name(label).width(0.7))
        .collect();
    let labels: Vec<String> = breakdown.counts.iter().map(|(l, _)| l.clone()).collect();

    Plot::new(("bar", breakdown.field.name()))
        .height(CHART_HEIGHT)
        .x_axis_label(breakdown.field.name())
        .y_axis_label("count")
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(&breakdown.title));
        });
}

/// Axis text for integer ticks that land on a category; blank otherwise.
fn category_label(labels: &[String], value: f64) -> String {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Numeric charts
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, line: &LineChart) {
    if line.points.is_empty() {
        ui.label("No dated rows in range.");
        return;
    }
    let points: Vec<[f64; 2]> = line
        .points
        .iter()
        .map(|&(year, sum)| [f64::from(year), sum])
        .collect();

    Plot::new("line_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(line.field.name())
        .x_axis_formatter(|mark: GridMark, _range| {
            if mark.value.fract() == 0.0 {
                format!("{}", mark.value as i64)
            } else {
                String::new()
            }
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name(&line.title)
                    .color(SERIES_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(SERIES_COLOR)
                    .radius(4.0),
            );
        });
}

fn scatter_chart(ui: &mut Ui, scatter: &ScatterChart) {
    Plot::new("scatter_chart")
        .height(CHART_HEIGHT)
        .x_axis_label(scatter.x.name())
        .y_axis_label(scatter.y.name())
        .allow_boxed_zoom(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(scatter.points.clone()))
                    .name(&scatter.title)
                    .color(SERIES_COLOR)
                    .radius(2.0),
            );
        });
}

fn box_chart(ui: &mut Ui, chart: &BoxChart, colors: &[Color32]) {
    ui.strong(&chart.title);
    let labels: Vec<String> = chart.groups.iter().map(|(l, _)| l.clone()).collect();

    Plot::new("box_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.category.name())
        .y_axis_label(chart.value.name())
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, ((label, summary), &color)) in chart.groups.iter().zip(colors).enumerate() {
                let x = i as f64;
                let spread = BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                );
                let elem = BoxElem::new(x, spread).name(label).box_width(0.5);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label).color(color));

                if !summary.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> =
                        summary.outliers.iter().map(|&v| [x, v]).collect();
                    plot_ui.points(Points::new(PlotPoints::from(outliers)).color(color).radius(2.5));
                }
            }
        });
}

/// Bars for the 30 buckets with the box summary floating above them.
fn histogram_chart(ui: &mut Ui, hist: &HistogramChart) {
    ui.strong(&hist.title);
    let bars: Vec<Bar> = hist
        .bins
        .iter()
        .map(|b| {
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64)
                .width(b.upper - b.lower)
                .name(format!("{:.2} – {:.2}", b.lower, b.upper))
        })
        .collect();
    let peak = hist.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;

    Plot::new("histogram_chart")
        .height(CHART_HEIGHT)
        .x_axis_label(hist.field.name())
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(SERIES_COLOR).name(&hist.title));
            if let Some(summary) = &hist.marginal {
                let spread = BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                );
                let y = (peak * 1.15).max(1.0);
                let elem = BoxElem::new(y, spread).box_width((peak * 0.1).max(0.5));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal().color(SERIES_COLOR));
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn heatmap_chart(ui: &mut Ui, heatmap: &HeatmapChart, scale: ColorScale) {
    ui.strong(&heatmap.title);
    let n = heatmap.fields.len();
    let label_width = 80.0;
    let cell = ((ui.available_width() - label_width) / n as f32).clamp(40.0, 140.0);
    let size = Vec2::new(label_width + cell * n as f32, label_width * 0.4 + cell * n as f32);

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + Vec2::new(label_width, label_width * 0.4);
    let font = FontId::proportional(13.0);
    let text_color = ui.visuals().text_color();

    for (j, field) in heatmap.fields.iter().enumerate() {
        let top = Pos2::new(origin.x + cell * (j as f32 + 0.5), origin.y - 4.0);
        painter.text(top, Align2::CENTER_BOTTOM, field.name(), font.clone(), text_color);
    }

    for (i, row) in heatmap.matrix.iter().enumerate() {
        let left = Pos2::new(origin.x - 6.0, origin.y + cell * (i as f32 + 0.5));
        painter.text(left, Align2::RIGHT_CENTER, heatmap.fields[i].name(), font.clone(), text_color);

        for (j, &r) in row.iter().enumerate() {
            let min = origin + Vec2::new(cell * j as f32, cell * i as f32);
            let rect = Rect::from_min_size(min, Vec2::splat(cell));
            let fill = scale.for_correlation(r);
            painter.rect_filled(rect.shrink(1.0), 0.0, fill);

            let label = if r.is_nan() { "n/a".to_string() } else { format!("{r:.2}") };
            painter.text(rect.center(), Align2::CENTER_CENTER, label, font.clone(), contrast(fill));
        }
    }
    painter.rect_stroke(
        Rect::from_min_size(origin, Vec2::splat(cell * n as f32)),
        0.0,
        Stroke::new(1.0, text_color),
        egui::StrokeKind::Outside,
    );

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Correlation");
        for t in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            ui.colored_label(scale.for_correlation(t), format!("■ {t:+.1}"));
        }
    });
}

/// Black or white text, whichever reads better on `fill`.
fn contrast(fill: Color32) -> Color32 {
    let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
