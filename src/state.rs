use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::chart::request::{ChartKind, ChartRequest, FieldSelection};
use crate::chart::{DashboardRequest, run_pipeline};
use crate::config::{DashboardConfig, Preset};
use crate::data::filter::DateRange;
use crate::data::loader::load_table;
use crate::data::model::{CategoricalField, NumericField, RecordTable};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Sidebar controls
// ---------------------------------------------------------------------------

/// Current values of every sidebar widget. Only the widgets for the active
/// chart kind are shown, but all values are kept so switching back and forth
/// does not lose a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartControls {
    pub kind: ChartKind,
    pub pie_fields: Vec<CategoricalField>,
    pub bar_fields: Vec<CategoricalField>,
    pub line_field: NumericField,
    pub scatter_x: NumericField,
    pub scatter_y: NumericField,
    pub heatmap_fields: Vec<NumericField>,
    pub histogram_field: NumericField,
    /// Picked range bounds; `None` until a table with valid dates is loaded.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ChartControls {
    pub fn new(preset: Preset) -> Self {
        Self {
            kind: ChartKind::Pie,
            pie_fields: preset.pie_fields().to_vec(),
            bar_fields: preset.bar_fields().to_vec(),
            line_field: NumericField::Quantity,
            scatter_x: NumericField::Quantity,
            scatter_y: NumericField::Value,
            heatmap_fields: NumericField::ALL.to_vec(),
            histogram_field: NumericField::Quantity,
            date_range: None,
        }
    }

    /// Snapshot the controls into an immutable request.
    pub fn request(&self) -> DashboardRequest {
        let selection = match self.kind {
            ChartKind::Pie => FieldSelection::Pie(self.pie_fields.clone()),
            ChartKind::Bar => FieldSelection::Bar(self.bar_fields.clone()),
            ChartKind::Line => FieldSelection::Line(self.line_field),
            ChartKind::Scatter => FieldSelection::Scatter {
                x: self.scatter_x,
                y: self.scatter_y,
            },
            ChartKind::Box => FieldSelection::Box,
            ChartKind::Heatmap => FieldSelection::Heatmap(self.heatmap_fields.clone()),
            ChartKind::Histogram => FieldSelection::Histogram(self.histogram_field),
        };
        DashboardRequest {
            range: self.date_range.map(|(a, b)| DateRange::new(a, b)),
            selection,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub preset: Preset,

    /// Path of the loaded (or last attempted) records file.
    pub data_path: Option<PathBuf>,

    /// Loaded table (None until a file loads successfully).
    pub table: Option<RecordTable>,

    pub controls: ChartControls,

    /// Result of the last pipeline run (cached until controls change).
    pub chart: Option<Result<ChartRequest, DashboardError>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}

impl AppState {
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            data_path: None,
            table: None,
            controls: ChartControls::new(preset),
            chart: None,
            status_message: None,
        }
    }

    /// Build the state from configuration and try to load the configured file.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let mut state = Self::new(config.preset);
        state.load_path(&config.data_path);
        state
    }

    /// Load a records file, replacing the current table on success.
    pub fn load_path(&mut self, path: &Path) {
        self.data_path = Some(path.to_path_buf());
        match load_table(path) {
            Ok(table) => {
                log::info!("Loaded {} trade records from {}", table.len(), path.display());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.table = None;
                self.chart = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded table and reset the date range to its bounds.
    pub fn set_table(&mut self, table: RecordTable) {
        self.controls.date_range = table.date_bounds();
        self.table = Some(table);
        self.status_message = None;
        self.refresh();
    }

    /// Switch presets, resetting the preset-dependent selections.
    pub fn set_preset(&mut self, preset: Preset) {
        if preset == self.preset {
            return;
        }
        self.preset = preset;
        self.controls.pie_fields = preset.pie_fields().to_vec();
        self.controls.bar_fields = preset.bar_fields().to_vec();
        self.refresh();
    }

    /// Re-run filter → build for the current controls.
    pub fn refresh(&mut self) {
        self.chart = self.table.as_ref().map(|table| {
            let request = self.controls.request();
            log::debug!("building {} chart", request.selection.kind());
            run_pipeline(table, request)
        });
    }

    /// Number of rows inside the current date range.
    pub fn rows_in_range(&self) -> usize {
        let Some(table) = &self.table else {
            return 0;
        };
        match self.controls.request().range {
            Some(range) => table.rows.iter().filter(|r| range.contains(r.date)).count(),
            None => table.len(),
        }
    }
}

/// Toggle membership of `item` in `selected`, keeping `options` order.
pub fn toggle_field<T: Copy + PartialEq>(selected: &mut Vec<T>, options: &[T], item: T) {
    if selected.contains(&item) {
        selected.retain(|f| *f != item);
    } else {
        selected.push(item);
        selected.sort_by_key(|f| options.iter().position(|o| o == f).unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::request::ChartBody;
    use crate::data::model::fixtures::{two_year_table, ymd};

    #[test]
    fn new_table_selects_its_full_date_range() {
        let mut state = AppState::default();
        state.set_table(two_year_table());

        assert_eq!(
            state.controls.date_range,
            Some((ymd(2021, 1, 1), ymd(2022, 12, 1)))
        );
        assert_eq!(state.rows_in_range(), 24);
        let chart = state.chart.as_ref().unwrap().as_ref().unwrap();
        assert!(matches!(chart.body, ChartBody::Pie(_)));
    }

    #[test]
    fn clearing_pie_fields_suppresses_the_chart() {
        let mut state = AppState::default();
        state.set_table(two_year_table());
        state.controls.pie_fields.clear();
        state.refresh();

        assert!(matches!(
            state.chart,
            Some(Err(DashboardError::IncompleteSelection { kind: ChartKind::Pie }))
        ));
    }

    #[test]
    fn narrowing_the_range_changes_the_chart() {
        let mut state = AppState::default();
        state.set_table(two_year_table());
        state.controls.kind = ChartKind::Line;
        state.controls.date_range = Some((ymd(2022, 12, 31), ymd(2022, 1, 1)));
        state.refresh();

        let Some(Ok(chart)) = &state.chart else {
            panic!("expected a chart");
        };
        let ChartBody::Line(line) = &chart.body else {
            panic!("expected line chart");
        };
        assert_eq!(line.points.len(), 1);
        assert_eq!(line.points[0].0, 2022);
        assert_eq!(state.rows_in_range(), 12);
    }

    #[test]
    fn missing_file_leaves_an_error_message() {
        let mut state = AppState::default();
        state.load_path(Path::new("/no/such/Imports_Exports_Dataset.csv"));
        assert!(state.table.is_none());
        assert!(state.chart.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn preset_switch_resets_categorical_defaults() {
        let mut state = AppState::default();
        state.controls.pie_fields.clear();
        state.set_preset(Preset::Vivid);
        assert_eq!(state.controls.pie_fields, Preset::Vivid.pie_fields());
        assert_eq!(state.controls.bar_fields, Preset::Vivid.bar_fields());
    }

    #[test]
    fn toggling_keeps_option_order() {
        let options = Preset::Classic.pie_fields();
        let mut selected = options.to_vec();
        toggle_field(&mut selected, options, CategoricalField::ImportExport);
        assert!(!selected.contains(&CategoricalField::ImportExport));
        toggle_field(&mut selected, options, CategoricalField::ImportExport);
        assert_eq!(selected, options);
    }
}
