use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::chart::request::{BOX_CATEGORY, BOX_VALUE, ChartKind};
use crate::config::Preset;
use crate::data::model::NumericField;
use crate::state::{AppState, toggle_field};

// ---------------------------------------------------------------------------
// Left side panel – chart type and filter widgets
// ---------------------------------------------------------------------------

/// Render the left sidebar. Any change re-runs the pipeline once at the end.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select Chart Type");
            let current = state.controls.kind;
            egui::ComboBox::from_id_salt("chart_type")
                .selected_text(current.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in ChartKind::ALL {
                        changed |= ui
                            .selectable_value(&mut state.controls.kind, kind, kind.label())
                            .changed();
                    }
                });
            ui.separator();

            ui.heading("Filter Options");
            changed |= field_widgets(ui, state);
            ui.separator();

            changed |= date_range_widgets(ui, state);
            ui.separator();

            ui.strong("Preset");
            let mut preset = state.preset;
            egui::ComboBox::from_id_salt("preset")
                .selected_text(preset.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for p in Preset::ALL {
                        ui.selectable_value(&mut preset, p, p.label());
                    }
                });
            if preset != state.preset {
                // set_preset refreshes on its own.
                state.set_preset(preset);
            }
        });

    if changed {
        state.refresh();
    }
}

/// Field selectors for the active chart kind.
fn field_widgets(ui: &mut Ui, state: &mut AppState) -> bool {
    let preset = state.preset;
    let controls = &mut state.controls;
    match controls.kind {
        ChartKind::Pie => {
            ui.label("Select Categorical Variables for Visualization");
            checklist(ui, preset.pie_fields(), &mut controls.pie_fields)
        }
        ChartKind::Bar => {
            ui.label("Select Categorical Variables for Visualization");
            checklist(ui, preset.bar_fields(), &mut controls.bar_fields)
        }
        ChartKind::Box => {
            ui.label(format!("{BOX_VALUE} by {BOX_CATEGORY}"));
            false
        }
        ChartKind::Line => numeric_combo(
            ui,
            "line_y",
            "Select Variable for Y-axis",
            &mut controls.line_field,
        ),
        ChartKind::Scatter => {
            let x = numeric_combo(
                ui,
                "scatter_x",
                "Select X-axis for Scatter Plot",
                &mut controls.scatter_x,
            );
            let y = numeric_combo(
                ui,
                "scatter_y",
                "Select Y-axis for Scatter Plot",
                &mut controls.scatter_y,
            );
            x || y
        }
        ChartKind::Heatmap => {
            ui.label("Select Numeric Variables for Heatmap");
            checklist(ui, &NumericField::ALL, &mut controls.heatmap_fields)
        }
        ChartKind::Histogram => numeric_combo(
            ui,
            "histogram_field",
            "Select Numeric Variable for Histogram",
            &mut controls.histogram_field,
        ),
    }
}

/// Multi-select as a list of checkboxes with All / None shortcuts.
fn checklist<T: Copy + PartialEq + Display>(ui: &mut Ui, options: &[T], selected: &mut Vec<T>) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            *selected = options.to_vec();
            changed = true;
        }
        if ui.small_button("None").clicked() {
            selected.clear();
            changed = true;
        }
    });
    for &option in options {
        let mut checked = selected.contains(&option);
        if ui.checkbox(&mut checked, option.to_string()).changed() {
            toggle_field(selected, options, option);
            changed = true;
        }
    }
    if selected.is_empty() {
        ui.label(RichText::new("Select at least one field.").color(Color32::YELLOW));
    }
    changed
}

fn numeric_combo(ui: &mut Ui, id: &str, label: &str, current: &mut NumericField) -> bool {
    let mut changed = false;
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.name())
        .show_ui(ui, |ui: &mut Ui| {
            for field in NumericField::ALL {
                changed |= ui.selectable_value(current, field, field.name()).changed();
            }
        });
    changed
}

fn date_range_widgets(ui: &mut Ui, state: &mut AppState) -> bool {
    ui.strong("Select Date Range:");
    let bounds = state.table.as_ref().and_then(|t| t.date_bounds());
    let Some((start, end)) = state.controls.date_range.as_mut() else {
        ui.label("No valid dates in the dataset.");
        return false;
    };

    let mut changed = false;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        changed |= ui.add(DatePickerButton::new(start).id_salt("date_start")).changed();
        ui.end_row();
        ui.label("To");
        changed |= ui.add(DatePickerButton::new(end).id_salt("date_end")).changed();
        ui.end_row();
    });

    if let Some(bounds) = bounds {
        if ui.small_button("Full range").clicked() {
            state.controls.date_range = Some(bounds);
            changed = true;
        }
    }
    changed
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
            if ui.button("Reload").clicked() {
                if let Some(path) = state.data_path.clone() {
                    state.load_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("Import Export Dashboard");
        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} in range",
                table.len(),
                state.rows_in_range()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open trade records")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
