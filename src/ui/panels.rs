use eframe::egui::{self, Ui};

use crate::data::cache::DatasetCache;
use crate::data::model::YearInterval;
use crate::state::{AppState, Session};

const ABOUT_TEXT: &str = "This application is a small end-to-end exploration of the \
    CORD-19 metadata: the table is cleaned once on load, and every change of the year \
    range recomputes the yearly counts, the top journals, the title word cloud and \
    the sample rows from the cleaned data.";

// ---------------------------------------------------------------------------
// Left side panel – year range and about text
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.label("Use the controls below to customize the data displayed.");
    ui.separator();

    match state.explorer() {
        Some(explorer) => {
            let (min, max) = explorer.bounds;
            let mut start = explorer.interval.start;
            let mut end = explorer.interval.end;

            ui.strong("Select a year range for analysis");
            let start_changed = ui
                .add(egui::Slider::new(&mut start, min..=max).text("from"))
                .changed();
            let end_changed = ui
                .add(egui::Slider::new(&mut end, min..=max).text("to"))
                .changed();

            // The dragged handle pushes the other one rather than crossing it.
            if start_changed && start > end {
                end = start;
            }
            if end_changed && end < start {
                start = end;
            }
            if start_changed || end_changed {
                state.set_interval(YearInterval::new(start, end));
            }
        }
        None => {
            ui.label("No dataset loaded.");
        }
    }

    ui.add_space(16.0);
    ui.heading("About This App");
    ui.separator();
    ui.label(ABOUT_TEXT);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, cache: &DatasetCache) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, cache);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload(cache);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.source.display().to_string());

        if let Some(explorer) = state.explorer() {
            ui.separator();
            ui.label(format!(
                "{} papers loaded, {} in range",
                explorer.dataset.len(),
                explorer.report.paper_count
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, cache: &DatasetCache) {
    let file = rfd::FileDialog::new()
        .set_title("Open paper metadata")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(cache, path);
        match &state.session {
            Session::Ready(explorer) => log::info!(
                "Opened {} with {} cleaned records",
                state.source.display(),
                explorer.dataset.len()
            ),
            Session::Halted { notice } => log::error!("Failed to open file: {notice}"),
        }
    }
}
