use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Ui, vec2};
use egui_extras::{Column, TableBuilder, TableRow};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::color;
use crate::data::aggregate::Report;
use crate::data::cloud::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::data::words::TitleCloud;
use crate::state::{AppState, Explorer, Session};

const NOTICE_COLOR: Color32 = Color32::from_rgb(204, 120, 0);
const MAX_AXIS_LABEL: usize = 40;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the report page in the central panel.
pub fn report_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("CORD-19 Research Paper Explorer").size(26.0));
    ui.label(
        "A simple data exploration of the COVID-19 Open Research Dataset (CORD-19) \
         focusing on the metadata.",
    );
    ui.add_space(8.0);

    let explorer = match &mut state.session {
        Session::Ready(explorer) => explorer,
        Session::Halted { notice } => {
            ui.colored_label(Color32::RED, notice.as_str());
            return;
        }
    };

    ui.label(RichText::new(explorer.report.status_line()).strong());
    ui.separator();

    ui.heading("1. Publications by Year");
    ui.label("Total number of papers published each year in the selected range.");
    year_chart(ui, &explorer.report);
    ui.add_space(12.0);

    ui.heading("2. Top Publishing Journals");
    ui.label("The journals that published the most papers in the selected range.");
    journal_chart(ui, &explorer.report);
    ui.add_space(12.0);

    ui.heading("3. Most Frequent Words in Titles");
    ui.label("Common words in the paper titles, sized by how often they appear.");
    title_cloud(ui, explorer);
    ui.add_space(12.0);

    ui.heading("Sample Data");
    ui.label("The first rows of the cleaned data in the selected range.");
    ScrollArea::horizontal()
        .id_salt("sample_scroll")
        .show(ui, |ui: &mut Ui| sample_table(ui, &explorer.report));
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Vertical bars, one tick per observed year.
pub fn year_chart(ui: &mut Ui, report: &Report) {
    let bars: Vec<Bar> = report
        .year_counts
        .iter()
        .map(|(&year, &count)| Bar::new(year as f64, count as f64).width(0.8).name(year))
        .collect();
    let ticks: Vec<f64> = report.year_counts.keys().map(|&y| y as f64).collect();

    ui.label(RichText::new("Number of Publications by Year").strong());
    Plot::new("year_counts")
        .height(300.0)
        .x_axis_label("Publication Year")
        .y_axis_label("Number of Papers")
        .x_grid_spacer(move |_input| {
            ticks
                .iter()
                .map(|&value| GridMark {
                    value,
                    step_size: 1.0,
                })
                .collect()
        })
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .show_grid([false, true])
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color::YEAR_BARS));
        });
}

/// Horizontal bars in chart order, so the busiest journal sits at the top.
pub fn journal_chart(ui: &mut Ui, report: &Report) {
    let journals = &report.journals_for_chart;
    let bars: Vec<Bar> = journals
        .iter()
        .enumerate()
        .map(|(i, j)| {
            Bar::new(i as f64, j.count as f64)
                .width(0.7)
                .name(&j.journal)
        })
        .collect();
    let labels: Vec<String> = journals.iter().map(|j| axis_label(&j.journal)).collect();
    let n = labels.len();

    ui.label(RichText::new("Top 10 Journals by Publication Count").strong());
    Plot::new("top_journals")
        .height(340.0)
        .x_axis_label("Number of Publications")
        .y_axis_label("Journal")
        .y_grid_spacer(move |_input| {
            (0..n)
                .map(|i| GridMark {
                    value: i as f64,
                    step_size: 1.0,
                })
                .collect()
        })
        .y_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show_grid([true, false])
        .include_x(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(color::JOURNAL_BARS));
        });
}

fn axis_label(journal: &str) -> String {
    if journal.chars().count() <= MAX_AXIS_LABEL {
        return journal.to_string();
    }
    let short: String = journal.chars().take(MAX_AXIS_LABEL - 1).collect();
    format!("{short}…")
}

/// Label for a grid mark that sits on a bar index; blank between bars.
fn label_at(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Word cloud
// ---------------------------------------------------------------------------

/// Paint the title word cloud, or the notice when there is nothing to lay out.
pub fn title_cloud(ui: &mut Ui, explorer: &mut Explorer) {
    let freqs = match &explorer.report.title_cloud {
        TitleCloud::Words(freqs) => freqs,
        other => {
            if let Some(notice) = other.notice() {
                ui.colored_label(NOTICE_COLOR, notice);
            }
            return;
        }
    };

    let layout = explorer.cloud.get_or_insert_with(|| {
        cloud::layout(freqs, CANVAS_WIDTH, CANVAS_HEIGHT, |text, size| {
            let galley = ui.fonts(|fonts| {
                fonts.layout_no_wrap(text.to_owned(), FontId::proportional(size), Color32::BLACK)
            });
            (galley.size().x, galley.size().y)
        })
    });

    let scale = (ui.available_width() / layout.width).min(1.0);
    let (response, painter) =
        ui.allocate_painter(vec2(layout.width, layout.height) * scale, Sense::hover());
    let origin = response.rect.min;
    painter.rect_filled(response.rect, 0.0, color::CLOUD_BACKGROUND);

    let palette = color::generate_palette(layout.words.len());
    for word in &layout.words {
        painter.text(
            origin + vec2(word.rect.x, word.rect.y) * scale,
            Align2::LEFT_TOP,
            &word.text,
            FontId::proportional(word.font_size * scale),
            color::cloud_color(&palette, word.rank),
        );
    }
}

// ---------------------------------------------------------------------------
// Sample table
// ---------------------------------------------------------------------------

const MISSING_CELL: &str = "—";

pub fn sample_table(ui: &mut Ui, report: &Report) {
    if report.sample.is_empty() {
        ui.label("No papers in the selected year range.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::initial(260.0).resizable(true).clip(true))
        .column(Column::initial(180.0).resizable(true).clip(true))
        .column(Column::initial(160.0).resizable(true).clip(true))
        .column(Column::auto())
        .column(Column::remainder().at_least(240.0).clip(true))
        .header(20.0, |mut header| {
            for name in ["title", "authors", "journal", "year", "abstract"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for row in &report.sample {
                body.row(18.0, |mut table_row| {
                    text_cell(&mut table_row, row.title.as_deref().unwrap_or(MISSING_CELL));
                    text_cell(&mut table_row, row.authors.as_deref().unwrap_or(MISSING_CELL));
                    text_cell(&mut table_row, &row.journal);
                    text_cell(&mut table_row, &row.year.to_string());
                    text_cell(&mut table_row, &row.abstract_text);
                });
            }
        });
}

fn text_cell(row: &mut TableRow<'_, '_>, text: &str) {
    row.col(|ui: &mut Ui| {
        ui.add(egui::Label::new(text).truncate());
    });
}
