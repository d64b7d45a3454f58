use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Sense, Ui};
use eframe::epaint::TextShape;
use egui_plot::{Bar, BarChart, Plot};

use crate::analysis::params::{AnalysisKind, ValueMode};
use crate::analysis::result::{AggregateResult, LabelledMatrix, RankedEntry};
use crate::color::{heat_color, ColorMap};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – the chart for the current analysis
// ---------------------------------------------------------------------------

/// Render the current analysis result in the central panel.
pub fn analysis_chart(ui: &mut Ui, state: &AppState) {
    let Some(result) = &state.result else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyze orders  (File → Open…)");
        });
        return;
    };

    ui.strong(chart_title(state));
    ui.add_space(4.0);

    // An empty selection is rendered as "no data", never as an error.
    if result.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data for the current selection.");
        });
        return;
    }

    match result {
        AggregateResult::Ranked(entries) => ranked_bars(ui, state, entries),
        AggregateResult::Matrix(matrix) => heatmap(ui, matrix),
    }
}

fn chart_title(state: &AppState) -> String {
    let mut title = state.analysis.label().to_string();
    if state.analysis == AnalysisKind::CooccurrenceByBrand {
        if let Some(brand) = state.effective_brand() {
            title = format!("{title}: {brand}");
        }
    }
    title
}

fn value_axis_label(state: &AppState) -> &'static str {
    if state.analysis.uses_mode() && state.params.mode == ValueMode::Percentage {
        return "Percent";
    }
    match state.analysis {
        AnalysisKind::Diversity => "Unique brands",
        AnalysisKind::BasketSize => "Brands per order",
        _ => "Orders",
    }
}

/// Format a cell/bar value: whole numbers without decimals, everything
/// else with two.
fn format_value(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// Ranked list → bar chart
// ---------------------------------------------------------------------------

fn ranked_bars(ui: &mut Ui, state: &AppState, entries: &[RankedEntry]) {
    let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();
    let colors = ColorMap::new(labels.clone());

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new(i as f64, e.value)
                .name(&e.label)
                .fill(colors.color_for(&e.label))
                .width(0.7)
        })
        .collect();

    let axis_labels = labels.clone();
    Plot::new("ranked_chart")
        .y_axis_label(value_axis_label(state))
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 0.25 || idx < 0.0 {
                return String::new();
            }
            axis_labels
                .get(idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Matrix → heatmap
// ---------------------------------------------------------------------------

/// Paint a labelled heatmap: row labels on the left, angled column labels
/// on top, one filled rect per cell, value annotations when cells are
/// large enough, and a hover tooltip naming the cell.
fn heatmap(ui: &mut Ui, matrix: &LabelledMatrix) {
    let rows = matrix.row_labels.len();
    let cols = matrix.col_labels.len();
    let max = matrix.max_value().max(f64::MIN_POSITIVE);

    let left_margin = 80.0;
    let top_margin = 70.0;
    let avail = ui.available_size();
    let cell_w = ((avail.x - left_margin) / cols as f32).clamp(14.0, 64.0);
    let cell_h = ((avail.y - top_margin) / rows as f32).clamp(14.0, 40.0);

    let size = vec2(left_margin + cell_w * cols as f32, top_margin + cell_h * rows as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let text_color = ui.visuals().text_color();

    // Cells
    for r in 0..rows {
        for c in 0..cols {
            let value = matrix.at(r, c);
            let rect = egui::Rect::from_min_size(
                pos2(
                    origin.x + left_margin + c as f32 * cell_w,
                    origin.y + top_margin + r as f32 * cell_h,
                ),
                vec2(cell_w - 1.0, cell_h - 1.0),
            );
            painter.rect_filled(rect, 2.0, heat_color((value / max) as f32));

            if cell_w >= 34.0 && value > 0.0 {
                let annotation_color = if value / max > 0.55 {
                    Color32::WHITE
                } else {
                    Color32::DARK_GRAY
                };
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format_value(value),
                    FontId::proportional(10.0),
                    annotation_color,
                );
            }
        }
    }

    // Row labels, right-aligned against the grid
    for (r, label) in matrix.row_labels.iter().enumerate() {
        painter.text(
            pos2(
                origin.x + left_margin - 6.0,
                origin.y + top_margin + r as f32 * cell_h + cell_h * 0.5,
            ),
            Align2::RIGHT_CENTER,
            label,
            FontId::proportional(11.0),
            text_color,
        );
    }

    // Angled column labels above the grid
    for (c, label) in matrix.col_labels.iter().enumerate() {
        let galley = painter.layout_no_wrap(label.clone(), FontId::proportional(11.0), text_color);
        let pos = pos2(
            origin.x + left_margin + c as f32 * cell_w + cell_w * 0.3,
            origin.y + top_margin - 8.0,
        );
        let shape = TextShape::new(pos, galley, text_color)
            .with_angle(-std::f32::consts::FRAC_PI_4);
        painter.add(shape);
    }

    // Hover tooltip naming the cell under the pointer
    if let Some(pos) = response.hover_pos() {
        let c = ((pos.x - origin.x - left_margin) / cell_w).floor();
        let r = ((pos.y - origin.y - top_margin) / cell_h).floor();
        if r >= 0.0 && c >= 0.0 && (r as usize) < rows && (c as usize) < cols {
            let (r, c) = (r as usize, c as usize);
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                response.layer_id,
                egui::Id::new("heatmap_tooltip"),
                |ui: &mut Ui| {
                    ui.label(format!(
                        "{} × {}: {}",
                        matrix.row_labels[r],
                        matrix.col_labels[c],
                        format_value(matrix.at(r, c))
                    ));
                },
            );
        }
    }
}
