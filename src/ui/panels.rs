use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::analysis::params::{AnalysisKind, ValueMode, TOP_N_MAX, TOP_N_MIN};
use crate::data::filter::CountryFilter;
use crate::state::AppState;

/// Label of the identity country filter.
const ALL_COUNTRIES: &str = "All Countries";

// ---------------------------------------------------------------------------
// Left side panel – analysis + filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: analysis selector, filters, parameters, metrics.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut filters_changed = false;
    let mut params_changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Analysis selector ----
            egui::ComboBox::from_id_salt("analysis_kind")
                .selected_text(state.analysis.label())
                .width(ui.available_width() * 0.9)
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in AnalysisKind::ALL {
                        if ui
                            .selectable_label(state.analysis == kind, kind.label())
                            .clicked()
                            && state.analysis != kind
                        {
                            state.set_analysis(kind);
                        }
                    }
                });
            ui.add_space(2.0);
            ui.label(RichText::new(state.analysis.explanation()).small().weak());
            ui.separator();

            // ---- Country filter ----
            ui.strong("Country");
            let countries = state
                .dataset
                .as_ref()
                .map(|ds| ds.countries.clone())
                .unwrap_or_default();
            let current = match &state.filters.country {
                CountryFilter::All => ALL_COUNTRIES.to_string(),
                CountryFilter::Only(c) => c.clone(),
            };
            egui::ComboBox::from_id_salt("country_filter")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(current == ALL_COUNTRIES, ALL_COUNTRIES)
                        .clicked()
                    {
                        state.filters.country = CountryFilter::All;
                        filters_changed = true;
                    }
                    for code in &countries {
                        if ui.selectable_label(current == *code, code).clicked() {
                            state.filters.country = CountryFilter::Only(code.clone());
                            filters_changed = true;
                        }
                    }
                });

            // ---- Date range (inclusive) ----
            ui.add_space(4.0);
            ui.strong("Date range");
            let span = state.dataset.as_ref().and_then(|ds| ds.date_span);
            if let (Some(mut start), Some(mut end)) = (state.filters.start, state.filters.end) {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    if ui
                        .add(DatePickerButton::new(&mut start).id_salt("range_start"))
                        .changed()
                    {
                        state.filters.start = Some(start);
                        filters_changed = true;
                    }
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    if ui
                        .add(DatePickerButton::new(&mut end).id_salt("range_end"))
                        .changed()
                    {
                        state.filters.end = Some(end);
                        filters_changed = true;
                    }
                });
                if let Some((min, max)) = span {
                    if ui.small_button("Reset range").clicked() {
                        state.filters.start = Some(min);
                        state.filters.end = Some(max);
                        filters_changed = true;
                    }
                }
            } else {
                ui.label("Dataset has no dates.");
            }
            ui.separator();

            // ---- Analysis parameters ----
            if state.analysis.uses_top_n() {
                ui.strong("Top N");
                if ui
                    .add(egui::Slider::new(&mut state.params.top_n, TOP_N_MIN..=TOP_N_MAX))
                    .changed()
                {
                    params_changed = true;
                }
            }

            if state.analysis.uses_mode() {
                ui.strong("Values");
                ui.horizontal(|ui: &mut Ui| {
                    for mode in [ValueMode::Count, ValueMode::Percentage] {
                        if ui
                            .radio_value(&mut state.params.mode, mode, mode.label())
                            .changed()
                        {
                            params_changed = true;
                        }
                    }
                });
            }

            if state.analysis.uses_selected_brand() {
                ui.strong("Brand");
                let brands = state.visible_brands.clone();
                let effective = state.effective_brand().unwrap_or_default();
                egui::ComboBox::from_id_salt("selected_brand")
                    .selected_text(&effective)
                    .show_ui(ui, |ui: &mut Ui| {
                        for brand in &brands {
                            if ui.selectable_label(effective == *brand, brand).clicked() {
                                state.params.selected_brand = Some(brand.clone());
                                params_changed = true;
                            }
                        }
                    });
            }
            ui.separator();

            // ---- Metrics for the current selection ----
            ui.strong(format!("Metrics for {current}"));
            ui.label(format!("Total orders: {}", state.visible_orders()));
            ui.label(format!("Total brands: {}", state.visible_brands.len()));
            ui.add_space(4.0);

            egui::CollapsingHeader::new("How to use")
                .id_salt("how_to_use")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(
                        "Pick an analysis and a country, then narrow the date \
                         range. Charts update automatically with every change; \
                         metrics for the current selection are shown above.",
                    );
                });
        });

    if filters_changed {
        state.refilter();
    } else if params_changed {
        state.recompute();
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
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} orders loaded, {} in view",
                ds.len(),
                state.visible_orders()
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
        .set_title("Open order data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };

    // The parse is the only expensive step, so it is memoized by
    // (path, modification time); re-opening the same file is a no-op.
    let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
    if let Some(modified) = modified {
        if state.is_memoized(&path, modified) {
            log::debug!("already loaded {}, skipping re-parse", path.display());
            return;
        }
    }

    state.loading = true;
    let loaded = crate::data::loader::load_file(&path)
        .with_context(|| format!("loading {}", path.display()));
    match loaded {
        Ok(dataset) => {
            log::info!(
                "Loaded {} orders across {} countries and {} brands",
                dataset.len(),
                dataset.countries.len(),
                dataset.brands.len()
            );
            state.set_dataset(dataset, modified.map(|m| (path, m)));
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            state.loading = false;
        }
    }
}
