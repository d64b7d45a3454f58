use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::analysis::aggregate;
use crate::analysis::params::{AnalysisKind, AnalysisParams};
use crate::analysis::result::AggregateResult;
use crate::data::filter::{filtered_indices, init_filter_state, FilterState, FilteredView};
use crate::data::model::OrderDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<OrderDataset>,

    /// Memo key of the current dataset: source path and modification time.
    /// Re-opening the same unchanged file skips the parse.
    pub loaded_from: Option<(PathBuf, SystemTime)>,

    /// Country and date-range selections.
    pub filters: FilterState,

    /// Indices of orders passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Sorted distinct brands among the visible orders (cached).
    pub visible_brands: Vec<String>,

    /// Which analysis is shown.
    pub analysis: AnalysisKind,

    /// Top-N / mode / focus-brand parameters.
    pub params: AnalysisParams,

    /// Result of the current (filters, analysis, params) tuple (cached;
    /// rebuilt by [`AppState::recompute`] after any change).
    pub result: Option<AggregateResult>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            loaded_from: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            visible_brands: Vec::new(),
            analysis: AnalysisKind::Popularity,
            params: AnalysisParams::default(),
            result: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and initialise filters.
    pub fn set_dataset(&mut self, dataset: OrderDataset, source: Option<(PathBuf, SystemTime)>) {
        self.filters = init_filter_state(&dataset);
        self.params.selected_brand = None;
        self.dataset = Some(dataset);
        self.loaded_from = source;
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Whether the memoized dataset already covers this file.
    pub fn is_memoized(&self, path: &Path, modified: SystemTime) -> bool {
        matches!(
            &self.loaded_from,
            Some((p, m)) if p == path && *m == modified
        )
    }

    /// Recompute `visible_indices` (and everything downstream) after a
    /// filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
            let view = FilteredView::from_indices(ds, self.visible_indices.clone());
            self.visible_brands = view.brand_universe();
        } else {
            self.visible_indices.clear();
            self.visible_brands.clear();
        }
        self.recompute();
    }

    /// Rebuild the cached result from the cached view. Aggregations are
    /// pure, so this is safe to call after any parameter change.
    pub fn recompute(&mut self) {
        self.result = self.dataset.as_ref().map(|ds| {
            let view = FilteredView::from_indices(ds, self.visible_indices.clone());
            aggregate::run(self.analysis, &view, &self.params)
        });
    }

    /// Switch the shown analysis.
    pub fn set_analysis(&mut self, kind: AnalysisKind) {
        self.analysis = kind;
        self.recompute();
    }

    /// The focus brand actually in effect for Co-occurrence by Brand,
    /// after the first-available fallback.
    pub fn effective_brand(&self) -> Option<String> {
        aggregate::effective_brand(&self.visible_brands, self.params.selected_brand.as_deref())
    }

    /// Number of orders passing the current filters.
    pub fn visible_orders(&self) -> usize {
        self.visible_indices.len()
    }
}
