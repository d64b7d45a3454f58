// ---------------------------------------------------------------------------
// AnalysisKind – which aggregation to run
// ---------------------------------------------------------------------------

/// The seven available analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Popularity,
    Diversity,
    Penetration,
    BasketSize,
    Cooccurrence,
    CooccurrenceByBrand,
    Exclusivity,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Popularity,
        AnalysisKind::Diversity,
        AnalysisKind::Penetration,
        AnalysisKind::BasketSize,
        AnalysisKind::Cooccurrence,
        AnalysisKind::CooccurrenceByBrand,
        AnalysisKind::Exclusivity,
    ];

    /// Human-readable name for dropdowns and chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::Popularity => "Brand Popularity",
            AnalysisKind::Diversity => "Country Diversity",
            AnalysisKind::Penetration => "Brand Penetration",
            AnalysisKind::BasketSize => "Average Basket Size",
            AnalysisKind::Cooccurrence => "Brand Co-occurrence",
            AnalysisKind::CooccurrenceByBrand => "Co-occurrence by Brand",
            AnalysisKind::Exclusivity => "Brand Exclusivity",
        }
    }

    /// One-paragraph explanation shown above the chart.
    pub fn explanation(&self) -> &'static str {
        match self {
            AnalysisKind::Popularity => {
                "Shows the most popular brands by counting the number of orders that contain each brand."
            }
            AnalysisKind::Diversity => {
                "Shows the diversity of brands in each country, counting how many unique brands are ordered in each region."
            }
            AnalysisKind::Penetration => {
                "Shows the share of each country's orders that contain each brand."
            }
            AnalysisKind::BasketSize => {
                "Shows the average number of distinct brands purchased per order in each country."
            }
            AnalysisKind::Cooccurrence => {
                "Shows how frequently the top brands are purchased together in the same order, highlighting potential product pairings."
            }
            AnalysisKind::CooccurrenceByBrand => {
                "Shows which brands most often appear in the same order as one chosen brand."
            }
            AnalysisKind::Exclusivity => {
                "Shows how often customers purchase only one brand in their order, indicating brand loyalty or specialization."
            }
        }
    }

    /// Whether the top-N slider applies to this analysis.
    pub fn uses_top_n(&self) -> bool {
        !matches!(self, AnalysisKind::Penetration)
    }

    /// Whether the count/percentage toggle applies. Penetration is always
    /// a fraction and diversity/basket size are plain counts/means.
    pub fn uses_mode(&self) -> bool {
        matches!(
            self,
            AnalysisKind::Popularity
                | AnalysisKind::Cooccurrence
                | AnalysisKind::CooccurrenceByBrand
                | AnalysisKind::Exclusivity
        )
    }

    /// Whether a brand must be selected for this analysis.
    pub fn uses_selected_brand(&self) -> bool {
        matches!(self, AnalysisKind::CooccurrenceByBrand)
    }
}

// ---------------------------------------------------------------------------
// ValueMode + AnalysisParams
// ---------------------------------------------------------------------------

/// Whether ranked values are raw counts or percentages of the relevant
/// total (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    Count,
    Percentage,
}

impl ValueMode {
    pub fn label(&self) -> &'static str {
        match self {
            ValueMode::Count => "Count",
            ValueMode::Percentage => "Percentage",
        }
    }
}

/// Slider bounds for top-N, matching the dashboard's 5–20 range.
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;

/// Analysis-specific parameters collected by the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisParams {
    /// How many labels to keep after ranking (also the size of the
    /// co-occurrence matrix's brand restriction).
    pub top_n: usize,
    pub mode: ValueMode,
    /// Focus brand for [`AnalysisKind::CooccurrenceByBrand`]. When unset
    /// or absent from the current view, the first brand of the view's
    /// alphabetical universe is used.
    pub selected_brand: Option<String>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            top_n: TOP_N_DEFAULT,
            mode: ValueMode::Count,
            selected_brand: None,
        }
    }
}
