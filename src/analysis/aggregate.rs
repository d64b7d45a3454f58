use std::collections::{BTreeMap, BTreeSet};

use crate::data::filter::FilteredView;

use super::params::{AnalysisKind, AnalysisParams, ValueMode};
use super::result::{AggregateResult, LabelledMatrix, RankedEntry};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one analysis over the current view. Pure: identical inputs give
/// identical results, and an empty view gives an empty result.
pub fn run(kind: AnalysisKind, view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    match kind {
        AnalysisKind::Popularity => popularity(view, params),
        AnalysisKind::Diversity => diversity(view, params),
        AnalysisKind::Penetration => penetration(view),
        AnalysisKind::BasketSize => basket_size(view, params),
        AnalysisKind::Cooccurrence => cooccurrence(view, params),
        AnalysisKind::CooccurrenceByBrand => cooccurrence_by_brand(view, params),
        AnalysisKind::Exclusivity => exclusivity(view, params),
    }
}

/// Resolve the focus brand for [`AnalysisKind::CooccurrenceByBrand`]:
/// the requested brand when it exists in `universe`, otherwise the first
/// (alphabetically smallest) available brand.
pub fn effective_brand(universe: &[String], requested: Option<&str>) -> Option<String> {
    match requested {
        Some(b) if universe.iter().any(|u| u == b) => Some(b.to_string()),
        _ => universe.first().cloned(),
    }
}

// ---------------------------------------------------------------------------
// Shared pipeline pieces
// ---------------------------------------------------------------------------

/// Sort descending by value and keep the first `top_n` entries.
///
/// The incoming map iterates label-ascending and the sort is stable, so
/// equal values keep alphabetical order — the tie-break is deterministic.
fn rank_top(counts: BTreeMap<String, f64>, top_n: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = counts
        .into_iter()
        .map(|(label, value)| RankedEntry { label, value })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(top_n);
    entries
}

/// Number of orders containing each brand. An order holds a brand set, so
/// a brand counts at most once per order.
fn brand_order_counts(view: &FilteredView<'_>) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for order in view.orders() {
        for brand in &order.brands {
            *counts.entry(brand.clone()).or_default() += 1.0;
        }
    }
    counts
}

/// Scale every value to a percentage of `total` when percentage mode is on.
fn apply_mode(counts: &mut BTreeMap<String, f64>, mode: ValueMode, total: f64) {
    if mode == ValueMode::Percentage && total > 0.0 {
        for v in counts.values_mut() {
            *v = *v / total * 100.0;
        }
    }
}

// ---------------------------------------------------------------------------
// The seven analyses
// ---------------------------------------------------------------------------

/// Orders containing each brand, ranked. Percentage mode: share of all
/// filtered orders containing the brand.
fn popularity(view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    let mut counts = brand_order_counts(view);
    apply_mode(&mut counts, params.mode, view.len() as f64);
    AggregateResult::Ranked(rank_top(counts, params.top_n))
}

/// Distinct brands seen per country, ranked.
fn diversity(view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    let mut per_country: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for order in view.orders() {
        let seen = per_country.entry(order.country.clone()).or_default();
        for brand in &order.brands {
            seen.insert(brand);
        }
    }
    let counts: BTreeMap<String, f64> = per_country
        .into_iter()
        .map(|(country, brands)| (country, brands.len() as f64))
        .collect();
    AggregateResult::Ranked(rank_top(counts, params.top_n))
}

/// Country × brand matrix: the fraction of that country's orders that
/// contain the brand (P(brand | country) per order). Missing combinations
/// stay 0.
fn penetration(view: &FilteredView<'_>) -> AggregateResult {
    let brands = view.brand_universe();
    let mut order_totals: BTreeMap<String, f64> = BTreeMap::new();
    for order in view.orders() {
        *order_totals.entry(order.country.clone()).or_default() += 1.0;
    }
    let countries: Vec<String> = order_totals.keys().cloned().collect();

    let country_idx: BTreeMap<&str, usize> =
        countries.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();
    let brand_idx: BTreeMap<&str, usize> =
        brands.iter().enumerate().map(|(i, b)| (b.as_str(), i)).collect();

    let mut matrix = LabelledMatrix::zeros(countries.clone(), brands.clone());
    for order in view.orders() {
        let row = country_idx[order.country.as_str()];
        for brand in &order.brands {
            matrix.add(row, brand_idx[brand.as_str()], 1.0);
        }
    }
    for (row, country) in countries.iter().enumerate() {
        let total = order_totals[country];
        for col in 0..matrix.col_labels.len() {
            let v = matrix.at(row, col);
            matrix.set(row, col, v / total);
        }
    }
    AggregateResult::Matrix(matrix)
}

/// Mean distinct-brand count per order, by country, ranked.
fn basket_size(view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    let mut sums: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for order in view.orders() {
        let entry = sums.entry(order.country.clone()).or_default();
        entry.0 += order.brands.len() as f64;
        entry.1 += 1.0;
    }
    let means: BTreeMap<String, f64> = sums
        .into_iter()
        .map(|(country, (sum, n))| (country, sum / n))
        .collect();
    AggregateResult::Ranked(rank_top(means, params.top_n))
}

/// Symmetric co-occurrence matrix over the view's `top_n` most popular
/// brands. Each order contributes 1 to both cells of every unordered pair
/// of qualifying brands it contains; the diagonal stays zero, and all-zero
/// rows/columns are dropped. Percentage mode normalizes by the grand total
/// over the whole matrix, so the displayed cells sum to 100.
fn cooccurrence(view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    let top_brands = rank_top(brand_order_counts(view), params.top_n);
    let labels: Vec<String> = top_brands.into_iter().map(|e| e.label).collect();
    let index: BTreeMap<&str, usize> =
        labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

    let mut matrix = LabelledMatrix::zeros(labels.clone(), labels.clone());
    for order in view.orders() {
        let qualifying: Vec<usize> = order
            .brands
            .iter()
            .filter_map(|b| index.get(b.as_str()).copied())
            .collect();
        for (i, &a) in qualifying.iter().enumerate() {
            for &b in &qualifying[i + 1..] {
                matrix.add(a, b, 1.0);
                matrix.add(b, a, 1.0);
            }
        }
    }

    if params.mode == ValueMode::Percentage {
        let total = matrix.total();
        matrix.normalize_percent(total);
    }
    AggregateResult::Matrix(matrix.retain_nonzero())
}

/// Brands co-occurring with one focus brand, ranked. The focus brand
/// itself and zero-count brands are excluded. Percentage mode: share of
/// the total co-occurrence mass.
fn cooccurrence_by_brand(view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    let universe = view.brand_universe();
    let Some(selected) = effective_brand(&universe, params.selected_brand.as_deref()) else {
        return AggregateResult::Ranked(Vec::new());
    };

    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for order in view.orders() {
        if !order.brands.contains(&selected) {
            continue;
        }
        for brand in &order.brands {
            if *brand != selected {
                *counts.entry(brand.clone()).or_default() += 1.0;
            }
        }
    }

    let total: f64 = counts.values().sum();
    apply_mode(&mut counts, params.mode, total);
    AggregateResult::Ranked(rank_top(counts, params.top_n))
}

/// Sole brands of single-brand orders, ranked. Percentage mode divides by
/// the total filtered order count, not just single-brand orders.
fn exclusivity(view: &FilteredView<'_>, params: &AnalysisParams) -> AggregateResult {
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for order in view.orders() {
        if order.brands.len() == 1 {
            let brand = order.brands.iter().next().cloned().unwrap_or_default();
            *counts.entry(brand).or_default() += 1.0;
        }
    }
    apply_mode(&mut counts, params.mode, view.len() as f64);
    AggregateResult::Ranked(rank_top(counts, params.top_n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{init_filter_state, FilterState};
    use crate::data::model::{Order, OrderDataset};
    use chrono::NaiveDate;

    fn order(country: &str, day: &str, brands: &[&str]) -> Order {
        Order {
            country: country.to_string(),
            date: day.parse::<NaiveDate>().unwrap(),
            brands: brands.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// The three-order fixture used throughout: two US orders ({A,B} and
    /// {A}) and one FR order ({B,C}).
    fn sample() -> OrderDataset {
        OrderDataset::from_orders(vec![
            order("US", "2024-01-01", &["A", "B"]),
            order("US", "2024-01-02", &["A"]),
            order("FR", "2024-01-03", &["B", "C"]),
        ])
    }

    fn ranked(result: AggregateResult) -> Vec<(String, f64)> {
        match result {
            AggregateResult::Ranked(entries) => {
                entries.into_iter().map(|e| (e.label, e.value)).collect()
            }
            other => panic!("expected ranked result, got {other:?}"),
        }
    }

    fn matrix(result: AggregateResult) -> LabelledMatrix {
        match result {
            AggregateResult::Matrix(m) => m,
            other => panic!("expected matrix result, got {other:?}"),
        }
    }

    fn full_view(ds: &OrderDataset) -> FilteredView<'_> {
        FilteredView::new(ds, &init_filter_state(ds))
    }

    #[test]
    fn popularity_ranks_with_alphabetical_tie_break() {
        let ds = sample();
        let params = AnalysisParams { top_n: 3, ..Default::default() };
        let got = ranked(run(AnalysisKind::Popularity, &full_view(&ds), &params));
        assert_eq!(
            got,
            vec![
                ("A".to_string(), 2.0),
                ("B".to_string(), 2.0),
                ("C".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn popularity_is_monotonic_under_top_n() {
        let ds = sample();
        let view = full_view(&ds);
        let mut previous: Vec<String> = Vec::new();
        for top_n in 1..=4 {
            let params = AnalysisParams { top_n, ..Default::default() };
            let labels: Vec<String> = ranked(run(AnalysisKind::Popularity, &view, &params))
                .into_iter()
                .map(|(l, _)| l)
                .collect();
            assert!(labels.starts_with(&previous));
            previous = labels;
        }
    }

    #[test]
    fn popularity_percentage_is_share_of_orders() {
        let ds = sample();
        let params = AnalysisParams {
            top_n: 3,
            mode: ValueMode::Percentage,
            ..Default::default()
        };
        let got = ranked(run(AnalysisKind::Popularity, &full_view(&ds), &params));
        // A appears in 2 of 3 orders.
        assert_eq!(got[0].0, "A");
        assert!((got[0].1 - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn diversity_counts_distinct_brands_per_country() {
        let ds = sample();
        let params = AnalysisParams { top_n: 10, ..Default::default() };
        let got = ranked(run(AnalysisKind::Diversity, &full_view(&ds), &params));
        // Both countries see 2 distinct brands; tie breaks alphabetically.
        assert_eq!(
            got,
            vec![("FR".to_string(), 2.0), ("US".to_string(), 2.0)]
        );
    }

    #[test]
    fn penetration_is_per_country_order_fraction() {
        let ds = sample();
        let m = matrix(run(
            AnalysisKind::Penetration,
            &full_view(&ds),
            &AnalysisParams::default(),
        ));
        assert_eq!(m.get("US", "A"), Some(1.0));
        assert_eq!(m.get("US", "B"), Some(0.5));
        assert_eq!(m.get("US", "C"), Some(0.0));
        assert_eq!(m.get("FR", "B"), Some(1.0));
        assert_eq!(m.get("FR", "A"), Some(0.0));
    }

    #[test]
    fn basket_size_uses_deduplicated_sets() {
        let ds = sample();
        let params = AnalysisParams { top_n: 10, ..Default::default() };
        let got = ranked(run(AnalysisKind::BasketSize, &full_view(&ds), &params));
        assert_eq!(
            got,
            vec![("FR".to_string(), 2.0), ("US".to_string(), 1.5)]
        );
    }

    #[test]
    fn cooccurrence_matrix_is_symmetric_with_zero_diagonal() {
        let ds = sample();
        let params = AnalysisParams { top_n: 3, ..Default::default() };
        let m = matrix(run(AnalysisKind::Cooccurrence, &full_view(&ds), &params));

        for (r, row_label) in m.row_labels.iter().enumerate() {
            for (c, col_label) in m.col_labels.iter().enumerate() {
                assert_eq!(m.at(r, c), m.get(col_label, row_label).unwrap());
                if row_label == col_label {
                    assert_eq!(m.at(r, c), 0.0);
                }
            }
        }
        assert_eq!(m.get("A", "B"), Some(1.0));
        assert_eq!(m.get("B", "A"), Some(1.0));
        // C never pairs with a top brand in the same order except B.
        assert_eq!(m.get("B", "C"), Some(1.0));
    }

    #[test]
    fn cooccurrence_drops_all_zero_labels() {
        let ds = OrderDataset::from_orders(vec![
            order("US", "2024-01-01", &["A", "B"]),
            order("US", "2024-01-02", &["C"]),
        ]);
        let params = AnalysisParams { top_n: 3, ..Default::default() };
        let m = matrix(run(AnalysisKind::Cooccurrence, &full_view(&ds), &params));
        // C co-occurs with nothing, so it disappears from both axes.
        assert_eq!(m.row_labels, vec!["A", "B"]);
        assert_eq!(m.col_labels, vec!["A", "B"]);
    }

    #[test]
    fn cooccurrence_percentages_sum_to_one_hundred() {
        let ds = OrderDataset::from_orders(vec![
            order("US", "2024-01-01", &["A", "B", "C"]),
            order("US", "2024-01-02", &["A", "B"]),
            order("FR", "2024-01-03", &["B", "C"]),
        ]);
        let params = AnalysisParams {
            top_n: 3,
            mode: ValueMode::Percentage,
            ..Default::default()
        };
        let m = matrix(run(AnalysisKind::Cooccurrence, &full_view(&ds), &params));
        assert!(!m.is_empty());
        assert!((m.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cooccurrence_by_brand_excludes_the_focus_brand() {
        let ds = sample();
        let params = AnalysisParams {
            top_n: 10,
            selected_brand: Some("A".to_string()),
            ..Default::default()
        };
        let got = ranked(run(AnalysisKind::CooccurrenceByBrand, &full_view(&ds), &params));
        assert_eq!(got, vec![("B".to_string(), 1.0)]);
    }

    #[test]
    fn cooccurrence_by_brand_falls_back_to_first_available() {
        let ds = sample();
        let params = AnalysisParams {
            top_n: 10,
            selected_brand: Some("Nonexistent".to_string()),
            ..Default::default()
        };
        // Falls back to "A", so the answer matches an explicit "A".
        let got = ranked(run(AnalysisKind::CooccurrenceByBrand, &full_view(&ds), &params));
        assert_eq!(got, vec![("B".to_string(), 1.0)]);
    }

    #[test]
    fn exclusivity_counts_single_brand_orders() {
        let ds = sample();
        let params = AnalysisParams { top_n: 10, ..Default::default() };
        let got = ranked(run(AnalysisKind::Exclusivity, &full_view(&ds), &params));
        assert_eq!(got, vec![("A".to_string(), 1.0)]);
    }

    #[test]
    fn exclusivity_never_exceeds_popularity() {
        let ds = sample();
        let view = full_view(&ds);
        let params = AnalysisParams { top_n: 100, ..Default::default() };
        let pop: BTreeMap<String, f64> = ranked(run(AnalysisKind::Popularity, &view, &params))
            .into_iter()
            .collect();
        for (brand, count) in ranked(run(AnalysisKind::Exclusivity, &view, &params)) {
            assert!(count <= pop[&brand]);
        }
    }

    #[test]
    fn empty_view_yields_empty_results_for_every_analysis() {
        let ds = sample();
        let filters = FilterState {
            start: Some("2030-01-01".parse().unwrap()),
            end: Some("2030-12-31".parse().unwrap()),
            ..Default::default()
        };
        let view = FilteredView::new(&ds, &filters);
        for kind in AnalysisKind::ALL {
            let result = run(kind, &view, &AnalysisParams::default());
            assert!(result.is_empty(), "{} on empty view", kind.label());
        }
    }

    #[test]
    fn top_n_beyond_label_count_returns_all_labels() {
        let ds = sample();
        let params = AnalysisParams { top_n: 50, ..Default::default() };
        let got = ranked(run(AnalysisKind::Popularity, &full_view(&ds), &params));
        assert_eq!(got.len(), 3);
    }
}
