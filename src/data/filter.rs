use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Order, OrderDataset};

// ---------------------------------------------------------------------------
// Filter predicates: country selection + inclusive date range
// ---------------------------------------------------------------------------

/// Country predicate: either every country or one exact code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryFilter {
    All,
    Only(String),
}

impl CountryFilter {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::Only(c) => c == code,
        }
    }
}

/// Current filter selections. The two predicates apply independently and
/// commute; the combined filter is their intersection.
///
/// An unset range endpoint means "unbounded on that side", which is
/// equivalent to defaulting to the dataset's min/max date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub country: CountryFilter,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            country: CountryFilter::All,
            start: None,
            end: None,
        }
    }
}

/// Initialise a [`FilterState`] that shows everything: all countries, and
/// the range pinned to the dataset's own date span.
pub fn init_filter_state(dataset: &OrderDataset) -> FilterState {
    FilterState {
        country: CountryFilter::All,
        start: dataset.date_span.map(|(min, _)| min),
        end: dataset.date_span.map(|(_, max)| max),
    }
}

/// Return indices of orders passing both predicates.
///
/// An order passes when:
/// * its country matches the country filter (`All` matches everything), and
/// * `start <= date <= end`, each bound skipped when unset.
pub fn filtered_indices(dataset: &OrderDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .orders
        .iter()
        .enumerate()
        .filter(|(_, order)| {
            if !filters.country.matches(&order.country) {
                return false;
            }
            if let Some(start) = filters.start {
                if order.date < start {
                    return false;
                }
            }
            if let Some(end) = filters.end {
                if order.date > end {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – a read-only subset of the dataset
// ---------------------------------------------------------------------------

/// A derived, read-only subset of the dataset: the dataset borrow plus the
/// row positions that passed the current filters. Recomputed per
/// interaction, never mutated in place.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a OrderDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Apply `filters` to `dataset`.
    pub fn new(dataset: &'a OrderDataset, filters: &FilterState) -> Self {
        Self {
            dataset,
            indices: filtered_indices(dataset, filters),
        }
    }

    /// Reuse already-computed indices (the app caches them per frame).
    pub fn from_indices(dataset: &'a OrderDataset, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// Iterate the retained orders in dataset order.
    pub fn orders(&self) -> impl Iterator<Item = &'a Order> + '_ {
        self.indices.iter().map(|&i| &self.dataset.orders[i])
    }

    /// Number of retained orders.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the view retains no orders.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Sorted distinct brands appearing in the retained orders.
    pub fn brand_universe(&self) -> Vec<String> {
        let mut brands: BTreeSet<&str> = BTreeSet::new();
        for order in self.orders() {
            for brand in &order.brands {
                brands.insert(brand);
            }
        }
        brands.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn order(country: &str, day: &str, brands: &[&str]) -> Order {
        Order {
            country: country.to_string(),
            date: date(day),
            brands: brands.iter().map(|b| b.to_string()).collect(),
        }
    }

    fn sample() -> OrderDataset {
        OrderDataset::from_orders(vec![
            order("US", "2024-01-01", &["A", "B"]),
            order("US", "2024-01-02", &["A"]),
            order("FR", "2024-01-03", &["B", "C"]),
        ])
    }

    #[test]
    fn all_countries_is_identity() {
        let ds = sample();
        let filters = init_filter_state(&ds);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn country_filter_never_grows_the_view() {
        let ds = sample();
        for code in ["US", "FR", "DE"] {
            let filters = FilterState {
                country: CountryFilter::Only(code.to_string()),
                ..FilterState::default()
            };
            assert!(filtered_indices(&ds, &filters).len() <= ds.len());
        }
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let ds = sample();
        let filters = FilterState {
            country: CountryFilter::All,
            start: Some(date("2024-01-02")),
            end: Some(date("2024-01-03")),
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![1, 2]);
    }

    #[test]
    fn predicates_intersect() {
        let ds = sample();
        let filters = FilterState {
            country: CountryFilter::Only("US".to_string()),
            start: Some(date("2024-01-02")),
            end: None,
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![1]);
    }

    #[test]
    fn excluding_range_yields_empty_view() {
        let ds = sample();
        let filters = FilterState {
            country: CountryFilter::All,
            start: Some(date("2025-01-01")),
            end: Some(date("2025-12-31")),
        };
        let view = FilteredView::new(&ds, &filters);
        assert!(view.is_empty());
        assert!(view.brand_universe().is_empty());
    }

    #[test]
    fn brand_universe_is_sorted_and_distinct() {
        let ds = sample();
        let view = FilteredView::new(&ds, &init_filter_state(&ds));
        assert_eq!(view.brand_universe(), vec!["A", "B", "C"]);
    }
}
