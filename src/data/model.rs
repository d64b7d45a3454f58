use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Order – one row of the source table
// ---------------------------------------------------------------------------

/// A single order (one row of the source table).
#[derive(Debug, Clone)]
pub struct Order {
    /// Shipping destination country code (e.g. "US", "FR").
    pub country: String,
    /// Calendar date of the order; any time-of-day is stripped at load time.
    pub date: NaiveDate,
    /// Distinct brands purchased in this order. Duplicates in the source
    /// cell collapse here, so "A,A,B" buys {A, B}.
    pub brands: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// OrderDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed label universes.
/// Immutable for the lifetime of one upload.
#[derive(Debug, Clone)]
pub struct OrderDataset {
    /// All orders (rows), in file order.
    pub orders: Vec<Order>,
    /// Sorted unique country codes.
    pub countries: Vec<String>,
    /// Sorted unique brand names across all orders.
    pub brands: Vec<String>,
    /// Earliest and latest order date; `None` when the dataset is empty.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl OrderDataset {
    /// Build label universes and the date span from the loaded orders.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let mut countries: BTreeSet<String> = BTreeSet::new();
        let mut brands: BTreeSet<String> = BTreeSet::new();
        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;

        for order in &orders {
            countries.insert(order.country.clone());
            for brand in &order.brands {
                brands.insert(brand.clone());
            }
            date_span = Some(match date_span {
                None => (order.date, order.date),
                Some((min, max)) => (min.min(order.date), max.max(order.date)),
            });
        }

        OrderDataset {
            orders,
            countries: countries.into_iter().collect(),
            brands: brands.into_iter().collect(),
            date_span,
        }
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
