/// Presentation layer: parameter widgets and chart rendering. Owns no
/// analytics; it only collects parameters and draws `AggregateResult`s.

pub mod panels;
pub mod plot;
