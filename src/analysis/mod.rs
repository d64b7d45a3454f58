/// Analysis layer: the aggregation pipeline shared by every chart.
///
/// Each analysis is a pure function `(FilteredView, AnalysisParams) ->
/// AggregateResult`: explode orders into (order, brand) pairs, group,
/// reduce, rank/truncate. The UI only collects parameters and renders the
/// result; recomputation happens on every parameter change.

pub mod aggregate;
pub mod params;
pub mod result;
