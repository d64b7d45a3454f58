// ---------------------------------------------------------------------------
// AggregateResult – what an analysis hands to the presentation layer
// ---------------------------------------------------------------------------

/// One (label, value) entry of a ranked list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub label: String,
    pub value: f64,
}

/// A dense matrix with shared label universes on both axes. Values are
/// stored row-major; missing combinations are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    values: Vec<f64>,
}

impl LabelledMatrix {
    /// All-zero matrix over the given labels.
    pub fn zeros(row_labels: Vec<String>, col_labels: Vec<String>) -> Self {
        let values = vec![0.0; row_labels.len() * col_labels.len()];
        Self {
            row_labels,
            col_labels,
            values,
        }
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.col_labels.len() + col]
    }

    pub fn add(&mut self, row: usize, col: usize, delta: f64) {
        self.values[row * self.col_labels.len() + col] += delta;
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.col_labels.len() + col] = value;
    }

    /// Look a cell up by labels; `None` when either label is absent.
    pub fn get(&self, row_label: &str, col_label: &str) -> Option<f64> {
        let row = self.row_labels.iter().position(|l| l == row_label)?;
        let col = self.col_labels.iter().position(|l| l == col_label)?;
        Some(self.at(row, col))
    }

    /// Sum over every cell.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Largest cell value, 0 for an empty matrix.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Divide every cell by `divisor` and scale to a percentage.
    pub fn normalize_percent(&mut self, divisor: f64) {
        if divisor > 0.0 {
            for v in &mut self.values {
                *v = *v / divisor * 100.0;
            }
        }
    }

    /// Drop rows and columns whose cells are all zero.
    pub fn retain_nonzero(self) -> Self {
        let keep_rows: Vec<usize> = (0..self.row_labels.len())
            .filter(|&r| (0..self.col_labels.len()).any(|c| self.at(r, c) != 0.0))
            .collect();
        let keep_cols: Vec<usize> = (0..self.col_labels.len())
            .filter(|&c| (0..self.row_labels.len()).any(|r| self.at(r, c) != 0.0))
            .collect();

        let row_labels: Vec<String> = keep_rows.iter().map(|&r| self.row_labels[r].clone()).collect();
        let col_labels: Vec<String> = keep_cols.iter().map(|&c| self.col_labels[c].clone()).collect();
        let mut out = LabelledMatrix::zeros(row_labels, col_labels);
        for (ri, &r) in keep_rows.iter().enumerate() {
            for (ci, &c) in keep_cols.iter().enumerate() {
                out.set(ri, ci, self.at(r, c));
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.col_labels.is_empty()
    }
}

/// The output of one analysis: a ranked list (bar chart) or a labelled
/// matrix (heatmap). Values are counts or percentages depending on the
/// requested mode.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateResult {
    Ranked(Vec<RankedEntry>),
    Matrix(LabelledMatrix),
}

impl AggregateResult {
    /// An empty selection is data, not an error; the UI renders it as
    /// "no data".
    pub fn is_empty(&self) -> bool {
        match self {
            AggregateResult::Ranked(entries) => entries.is_empty(),
            AggregateResult::Matrix(m) => m.is_empty(),
        }
    }
}
