//! Feature extraction and z-score normalization.

use ndarray::{Array1, Array2, Axis};

use crate::dataset::Dataset;

/// Per-column z-score scaler fitted on a feature matrix.
///
/// Uses the population standard deviation. A constant column (σ == 0) keeps a
/// divisor of 1 so it normalizes to all zeros instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    /// Fit mean and standard deviation per column.
    pub fn fit(matrix: &Array2<f64>) -> Self {
        let n = matrix.nrows().max(1) as f64;
        let mean = matrix.sum_axis(Axis(0)) / n;
        let std = matrix
            .axis_iter(Axis(1))
            .zip(mean.iter())
            .map(|(column, &mu)| {
                let variance = column.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
                let sigma = variance.sqrt();
                if sigma == 0.0 {
                    1.0
                } else {
                    sigma
                }
            })
            .collect();
        Self { mean, std }
    }

    /// Apply the fitted transform: `(x - mean) / std` per column.
    pub fn transform(&self, matrix: &Array2<f64>) -> Array2<f64> {
        let mut out = matrix.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let mu = self.mean[j];
            let sigma = self.std[j];
            column.mapv_inplace(|v| (v - mu) / sigma);
        }
        out
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}

/// Feature matrices for one dataset: raw values, normalized values, and the
/// scaler that links them.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Numeric field names, one per matrix column, in header order.
    pub fields: Vec<String>,
    /// Raw extracted values; unparseable cells contribute 0.0.
    pub raw: Array2<f64>,
    /// Z-score normalized values consumed by clustering.
    pub normalized: Array2<f64>,
    /// Scaler fitted on the raw matrix.
    pub scaler: StandardScaler,
}

/// Build the feature matrices for the classified numeric fields.
///
/// A cell that fails to parse contributes 0.0 by contract — clustering must
/// tolerate the substitution, it is not an error. Zero numeric fields yield
/// 0-width matrices and the caller skips clustering.
pub fn extract_features(dataset: &Dataset, numeric_fields: &[String]) -> FeatureSet {
    let n_rows = dataset.len();
    let indices: Vec<usize> = numeric_fields
        .iter()
        .filter_map(|f| dataset.column_index(f))
        .collect();

    let mut raw = Array2::zeros((n_rows, indices.len()));
    for row in 0..n_rows {
        for (j, &col) in indices.iter().enumerate() {
            raw[[row, j]] = dataset.value_at(row, col).as_number().unwrap_or(0.0);
        }
    }

    let scaler = StandardScaler::fit(&raw);
    let normalized = scaler.transform(&raw);

    FeatureSet {
        fields: numeric_fields.to_vec(),
        raw,
        normalized,
        scaler,
    }
}
