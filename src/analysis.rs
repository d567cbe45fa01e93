//! End-to-end analysis pipeline.
//!
//! One dataset in, one complete report out: classify fields, extract and
//! normalize features, cluster, name segments, aggregate metrics. Everything
//! is recomputed from scratch per invocation — there is no incremental state
//! shared across runs. Data-quality problems degrade the output (zero
//! substitution, fallback names, filler trend) instead of failing it; only
//! the empty-dataset precondition is an error.

use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cluster::{self, KMeansModel};
use crate::dataset::Dataset;
use crate::features::extract_features;
use crate::metrics::{self, Metrics};
use crate::schema::{ColumnRoles, FieldClassifier, HeuristicClassifier};
use crate::segment;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Seed for clustering initialization and trend jitter. `None` draws
    /// from entropy; set it for reproducible runs.
    pub seed: Option<u64>,
    /// K-Means iteration cap.
    pub max_iterations: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_iterations: cluster::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// One input row with its derived attributes. Produced 1:1 with input rows,
/// in input order, and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecord {
    /// Index of the source row in the dataset.
    pub index: usize,
    /// Assigned cluster id in `0..k`.
    pub cluster: usize,
    /// Human-readable segment label.
    pub segment: String,
    /// Raw value of the primary monetary field, 0.0 when absent.
    pub monetary_value: f64,
    /// Raw numeric feature values, one per classified numeric field.
    pub features: Vec<f64>,
}

/// Per-cluster statistics for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub id: usize,
    pub size: usize,
    pub name: String,
    /// Centroid in normalized feature space.
    pub centroid: Vec<f64>,
}

/// Complete output of one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub roles: ColumnRoles,
    pub clusters: Vec<ClusterSummary>,
    pub records: Vec<CustomerRecord>,
    pub metrics: Metrics,
}

/// Analyze a dataset with the default heuristic field classifier.
pub fn analyze(dataset: &Dataset, options: &AnalysisOptions) -> crate::Result<AnalysisReport> {
    analyze_with(dataset, options, &HeuristicClassifier)
}

/// Analyze a dataset with a caller-supplied field classifier.
pub fn analyze_with(
    dataset: &Dataset,
    options: &AnalysisOptions,
    classifier: &dyn FieldClassifier,
) -> crate::Result<AnalysisReport> {
    if dataset.is_empty() {
        anyhow::bail!("dataset contains no rows; at least one data row is required");
    }

    let n_rows = dataset.len();
    let roles = classifier.classify(dataset);
    let features = extract_features(dataset, &roles.numeric);

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let model = if roles.numeric.is_empty() {
        log::info!("no numeric fields detected; skipping clustering");
        single_pseudo_cluster(n_rows)
    } else {
        let k = cluster::cluster_count(n_rows);
        cluster::fit_kmeans(&features.normalized, k, options.max_iterations, &mut rng)?
    };

    let monetary_values = monetary_column(dataset, &roles);
    let names = name_clusters(&model, &roles, &monetary_values, n_rows);

    let records: Vec<CustomerRecord> = (0..n_rows)
        .map(|i| {
            let cluster = model.labels[i];
            CustomerRecord {
                index: i,
                cluster,
                segment: names[cluster].clone(),
                monetary_value: monetary_values[i],
                features: features.raw.row(i).to_vec(),
            }
        })
        .collect();

    let dates = temporal_column(dataset, &roles);
    let segment_names: Vec<String> = records.iter().map(|r| r.segment.clone()).collect();
    let metrics = metrics::build_metrics(&segment_names, &monetary_values, &dates, &mut rng);

    let sizes = model.cluster_sizes();
    let clusters = (0..model.n_clusters)
        .map(|id| ClusterSummary {
            id,
            size: sizes[id],
            name: names[id].clone(),
            centroid: model.centroids.row(id).to_vec(),
        })
        .collect();

    Ok(AnalysisReport {
        roles,
        clusters,
        records,
        metrics,
    })
}

/// Degenerate path: no usable numeric data, every row joins cluster 0.
fn single_pseudo_cluster(n_rows: usize) -> KMeansModel {
    KMeansModel {
        n_clusters: 1,
        labels: Array1::zeros(n_rows),
        centroids: Array2::zeros((1, 0)),
        inertia: 0.0,
        iterations: 0,
    }
}

/// Raw primary-monetary value per row, 0.0 when the field is absent or the
/// cell does not parse.
fn monetary_column(dataset: &Dataset, roles: &ColumnRoles) -> Vec<f64> {
    match roles.primary_monetary() {
        Some(field) => (0..dataset.len())
            .map(|row| {
                dataset
                    .get(row, field)
                    .and_then(|v| v.as_number())
                    .unwrap_or(0.0)
            })
            .collect(),
        None => vec![0.0; dataset.len()],
    }
}

/// Parsed primary-temporal date per row.
fn temporal_column(dataset: &Dataset, roles: &ColumnRoles) -> Vec<Option<NaiveDate>> {
    match roles.primary_temporal() {
        Some(field) => (0..dataset.len())
            .map(|row| dataset.get(row, field).and_then(metrics::parse_date))
            .collect(),
        None => vec![None; dataset.len()],
    }
}

/// Name every cluster.
///
/// The monetary basis applies when the primary monetary field is also
/// numeric-classified; the average fed to the namer is the raw per-cluster
/// monetary mean, compared against the raw mean over ALL rows. Without a
/// usable monetary field, names come from relative cluster size alone.
fn name_clusters(
    model: &KMeansModel,
    roles: &ColumnRoles,
    monetary_values: &[f64],
    n_rows: usize,
) -> Vec<String> {
    let sizes = model.cluster_sizes();
    let monetary_usable = roles
        .primary_monetary()
        .is_some_and(|field| roles.numeric.iter().any(|n| n == field));

    if monetary_usable {
        let overall_avg = monetary_values.iter().sum::<f64>() / n_rows as f64;
        let mut sums = vec![0.0; model.n_clusters];
        for (i, &value) in monetary_values.iter().enumerate() {
            sums[model.labels[i]] += value;
        }
        (0..model.n_clusters)
            .map(|c| {
                let avg = if sizes[c] == 0 {
                    0.0
                } else {
                    sums[c] / sizes[c] as f64
                };
                let relative = sizes[c] as f64 / n_rows as f64;
                segment::name_by_value(avg, overall_avg, relative).to_string()
            })
            .collect()
    } else {
        (0..model.n_clusters)
            .map(|c| {
                let relative = sizes[c] as f64 / n_rows as f64;
                segment::name_by_size(relative).to_string()
            })
            .collect()
    }
}
