//! SegmentForge: customer segmentation analytics over arbitrary CSV data.
//!
//! This library ingests tabular customer records with an unknown column set,
//! infers column roles heuristically, partitions customers into behavioral
//! segments with K-Means clustering, and derives summary metrics, monthly
//! trends, and explainable segment labels ("Premium", "At Risk", ...).

pub mod analysis;
pub mod cli;
pub mod cluster;
pub mod dataset;
pub mod features;
pub mod metrics;
pub mod sample;
pub mod schema;
pub mod segment;

// Re-export public items for easier access
pub use analysis::{analyze, analyze_with, AnalysisOptions, AnalysisReport, CustomerRecord};
pub use cli::Args;
pub use cluster::{cluster_count, fit_kmeans, KMeansModel};
pub use dataset::{Dataset, Value};
pub use features::{extract_features, FeatureSet, StandardScaler};
pub use metrics::{Metrics, MonthlyTrend, SegmentSummary};
pub use sample::generate_sample;
pub use schema::{ColumnRoles, FieldClassifier, HeuristicClassifier};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
