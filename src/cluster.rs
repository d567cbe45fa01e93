//! K-Means clustering engine.
//!
//! Standard Lloyd iteration over normalized feature vectors with k-means++
//! seeding. The random source is passed in by the caller so runs are
//! reproducible when a seed is configured.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::Rng;

/// Upper bound on the cluster count; small datasets use fewer.
pub const MAX_CLUSTERS: usize = 5;

/// Iteration cap; the only bound on runtime when assignments never stabilize.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Cluster count for a dataset: `min(5, dataset_size)`.
pub fn cluster_count(dataset_size: usize) -> usize {
    MAX_CLUSTERS.min(dataset_size)
}

/// Fitted K-Means model.
#[derive(Debug, Clone)]
pub struct KMeansModel {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Cluster assignment per input row, in row order.
    pub labels: Array1<usize>,
    /// Cluster centroids in normalized feature space, one row per cluster.
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares.
    pub inertia: f64,
    /// Iterations run before assignments stabilized (or the cap was hit).
    pub iterations: usize,
}

impl KMeansModel {
    /// Member count per cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Fit K-Means on a normalized feature matrix.
///
/// # Arguments
/// * `features` - normalized vectors, one row per data point
/// * `n_clusters` - number of clusters; must satisfy `1 <= k <= n_points`
/// * `max_iterations` - iteration cap
/// * `rng` - random source for k-means++ seeding
///
/// # Errors
/// Returns an error only for caller-contract violations (`k == 0` or more
/// clusters than points). Data-quality degradation never errors here; callers
/// skip clustering entirely when there are no usable features.
pub fn fit_kmeans(
    features: &Array2<f64>,
    n_clusters: usize,
    max_iterations: usize,
    rng: &mut StdRng,
) -> crate::Result<KMeansModel> {
    let n_points = features.nrows();
    if n_clusters == 0 {
        anyhow::bail!("cluster count must be at least 1");
    }
    if n_points < n_clusters {
        anyhow::bail!(
            "number of data points ({n_points}) must be at least the number of clusters ({n_clusters})"
        );
    }

    let mut centroids = init_centroids(features, n_clusters, rng);
    let mut labels = Array1::zeros(n_points);
    let mut iterations = 0;

    for iter in 0..max_iterations {
        iterations = iter + 1;

        // Assignment step. Ties go to the lowest cluster index.
        let mut changed = false;
        for (i, point) in features.outer_iter().enumerate() {
            let nearest = nearest_centroid(&point, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }
        if !changed && iter > 0 {
            log::debug!("k-means converged after {iterations} iterations");
            break;
        }

        // Update step: each centroid becomes the mean of its members. A
        // cluster left empty keeps its previous centroid.
        let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
        let mut counts = vec![0usize; n_clusters];
        for (i, point) in features.outer_iter().enumerate() {
            let cluster = labels[i];
            counts[cluster] += 1;
            for (j, &v) in point.iter().enumerate() {
                sums[[cluster, j]] += v;
            }
        }
        for cluster in 0..n_clusters {
            if counts[cluster] > 0 {
                for j in 0..centroids.ncols() {
                    centroids[[cluster, j]] = sums[[cluster, j]] / counts[cluster] as f64;
                }
            }
        }
    }

    let inertia = compute_inertia(features, &labels, &centroids);
    Ok(KMeansModel {
        n_clusters,
        labels,
        centroids,
        inertia,
        iterations,
    })
}

/// K-means++ seeding: first centroid uniform, the rest weighted by squared
/// distance to the nearest already-chosen centroid.
fn init_centroids(features: &Array2<f64>, n_clusters: usize, rng: &mut StdRng) -> Array2<f64> {
    let n_points = features.nrows();
    let mut centroids = Array2::zeros((n_clusters, features.ncols()));

    let first = rng.gen_range(0..n_points);
    centroids.row_mut(0).assign(&features.row(first));

    for chosen in 1..n_clusters {
        let weights: Vec<f64> = features
            .outer_iter()
            .map(|point| {
                (0..chosen)
                    .map(|c| squared_distance(&point, &centroids.row(c)))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        // All remaining points coincide with chosen centroids; fall back to a
        // uniform draw. Duplicate centroids then simply own empty clusters.
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut picked = n_points - 1;
            for (i, w) in weights.iter().enumerate() {
                target -= w;
                if target <= 0.0 {
                    picked = i;
                    break;
                }
            }
            picked
        } else {
            rng.gen_range(0..n_points)
        };
        centroids.row_mut(chosen).assign(&features.row(next));
    }

    centroids
}

/// Index of the nearest centroid by Euclidean distance; the lowest index wins
/// on ties.
fn nearest_centroid(point: &ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut min_distance = f64::INFINITY;
    let mut nearest = 0;
    for (cluster, centroid) in centroids.outer_iter().enumerate() {
        let distance = squared_distance(point, &centroid);
        if distance < min_distance {
            min_distance = distance;
            nearest = cluster;
        }
    }
    nearest
}

fn squared_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Within-cluster sum of squares.
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    features
        .outer_iter()
        .zip(labels.iter())
        .map(|(point, &cluster)| squared_distance(&point, &centroids.row(cluster)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_two_obvious_clusters() {
        let features = array![
            [0.0, 0.0],
            [0.1, -0.1],
            [-0.1, 0.1],
            [10.0, 10.0],
            [10.1, 9.9],
            [9.9, 10.1],
        ];
        let model = fit_kmeans(&features, 2, DEFAULT_MAX_ITERATIONS, &mut rng()).unwrap();

        assert_eq!(model.n_clusters, 2);
        assert_eq!(model.labels.len(), 6);
        // The two point groups must land in different clusters.
        assert_eq!(model.labels[0], model.labels[1]);
        assert_eq!(model.labels[0], model.labels[2]);
        assert_eq!(model.labels[3], model.labels[4]);
        assert_eq!(model.labels[3], model.labels[5]);
        assert_ne!(model.labels[0], model.labels[3]);

        let sizes = model.cluster_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 6);
    }

    #[test]
    fn test_single_point_single_cluster() {
        let features = array![[1.0, 2.0, 3.0]];
        let model = fit_kmeans(&features, 1, DEFAULT_MAX_ITERATIONS, &mut rng()).unwrap();
        assert_eq!(model.labels[0], 0);
        assert_eq!(model.centroids.row(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(model.inertia, 0.0);
    }

    #[test]
    fn test_duplicate_points_tolerated() {
        // More clusters than distinct locations: duplicates own empty
        // clusters, members all map to the lowest matching index.
        let features = array![[1.0], [1.0], [1.0], [5.0]];
        let model = fit_kmeans(&features, 4, DEFAULT_MAX_ITERATIONS, &mut rng()).unwrap();
        let sizes = model.cluster_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 4);
        // The three identical points share one cluster.
        assert_eq!(model.labels[0], model.labels[1]);
        assert_eq!(model.labels[1], model.labels[2]);
        assert_ne!(model.labels[0], model.labels[3]);
    }

    #[test]
    fn test_contract_violations_error() {
        let features = array![[1.0], [2.0]];
        assert!(fit_kmeans(&features, 0, 10, &mut rng()).is_err());
        assert!(fit_kmeans(&features, 3, 10, &mut rng()).is_err());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let features = array![
            [0.0, 1.0],
            [0.2, 0.8],
            [4.0, 4.2],
            [3.9, 4.1],
            [8.0, 0.1],
            [8.2, 0.0],
        ];
        let a = fit_kmeans(&features, 3, 100, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = fit_kmeans(&features, 3, 100, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_cluster_count_bound() {
        assert_eq!(cluster_count(1), 1);
        assert_eq!(cluster_count(4), 4);
        assert_eq!(cluster_count(5), 5);
        assert_eq!(cluster_count(10_000), 5);
    }
}
