use crate::config::KMeansConfig;
use crate::distance::{assign_labels, compute_centroid_shift, compute_inertia, nearest_centroid};
use crate::error::KMeansError;
use log::{debug, info, trace, warn};
use ndarray::{Array1, Array2, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;

/// Number of coordinates in a color vector (r, g, b)
pub const N_CHANNELS: usize = 3;

/// Outcome of one randomized Lloyd run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Item indices per cluster, as assigned during the last iteration
    pub clusters: Vec<Vec<usize>>,
    /// Centroids after the last update step, shape (k, 3)
    pub centroids: Array2<f32>,
    /// Sum of squared distances of every item to its nearest final centroid
    pub inertia: f64,
}

/// Result of the multi-restart engine
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Centroids of the winning restart, shape (k, 3)
    pub centroids: Array2<f32>,
    /// Nearest-centroid label of every item against `centroids`
    pub labels: Array1<usize>,
    /// Item indices per cluster, consistent with `labels`. May contain empty groups.
    pub clusters: Vec<Vec<usize>>,
    /// Inertia of the winning restart
    pub inertia: f64,
    /// Inertia of every restart, in restart order
    pub run_inertias: Vec<f64>,
    /// Index of the winning restart
    pub best_run: usize,
    /// Base seed the restart streams were derived from
    pub seed: u64,
}

/// Run the full engine: `n_restarts` independent Lloyd runs, keep the one with
/// the lowest inertia, then label every item against its centroids.
///
/// Restarts run in parallel. Restart `i` draws from its own ChaCha stream `i`
/// of the base seed, and ties in inertia go to the lowest restart index, so
/// the result only depends on the seed.
pub fn kmeans_multi_restart(
    data: &ArrayView2<f32>,
    config: &KMeansConfig,
) -> Result<KMeansResult, KMeansError> {
    validate_config(config)?;
    validate_colors(data)?;

    let n_items = data.nrows();
    let k = config.k;
    if k > n_items {
        warn!(
            "k ({}) exceeds the number of items ({}); some clusters will stay empty",
            k, n_items
        );
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    debug!(
        "Clustering {} items into {} clusters: {} restarts x {} iterations, seed {}",
        n_items, k, config.n_restarts, config.iterations_per_run, seed
    );

    let start = Instant::now();
    let mut runs: Vec<RunResult> = (0..config.n_restarts)
        .into_par_iter()
        .map(|run| {
            let mut rng = restart_rng(seed, run);
            let centroids = random_centroids(k, &mut rng);
            let result = iterate(data, centroids, config.iterations_per_run, &mut rng);
            debug!(
                "  Restart {}/{}: inertia = {:.6}",
                run + 1,
                config.n_restarts,
                result.inertia
            );
            result
        })
        .collect();

    let best_run = select_best_run(&runs);
    let run_inertias: Vec<f64> = runs.iter().map(|r| r.inertia).collect();
    let best = runs.swap_remove(best_run);

    let labels = assign_labels(data, &best.centroids.view());
    let inertia = compute_inertia(data, &best.centroids.view(), &labels.view());
    let clusters = group_by_label(&labels, k);

    info!(
        "Kept restart {} of {} with inertia {:.6} ({:.4}s)",
        best_run + 1,
        config.n_restarts,
        inertia,
        start.elapsed().as_secs_f64()
    );

    Ok(KMeansResult {
        centroids: best.centroids,
        labels,
        clusters,
        inertia,
        run_inertias,
        best_run,
        seed,
    })
}

/// One randomized run: uniform random centroids in [0, 1]^3, then a fixed
/// number of Lloyd iterations.
///
/// # Errors
///
/// Returns an error if `k` is 0 or `data` is not a valid color matrix.
pub fn lloyd_run<R: Rng + ?Sized>(
    data: &ArrayView2<f32>,
    k: usize,
    iterations: usize,
    rng: &mut R,
) -> Result<RunResult, KMeansError> {
    if k == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }
    validate_colors(data)?;

    let centroids = random_centroids(k, rng);
    Ok(iterate(data, centroids, iterations, rng))
}

/// Run exactly `iterations` assign/update steps starting from `centroids`.
///
/// A cluster left without members gets a fresh uniform random centroid.
///
/// # Errors
///
/// Returns an error if `data` is not a valid color matrix or `centroids` is
/// not a non-empty (k, 3) matrix.
pub fn lloyd_iterations<R: Rng + ?Sized>(
    data: &ArrayView2<f32>,
    centroids: Array2<f32>,
    iterations: usize,
    rng: &mut R,
) -> Result<RunResult, KMeansError> {
    validate_colors(data)?;
    validate_centroids(&centroids.view())?;

    Ok(iterate(data, centroids, iterations, rng))
}

/// Lloyd loop over already validated inputs
fn iterate<R: Rng + ?Sized>(
    data: &ArrayView2<f32>,
    mut centroids: Array2<f32>,
    iterations: usize,
    rng: &mut R,
) -> RunResult {
    let k = centroids.nrows();
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); k];

    for iteration in 0..iterations {
        // Assignment
        clusters = vec![Vec::new(); k];
        for (i, row) in data.outer_iter().enumerate() {
            if let Some((cluster_idx, _)) = nearest_centroid(&row, &centroids.view()) {
                clusters[cluster_idx].push(i);
            }
        }

        // Update
        let prev_centroids = centroids.clone();
        let mut n_empty = 0;

        for (cluster_idx, members) in clusters.iter().enumerate() {
            if members.is_empty() {
                let fresh =
                    Array1::<f32>::random_using(N_CHANNELS, Uniform::new(0.0f32, 1.0), rng);
                centroids.row_mut(cluster_idx).assign(&fresh);
                n_empty += 1;
            } else {
                let mut sum = Array1::<f32>::zeros(N_CHANNELS);
                for &item_idx in members {
                    sum += &data.row(item_idx);
                }
                centroids
                    .row_mut(cluster_idx)
                    .assign(&(sum / members.len() as f32));
            }
        }

        trace!(
            "    Iteration {}/{}: shift = {:.6}, re-randomized {} empty clusters",
            iteration + 1,
            iterations,
            compute_centroid_shift(&prev_centroids.view(), &centroids.view()),
            n_empty
        );
    }

    let labels = assign_labels(data, &centroids.view());
    let inertia = compute_inertia(data, &centroids.view(), &labels.view());

    RunResult {
        clusters,
        centroids,
        inertia,
    }
}

/// Label every item with its nearest centroid of `run`
///
/// # Errors
///
/// Returns an error if `data` is not a valid color matrix or the run holds
/// no (k, 3) centroids.
pub fn final_labels(data: &ArrayView2<f32>, run: &RunResult) -> Result<Array1<usize>, KMeansError> {
    validate_colors(data)?;
    validate_centroids(&run.centroids.view())?;

    Ok(assign_labels(data, &run.centroids.view()))
}

/// k centroids with every coordinate drawn independently from U[0, 1)
pub fn random_centroids<R: Rng + ?Sized>(k: usize, rng: &mut R) -> Array2<f32> {
    Array2::random_using((k, N_CHANNELS), Uniform::new(0.0f32, 1.0), rng)
}

/// Independent random stream for restart `run`
fn restart_rng(seed: u64, run: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(run as u64);
    rng
}

/// Index of the run with the lowest inertia; the earliest wins ties
fn select_best_run(runs: &[RunResult]) -> usize {
    let mut best = 0;
    for (i, run) in runs.iter().enumerate().skip(1) {
        if run.inertia < runs[best].inertia {
            best = i;
        }
    }
    best
}

fn group_by_label(labels: &Array1<usize>, k: usize) -> Vec<Vec<usize>> {
    let mut clusters = vec![Vec::new(); k];
    for (i, &label) in labels.iter().enumerate() {
        clusters[label].push(i);
    }
    clusters
}

fn validate_config(config: &KMeansConfig) -> Result<(), KMeansError> {
    if config.k == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if config.iterations_per_run == 0 {
        return Err(KMeansError::InvalidConfig(
            "iterations_per_run must be greater than 0".to_string(),
        ));
    }

    if config.n_restarts == 0 {
        return Err(KMeansError::InvalidConfig(
            "n_restarts must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Check that there is at least one centroid and each has 3 channels
fn validate_centroids(centroids: &ArrayView2<f32>) -> Result<(), KMeansError> {
    if centroids.nrows() == 0 {
        return Err(KMeansError::InvalidK(
            "at least one centroid is required".to_string(),
        ));
    }

    if centroids.ncols() != N_CHANNELS {
        return Err(KMeansError::InvalidDimensions(format!(
            "Expected {} centroid channels, got {}",
            N_CHANNELS,
            centroids.ncols()
        )));
    }

    Ok(())
}

/// Check that `data` is a non-empty (n, 3) matrix of finite values in [0, 1]
pub(crate) fn validate_colors(data: &ArrayView2<f32>) -> Result<(), KMeansError> {
    if data.nrows() == 0 {
        return Err(KMeansError::InsufficientData(
            "at least one item is required".to_string(),
        ));
    }

    if data.ncols() != N_CHANNELS {
        return Err(KMeansError::InvalidDimensions(format!(
            "Expected {} color channels, got {}",
            N_CHANNELS,
            data.ncols()
        )));
    }

    for (index, row) in data.outer_iter().enumerate() {
        if let Some(&value) = row.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(KMeansError::ColorOutOfRange { index, value });
        }
    }

    Ok(())
}
