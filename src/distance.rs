use ndarray::{Array1, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Squared Euclidean distance between two color vectors
#[inline]
pub fn squared_distance(a: &ArrayView1<f32>, b: &ArrayView1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(&x, &y)| (x - y) * (x - y)).sum()
}

/// Euclidean distance between two color vectors: sqrt(dr^2 + dg^2 + db^2)
#[inline]
pub fn euclidean_distance(a: &ArrayView1<f32>, b: &ArrayView1<f32>) -> f32 {
    squared_distance(a, b).sqrt()
}

/// Find the centroid closest to `point`.
///
/// Centroids are scanned in index order and only a strictly smaller distance
/// replaces the current best, so ties go to the lowest index.
///
/// # Returns
/// * `(index, distance)` of the nearest centroid, or `None` if there are no
///   centroids
pub fn nearest_centroid(
    point: &ArrayView1<f32>,
    centroids: &ArrayView2<f32>,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;

    for (j, centroid) in centroids.outer_iter().enumerate() {
        let dist = euclidean_distance(point, &centroid);
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((j, dist));
        }
    }

    best
}

/// Assign every row of `data` to its nearest centroid.
///
/// Callers pass at least one centroid.
pub(crate) fn assign_labels(data: &ArrayView2<f32>, centroids: &ArrayView2<f32>) -> Array1<usize> {
    let labels: Vec<usize> = (0..data.nrows())
        .into_par_iter()
        .map(|i| nearest_centroid(&data.row(i), centroids).map_or(0, |(idx, _)| idx))
        .collect();

    Array1::from_vec(labels)
}

/// Sum of squared distances from every row to the centroid it is labeled with.
///
/// Every label must index a row of `centroids`.
pub(crate) fn compute_inertia(
    data: &ArrayView2<f32>,
    centroids: &ArrayView2<f32>,
    labels: &ArrayView1<usize>,
) -> f64 {
    data.outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| squared_distance(&row, &centroids.row(label)) as f64)
        .sum()
}

/// Compute centroid shift (sum of L2 norms of centroid movements)
pub fn compute_centroid_shift(
    old_centroids: &ArrayView2<f32>,
    new_centroids: &ArrayView2<f32>,
) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_c, new_c)| euclidean_distance(&old_c, &new_c) as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_euclidean_distance() {
        let a = array![0.0f32, 0.0, 0.0];
        let b = array![1.0f32, 1.0, 1.0];

        assert_relative_eq!(euclidean_distance(&a.view(), &b.view()), 3.0f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(
            euclidean_distance(&a.view(), &b.view()),
            euclidean_distance(&b.view(), &a.view())
        );
        assert_eq!(euclidean_distance(&b.view(), &b.view()), 0.0);
    }

    #[test]
    fn test_nearest_centroid() {
        let centroids = array![[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]];

        let (idx, dist) =
            nearest_centroid(&array![0.9f32, 0.9, 1.0].view(), &centroids.view()).unwrap();
        assert_eq!(idx, 1);
        assert!(dist < 0.2);
    }

    #[test]
    fn test_nearest_centroid_tie_goes_to_lowest_index() {
        // (0.5, 0.5, 0.5) is equidistant from all three
        let centroids = array![[0.5f32, 0.5, 1.0], [0.5, 0.5, 0.0], [0.5, 1.0, 0.5]];
        let point = array![0.5f32, 0.5, 0.5];

        let (idx, _) = nearest_centroid(&point.view(), &centroids.view()).unwrap();
        assert_eq!(idx, 0);

        let (idx, _) =
            nearest_centroid(&point.view(), &centroids.slice(ndarray::s![1.., ..])).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_nearest_centroid_without_centroids() {
        let centroids = Array2::<f32>::zeros((0, 3));
        let point = array![0.5f32, 0.5, 0.5];

        assert_eq!(nearest_centroid(&point.view(), &centroids.view()), None);
    }

    #[test]
    fn test_assign_labels_and_inertia() {
        let data = array![[0.0f32, 0.0, 0.0], [0.1, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let centroids = array![[0.05f32, 0.0, 0.0], [1.0, 1.0, 1.0]];

        let labels = assign_labels(&data.view(), &centroids.view());
        assert_eq!(labels.to_vec(), vec![0, 0, 1]);

        let inertia = compute_inertia(&data.view(), &centroids.view(), &labels.view());
        assert_relative_eq!(inertia, 2.0 * 0.05f64 * 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_centroid_shift() {
        let old = array![[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let new = array![[1.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]];

        let shift = compute_centroid_shift(&old.view(), &new.view());
        assert_relative_eq!(shift, 1.0, epsilon = 1e-6);
    }
}
