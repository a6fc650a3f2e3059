use crate::algorithm::{kmeans_multi_restart, validate_colors, KMeansResult, N_CHANNELS};
use crate::config::KMeansConfig;
use crate::distance::assign_labels;
use crate::error::KMeansError;
use crate::item::{color_matrix, Item};
use ndarray::{Array1, Array2, ArrayView2};

/// Best-of-N k-means over RGB color vectors.
///
/// Each training call runs `n_restarts` independent Lloyd runs from uniform
/// random centroids, keeps the one with the lowest inertia and labels every
/// item against its centroids.
///
/// # Example
///
/// ```
/// use colorkmeans_rs::{ColorKMeans, ColorVector, Item, KMeansConfig};
///
/// let mut items = vec![
///     Item::new("coal", ColorVector::new(0.0, 0.0, 0.0), "coal.png"),
///     Item::new("soot", ColorVector::new(0.02, 0.0, 0.0), "soot.png"),
///     Item::new("snow", ColorVector::new(1.0, 1.0, 1.0), "snow.png"),
/// ];
///
/// let mut kmeans = ColorKMeans::with_config(KMeansConfig::new(2).with_seed(7));
/// let result = kmeans.cluster_items(&mut items).unwrap();
///
/// assert_eq!(result.centroids.nrows(), 2);
/// assert_eq!(items[0].cluster, items[1].cluster);
/// ```
pub struct ColorKMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Result of the last training call (None if not yet fitted)
    result: Option<KMeansResult>,
}

impl ColorKMeans {
    /// Create a new instance with `k` clusters and default settings
    /// (20 iterations per run, 32 restarts, unseeded).
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    /// Create a new instance with custom configuration.
    ///
    /// The configuration is validated when training, not here.
    pub fn with_config(config: KMeansConfig) -> Self {
        Self {
            config,
            result: None,
        }
    }

    /// Train the model on an (n_items, 3) matrix of colors in [0, 1].
    ///
    /// Every call is a fresh run from scratch; an unseeded configuration
    /// yields an independent result each time.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - k, the iteration budget or the restart count is 0
    /// - There are no rows, or rows do not have 3 channels
    /// - A coordinate is not a finite value in [0, 1]
    pub fn train(&mut self, data: &ArrayView2<f32>) -> Result<&KMeansResult, KMeansError> {
        let result = kmeans_multi_restart(data, &self.config)?;
        Ok(&*self.result.insert(result))
    }

    /// Fit the model to the data. Equivalent to `train()`.
    pub fn fit(&mut self, data: &ArrayView2<f32>) -> Result<&mut Self, KMeansError> {
        self.train(data)?;
        Ok(self)
    }

    /// Label each row of `data` with its nearest trained centroid.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been fitted yet or the data is
    /// not a valid color matrix.
    pub fn predict(&self, data: &ArrayView2<f32>) -> Result<Array1<usize>, KMeansError> {
        let result = self.result.as_ref().ok_or(KMeansError::NotFitted)?;
        if data.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }
        if data.ncols() != N_CHANNELS {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                N_CHANNELS,
                data.ncols()
            )));
        }
        validate_colors(data)?;

        Ok(assign_labels(data, &result.centroids.view()))
    }

    /// Fit the model and return the labels of the training data
    pub fn fit_predict(&mut self, data: &ArrayView2<f32>) -> Result<Array1<usize>, KMeansError> {
        Ok(self.train(data)?.labels.clone())
    }

    /// Cluster `items` by color and annotate each with its cluster index
    pub fn cluster_items(&mut self, items: &mut [Item]) -> Result<&KMeansResult, KMeansError> {
        let data = color_matrix(items);
        let result = kmeans_multi_restart(&data.view(), &self.config)?;

        for (item, &label) in items.iter_mut().zip(result.labels.iter()) {
            item.cluster = Some(label);
        }

        Ok(&*self.result.insert(result))
    }

    /// Get the centroids of the fitted model.
    pub fn centroids(&self) -> Option<&Array2<f32>> {
        self.result.as_ref().map(|r| &r.centroids)
    }

    /// Inertia of the kept restart
    pub fn inertia(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.inertia)
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ColorVector;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    #[test]
    fn test_colorkmeans_new() {
        let kmeans = ColorKMeans::new(4);
        assert_eq!(kmeans.k(), 4);
        assert_eq!(kmeans.config().iterations_per_run, 20);
        assert!(kmeans.centroids().is_none());
        assert!(kmeans.inertia().is_none());
    }

    #[test]
    fn test_colorkmeans_train() {
        let data = Array2::random((50, 3), Uniform::new(0.0f32, 1.0));
        let mut kmeans = ColorKMeans::new(4);

        kmeans.train(&data.view()).unwrap();

        let centroids = kmeans.centroids().unwrap();
        assert_eq!(centroids.nrows(), 4);
        assert_eq!(centroids.ncols(), 3);
        assert!(kmeans.inertia().unwrap() >= 0.0);
    }

    #[test]
    fn test_colorkmeans_predict() {
        let train_data = Array2::random((40, 3), Uniform::new(0.0f32, 1.0));
        let test_data = Array2::random((10, 3), Uniform::new(0.0f32, 1.0));

        let mut kmeans = ColorKMeans::new(3);
        kmeans.fit(&train_data.view()).unwrap();

        let labels = kmeans.predict(&test_data.view()).unwrap();
        assert_eq!(labels.len(), 10);
        assert!(labels.iter().all(|&l| l < 3));
    }

    #[test]
    fn test_fit_predict_matches_predict() {
        let data = Array2::random((30, 3), Uniform::new(0.0f32, 1.0));
        let mut kmeans = ColorKMeans::with_config(KMeansConfig::new(4).with_seed(11));

        let labels = kmeans.fit_predict(&data.view()).unwrap();
        assert_eq!(labels, kmeans.predict(&data.view()).unwrap());
    }

    #[test]
    fn test_colorkmeans_predict_before_fit() {
        let data = Array2::random((5, 3), Uniform::new(0.0f32, 1.0));
        let kmeans = ColorKMeans::new(2);

        assert!(matches!(kmeans.predict(&data.view()), Err(KMeansError::NotFitted)));
    }

    #[test]
    fn test_colorkmeans_dimension_mismatch() {
        let train_data = Array2::random((20, 3), Uniform::new(0.0f32, 1.0));
        let test_data = Array2::random((5, 4), Uniform::new(0.0f32, 1.0));

        let mut kmeans = ColorKMeans::new(2);
        kmeans.train(&train_data.view()).unwrap();

        let result = kmeans.predict(&test_data.view());
        assert!(matches!(result, Err(KMeansError::InvalidDimensions(_))));
    }

    #[test]
    fn test_colorkmeans_k_zero() {
        let data = array![[0.1f32, 0.2, 0.3]];
        let mut kmeans = ColorKMeans::new(0);

        assert!(matches!(kmeans.train(&data.view()), Err(KMeansError::InvalidK(_))));
    }

    #[test]
    fn test_cluster_items_annotates() {
        let mut items = vec![
            Item::new("a", ColorVector::new(0.0, 0.0, 0.0), "a.png"),
            Item::new("b", ColorVector::new(1.0, 1.0, 1.0), "b.png"),
        ];
        let mut kmeans = ColorKMeans::with_config(KMeansConfig::new(2).with_seed(5));

        let labels = kmeans.cluster_items(&mut items).unwrap().labels.clone();

        for (item, &label) in items.iter().zip(labels.iter()) {
            assert_eq!(item.cluster, Some(label));
        }
        assert_ne!(items[0].cluster, items[1].cluster);
    }
}
