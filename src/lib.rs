//! # colorkmeans-rs
//!
//! Groups items by their average RGB color with a best-of-N k-means engine.
//!
//! ## Algorithm
//!
//! - **Uniform random initialization**: every centroid coordinate is drawn from
//!   U[0, 1), independent of the data
//! - **Fixed iteration budget**: each run performs exactly `iterations_per_run`
//!   Lloyd iterations (default 20), there is no convergence test
//! - **Empty clusters** get a fresh random centroid on every update step
//! - **Multi-restart selection**: `n_restarts` runs (default 32) execute in
//!   parallel with rayon, each on its own ChaCha stream; the run with the
//!   lowest inertia is kept and every item is labeled against its centroids
//!
//! ## Example
//!
//! ```rust
//! use colorkmeans_rs::{ColorKMeans, KMeansConfig};
//! use ndarray::array;
//!
//! let data = array![
//!     [0.0f32, 0.0, 0.0],
//!     [0.02, 0.0, 0.0],
//!     [1.0, 1.0, 1.0],
//!     [0.98, 1.0, 1.0],
//!     [0.5, 0.5, 0.5],
//! ];
//!
//! let config = KMeansConfig::new(2).with_seed(42);
//! let mut kmeans = ColorKMeans::with_config(config);
//! let result = kmeans.train(&data.view()).unwrap();
//!
//! assert_eq!(result.labels.len(), 5);
//! assert_eq!(result.centroids.nrows(), 2);
//! ```
//!
//! ## Loading items
//!
//! Items come from a [`ColorProvider`]: either a JSON [`ColorTable`] or an
//! [`ImageDirectory`] whose images are averaged pixel by pixel.

mod algorithm;
mod config;
mod distance;
mod error;
mod item;
mod kmeans;
pub mod report;
pub mod source;

pub use algorithm::{
    final_labels, kmeans_multi_restart, lloyd_iterations, lloyd_run, random_centroids,
    KMeansResult, RunResult,
};
pub use config::KMeansConfig;
pub use distance::{euclidean_distance, nearest_centroid};
pub use error::KMeansError;
pub use item::{color_matrix, ColorVector, Item};
pub use kmeans::ColorKMeans;
pub use source::{ColorProvider, ColorTable, ImageDirectory};
