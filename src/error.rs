use thiserror::Error;

/// Error types for the colorkmeans library
#[derive(Error, Debug)]
pub enum KMeansError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Iteration budget or restart count is invalid (must be > 0)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No items were supplied to cluster
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call train() or fit() first.")]
    NotFitted,

    /// Data is not shaped as (n_items, 3) color rows
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A color coordinate is not a finite value in [0, 1]
    #[error("Color coordinate of item {index} is out of range [0, 1]: {value}")]
    ColorOutOfRange { index: usize, value: f32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed color table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}
