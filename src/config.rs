/// Configuration for the multi-restart k-means engine
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Number of Lloyd iterations performed by every restart.
    /// There is no convergence test: each run always performs exactly this many.
    pub iterations_per_run: usize,

    /// Number of independent randomized restarts. The run with the lowest
    /// inertia is kept.
    pub n_restarts: usize,

    /// Random seed for centroid initialization. `None` draws a fresh seed from
    /// the OS on every training call, so each call yields an independent result.
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 4,
            iterations_per_run: 20,
            n_restarts: 32,
            seed: None,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the number of iterations per restart
    pub fn with_iterations_per_run(mut self, iterations: usize) -> Self {
        self.iterations_per_run = iterations;
        self
    }

    /// Set the number of restarts
    pub fn with_n_restarts(mut self, n_restarts: usize) -> Self {
        self.n_restarts = n_restarts;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Go back to drawing a fresh seed on every run
    pub fn without_seed(mut self) -> Self {
        self.seed = None;
        self
    }
}
