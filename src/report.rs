//! Presentation model for a clustering result.
//!
//! Nothing here holds ambient state: a [`PlotScene`] is rebuilt from the
//! previous scene plus a new result, so view state such as the camera is
//! carried over explicitly between re-runs.

use crate::algorithm::{KMeansResult, N_CHANNELS};
use crate::error::KMeansError;
use crate::item::{ColorVector, Item};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Items of one cluster, sorted by name
#[derive(Debug, Clone, Serialize)]
pub struct ClusterGroup {
    pub index: usize,
    pub centroid: ColorVector,
    pub centroid_rgb: String,
    pub items: Vec<Item>,
}

/// Grouped listing of a clustering result
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    pub groups: Vec<ClusterGroup>,
    pub inertia: f64,
}

impl ClusterReport {
    /// Group `items` by the clusters of `result`.
    ///
    /// # Errors
    ///
    /// Returns an error if `result` was not computed over `items`.
    pub fn new(items: &[Item], result: &KMeansResult) -> Result<Self, KMeansError> {
        check_result(items, result)?;

        let groups = result
            .clusters
            .iter()
            .enumerate()
            .map(|(index, members)| -> Result<ClusterGroup, KMeansError> {
                let centroid = ColorVector::try_from(result.centroids.row(index))?;
                let mut group_items = members
                    .iter()
                    .map(|&i| -> Result<Item, KMeansError> {
                        let mut item = member(items, i)?.clone();
                        item.cluster = Some(index);
                        Ok(item)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                group_items.sort_by(|a, b| compare_names(&a.name, &b.name));

                Ok(ClusterGroup {
                    index,
                    centroid,
                    centroid_rgb: centroid.rgb_string(),
                    items: group_items,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            groups,
            inertia: result.inertia,
        })
    }
}

/// Plain-text listing, one block per cluster
impl fmt::Display for ClusterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(
                f,
                "Cluster {} (centroid {}, {} items)",
                group.index + 1,
                group.centroid_rgb,
                group.items.len()
            )?;
            for item in &group.items {
                writeln!(f, "  {:<24} {:<20} {}", item.name, item.rgb_string, item.thumbnail)?;
            }
        }
        writeln!(f, "Inertia: {:.6}", self.inertia)
    }
}

/// Check that `result` labels exactly `items` and has one (r, g, b) centroid
/// per cluster
fn check_result(items: &[Item], result: &KMeansResult) -> Result<(), KMeansError> {
    if result.labels.len() != items.len() {
        return Err(KMeansError::InvalidDimensions(format!(
            "result labels {} items, got {}",
            result.labels.len(),
            items.len()
        )));
    }

    let (n_centroids, n_channels) = result.centroids.dim();
    if n_centroids != result.clusters.len() || n_channels != N_CHANNELS {
        return Err(KMeansError::InvalidDimensions(format!(
            "expected {} centroids of {} channels, got shape ({}, {})",
            result.clusters.len(),
            N_CHANNELS,
            n_centroids,
            n_channels
        )));
    }

    Ok(())
}

fn member(items: &[Item], index: usize) -> Result<&Item, KMeansError> {
    items.get(index).ok_or_else(|| {
        KMeansError::InvalidDimensions(format!(
            "cluster member {} is out of range for {} items",
            index,
            items.len()
        ))
    })
}

/// Case-insensitive name order, falling back to byte order
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// 3D view position, in plot coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: [1.25, 1.25, 1.25],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenePoint {
    pub position: ColorVector,
    pub color: String,
    pub label: String,
    pub cluster: usize,
}

/// Segment from a centroid to one of its member items
#[derive(Debug, Clone, Serialize)]
pub struct SceneLine {
    pub from: ColorVector,
    pub to: ColorVector,
    pub color: String,
}

/// Scatter plot of items and centroids in RGB space
#[derive(Debug, Clone, Serialize)]
pub struct PlotScene {
    pub camera: Camera,
    /// Number of results rendered into this scene so far
    pub generation: u64,
    pub points: Vec<ScenePoint>,
    pub centroids: Vec<ScenePoint>,
    pub lines: Vec<SceneLine>,
}

impl PlotScene {
    /// First rendering of a result
    ///
    /// # Errors
    ///
    /// Returns an error if `result` was not computed over `items`.
    pub fn new(camera: Camera, items: &[Item], result: &KMeansResult) -> Result<Self, KMeansError> {
        let mut scene = Self {
            camera,
            generation: 0,
            points: Vec::new(),
            centroids: Vec::new(),
            lines: Vec::new(),
        };
        scene.fill(items, result)?;
        Ok(scene)
    }

    /// Render a new result into this scene, keeping its camera.
    ///
    /// The scene is consumed even when `result` does not match `items`.
    pub fn rerender(mut self, items: &[Item], result: &KMeansResult) -> Result<Self, KMeansError> {
        self.fill(items, result)?;
        self.generation += 1;
        Ok(self)
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    fn fill(&mut self, items: &[Item], result: &KMeansResult) -> Result<(), KMeansError> {
        check_result(items, result)?;

        self.points.clear();
        self.centroids.clear();
        self.lines.clear();

        for (cluster, members) in result.clusters.iter().enumerate() {
            let centroid = ColorVector::try_from(result.centroids.row(cluster))?;
            for &i in members {
                let item = member(items, i)?;
                self.lines.push(SceneLine {
                    from: centroid,
                    to: item.color,
                    color: item.color.rgb_string(),
                });
                self.points.push(ScenePoint {
                    position: item.color,
                    color: item.color.rgb_string(),
                    label: item.name.clone(),
                    cluster,
                });
            }
        }

        for (cluster, row) in result.centroids.outer_iter().enumerate() {
            let centroid = ColorVector::try_from(row)?;
            self.centroids.push(ScenePoint {
                position: centroid,
                color: centroid.rgb_string(),
                label: format!("Centroid {}: {}", cluster + 1, centroid.rgb_string()),
                cluster,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn sample() -> (Vec<Item>, KMeansResult) {
        let items = vec![
            Item::new("texas", ColorVector::new(0.9, 0.1, 0.1), "t/Texas.png"),
            Item::new("Alabama", ColorVector::new(1.0, 0.0, 0.0), "t/Alabama.png"),
            Item::new("Ohio", ColorVector::new(0.0, 0.0, 1.0), "t/Ohio.png"),
        ];
        let result = KMeansResult {
            centroids: array![[0.95f32, 0.05, 0.05], [0.0, 0.0, 1.0], [0.5, 0.5, 0.5]],
            labels: Array1::from_vec(vec![0, 0, 1]),
            clusters: vec![vec![0, 1], vec![2], vec![]],
            inertia: 0.015,
            run_inertias: vec![0.015],
            best_run: 0,
            seed: 1,
        };
        (items, result)
    }

    #[test]
    fn test_report_groups_sorted_by_name() {
        let (items, result) = sample();
        let report = ClusterReport::new(&items, &result).unwrap();

        assert_eq!(report.groups.len(), 3);
        let names: Vec<&str> = report.groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alabama", "texas"]);
        assert!(report.groups[2].items.is_empty());
        assert_eq!(report.groups[1].items[0].cluster, Some(1));

        let text = report.to_string();
        assert!(text.contains("Cluster 1 (centroid rgb(242, 13, 13), 2 items)"));
        assert!(text.contains("Cluster 3 (centroid rgb(128, 128, 128), 0 items)"));
        assert!(text.ends_with("Inertia: 0.015000\n"));
    }

    #[test]
    fn test_report_rejects_result_of_other_items() {
        let (items, result) = sample();

        let too_few = &items[..2];
        assert!(matches!(
            ClusterReport::new(too_few, &result),
            Err(KMeansError::InvalidDimensions(_))
        ));
        assert!(PlotScene::new(Camera::default(), too_few, &result).is_err());

        let mut narrow = result.clone();
        narrow.centroids = array![[0.9f32, 0.1], [0.0, 1.0], [0.5, 0.5]];
        assert!(matches!(
            ClusterReport::new(&items, &narrow),
            Err(KMeansError::InvalidDimensions(_))
        ));

        let mut stray = result.clone();
        stray.clusters[1] = vec![7];
        assert!(ClusterReport::new(&items, &stray).is_err());
        let scene = PlotScene::new(Camera::default(), &items, &result).unwrap();
        assert!(scene.rerender(&items, &stray).is_err());
    }

    #[test]
    fn test_rerender_keeps_camera() {
        let (items, result) = sample();
        let camera = Camera {
            eye: [2.0, 0.5, 0.1],
            ..Camera::default()
        };

        let scene = PlotScene::new(Camera::default(), &items, &result)
            .unwrap()
            .with_camera(camera);
        assert_eq!(scene.points.len(), 3);
        assert_eq!(scene.lines.len(), 3);
        assert_eq!(scene.centroids.len(), 3);

        let scene = scene.rerender(&items, &result).unwrap();
        assert_eq!(scene.camera, camera);
        assert_eq!(scene.generation, 1);
        assert_eq!(scene.points.len(), 3);
    }
}
