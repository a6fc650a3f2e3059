use crate::error::KMeansError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized (r, g, b) color, each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorVector(pub [f32; 3]);

impl ColorVector {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }

    /// Channels scaled back to 0..=255 and rounded
    pub fn to_rgb8(&self) -> [u8; 3] {
        self.0.map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    /// CSS-style `rgb(r, g, b)` string
    pub fn rgb_string(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("rgb({}, {}, {})", r, g, b)
    }
}

impl TryFrom<ArrayView1<'_, f32>> for ColorVector {
    type Error = KMeansError;

    fn try_from(row: ArrayView1<'_, f32>) -> Result<Self, Self::Error> {
        if row.len() != 3 {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected 3 color channels, got {}",
                row.len()
            )));
        }
        Ok(Self([row[0], row[1], row[2]]))
    }
}

impl fmt::Display for ColorVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.r(), self.g(), self.b())
    }
}

/// A named thing to cluster by its color.
///
/// Field names follow the JSON color table format
/// (`name`, `color`, `rgbString`, `thumbnail`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub color: ColorVector,
    pub rgb_string: String,
    pub thumbnail: String,

    /// Cluster index assigned by the last clustering run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
}

impl Item {
    /// Build an item whose display string is derived from its color
    pub fn new(name: impl Into<String>, color: ColorVector, thumbnail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rgb_string: color.rgb_string(),
            color,
            thumbnail: thumbnail.into(),
            cluster: None,
        }
    }
}

/// Stack item colors into an (n_items, 3) matrix
pub fn color_matrix(items: &[Item]) -> Array2<f32> {
    Array2::from_shape_fn((items.len(), 3), |(i, j)| items[i].color.0[j])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_string() {
        let color = ColorVector::new(1.0, 0.5, 0.0);
        assert_eq!(color.rgb_string(), "rgb(255, 128, 0)");
    }

    #[test]
    fn test_item_json_field_names() {
        let item = Item::new("New York", ColorVector::new(0.2, 0.3, 0.4), "thumbs/New_York.png");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["name"], "New York");
        assert_eq!(json["rgbString"], "rgb(51, 77, 102)");
        assert_eq!(json["thumbnail"], "thumbs/New_York.png");
        assert_eq!(json["color"].as_array().unwrap().len(), 3);
        assert!(json.get("cluster").is_none());
    }

    #[test]
    fn test_color_matrix() {
        let items = vec![
            Item::new("a", ColorVector::new(0.1, 0.2, 0.3), "a.png"),
            Item::new("b", ColorVector::new(0.4, 0.5, 0.6), "b.png"),
        ];
        let data = color_matrix(&items);

        assert_eq!(data.dim(), (2, 3));
        assert_eq!(data[[1, 2]], 0.6);
        assert_eq!(ColorVector::try_from(data.row(0)).unwrap(), items[0].color);
    }

    #[test]
    fn test_color_from_row_needs_three_channels() {
        let short = Array2::<f32>::zeros((1, 2));
        let long = Array2::<f32>::zeros((1, 4));

        assert!(matches!(
            ColorVector::try_from(short.row(0)),
            Err(KMeansError::InvalidDimensions(_))
        ));
        assert!(matches!(
            ColorVector::try_from(long.row(0)),
            Err(KMeansError::InvalidDimensions(_))
        ));
    }
}
