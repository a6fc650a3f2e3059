//! Providers of the item list the engine clusters.
//!
//! Both providers yield the same [`Item`] shape, so the engine does not care
//! where the colors came from.

use crate::error::KMeansError;
use crate::item::{ColorVector, Item};
use log::{debug, info};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Anything that can produce the list of items to cluster
pub trait ColorProvider {
    fn load(&self) -> Result<Vec<Item>, KMeansError>;
}

/// Precomputed JSON color table: an array of
/// `{ "name", "color": [r, g, b], "rgbString", "thumbnail" }` records
#[derive(Debug, Clone)]
pub struct ColorTable {
    path: PathBuf,
}

impl ColorTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ColorProvider for ColorTable {
    fn load(&self) -> Result<Vec<Item>, KMeansError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let items: Vec<Item> = serde_json::from_reader(reader)?;

        if items.is_empty() {
            return Err(KMeansError::InsufficientData(format!(
                "color table {} contains no items",
                self.path.display()
            )));
        }

        info!("Loaded {} items from {}", items.len(), self.path.display());
        Ok(items)
    }
}

/// Directory of images, one item per image, colored by the image's average pixel
#[derive(Debug, Clone)]
pub struct ImageDirectory {
    image_dir: PathBuf,
    thumbnail_dir: PathBuf,
}

impl ImageDirectory {
    /// `thumbnail_dir` is only used to build each item's thumbnail reference
    /// (`thumbnail_dir/<file name>`); it is not read.
    pub fn new(image_dir: impl Into<PathBuf>, thumbnail_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            thumbnail_dir: thumbnail_dir.into(),
        }
    }

    /// Image files in the directory, sorted by file name
    fn image_files(&self) -> Result<Vec<PathBuf>, KMeansError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.image_dir)? {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load_item(&self, path: &Path) -> Result<Item, KMeansError> {
        let (avg, pixel_count) = average_rgb(path)?;
        let file_name = path.file_name().unwrap_or_default();
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .replace('_', " ");

        debug!(
            "  {}: rgb({:.1}, {:.1}, {:.1}) over {} pixels",
            name, avg[0], avg[1], avg[2], pixel_count
        );

        Ok(Item {
            name,
            color: ColorVector::new(
                (avg[0] / 255.0) as f32,
                (avg[1] / 255.0) as f32,
                (avg[2] / 255.0) as f32,
            ),
            rgb_string: format!(
                "rgb({}, {}, {})",
                avg[0].round(),
                avg[1].round(),
                avg[2].round()
            ),
            thumbnail: self.thumbnail_dir.join(file_name).to_string_lossy().into_owned(),
            cluster: None,
        })
    }
}

impl ColorProvider for ImageDirectory {
    fn load(&self) -> Result<Vec<Item>, KMeansError> {
        let files = self.image_files()?;
        if files.is_empty() {
            return Err(KMeansError::InsufficientData(format!(
                "no images found in {}",
                self.image_dir.display()
            )));
        }

        let items = files
            .par_iter()
            .map(|path| self.load_item(path))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Sampled average colors of {} images in {}",
            items.len(),
            self.image_dir.display()
        );
        Ok(items)
    }
}

/// Write items as a JSON color table readable by [`ColorTable`]
pub fn write_color_table(items: &[Item], path: &Path) -> Result<(), KMeansError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, items)?;
    info!("Wrote {} items to {}", items.len(), path.display());
    Ok(())
}

/// Mean of each RGB channel over all pixels, on the 0..=255 scale
fn average_rgb(path: &Path) -> Result<([f64; 3], u64), KMeansError> {
    let img = image::open(path)?.to_rgb8();

    let mut sum = [0u64; 3];
    for pixel in img.pixels() {
        for (acc, &channel) in sum.iter_mut().zip(pixel.0.iter()) {
            *acc += channel as u64;
        }
    }

    let pixel_count = img.width() as u64 * img.height() as u64;
    if pixel_count == 0 {
        return Err(KMeansError::InsufficientData(format!(
            "image {} has no pixels",
            path.display()
        )));
    }

    Ok((sum.map(|s| s as f64 / pixel_count as f64), pixel_count))
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}
