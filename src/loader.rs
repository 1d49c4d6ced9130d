//! JSON loading for grid configuration and annotated samples.

use crate::error::{GridError, Result};
use crate::threshold::validate_threshold;
use crate::types::{GridSpec, Normalization, Sample, SpatialSize};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_threshold() -> f64 {
    0.5
}

/// Everything needed to encode and score grids for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub grid: GridSpec,
    pub spatial_size: SpatialSize,
    /// Defaults to [`Normalization::identity`] for `spatial_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<Normalization>,
    /// Confidence threshold for hits and detections.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl GridConfig {
    /// The configured normalization, or the identity for the image size.
    pub fn normalization(&self) -> Normalization {
        self.normalization
            .unwrap_or_else(|| Normalization::identity(self.spatial_size))
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.spatial_size.validate()?;
        self.normalization().validate()?;
        validate_threshold(self.threshold)
    }
}

impl Default for GridConfig {
    /// 8x8 grid, one confidence, one box slot, ten categories, 448x448 images.
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            spatial_size: SpatialSize::default(),
            normalization: None,
            threshold: default_threshold(),
        }
    }
}

/// Load a grid configuration from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
///
/// # Example
///
/// ```no_run
/// use yolo_grid::loader::load_config_from_file;
///
/// let config = load_config_from_file("grid.json").unwrap();
/// println!("{}x{} grid", config.grid.grid_cols, config.grid.grid_rows);
/// ```
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<GridConfig> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let config: GridConfig = serde_json::from_reader(reader)?;

    config.validate()?;
    debug!("loaded grid config from {}: {:?}", path.as_ref().display(), config);

    Ok(config)
}

/// Load a grid configuration from a JSON string.
///
/// # Example
///
/// ```
/// use yolo_grid::loader::load_config_from_str;
///
/// let json = r#"{
///     "grid": {
///         "grid_rows": 7, "grid_cols": 7,
///         "confidences": 1, "bounding_boxes": 2, "object_categories": 20
///     },
///     "spatial_size": {"width": 448, "height": 448}
/// }"#;
/// let config = load_config_from_str(json).unwrap();
/// assert_eq!(config.threshold, 0.5);
/// ```
pub fn load_config_from_str(json_str: &str) -> Result<GridConfig> {
    let config: GridConfig = serde_json::from_str(json_str)?;
    config.validate()?;
    Ok(config)
}

/// Load one annotated image from a JSON file.
///
/// The expected format is
/// `{"width": w, "height": h, "annotations": [{"category": c, "bbox": [l, t, r, b]}]}`.
pub fn load_sample_from_file<P: AsRef<Path>>(path: P) -> Result<Sample> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let sample: Sample = serde_json::from_reader(reader)?;

    validate_sample(&sample)?;
    debug!(
        "loaded {} annotations from {}",
        sample.annotations.len(),
        path.as_ref().display()
    );

    Ok(sample)
}

/// Load one annotated image from a JSON string.
pub fn load_sample_from_str(json_str: &str) -> Result<Sample> {
    let sample: Sample = serde_json::from_str(json_str)?;
    validate_sample(&sample)?;
    Ok(sample)
}

/// Validate that a sample has a usable size and well-formed boxes.
fn validate_sample(sample: &Sample) -> Result<()> {
    sample.spatial_size.validate()?;

    for (index, annotation) in sample.annotations.iter().enumerate() {
        let bbox = &annotation.bbox;
        if !(bbox.left.is_finite() && bbox.top.is_finite() && bbox.right.is_finite() && bbox.bottom.is_finite()) {
            return Err(GridError::InvalidAnnotation(format!(
                "Annotation {} has non-finite coordinates",
                index
            )));
        }
        if bbox.width() < 0.0 || bbox.height() < 0.0 {
            return Err(GridError::InvalidAnnotation(format!(
                "Annotation {} has negative dimensions",
                index
            )));
        }
    }

    Ok(())
}
