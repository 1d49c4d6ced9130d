//! Core data types for grid specifications, boxes, and scores.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Immutable description of a detection grid and its per-cell record.
///
/// A cell record is laid out as `confidences` scalars, then `bounding_boxes`
/// slots of four numbers each (cx, cy, w, h), then `object_categories` scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub confidences: usize,
    pub bounding_boxes: usize,
    pub object_categories: usize,
}

impl GridSpec {
    /// Create a new grid spec, rejecting any zero-sized field.
    pub fn new(
        grid_rows: usize,
        grid_cols: usize,
        confidences: usize,
        bounding_boxes: usize,
        object_categories: usize,
    ) -> Result<Self> {
        let spec = Self {
            grid_rows,
            grid_cols,
            confidences,
            bounding_boxes,
            object_categories,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check that every dimension of the spec is at least one.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("grid_rows", self.grid_rows),
            ("grid_cols", self.grid_cols),
            ("confidences", self.confidences),
            ("bounding_boxes", self.bounding_boxes),
            ("object_categories", self.object_categories),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(GridError::InvalidSpec(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    /// Number of cells in the grid.
    pub fn cells(&self) -> usize {
        self.grid_rows * self.grid_cols
    }

    /// Length of a single cell record (the channel count of a grid tensor).
    pub fn record_len(&self) -> usize {
        self.confidences + self.bounding_boxes * 4 + self.object_categories
    }

    /// Total number of scalars in a grid tensor.
    pub fn layout_len(&self) -> usize {
        self.record_len() * self.cells()
    }

    /// First channel of box slot `slot`.
    pub fn box_offset(&self, slot: usize) -> usize {
        self.confidences + slot * 4
    }

    /// First category channel.
    pub fn category_offset(&self) -> usize {
        self.confidences + self.bounding_boxes * 4
    }

    /// Flat (row-major) index of `cell`.
    pub fn cell_index(&self, cell: CellAddress) -> Result<usize> {
        if cell.grid_i >= self.grid_cols || cell.grid_j >= self.grid_rows {
            return Err(GridError::CellOutOfRange {
                grid_i: cell.grid_i,
                grid_j: cell.grid_j,
                grid_cols: self.grid_cols,
                grid_rows: self.grid_rows,
            });
        }
        Ok(cell.grid_j * self.grid_cols + cell.grid_i)
    }

    /// Inverse of [`GridSpec::cell_index`] for indices below [`GridSpec::cells`].
    pub fn cell_address(&self, index: usize) -> CellAddress {
        CellAddress::new(index % self.grid_cols, index / self.grid_cols)
    }
}

impl Default for GridSpec {
    /// 8x8 grid, one confidence, one box slot, ten categories.
    fn default() -> Self {
        Self {
            grid_rows: 8,
            grid_cols: 8,
            confidences: 1,
            bounding_boxes: 1,
            object_categories: 10,
        }
    }
}

/// Size of the source image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialSize {
    pub width: f64,
    pub height: f64,
}

impl SpatialSize {
    /// Create a new spatial size; both sides must be finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return Err(GridError::InvalidSpatialSize(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for SpatialSize {
    fn default() -> Self {
        Self {
            width: 448.0,
            height: 448.0,
        }
    }
}

/// Affine remapping of pixel coordinates applied before grid division.
///
/// Pixel coordinates are first brought into the x axis' frame (y is scaled by
/// `width / height` of the image), then the window `[alpha, alpha + beta]` is
/// mapped onto `[0, gamma]`:
///
/// ```text
/// x_n = gamma * (x - alpha) / beta
/// y_n = gamma * (y * width / height - alpha) / beta
/// ```
///
/// `alpha = 0, beta = width, gamma = 1` is plain division by the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Normalization {
    /// Create a new normalization; `beta` and `gamma` must be positive.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        let norm = Self { alpha, beta, gamma };
        norm.validate()?;
        Ok(norm)
    }

    /// The identity normalization for an image of `size`.
    pub fn identity(size: SpatialSize) -> Self {
        Self {
            alpha: 0.0,
            beta: size.width,
            gamma: 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() {
            return Err(GridError::InvalidNormalization(format!(
                "alpha must be finite, got {}",
                self.alpha
            )));
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(GridError::InvalidNormalization(format!(
                "beta must be positive, got {}",
                self.beta
            )));
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(GridError::InvalidNormalization(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}

/// Address of a grid cell: `grid_i` along x (columns), `grid_j` along y (rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub grid_i: usize,
    pub grid_j: usize,
}

impl CellAddress {
    pub fn new(grid_i: usize, grid_j: usize) -> Self {
        Self { grid_i, grid_j }
    }
}

impl From<(usize, usize)> for CellAddress {
    fn from((grid_i, grid_j): (usize, usize)) -> Self {
        Self::new(grid_i, grid_j)
    }
}

/// A box in grid-relative form.
///
/// The center is an offset inside its owning cell; width and height are a
/// fraction of the normalized image span. Values are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativeBox {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl RelativeBox {
    pub fn new(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Corners (left, top, right, bottom) in the box's own units.
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        (
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        )
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A box in pixel space, stored as (left, top, right, bottom).
///
/// Serialized as a four-element array `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct PixelBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Check if the box has positive width and height.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Largest coordinate difference against `other`.
    pub fn max_abs_diff(&self, other: &PixelBox) -> f64 {
        (self.left - other.left)
            .abs()
            .max((self.top - other.top).abs())
            .max((self.right - other.right).abs())
            .max((self.bottom - other.bottom).abs())
    }
}

impl From<[f64; 4]> for PixelBox {
    fn from([left, top, right, bottom]: [f64; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<PixelBox> for [f64; 4] {
    fn from(bbox: PixelBox) -> Self {
        [bbox.left, bbox.top, bbox.right, bbox.bottom]
    }
}

/// A ground-truth object: a category index and its pixel-space box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub category: usize,
    pub bbox: PixelBox,
}

impl Annotation {
    pub fn new(category: usize, bbox: PixelBox) -> Self {
        Self { category, bbox }
    }
}

/// All annotations of one image together with the image's size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(flatten)]
    pub spatial_size: SpatialSize,
    pub annotations: Vec<Annotation>,
}

/// A single predicted cell to stage into a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionCell {
    pub cell: CellAddress,
    /// Written to every confidence channel of the cell.
    pub confidence: f64,
    pub category: usize,
    pub category_score: f64,
    pub bbox_slot: usize,
    pub bbox: RelativeBox,
}

/// Batch-cumulative scores returned by [`crate::scoring::score_batch`].
///
/// Values are sums and counts so several batches can be merged before
/// normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchScore {
    /// Hit-mask cells whose masked IoU is above zero.
    pub hit_count: usize,
    pub summed_iou: f64,
    /// Hit-mask cells whose top-1 categories agree.
    pub correct_category_count: usize,
    /// Every cell in the hit mask, overlapping or not.
    #[serde(default)]
    pub matched_count: usize,
}

impl BatchScore {
    /// Mean IoU over hits, or 0.0 when there are none.
    pub fn mean_iou(&self) -> f64 {
        if self.hit_count == 0 {
            0.0
        } else {
            self.summed_iou / self.hit_count as f64
        }
    }

    /// Fraction of hit-mask cells whose top-1 categories agree, or 0.0 when
    /// the mask is empty.
    pub fn category_accuracy(&self) -> f64 {
        if self.matched_count == 0 {
            0.0
        } else {
            self.correct_category_count as f64 / self.matched_count as f64
        }
    }
}

impl std::ops::AddAssign for BatchScore {
    fn add_assign(&mut self, other: Self) {
        self.hit_count += other.hit_count;
        self.summed_iou += other.summed_iou;
        self.correct_category_count += other.correct_category_count;
        self.matched_count += other.matched_count;
    }
}

impl std::ops::Add for BatchScore {
    type Output = BatchScore;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// A confidence-gated cell decoded back to pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub cell: CellAddress,
    pub bbox_slot: usize,
    pub confidence: f64,
    pub category: usize,
    pub category_score: f64,
    pub bbox: PixelBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_len_and_offsets() {
        let spec = GridSpec::new(8, 8, 1, 2, 10).unwrap();
        assert_eq!(spec.record_len(), 1 + 8 + 10);
        assert_eq!(spec.layout_len(), 19 * 64);
        assert_eq!(spec.box_offset(0), 1);
        assert_eq!(spec.box_offset(1), 5);
        assert_eq!(spec.category_offset(), 9);
    }

    #[test]
    fn test_zero_field_is_rejected() {
        assert!(GridSpec::new(0, 8, 1, 1, 10).is_err());
        assert!(GridSpec::new(8, 8, 1, 0, 10).is_err());
        assert!(GridSpec::new(8, 8, 1, 1, 0).is_err());
    }

    #[test]
    fn test_cell_index_row_major() {
        let spec = GridSpec::new(4, 6, 1, 1, 3).unwrap();
        assert_eq!(spec.cell_index(CellAddress::new(2, 3)).unwrap(), 3 * 6 + 2);
        assert_eq!(spec.cell_address(20), CellAddress::new(2, 3));
        assert!(spec.cell_index(CellAddress::new(6, 0)).is_err());
        assert!(spec.cell_index(CellAddress::new(0, 4)).is_err());
    }

    #[test]
    fn test_pixel_box_serializes_as_array() {
        let bbox = PixelBox::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        let back: PixelBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn test_normalization_validation() {
        assert!(Normalization::new(0.0, 448.0, 1.0).is_ok());
        assert!(Normalization::new(0.0, 0.0, 1.0).is_err());
        assert!(Normalization::new(0.0, 448.0, -1.0).is_err());
    }

    #[test]
    fn test_batch_score_add() {
        let a = BatchScore {
            hit_count: 2,
            summed_iou: 1.5,
            correct_category_count: 1,
            matched_count: 2,
        };
        let b = BatchScore {
            hit_count: 1,
            summed_iou: 0.5,
            correct_category_count: 1,
            matched_count: 3,
        };
        let total = a + b;
        assert_eq!(total.hit_count, 3);
        assert_eq!(total.matched_count, 5);
        assert!((total.category_accuracy() - 0.4).abs() < 1e-12);
        assert_eq!(total.correct_category_count, 2);
        assert!((total.mean_iou() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(BatchScore::default().mean_iou(), 0.0);
    }
}
