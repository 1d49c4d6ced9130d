//! Error types for the yolo-grid library.

use thiserror::Error;

/// Result type for yolo-grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Error types that can occur while encoding, decoding, or scoring grids.
#[derive(Error, Debug)]
pub enum GridError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised by a Polars DataFrame operation.
    #[error("Polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),

    /// Two arrays that must share a shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A cell address outside the configured grid.
    #[error("Cell ({grid_i}, {grid_j}) is outside a {grid_cols}x{grid_rows} grid")]
    CellOutOfRange {
        grid_i: usize,
        grid_j: usize,
        grid_cols: usize,
        grid_rows: usize,
    },

    /// A confidence or box slot index beyond the configured slot count.
    #[error("Slot {slot} is out of range for {kind} (count {count})")]
    SlotOutOfRange {
        kind: &'static str,
        slot: usize,
        count: usize,
    },

    /// A batch index beyond the length of the batch axis.
    #[error("Batch index {index} is out of range (batch size {batch})")]
    BatchIndexOutOfRange { index: usize, batch: usize },

    /// Error raised by an ndarray reshape or stack.
    #[error("Array shape error: {0}")]
    ArrayShape(#[from] ndarray::ShapeError),

    /// A category index beyond the configured category count.
    #[error("Category {category} is out of range (object_categories = {count})")]
    CategoryOutOfRange { category: usize, count: usize },

    /// Invalid grid specification.
    #[error("Invalid grid spec: {0}")]
    InvalidSpec(String),

    /// Invalid normalization parameters.
    #[error("Invalid normalization: {0}")]
    InvalidNormalization(String),

    /// Invalid image size.
    #[error("Invalid spatial size: {0}")]
    InvalidSpatialSize(String),

    /// Invalid confidence threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid annotation data.
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// A DataFrame is missing a required column.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

impl GridError {
    pub(crate) fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        GridError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
