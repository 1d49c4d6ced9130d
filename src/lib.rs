//! # yolo-grid
//!
//! A Rust library for YOLO-style grid detection labels and their scoring.
//!
//! This library provides:
//! - **Coordinate transforms** between pixel boxes and grid-cell-relative boxes
//! - **Grid layouts**: a fixed `(channels, cells)` array per sample with
//!   per-cell read/write cursors
//! - **Encoding** of ground-truth and predicted objects into layouts, and
//!   **decoding** of stored boxes back to pixels
//! - **Set algebra** over boolean masks
//! - **Scoring** of prediction batches with confidence-gated IoU and top-1
//!   category agreement
//!
//! ## Quick Start
//!
//! ```rust
//! use yolo_grid::codec::encode_target;
//! use yolo_grid::layout::{stack_layouts, GridLayout};
//! use yolo_grid::scoring::score_batch;
//! use yolo_grid::types::{GridSpec, Normalization, PixelBox, SpatialSize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = GridSpec::new(8, 8, 1, 1, 10)?;
//! let size = SpatialSize::new(448.0, 448.0)?;
//! let norm = Normalization::identity(size);
//!
//! let mut target = GridLayout::new(spec)?;
//! encode_target(&mut target, 8, &PixelBox::new(33.0, 40.0, 89.0, 96.0), size, &norm)?;
//!
//! // a perfect prediction
//! let batch = stack_layouts(&[target])?;
//! let score = score_batch(&batch, &batch, 0.5, spec.confidences, spec.bounding_boxes)?;
//! assert_eq!(score.hit_count, 1);
//! assert_eq!(score.correct_category_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! Each cell record holds `confidences` scalars, then `bounding_boxes` slots
//! of `(cx, cy, w, h)`, then `object_categories` scores. A layout stores one
//! record per cell as a column of a `(record_len, rows * cols)` array, with
//! cells in row-major order.

pub mod error;
pub mod types;
pub mod transform;
pub mod layout;
pub mod codec;
pub mod set_ops;
pub mod metrics;
pub mod scoring;
pub mod threshold;
pub mod stats;
pub mod loader;
pub mod frame;

// Re-export commonly used types and functions
pub use error::{GridError, Result};
pub use types::{
    Annotation, BatchScore, CellAddress, Detection, GridSpec, Normalization, PixelBox,
    PredictionCell, RelativeBox, Sample, SpatialSize,
};
pub use layout::{CategoryLabel, CellCursor, CellView, GridLayout};
pub use codec::{decode_box, decode_detections, encode_prediction, encode_sample, encode_target};
pub use scoring::{score_batch, score_layouts};
pub use stats::ScoreAccumulator;
pub use loader::{load_config_from_file, load_config_from_str, GridConfig};
