//! Metrics calculation modules for grid scoring.

pub mod iou;

pub use iou::{calculate_iou, calculate_pixel_iou};
