//! Confidence threshold utilities.

use crate::error::{GridError, Result};
use crate::scoring::score_batch;
use crate::types::BatchScore;
use ndarray::{ArrayBase, Data, Ix3};

/// Generate a range of threshold values for evaluation.
///
/// # Arguments
///
/// * `start` - Starting threshold value (inclusive)
/// * `end` - Ending threshold value (inclusive)
/// * `steps` - Number of threshold values to generate
///
/// # Returns
///
/// Returns a vector of evenly-spaced threshold values.
///
/// # Example
///
/// ```
/// use yolo_grid::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.0, 1.0, 11).unwrap();
/// assert_eq!(thresholds.len(), 11);
/// assert_eq!(thresholds[0], 0.0);
/// assert_eq!(thresholds[10], 1.0);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(GridError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string(),
        ));
    }

    validate_threshold(start)?;
    validate_threshold(end)?;

    if start > end {
        return Err(GridError::InvalidThreshold(format!(
            "Start threshold ({}) must be <= end threshold ({})",
            start, end
        )));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps).map(|i| start + step_size * i as f64).collect())
}

/// Score one batch at every threshold in `thresholds`.
///
/// # Returns
///
/// Returns `(threshold, score)` pairs in the order of `thresholds`.
pub fn score_at_thresholds<S1, S2>(
    prediction: &ArrayBase<S1, Ix3>,
    target: &ArrayBase<S2, Ix3>,
    thresholds: &[f64],
    confidences: usize,
    bounding_boxes: usize,
) -> Result<Vec<(f64, BatchScore)>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    thresholds
        .iter()
        .map(|&threshold| {
            let score = score_batch(prediction, target, threshold, confidences, bounding_boxes)?;
            Ok((threshold, score))
        })
        .collect()
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(GridError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}
