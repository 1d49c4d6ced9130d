//! Confidence-gated IoU and category agreement over batches of grids.

use crate::error::{GridError, Result};
use crate::layout::{argmax, GridLayout};
use crate::metrics::iou::iou_map;
use crate::set_ops::{exceeds, intersection};
use crate::types::BatchScore;
use log::debug;
use ndarray::{s, Array2, ArrayBase, Axis, Data, Ix3, Zip};

/// Cells where every confidence channel of both prediction and target exceeds
/// `threshold`. Inputs are `(batch, confidences, cells)`; the mask is
/// `(batch, cells)`.
pub fn hit_mask<S1, S2>(
    pred_conf: &ArrayBase<S1, Ix3>,
    true_conf: &ArrayBase<S2, Ix3>,
    threshold: f64,
) -> Result<Array2<bool>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let both = intersection(&exceeds(pred_conf, threshold), &exceeds(true_conf, threshold))?;
    Ok(both.map_axis(Axis(1), |lane| lane.iter().all(|&hit| hit)))
}

/// Score a batch of predictions against targets.
///
/// Both arrays are `(batch, channels, cells)` stacks of grid tensors. Only the
/// first box slot of each cell takes part in the IoU. Returned values are
/// sums and counts, so several batches can be accumulated before dividing.
///
/// # Errors
///
/// Returns an error if the shapes differ or the channel axis is too short to
/// hold `confidences`, one box slot per `bounding_boxes`, and at least one
/// category.
///
/// # Example
///
/// ```
/// use ndarray::Array3;
/// use yolo_grid::scoring::score_batch;
///
/// let prediction = Array3::<f64>::zeros((4, 15, 64));
/// let target = Array3::<f64>::zeros((4, 15, 64));
/// let score = score_batch(&prediction, &target, 0.5, 1, 1).unwrap();
/// assert_eq!(score.hit_count, 0);
/// ```
pub fn score_batch<S1, S2>(
    prediction: &ArrayBase<S1, Ix3>,
    target: &ArrayBase<S2, Ix3>,
    threshold: f64,
    confidences: usize,
    bounding_boxes: usize,
) -> Result<BatchScore>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    if prediction.shape() != target.shape() {
        return Err(GridError::shape_mismatch(target.shape(), prediction.shape()));
    }

    let channels = prediction.len_of(Axis(1));
    let category_offset = confidences + bounding_boxes * 4;
    if confidences == 0 || bounding_boxes == 0 || channels <= category_offset {
        return Err(GridError::InvalidSpec(format!(
            "{} channels cannot hold {} confidences, {} box slots and a category",
            channels, confidences, bounding_boxes
        )));
    }

    let mask = hit_mask(
        &prediction.slice(s![.., ..confidences, ..]),
        &target.slice(s![.., ..confidences, ..]),
        threshold,
    )?;

    let ious = iou_map(
        &prediction.slice(s![.., confidences..confidences + 4, ..]),
        &target.slice(s![.., confidences..confidences + 4, ..]),
    );
    let hit_ious = Zip::from(&ious)
        .and(&mask)
        .map_collect(|&iou, &hit| if hit { iou } else { 0.0 });

    let matched_count = mask.iter().filter(|&&hit| hit).count();
    let hit_count = hit_ious.iter().filter(|&&iou| iou > 0.0).count();
    let summed_iou = hit_ious.sum();

    let correct_category_count = Zip::from(&mask)
        .and(prediction.slice(s![.., category_offset.., ..]).lanes(Axis(1)))
        .and(target.slice(s![.., category_offset.., ..]).lanes(Axis(1)))
        .fold(0, |count, &hit, pred, truth| {
            if hit && argmax(pred) == argmax(truth) {
                count + 1
            } else {
                count
            }
        });

    let score = BatchScore {
        hit_count,
        summed_iou,
        correct_category_count,
        matched_count,
    };
    debug!(
        "score_batch: batch {} threshold {} -> {:?}",
        prediction.len_of(Axis(0)),
        threshold,
        score
    );
    Ok(score)
}

/// Score a single prediction layout against a single target layout.
pub fn score_layouts(prediction: &GridLayout, target: &GridLayout, threshold: f64) -> Result<BatchScore> {
    if prediction.spec() != target.spec() {
        return Err(GridError::InvalidSpec(format!(
            "prediction and target specs differ: {:?} vs {:?}",
            prediction.spec(),
            target.spec()
        )));
    }

    let spec = target.spec();
    score_batch(
        &prediction.view().insert_axis(Axis(0)),
        &target.view().insert_axis(Axis(0)),
        threshold,
        spec.confidences,
        spec.bounding_boxes,
    )
}
