//! Intersection over Union (IoU) calculation.

use crate::types::{PixelBox, RelativeBox};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix3, Zip};

/// IoU between two boxes given as (left, top, right, bottom) corners.
///
/// Returns 0.0 when the boxes do not overlap or either box has a non-positive
/// area.
fn corner_iou(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> f64 {
    let (a_left, a_top, a_right, a_bottom) = a;
    let (b_left, b_top, b_right, b_bottom) = b;

    let a_area = (a_right - a_left) * (a_bottom - a_top);
    let b_area = (b_right - b_left) * (b_bottom - b_top);
    if !(a_right > a_left && a_bottom > a_top && b_right > b_left && b_bottom > b_top) {
        return 0.0;
    }

    // Calculate intersection coordinates
    let x_left = a_left.max(b_left);
    let y_top = a_top.max(b_top);
    let x_right = a_right.min(b_right);
    let y_bottom = a_bottom.min(b_bottom);

    // If there's no intersection
    if x_right <= x_left || y_bottom <= y_top {
        return 0.0;
    }

    let intersection_area = (x_right - x_left) * (y_bottom - y_top);
    let union_area = a_area + b_area - intersection_area;

    // Avoid division by zero
    if union_area <= 0.0 {
        return 0.0;
    }

    (intersection_area / union_area).clamp(0.0, 1.0)
}

/// Calculate the IoU between two center-format boxes.
///
/// # Example
///
/// ```
/// use yolo_grid::metrics::iou::calculate_iou;
/// use yolo_grid::types::RelativeBox;
///
/// let a = RelativeBox::new(0.5, 0.5, 0.2, 0.2);
/// let b = RelativeBox::new(0.6, 0.6, 0.2, 0.2);
/// let iou = calculate_iou(&a, &b);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(a: &RelativeBox, b: &RelativeBox) -> f64 {
    corner_iou(a.corners(), b.corners())
}

/// Calculate the IoU between two pixel-space boxes.
pub fn calculate_pixel_iou(a: &PixelBox, b: &PixelBox) -> f64 {
    corner_iou((a.left, a.top, a.right, a.bottom), (b.left, b.top, b.right, b.bottom))
}

/// Elementwise IoU of two `(batch, 4, cells)` box arrays.
///
/// The four channels are read as (cx, cy, w, h). Both arrays must share a
/// shape with exactly four channels; callers check this.
pub(crate) fn iou_map<S1, S2>(pred: &ArrayBase<S1, Ix3>, target: &ArrayBase<S2, Ix3>) -> Array2<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let (batch, _, cells) = pred.dim();
    let mut out = Array2::zeros((batch, cells));

    Zip::from(&mut out)
        .and(pred.lanes(Axis(1)))
        .and(target.lanes(Axis(1)))
        .for_each(|iou, p, t| {
            let p = RelativeBox::new(p[0], p[1], p[2], p[3]);
            let t = RelativeBox::new(t[0], t[1], t[2], t[3]);
            *iou = calculate_iou(&p, &t);
        });

    out
}
