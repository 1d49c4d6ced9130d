//! Encoding annotations into grid layouts and decoding them back.
//!
//! Targets are hard labels: the owning cell gets a one-hot category, every
//! confidence channel set to 1, and the same relative box in every box slot.
//! A second object whose center falls in an already written cell overwrites
//! its box and confidences, so a layout holds at most one box per cell. The
//! category scores of both objects stay set.

use crate::error::Result;
use crate::layout::GridLayout;
use crate::transform::{from_grid_relative, to_grid_relative};
use crate::types::{
    Annotation, CellAddress, Detection, GridSpec, Normalization, PixelBox, PredictionCell, Sample,
    SpatialSize,
};
use log::{debug, trace};
use ndarray::Array2;

/// Encode one ground-truth object into `layout`.
///
/// Returns the mutated tensor for convenience.
///
/// # Errors
///
/// Returns an error if `category` is not below `object_categories` or if the
/// image size or normalization is invalid.
///
/// # Example
///
/// ```
/// use yolo_grid::codec::{decode_box, encode_target};
/// use yolo_grid::layout::GridLayout;
/// use yolo_grid::types::{GridSpec, Normalization, PixelBox, SpatialSize};
///
/// let size = SpatialSize::new(448.0, 448.0).unwrap();
/// let norm = Normalization::identity(size);
/// let mut layout = GridLayout::new(GridSpec::default()).unwrap();
///
/// let bbox = PixelBox::new(33.0, 40.0, 89.0, 96.0);
/// encode_target(&mut layout, 8, &bbox, size, &norm).unwrap();
///
/// let decoded = decode_box(&layout, (1, 1), 0, size, &norm).unwrap();
/// assert!(decoded.max_abs_diff(&bbox) < 1e-5);
/// ```
pub fn encode_target<'a>(
    layout: &'a mut GridLayout,
    category: usize,
    bbox: &PixelBox,
    spatial_size: SpatialSize,
    norm: &Normalization,
) -> Result<&'a Array2<f64>> {
    spatial_size.validate()?;
    norm.validate()?;

    let spec = *layout.spec();
    let coord = to_grid_relative(bbox, spatial_size, &spec, norm);
    let relative = coord.relative_box();
    debug!(
        "encode_target: category {} box {:?} -> cell ({}, {}) rel {:?}",
        category, bbox, coord.cell.grid_i, coord.cell.grid_j, relative
    );

    let mut cursor = layout.cursor_at(coord.cell)?;
    cursor.set_object_category(category)?;
    cursor.fill_confidences(1.0);
    for slot in 0..spec.bounding_boxes {
        cursor.set_bounding_box(slot, relative)?;
    }

    Ok(layout.tensor())
}

/// Stage a single predicted cell into `layout`.
///
/// Unlike [`encode_target`], only the given box slot is written and the
/// category is written as a soft score.
pub fn encode_prediction<'a>(layout: &'a mut GridLayout, prediction: &PredictionCell) -> Result<&'a Array2<f64>> {
    trace!("encode_prediction: {:?}", prediction);

    let mut cursor = layout.cursor_at(prediction.cell)?;
    // reject a bad slot before anything is written
    cursor.get_bounding_box(prediction.bbox_slot)?;
    cursor.set_object_category((prediction.category, prediction.category_score))?;
    cursor.fill_confidences(prediction.confidence);
    cursor.set_bounding_box(prediction.bbox_slot, prediction.bbox)?;

    Ok(layout.tensor())
}

/// Read the box stored in `bbox_slot` of `cell` and convert it to pixels.
pub fn decode_box(
    layout: &GridLayout,
    cell: impl Into<CellAddress>,
    bbox_slot: usize,
    spatial_size: SpatialSize,
    norm: &Normalization,
) -> Result<PixelBox> {
    let cell = cell.into();
    let relative = layout.cell_at(cell)?.get_bounding_box(bbox_slot)?;
    Ok(from_grid_relative(&relative, cell, layout.spec(), spatial_size, norm))
}

/// Build a fresh target layout from every annotation of one image.
///
/// Annotations are written in order; a later object in an occupied cell
/// replaces the earlier box and adds its category to the cell's scores.
pub fn encode_sample(spec: GridSpec, sample: &Sample, norm: &Normalization) -> Result<GridLayout> {
    let mut layout = GridLayout::new(spec)?;
    encode_annotations(&mut layout, &sample.annotations, sample.spatial_size, norm)?;
    Ok(layout)
}

/// Encode `annotations` into an existing layout.
pub fn encode_annotations(
    layout: &mut GridLayout,
    annotations: &[Annotation],
    spatial_size: SpatialSize,
    norm: &Normalization,
) -> Result<()> {
    for annotation in annotations {
        encode_target(layout, annotation.category, &annotation.bbox, spatial_size, norm)?;
    }
    debug!("encoded {} annotations", annotations.len());
    Ok(())
}

/// Decode every cell whose first confidence exceeds `threshold`.
///
/// Each detection uses the cell's first box slot and its top-1 category.
/// Cells are visited in row-major order. No suppression is applied.
///
/// A cell written by several targets keeps the last box but the union of
/// their categories, and ties resolve to the lowest index. The decoded
/// category can therefore belong to an earlier object than the decoded box.
pub fn decode_detections(
    layout: &GridLayout,
    threshold: f64,
    spatial_size: SpatialSize,
    norm: &Normalization,
) -> Result<Vec<Detection>> {
    let spec = layout.spec();
    let mut detections = Vec::new();

    for index in 0..spec.cells() {
        let cell = spec.cell_address(index);
        let view = layout.cell_at(cell)?;
        let confidence = view.get_confidence(0)?;
        if confidence <= threshold {
            continue;
        }

        let category = view.argmax_category();
        let category_score = view.get_object_category()[category];
        let relative = view.get_bounding_box(0)?;

        detections.push(Detection {
            cell,
            bbox_slot: 0,
            confidence,
            category,
            category_score,
            bbox: from_grid_relative(&relative, cell, spec, spatial_size, norm),
        });
    }

    debug!("decoded {} detections above {}", detections.len(), threshold);
    Ok(detections)
}
