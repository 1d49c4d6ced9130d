//! Comprehensive edge case and boundary condition tests.

use ndarray::Array3;
use yolo_grid::codec::{decode_box, encode_target};
use yolo_grid::layout::{stack_layouts, GridLayout};
use yolo_grid::scoring::{hit_mask, score_batch};
use yolo_grid::transform::to_grid_relative;
use yolo_grid::types::{CellAddress, GridSpec, Normalization, PixelBox, SpatialSize};

fn square_image() -> (SpatialSize, Normalization) {
    let size = SpatialSize::new(448.0, 448.0).unwrap();
    (size, Normalization::identity(size))
}

// ============================================================================
// CELL ASSIGNMENT EDGE CASES
// ============================================================================

#[test]
fn test_center_on_cell_boundary_goes_to_next_cell() {
    let spec = GridSpec::default();
    let (size, norm) = square_image();

    // center x = 56 is exactly the start of the second column
    let coord = to_grid_relative(&PixelBox::new(46.0, 10.0, 66.0, 30.0), size, &spec, &norm);
    assert_eq!(coord.cell, CellAddress::new(1, 0));
    assert!(coord.cent_x_rel.abs() < 1e-12);
}

#[test]
fn test_box_on_image_edge_lands_in_last_cell() {
    let spec = GridSpec::default();
    let (size, norm) = square_image();

    // center exactly on the right/bottom edge
    let coord = to_grid_relative(&PixelBox::new(428.0, 428.0, 468.0, 468.0), size, &spec, &norm);
    assert_eq!(coord.cell, CellAddress::new(7, 7));
    assert!((coord.cent_x_rel - 1.0).abs() < 1e-12);

    // and it still decodes to the same pixels
    let mut layout = GridLayout::new(spec).unwrap();
    let bbox = PixelBox::new(428.0, 428.0, 468.0, 468.0);
    encode_target(&mut layout, 0, &bbox, size, &norm).unwrap();
    let decoded = decode_box(&layout, (7, 7), 0, size, &norm).unwrap();
    assert!(decoded.max_abs_diff(&bbox) < 1e-9);
}

#[test]
fn test_non_square_grid_uses_columns_for_x() {
    let spec = GridSpec::new(2, 4, 1, 1, 2).unwrap();
    let size = SpatialSize::new(400.0, 200.0).unwrap();
    let norm = Normalization::identity(size);

    // center (350, 50): x in the last of 4 columns, y in the first of 2 rows
    let coord = to_grid_relative(&PixelBox::new(340.0, 40.0, 360.0, 60.0), size, &spec, &norm);
    assert_eq!(coord.cell, CellAddress::new(3, 0));
    assert_eq!(spec.cell_index(coord.cell).unwrap(), 3);
}

#[test]
fn test_zero_size_box_still_encodes() {
    let spec = GridSpec::default();
    let (size, norm) = square_image();
    let mut layout = GridLayout::new(spec).unwrap();

    let point = PixelBox::new(100.0, 100.0, 100.0, 100.0);
    encode_target(&mut layout, 2, &point, size, &norm).unwrap();

    let cell = layout.cell_at((1, 1)).unwrap();
    let stored = cell.get_bounding_box(0).unwrap();
    assert_eq!(stored.width, 0.0);
    assert_eq!(stored.height, 0.0);
    assert!(!stored.is_valid());
}

// ============================================================================
// SCORING EDGE CASES
// ============================================================================

#[test]
fn test_degenerate_boxes_are_not_hits() {
    let spec = GridSpec::default();
    let (size, norm) = square_image();
    let mut target = GridLayout::new(spec).unwrap();
    encode_target(&mut target, 2, &PixelBox::new(100.0, 100.0, 100.0, 100.0), size, &norm).unwrap();

    let batch = stack_layouts(&[target]).unwrap();
    let score = score_batch(&batch, &batch, 0.5, 1, 1).unwrap();
    // both confidences pass, but zero-area boxes have IoU 0
    assert_eq!(score.hit_count, 0);
    assert_eq!(score.summed_iou, 0.0);
    assert_eq!(score.correct_category_count, 1);
}

#[test]
fn test_threshold_is_strict() {
    let mut pred = Array3::<f64>::zeros((1, 6, 1));
    let mut target = Array3::<f64>::zeros((1, 6, 1));
    for array in [&mut pred, &mut target] {
        array[[0, 0, 0]] = 0.5;
        array[[0, 1, 0]] = 0.5;
        array[[0, 2, 0]] = 0.5;
        array[[0, 3, 0]] = 0.2;
        array[[0, 4, 0]] = 0.2;
        array[[0, 5, 0]] = 1.0;
    }

    assert_eq!(score_batch(&pred, &target, 0.5, 1, 1).unwrap().hit_count, 0);
    assert_eq!(score_batch(&pred, &target, 0.49, 1, 1).unwrap().hit_count, 1);
}

#[test]
fn test_argmax_ties_use_first_index() {
    // 1 confidence, 1 box, 3 categories, 1 cell
    let mut pred = Array3::<f64>::zeros((1, 8, 1));
    let mut target = Array3::<f64>::zeros((1, 8, 1));
    for array in [&mut pred, &mut target] {
        array[[0, 0, 0]] = 1.0;
        array[[0, 1, 0]] = 0.5;
        array[[0, 2, 0]] = 0.5;
        array[[0, 3, 0]] = 0.2;
        array[[0, 4, 0]] = 0.2;
    }
    // prediction ties between categories 1 and 2, target is category 1
    pred[[0, 6, 0]] = 0.4;
    pred[[0, 7, 0]] = 0.4;
    target[[0, 6, 0]] = 1.0;

    let score = score_batch(&pred, &target, 0.5, 1, 1).unwrap();
    assert_eq!(score.correct_category_count, 1);

    // target category 2 loses the tie
    target[[0, 6, 0]] = 0.0;
    target[[0, 7, 0]] = 1.0;
    let score = score_batch(&pred, &target, 0.5, 1, 1).unwrap();
    assert_eq!(score.correct_category_count, 0);
}

#[test]
fn test_only_first_box_slot_is_scored() {
    let spec = GridSpec::new(1, 1, 1, 2, 1).unwrap();
    let mut pred = GridLayout::new(spec).unwrap();
    let mut target = GridLayout::new(spec).unwrap();
    for layout in [&mut pred, &mut target] {
        let mut cursor = layout.cursor_at((0, 0)).unwrap();
        cursor.set_confidence(0, 1.0).unwrap();
        cursor.set_object_category(0).unwrap();
        cursor
            .set_bounding_box(0, yolo_grid::RelativeBox::new(0.5, 0.5, 0.4, 0.4))
            .unwrap();
    }
    // the second slot disagrees completely
    pred.cursor_at((0, 0))
        .unwrap()
        .set_bounding_box(1, yolo_grid::RelativeBox::new(0.1, 0.1, 0.05, 0.05))
        .unwrap();

    let score = yolo_grid::score_layouts(&pred, &target, 0.5).unwrap();
    assert_eq!(score.hit_count, 1);
    assert!((score.summed_iou - 1.0).abs() < 1e-12);
}

#[test]
fn test_hit_mask_requires_both_sides() {
    let mut pred = Array3::<f64>::zeros((2, 1, 3));
    let mut target = Array3::<f64>::zeros((2, 1, 3));
    pred[[0, 0, 0]] = 0.9;
    target[[0, 0, 1]] = 0.9;
    pred[[1, 0, 2]] = 0.9;
    target[[1, 0, 2]] = 0.9;

    let mask = hit_mask(&pred, &target, 0.5).unwrap();
    assert_eq!(mask.shape(), &[2, 3]);
    assert_eq!(mask.iter().filter(|&&hit| hit).count(), 1);
    assert!(mask[[1, 2]]);
}

#[test]
fn test_empty_batch() {
    let empty = Array3::<f64>::zeros((0, 15, 64));
    let score = score_batch(&empty, &empty, 0.5, 1, 1).unwrap();
    assert_eq!(score.hit_count, 0);
    assert_eq!(score.summed_iou, 0.0);
}
