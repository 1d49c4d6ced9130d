//! Property-based tests using proptest
//!
//! These tests verify the codec and scoring invariants that should hold
//! regardless of the input values.

use ndarray::Array2;
use proptest::prelude::*;
use yolo_grid::layout::GridLayout;
use yolo_grid::metrics::{calculate_iou, calculate_pixel_iou};
use yolo_grid::set_ops::{difference, intersection, inverse, union};
use yolo_grid::transform::{from_grid_relative, to_grid_relative};
use yolo_grid::types::{CellAddress, GridSpec, Normalization, PixelBox, RelativeBox, SpatialSize};

// Property: pixel -> grid-relative -> pixel is the identity for boxes inside the image
proptest! {
    #[test]
    fn prop_round_trip(
        rows in 1usize..16,
        cols in 1usize..16,
        width in 32.0f64..1024.0,
        height in 32.0f64..1024.0,
        left_frac in 0.0f64..0.9,
        top_frac in 0.0f64..0.9,
        w_frac in 0.01f64..0.1,
        h_frac in 0.01f64..0.1,
    ) {
        let spec = GridSpec::new(rows, cols, 1, 1, 1).unwrap();
        let size = SpatialSize::new(width, height).unwrap();
        let norm = Normalization::identity(size);
        let left = left_frac * width;
        let top = top_frac * height;
        let bbox = PixelBox::new(left, top, left + w_frac * width, top + h_frac * height);

        let coord = to_grid_relative(&bbox, size, &spec, &norm);
        let back = from_grid_relative(&coord.relative_box(), coord.cell, &spec, size, &norm);

        prop_assert!(back.max_abs_diff(&bbox) < 1e-5, "{:?} vs {:?}", back, bbox);
        prop_assert!(coord.cell.grid_i < cols && coord.cell.grid_j < rows);
        prop_assert!((0.0..1.0).contains(&coord.cent_x_rel));
        prop_assert!((0.0..1.0).contains(&coord.cent_y_rel));
    }

    #[test]
    fn prop_round_trip_with_affine_window(
        alpha in -50.0f64..50.0,
        beta in 100.0f64..800.0,
        gamma in 0.5f64..4.0,
        left in 0.0f64..400.0,
        top in 0.0f64..400.0,
        w in 1.0f64..40.0,
        h in 1.0f64..40.0,
    ) {
        let spec = GridSpec::default();
        let size = SpatialSize::new(448.0, 448.0).unwrap();
        let norm = Normalization::new(alpha, beta, gamma).unwrap();
        let bbox = PixelBox::new(left, top, left + w, top + h);

        let coord = to_grid_relative(&bbox, size, &spec, &norm);
        let back = from_grid_relative(&coord.relative_box(), coord.cell, &spec, size, &norm);
        prop_assert!(back.max_abs_diff(&bbox) < 1e-5);
    }
}

// Property: writing one cell never changes any other cell
proptest! {
    #[test]
    fn prop_addressing_disjoint(
        i in 0usize..8,
        j in 0usize..6,
        conf in 0.01f64..1.0,
        category in 0usize..5,
        slot in 0usize..2,
    ) {
        let spec = GridSpec::new(6, 8, 2, 2, 5).unwrap();
        let mut layout = GridLayout::new(spec).unwrap();
        let before = layout.tensor().clone();

        {
            let mut cursor = layout.cursor_at(CellAddress::new(i, j)).unwrap();
            cursor.fill_confidences(conf);
            cursor.set_bounding_box(slot, RelativeBox::new(0.5, 0.5, 0.3, 0.3)).unwrap();
            cursor.set_object_category((category, conf)).unwrap();
        }

        let touched = spec.cell_index(CellAddress::new(i, j)).unwrap();
        for cell in 0..spec.cells() {
            if cell != touched {
                prop_assert_eq!(layout.tensor().column(cell), before.column(cell));
            }
        }
        prop_assert!(layout.tensor().column(touched) != before.column(touched));
    }
}

// Property: IoU is bounded, symmetric, and 1 for identical boxes
proptest! {
    #[test]
    fn prop_iou_range_and_symmetry(
        cx1 in -1.0f64..2.0, cy1 in -1.0f64..2.0, w1 in -0.5f64..1.0, h1 in -0.5f64..1.0,
        cx2 in -1.0f64..2.0, cy2 in -1.0f64..2.0, w2 in -0.5f64..1.0, h2 in -0.5f64..1.0,
    ) {
        let a = RelativeBox::new(cx1, cy1, w1, h1);
        let b = RelativeBox::new(cx2, cy2, w2, h2);

        let iou = calculate_iou(&a, &b);
        prop_assert!((0.0..=1.0).contains(&iou), "IoU should be in [0,1], got {}", iou);
        prop_assert!((iou - calculate_iou(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn prop_iou_identity(
        left in 0.0f64..500.0, top in 0.0f64..500.0, w in 0.1f64..100.0, h in 0.1f64..100.0,
    ) {
        let bbox = PixelBox::new(left, top, left + w, top + h);
        prop_assert!((calculate_pixel_iou(&bbox, &bbox) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn prop_iou_disjoint_is_zero(
        left in 0.0f64..100.0, top in 0.0f64..100.0, w in 0.1f64..50.0, h in 0.1f64..50.0,
        gap in 0.0f64..50.0,
    ) {
        let a = PixelBox::new(left, top, left + w, top + h);
        let b = PixelBox::new(a.right + gap, top, a.right + gap + w, top + h);
        prop_assert_eq!(calculate_pixel_iou(&a, &b), 0.0);
    }
}

// Property: mask identities of the set algebra
proptest! {
    #[test]
    fn prop_mask_identities(bits in proptest::collection::vec(any::<bool>(), 4 * 16)) {
        let mask = Array2::from_shape_vec((4, 16), bits).unwrap();

        prop_assert_eq!(intersection(&mask, &mask).unwrap(), mask.clone());
        prop_assert!(union(&mask, &inverse(&mask)).unwrap().iter().all(|&b| b));
        prop_assert!(difference(&mask, &mask).unwrap().iter().all(|&b| !b));
    }
}
