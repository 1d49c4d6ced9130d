//! Conversions between pixel-space boxes and grid-relative boxes.

use crate::types::{CellAddress, GridSpec, Normalization, PixelBox, RelativeBox, SpatialSize};

/// A pixel box expressed in normalized image space and in its owning cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCoord {
    /// Center x as an offset inside the cell, in cell widths.
    pub cent_x_rel: f64,
    /// Center y as an offset inside the cell, in cell heights.
    pub cent_y_rel: f64,
    pub lt_x: f64,
    pub lt_y: f64,
    pub rb_x: f64,
    pub rb_y: f64,
    pub cell: CellAddress,
}

impl GridCoord {
    /// The relative box stored in a grid record.
    pub fn relative_box(&self) -> RelativeBox {
        RelativeBox::new(
            self.cent_x_rel,
            self.cent_y_rel,
            self.rb_x - self.lt_x,
            self.rb_y - self.lt_y,
        )
    }
}

fn normalize_x(x: f64, norm: &Normalization) -> f64 {
    norm.gamma * (x - norm.alpha) / norm.beta
}

fn normalize_y(y: f64, size: SpatialSize, norm: &Normalization) -> f64 {
    normalize_x(y * size.width / size.height, norm)
}

fn denormalize_x(x_n: f64, norm: &Normalization) -> f64 {
    norm.alpha + x_n * norm.beta / norm.gamma
}

fn denormalize_y(y_n: f64, size: SpatialSize, norm: &Normalization) -> f64 {
    denormalize_x(y_n, norm) * size.height / size.width
}

/// `floor(value * cells)` clamped into `[0, cells)`.
fn clamp_cell(value: f64, cells: usize) -> usize {
    let index = (value * cells as f64).floor();
    if index <= 0.0 || index.is_nan() {
        0
    } else {
        (index as usize).min(cells - 1)
    }
}

/// Convert a pixel-space box into its owning cell and cell-relative center.
///
/// The cell is chosen from the normalized box center and clamped to the grid,
/// so boxes whose center lies on or past the image edge land in the border
/// cells. The relative coordinates themselves are never clamped.
///
/// # Example
///
/// ```
/// use yolo_grid::transform::to_grid_relative;
/// use yolo_grid::types::{GridSpec, Normalization, PixelBox, SpatialSize};
///
/// let spec = GridSpec::default();
/// let size = SpatialSize::new(448.0, 448.0).unwrap();
/// let coord = to_grid_relative(
///     &PixelBox::new(33.0, 40.0, 89.0, 96.0),
///     size,
///     &spec,
///     &Normalization::identity(size),
/// );
/// assert_eq!((coord.cell.grid_i, coord.cell.grid_j), (1, 1));
/// ```
pub fn to_grid_relative(
    bbox: &PixelBox,
    spatial_size: SpatialSize,
    spec: &GridSpec,
    norm: &Normalization,
) -> GridCoord {
    let lt_x = normalize_x(bbox.left, norm);
    let lt_y = normalize_y(bbox.top, spatial_size, norm);
    let rb_x = normalize_x(bbox.right, norm);
    let rb_y = normalize_y(bbox.bottom, spatial_size, norm);

    let cent_x = (lt_x + rb_x) / 2.0;
    let cent_y = (lt_y + rb_y) / 2.0;

    let grid_i = clamp_cell(cent_x, spec.grid_cols);
    let grid_j = clamp_cell(cent_y, spec.grid_rows);

    GridCoord {
        cent_x_rel: cent_x * spec.grid_cols as f64 - grid_i as f64,
        cent_y_rel: cent_y * spec.grid_rows as f64 - grid_j as f64,
        lt_x,
        lt_y,
        rb_x,
        rb_y,
        cell: CellAddress::new(grid_i, grid_j),
    }
}

/// Inverse of [`to_grid_relative`]: rebuild the pixel box stored in `cell`.
pub fn from_grid_relative(
    rel: &RelativeBox,
    cell: CellAddress,
    spec: &GridSpec,
    spatial_size: SpatialSize,
    norm: &Normalization,
) -> PixelBox {
    let cent_x = (rel.center_x + cell.grid_i as f64) / spec.grid_cols as f64;
    let cent_y = (rel.center_y + cell.grid_j as f64) / spec.grid_rows as f64;
    let half_w = rel.width / 2.0;
    let half_h = rel.height / 2.0;

    PixelBox::new(
        denormalize_x(cent_x - half_w, norm),
        denormalize_y(cent_y - half_h, spatial_size, norm),
        denormalize_x(cent_x + half_w, norm),
        denormalize_y(cent_y + half_h, spatial_size, norm),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> SpatialSize {
        SpatialSize::new(size, size).unwrap()
    }

    #[test]
    fn test_identity_cell_and_offsets() {
        let spec = GridSpec::default();
        let size = square(448.0);
        let coord = to_grid_relative(
            &PixelBox::new(33.0, 40.0, 89.0, 96.0),
            size,
            &spec,
            &Normalization::identity(size),
        );

        // center (61, 68) / 448 * 8 = (1.0893, 1.2143)
        assert_eq!(coord.cell, CellAddress::new(1, 1));
        assert!((coord.cent_x_rel - (61.0 / 56.0 - 1.0)).abs() < 1e-12);
        assert!((coord.cent_y_rel - (68.0 / 56.0 - 1.0)).abs() < 1e-12);

        let rel = coord.relative_box();
        assert!((rel.width - 56.0 / 448.0).abs() < 1e-12);
        assert!((rel.height - 56.0 / 448.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let spec = GridSpec::new(7, 5, 1, 2, 3).unwrap();
        let size = SpatialSize::new(640.0, 480.0).unwrap();
        let norm = Normalization::identity(size);
        let bbox = PixelBox::new(100.0, 50.0, 300.0, 420.0);

        let coord = to_grid_relative(&bbox, size, &spec, &norm);
        let back = from_grid_relative(&coord.relative_box(), coord.cell, &spec, size, &norm);
        assert!(back.max_abs_diff(&bbox) < 1e-9, "{:?} vs {:?}", back, bbox);
    }

    #[test]
    fn test_round_trip_with_window() {
        let spec = GridSpec::default();
        let size = square(448.0);
        let norm = Normalization::new(16.0, 224.0, 2.0).unwrap();
        let bbox = PixelBox::new(40.0, 60.0, 100.0, 90.0);

        let coord = to_grid_relative(&bbox, size, &spec, &norm);
        let back = from_grid_relative(&coord.relative_box(), coord.cell, &spec, size, &norm);
        assert!(back.max_abs_diff(&bbox) < 1e-9);
    }

    #[test]
    fn test_cell_is_clamped_at_edges() {
        let spec = GridSpec::default();
        let size = square(448.0);
        let norm = Normalization::identity(size);

        let past_right = to_grid_relative(&PixelBox::new(440.0, 440.0, 480.0, 480.0), size, &spec, &norm);
        assert_eq!(past_right.cell, CellAddress::new(7, 7));
        // relative offset is not clamped
        assert!(past_right.cent_x_rel > 1.0);

        let before_left = to_grid_relative(&PixelBox::new(-40.0, -40.0, -10.0, -10.0), size, &spec, &norm);
        assert_eq!(before_left.cell, CellAddress::new(0, 0));
        assert!(before_left.cent_x_rel < 0.0);
    }
}
