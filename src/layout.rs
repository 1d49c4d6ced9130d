//! Grid tensor ownership and per-cell addressing.
//!
//! A [`GridLayout`] owns a `(channels, cells)` array for one sample. Cells are
//! addressed through [`CellRecord`] views, which borrow a single column of the
//! array, so a write through one cursor can never reach another cell.

use crate::error::{GridError, Result};
use crate::types::{CellAddress, GridSpec, RelativeBox};
use log::trace;
use ndarray::{s, stack, Array2, Array3, ArrayBase, ArrayView1, ArrayView2, Axis, Data, DataMut, Ix1, ViewRepr};

/// A category write: a hard class index or a soft `(index, score)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryLabel {
    /// Sets the index to 1.0 and leaves the other scores untouched.
    Hard(usize),
    /// Sets the index to `score`.
    Soft { index: usize, score: f64 },
}

impl CategoryLabel {
    pub fn index(&self) -> usize {
        match *self {
            CategoryLabel::Hard(index) | CategoryLabel::Soft { index, .. } => index,
        }
    }

    pub fn score(&self) -> f64 {
        match *self {
            CategoryLabel::Hard(_) => 1.0,
            CategoryLabel::Soft { score, .. } => score,
        }
    }
}

impl From<usize> for CategoryLabel {
    fn from(index: usize) -> Self {
        CategoryLabel::Hard(index)
    }
}

impl From<(usize, f64)> for CategoryLabel {
    fn from((index, score): (usize, f64)) -> Self {
        CategoryLabel::Soft { index, score }
    }
}

/// Index of the largest value; the first index wins ties.
///
/// Returns 0 for an empty input.
pub fn argmax<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, &value) in values.into_iter().enumerate() {
        if value > best_value || index == 0 {
            best_index = index;
            best_value = value;
        }
    }
    best_index
}

/// A view of one cell's record.
pub struct CellRecord<S>
where
    S: Data<Elem = f64>,
{
    spec: GridSpec,
    record: ArrayBase<S, Ix1>,
}

/// Mutable cell view returned by [`GridLayout::cursor_at`].
pub type CellCursor<'a> = CellRecord<ViewRepr<&'a mut f64>>;

/// Read-only cell view returned by [`GridLayout::cell_at`].
pub type CellView<'a> = CellRecord<ViewRepr<&'a f64>>;

impl<S> CellRecord<S>
where
    S: Data<Elem = f64>,
{
    fn check_confidence_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.spec.confidences {
            return Err(GridError::SlotOutOfRange {
                kind: "confidences",
                slot,
                count: self.spec.confidences,
            });
        }
        Ok(())
    }

    fn check_box_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.spec.bounding_boxes {
            return Err(GridError::SlotOutOfRange {
                kind: "bounding_boxes",
                slot,
                count: self.spec.bounding_boxes,
            });
        }
        Ok(())
    }

    fn check_category(&self, category: usize) -> Result<()> {
        if category >= self.spec.object_categories {
            return Err(GridError::CategoryOutOfRange {
                category,
                count: self.spec.object_categories,
            });
        }
        Ok(())
    }

    pub fn get_confidence(&self, slot: usize) -> Result<f64> {
        self.check_confidence_slot(slot)?;
        Ok(self.record[slot])
    }

    pub fn get_bounding_box(&self, slot: usize) -> Result<RelativeBox> {
        self.check_box_slot(slot)?;
        let offset = self.spec.box_offset(slot);
        Ok(RelativeBox::new(
            self.record[offset],
            self.record[offset + 1],
            self.record[offset + 2],
            self.record[offset + 3],
        ))
    }

    /// The category score vector of the cell.
    pub fn get_object_category(&self) -> ArrayView1<'_, f64> {
        self.record.slice(s![self.spec.category_offset()..])
    }

    /// Top-1 category of the cell.
    pub fn argmax_category(&self) -> usize {
        argmax(self.get_object_category())
    }

    /// The whole record, confidences first.
    pub fn record(&self) -> ArrayView1<'_, f64> {
        self.record.view()
    }
}

impl<S> CellRecord<S>
where
    S: DataMut<Elem = f64>,
{
    pub fn set_confidence(&mut self, slot: usize, value: f64) -> Result<()> {
        self.check_confidence_slot(slot)?;
        self.record[slot] = value;
        Ok(())
    }

    /// Write `value` into every confidence channel.
    pub fn fill_confidences(&mut self, value: f64) {
        self.record.slice_mut(s![..self.spec.confidences]).fill(value);
    }

    pub fn set_bounding_box(&mut self, slot: usize, bbox: RelativeBox) -> Result<()> {
        self.check_box_slot(slot)?;
        let offset = self.spec.box_offset(slot);
        self.record[offset] = bbox.center_x;
        self.record[offset + 1] = bbox.center_y;
        self.record[offset + 2] = bbox.width;
        self.record[offset + 3] = bbox.height;
        Ok(())
    }

    /// Write a hard (`usize`) or soft (`(usize, f64)`) category label.
    ///
    /// Only the addressed score changes; callers that want a clean one-hot
    /// vector must start from a zeroed record.
    pub fn set_object_category(&mut self, label: impl Into<CategoryLabel>) -> Result<()> {
        let label = label.into();
        self.check_category(label.index())?;
        let offset = self.spec.category_offset();
        self.record[offset + label.index()] = label.score();
        Ok(())
    }
}

/// A grid tensor of shape `(record_len, cells)` together with its spec.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    spec: GridSpec,
    tensor: Array2<f64>,
}

impl GridLayout {
    /// Allocate a zeroed layout for `spec`.
    pub fn new(spec: GridSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            tensor: Array2::zeros((spec.record_len(), spec.cells())),
        })
    }

    /// Adopt an existing `(record_len, cells)` array.
    pub fn from_tensor(spec: GridSpec, tensor: Array2<f64>) -> Result<Self> {
        spec.validate()?;
        let expected = [spec.record_len(), spec.cells()];
        if tensor.shape() != expected {
            return Err(GridError::shape_mismatch(&expected, tensor.shape()));
        }
        Ok(Self { spec, tensor })
    }

    /// Copy one item out of a `(batch, record_len, cells)` array.
    pub fn from_batch_item<S>(spec: GridSpec, batch: &ArrayBase<S, ndarray::Ix3>, index: usize) -> Result<Self>
    where
        S: Data<Elem = f64>,
    {
        if index >= batch.len_of(Axis(0)) {
            return Err(GridError::BatchIndexOutOfRange {
                index,
                batch: batch.len_of(Axis(0)),
            });
        }
        Self::from_tensor(spec, batch.index_axis(Axis(0), index).to_owned())
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn tensor(&self) -> &Array2<f64> {
        &self.tensor
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.tensor.view()
    }

    pub fn into_tensor(self) -> Array2<f64> {
        self.tensor
    }

    /// Flattened values in channel-major order.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.tensor.iter().copied().collect()
    }

    /// Zero every value so the layout can be reused for another sample.
    pub fn clear(&mut self) {
        self.tensor.fill(0.0);
    }

    /// Mutable view of the record at `cell`.
    pub fn cursor_at(&mut self, cell: impl Into<CellAddress>) -> Result<CellCursor<'_>> {
        let cell = cell.into();
        let index = self.spec.cell_index(cell)?;
        trace!("cursor at cell ({}, {}) -> column {}", cell.grid_i, cell.grid_j, index);
        Ok(CellRecord {
            spec: self.spec,
            record: self.tensor.column_mut(index),
        })
    }

    /// Read-only view of the record at `cell`.
    pub fn cell_at(&self, cell: impl Into<CellAddress>) -> Result<CellView<'_>> {
        let index = self.spec.cell_index(cell.into())?;
        Ok(CellRecord {
            spec: self.spec,
            record: self.tensor.column(index),
        })
    }
}

/// Stack layouts sharing one spec into a `(batch, record_len, cells)` array.
pub fn stack_layouts(layouts: &[GridLayout]) -> Result<Array3<f64>> {
    let first = layouts
        .first()
        .ok_or_else(|| GridError::InvalidSpec("cannot stack an empty list of layouts".to_string()))?;

    if let Some(other) = layouts.iter().find(|layout| layout.spec != first.spec) {
        return Err(GridError::InvalidSpec(format!(
            "layouts have different specs: {:?} vs {:?}",
            first.spec, other.spec
        )));
    }

    let views: Vec<ArrayView2<'_, f64>> = layouts.iter().map(GridLayout::view).collect();
    Ok(stack(Axis(0), &views)?)
}
