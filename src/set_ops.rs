//! Elementwise boolean set operations used to build match masks.
//!
//! Every binary operation requires both operands to have the same shape and
//! returns [`GridError::ShapeMismatch`] otherwise. Nothing is broadcast.

use crate::error::{GridError, Result};
use ndarray::{Array, ArrayBase, Data, Dimension, Zip};

fn check_shapes<S1, S2, A, B, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<()>
where
    S1: Data<Elem = A>,
    S2: Data<Elem = B>,
    D: Dimension,
{
    if a.shape() != b.shape() {
        return Err(GridError::shape_mismatch(a.shape(), b.shape()));
    }
    Ok(())
}

/// Elementwise `a | b`.
pub fn union<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = bool>,
    S2: Data<Elem = bool>,
    D: Dimension,
{
    check_shapes(a, b)?;
    Ok(Zip::from(a).and(b).map_collect(|&x, &y| x || y))
}

/// Elementwise `a & b`.
pub fn intersection<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = bool>,
    S2: Data<Elem = bool>,
    D: Dimension,
{
    check_shapes(a, b)?;
    Ok(Zip::from(a).and(b).map_collect(|&x, &y| x && y))
}

/// Elementwise `!a`.
pub fn inverse<S, D>(a: &ArrayBase<S, D>) -> Array<bool, D>
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    a.mapv(|x| !x)
}

/// Elements of `a` that are not also in `b`.
pub fn difference<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = bool>,
    S2: Data<Elem = bool>,
    D: Dimension,
{
    check_shapes(a, b)?;
    Ok(Zip::from(a).and(b).map_collect(|&x, &y| if x && y { false } else { x }))
}

/// Elementwise `a > b`.
pub fn gt<S1, S2, A, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    A: PartialOrd,
    D: Dimension,
{
    check_shapes(a, b)?;
    Ok(Zip::from(a).and(b).map_collect(|x, y| x > y))
}

/// Elementwise `a < b`.
pub fn lt<S1, S2, A, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    A: PartialOrd,
    D: Dimension,
{
    check_shapes(a, b)?;
    Ok(Zip::from(a).and(b).map_collect(|x, y| x < y))
}

/// Elementwise `a == b`.
pub fn eq<S1, S2, A, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<Array<bool, D>>
where
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    A: PartialEq,
    D: Dimension,
{
    check_shapes(a, b)?;
    Ok(Zip::from(a).and(b).map_collect(|x, y| x == y))
}

/// Elementwise `a > threshold`.
pub fn exceeds<S, D>(a: &ArrayBase<S, D>, threshold: f64) -> Array<bool, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    a.mapv(|x| x > threshold)
}
