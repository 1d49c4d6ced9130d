/// Utilities for working with Polars DataFrames
///
/// This module converts between the grid types and Polars DataFrames:
/// annotation tables coming from a dataset layer, and threshold-sweep
/// results going to a reporting layer.

use polars::prelude::*;
use crate::error::GridError;
use crate::types::{Annotation, BatchScore, PixelBox};

/// Columns read by [`annotations_from_dataframe`]
pub const ANNOTATION_COLUMNS: [&str; 5] = ["category", "left", "top", "right", "bottom"];

/// Validate that a DataFrame contains all required columns
///
/// # Arguments
///
/// * `df` - The DataFrame to validate
/// * `required_columns` - Slice of required column names
///
/// # Returns
///
/// `Ok(())` if all columns are present, error otherwise
pub fn validate_columns(df: &DataFrame, required_columns: &[&str]) -> Result<(), GridError> {
    let column_names: Vec<String> = df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for col in required_columns {
        if !column_names.iter().any(|c| c == col) {
            return Err(GridError::MissingColumn(col.to_string()));
        }
    }

    Ok(())
}

/// Read annotations from a DataFrame with one row per object
///
/// Expected columns: category, left, top, right, bottom. Coordinates may be
/// any numeric type; null values are rejected.
pub fn annotations_from_dataframe(df: &DataFrame) -> Result<Vec<Annotation>, GridError> {
    validate_columns(df, &ANNOTATION_COLUMNS)?;

    let category_dtype = df.column("category")?.dtype();
    if !category_dtype.is_integer() {
        return Err(GridError::InvalidAnnotation(
            format!("category must be an integer type, got {:?}", category_dtype)
        ));
    }

    let categories = df.column("category")?.cast(&DataType::UInt64)?;
    let categories = categories.u64()?;

    let coords = ["left", "top", "right", "bottom"]
        .iter()
        .map(|name| df.column(name)?.cast(&DataType::Float64))
        .collect::<PolarsResult<Vec<Column>>>()?;
    let coords = coords
        .iter()
        .map(|column| column.f64())
        .collect::<PolarsResult<Vec<&Float64Chunked>>>()?;

    let mut annotations = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let category = categories.get(row).ok_or_else(|| GridError::InvalidAnnotation(
            format!("row {} has a null category", row)
        ))?;

        let mut values = [0.0; 4];
        for (value, column) in values.iter_mut().zip(&coords) {
            *value = column.get(row).ok_or_else(|| GridError::InvalidAnnotation(
                format!("row {} has a null coordinate", row)
            ))?;
        }

        annotations.push(Annotation::new(category as usize, PixelBox::from(values)));
    }

    Ok(annotations)
}

/// Build a DataFrame from the output of a threshold sweep
///
/// Columns: threshold, hit_count, summed_iou, correct_category_count,
/// matched_count, mean_iou
pub fn scores_to_dataframe(scores: &[(f64, BatchScore)]) -> Result<DataFrame, GridError> {
    let thresholds: Vec<f64> = scores.iter().map(|(t, _)| *t).collect();
    let hits: Vec<u64> = scores.iter().map(|(_, s)| s.hit_count as u64).collect();
    let summed: Vec<f64> = scores.iter().map(|(_, s)| s.summed_iou).collect();
    let correct: Vec<u64> = scores.iter().map(|(_, s)| s.correct_category_count as u64).collect();
    let matched: Vec<u64> = scores.iter().map(|(_, s)| s.matched_count as u64).collect();
    let mean: Vec<f64> = scores.iter().map(|(_, s)| s.mean_iou()).collect();

    let df = df! {
        "threshold" => thresholds,
        "hit_count" => hits,
        "summed_iou" => summed,
        "correct_category_count" => correct,
        "matched_count" => matched,
        "mean_iou" => mean,
    }?;

    Ok(df)
}
