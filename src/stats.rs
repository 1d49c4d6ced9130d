/// Epoch-level accumulation of batch scores
///
/// This module turns the cumulative sums returned per batch into the
/// averages a training loop reports: mean IoU over hits and top-1 category
/// accuracy over hits.

use crate::types::BatchScore;
use log::info;
use serde::{Deserialize, Serialize};

/// Running totals over any number of scored batches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreAccumulator {
    /// Number of batches added
    pub batches: usize,

    /// Sum of all batch scores
    pub total: BatchScore,
}

impl ScoreAccumulator {
    /// Create a new `ScoreAccumulator` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch's score
    pub fn add(&mut self, score: BatchScore) {
        self.batches += 1;
        self.total += score;
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn hit_count(&self) -> usize {
        self.total.hit_count
    }

    /// Mean IoU over all hits, or 0.0 without hits
    pub fn mean_iou(&self) -> f64 {
        self.total.mean_iou()
    }

    /// Number of hit-mask cells, including those whose boxes do not overlap
    pub fn matched_count(&self) -> usize {
        self.total.matched_count
    }

    /// Fraction of hit-mask cells whose top-1 categories agree, or 0.0 when
    /// no cell passed the confidence gate
    pub fn category_accuracy(&self) -> f64 {
        self.total.category_accuracy()
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Log a summary of the totals at info level
    pub fn log_summary(&self) {
        info!("{}", self.summary_string());
    }

    /// Get a formatted string summary of the totals
    pub fn summary_string(&self) -> String {
        format!(
            "ScoreAccumulator {{ batches: {}, hits: {}, mean_iou: {:.4}, category_accuracy: {:.4} }}",
            self.batches,
            self.total.hit_count,
            self.mean_iou(),
            self.category_accuracy()
        )
    }
}

impl Extend<BatchScore> for ScoreAccumulator {
    fn extend<I: IntoIterator<Item = BatchScore>>(&mut self, scores: I) {
        for score in scores {
            self.add(score);
        }
    }
}
