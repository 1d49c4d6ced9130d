//! Example sweeping the confidence threshold over a batch of predictions.

use ndarray::Array3;
use yolo_grid::{
    frame::scores_to_dataframe,
    layout::stack_layouts,
    threshold::{generate_threshold_range, score_at_thresholds},
    encode_sample, Annotation, GridConfig, PixelBox, Sample,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Confidence Threshold Sweep Example ===\n");

    // Example 1: Generate threshold range
    println!("1. Generating Threshold Range");
    let thresholds = generate_threshold_range(0.0, 1.0, 11)?;
    println!("   Generated {} thresholds:", thresholds.len());
    println!("   {:?}", thresholds);
    println!();

    // Example 2: Build targets and noisy predictions
    println!("2. Building a Batch");
    let config = GridConfig::default();
    let norm = config.normalization();
    let spec = config.grid;

    let targets = (0..4)
        .map(|item| {
            let offset = 40.0 + item as f64 * 90.0;
            let bbox = PixelBox::new(offset, offset, offset + 50.0, offset + 60.0);
            let sample = Sample {
                spatial_size: config.spatial_size,
                annotations: vec![
                    Annotation::new(item % spec.object_categories, bbox),
                    Annotation::new(9, PixelBox::new(300.0, 20.0, 420.0, 90.0)),
                ],
            };
            encode_sample(spec, &sample, &norm)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let target = stack_layouts(&targets)?;

    // Predictions copy the targets, then lower each item's confidences
    let mut prediction: Array3<f64> = target.clone();
    for (item, mut layout) in prediction.outer_iter_mut().enumerate() {
        let scale = 0.3 + 0.2 * item as f64;
        layout
            .slice_mut(ndarray::s![..spec.confidences, ..])
            .mapv_inplace(|conf| conf * scale);
    }
    println!("   Batch shape: {:?}", prediction.shape());
    println!();

    // Example 3: Score at every threshold
    println!("3. Scores at Different Thresholds");
    let sweep = score_at_thresholds(&prediction, &target, &thresholds, spec.confidences, spec.bounding_boxes)?;

    println!("   Threshold | Hits | Mean IoU | Correct");
    println!("   ----------|------|----------|--------");
    for (threshold, score) in &sweep {
        println!(
            "   {:>8.2} | {:>4} | {:>8.4} | {:>7}",
            threshold,
            score.hit_count,
            score.mean_iou(),
            score.correct_category_count
        );
    }
    println!();

    // Example 4: Tabulate with polars
    println!("4. Sweep as a DataFrame");
    let df = scores_to_dataframe(&sweep)?;
    println!("{}", df);
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
