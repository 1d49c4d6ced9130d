//! Example encoding annotated images into grids and scoring predictions.

use yolo_grid::{
    codec::decode_box, encode_prediction, encode_sample, layout::stack_layouts,
    loader::load_sample_from_str, metrics::calculate_pixel_iou, score_batch, CellAddress, GridConfig,
    GridLayout, PixelBox, PredictionCell, RelativeBox, ScoreAccumulator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== YOLO Grid Encoding Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = PixelBox::new(10.0, 10.0, 60.0, 60.0);
    let bbox2 = PixelBox::new(30.0, 30.0, 80.0, 80.0);
    println!("   IoU between overlapping boxes: {:.4}", calculate_pixel_iou(&bbox1, &bbox2));
    println!();

    // Example 2: Load an annotated sample
    println!("2. Loading a Sample");
    let config = GridConfig::default();
    let norm = config.normalization();
    let sample_json = r#"{
        "width": 448,
        "height": 448,
        "annotations": [
            {"category": 8, "bbox": [33.0, 40.0, 89.0, 96.0]},
            {"category": 2, "bbox": [250.0, 180.0, 330.0, 300.0]}
        ]
    }"#;
    let sample = load_sample_from_str(sample_json)?;
    println!("   Loaded {} annotations", sample.annotations.len());
    println!("   Grid: {}x{} cells", config.grid.grid_rows, config.grid.grid_cols);
    println!();

    // Example 3: Encode and decode
    println!("3. Encoding Targets");
    let target = encode_sample(config.grid, &sample, &norm)?;
    println!("   Layout shape: {:?}", target.tensor().shape());
    let decoded = decode_box(&target, CellAddress::new(1, 1), 0, sample.spatial_size, &norm)?;
    println!("   Decoded box in cell (1, 1): {:?}", decoded);
    println!();

    // Example 4: Stage predictions
    println!("4. Staging Predictions");
    let mut prediction = GridLayout::new(config.grid)?;
    let target_cell = target.cell_at((1, 1))?.get_bounding_box(0)?;
    encode_prediction(
        &mut prediction,
        &PredictionCell {
            cell: CellAddress::new(1, 1),
            confidence: 0.92,
            category: 8,
            category_score: 0.7,
            bbox_slot: 0,
            bbox: RelativeBox::new(
                target_cell.center_x + 0.05,
                target_cell.center_y,
                target_cell.width,
                target_cell.height * 1.1,
            ),
        },
    )?;
    encode_prediction(
        &mut prediction,
        &PredictionCell {
            cell: CellAddress::new(4, 3),
            confidence: 0.35,
            category: 2,
            category_score: 0.9,
            bbox_slot: 0,
            bbox: RelativeBox::new(0.6, 0.8, 0.18, 0.27),
        },
    )?;
    println!("   Staged 2 predicted cells");
    println!();

    // Example 5: Score the batch
    println!("5. Scoring");
    let pred_batch = stack_layouts(&[prediction])?;
    let true_batch = stack_layouts(&[target])?;
    let score = score_batch(
        &pred_batch,
        &true_batch,
        config.threshold,
        config.grid.confidences,
        config.grid.bounding_boxes,
    )?;
    println!("   Threshold: {:.2}", config.threshold);
    println!("   ├─ Hits: {}", score.hit_count);
    println!("   ├─ Summed IoU: {:.4}", score.summed_iou);
    println!("   └─ Correct categories: {}", score.correct_category_count);
    println!();

    // Example 6: Accumulate over an epoch
    println!("6. Accumulating Scores");
    let mut accumulator = ScoreAccumulator::new();
    accumulator.add(score);
    accumulator.add(score);
    println!("   {}", accumulator.summary_string());
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
