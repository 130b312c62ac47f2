//! Cost matrices and gated linear assignment for the association steps.

use ndarray::Array2;

use crate::error::TrackerError;
use crate::tracker::rect::{Rect, iou_batch};

/// One detection as the tracker sees it, already in original-image pixels.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub bbox: Rect,
    pub score: f64,
}

impl Detection {
    /// Build from TLBR corners (x1, y1, x2, y2).
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }
}

/// `1 - IoU` for every (track, detection) pair.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f64> {
    iou_batch(track_boxes, det_boxes).mapv_into(|iou| 1.0 - iou)
}

/// Weight IoU similarity by detection confidence, so low-confidence
/// detections are harder to match.
pub fn fuse_score(cost_matrix: &mut Array2<f64>, det_scores: &[f64]) {
    for ((_, j), cost) in cost_matrix.indexed_iter_mut() {
        let iou_sim = 1.0 - *cost;
        *cost = 1.0 - iou_sim * det_scores[j];
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Minimum-cost assignment of rows (tracks) to columns (detections); pairs
/// costing more than `thresh` are left unmatched.
pub fn linear_assignment(
    cost_matrix: &Array2<f64>,
    thresh: f64,
) -> Result<AssignmentResult, TrackerError> {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return Ok(AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        });
    }

    // lapjv needs a square matrix; padding cells are never worth taking
    let size = num_rows.max(num_cols);
    let padded = Array2::<f64>::from_shape_fn((size, size), |(i, j)| {
        if i < num_rows && j < num_cols {
            cost_matrix[[i, j]]
        } else {
            1e6
        }
    });
    let row_to_col = solve(&padded)?;

    let mut result = AssignmentResult::default();
    let mut detection_taken = vec![false; num_cols];
    for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
        if col < num_cols && cost_matrix[[row, col]] <= thresh {
            result.matches.push((row, col));
            detection_taken[col] = true;
        } else {
            result.unmatched_tracks.push(row);
        }
    }

    result.unmatched_detections = detection_taken
        .iter()
        .enumerate()
        .filter_map(|(j, &taken)| (!taken).then_some(j))
        .collect();

    Ok(result)
}

/// Column picked for every row of a square cost matrix.
fn solve(costs: &Array2<f64>) -> Result<Vec<usize>, TrackerError> {
    lapjv::lapjv(costs)
        .map(|(row_to_col, _)| row_to_col)
        .map_err(|e| TrackerError::Assignment(e.to_string()))
}
