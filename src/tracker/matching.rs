//! Affinity computation and detection-to-track assignment.

use std::cmp::Ordering;

use log::warn;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::tracker::rect::Rect;
use crate::vehicle::VehicleClass;

/// Cost given to pairs that may never be matched when solving the optimal assignment.
const FORBIDDEN_COST: f64 = 1e6;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Detection confidence score in [0, 1]
    pub score: f32,
    pub class: VehicleClass,
}

impl Detection {
    /// Create a detection from a top-left corner and size.
    ///
    /// No validation happens here; use [`crate::DetectionBuilder`] at the
    /// boundary with the detector.
    pub fn new(x: f32, y: f32, width: f32, height: f32, score: f32, class: VehicleClass) -> Self {
        Self {
            bbox: Rect::new(x, y, width, height),
            score,
            class,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32, class: VehicleClass) -> Self {
        Self { bbox, score, class }
    }
}

/// How similar a track box and a detection box are, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AffinityMetric {
    /// Intersection over union.
    #[default]
    Iou,
    /// `1 - distance / max_distance` between box centers, floored at zero.
    Centroid { max_distance: f32 },
}

impl AffinityMetric {
    pub fn affinity(&self, a: &Rect, b: &Rect) -> f32 {
        match *self {
            Self::Iou => a.iou(b),
            Self::Centroid { max_distance } => {
                if max_distance <= 0.0 {
                    return 0.0;
                }
                (1.0 - a.centroid_distance(b) / max_distance).max(0.0)
            }
        }
    }
}

/// How the affinity matrix is turned into matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Highest-affinity pairs first; ties go to the lower detection index, then the lower track row.
    #[default]
    Greedy,
    /// Global minimum-cost matching on `1 - affinity`.
    Optimal,
}

/// Compute the (tracks x detections) affinity matrix.
///
/// Pairs whose classes differ get zero affinity, so they can never clear a
/// positive match threshold.
pub fn affinity_matrix(
    tracks: &[(Rect, VehicleClass)],
    detections: &[Detection],
    metric: AffinityMetric,
) -> Array2<f32> {
    let mut affinity = Array2::zeros((tracks.len(), detections.len()));
    for (i, (track_box, track_class)) in tracks.iter().enumerate() {
        for (j, det) in detections.iter().enumerate() {
            if *track_class == det.class {
                affinity[[i, j]] = metric.affinity(track_box, &det.bbox);
            }
        }
    }
    affinity
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(track row, detection column)` pairs, sorted by track row.
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn from_matches(mut matches: Vec<(usize, usize)>, num_rows: usize, num_cols: usize) -> Self {
        matches.sort_unstable();
        let mut row_used = vec![false; num_rows];
        let mut col_used = vec![false; num_cols];
        for &(row, col) in &matches {
            row_used[row] = true;
            col_used[col] = true;
        }
        Self {
            matches,
            unmatched_tracks: (0..num_rows).filter(|&i| !row_used[i]).collect(),
            unmatched_detections: (0..num_cols).filter(|&j| !col_used[j]).collect(),
        }
    }
}

/// Dispatch to the configured assignment strategy.
pub fn assign(affinity: &Array2<f32>, thresh: f32, strategy: AssignmentStrategy) -> AssignmentResult {
    match strategy {
        AssignmentStrategy::Greedy => greedy_assignment(affinity, thresh),
        AssignmentStrategy::Optimal => linear_assignment(affinity, thresh),
    }
}

/// Greedy matching in descending affinity order.
pub fn greedy_assignment(affinity: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = affinity.dim();

    let mut candidates: Vec<(f32, usize, usize)> = affinity
        .indexed_iter()
        .filter(|&(_, &a)| a >= thresh)
        .map(|((row, col), &a)| (a, row, col))
        .collect();

    candidates.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then(a.2.cmp(&b.2))
            .then(a.1.cmp(&b.1))
    });

    let mut row_used = vec![false; num_rows];
    let mut col_used = vec![false; num_cols];
    let mut matches = Vec::new();
    for (_, row, col) in candidates {
        if row_used[row] || col_used[col] {
            continue;
        }
        row_used[row] = true;
        col_used[col] = true;
        matches.push((row, col));
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

/// Optimal matching using the Jonker-Volgenant solver.
///
/// The cost matrix is padded to a square; pairs under `thresh` are forbidden
/// before solving and any that still come back are rejected.
pub fn linear_assignment(affinity: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = affinity.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::from_matches(Vec::new(), num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), FORBIDDEN_COST);
    for ((row, col), &a) in affinity.indexed_iter() {
        if a >= thresh {
            padded[[row, col]] = 1.0 - a as f64;
        }
    }

    let mut matches = Vec::new();
    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
                if col < num_cols && affinity[[row, col]] >= thresh {
                    matches.push((row, col));
                }
            }
        }
        Err(err) => {
            warn!("optimal assignment failed ({err:?}), falling back to greedy matching");
            return greedy_assignment(affinity, thresh);
        }
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn car(x: f32, y: f32) -> Detection {
        Detection::new(x, y, 50.0, 50.0, 0.9, VehicleClass::Car)
    }

    #[test]
    fn test_class_mismatch_has_zero_affinity() {
        let tracks = [(Rect::new(0.0, 0.0, 50.0, 50.0), VehicleClass::Car)];
        let dets = [
            Detection::new(0.0, 0.0, 50.0, 50.0, 0.9, VehicleClass::Truck),
            car(0.0, 0.0),
        ];
        let affinity = affinity_matrix(&tracks, &dets, AffinityMetric::Iou);
        assert_eq!(affinity[[0, 0]], 0.0);
        assert!((affinity[[0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_affinity() {
        let metric = AffinityMetric::Centroid { max_distance: 10.0 };
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!((metric.affinity(&a, &a.translated(3.0, 4.0)) - 0.5).abs() < 1e-6);
        assert_eq!(metric.affinity(&a, &a.translated(30.0, 0.0)), 0.0);
    }

    #[test]
    fn test_greedy_prefers_highest_affinity() {
        let affinity = array![[0.9, 0.5], [0.8, 0.4]];
        let result = greedy_assignment(&affinity, 0.3);
        assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
        assert!(result.unmatched_tracks.is_empty());
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_greedy_tie_prefers_lower_detection_index() {
        let affinity = array![[0.6, 0.6]];
        let result = greedy_assignment(&affinity, 0.3);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_threshold_rejects_pairs() {
        let affinity = array![[0.2, 0.0], [0.0, 0.31]];
        for strategy in [AssignmentStrategy::Greedy, AssignmentStrategy::Optimal] {
            let result = assign(&affinity, 0.3, strategy);
            assert_eq!(result.matches, vec![(1, 1)]);
            assert_eq!(result.unmatched_tracks, vec![0]);
            assert_eq!(result.unmatched_detections, vec![0]);
        }
    }

    #[test]
    fn test_optimal_beats_greedy() {
        // Greedy takes (0, 0) and strands track 1; the optimum pairs both.
        let affinity = array![[0.9, 0.8], [0.7, 0.0]];
        let greedy = greedy_assignment(&affinity, 0.3);
        assert_eq!(greedy.matches, vec![(0, 0)]);

        let optimal = linear_assignment(&affinity, 0.3);
        assert_eq!(optimal.matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_empty_inputs() {
        let no_tracks = Array2::<f32>::zeros((0, 2));
        let result = linear_assignment(&no_tracks, 0.3);
        assert_eq!(result.unmatched_detections, vec![0, 1]);

        let no_dets = Array2::<f32>::zeros((3, 0));
        let result = greedy_assignment(&no_dets, 0.3);
        assert_eq!(result.unmatched_tracks, vec![0, 1, 2]);
    }
}
