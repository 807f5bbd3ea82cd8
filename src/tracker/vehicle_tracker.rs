//! Frame-to-frame association of vehicle detections into persistent identities.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AffinityMetric, AssignmentResult, AssignmentStrategy, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::strack::STrack;
use crate::tracker::track_state::TrackState;
use crate::vehicle::VehicleClass;

/// How a track's box is carried forward between frames for association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionModel {
    /// Associate against the last matched box.
    #[default]
    Static,
    /// Associate against a constant-velocity Kalman prediction.
    Kalman,
}

/// Configuration for the VehicleTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// How a track's box is compared with a detection box
    pub affinity: AffinityMetric,
    /// Minimum affinity for a track/detection pair to be matched
    pub match_thresh: f32,
    /// Frames a track may stay unmatched before it is removed
    pub max_age: u32,
    /// Greedy or globally optimal (lapjv) matching of tracks to detections
    pub assignment: AssignmentStrategy,
    /// Box each track contributes to association
    pub motion: MotionModel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            affinity: AffinityMetric::Iou,
            match_thresh: 0.3,
            max_age: 30,
            assignment: AssignmentStrategy::Greedy,
            motion: MotionModel::Static,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.match_thresh > 0.0 && self.match_thresh <= 1.0) {
            return Err(ConfigError::MatchThreshold(self.match_thresh));
        }
        if self.max_age == 0 {
            return Err(ConfigError::ZeroMaxAge);
        }
        if let AffinityMetric::Centroid { max_distance } = self.affinity {
            if !(max_distance.is_finite() && max_distance > 0.0) {
                return Err(ConfigError::CentroidDistance(max_distance));
            }
        }
        Ok(())
    }
}

/// A track matched (or born) in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedObject {
    pub bbox: Rect,
    pub score: f32,
    pub class: VehicleClass,
    pub track_id: u64,
}

impl From<&STrack> for TrackedObject {
    fn from(track: &STrack) -> Self {
        Self {
            bbox: track.tlwh,
            score: track.score,
            class: track.class,
            track_id: track.track_id,
        }
    }
}

/// Multi-object tracker with class-gated association and bounded occlusion patience.
///
/// Only tracks matched or born in the current frame are emitted; tracks
/// coasting through a miss stay alive internally but are not reported.
pub struct VehicleTracker {
    /// Live tracks, ordered by ascending id
    tracks: Vec<STrack>,
    removed_ids: Vec<u64>,
    next_id: u64,
    frame_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl Default for VehicleTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl VehicleTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            removed_ids: Vec::new(),
            next_id: 1,
            frame_id: 0,
            config,
            kalman_filter: KalmanFilter::default(),
        }
    }

    /// Advance one frame with this frame's detections.
    ///
    /// Matched tracks take over their detection's box, score and class;
    /// unmatched tracks age and are removed once `time_since_update` exceeds
    /// `max_age` (see [`removed_ids`](Self::removed_ids)); unmatched
    /// detections start new tracks. Returns the tracks matched or born in
    /// this frame, ordered by ascending id.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<TrackedObject> {
        self.frame_id += 1;
        self.removed_ids.clear();

        if self.config.motion == MotionModel::Kalman {
            STrack::multi_predict(&mut self.tracks, &self.kalman_filter);
        }

        let track_boxes: Vec<(Rect, VehicleClass)> =
            self.tracks.iter().map(|t| (t.rect(), t.class)).collect();
        let affinity = matching::affinity_matrix(&track_boxes, detections, self.config.affinity);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::assign(&affinity, self.config.match_thresh, self.config.assignment);

        for &(itrack, idet) in &matches {
            let track = &mut self.tracks[itrack];
            trace!(
                "frame {}: track {} matched detection {} (affinity {:.3})",
                self.frame_id,
                track.track_id,
                idet,
                affinity[[itrack, idet]]
            );
            track.update(&detections[idet], &self.kalman_filter, self.frame_id);
        }

        for &itrack in &unmatched_tracks {
            let track = &mut self.tracks[itrack];
            track.mark_missed();
            if track.time_since_update > self.config.max_age {
                track.mark_removed();
                self.removed_ids.push(track.track_id);
            }
        }
        self.tracks.retain(|t| t.state != TrackState::Removed);

        for &idet in &unmatched_detections {
            let mut track = STrack::new(self.next_id, &detections[idet], self.frame_id);
            if self.config.motion == MotionModel::Kalman {
                track.activate_motion(&self.kalman_filter);
            }
            self.next_id += 1;
            self.tracks.push(track);
        }

        debug!(
            "frame {}: {} detections, {} matched, {} new, {} removed, {} live",
            self.frame_id,
            detections.len(),
            matches.len(),
            unmatched_detections.len(),
            self.removed_ids.len(),
            self.tracks.len()
        );

        self.tracks
            .iter()
            .filter(|t| t.time_since_update == 0)
            .map(TrackedObject::from)
            .collect()
    }

    /// Ids removed during the most recent `update`.
    pub fn removed_ids(&self) -> &[u64] {
        &self.removed_ids
    }

    /// All live tracks, including those coasting through a miss.
    pub fn tracks(&self) -> &[STrack] {
        &self.tracks
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: f32, y: f32, class: VehicleClass) -> Detection {
        Detection::new(x, y, 50.0, 50.0, 0.9, class)
    }

    #[test]
    fn test_zero_tracks_spawn_per_detection() {
        let mut tracker = VehicleTracker::default();
        let out = tracker.update(&[
            det(0.0, 0.0, VehicleClass::Car),
            det(300.0, 0.0, VehicleClass::Bus),
        ]);
        let ids: Vec<u64> = out.iter().map(|o| o.track_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_zero_detections_age_tracks() {
        let mut tracker = VehicleTracker::default();
        tracker.update(&[det(0.0, 0.0, VehicleClass::Car)]);
        let out = tracker.update(&[]);
        assert!(out.is_empty());
        assert_eq!(tracker.tracks().len(), 1);
        assert_eq!(tracker.tracks()[0].time_since_update, 1);
        assert_eq!(tracker.tracks()[0].state, TrackState::Lost);
    }

    #[test]
    fn test_class_gate() {
        let mut tracker = VehicleTracker::default();
        let first = tracker.update(&[det(100.0, 100.0, VehicleClass::Car)]);
        let second = tracker.update(&[det(100.0, 100.0, VehicleClass::Truck)]);
        assert_eq!(second.len(), 1);
        assert_ne!(second[0].track_id, first[0].track_id);
        assert_eq!(second[0].class, VehicleClass::Truck);
    }

    #[test]
    fn test_removed_ids_reported_once() {
        let mut tracker = VehicleTracker::new(TrackerConfig {
            max_age: 1,
            ..TrackerConfig::default()
        });
        tracker.update(&[det(0.0, 0.0, VehicleClass::Car)]);
        tracker.update(&[]);
        assert!(tracker.removed_ids().is_empty());
        tracker.update(&[]);
        assert_eq!(tracker.removed_ids(), &[1]);
        assert!(tracker.tracks().is_empty());
        tracker.update(&[]);
        assert!(tracker.removed_ids().is_empty());
    }

    #[test]
    fn test_kalman_follows_accelerating_vehicle() {
        // Step sizes grow to 35 px on a 50 px box, dropping the IoU between
        // consecutive raw boxes below 0.3 from y = 200 on.
        let ys = [100.0, 110.0, 125.0, 145.0, 170.0, 200.0, 235.0];
        let run = |motion| {
            let mut tracker = VehicleTracker::new(TrackerConfig {
                motion,
                ..TrackerConfig::default()
            });
            ys.iter()
                .flat_map(|&y| tracker.update(&[det(100.0, y, VehicleClass::Car)]))
                .map(|o| o.track_id)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(MotionModel::Kalman), vec![1; ys.len()]);
        assert_eq!(run(MotionModel::Static), vec![1, 1, 1, 1, 1, 2, 3]);
    }

    #[test]
    fn test_validate() {
        assert!(TrackerConfig::default().validate().is_ok());
        let bad = TrackerConfig {
            match_thresh: 0.0,
            ..TrackerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::MatchThreshold(_))));
        let bad = TrackerConfig {
            max_age: 0,
            ..TrackerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::ZeroMaxAge)));
        let bad = TrackerConfig {
            affinity: AffinityMetric::Centroid { max_distance: 0.0 },
            ..TrackerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::CentroidDistance(_))));
    }
}
