//! Single object track (STrack) owned by the tracker.

use crate::tracker::kalman_filter::{KalmanFilter, StateCovariance, StateVector};
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;
use crate::vehicle::VehicleClass;

/// Single object track.
#[derive(Debug, Clone)]
pub struct STrack {
    /// Unique track identifier, never reused within a tracker
    pub track_id: u64,
    pub state: TrackState,
    pub class: VehicleClass,
    /// Score of the last matched detection
    pub score: f32,
    /// Last matched detection box (TLWH)
    pub tlwh: Rect,
    /// Frame the track was born in
    pub start_frame: u64,
    /// Last frame the track was matched in
    pub frame_id: u64,
    /// Frames since the track was last matched
    pub time_since_update: u32,
    /// Number of frames the track has been matched, including its birth
    pub hits: u32,
    motion: Option<(StateVector, StateCovariance)>,
}

impl STrack {
    /// Start a new track from an unmatched detection.
    pub fn new(track_id: u64, det: &Detection, frame_id: u64) -> Self {
        Self {
            track_id,
            state: TrackState::Tracked,
            class: det.class,
            score: det.score,
            tlwh: det.bbox,
            start_frame: frame_id,
            frame_id,
            time_since_update: 0,
            hits: 1,
            motion: None,
        }
    }

    /// Enable Kalman prediction for this track, seeded from its current box.
    pub fn activate_motion(&mut self, kalman_filter: &KalmanFilter) {
        self.motion = Some(kalman_filter.initiate(self.tlwh.to_xyah()));
    }

    /// Box used for association: the Kalman prediction when available,
    /// otherwise the last matched box.
    pub fn rect(&self) -> Rect {
        match &self.motion {
            Some((mean, _)) => Rect::from_xyah(
                mean[0] as f32,
                mean[1] as f32,
                mean[2] as f32,
                mean[3] as f32,
            ),
            None => self.tlwh,
        }
    }

    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        if let Some((mean, cov)) = &self.motion {
            let mut mean = *mean;
            if self.state != TrackState::Tracked {
                // freeze height velocity while coasting
                mean[7] = 0.0;
            }
            self.motion = Some(kalman_filter.predict(&mean, cov));
        }
    }

    pub fn multi_predict(stracks: &mut [STrack], kalman_filter: &KalmanFilter) {
        for strack in stracks.iter_mut() {
            strack.predict(kalman_filter);
        }
    }

    /// Take over box, score and class from the matched detection.
    pub fn update(&mut self, det: &Detection, kalman_filter: &KalmanFilter, frame_id: u64) {
        if let Some((mean, cov)) = &self.motion {
            self.motion = Some(kalman_filter.update(mean, cov, det.bbox.to_xyah()));
        }

        self.tlwh = det.bbox;
        self.score = det.score;
        self.class = det.class;
        self.frame_id = frame_id;
        self.time_since_update = 0;
        self.hits += 1;
        self.state = TrackState::Tracked;
    }

    /// Age the track by one unmatched frame.
    pub fn mark_missed(&mut self) {
        self.time_since_update += 1;
        self.state = TrackState::Lost;
    }

    pub fn mark_removed(&mut self) {
        self.state = TrackState::Removed;
    }
}
