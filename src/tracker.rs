mod kalman_filter;
mod matching;
mod rect;
mod strack;
mod track_state;
mod vehicle_tracker;

pub use kalman_filter::KalmanFilter;
pub use matching::{
    AffinityMetric, AssignmentResult, AssignmentStrategy, Detection, affinity_matrix, assign,
    greedy_assignment, linear_assignment,
};
pub use rect::Rect;
pub use strack::STrack;
pub use track_state::TrackState;
pub use vehicle_tracker::{MotionModel, TrackedObject, TrackerConfig, VehicleTracker};
