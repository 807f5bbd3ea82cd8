//! Vehicle tracking and line-crossing counting.
//!
//! Per-frame detections from an external detector are associated into
//! persistent identities by [`VehicleTracker`]; [`CrossingCounter`] then
//! counts every identity at most once per pass over a horizontal line,
//! tallied by [`Direction`] and [`VehicleClass`].

pub mod config;
pub mod counter;
pub mod error;
pub mod integration;
pub mod tracker;
pub mod vehicle;

pub use config::{CountingConfig, LineConfig};
pub use counter::{
    CountingLine, CountingStrategy, CrossingCounter, CrossingEvent, Direction, VehicleCounts,
};
pub use error::{ConfigError, DetectionError};
pub use integration::{
    AnnotatedObject, CountingPipeline, DetectionBuilder, DetectionSource, FrameReport,
    IntoDetections, RawDetection,
};
pub use tracker::{
    AffinityMetric, AssignmentStrategy, Detection, MotionModel, Rect, TrackedObject,
    TrackerConfig, VehicleTracker,
};
pub use vehicle::VehicleClass;
