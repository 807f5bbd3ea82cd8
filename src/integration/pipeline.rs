//! CountingPipeline: detector, tracker and crossing counter run frame by frame.

use serde::Serialize;

use crate::config::CountingConfig;
use crate::counter::{CrossingCounter, CrossingEvent, Direction, VehicleCounts};
use crate::error::ConfigError;
use crate::tracker::{Detection, TrackedObject, VehicleTracker};

use super::DetectionSource;

/// A tracked object annotated with the side of the line it is on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotatedObject {
    pub object: TrackedObject,
    pub direction: Direction,
}

/// Everything an overlay or report needs about one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub objects: Vec<AnnotatedObject>,
    pub crossings: Vec<CrossingEvent>,
}

/// Bundles a `DetectionSource` with the tracker and the crossing counter.
///
/// Frames must be fed in order; each call completes tracking and counting
/// before returning.
pub struct CountingPipeline<D: DetectionSource> {
    detector: D,
    tracker: VehicleTracker,
    counter: CrossingCounter,
    config: CountingConfig,
}

impl<D: DetectionSource> CountingPipeline<D> {
    /// Build the tracker and counter from a validated `config`.
    pub fn new(detector: D, config: CountingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector,
            tracker: config.build_tracker(),
            counter: config.build_counter(),
            config,
        })
    }

    /// Pipeline with default settings and the counting line across the middle of the frame.
    pub fn for_frame_height(detector: D, frame_height: u32) -> Self {
        let config = CountingConfig::for_frame_height(frame_height);
        Self {
            detector,
            tracker: config.build_tracker(),
            counter: config.build_counter(),
            config,
        }
    }

    /// Detect, track and count one frame.
    pub fn process_frame(&mut self, frame: &D::Frame) -> Result<FrameReport, D::Error> {
        let detections = self.detector.detect(frame)?;
        Ok(self.process_detections(detections))
    }

    /// Track and count one frame of already detected objects.
    pub fn process_detections(&mut self, mut detections: Vec<Detection>) -> FrameReport {
        detections.retain(|d| self.config.counts_class(d.class));

        let tracked = self.tracker.update(&detections);
        self.counter.retire(self.tracker.removed_ids());
        let crossings = self.counter.update(&tracked);

        let line = *self.counter.line();
        FrameReport {
            frame: self.tracker.frame_id(),
            objects: tracked
                .into_iter()
                .map(|object| AnnotatedObject {
                    direction: line.direction_of(object.bbox.center_y()),
                    object,
                })
                .collect(),
            crossings,
        }
    }

    pub fn counts(&self) -> &VehicleCounts {
        self.counter.counts()
    }

    pub fn reset_counts(&mut self) {
        self.counter.reset_counts();
    }

    pub fn config(&self) -> &CountingConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &VehicleTracker {
        &self.tracker
    }

    pub fn counter(&self) -> &CrossingCounter {
        &self.counter
    }
}
