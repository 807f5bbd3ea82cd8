//! Integration module for connecting object detection backends with the counter.
//!
//! This module provides the detector seam, validated ingestion of raw model
//! output, and a pipeline that runs tracking and counting frame by frame.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections, RawDetection};
pub use pipeline::{AnnotatedObject, CountingPipeline, FrameReport};
