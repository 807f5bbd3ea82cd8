//! Seam between an external object detector and the tracker.

use log::{trace, warn};

use crate::error::DetectionError;
use crate::integration::DetectionBuilder;
use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to feed any detection model into the counting
/// pipeline. The frame representation is left to the implementation.
///
/// # Example
///
/// ```ignore
/// use linecount::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Frame = Vec<u8>;
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Vec<u8>) -> Result<Vec<Detection>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    type Frame: ?Sized;
    /// Error type for detection failures.
    type Error;

    /// Run inference on one frame.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<Detection>, Self::Error>;
}

/// Raw detector output: TLBR box, confidence and numeric class id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub bbox: [f32; 4],
    pub score: f32,
    pub class_id: usize,
}

impl RawDetection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Self {
        Self {
            bbox: [x1, y1, x2, y2],
            score,
            class_id,
        }
    }
}

impl TryFrom<&RawDetection> for Detection {
    type Error = DetectionError;

    fn try_from(raw: &RawDetection) -> Result<Self, Self::Error> {
        let [x1, y1, x2, y2] = raw.bbox;
        DetectionBuilder::new()
            .tlbr(x1, y1, x2, y2)
            .score(raw.score)
            .class_id(raw.class_id)
            .build()
    }
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

/// Non-vehicle classes are dropped silently; malformed boxes are dropped with a warning.
impl IntoDetections for Vec<RawDetection> {
    fn into_detections(self) -> Vec<Detection> {
        self.iter()
            .filter_map(|raw| match Detection::try_from(raw) {
                Ok(det) => Some(det),
                Err(DetectionError::UnknownClass(id)) => {
                    trace!("dropping detection of non-vehicle class {id}");
                    None
                }
                Err(err) => {
                    warn!("dropping malformed detection {raw:?}: {err}");
                    None
                }
            })
            .collect()
    }
}
