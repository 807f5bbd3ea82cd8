//! Validating builder that turns detector output into tracker `Detection`s.

use crate::error::DetectionError;
use crate::tracker::{Detection, Rect};
use crate::vehicle::VehicleClass;

/// Builder for creating validated `Detection` objects from various box formats.
///
/// Boxes poking out past the left or top image edge are clipped to it; boxes
/// with negative size, non-finite coordinates, scores outside [0, 1] or a
/// class outside the vehicle set are rejected.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
    class_id: Option<usize>,
    class: Option<VehicleClass>,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.tlbr(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.tlbr(x, y, x + w, y + h)
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Set the detector's numeric class id; resolved to a [`VehicleClass`] on build.
    pub fn class_id(mut self, class_id: usize) -> Self {
        self.class_id = Some(class_id);
        self.class = None;
        self
    }

    pub fn class(mut self, class: VehicleClass) -> Self {
        self.class = Some(class);
        self.class_id = None;
        self
    }

    pub fn build(self) -> Result<Detection, DetectionError> {
        let coords = [self.x1, self.y1, self.x2, self.y2];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(DetectionError::NonFiniteCoordinate);
        }
        let (width, height) = (self.x2 - self.x1, self.y2 - self.y1);
        if width < 0.0 || height < 0.0 {
            return Err(DetectionError::InvalidDimensions { width, height });
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(DetectionError::ScoreOutOfRange(self.score));
        }
        let class = match (self.class, self.class_id) {
            (Some(class), _) => class,
            (None, Some(id)) => VehicleClass::try_from(id)?,
            (None, None) => return Err(DetectionError::MissingClass),
        };

        let (x1, y1) = (self.x1.max(0.0), self.y1.max(0.0));
        let (x2, y2) = (self.x2.max(0.0), self.y2.max(0.0));
        Ok(Detection::from_rect(
            Rect::from_tlbr(x1, y1, x2, y2),
            self.score,
            class,
        ))
    }
}
