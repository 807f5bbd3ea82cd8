//! Counting configuration: tracker parameters, the counting line and the counted classes.

use serde::{Deserialize, Serialize};

use crate::counter::{CountingLine, CountingStrategy, CrossingCounter, DEFAULT_BAND_HALF_WIDTH};
use crate::error::ConfigError;
use crate::tracker::{TrackerConfig, VehicleTracker};
use crate::vehicle::VehicleClass;

/// Counting line placement and counting rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Vertical pixel coordinate of the line
    pub y: f32,
    /// Half-width of the counting band; must be positive for `Band` counting
    #[serde(default = "default_band_half_width")]
    pub band_half_width: f32,
    #[serde(default)]
    pub strategy: CountingStrategy,
    /// Passive expiry of crossing state for identities unseen this many frames.
    /// Must be at least the tracker's `max_age`.
    #[serde(default)]
    pub idle_frames: Option<u64>,
}

impl LineConfig {
    pub fn new(y: f32) -> Self {
        Self {
            y,
            band_half_width: DEFAULT_BAND_HALF_WIDTH,
            strategy: CountingStrategy::default(),
            idle_frames: None,
        }
    }

    pub fn line(&self) -> CountingLine {
        CountingLine::new(self.y, self.band_half_width)
    }
}

fn default_band_half_width() -> f32 {
    DEFAULT_BAND_HALF_WIDTH
}

fn default_classes() -> Vec<VehicleClass> {
    VehicleClass::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountingConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub line: LineConfig,
    /// Vehicle classes that are tracked and counted
    #[serde(default = "default_classes")]
    pub classes: Vec<VehicleClass>,
}

impl CountingConfig {
    pub fn new(line: LineConfig) -> Self {
        Self {
            tracker: TrackerConfig::default(),
            line,
            classes: default_classes(),
        }
    }

    /// Defaults with the line across the middle of a `frame_height` tall frame.
    pub fn for_frame_height(frame_height: u32) -> Self {
        let line = CountingLine::at_frame_middle(frame_height);
        Self::new(LineConfig::new(line.y))
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        if !self.line.y.is_finite() {
            return Err(ConfigError::LinePosition(self.line.y));
        }
        let band = self.line.band_half_width;
        let band_ok = match self.line.strategy {
            CountingStrategy::Band => band > 0.0,
            CountingStrategy::EdgeCrossing => band >= 0.0,
        };
        if !(band.is_finite() && band_ok) {
            return Err(ConfigError::BandHalfWidth(band));
        }
        // Expiring before the tracker gives up on an identity would count it again.
        if let Some(idle_frames) = self.line.idle_frames {
            if idle_frames < u64::from(self.tracker.max_age) {
                return Err(ConfigError::IdleExpiry {
                    idle_frames,
                    max_age: self.tracker.max_age,
                });
            }
        }
        if self.classes.is_empty() {
            return Err(ConfigError::EmptyClassSet);
        }
        Ok(())
    }

    pub fn counts_class(&self, class: VehicleClass) -> bool {
        self.classes.contains(&class)
    }

    pub fn build_tracker(&self) -> VehicleTracker {
        VehicleTracker::new(self.tracker.clone())
    }

    pub fn build_counter(&self) -> CrossingCounter {
        let counter = CrossingCounter::new(self.line.line(), self.line.strategy)
            .with_classes(&self.classes);
        match self.line.idle_frames {
            Some(frames) => counter.with_idle_expiry(frames),
            None => counter,
        }
    }
}
