//! Error types for detection ingestion and configuration.

use thiserror::Error;

/// Reasons a raw detection is rejected before it reaches the tracker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("invalid box dimensions: width={width}, height={height}")]
    InvalidDimensions { width: f32, height: f32 },
    #[error("box coordinate is not finite")]
    NonFiniteCoordinate,
    #[error("score {0} is outside [0, 1]")]
    ScoreOutOfRange(f32),
    #[error("class id {0} is not a counted vehicle class")]
    UnknownClass(usize),
    #[error("detection has no class")]
    MissingClass,
}

/// Reasons a counting configuration is rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("match threshold {0} must lie in (0, 1]")]
    MatchThreshold(f32),
    #[error("max_age must be at least one frame")]
    ZeroMaxAge,
    #[error("centroid max_distance {0} must be positive")]
    CentroidDistance(f32),
    #[error("band half-width {0} must be finite, and positive for band counting")]
    BandHalfWidth(f32),
    #[error("idle_frames {idle_frames} must be at least the tracker max_age {max_age}")]
    IdleExpiry { idle_frames: u64, max_age: u32 },
    #[error("counting line position {0} must be finite")]
    LinePosition(f32),
    #[error("at least one vehicle class must be counted")]
    EmptyClassSet,
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
