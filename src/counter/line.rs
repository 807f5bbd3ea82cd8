use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-width of the counting band used when none is configured.
pub const DEFAULT_BAND_HALF_WIDTH: f32 = 5.0;

/// Direction attributed to a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of the line a vertical center lies on. Image y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

/// When a crossing is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingStrategy {
    /// Count once per pass through the band around the line.
    #[default]
    Band,
    /// Count when the center changes side between two observations.
    EdgeCrossing,
}

/// Horizontal counting line with a symmetric band around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountingLine {
    pub y: f32,
    pub band_half_width: f32,
}

impl CountingLine {
    pub fn new(y: f32, band_half_width: f32) -> Self {
        Self { y, band_half_width }
    }

    /// Line across the middle of a frame, with the default band.
    pub fn at_frame_middle(frame_height: u32) -> Self {
        Self::new((frame_height / 2) as f32, DEFAULT_BAND_HALF_WIDTH)
    }

    /// `true` when `center_y` lies strictly inside `(y - δ, y + δ)`.
    #[inline]
    pub fn in_band(&self, center_y: f32) -> bool {
        center_y > self.y - self.band_half_width && center_y < self.y + self.band_half_width
    }

    /// Down when the center is below the line, Up otherwise (including exactly on it).
    #[inline]
    pub fn direction_of(&self, center_y: f32) -> Direction {
        if center_y > self.y {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Side of the line, or `None` when exactly on it.
    #[inline]
    pub fn side(&self, center_y: f32) -> Option<Side> {
        if center_y < self.y {
            Some(Side::Above)
        } else if center_y > self.y {
            Some(Side::Below)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_open_interval() {
        let line = CountingLine::new(300.0, 5.0);
        assert!(!line.in_band(295.0));
        assert!(line.in_band(295.5));
        assert!(line.in_band(300.0));
        assert!(line.in_band(304.9));
        assert!(!line.in_band(305.0));
    }

    #[test]
    fn test_direction_tie_is_up() {
        let line = CountingLine::new(300.0, 5.0);
        assert_eq!(line.direction_of(300.0), Direction::Up);
        assert_eq!(line.direction_of(299.0), Direction::Up);
        assert_eq!(line.direction_of(301.0), Direction::Down);
    }

    #[test]
    fn test_side() {
        let line = CountingLine::new(300.0, 5.0);
        assert_eq!(line.side(10.0), Some(Side::Above));
        assert_eq!(line.side(300.0), None);
        assert_eq!(line.side(400.0), Some(Side::Below));
    }

    #[test]
    fn test_frame_middle() {
        let line = CountingLine::at_frame_middle(721);
        assert_eq!(line.y, 360.0);
        assert_eq!(line.band_half_width, DEFAULT_BAND_HALF_WIDTH);
    }
}
