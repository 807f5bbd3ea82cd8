//! Line-crossing counting on top of tracker identities.

mod counts;
mod crossing;
mod line;

pub use counts::{CountRow, VehicleCounts};
pub use crossing::{BandState, CrossingCounter, CrossingEvent, CrossingState};
pub use line::{CountingLine, CountingStrategy, DEFAULT_BAND_HALF_WIDTH, Direction, Side};
