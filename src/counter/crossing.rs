//! Per-identity crossing state and the counter that drives it.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;

use crate::counter::counts::VehicleCounts;
use crate::counter::line::{CountingLine, CountingStrategy, Direction, Side};
use crate::tracker::TrackedObject;
use crate::vehicle::VehicleClass;

/// Band membership of one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandState {
    #[default]
    Outside,
    /// Inside the band and already counted for this pass.
    CountedInBand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingState {
    pub band: BandState,
    /// Last side the center was strictly on; `None` until it leaves the line.
    pub side: Option<Side>,
    pub last_center_y: f32,
    pub last_seen_frame: u64,
}

/// A single counted crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossingEvent {
    pub track_id: u64,
    pub class: VehicleClass,
    pub direction: Direction,
    pub center_y: f32,
    pub frame: u64,
}

/// Counts each tracked identity at most once per crossing of the line.
///
/// The counter keeps one `CrossingState` per track id until told otherwise.
/// Callers must pass `VehicleTracker::removed_ids()` to [`retire`](Self::retire)
/// after every tracker update, before calling [`update`](Self::update), as
/// `CountingPipeline` does. Otherwise states of dead identities pile up.
#[derive(Debug, Clone)]
pub struct CrossingCounter {
    line: CountingLine,
    strategy: CountingStrategy,
    /// Drop states not observed for more than this many frames
    idle_frames: Option<u64>,
    states: HashMap<u64, CrossingState>,
    counts: VehicleCounts,
    frame: u64,
}

impl CrossingCounter {
    pub fn new(line: CountingLine, strategy: CountingStrategy) -> Self {
        Self {
            line,
            strategy,
            idle_frames: None,
            states: HashMap::new(),
            counts: VehicleCounts::with_classes(&VehicleClass::ALL),
            frame: 0,
        }
    }

    /// Only report (and pre-populate zero tallies for) the given classes.
    pub fn with_classes(mut self, classes: &[VehicleClass]) -> Self {
        self.counts = VehicleCounts::with_classes(classes);
        self
    }

    /// Expire identities that have not been observed for `frames` frames.
    ///
    /// `frames` must be at least the tracker's `max_age`. A shorter window
    /// drops the state of a vehicle the tracker is still holding through an
    /// occlusion, and the vehicle is counted again when it reappears in the
    /// band. `CountingConfig::validate` rejects such settings.
    pub fn with_idle_expiry(mut self, frames: u64) -> Self {
        self.idle_frames = Some(frames);
        self
    }

    /// Feed one frame of tracked objects and return the crossings counted in it.
    pub fn update(&mut self, objects: &[TrackedObject]) -> Vec<CrossingEvent> {
        self.frame += 1;
        let mut events = Vec::new();

        for obj in objects {
            let center_y = obj.bbox.center_y();
            let frame = self.frame;
            let state = self.states.entry(obj.track_id).or_insert(CrossingState {
                band: BandState::Outside,
                side: None,
                last_center_y: center_y,
                last_seen_frame: frame,
            });

            let direction = match self.strategy {
                CountingStrategy::Band => band_transition(&self.line, state, center_y),
                CountingStrategy::EdgeCrossing => edge_transition(&self.line, state, center_y),
            };
            state.last_center_y = center_y;
            state.last_seen_frame = frame;

            if let Some(direction) = direction {
                self.counts.increment(direction, obj.class);
                info!(
                    "frame {}: {} #{} crossed {} at y={:.1}",
                    frame, obj.class, obj.track_id, direction, center_y
                );
                events.push(CrossingEvent {
                    track_id: obj.track_id,
                    class: obj.class,
                    direction,
                    center_y,
                    frame,
                });
            }
        }

        if let Some(idle) = self.idle_frames {
            let frame = self.frame;
            let before = self.states.len();
            self.states.retain(|_, s| frame - s.last_seen_frame <= idle);
            let expired = before - self.states.len();
            if expired > 0 {
                debug!("frame {}: expired {} idle crossing states", frame, expired);
            }
        }

        events
    }

    /// Forget identities the tracker has removed.
    pub fn retire(&mut self, track_ids: &[u64]) {
        for id in track_ids {
            self.states.remove(id);
        }
    }

    pub fn counts(&self) -> &VehicleCounts {
        &self.counts
    }

    pub fn reset_counts(&mut self) {
        self.counts.reset();
    }

    pub fn state(&self, track_id: u64) -> Option<&CrossingState> {
        self.states.get(&track_id)
    }

    /// Number of identities currently holding crossing state.
    pub fn tracked_identities(&self) -> usize {
        self.states.len()
    }

    pub fn line(&self) -> &CountingLine {
        &self.line
    }

    pub fn strategy(&self) -> CountingStrategy {
        self.strategy
    }
}

/// OUTSIDE -> COUNTED_IN_BAND fires once; leaving the band re-arms it.
fn band_transition(line: &CountingLine, state: &mut CrossingState, center_y: f32) -> Option<Direction> {
    if let Some(side) = line.side(center_y) {
        state.side = Some(side);
    }
    if !line.in_band(center_y) {
        state.band = BandState::Outside;
        return None;
    }
    match state.band {
        BandState::Outside => {
            state.band = BandState::CountedInBand;
            Some(line.direction_of(center_y))
        }
        BandState::CountedInBand => None,
    }
}

/// Fires when the strict side of the line flips; the line itself keeps the previous side.
fn edge_transition(line: &CountingLine, state: &mut CrossingState, center_y: f32) -> Option<Direction> {
    state.band = if line.in_band(center_y) {
        BandState::CountedInBand
    } else {
        BandState::Outside
    };
    let current = line.side(center_y)?;
    let previous = state.side.replace(current);
    match (previous, current) {
        (Some(Side::Above), Side::Below) => Some(Direction::Down),
        (Some(Side::Below), Side::Above) => Some(Direction::Up),
        _ => None,
    }
}
