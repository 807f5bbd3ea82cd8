/// Track lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Matched to a detection in the most recent frame
    #[default]
    Tracked,
    /// Unmatched for at least one frame but still within `max_age`
    Lost,
    /// Unmatched for more than `max_age` frames; never emitted again
    Removed,
}
