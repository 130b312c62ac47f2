/// Lifecycle of a single track inside [`super::BYTETracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Born from an unmatched detection, not yet confirmed
    #[default]
    New,
    /// Matched on the latest frame
    Tracked,
    /// Unmatched, kept alive for re-identification within the track buffer
    Lost,
    /// Dropped for good
    Removed,
}
