//! ByteTrack multi-object tracker.
//!
//! This is the tracker driven by [`crate::evaluation::TrackingDriver`] in the
//! `track_only` binary. It implements [`crate::OnlineTracker`], so any other
//! tracker with the same interface can be swapped in.

mod byte_tracker;
mod kalman_filter;
mod matching;
mod rect;
mod strack;
mod track_state;

pub use byte_tracker::{BYTETracker, TrackerConfig};
pub use matching::Detection;
pub use rect::Rect;
pub use strack::STrack;
pub use track_state::TrackState;
