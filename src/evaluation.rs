//! Tracker-only evaluation pipeline.
//!
//! Sequence metadata and the detection table feed the frame iterator, the
//! driver feeds each non-empty frame to an [`OnlineTracker`] and collects the
//! accepted tracks, and the writer persists them in MOTChallenge format.

mod detections;
mod driver;
mod frames;
mod online_tracker;
mod results;
mod sequence;

pub use detections::{DETECTION_FIELDS, Detection, DetectionTable};
pub use driver::{BoxFilter, Rejection, RunStats, TrackingDriver};
pub use frames::FrameIterator;
pub use online_tracker::{ImageSize, OnlineTracker, Track};
pub use results::{ResultRecord, write_results};
pub use sequence::{SEQUENCE_SECTION, SequenceMeta};
