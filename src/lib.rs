//! Tracker-only evaluation of ByteTrack.
//!
//! Feeds a pre-computed, per-frame MOTChallenge detection file through a
//! multi-object tracker, frame by frame, and writes the surviving tracks in
//! the MOTChallenge results format.
//!
//! ```rust,ignore
//! use bytetrack_eval::{BYTETracker, BoxFilter, DetectionTable, SequenceMeta, TrackerConfig};
//! use bytetrack_eval::evaluation::{TrackingDriver, write_results};
//!
//! let meta = SequenceMeta::load("MOT20-01/seqinfo.ini")?;
//! let table = DetectionTable::load("MOT20-01/det/det.txt")?;
//! let tracker = BYTETracker::new(TrackerConfig::default(), meta.frame_rate);
//!
//! let mut driver = TrackingDriver::new(tracker, BoxFilter::default());
//! driver.run(&meta, &table)?;
//! write_results(driver.records(), Some("out/MOT20-01.txt".as_ref()))?;
//! ```

mod error;
pub mod evaluation;
pub mod tracker;

pub use error::{ConfigError, Error, InputFormatError, OutputError, Result, TrackerError};
pub use evaluation::{
    BoxFilter, Detection, DetectionTable, FrameIterator, ImageSize, OnlineTracker, ResultRecord,
    SequenceMeta, Track, TrackingDriver,
};
pub use tracker::{BYTETracker, TrackerConfig};
