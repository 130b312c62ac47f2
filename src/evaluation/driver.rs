//! Frame-by-frame control loop between the detection table and a tracker.

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::evaluation::{
    Detection, DetectionTable, FrameIterator, ImageSize, OnlineTracker, ResultRecord, SequenceMeta,
    Track,
};
use crate::tracker::Rect;

/// Post-hoc filter on the boxes returned by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxFilter {
    /// Tracks wider than `aspect_ratio_thresh * height` are dropped
    pub aspect_ratio_thresh: f64,
    /// Tracks with `width * height` at or below this are dropped
    pub min_box_area: f64,
}

impl Default for BoxFilter {
    fn default() -> Self {
        Self {
            aspect_ratio_thresh: 1.6,
            min_box_area: 10.0,
        }
    }
}

/// Why a track was left out of the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Aspect ratio above the threshold, or undefined (zero height)
    AspectRatio,
    /// Area at or below the minimum
    Area,
}

impl BoxFilter {
    pub fn check(&self, tlwh: &Rect) -> std::result::Result<(), Rejection> {
        match tlwh.aspect_ratio() {
            Some(aspect) if aspect <= self.aspect_ratio_thresh => {}
            _ => return Err(Rejection::AspectRatio),
        }
        if tlwh.area() <= self.min_box_area {
            return Err(Rejection::Area);
        }
        Ok(())
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_visited: u32,
    pub tracker_updates: u32,
    pub tracks_returned: usize,
    pub rejected_aspect_ratio: usize,
    pub rejected_area: usize,
    pub records: usize,
}

/// Feeds each non-empty frame to the tracker, in order, and keeps the
/// accepted tracks.
///
/// The tracker is owned for the whole run; its state depends on having seen
/// every earlier frame, so frames are never skipped ahead or replayed.
pub struct TrackingDriver<T: OnlineTracker> {
    tracker: T,
    filter: BoxFilter,
    records: Vec<ResultRecord>,
    stats: RunStats,
}

impl<T: OnlineTracker> TrackingDriver<T> {
    pub fn new(tracker: T, filter: BoxFilter) -> Self {
        Self {
            tracker,
            filter,
            records: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// Run every frame of the sequence.
    ///
    /// A tracker failure aborts the run; records accumulated before the
    /// failing frame stay available through [`Self::records`].
    pub fn run(&mut self, meta: &SequenceMeta, table: &DetectionTable) -> Result<&RunStats> {
        let outside = table.rows_outside(meta.seq_length);
        if outside > 0 {
            warn!(
                rows = outside,
                seq_length = meta.seq_length,
                "detections outside the sequence frame range are ignored"
            );
        }

        let image = meta.image_size();
        for frame_id in FrameIterator::new(meta.seq_length) {
            self.process_frame(frame_id, &table.rows_for_frame(frame_id), image)?;
        }

        info!(
            frames = self.stats.frames_visited,
            updates = self.stats.tracker_updates,
            tracks = self.stats.tracks_returned,
            rejected_aspect_ratio = self.stats.rejected_aspect_ratio,
            rejected_area = self.stats.rejected_area,
            records = self.stats.records,
            "tracking finished"
        );
        Ok(&self.stats)
    }

    /// Process one frame and return how many records it produced. Frames
    /// without detections never reach the tracker.
    pub fn process_frame(
        &mut self,
        frame_id: u32,
        detections: &[&Detection],
        image: ImageSize,
    ) -> Result<usize> {
        self.stats.frames_visited += 1;
        if detections.is_empty() {
            return Ok(0);
        }

        let input = Array2::from_shape_fn((detections.len(), 5), |(i, j)| {
            detections[i].tlbr_score()[j]
        });

        // No rescaling happens here: detections are already in image pixels.
        let tracks = self
            .tracker
            .update(input.view(), image, image)
            .map_err(|e| Error::Tracker {
                frame: frame_id,
                source: Box::new(e),
            })?;
        self.stats.tracker_updates += 1;
        self.stats.tracks_returned += tracks.len();

        let before = self.records.len();
        for track in tracks {
            self.record(frame_id, track);
        }
        let accepted = self.records.len() - before;

        debug!(
            frame = frame_id,
            detections = detections.len(),
            accepted,
            "frame processed"
        );
        Ok(accepted)
    }

    fn record(&mut self, frame_id: u32, track: Track) {
        match self.filter.check(&track.tlwh) {
            Ok(()) => {
                self.records.push(ResultRecord {
                    frame: frame_id,
                    track_id: track.track_id,
                    tlwh: track.tlwh.to_tlwh(),
                    score: track.score,
                });
                self.stats.records += 1;
            }
            Err(Rejection::AspectRatio) => self.stats.rejected_aspect_ratio += 1,
            Err(Rejection::Area) => self.stats.rejected_area += 1,
        }
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn filter(&self) -> &BoxFilter {
        &self.filter
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }
}
