//! Main BYTETracker algorithm implementation.

use std::collections::{HashMap, HashSet};

use ndarray::ArrayView2;

use crate::error::TrackerError;
use crate::evaluation::{ImageSize, OnlineTracker, Track};
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::{Rect, iou_batch};
use crate::tracker::strack::STrack;
use crate::tracker::track_state::TrackState;

/// Detections at or below this score are ignored entirely.
const LOW_SCORE_FLOOR: f64 = 0.1;
/// Gate for matching low-score detections to tracked tracks.
const SECOND_MATCH_THRESH: f64 = 0.5;
/// Gate for matching unconfirmed tracks.
const UNCONFIRMED_MATCH_THRESH: f64 = 0.7;
/// Tracked/lost pairs overlapping more than this are duplicates.
const DUPLICATE_IOU: f64 = 0.85;

/// Configuration for the BYTETracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Detections scoring above this take part in the first association
    pub track_thresh: f64,
    /// Frames a lost track is kept at 30 fps
    pub track_buffer: u32,
    /// Cost gate of the first association
    pub match_thresh: f64,
    /// Crowded-scene mode: match on raw IoU, without score fusion
    pub mot20: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            track_thresh: 0.5,
            track_buffer: 30,
            match_thresh: 0.8,
            mot20: false,
        }
    }
}

pub struct BYTETracker {
    tracked_stracks: Vec<STrack>,
    lost_stracks: Vec<STrack>,
    removed_stracks: Vec<STrack>,
    frame_id: u32,
    last_track_id: u64,
    config: TrackerConfig,
    det_thresh: f64,
    max_time_lost: u32,
    kalman_filter: KalmanFilter,
}

impl BYTETracker {
    pub fn new(config: TrackerConfig, frame_rate: f64) -> Self {
        let max_time_lost = (frame_rate / 30.0 * config.track_buffer as f64) as u32;
        Self {
            tracked_stracks: Vec::new(),
            lost_stracks: Vec::new(),
            removed_stracks: Vec::new(),
            frame_id: 0,
            last_track_id: 0,
            det_thresh: config.track_thresh + 0.1,
            config,
            max_time_lost,
            kalman_filter: KalmanFilter::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Frames a lost track survives before removal at this frame rate.
    pub fn max_time_lost(&self) -> u32 {
        self.max_time_lost
    }

    /// Number of updates processed so far.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    pub fn lost_stracks(&self) -> &[STrack] {
        &self.lost_stracks
    }

    pub fn removed_stracks(&self) -> &[STrack] {
        &self.removed_stracks
    }

    fn next_track_id(&mut self) -> u64 {
        self.last_track_id += 1;
        self.last_track_id
    }

    /// Advance one frame with detections already in original image pixels,
    /// returning the confirmed tracks.
    pub fn update_detections(
        &mut self,
        detections: Vec<Detection>,
    ) -> Result<Vec<STrack>, TrackerError> {
        self.frame_id += 1;
        let frame_id = self.frame_id;

        let mut activated_stracks = Vec::new();
        let mut refind_stracks = Vec::new();
        let mut lost_stracks = Vec::new();
        let mut removed_stracks = Vec::new();

        // Step 1: split detections by score
        let mut detections_high = Vec::new();
        let mut detections_low = Vec::new();
        for det in detections {
            let strack = STrack::new(det.bbox, det.score);
            if det.score > self.config.track_thresh {
                detections_high.push(strack);
            } else if det.score > LOW_SCORE_FLOOR && det.score < self.config.track_thresh {
                detections_low.push(strack);
            }
        }

        let previous_order: Vec<u64> = self.tracked_stracks.iter().map(|t| t.track_id).collect();
        let (tracked, mut unconfirmed): (Vec<STrack>, Vec<STrack>) = self
            .tracked_stracks
            .drain(..)
            .partition(|t| t.is_activated);

        // Lost tracks are predicted in place so their motion keeps advancing
        // between frames they are not matched.
        STrack::multi_predict(&mut self.lost_stracks, &self.kalman_filter);
        let mut strack_pool = tracked;
        STrack::multi_predict(&mut strack_pool, &self.kalman_filter);
        let strack_pool = joint_stracks(strack_pool, &self.lost_stracks);

        // Step 2: first association, high score detections
        let mut dists = matching::iou_distance(&rects(&strack_pool), &rects(&detections_high));
        if !self.config.mot20 {
            matching::fuse_score(&mut dists, &scores(&detections_high));
        }
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::linear_assignment(&dists, self.config.match_thresh)?;

        for (itracked, idet) in matches {
            let mut track = strack_pool[itracked].clone();
            let det = &detections_high[idet];
            if track.state == TrackState::Tracked {
                track.update(det, &self.kalman_filter, frame_id)?;
                activated_stracks.push(track);
            } else {
                track.re_activate(det, &self.kalman_filter, frame_id)?;
                refind_stracks.push(track);
            }
        }

        // Step 3: second association, low score detections against tracks
        // that were tracked on the previous frame
        let r_tracked_stracks: Vec<STrack> = unmatched_tracks
            .iter()
            .map(|&i| &strack_pool[i])
            .filter(|t| t.state == TrackState::Tracked)
            .cloned()
            .collect();

        let dists = matching::iou_distance(&rects(&r_tracked_stracks), &rects(&detections_low));
        let AssignmentResult {
            matches,
            unmatched_tracks,
            ..
        } = matching::linear_assignment(&dists, SECOND_MATCH_THRESH)?;

        for (itracked, idet) in matches {
            let mut track = r_tracked_stracks[itracked].clone();
            let det = &detections_low[idet];
            if track.state == TrackState::Tracked {
                track.update(det, &self.kalman_filter, frame_id)?;
                activated_stracks.push(track);
            } else {
                track.re_activate(det, &self.kalman_filter, frame_id)?;
                refind_stracks.push(track);
            }
        }

        for idx in unmatched_tracks {
            let mut track = r_tracked_stracks[idx].clone();
            if track.state != TrackState::Lost {
                track.mark_lost();
                lost_stracks.push(track);
            }
        }

        // Unconfirmed tracks, usually with only their birth frame, get one
        // chance against the leftover high score detections
        let detections_rem: Vec<STrack> = unmatched_detections
            .iter()
            .map(|&i| detections_high[i].clone())
            .collect();
        let mut dists = matching::iou_distance(&rects(&unconfirmed), &rects(&detections_rem));
        if !self.config.mot20 {
            matching::fuse_score(&mut dists, &scores(&detections_rem));
        }
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::linear_assignment(&dists, UNCONFIRMED_MATCH_THRESH)?;

        for (itracked, idet) in matches {
            unconfirmed[itracked].update(&detections_rem[idet], &self.kalman_filter, frame_id)?;
            activated_stracks.push(unconfirmed[itracked].clone());
        }
        for idx in unmatched_tracks {
            let mut track = unconfirmed[idx].clone();
            track.mark_removed();
            removed_stracks.push(track);
        }

        // Step 4: init new stracks
        for idx in unmatched_detections {
            let mut track = detections_rem[idx].clone();
            if track.score < self.det_thresh {
                continue;
            }
            let track_id = self.next_track_id();
            track.activate(&self.kalman_filter, frame_id, track_id);
            activated_stracks.push(track);
        }

        // Step 5: expire lost tracks
        for mut track in self.lost_stracks.drain(..) {
            if frame_id - track.end_frame() > self.max_time_lost {
                track.mark_removed();
                removed_stracks.push(track);
            } else {
                lost_stracks.push(track);
            }
        }

        let tracked_stracks = order_tracked(&previous_order, activated_stracks, refind_stracks);

        let lost_stracks = sub_stracks(lost_stracks, &tracked_stracks);
        let lost_stracks = sub_stracks(lost_stracks, &removed_stracks);
        self.removed_stracks.extend(removed_stracks);

        let (tracked, lost) = remove_duplicate_stracks(tracked_stracks, lost_stracks);
        self.tracked_stracks = tracked;
        self.lost_stracks = lost;

        Ok(self
            .tracked_stracks
            .iter()
            .filter(|t| t.is_activated)
            .cloned()
            .collect())
    }
}

impl OnlineTracker for BYTETracker {
    type Error = TrackerError;

    /// `detections` rows are (x1, y1, x2, y2, score) in `img_size` pixels;
    /// with six or more columns the score is `objectness * class_conf`.
    fn update(
        &mut self,
        detections: ArrayView2<'_, f64>,
        img_info: ImageSize,
        img_size: ImageSize,
    ) -> Result<Vec<Track>, TrackerError> {
        let (_, cols) = detections.dim();
        if cols < 5 {
            return Err(TrackerError::InvalidDetectionShape(cols));
        }
        for size in [img_info, img_size] {
            if size.height == 0 || size.width == 0 {
                return Err(TrackerError::InvalidImageSize {
                    height: size.height,
                    width: size.width,
                });
            }
        }

        let scale = (img_size.height as f64 / img_info.height as f64)
            .min(img_size.width as f64 / img_info.width as f64);

        let detections = detections
            .outer_iter()
            .map(|row| {
                let score = if cols == 5 { row[4] } else { row[4] * row[5] };
                Detection {
                    bbox: Rect::from_tlbr(row[0], row[1], row[2], row[3]).unscaled(scale),
                    score,
                }
            })
            .collect();

        let tracks = self.update_detections(detections)?;
        Ok(tracks
            .iter()
            .map(|t| Track {
                track_id: t.track_id,
                tlwh: t.tlwh(),
                score: t.score,
            })
            .collect())
    }
}

fn rects(stracks: &[STrack]) -> Vec<Rect> {
    stracks.iter().map(STrack::tlwh).collect()
}

fn scores(stracks: &[STrack]) -> Vec<f64> {
    stracks.iter().map(|t| t.score).collect()
}

/// Next tracked list: tracks carried over from the previous frame keep their
/// relative order, followed by births, then tracks recovered from lost.
fn order_tracked(
    previous_order: &[u64],
    activated: Vec<STrack>,
    refind: Vec<STrack>,
) -> Vec<STrack> {
    let rank: HashMap<u64, usize> = previous_order
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();
    let (mut carried, born): (Vec<STrack>, Vec<STrack>) = activated
        .into_iter()
        .partition(|t| rank.contains_key(&t.track_id));
    carried.sort_by_key(|t| rank.get(&t.track_id).copied());

    let tracked: Vec<STrack> = carried
        .into_iter()
        .chain(born)
        .filter(|t| t.state == TrackState::Tracked)
        .collect();
    let refind: Vec<STrack> = refind
        .into_iter()
        .filter(|t| t.state == TrackState::Tracked)
        .collect();
    joint_stracks(tracked, &refind)
}

/// Union by track id, keeping the first occurrence.
pub fn joint_stracks(tlista: Vec<STrack>, tlistb: &[STrack]) -> Vec<STrack> {
    let mut exists = HashSet::new();
    let mut res = Vec::with_capacity(tlista.len() + tlistb.len());
    for t in tlista {
        if exists.insert(t.track_id) {
            res.push(t);
        }
    }
    for t in tlistb {
        if exists.insert(t.track_id) {
            res.push(t.clone());
        }
    }
    res
}

/// Tracks of `tlista` whose id does not appear in `tlistb`.
pub fn sub_stracks(tlista: Vec<STrack>, tlistb: &[STrack]) -> Vec<STrack> {
    let b_ids: HashSet<u64> = tlistb.iter().map(|t| t.track_id).collect();
    tlista
        .into_iter()
        .filter(|t| !b_ids.contains(&t.track_id))
        .collect()
}

/// Drop the younger member of every tracked/lost pair that overlaps almost
/// completely.
pub fn remove_duplicate_stracks(
    stracksa: Vec<STrack>,
    stracksb: Vec<STrack>,
) -> (Vec<STrack>, Vec<STrack>) {
    if stracksa.is_empty() || stracksb.is_empty() {
        return (stracksa, stracksb);
    }

    let ious = iou_batch(&rects(&stracksa), &rects(&stracksb));
    let mut dupa = vec![false; stracksa.len()];
    let mut dupb = vec![false; stracksb.len()];

    for ((i, j), &iou) in ious.indexed_iter() {
        if iou > DUPLICATE_IOU {
            if stracksa[i].age() > stracksb[j].age() {
                dupb[j] = true;
            } else {
                dupa[i] = true;
            }
        }
    }

    let keep = |tracks: Vec<STrack>, dup: &[bool]| -> Vec<STrack> {
        tracks
            .into_iter()
            .zip(dup)
            .filter_map(|(t, &d)| (!d).then_some(t))
            .collect()
    };

    (keep(stracksa, &dupa), keep(stracksb, &dupb))
}
