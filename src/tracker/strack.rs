//! Single object track (STrack) and its lifecycle transitions.

use crate::error::TrackerError;
use crate::tracker::kalman_filter::{Covariance, KalmanFilter, Mean};
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

#[derive(Debug, Clone)]
pub struct STrack {
    /// Identifier assigned on activation, 0 until then
    pub track_id: u64,
    pub state: TrackState,
    /// Confirmed tracks are the only ones reported to callers
    pub is_activated: bool,
    /// Score of the last associated detection
    pub score: f64,
    /// Frame of the last association
    pub frame_id: u32,
    pub start_frame: u32,
    /// Consecutive associations since (re)activation
    pub tracklet_len: u32,
    kalman: Option<(Mean, Covariance)>,
    /// Box of the detection this track was created from
    detection_tlwh: Rect,
}

impl STrack {
    pub fn new(tlwh: Rect, score: f64) -> Self {
        Self {
            track_id: 0,
            state: TrackState::New,
            is_activated: false,
            score,
            frame_id: 0,
            start_frame: 0,
            tracklet_len: 0,
            kalman: None,
            detection_tlwh: tlwh,
        }
    }

    /// Current box: the Kalman estimate once activated, the detection before.
    pub fn tlwh(&self) -> Rect {
        match &self.kalman {
            Some((mean, _)) => Rect::from_xyah(mean[0], mean[1], mean[2], mean[3]),
            None => self.detection_tlwh,
        }
    }

    pub fn end_frame(&self) -> u32 {
        self.frame_id
    }

    /// Number of frames between the first and the latest association.
    pub fn age(&self) -> u32 {
        self.frame_id - self.start_frame
    }

    /// Start a new tracklet under `track_id`. Only tracks born on the first
    /// frame are confirmed immediately.
    pub fn activate(&mut self, kalman_filter: &KalmanFilter, frame_id: u32, track_id: u64) {
        self.track_id = track_id;
        self.kalman = Some(kalman_filter.initiate(self.detection_tlwh.to_xyah()));
        self.tracklet_len = 0;
        self.state = TrackState::Tracked;
        self.is_activated = frame_id == 1;
        self.frame_id = frame_id;
        self.start_frame = frame_id;
    }

    /// Bring a lost track back with a new detection, keeping its identity.
    pub fn re_activate(
        &mut self,
        detection: &STrack,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
    ) -> Result<(), TrackerError> {
        self.correct(detection, kalman_filter)?;
        self.tracklet_len = 0;
        self.state = TrackState::Tracked;
        self.is_activated = true;
        self.frame_id = frame_id;
        self.score = detection.score;
        Ok(())
    }

    pub fn update(
        &mut self,
        detection: &STrack,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
    ) -> Result<(), TrackerError> {
        self.frame_id = frame_id;
        self.tracklet_len += 1;
        self.correct(detection, kalman_filter)?;
        self.state = TrackState::Tracked;
        self.is_activated = true;
        self.score = detection.score;
        Ok(())
    }

    fn correct(&mut self, detection: &STrack, kalman_filter: &KalmanFilter) -> Result<(), TrackerError> {
        if let Some((mean, cov)) = &self.kalman {
            let corrected = kalman_filter
                .update(mean, cov, detection.detection_tlwh.to_xyah())
                .ok_or(TrackerError::SingularCovariance {
                    track_id: self.track_id,
                })?;
            self.kalman = Some(corrected);
        }
        Ok(())
    }

    /// Advance the motion model one frame. Height velocity is frozen while the
    /// track is not being observed.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        if let Some((mean, cov)) = &self.kalman {
            let mut mean = mean.clone();
            if self.state != TrackState::Tracked {
                mean[7] = 0.0;
            }
            self.kalman = Some(kalman_filter.predict(&mean, cov));
        }
    }

    pub fn multi_predict(stracks: &mut [STrack], kalman_filter: &KalmanFilter) {
        for strack in stracks.iter_mut() {
            strack.predict(kalman_filter);
        }
    }

    pub fn mark_lost(&mut self) {
        self.state = TrackState::Lost;
    }

    pub fn mark_removed(&mut self) {
        self.state = TrackState::Removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_on_first_frame_confirms() {
        let kf = KalmanFilter::new();
        let mut first = STrack::new(Rect::new(10.0, 10.0, 50.0, 100.0), 0.9);
        first.activate(&kf, 1, 1);
        assert!(first.is_activated);
        assert_eq!(first.state, TrackState::Tracked);

        let mut later = STrack::new(Rect::new(10.0, 10.0, 50.0, 100.0), 0.9);
        later.activate(&kf, 4, 2);
        assert!(!later.is_activated);
        assert_eq!(later.start_frame, 4);
    }

    #[test]
    fn test_tlwh_follows_kalman_estimate() {
        let kf = KalmanFilter::new();
        let mut track = STrack::new(Rect::new(10.0, 10.0, 50.0, 100.0), 0.9);
        track.activate(&kf, 1, 1);
        let tlwh = track.tlwh();
        assert!((tlwh.x - 10.0).abs() < 1e-3);
        assert!((tlwh.height - 100.0).abs() < 1e-3);

        let detection = STrack::new(Rect::new(14.0, 10.0, 50.0, 100.0), 0.8);
        track.update(&detection, &kf, 2).unwrap();
        assert!(track.tlwh().x > 10.0);
        assert_eq!(track.tracklet_len, 1);
        assert_eq!(track.score, 0.8);
    }
}
