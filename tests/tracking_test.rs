use bytetrack_eval::tracker::Detection;
use bytetrack_eval::{BYTETracker, ImageSize, OnlineTracker, TrackerConfig};
use ndarray::array;

#[test]
fn test_basic_tracking() {
    let mut tracker = BYTETracker::new(TrackerConfig::default(), 30.0);

    // Frame 1: one detection, confirmed immediately on the first frame
    let tracks1 = tracker
        .update_detections(vec![Detection::new(100.0, 100.0, 200.0, 200.0, 0.9)])
        .unwrap();
    assert_eq!(tracks1.len(), 1);
    let id1 = tracks1[0].track_id;
    assert_eq!(id1, 1);

    // Frame 2: same object moved slightly
    let tracks2 = tracker
        .update_detections(vec![Detection::new(105.0, 105.0, 205.0, 205.0, 0.9)])
        .unwrap();
    assert_eq!(tracks2.len(), 1);
    assert_eq!(tracks2[0].track_id, id1);

    // Frame 3: occluded, low score; recovered by the second association
    let tracks3 = tracker
        .update_detections(vec![Detection::new(110.0, 110.0, 210.0, 210.0, 0.2)])
        .unwrap();
    assert_eq!(tracks3.len(), 1);
    assert_eq!(tracks3[0].track_id, id1);

    // Frame 4: object disappears
    let tracks4 = tracker.update_detections(vec![]).unwrap();
    assert!(tracks4.is_empty());
    assert_eq!(tracker.lost_stracks().len(), 1);

    // Frame 5: object reappears within the track buffer
    let tracks5 = tracker
        .update_detections(vec![Detection::new(115.0, 115.0, 215.0, 215.0, 0.9)])
        .unwrap();
    assert_eq!(tracks5.len(), 1);
    assert_eq!(tracks5[0].track_id, id1);
    assert!(tracker.lost_stracks().is_empty());
}

/// Second frame of a shifted object: IoU with the first box is 46/154, so the
/// raw cost is about 0.70 while the score-fused cost is about 0.84.
fn shifted_object_tracks(mot20: bool) -> (Vec<u64>, Vec<u64>) {
    let config = TrackerConfig {
        mot20,
        ..TrackerConfig::default()
    };
    let mut tracker = BYTETracker::new(config, 25.0);
    let image = ImageSize::new(1080, 1920);

    let first = tracker
        .update(array![[0.0_f64, 0.0, 100.0, 100.0, 0.9]].view(), image, image)
        .unwrap();
    let second = tracker
        .update(array![[54.0_f64, 0.0, 154.0, 100.0, 0.55]].view(), image, image)
        .unwrap();

    (
        first.iter().map(|t| t.track_id).collect(),
        second.iter().map(|t| t.track_id).collect(),
    )
}

#[test]
fn test_mot20_matches_on_raw_iou() {
    let (first, second) = shifted_object_tracks(true);
    assert_eq!(first, vec![1]);
    assert_eq!(second, vec![1]);
}

#[test]
fn test_default_fuses_score_into_cost() {
    // fused cost misses the 0.8 gate and 0.55 is too weak to start a track
    let (first, second) = shifted_object_tracks(false);
    assert_eq!(first, vec![1]);
    assert!(second.is_empty());
}

#[test]
fn test_separate_objects_get_increasing_ids() {
    let mut tracker = BYTETracker::new(TrackerConfig::default(), 30.0);
    let image = ImageSize::new(1080, 1920);
    let dets = array![
        [10.0_f64, 10.0, 60.0, 110.0, 0.9],
        [400.0, 10.0, 450.0, 110.0, 0.8],
        [800.0, 10.0, 850.0, 110.0, 0.3],
    ];

    let tracks = tracker.update(dets.view(), image, image).unwrap();
    // the 0.3 detection is below the birth threshold
    let ids: Vec<u64> = tracks.iter().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![1, 2]);
}
