//! Frame numbering for a sequence.

use std::iter::FusedIterator;

/// Frame numbers `1..=seq_length`, one per call.
///
/// The length comes from the sequence metadata alone, so leading or trailing
/// frames without detections are still visited. [`FrameIterator::restart`]
/// rewinds to frame 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIterator {
    next: u64,
    seq_length: u32,
}

impl FrameIterator {
    pub fn new(seq_length: u32) -> Self {
        Self {
            next: 1,
            seq_length,
        }
    }

    pub fn restart(&mut self) {
        self.next = 1;
    }

    pub fn seq_length(&self) -> u32 {
        self.seq_length
    }
}

impl Iterator for FrameIterator {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.next > u64::from(self.seq_length) {
            return None;
        }
        let frame = self.next as u32;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (u64::from(self.seq_length) + 1 - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIterator {}

impl FusedIterator for FrameIterator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_each_frame_once_in_order() {
        for n in [1_u32, 2, 7, 429] {
            let frames: Vec<u32> = FrameIterator::new(n).collect();
            assert_eq!(frames, (1..=n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(FrameIterator::new(0).next(), None);
    }

    #[test]
    fn test_exact_size_and_fused() {
        let mut frames = FrameIterator::new(3);
        assert_eq!(frames.len(), 3);
        frames.next();
        assert_eq!(frames.len(), 2);
        frames.by_ref().for_each(drop);
        assert_eq!(frames.next(), None);
        assert_eq!(frames.next(), None);
        assert_eq!(frames.len(), 0);
    }

    #[test]
    fn test_restart() {
        let mut frames = FrameIterator::new(2);
        assert_eq!(frames.by_ref().count(), 2);
        frames.restart();
        assert_eq!(frames.collect::<Vec<_>>(), vec![1, 2]);
    }
}
