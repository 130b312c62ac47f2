//! Interface to the stateful multi-object tracker driven by the pipeline.

use ndarray::ArrayView2;

use crate::tracker::Rect;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

/// A tracker's belief about one object at the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable within a run, assigned in increasing order by the tracker
    pub track_id: u64,
    pub tlwh: Rect,
    pub score: f64,
}

/// Trait for trackers consuming one frame of detections at a time.
///
/// Implementations keep state across calls, so frames must be fed exactly
/// once each and in increasing order.
///
/// # Example
///
/// ```ignore
/// use bytetrack_eval::{ImageSize, OnlineTracker, Track};
/// use ndarray::ArrayView2;
///
/// struct Passthrough;
///
/// impl OnlineTracker for Passthrough {
///     type Error = std::convert::Infallible;
///
///     fn update(
///         &mut self,
///         detections: ArrayView2<'_, f64>,
///         _img_info: ImageSize,
///         _img_size: ImageSize,
///     ) -> Result<Vec<Track>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait OnlineTracker {
    /// Error type for update failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Advance the tracker by one frame.
    ///
    /// # Arguments
    /// * `detections` - `N x 5` rows of (x1, y1, x2, y2, score)
    /// * `img_info` - Original image size, the space tracks are reported in
    /// * `img_size` - Size of the image the detections were produced on
    ///
    /// # Returns
    /// The currently active tracks, in the tracker's own order.
    fn update(
        &mut self,
        detections: ArrayView2<'_, f64>,
        img_info: ImageSize,
        img_size: ImageSize,
    ) -> Result<Vec<Track>, Self::Error>;
}

impl<T: OnlineTracker + ?Sized> OnlineTracker for &mut T {
    type Error = T::Error;

    fn update(
        &mut self,
        detections: ArrayView2<'_, f64>,
        img_info: ImageSize,
        img_size: ImageSize,
    ) -> Result<Vec<Track>, Self::Error> {
        (**self).update(detections, img_info, img_size)
    }
}
