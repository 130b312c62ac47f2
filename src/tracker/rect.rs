use ndarray::Array2;

/// Axis-aligned box stored as TLWH (top-left x, top-left y, width, height).
///
/// Conversions cover the three layouts ByteTrack moves between:
/// - TLWH: tracker output and the MOTChallenge results file
/// - TLBR: tracker input (x1, y1, x2, y2)
/// - XYAH: Kalman measurement space (center x, center y, w/h, height)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn from_tlbr(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    #[inline]
    pub fn from_xyah(cx: f64, cy: f64, aspect_ratio: f64, height: f64) -> Self {
        let width = aspect_ratio * height;
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn to_tlbr(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    #[inline]
    pub fn to_tlwh(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Measurement vector for the Kalman filter. A box with no height maps to
    /// aspect ratio 0.
    pub fn to_xyah(&self) -> [f64; 4] {
        let aspect_ratio = if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        };
        [
            self.x + self.width / 2.0,
            self.y + self.height / 2.0,
            aspect_ratio,
            self.height,
        ]
    }

    /// Width over height, `None` when the ratio is undefined or not finite.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height <= 0.0 {
            return None;
        }
        let ratio = self.width / self.height;
        ratio.is_finite().then_some(ratio)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Divide every coordinate by `scale`, mapping network-input pixels back to
    /// original image pixels.
    #[inline]
    pub fn unscaled(&self, scale: f64) -> Self {
        Self::new(
            self.x / scale,
            self.y / scale,
            self.width / scale,
            self.height / scale,
        )
    }

    pub fn iou(&self, other: &Rect) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_area = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

/// IoU matrix of shape (M, N) between `boxes_a` and `boxes_b`.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f64> {
    Array2::from_shape_fn((boxes_a.len(), boxes_b.len()), |(i, j)| {
        boxes_a[i].iou(&boxes_b[j])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlbr_roundtrip_keeps_tlwh() {
        let rect = Rect::from_tlbr(10.0, 10.0, 60.0, 110.0);
        assert_eq!(rect.to_tlwh(), [10.0, 10.0, 50.0, 100.0]);
        assert_eq!(rect.to_tlbr(), [10.0, 10.0, 60.0, 110.0]);
    }

    #[test]
    fn test_xyah() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let xyah = rect.to_xyah();
        assert_eq!(xyah[0], 25.0);
        assert_eq!(xyah[1], 40.0);
        assert!((xyah[2] - 0.75).abs() < 1e-6);
        assert_eq!(xyah[3], 40.0);

        let back = Rect::from_xyah(25.0, 40.0, 0.75, 40.0);
        assert!((back.x - 10.0).abs() < 1e-5);
        assert!((back.y - 20.0).abs() < 1e-5);
        assert!((back.width - 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_aspect_ratio_undefined_for_flat_boxes() {
        assert_eq!(Rect::new(0.0, 0.0, 100.0, 10.0).aspect_ratio(), Some(10.0));
        assert_eq!(Rect::new(0.0, 0.0, 5.0, 0.0).aspect_ratio(), None);
        assert_eq!(Rect::new(0.0, 0.0, 5.0, -2.0).aspect_ratio(), None);
    }

    #[test]
    fn test_unscaled() {
        let rect = Rect::new(20.0, 40.0, 60.0, 80.0).unscaled(2.0);
        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        // 25 / (100 + 100 - 25)
        assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-6);
        assert_eq!(a.iou(&Rect::new(20.0, 20.0, 10.0, 10.0)), 0.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [Rect::new(0.0, 0.0, 10.0, 10.0)];
        let b = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 50.0, 1.0, 1.0)];
        let ious = iou_batch(&a, &b);
        assert_eq!(ious.dim(), (1, 2));
        assert_eq!(ious[[0, 1]], 0.0);
    }
}
