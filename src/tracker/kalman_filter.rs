//! Constant-velocity Kalman filter over (cx, cy, aspect, h) and their velocities.
//!
//! State is kept in `ndarray`; the only inversion (4x4 innovation covariance)
//! goes through `nalgebra` so no BLAS/LAPACK is needed.

use ndarray::{Array1, Array2};

const NDIM: usize = 4;

pub type Mean = Array1<f64>;
pub type Covariance = Array2<f64>;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(2 * NDIM);
        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = 1.0;
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Start a track from an unassociated XYAH measurement. Velocities are 0.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Mean, Covariance) {
        let mut mean = Array1::zeros(2 * NDIM);
        for (i, &m) in measurement.iter().enumerate() {
            mean[i] = m;
        }

        let h = measurement[3];
        let pos = 2.0 * self.std_weight_position * h;
        let vel = 10.0 * self.std_weight_velocity * h;
        let cov = diagonal_squared(&[pos, pos, 1e-2, pos, vel, vel, 1e-5, vel]);

        (mean, cov)
    }

    pub fn predict(&self, mean: &Mean, covariance: &Covariance) -> (Mean, Covariance) {
        let h = mean[3];
        let pos = self.std_weight_position * h;
        let vel = self.std_weight_velocity * h;
        let motion_cov = diagonal_squared(&[pos, pos, 1e-2, pos, vel, vel, 1e-5, vel]);

        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space.
    pub fn project(&self, mean: &Mean, covariance: &Covariance) -> (Mean, Covariance) {
        let h = mean[3];
        let pos = self.std_weight_position * h;
        let innovation_cov = diagonal_squared(&[pos, pos, 1e-1, pos]);

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Correct the state with a new measurement. Returns `None` when the
    /// projected covariance cannot be inverted.
    pub fn update(
        &self,
        mean: &Mean,
        covariance: &Covariance,
        measurement: [f64; 4],
    ) -> Option<(Mean, Covariance)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let innovation = Array1::from_vec(measurement.to_vec()) - projected_mean;

        // K = P * H^T * S^-1, with H = [I 0]
        let s_inv = invert_4x4(&projected_cov)?;
        let kalman_gain = covariance.dot(&self.update_mat.t()).dot(&s_inv);

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Some((new_mean, new_covariance))
    }
}

fn diagonal_squared(std: &[f64]) -> Array2<f64> {
    Array2::from_diag(&Array1::from_iter(std.iter().map(|s| s * s)))
}

fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix4::from_fn(|i, j| m[[i, j]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((NDIM, NDIM), |(i, j)| inv[(i, j)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate_sets_position_and_zero_velocity() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 200.0, 0.5, 50.0]);
        assert_eq!(mean.to_vec(), vec![100.0, 200.0, 0.5, 50.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(cov.dim(), (8, 8));
        assert!((cov[[0, 0]] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_pulls_mean_toward_measurement() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 100.0, 0.5, 100.0]);
        let (mean, cov) = kf.predict(&mean, &cov);
        let (updated, _) = kf.update(&mean, &cov, [110.0, 100.0, 0.5, 100.0]).unwrap();
        assert!(updated[0] > 100.0 && updated[0] < 110.0);
        assert!(updated[4] > 0.0);
    }

    #[test]
    fn test_singular_projection_is_reported() {
        let kf = KalmanFilter::new();
        // zero height with zero covariance leaves only the aspect term
        let mean = Array1::zeros(8);
        let cov = Array2::zeros((8, 8));
        assert!(kf.update(&mean, &cov, [0.0, 0.0, 0.0, 0.0]).is_none());
    }
}
