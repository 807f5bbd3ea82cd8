//! Constant-velocity Kalman filter over `(cx, cy, aspect, h)` box measurements.
//!
//! Used only to predict where a track's box will be in the next frame so
//! association can follow fast movers; emitted boxes are never smoothed.

use nalgebra::{SMatrix, SVector};

pub type StateVector = SVector<f64, 8>;
pub type StateCovariance = SMatrix<f64, 8, 8>;
type Measurement = SVector<f64, 4>;
type MeasurementCovariance = SMatrix<f64, 4, 4>;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: StateCovariance,
    update_mat: SMatrix<f64, 4, 8>,
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
        let mut motion_mat = StateCovariance::identity();
        let mut update_mat = SMatrix::<f64, 4, 8>::zeros();
        for i in 0..4 {
            motion_mat[(i, 4 + i)] = 1.0;
            update_mat[(i, i)] = 1.0;
        }
        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Start a track at `xyah` with zero velocity.
    pub fn initiate(&self, xyah: [f32; 4]) -> (StateVector, StateCovariance) {
        let mut mean = StateVector::zeros();
        for (i, v) in xyah.iter().enumerate() {
            mean[i] = *v as f64;
        }

        let h = mean[3];
        let pos = 2.0 * self.std_weight_position * h;
        let vel = 10.0 * self.std_weight_velocity * h;
        let std = [pos, pos, 1e-2, pos, vel, vel, 1e-5, vel];

        (mean, diagonal_squared(&std))
    }

    pub fn predict(&self, mean: &StateVector, covariance: &StateCovariance) -> (StateVector, StateCovariance) {
        let h = mean[3];
        let pos = self.std_weight_position * h;
        let vel = self.std_weight_velocity * h;
        let motion_cov = diagonal_squared(&[pos, pos, 1e-2, pos, vel, vel, 1e-5, vel]);

        let new_mean = self.motion_mat * mean;
        let new_covariance = self.motion_mat * covariance * self.motion_mat.transpose() + motion_cov;
        (new_mean, new_covariance)
    }

    fn project(&self, mean: &StateVector, covariance: &StateCovariance) -> (Measurement, MeasurementCovariance) {
        let h = mean[3];
        let pos = self.std_weight_position * h;
        let innovation_cov = MeasurementCovariance::from_diagonal(&Measurement::new(
            pos * pos,
            pos * pos,
            1e-1 * 1e-1,
            pos * pos,
        ));

        let projected_mean = self.update_mat * mean;
        let projected_cov = self.update_mat * covariance * self.update_mat.transpose() + innovation_cov;
        (projected_mean, projected_cov)
    }

    /// Correct the state with a measured box.
    ///
    /// A singular innovation covariance (degenerate zero-height boxes) resets
    /// the state to the measurement instead of correcting it.
    pub fn update(
        &self,
        mean: &StateVector,
        covariance: &StateCovariance,
        xyah: [f32; 4],
    ) -> (StateVector, StateCovariance) {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let Some(s_inv) = projected_cov.try_inverse() else {
            return self.initiate(xyah);
        };

        let measurement = Measurement::from_iterator(xyah.iter().map(|v| *v as f64));
        let innovation = measurement - projected_mean;

        let kalman_gain = covariance * self.update_mat.transpose() * s_inv;
        let new_mean = mean + kalman_gain * innovation;
        let new_covariance = covariance - kalman_gain * projected_cov * kalman_gain.transpose();
        (new_mean, new_covariance)
    }
}

fn diagonal_squared(std: &[f64; 8]) -> StateCovariance {
    StateCovariance::from_diagonal(&StateVector::from_iterator(std.iter().map(|s| s * s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 200.0, 0.5, 50.0]);
        assert_eq!(mean[0], 100.0);
        assert_eq!(mean[4], 0.0);
        assert!(cov[(0, 0)] > 0.0);
    }

    #[test]
    fn test_learns_velocity() {
        let kf = KalmanFilter::new();
        let (mut mean, mut cov) = kf.initiate([100.0, 100.0, 1.0, 50.0]);
        for step in 1..=10 {
            let (m, c) = kf.predict(&mean, &cov);
            let (m, c) = kf.update(&m, &c, [100.0, 100.0 + 10.0 * step as f32, 1.0, 50.0]);
            mean = m;
            cov = c;
        }
        // Moving 10 px/frame downwards.
        assert!((mean[5] - 10.0).abs() < 2.0);
        let (predicted, _) = kf.predict(&mean, &cov);
        assert!((predicted[1] - 210.0).abs() < 3.0);
    }
}
