/// One-dimensional constant-state Kalman filter.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarKalmanFilter {
    estimate: f64,
    error_covariance: f64,
    process_noise: f64,
    measurement_noise: f64,
}

impl ScalarKalmanFilter {
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            estimate: 0.0,
            error_covariance: 1.0,
            process_noise,
            measurement_noise,
        }
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn error_covariance(&self) -> f64 {
        self.error_covariance
    }

    /// Predict then update with `measurement`, returning the new estimate.
    pub fn step(&mut self, measurement: f64) -> f64 {
        let predicted = self.error_covariance + self.process_noise;
        let gain = predicted / (predicted + self.measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.error_covariance = (1.0 - gain) * predicted;
        self.estimate
    }
}

impl Default for ScalarKalmanFilter {
    fn default() -> Self {
        Self::new(1e-4, 0.1)
    }
}
