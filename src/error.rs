use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TrackError {
    #[error("invalid detection: width {width} and height {height} must both be positive")]
    InvalidDetection { width: f32, height: f32 },
    #[error("kalman innovation covariance is not positive definite")]
    FilterNotPositiveDefinite,
}
