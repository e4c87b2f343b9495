use crate::error::TrackError;
use crate::geometry::Point;
use crate::object::Detection;
use crate::rect::Rect;
use crate::track::{delegate_track_accessors, Track, TrackCore, TrackOptions};
use nalgebra::SMatrix;
use uuid::Uuid;

/* ----------------------------------------------------------------------------
 * Type aliases
 * ---------------------------------------------------------------------------- */
// 4x1: [x, y, vx, vy]
type State = SMatrix<f32, 4, 1>;
// 4x4
type StateCov = SMatrix<f32, 4, 4>;
// 2x1: [x, y]
type Measurement = SMatrix<f32, 2, 1>;
// 2x4
type MeasureMat = SMatrix<f32, 2, 4>;
// 2x2
type MeasureCov = SMatrix<f32, 2, 2>;

/* ----------------------------------------------------------------------------
 * Point filter
 * ---------------------------------------------------------------------------- */

/// Constant-velocity linear Kalman filter over state [x, y, vx, vy],
/// observing [x, y] on every update. The time step is fixed at construction.
#[derive(Debug, Clone)]
pub(crate) struct PointFilter {
    motion_mat: StateCov,
    update_mat: MeasureMat,
    process_noise: StateCov,
    measurement_noise: MeasureCov,
    x: State,
    covariance: StateCov,
}

impl PointFilter {
    pub(crate) fn new(x: f32, y: f32, dt: f32) -> Self {
        let mut motion_mat = StateCov::identity();
        motion_mat[(0, 2)] = dt;
        motion_mat[(1, 3)] = dt;

        let mut update_mat = MeasureMat::zeros();
        update_mat[(0, 0)] = 1.0;
        update_mat[(1, 1)] = 1.0;

        let mut process_noise = StateCov::identity();
        for i in 2..4 {
            process_noise[(i, i)] *= 0.01;
        }

        let measurement_noise = MeasureCov::identity();

        let mut state = State::zeros();
        state[(0, 0)] = x;
        state[(1, 0)] = y;

        // Position is observed at creation, velocity is not.
        let mut covariance = StateCov::identity();
        for i in 2..4 {
            covariance[(i, i)] *= 1000.0;
        }
        covariance *= 10.0;

        Self {
            motion_mat,
            update_mat,
            process_noise,
            measurement_noise,
            x: state,
            covariance,
        }
    }

    /// One predict-correct cycle with the new observation. Returns the
    /// corrected position estimate.
    ///
    /// On a numerical failure the filter state is left at the predicted
    /// prior, and the caller must treat the frame as a miss for this track.
    pub(crate) fn process(&mut self, zx: f32, zy: f32) -> Result<(f32, f32), TrackError> {
        self.predict();
        self.correct(zx, zy)?;
        Ok((self.x[(0, 0)], self.x[(1, 0)]))
    }

    fn predict(&mut self) {
        self.x = self.motion_mat * self.x;
        self.covariance = self.motion_mat * self.covariance * self.motion_mat.transpose()
            + self.process_noise;
    }

    fn correct(&mut self, zx: f32, zy: f32) -> Result<(), TrackError> {
        let measurement = Measurement::new(zx, zy);
        let innovation_cov = self.update_mat * self.covariance * self.update_mat.transpose()
            + self.measurement_noise;
        let cholesky_factor = innovation_cov
            .cholesky()
            .ok_or(TrackError::FilterNotPositiveDefinite)?;
        // kalman_gain: 4x2
        let kalman_gain = cholesky_factor
            .solve(&(self.update_mat * self.covariance))
            .transpose();
        let innovation = measurement - self.update_mat * self.x;
        self.x += kalman_gain * innovation;
        // Joseph form covariance update
        let i_minus_kh = StateCov::identity() - kalman_gain * self.update_mat;
        self.covariance = i_minus_kh * self.covariance * i_minus_kh.transpose()
            + kalman_gain * self.measurement_noise * kalman_gain.transpose();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &State {
        &self.x
    }
}

/* ----------------------------------------------------------------------------
 * KalmanTrack
 * ---------------------------------------------------------------------------- */

/// Track implementation whose centroid history is smoothed by a linear
/// Kalman filter.
///
/// Prediction and correction are decoupled: every matched update runs the
/// filter and stores the corrected position as the track center, while
/// `predict_next_position` applies the same weighted extrapolation as
/// `LinearTrack` to the filtered history. The bounding box keeps the raw
/// detection's size and is re-centered on the filtered position.
#[derive(Debug, Clone)]
pub struct KalmanTrack {
    core: TrackCore,
    filter: PointFilter,
}

impl Track for KalmanTrack {
    fn from_detection(detection: &Detection, options: &TrackOptions) -> Self {
        let center = detection.center();
        Self {
            core: TrackCore::from_detection(detection, options),
            filter: PointFilter::new(center.x, center.y, options.time_delta_seconds),
        }
    }

    fn update(&mut self, detection: &Detection) -> Result<(), TrackError> {
        let raw = detection.center();
        let (filtered_x, filtered_y) = self.filter.process(raw.x, raw.y)?;

        // Shift the raw rectangle by the filtered-minus-raw difference so the
        // box size tracks the detection while its position is smoothed.
        let diff_x = filtered_x - raw.x;
        let diff_y = filtered_y - raw.y;
        let rect = detection.rect();
        self.core.rect = Rect::new(
            rect.x() + diff_x,
            rect.y() + diff_y,
            rect.width(),
            rect.height(),
        );
        self.core.center = Point::new(filtered_x, filtered_y);
        self.core.apply_match(detection);
        let center = self.core.center;
        self.core.push_point(center, detection.time());
        Ok(())
    }

    delegate_track_accessors!();
}
