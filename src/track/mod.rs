//! Track entities and the polymorphic tracking capability.
//!
//! A track is a persistent record of one physical object observed across
//! frames. Two interchangeable implementations are provided: `LinearTrack`
//! (raw centroid history with weighted extrapolation) and `KalmanTrack`
//! (the same extrapolation over Kalman-smoothed centroids). The registry is
//! generic over the `Track` trait, so the predictor strategy is fixed at
//! tracker construction and mismatched updates are impossible by type.

mod kalman;
mod linear;

pub use kalman::KalmanTrack;
pub use linear::LinearTrack;

use crate::error::TrackError;
use crate::geometry::{distance_between_points, segments_intersect, Point};
use crate::object::Detection;
use crate::rect::Rect;
use std::time::SystemTime;
use uuid::Uuid;

/* ----------------------------------------------------------------------------
 * Track options
 * ---------------------------------------------------------------------------- */

/// Per-track configuration, owned by the registry and applied at creation.
#[derive(Debug, Clone)]
pub struct TrackOptions {
    /// Bound on the centroid history length (sliding window, oldest evicted).
    pub max_points_in_track: usize,
    /// Fixed time step of the Kalman motion model. Ignored by `LinearTrack`.
    pub time_delta_seconds: f32,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            max_points_in_track: 10,
            time_delta_seconds: 1.0,
        }
    }
}

/* ----------------------------------------------------------------------------
 * Track trait
 * ---------------------------------------------------------------------------- */

/// Capability set shared by all track implementations: creation, per-frame
/// prediction, matched update, lifecycle accessors and the line-crossing
/// tests. The association engine and the registry only speak this trait.
pub trait Track {
    /// Create a track from an unmatched detection. The history is seeded with
    /// the detection centroid, so it is never empty for a live track.
    fn from_detection(detection: &Detection, options: &TrackOptions) -> Self;

    /// Fold a matched detection into the track: replace the current geometry,
    /// append the new centroid to the history (trimming the oldest entry past
    /// the bound) and clear the miss counter.
    ///
    /// A returned error means the track state was left untouched and the
    /// frame counts as a miss for this track.
    fn update(&mut self, detection: &Detection) -> Result<(), TrackError>;

    /// Recompute the predicted next position from up to `window` most recent
    /// history points. Must run every frame before association.
    fn predict_next_position(&mut self, window: usize);

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn rect(&self) -> &Rect<f32>;
    fn center(&self) -> Point;
    fn predicted_next_position(&self) -> Point;
    fn history(&self) -> &[Point];
    fn timestamps(&self) -> &[SystemTime];
    fn area(&self) -> f32;
    fn diagonal(&self) -> f32;
    fn aspect_ratio(&self) -> f32;
    fn class_id(&self) -> i32;
    fn class_name(&self) -> &str;

    fn seen_this_frame(&self) -> bool;
    fn set_seen_this_frame(&mut self, seen: bool);
    fn is_tracked(&self) -> bool;
    fn set_tracked(&mut self, tracked: bool);
    fn no_match_times(&self) -> usize;
    fn increment_no_match_times(&mut self);

    /// One-shot crossing latch state.
    fn crossed_line(&self) -> bool;
    fn set_crossed_line(&mut self);

    /// Check if the track crossed the HORIZONTAL line `y = line_y` bounded by
    /// `x` in `[left_x, right_x]`.
    ///
    /// `direction == true` counts crossings of increasing Y ("to us"),
    /// `false` counts the opposite direction. Returns true at most once per
    /// track: the latch is set on the first positive result.
    fn is_crossed_line(
        &mut self,
        line_y: f32,
        left_x: f32,
        right_x: f32,
        direction: bool,
    ) -> bool {
        self.is_crossed_line_with_shift(line_y, left_x, right_x, direction, 0.0)
    }

    /// Same as `is_crossed_line`, with both history points offset by `shift`
    /// along Y before the comparison. Used as an early trigger when the
    /// counting line sits close to the frame edge.
    fn is_crossed_line_with_shift(
        &mut self,
        line_y: f32,
        left_x: f32,
        right_x: f32,
        direction: bool,
        shift: f32,
    ) -> bool {
        let (prev, curr) = {
            let track = self.history();
            if !self.is_tracked() || track.len() < 2 || self.crossed_line() {
                return false;
            }
            (track[track.len() - 2], track[track.len() - 1])
        };
        if curr.x < left_x || curr.x > right_x {
            return false;
        }
        let crossed = if direction {
            prev.y + shift <= line_y && curr.y + shift > line_y
        } else {
            prev.y + shift > line_y && curr.y + shift <= line_y
        };
        if crossed {
            self.set_crossed_line();
        }
        crossed
    }

    /// Check if the track crossed the OBLIQUE line segment `left`-`right`.
    ///
    /// Uses the segment-intersection test between the last motion segment and
    /// the line; the direction is taken from the sign of the Y motion, not
    /// from the line orientation. Latched the same way as `is_crossed_line`.
    fn is_crossed_oblique_line(&mut self, left: Point, right: Point, direction: bool) -> bool {
        self.is_crossed_oblique_line_with_shift(left, right, direction, 0.0)
    }

    /// Same as `is_crossed_oblique_line`, with the motion segment offset by
    /// `shift` along Y before the intersection test.
    fn is_crossed_oblique_line_with_shift(
        &mut self,
        left: Point,
        right: Point,
        direction: bool,
        shift: f32,
    ) -> bool {
        let (prev, curr) = {
            let track = self.history();
            if !self.is_tracked() || track.len() < 2 || self.crossed_line() {
                return false;
            }
            (track[track.len() - 2], track[track.len() - 1])
        };
        let motion_start = Point::new(prev.x, prev.y + shift);
        let motion_end = Point::new(curr.x, curr.y + shift);
        if !segments_intersect(motion_start, motion_end, left, right) {
            return false;
        }
        let crossed = if direction {
            curr.y > prev.y
        } else {
            curr.y <= prev.y
        };
        if crossed {
            self.set_crossed_line();
        }
        crossed
    }

    /// Distance from a detection to this track under the association metric:
    /// the smaller of the distances to the current center and to the
    /// predicted next position, covering both slow and fast motion.
    fn distance_to(&self, detection: &Detection) -> f32 {
        let to_center = distance_between_points(detection.center(), self.center());
        let to_predicted =
            distance_between_points(detection.center(), self.predicted_next_position());
        to_center.min(to_predicted)
    }
}

/* ----------------------------------------------------------------------------
 * Shared track state
 * ---------------------------------------------------------------------------- */

/// State common to every track implementation. Variants embed this and
/// delegate the trait accessors to it.
#[derive(Debug, Clone)]
pub(crate) struct TrackCore {
    pub(crate) id: Uuid,
    pub(crate) rect: Rect<f32>,
    pub(crate) center: Point,
    pub(crate) area: f32,
    pub(crate) diagonal: f32,
    pub(crate) aspect_ratio: f32,
    pub(crate) history: Vec<Point>,
    pub(crate) timestamps: Vec<SystemTime>,
    pub(crate) max_points_in_track: usize,
    pub(crate) predicted_next_position: Point,
    pub(crate) seen_this_frame: bool,
    pub(crate) is_tracked: bool,
    pub(crate) no_match_times: usize,
    pub(crate) crossed_line: bool,
    pub(crate) class_id: i32,
    pub(crate) class_name: String,
}

impl TrackCore {
    pub(crate) fn from_detection(detection: &Detection, options: &TrackOptions) -> Self {
        let center = detection.center();
        Self {
            id: Uuid::nil(),
            rect: detection.rect().clone(),
            center,
            area: detection.area(),
            diagonal: detection.diagonal(),
            aspect_ratio: detection.aspect_ratio(),
            history: vec![center],
            timestamps: vec![detection.time()],
            max_points_in_track: options.max_points_in_track.max(1),
            predicted_next_position: center,
            seen_this_frame: true,
            is_tracked: true,
            no_match_times: 0,
            crossed_line: false,
            class_id: detection.class_id(),
            class_name: detection.class_name().to_owned(),
        }
    }

    /// Append a centroid, keeping the history a FIFO window of at most
    /// `max_points_in_track` entries.
    pub(crate) fn push_point(&mut self, point: Point, time: SystemTime) {
        self.history.push(point);
        self.timestamps.push(time);
        if self.history.len() > self.max_points_in_track {
            self.history.remove(0);
            self.timestamps.remove(0);
        }
    }

    /// Triangular-weighted extrapolation over the most recent history points.
    ///
    /// With `account = min(window, history_len)` points, the `account - 1`
    /// successive deltas are averaged with descending weights: the newest
    /// delta carries weight `account - 1`, the oldest usable delta weight 1.
    /// Recent motion dominates while single-frame noise is damped. Fewer than
    /// two points degenerate to "no movement".
    pub(crate) fn predict_next_position(&mut self, window: usize) {
        let n = self.history.len();
        let last = self.history[n - 1];
        let account = window.min(n);
        if account < 2 {
            self.predicted_next_position = last;
            return;
        }
        let mut delta_x = 0.0f32;
        let mut delta_y = 0.0f32;
        let mut weight_sum = 0.0f32;
        for lag in 1..account {
            let weight = (account - lag) as f32;
            let newer = self.history[n - lag];
            let older = self.history[n - lag - 1];
            delta_x += (newer.x - older.x) * weight;
            delta_y += (newer.y - older.y) * weight;
            weight_sum += weight;
        }
        self.predicted_next_position =
            Point::new(last.x + delta_x / weight_sum, last.y + delta_y / weight_sum);
    }

    /// Common part of a matched update: geometry scalars come straight from
    /// the detection, the lifecycle flags flip to "seen".
    pub(crate) fn apply_match(&mut self, detection: &Detection) {
        self.area = detection.area();
        self.diagonal = detection.diagonal();
        self.aspect_ratio = detection.aspect_ratio();
        self.seen_this_frame = true;
        self.is_tracked = true;
        self.no_match_times = 0;
    }
}

/// Delegates the boilerplate `Track` accessors to the embedded `TrackCore`.
macro_rules! delegate_track_accessors {
    () => {
        fn id(&self) -> Uuid {
            self.core.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.core.id = id;
        }

        fn rect(&self) -> &Rect<f32> {
            &self.core.rect
        }

        fn center(&self) -> Point {
            self.core.center
        }

        fn predicted_next_position(&self) -> Point {
            self.core.predicted_next_position
        }

        fn history(&self) -> &[Point] {
            &self.core.history
        }

        fn timestamps(&self) -> &[std::time::SystemTime] {
            &self.core.timestamps
        }

        fn area(&self) -> f32 {
            self.core.area
        }

        fn diagonal(&self) -> f32 {
            self.core.diagonal
        }

        fn aspect_ratio(&self) -> f32 {
            self.core.aspect_ratio
        }

        fn class_id(&self) -> i32 {
            self.core.class_id
        }

        fn class_name(&self) -> &str {
            &self.core.class_name
        }

        fn seen_this_frame(&self) -> bool {
            self.core.seen_this_frame
        }

        fn set_seen_this_frame(&mut self, seen: bool) {
            self.core.seen_this_frame = seen;
        }

        fn is_tracked(&self) -> bool {
            self.core.is_tracked
        }

        fn set_tracked(&mut self, tracked: bool) {
            self.core.is_tracked = tracked;
        }

        fn no_match_times(&self) -> usize {
            self.core.no_match_times
        }

        fn increment_no_match_times(&mut self) {
            self.core.no_match_times += 1;
        }

        fn crossed_line(&self) -> bool {
            self.core.crossed_line
        }

        fn set_crossed_line(&mut self) {
            self.core.crossed_line = true;
        }

        fn predict_next_position(&mut self, window: usize) {
            self.core.predict_next_position(window);
        }
    };
}

pub(crate) use delegate_track_accessors;
