use crate::error::TrackError;
use crate::geometry::Point;
use crate::object::Detection;
use crate::rect::Rect;
use crate::track::{delegate_track_accessors, Track, TrackCore, TrackOptions};
use uuid::Uuid;

/* ----------------------------------------------------------------------------
 * LinearTrack
 * ---------------------------------------------------------------------------- */

/// Simplest track implementation: the history holds raw detection centroids
/// and the next position comes from the weighted linear extrapolation alone.
#[derive(Debug, Clone)]
pub struct LinearTrack {
    core: TrackCore,
}

impl Track for LinearTrack {
    fn from_detection(detection: &Detection, options: &TrackOptions) -> Self {
        Self {
            core: TrackCore::from_detection(detection, options),
        }
    }

    fn update(&mut self, detection: &Detection) -> Result<(), TrackError> {
        self.core.rect = detection.rect().clone();
        self.core.center = detection.center();
        self.core.apply_match(detection);
        self.core.push_point(detection.center(), detection.time());
        Ok(())
    }

    delegate_track_accessors!();
}
