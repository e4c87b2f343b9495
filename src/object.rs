use crate::error::TrackError;
use crate::geometry::Point;
use crate::rect::Rect;
use std::time::SystemTime;

/*------------------------------------------------------------------------------
Detection struct
------------------------------------------------------------------------------*/

/// One frame's raw bounding-box observation, not yet associated with a track.
///
/// Derived values (center, diagonal, aspect ratio) are computed once at
/// construction so the association loop reads them for free. Construction
/// rejects degenerate boxes, so every `Detection` the tracker sees is valid.
#[derive(Debug, Clone)]
pub struct Detection {
    rect: Rect<f32>,
    center: Point,
    area: f32,
    diagonal: f32,
    aspect_ratio: f32,
    class_id: i32,
    class_name: String,
    time: SystemTime,
}

impl Detection {
    /// Build a detection from a bounding box.
    ///
    /// Returns `TrackError::InvalidDetection` when width or height is not
    /// strictly positive.
    pub fn new(rect: Rect<f32>) -> Result<Self, TrackError> {
        let width = rect.width();
        let height = rect.height();
        // Negated form so NaN extents fail validation too
        if !(width > 0.0 && height > 0.0) {
            return Err(TrackError::InvalidDetection { width, height });
        }
        let (cx, cy) = rect.center();
        Ok(Self {
            center: Point::new(cx, cy),
            area: rect.area(),
            diagonal: rect.diagonal(),
            aspect_ratio: rect.aspect_ratio(),
            rect,
            class_id: -1,
            class_name: String::from("No class"),
            time: SystemTime::now(),
        })
    }

    /// Attach classification metadata. Opaque to the tracking core.
    pub fn with_class(mut self, class_id: i32, class_name: impl Into<String>) -> Self {
        self.class_id = class_id;
        self.class_name = class_name.into();
        self
    }

    /// Override the observation timestamp (defaults to construction time).
    pub fn with_time(mut self, time: SystemTime) -> Self {
        self.time = time;
        self
    }

    pub fn rect(&self) -> &Rect<f32> {
        &self.rect
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn diagonal(&self) -> f32 {
        self.diagonal
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn time(&self) -> SystemTime {
        self.time
    }
}
