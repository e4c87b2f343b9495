pub mod error;
pub mod geometry;
pub mod object;
pub mod rect;
pub mod track;
pub mod tracker;

pub use error::TrackError;
pub use geometry::Point;
pub use object::Detection;
pub use rect::Rect;
pub use track::{KalmanTrack, LinearTrack, Track, TrackOptions};
pub use tracker::Tracker;
