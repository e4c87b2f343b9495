use crate::object::Detection;
use crate::track::{Track, TrackOptions};
use log::debug;
use uuid::Uuid;

/*-----------------------------------------------------------------------------
Tracker
-----------------------------------------------------------------------------*/

/// Registry of live tracks with per-frame orchestration.
///
/// The registry owns every track exclusively; callers only see read-only
/// snapshots of the live set after each `update`. Tracks are stored in
/// registration order, which fixes the association tie-break: of two tracks
/// equidistant from a detection, the earliest-registered one wins.
///
/// One instance serves one camera stream; there is no internal locking, so
/// concurrent streams each need their own `Tracker`.
#[derive(Debug)]
pub struct Tracker<B: Track> {
    max_no_match: usize,
    min_threshold_distance: f32,
    prediction_window: usize,
    options: TrackOptions,
    tracks: Vec<B>,
}

impl<B: Track> Default for Tracker<B> {
    fn default() -> Self {
        Self::new(5, 15.0, TrackOptions::default())
    }
}

impl<B: Track> Tracker<B> {
    /// Create a tracker.
    ///
    /// # Arguments
    /// * `max_no_match` - Consecutive misses after which a track is evicted
    /// * `min_threshold_distance` - Absolute floor of the match threshold
    /// * `options` - Per-track options applied at registration
    pub fn new(max_no_match: usize, min_threshold_distance: f32, options: TrackOptions) -> Self {
        Self {
            max_no_match,
            min_threshold_distance,
            prediction_window: max_no_match,
            options,
            tracks: Vec::new(),
        }
    }

    /// Override the number of recent history points fed to the per-frame
    /// prediction. Defaults to `max_no_match`.
    pub fn with_prediction_window(mut self, window: usize) -> Self {
        self.prediction_window = window;
        self
    }

    /// Process one frame's detections and return the live track set.
    ///
    /// Runs prepare (reset seen flags, recompute predictions), greedy
    /// association for each detection in order, registration of unmatched
    /// detections, then aging and eviction. Must be called once per frame;
    /// detections are consumed in their given order.
    pub fn update(&mut self, detections: &[Detection]) -> &[B] {
        self.prepare();
        for detection in detections {
            self.match_or_register(detection);
        }
        self.refresh_no_match();
        &self.tracks
    }

    /// Live track snapshot (registration order).
    pub fn tracks(&self) -> &[B] {
        &self.tracks
    }

    /// Line-crossing queries need mutable access for the latch; everything
    /// else about the returned tracks must be treated as read-only.
    pub fn tracks_mut(&mut self) -> &mut [B] {
        &mut self.tracks
    }

    pub fn get(&self, id: &Uuid) -> Option<&B> {
        self.tracks.iter().find(|t| t.id() == *id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn prepare(&mut self) {
        for track in self.tracks.iter_mut() {
            track.set_seen_this_frame(false);
            track.predict_next_position(self.prediction_window);
        }
    }

    /// Greedy nearest-candidate association for one detection: the closest
    /// still-unmatched track under the center/predicted metric wins, if it
    /// clears the adaptive threshold `max(diagonal * 0.5, floor)`; otherwise
    /// the detection becomes a new track.
    fn match_or_register(&mut self, detection: &Detection) {
        let mut min_index = None;
        let mut min_distance = f32::MAX;
        for (index, track) in self.tracks.iter().enumerate() {
            if !track.is_tracked() || track.seen_this_frame() {
                continue;
            }
            let dist = track.distance_to(detection);
            // Strict < keeps the earliest-registered track on ties.
            if dist < min_distance {
                min_distance = dist;
                min_index = Some(index);
            }
        }

        let threshold = (detection.diagonal() * 0.5).max(self.min_threshold_distance);
        match min_index {
            Some(index) if min_distance < threshold => {
                let track = &mut self.tracks[index];
                if let Err(err) = track.update(detection) {
                    // Per-item failure: the track stays un-updated and ages
                    // as a miss this frame.
                    debug!("track {} not updated this frame: {}", track.id(), err);
                }
            }
            _ => {
                self.register(detection);
            }
        }
    }

    /// Register a brand-new track for an unmatched detection.
    fn register(&mut self, detection: &Detection) -> Uuid {
        let id = Uuid::new_v4();
        let mut track = B::from_detection(detection, &self.options);
        track.set_id(id);
        debug!("registered track {} at {:?}", id, track.center());
        self.tracks.push(track);
        id
    }

    /// Age every track that was not seen this frame and evict the ones past
    /// the miss threshold. Eviction removes the track immediately.
    fn refresh_no_match(&mut self) {
        let max_no_match = self.max_no_match;
        self.tracks.retain_mut(|track| {
            if !track.seen_this_frame() {
                track.increment_no_match_times();
            }
            if track.no_match_times() > max_no_match {
                track.set_tracked(false);
                debug!(
                    "evicted track {} after {} misses",
                    track.id(),
                    track.no_match_times()
                );
                false
            } else {
                true
            }
        });
    }
}
