// Hand keypoints and the trait every landmark source implements.
//
// A detector hands us 21 normalized points per hand in the standard
// hand-model order. Nothing here knows how they were produced.

use crate::error::Error;
use crate::types::{FrameBuffer, Point};

/// Landmark indices, standard 21-point hand model.
pub mod index {
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

pub const LANDMARK_COUNT: usize = 21;

/// Bones drawn between landmarks for the on-screen skeleton.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

/// One keypoint, normalized to [0,1] of the frame (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// All 21 keypoints of one detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct KeypointSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl KeypointSet {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice; None unless it holds exactly 21 points.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Landmark {
        self.points[idx]
    }

    pub fn set(&mut self, idx: usize, lm: Landmark) {
        self.points[idx] = lm;
    }

    /// Map a landmark into frame pixel space (truncating toward zero).
    pub fn to_pixel(&self, idx: usize, width: usize, height: usize) -> Point {
        let lm = self.points[idx];
        Point::new(
            (lm.x * width as f32) as i32,
            (lm.y * height as f32) as i32,
        )
    }
}

/// Mouse state as the window reports it this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub pos: Option<(f32, f32)>, // window pixels
    pub left: bool,
    pub right: bool,
}

/// Anything that can find a hand in a frame.
pub trait LandmarkSource {
    /// Zero or one hand for this frame. `Ok(None)` is "no hand", not an error.
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Option<KeypointSet>, Error>;

    /// Latest mouse state; only pointer-driven sources care.
    fn observe_pointer(&mut self, _pointer: PointerState) {}

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_requires_exactly_21() {
        let pts = vec![Landmark::new(0.5, 0.5); 20];
        assert!(KeypointSet::from_slice(&pts).is_none());
        let pts = vec![Landmark::new(0.5, 0.5); 21];
        assert!(KeypointSet::from_slice(&pts).is_some());
        let pts = vec![Landmark::new(0.5, 0.5); 22];
        assert!(KeypointSet::from_slice(&pts).is_none());
    }

    #[test]
    fn test_to_pixel_truncates() {
        let mut ks = KeypointSet::new([Landmark::default(); LANDMARK_COUNT]);
        ks.set(index::INDEX_TIP, Landmark::new(0.25, 0.999));
        assert_eq!(ks.to_pixel(index::INDEX_TIP, 640, 480), Point::new(160, 479));
    }

    #[test]
    fn test_connections_stay_in_range() {
        for (a, b) in HAND_CONNECTIONS {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
