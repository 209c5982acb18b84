// Gesture classification from a single frame's keypoints.
//
// Fingers are "extended" when the tip sits above its proximal joint (image y
// grows downward). The thumb moves sideways, so it compares x instead.

use crate::landmarks::{KeypointSet, index};
use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// No hand, or a pose we don't act on.
    Idle,
    /// Index up, middle down.
    Draw,
    /// All five fingers out.
    Erase,
    /// Index and middle up; the hit-tester decides what it picks.
    Select,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Draw => "DRAW",
            Self::Erase => "ERASE",
            Self::Select => "SELECT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// (tip, joint) landmark pair used for the extension test.
    pub fn landmarks(&self) -> (usize, usize) {
        match self {
            Self::Thumb => (index::THUMB_TIP, index::THUMB_IP),
            Self::Index => (index::INDEX_TIP, index::INDEX_PIP),
            Self::Middle => (index::MIDDLE_TIP, index::MIDDLE_PIP),
            Self::Ring => (index::RING_TIP, index::RING_PIP),
            Self::Pinky => (index::PINKY_TIP, index::PINKY_PIP),
        }
    }

    pub fn is_extended(&self, keys: &KeypointSet) -> bool {
        let (tip, joint) = self.landmarks();
        let (tip, joint) = (keys.get(tip), keys.get(joint));
        match self {
            Self::Thumb => tip.x < joint.x,
            _ => tip.y < joint.y,
        }
    }
}

/// Per-finger extension flags for one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates([bool; 5]);

impl FingerStates {
    pub fn of(keys: &KeypointSet) -> Self {
        let mut flags = [false; 5];
        for (slot, finger) in flags.iter_mut().zip(Finger::ALL) {
            *slot = finger.is_extended(keys);
        }
        Self(flags)
    }

    pub fn extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn count(&self) -> u8 {
        self.0.iter().filter(|up| **up).count() as u8
    }
}

/// Gesture for a detected hand.
pub fn classify(keys: &KeypointSet) -> Gesture {
    let fingers = FingerStates::of(keys);
    if fingers.count() == 5 {
        return Gesture::Erase;
    }

    let index_up = fingers.extended(Finger::Index);
    // Draw wants the middle tip strictly *below* its joint, so a tip exactly
    // level with the joint is neither Select nor Draw.
    let middle_tip = keys.get(index::MIDDLE_TIP).y;
    let middle_joint = keys.get(index::MIDDLE_PIP).y;

    if index_up && middle_tip < middle_joint {
        Gesture::Select
    } else if index_up && middle_tip > middle_joint {
        Gesture::Draw
    } else {
        Gesture::Idle
    }
}

/// What the classifier saw this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureReading {
    pub gesture: Gesture,
    /// Index fingertip in frame pixels; None when no hand was found.
    pub anchor: Option<Point>,
    pub fingers: u8,
}

impl GestureReading {
    pub const NO_HAND: GestureReading = GestureReading {
        gesture: Gesture::Idle,
        anchor: None,
        fingers: 0,
    };
}

/// Classify an optional hand and map its index fingertip into pixel space.
pub fn read_hand(keys: Option<&KeypointSet>, width: usize, height: usize) -> GestureReading {
    let Some(keys) = keys else {
        return GestureReading::NO_HAND;
    };
    GestureReading {
        gesture: classify(keys),
        anchor: Some(keys.to_pixel(index::INDEX_TIP, width, height)),
        fingers: FingerStates::of(keys).count(),
    }
}
