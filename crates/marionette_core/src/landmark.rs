//! Landmark Frame Model
//!
//! One [`LandmarkFrame`] holds a single time sample of face, pose and hand
//! points as produced by an external pose-estimation pipeline. A
//! [`LandmarkSequence`] is loaded once and treated as immutable afterwards.
//!
//! Points deserialize from either a `[x, y, z]` triplet or an
//! `{ "x": .., "y": .., "z": .. }` object. A `null` coordinate becomes NaN,
//! which the validator rejects.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::hand::{HAND_LANDMARK_COUNT, HEAD, MIN_POSE_LANDMARKS, Side};

/// A single landmark sample.
///
/// `x` and `y` are normalized to `[0, 1]` in capture-frame space, `z` is a
/// relative depth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Returns `true` when the point may be converted to skeleton space.
    ///
    /// Valid iff every coordinate is finite, `0 <= x <= 1`, `0 <= y <= 1`
    /// and `-2 < z < 2`. Total over all inputs; NaN and infinities are
    /// invalid.
    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
            && self.z > -2.0
            && self.z < 2.0
    }
}

impl From<Vec3> for LandmarkPoint {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Free-function form of [`LandmarkPoint::is_valid`].
#[inline]
#[must_use]
pub fn validate(point: LandmarkPoint) -> bool {
    point.is_valid()
}

/// Wire forms accepted for a landmark point.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Triplet(Vec<Option<f32>>),
    Object {
        x: Option<f32>,
        y: Option<f32>,
        z: Option<f32>,
    },
}

impl TryFrom<RawPoint> for LandmarkPoint {
    type Error = String;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        let coord = |c: Option<f32>| c.unwrap_or(f32::NAN);
        match raw {
            RawPoint::Triplet(values) => {
                if values.len() < 3 {
                    return Err(format!(
                        "expected at least 3 coordinates, found {}",
                        values.len()
                    ));
                }
                Ok(Self::new(coord(values[0]), coord(values[1]), coord(values[2])))
            }
            RawPoint::Object { x, y, z } => Ok(Self::new(coord(x), coord(y), coord(z))),
        }
    }
}

/// One time sample of landmark data.
///
/// A hand list is either empty or holds exactly
/// [`HAND_LANDMARK_COUNT`] points once it has passed through the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkFrame {
    pub face: Vec<LandmarkPoint>,
    pub pose: Vec<LandmarkPoint>,
    pub left_hand: Vec<LandmarkPoint>,
    pub right_hand: Vec<LandmarkPoint>,
}

impl LandmarkFrame {
    /// Head landmark, when the pose is complete enough to be used.
    #[must_use]
    pub fn head(&self) -> Option<LandmarkPoint> {
        if self.pose.len() < MIN_POSE_LANDMARKS {
            return None;
        }
        self.pose.get(HEAD).copied()
    }

    /// Hand landmarks of one side, when a full hand is present.
    #[must_use]
    pub fn hand(&self, side: Side) -> Option<&[LandmarkPoint]> {
        let points = match side {
            Side::Left => &self.left_hand,
            Side::Right => &self.right_hand,
        };
        (points.len() >= HAND_LANDMARK_COUNT).then_some(points.as_slice())
    }

    pub(crate) fn hand_mut(&mut self, side: Side) -> &mut Vec<LandmarkPoint> {
        match side {
            Side::Left => &mut self.left_hand,
            Side::Right => &mut self.right_hand,
        }
    }

    /// Clears any hand list that breaks the empty-or-complete invariant.
    ///
    /// Returns the sides that were cleared.
    pub fn enforce_hand_invariant(&mut self) -> Vec<Side> {
        let mut cleared = Vec::new();
        for side in Side::ALL {
            let hand = self.hand_mut(side);
            if !hand.is_empty() && hand.len() != HAND_LANDMARK_COUNT {
                hand.clear();
                cleared.push(side);
            }
        }
        cleared
    }
}

/// An ordered, load-once sequence of frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSequence {
    pub frames: Vec<LandmarkFrame>,
}

impl LandmarkSequence {
    #[must_use]
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self { frames }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LandmarkFrame> {
        self.frames.get(index)
    }
}
