//! Hand topology shared by the loader, the resolver and the finger solver.
//!
//! Hand landmarks follow the 21-point layout produced by common hand
//! landmark models: the wrist at index 0, then four points per finger from
//! the knuckle outwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of landmarks in a complete hand sample.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Minimum pose landmark count required to drive the head target.
pub const MIN_POSE_LANDMARKS: usize = 17;

/// Pose landmark index of the head.
pub const HEAD: usize = 0;

/// Hand landmark index of the wrist.
pub const WRIST: usize = 0;

/// Body side. Hand data is captured in a camera-facing convention, so the
/// left side is mirrored when mapped onto the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    #[must_use]
    pub fn is_left(self) -> bool {
        matches!(self, Side::Left)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
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

    /// Hand landmark indices of this finger, knuckle to tip.
    #[must_use]
    pub fn landmark_indices(self) -> [usize; 4] {
        let base = 1 + 4 * self as usize;
        [base, base + 1, base + 2, base + 3]
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bone of a finger chain.
///
/// The first three segments are articulated and driven by consecutive
/// landmark pairs. `Tip` is the distal end bone: it is bound so hosts can
/// inspect it, but never rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Proximal,
    Intermediate,
    Distal,
    Tip,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Proximal,
        Segment::Intermediate,
        Segment::Distal,
        Segment::Tip,
    ];

    pub const ARTICULATED: [Segment; 3] =
        [Segment::Proximal, Segment::Intermediate, Segment::Distal];

    /// Landmark pair `(from, to)` driving this segment, as offsets into
    /// [`Finger::landmark_indices`]. `None` for the tip.
    #[must_use]
    pub fn landmark_span(self) -> Option<(usize, usize)> {
        match self {
            Segment::Proximal => Some((0, 1)),
            Segment::Intermediate => Some((1, 2)),
            Segment::Distal => Some((2, 3)),
            Segment::Tip => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Proximal => "proximal",
            Segment::Intermediate => "intermediate",
            Segment::Distal => "distal",
            Segment::Tip => "tip",
        }
    }
}

/// Canonical key of a finger bone: finger × segment × side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoneKey {
    pub finger: Finger,
    pub segment: Segment,
    pub side: Side,
}

impl BoneKey {
    #[must_use]
    pub const fn new(finger: Finger, segment: Segment, side: Side) -> Self {
        Self {
            finger,
            segment,
            side,
        }
    }

    /// Iterates every finger bone key of one side, finger by finger,
    /// proximal to tip.
    pub fn all_for(side: Side) -> impl Iterator<Item = BoneKey> {
        Finger::ALL.into_iter().flat_map(move |finger| {
            Segment::ALL
                .into_iter()
                .map(move |segment| BoneKey::new(finger, segment, side))
        })
    }
}

impl fmt::Display for BoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.side.as_str(),
            self.finger.as_str(),
            self.segment.as_str()
        )
    }
}
