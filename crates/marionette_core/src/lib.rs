//! Marionette Core
//!
//! Foundational types shared by every Marionette crate:
//!
//! - [`landmark`]: landmark points, frames and sequences, plus the validator
//! - [`hand`]: hand topology (sides, fingers, segments, bone keys)
//! - [`errors`]: the [`MarionetteError`] taxonomy
//! - [`time`]: render-step timing

pub mod errors;
pub mod hand;
pub mod landmark;
pub mod time;

pub use errors::{MarionetteError, Result};
pub use hand::{BoneKey, Finger, HAND_LANDMARK_COUNT, MIN_POSE_LANDMARKS, Segment, Side};
pub use landmark::{LandmarkFrame, LandmarkPoint, LandmarkSequence, validate};
pub use time::FrameTimer;
