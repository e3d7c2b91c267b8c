//! # Marionette
//!
//! Retargets recorded body and hand landmark streams onto humanoid
//! skeletons: head look-at and wrist IK goals from the pose and wrists,
//! finger bone rotations from the 21-point hand landmarks.
//!
//! This crate re-exports the workspace members:
//!
//! - [`core`]: landmark data model, errors, frame timing
//! - [`scene`]: a minimal transform hierarchy usable as a skeleton host
//! - [`retarget`]: the retargeting pipeline and [`Retargeter`] facade
//! - [`assets`]: landmark sequence loading
//!
//! ```rust,ignore
//! use marionette::{Retargeter, RetargetSettings, Scene};
//!
//! let mut scene = Scene::new();
//! let mut retargeter = Retargeter::new(RetargetSettings::default());
//! retargeter.register_avatar("male", avatar_root);
//! retargeter.select_avatar(&mut scene, "male")?;
//! retargeter.try_load(marionette::assets::load_sequence_from_file("take.json"));
//! ```

pub use marionette_assets as assets;
pub use marionette_core as core;
pub use marionette_retarget as retarget;
pub use marionette_scene as scene;

pub use marionette_core::{
    BoneKey, Finger, FrameTimer, LandmarkFrame, LandmarkPoint, LandmarkSequence, MarionetteError, Result, Segment,
    Side,
};
pub use marionette_retarget::{
    IkSolver, PlaybackState, RetargetSettings, Retargeter, SkeletonBinding, SkeletonHost,
};
pub use marionette_scene::{Node, NodeHandle, Scene, Transform};
