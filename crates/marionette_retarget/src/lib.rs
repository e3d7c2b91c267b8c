//! Landmark-to-skeleton retargeting.
//!
//! Drives a humanoid rig's finger bones and IK goals from recorded
//! landmark frames:
//!
//! - [`mapper`]: normalized landmark → world-space conversion
//! - [`resolver`] / [`binding`]: finger bone lookup and forward-axis calibration
//! - [`finger`]: per-segment finger rotation solving
//! - [`ik`]: stale-hold head and wrist targets for an external IK solver
//! - [`playback`]: fixed-rate frame scheduler
//! - [`retargeter`]: the [`Retargeter`] facade tying it all together
//!
//! Skeletons are accessed through the [`SkeletonHost`] trait, implemented
//! for [`marionette_scene::Scene`].

pub mod binding;
pub mod finger;
pub mod host;
pub mod ik;
pub mod mapper;
pub mod playback;
pub mod resolver;
pub mod retargeter;
pub mod settings;

pub use binding::{AxisSource, SkeletonBinding};
pub use finger::{FingerPoseSolver, SegmentSolve, SegmentSolves};
pub use host::SkeletonHost;
pub use ik::{HandGoal, IkSolver, IkTarget, IkTargetDriver, IkTargetSet, LookAtGoal};
pub use mapper::{CoordinateMapper, to_world_space};
pub use playback::{PlaybackScheduler, PlaybackState};
pub use resolver::{BoneResolver, detect_forward_axis};
pub use retargeter::{AvatarRegistry, Retargeter};
pub use settings::{
    AxisCalibration, AxisOverride, BoneNameOverride, BoneNaming, CoordinateMapping, FingerSolveMode, IkSettings,
    PlaybackSettings, RetargetSettings,
};
