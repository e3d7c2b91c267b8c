//! IK Target Driver
//!
//! Keeps head look-at and hand position targets for an external IK solver.
//! Each target holds its last valid position: an invalid sample leaves the
//! target untouched instead of resetting it.

use glam::Vec3;
use marionette_core::{LandmarkFrame, Side, hand::WRIST};

use crate::mapper::CoordinateMapper;
use crate::settings::IkSettings;

/// One stale-hold target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IkTarget {
    pub position: Vec3,
    /// Cursor of the frame that last wrote this target
    pub last_updated: Option<usize>,
}

impl IkTarget {
    fn set(&mut self, position: Vec3, frame_index: usize) {
        self.position = position;
        self.last_updated = Some(frame_index);
    }

    /// `true` once any valid sample has been written.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.last_updated.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IkTargetSet {
    pub head: IkTarget,
    pub left_hand: IkTarget,
    pub right_hand: IkTarget,
}

impl IkTargetSet {
    #[must_use]
    pub fn hand(&self, side: Side) -> &IkTarget {
        match side {
            Side::Left => &self.left_hand,
            Side::Right => &self.right_hand,
        }
    }

    fn hand_mut(&mut self, side: Side) -> &mut IkTarget {
        match side {
            Side::Left => &mut self.left_hand,
            Side::Right => &mut self.right_hand,
        }
    }
}

/// Hand goal for one resolve step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandGoal {
    pub position: Vec3,
    pub position_weight: f32,
    pub rotation_weight: f32,
}

/// Look-at goal for one resolve step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAtGoal {
    pub position: Vec3,
    pub weight: f32,
}

/// External IK solver consuming the targets.
pub trait IkSolver {
    fn set_hand_goal(&mut self, side: Side, goal: HandGoal);

    fn set_look_at(&mut self, goal: LookAtGoal);
}

#[derive(Debug, Clone, Default)]
pub struct IkTargetDriver {
    targets: IkTargetSet,
}

impl IkTargetDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &IkTargetSet {
        &self.targets
    }

    /// Updates every target the frame has a valid sample for.
    ///
    /// The head comes from pose landmark 0 (needs a full pose). Each wrist
    /// comes from hand landmark 0 (needs a full hand), mirrored for the
    /// left side. The three targets are independent unless
    /// `hands_require_pose` is set, in which case a frame without a full
    /// pose updates nothing.
    pub fn update_targets(
        &mut self,
        frame: &LandmarkFrame,
        frame_index: usize,
        mapper: &CoordinateMapper,
        settings: &IkSettings,
    ) -> &IkTargetSet {
        let head = frame.head();
        if let Some(head) = head
            && let Some(position) = mapper.sanitize_and_convert(head, false, "Head")
        {
            self.targets.head.set(position, frame_index);
        }

        if head.is_none() && settings.hands_require_pose {
            return &self.targets;
        }

        for side in Side::ALL {
            let Some(hand) = frame.hand(side) else {
                continue;
            };
            let label = match side {
                Side::Left => "LeftHand",
                Side::Right => "RightHand",
            };
            if let Some(position) = mapper.sanitize_and_convert(hand[WRIST], side.is_left(), label) {
                self.targets.hand_mut(side).set(position, frame_index);
            }
        }

        &self.targets
    }

    /// Hands the current targets to `solver` for one resolve step.
    ///
    /// Targets that never received a valid sample go out with zero weight.
    pub fn resolve<S: IkSolver + ?Sized>(&self, solver: &mut S, settings: &IkSettings) {
        if !settings.enabled {
            return;
        }

        for side in Side::ALL {
            let target = self.targets.hand(side);
            let (position_weight, rotation_weight) = if target.is_set() {
                (settings.hand_position_weight, settings.hand_rotation_weight)
            } else {
                (0.0, 0.0)
            };
            solver.set_hand_goal(
                side,
                HandGoal {
                    position: target.position,
                    position_weight,
                    rotation_weight,
                },
            );
        }

        let head = &self.targets.head;
        solver.set_look_at(LookAtGoal {
            position: head.position,
            weight: if head.is_set() { settings.look_at_weight } else { 0.0 },
        });
    }
}
