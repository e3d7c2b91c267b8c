//! Retargeter Integration Tests
//!
//! Tests for:
//! - Avatar registration, selection and bind-pose restore on switch
//! - Data step: IK targets and finger rotations per scheduler tick
//! - Stale-hold of targets across invalid samples
//! - Render step and IK resolve call sites
//! - Avatar pinning to the scene origin

use glam::{Affine3A, Quat, Vec3};
use marionette::retarget::{HandGoal, LookAtGoal, RetargetSettings};
use marionette::{
    BoneKey, Finger, IkSolver, LandmarkFrame, LandmarkPoint, LandmarkSequence, MarionetteError, NodeHandle,
    PlaybackState, Retargeter, Scene, Segment, Side, SkeletonHost, Transform,
};
use std::f32::consts::FRAC_PI_2;

const EPSILON: f32 = 1e-4;
const TICK: f32 = 1.0 / 30.0 + 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

// ============================================================================
// Helpers
// ============================================================================

fn build_avatar(scene: &mut Scene, name: &str) -> NodeHandle {
    let settings = RetargetSettings::default();
    let root = scene.create_node_with_name(name);
    for side in Side::ALL {
        let hand = scene.spawn(&settings.naming.hand_name(side), Transform::new(), Some(root));
        for finger in Finger::ALL {
            let mut parent = hand;
            for segment in Segment::ALL {
                let rotation = match segment {
                    Segment::Proximal => Quat::from_rotation_y(-FRAC_PI_2),
                    _ => Quat::IDENTITY,
                };
                let key = BoneKey::new(finger, segment, side);
                parent = scene.spawn(
                    &settings.naming.bone_name(key),
                    Transform::from_position_rotation(Vec3::new(0.0, 0.0, 0.03), rotation),
                    Some(parent),
                );
            }
        }
    }
    root
}

fn pose_with_head(head: LandmarkPoint) -> Vec<LandmarkPoint> {
    let mut pose = vec![LandmarkPoint::new(0.5, 0.5, 0.0); 33];
    pose[0] = head;
    pose
}

/// Wrist at `wrist`, index finger pointing up in image space, every other
/// finger collapsed onto the wrist.
fn hand_pointing_up(wrist: LandmarkPoint) -> Vec<LandmarkPoint> {
    let mut hand = vec![wrist; 21];
    for (i, y) in Finger::Index.landmark_indices().into_iter().zip([0.45, 0.4, 0.35, 0.3]) {
        hand[i] = LandmarkPoint::new(0.5, y, 0.0);
    }
    hand
}

fn two_frame_sequence() -> LandmarkSequence {
    LandmarkSequence::new(vec![
        LandmarkFrame {
            pose: pose_with_head(LandmarkPoint::new(0.5, 0.4, 0.0)),
            left_hand: hand_pointing_up(LandmarkPoint::new(0.6, 0.5, 0.0)),
            ..Default::default()
        },
        LandmarkFrame {
            pose: pose_with_head(LandmarkPoint::new(f32::NAN, 0.4, 0.0)),
            ..Default::default()
        },
    ])
}

struct Setup {
    scene: Scene,
    male: NodeHandle,
    female: NodeHandle,
    retargeter: Retargeter<Scene>,
}

fn setup(settings: RetargetSettings) -> Setup {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut scene = Scene::new();
    let male = build_avatar(&mut scene, "male");
    let female = build_avatar(&mut scene, "female");

    let mut retargeter = Retargeter::new(settings);
    retargeter.register_avatar("male", male);
    retargeter.register_avatar("female", female);
    retargeter.select_avatar(&mut scene, "male").unwrap();

    Setup {
        scene,
        male,
        female,
        retargeter,
    }
}

fn left_index_proximal(scene: &Scene, root: NodeHandle) -> NodeHandle {
    scene.find_bone(root, "index_01_l").unwrap()
}

#[derive(Default)]
struct RecordingSolver {
    hands: Vec<(Side, HandGoal)>,
    look_at: Vec<LookAtGoal>,
}

impl IkSolver for RecordingSolver {
    fn set_hand_goal(&mut self, side: Side, goal: HandGoal) {
        self.hands.push((side, goal));
    }

    fn set_look_at(&mut self, goal: LookAtGoal) {
        self.look_at.push(goal);
    }
}

// ============================================================================
// Avatar Selection
// ============================================================================

#[test]
fn select_binds_every_finger_bone() {
    let s = setup(RetargetSettings::default());
    let binding = s.retargeter.binding().unwrap();
    assert_eq!(binding.root(), s.male);
    assert_eq!(binding.bound_count(), 40);
    assert!(binding.is_complete());
    assert_eq!(s.retargeter.active_avatar(), Some("male"));
}

#[test]
fn unknown_avatar_is_an_error() {
    let mut s = setup(RetargetSettings::default());
    let err = s.retargeter.select_avatar(&mut s.scene, "robot").unwrap_err();
    assert!(matches!(err, MarionetteError::UnknownAvatar(ref id) if id == "robot"));
    // The previous binding survives.
    assert_eq!(s.retargeter.binding().unwrap().root(), s.male);
}

#[test]
fn switching_avatar_restores_bind_pose() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, TICK);

    let male_bone = left_index_proximal(&s.scene, s.male);
    let rest = Quat::from_rotation_y(-FRAC_PI_2);
    assert!(s.scene.local_rotation(male_bone).unwrap().angle_between(rest) > 0.5);

    s.retargeter.select_avatar(&mut s.scene, "female").unwrap();
    assert!(s.scene.local_rotation(male_bone).unwrap().angle_between(rest) < 1e-3);
    assert_eq!(s.retargeter.binding().unwrap().root(), s.female);

    // Only the newly selected avatar is driven from now on.
    s.retargeter.apply_render_step(&mut s.scene);
    let female_bone = left_index_proximal(&s.scene, s.female);
    assert!(s.scene.local_rotation(female_bone).unwrap().angle_between(rest) > 0.5);
    assert!(s.scene.local_rotation(male_bone).unwrap().angle_between(rest) < 1e-3);
}

// ============================================================================
// Data Step
// ============================================================================

#[test]
fn end_to_end_two_frames() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    assert_eq!(s.retargeter.state(), PlaybackState::Playing);

    s.retargeter.update(&mut s.scene, TICK);
    let targets = *s.retargeter.targets();
    assert!(vec3_approx(targets.head.position, Vec3::new(0.0, 0.7, -0.2)));
    assert_eq!(targets.head.last_updated, Some(0));
    // Left wrist at x = 0.6 is mirrored.
    assert!(vec3_approx(targets.left_hand.position, Vec3::new(-0.1, 0.6, -0.2)));
    assert!(!targets.right_hand.is_set());

    let bone = left_index_proximal(&s.scene, s.male);
    let forward = s.scene.world_rotation(bone).unwrap() * Vec3::Z;
    assert!(vec3_approx(forward, Vec3::Y));

    s.retargeter.update(&mut s.scene, TICK);
    assert_eq!(s.retargeter.state(), PlaybackState::Finished);
    assert_eq!(s.retargeter.cursor(), 1);
    // The NaN head sample leaves the target on its last valid value.
    assert_eq!(s.retargeter.targets().head, targets.head);
    assert_eq!(s.retargeter.targets().left_hand, targets.left_hand);
}

#[test]
fn invalid_wrist_holds_hand_target() {
    let mut s = setup(RetargetSettings::default());
    let mut bad_wrist = hand_pointing_up(LandmarkPoint::new(0.6, 0.5, 0.0));
    bad_wrist[0] = LandmarkPoint::new(f32::NAN, 0.5, 0.0);
    s.retargeter.load_sequence(LandmarkSequence::new(vec![
        LandmarkFrame {
            left_hand: hand_pointing_up(LandmarkPoint::new(0.6, 0.5, 0.0)),
            right_hand: hand_pointing_up(LandmarkPoint::new(0.4, 0.5, 0.0)),
            ..Default::default()
        },
        LandmarkFrame {
            left_hand: bad_wrist,
            right_hand: hand_pointing_up(LandmarkPoint::new(0.3, 0.5, 0.0)),
            ..Default::default()
        },
    ]));

    s.retargeter.update(&mut s.scene, TICK);
    let before = *s.retargeter.targets();
    s.retargeter.update(&mut s.scene, TICK);
    let after = s.retargeter.targets();

    assert_eq!(s.retargeter.cursor(), 1);
    assert_eq!(after.left_hand, before.left_hand);
    assert_eq!(after.left_hand.last_updated, Some(0));
    assert_eq!(after.right_hand.last_updated, Some(1));
    assert!(vec3_approx(after.right_hand.position, Vec3::new(-0.2, 0.6, -0.2)));

    // Finger solving ignores the wrist, so both index chains still solve.
    let solves = s.retargeter.apply_render_step(&mut s.scene);
    assert_eq!(solves.len(), 6);
    assert!(!solves.spilled());
}

#[test]
fn short_update_applies_nothing() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, 0.01);

    assert!(!s.retargeter.targets().head.is_set());
    assert_eq!(s.retargeter.state(), PlaybackState::Playing);
}

#[test]
fn stop_keeps_targets() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, TICK);
    let before = *s.retargeter.targets();

    s.retargeter.stop();
    s.retargeter.update(&mut s.scene, 1.0);

    assert_eq!(s.retargeter.state(), PlaybackState::Finished);
    assert_eq!(s.retargeter.cursor(), 0);
    assert_eq!(*s.retargeter.targets(), before);
}

#[test]
fn unload_returns_to_idle() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, TICK);

    s.retargeter.unload();
    assert_eq!(s.retargeter.state(), PlaybackState::Idle);
    assert!(s.retargeter.sequence().is_none());
    assert!(s.retargeter.current_frame().is_none());
    assert!(s.retargeter.apply_render_step(&mut s.scene).is_empty());
}

#[test]
fn empty_sequence_stays_idle() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(LandmarkSequence::default());
    s.retargeter.update(&mut s.scene, 1.0);
    assert_eq!(s.retargeter.state(), PlaybackState::Idle);
    assert!(s.retargeter.apply_render_step(&mut s.scene).is_empty());
}

#[test]
fn try_load_reports_failure() {
    let mut s = setup(RetargetSettings::default());
    assert!(!s.retargeter.try_load_from_str("{ not json"));
    assert!(!s.retargeter.try_load_from_file("/nonexistent/take.json"));
    assert_eq!(s.retargeter.state(), PlaybackState::Idle);

    assert!(s.retargeter.try_load_from_str("[ {}, {} ]"));
    assert_eq!(s.retargeter.state(), PlaybackState::Playing);
}

// ============================================================================
// Render Step & IK Resolve
// ============================================================================

#[test]
fn render_step_is_idempotent() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, TICK);

    let bone = left_index_proximal(&s.scene, s.male);
    let after_update = s.scene.world_rotation(bone).unwrap();
    for _ in 0..4 {
        let solves = s.retargeter.apply_render_step(&mut s.scene);
        assert_eq!(solves.len(), 3);
    }
    assert!(s.scene.world_rotation(bone).unwrap().angle_between(after_update) < 1e-2);
}

#[test]
fn resolve_without_sequence_is_silent() {
    let s = setup(RetargetSettings::default());
    let mut solver = RecordingSolver::default();
    s.retargeter.resolve_ik(&mut solver);
    assert!(solver.hands.is_empty());
    assert!(solver.look_at.is_empty());
}

#[test]
fn resolve_hands_targets_to_solver() {
    let mut s = setup(RetargetSettings::default());
    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, TICK);

    let mut solver = RecordingSolver::default();
    s.retargeter.resolve_ik(&mut solver);

    assert_eq!(solver.hands.len(), 2);
    let (_, left) = solver.hands.iter().find(|(side, _)| *side == Side::Left).unwrap();
    assert!(vec3_approx(left.position, s.retargeter.targets().left_hand.position));
    assert_eq!(left.position_weight, 1.0);
    assert_eq!(left.rotation_weight, 0.0);
    // No right hand was ever seen.
    let (_, right) = solver.hands.iter().find(|(side, _)| *side == Side::Right).unwrap();
    assert_eq!(right.position_weight, 0.0);
    assert_eq!(solver.look_at.len(), 1);
    assert!(vec3_approx(solver.look_at[0].position, Vec3::new(0.0, 0.7, -0.2)));
}

// ============================================================================
// Origin
// ============================================================================

#[test]
fn origin_moves_targets_and_pins_avatar() {
    let mut s = setup(RetargetSettings::default());
    let origin = Affine3A::from_translation(Vec3::new(1.0, 0.0, 2.0));
    s.retargeter.set_origin(Some(origin));
    s.scene.set_world_position(s.male, Vec3::new(5.0, 5.0, 5.0));

    s.retargeter.load_sequence(two_frame_sequence());
    s.retargeter.update(&mut s.scene, TICK);

    assert!(vec3_approx(s.retargeter.targets().head.position, Vec3::new(1.0, 0.7, 1.8)));
    assert!(vec3_approx(s.scene.world_position(s.male).unwrap(), Vec3::new(1.0, 0.0, 2.0)));
}

#[test]
fn pinning_can_be_disabled() {
    let settings = RetargetSettings {
        pin_avatar_to_origin: false,
        ..Default::default()
    };
    let mut s = setup(settings);
    s.retargeter.set_origin(Some(Affine3A::from_translation(Vec3::X)));
    s.scene.set_world_position(s.male, Vec3::new(5.0, 5.0, 5.0));

    s.retargeter.update(&mut s.scene, TICK);
    assert!(vec3_approx(s.scene.world_position(s.male).unwrap(), Vec3::splat(5.0)));
}
